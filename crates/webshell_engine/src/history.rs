use serde::{Deserialize, Serialize};

/// Back stack of pages the surface has finished loading. The last entry is
/// the page on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceHistory {
    entries: Vec<String>,
}

impl SurfaceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finished page. Reloading the current page does not grow the stack.
    pub fn push(&mut self, url: &str) {
        if self.current() != Some(url) {
            self.entries.push(url.to_string());
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    /// Drops the current page and returns the one now on top.
    pub fn go_back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.entries.pop();
        self.current()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_blob(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_blob(blob: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_stops_at_first_page() {
        let mut history = SurfaceHistory::new();
        history.push("https://a.example.com/");
        history.push("https://a.example.com/b");

        assert_eq!(history.go_back(), Some("https://a.example.com/"));
        assert!(!history.can_go_back());
        assert_eq!(history.go_back(), None);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn reload_does_not_duplicate_entry() {
        let mut history = SurfaceHistory::new();
        history.push("https://a.example.com/");
        history.push("https://a.example.com/");

        assert_eq!(history.len(), 1);
    }

    #[test]
    fn blob_survives_serialization() {
        let mut history = SurfaceHistory::new();
        history.push("https://a.example.com/");
        history.push("https://a.example.com/results");

        let restored = SurfaceHistory::from_blob(&history.to_blob().unwrap()).unwrap();
        assert_eq!(restored, history);
        assert!(SurfaceHistory::from_blob(b"not json").is_err());
    }
}
