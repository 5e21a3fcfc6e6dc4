use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Block,
}

impl NavigationDecision {
    pub fn is_allow(self) -> bool {
        self == NavigationDecision::Allow
    }
}

/// Keeps the surface on web content: only `http` and `https` navigations are
/// followed in place, every other scheme is suppressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationPolicy;

impl NavigationPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(&self, url: &str) -> NavigationDecision {
        // `Url` lowercases the scheme while parsing.
        match Url::parse(url.trim()) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => NavigationDecision::Allow,
            _ => NavigationDecision::Block,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_web_schemes() {
        let policy = NavigationPolicy::new();
        assert_eq!(policy.decide("https://x"), NavigationDecision::Allow);
        assert_eq!(policy.decide("http://x"), NavigationDecision::Allow);
        assert_eq!(
            policy.decide("HTTPS://Example.com/path?q=1"),
            NavigationDecision::Allow
        );
    }

    #[test]
    fn blocks_everything_else() {
        let policy = NavigationPolicy::new();
        for url in [
            "mailto:a@b",
            "intent://x",
            "file:///x",
            "javascript:alert(1)",
            "tel:+123",
            "about:blank",
        ] {
            assert_eq!(policy.decide(url), NavigationDecision::Block, "{url}");
        }
    }

    #[test]
    fn blocks_unparseable_input() {
        let policy = NavigationPolicy::new();
        assert_eq!(policy.decide(""), NavigationDecision::Block);
        assert_eq!(policy.decide("example.com/no-scheme"), NavigationDecision::Block);
    }
}
