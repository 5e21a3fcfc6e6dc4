use crate::ports::HostView;

/// Clamps an engine-reported progress value into the indicator's range.
pub fn clamp_progress(value: i32) -> u8 {
    value.clamp(0, 100) as u8
}

/// Owns the indicator's visibility so that repeated hides (timeout racing a
/// finish or an error) reach the host only once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressReporter {
    visible: bool,
    value: u8,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show<V: HostView + ?Sized>(&mut self, view: &mut V) {
        self.value = 0;
        view.set_indicator_progress(0);
        if !self.visible {
            self.visible = true;
            view.set_indicator_visible(true);
        }
    }

    /// Returns true if this call actually hid the indicator.
    pub fn hide<V: HostView + ?Sized>(&mut self, view: &mut V) -> bool {
        if !self.visible {
            return false;
        }
        self.visible = false;
        view.set_indicator_visible(false);
        true
    }

    pub fn update<V: HostView + ?Sized>(&mut self, view: &mut V, value: i32) {
        self.value = clamp_progress(value);
        view.set_indicator_progress(self.value);
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}
