use crate::SessionState;

/// Snapshot the host renders from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShellViewModel {
    pub state: SessionState,
    pub target_url: Option<String>,
    pub progress: u8,
    pub indicator_visible: bool,
    pub surface_visible: bool,
    pub watchdog_armed: bool,
}
