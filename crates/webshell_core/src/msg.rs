use crate::ErrorInfo;

/// Everything that can arrive on the host's event queue for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMsg {
    /// Engine progress for the page in flight, nominally 0..=100.
    Progress(i32),
    /// Engine finished loading a page (or finished restoring saved state).
    PageFinished { url: String },
    /// Engine reported a failed request.
    ReceivedError(ErrorInfo),
    /// Engine or user asks to follow a link inside the surface.
    NavigationRequested { url: String },
    /// User pressed back.
    BackPressed,
    /// Host went to the background.
    Pause,
    /// Host came back to the foreground.
    Resume,
    /// Host is destroying the surface.
    Teardown,
}
