use std::time::Duration;

use thiserror::Error;

/// Load failures. All of them are recovered at the controller boundary; the
/// `Display` text of the user-facing ones doubles as the notice shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("navigation to {url} blocked")]
    NavigationBlocked { url: String },
    #[error("Error loading page. Please try again.")]
    PageLoad { url: String, description: String },
    #[error("Page load timed out. Please check your connection.")]
    LoadTimeout { url: String, timeout: Duration },
}
