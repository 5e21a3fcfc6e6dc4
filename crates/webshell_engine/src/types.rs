use std::fmt;

use webshell_core::{ErrorInfo, ShellMsg};

/// Redirect hops followed before a load is abandoned.
pub const MAX_REDIRECTS: usize = 30;

/// Events the surface reports back to the host event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Progress(i32),
    PageFinished { url: String },
    ReceivedError(ErrorInfo),
}

impl From<SurfaceEvent> for ShellMsg {
    fn from(event: SurfaceEvent) -> Self {
        match event {
            SurfaceEvent::Progress(value) => ShellMsg::Progress(value),
            SurfaceEvent::PageFinished { url } => ShellMsg::PageFinished { url },
            SurfaceEvent::ReceivedError(error) => ShellMsg::ReceivedError(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
    /// Set when a redirect hop was refused by the navigation handler; the
    /// surface then stays on `original_url`.
    pub blocked_redirect: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
