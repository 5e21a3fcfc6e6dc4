//! Webshell core: the page-load lifecycle controller for a single embedded
//! browser surface, and the small pieces it is built from.
mod clock;
mod controller;
mod error;
mod msg;
mod policy;
mod ports;
mod progress;
mod session;
mod store;
mod view_model;
mod watchdog;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use controller::{BackPressDecision, ControllerConfig, LoadController, DEFAULT_TIMEOUT};
pub use error::ShellError;
pub use msg::ShellMsg;
pub use policy::{NavigationDecision, NavigationPolicy};
pub use ports::{
    BrowserSurface, CacheMode, ErrorInfo, HostView, Notice, NoticeDuration, SurfaceSettings,
};
pub use progress::{clamp_progress, ProgressReporter};
pub use session::{LoadSession, SessionOrigin, SessionState};
pub use store::{Bundle, StateStore};
pub use view_model::ShellViewModel;
pub use watchdog::{Watchdog, WatchdogTicket};
