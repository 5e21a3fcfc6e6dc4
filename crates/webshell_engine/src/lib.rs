//! Webshell engine: a headless HTTP browser surface and state persistence.
mod fetch;
mod history;
mod persist;
mod surface;
mod types;

pub use fetch::{FetchSettings, Fetcher, NavigationHandler, ProgressSink, ReqwestFetcher};
pub use history::SurfaceHistory;
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use surface::{HttpSurface, SurfaceEvents};
pub use types::{FailureKind, FetchError, FetchOutput, SurfaceEvent, MAX_REDIRECTS};
