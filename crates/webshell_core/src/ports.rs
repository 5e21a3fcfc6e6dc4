//! Seams to the collaborators the controller drives but does not implement:
//! the browser surface and the host's view layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CacheMode {
    /// Always revalidate with the network.
    #[default]
    NoCache,
    /// Let the engine apply its default caching.
    Default,
}

/// Engine settings applied once when the surface is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSettings {
    pub cache_mode: CacheMode,
    pub user_agent: Option<String>,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            cache_mode: CacheMode::NoCache,
            user_agent: None,
        }
    }
}

/// Failure reported by the engine for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub url: String,
    pub description: String,
    /// False for sub-resources (images, scripts) of the page.
    pub is_main_frame: bool,
}

impl ErrorInfo {
    pub fn main_frame(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
            is_main_frame: true,
        }
    }

    pub fn sub_resource(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
            is_main_frame: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeDuration {
    Short,
    Long,
}

/// A fire-and-forget message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub duration: NoticeDuration,
}

/// Commands the controller issues to the embedded browser engine.
pub trait BrowserSurface {
    fn configure(&mut self, settings: &SurfaceSettings);
    fn navigate(&mut self, url: &str);
    fn stop_loading(&mut self);
    fn can_go_back(&self) -> bool;
    fn go_back(&mut self);
    /// Serialized surface state, or `None` when there is nothing worth keeping.
    fn save_state(&self) -> Option<Vec<u8>>;
    /// Returns false if the blob could not be applied.
    fn restore_state(&mut self, blob: &[u8]) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn pause(&mut self) {}
    fn resume(&mut self) {}
    fn release(&mut self);
}

/// The host's progress widget and toast sink.
pub trait HostView {
    fn set_indicator_visible(&mut self, visible: bool);
    fn set_indicator_progress(&mut self, percent: u8);
    fn notify(&mut self, notice: Notice);
}
