use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lifecycle of a single load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Loading,
    Loaded,
    TimedOut,
    Errored,
}

/// Whether a session was started by a network load or by restoring saved surface state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionOrigin {
    #[default]
    Fresh,
    Restored,
}

/// The single active load attempt owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSession {
    target_url: String,
    state: SessionState,
    origin: SessionOrigin,
    started_at: Duration,
    timeout_deadline: Duration,
}

impl LoadSession {
    /// A network load that starts immediately.
    pub fn loading(target_url: impl Into<String>, started_at: Duration, timeout: Duration) -> Self {
        Self {
            target_url: target_url.into(),
            state: SessionState::Loading,
            origin: SessionOrigin::Fresh,
            started_at,
            timeout_deadline: started_at + timeout,
        }
    }

    /// A session rebuilt from saved surface state. No load is in flight, so
    /// no deadline applies until the surface reports readiness.
    pub fn restored(target_url: impl Into<String>, started_at: Duration) -> Self {
        Self {
            target_url: target_url.into(),
            state: SessionState::Idle,
            origin: SessionOrigin::Restored,
            started_at,
            timeout_deadline: started_at,
        }
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn origin(&self) -> SessionOrigin {
        self.origin
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    pub fn timeout_deadline(&self) -> Duration {
        self.timeout_deadline
    }

    /// True while the surface may still report a completed page for this session.
    pub fn awaits_completion(&self) -> bool {
        match self.state {
            SessionState::Loading | SessionState::Errored => true,
            SessionState::Idle => self.origin == SessionOrigin::Restored,
            SessionState::Loaded | SessionState::TimedOut => false,
        }
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.state = SessionState::Loaded;
    }

    pub(crate) fn mark_timed_out(&mut self) {
        self.state = SessionState::TimedOut;
    }

    pub(crate) fn mark_errored(&mut self) {
        self.state = SessionState::Errored;
    }
}
