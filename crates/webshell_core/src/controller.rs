use std::time::Duration;

use webshell_logging::{shell_debug, shell_info, shell_warn};

use crate::{
    Bundle, BrowserSurface, Clock, ErrorInfo, HostView, LoadSession, MonotonicClock,
    NavigationDecision, NavigationPolicy, Notice, NoticeDuration, ProgressReporter, SessionState,
    ShellError, ShellMsg, ShellViewModel, StateStore, SurfaceSettings, Watchdog, WatchdogTicket,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub target_url: String,
    pub timeout: Duration,
    pub surface: SurfaceSettings,
}

impl ControllerConfig {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            timeout: DEFAULT_TIMEOUT,
            surface: SurfaceSettings::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackPressDecision {
    /// The surface pops its own history.
    NavigateBack,
    /// The last load timed out; reload the target instead of leaving.
    RetryLoad,
    /// Nothing to do in the surface; the host applies its default (usually exit).
    DelegateToHost,
}

/// Single source of truth for the surface's load state.
///
/// Every engine event, watchdog expiry and user action is funnelled through
/// one of the `on_*` methods (or [`LoadController::handle`]) on the host's
/// event loop thread.
pub struct LoadController<S, V, C = MonotonicClock> {
    config: ControllerConfig,
    surface: S,
    view: V,
    clock: C,
    policy: NavigationPolicy,
    store: StateStore,
    progress: ProgressReporter,
    watchdog: Watchdog,
    session: Option<LoadSession>,
    // Ticket armed for the current session; cleared on any transition out of Loading.
    session_ticket: Option<WatchdogTicket>,
    surface_visible: bool,
    torn_down: bool,
    dirty: bool,
}

impl<S, V, C> LoadController<S, V, C>
where
    S: BrowserSurface,
    V: HostView,
    C: Clock,
{
    /// Attaches to a freshly created surface and applies the engine settings.
    pub fn new(config: ControllerConfig, mut surface: S, view: V, clock: C) -> Self {
        surface.configure(&config.surface);
        Self {
            config,
            surface,
            view,
            clock,
            policy: NavigationPolicy::new(),
            store: StateStore::new(),
            progress: ProgressReporter::new(),
            watchdog: Watchdog::new(),
            session: None,
            session_ticket: None,
            surface_visible: true,
            torn_down: false,
            dirty: false,
        }
    }

    /// Host creation hook: restore saved surface state when there is any,
    /// otherwise load the configured target.
    pub fn launch(&mut self, saved: Option<&Bundle>) {
        if saved.is_some_and(|bundle| self.restore_state(bundle)) {
            return;
        }
        let url = self.config.target_url.clone();
        self.start_session(&url);
    }

    pub fn start_session(&mut self, url: &str) {
        if self.torn_down {
            shell_warn!("start_session after teardown ignored url={}", url);
            return;
        }
        if let Some(previous) = &self.session {
            if previous.state() == SessionState::Loading {
                shell_debug!("superseding in-flight load of {}", previous.target_url());
            }
        }

        let now = self.clock.now();
        self.watchdog.disarm();
        self.session = Some(LoadSession::loading(url, now, self.config.timeout));
        self.progress.show(&mut self.view);
        self.set_surface_visible(false);
        self.surface.navigate(url);
        self.session_ticket = Some(self.watchdog.arm(now, self.config.timeout));
        self.dirty = true;
        shell_info!(
            "session started url={} timeout_ms={}",
            url,
            self.config.timeout.as_millis()
        );
    }

    pub fn on_page_finished(&mut self, url: &str) {
        let now = self.clock.now();
        let load_time = match self.session.as_mut() {
            Some(session) if session.awaits_completion() => {
                let load_time = now.saturating_sub(session.started_at());
                session.mark_loaded();
                load_time
            }
            Some(session) => {
                shell_debug!(
                    "page finished ignored url={} state={:?}",
                    url,
                    session.state()
                );
                return;
            }
            None => {
                shell_debug!("page finished without session url={}", url);
                return;
            }
        };

        self.session_ticket = None;
        self.watchdog.disarm();
        self.progress.hide(&mut self.view);
        self.set_surface_visible(true);
        self.dirty = true;
        shell_info!(
            "page finished url={} load_time_ms={}",
            url,
            load_time.as_millis()
        );
    }

    pub fn on_page_error(&mut self, error: ErrorInfo) {
        if !error.is_main_frame {
            shell_debug!(
                "sub-resource error url={} description={}",
                error.url,
                error.description
            );
            return;
        }

        shell_warn!(
            "page error url={} description={}",
            error.url,
            error.description
        );
        if let Some(session) = self.session.as_mut() {
            if session.state() == SessionState::Loading {
                session.mark_errored();
                self.session_ticket = None;
                self.watchdog.disarm();
            }
        }

        let failure = ShellError::PageLoad {
            url: error.url,
            description: error.description,
        };
        self.progress.hide(&mut self.view);
        self.view.notify(Notice {
            text: failure.to_string(),
            duration: NoticeDuration::Short,
        });
        self.dirty = true;
    }

    pub fn on_watchdog_fired(&mut self, ticket: WatchdogTicket) {
        if self.session_ticket != Some(ticket) {
            shell_debug!("stale watchdog ticket {:?} ignored", ticket);
            return;
        }
        self.session_ticket = None;

        let failure = match self.session.as_mut() {
            Some(session) if session.state() == SessionState::Loading => {
                session.mark_timed_out();
                ShellError::LoadTimeout {
                    url: session.target_url().to_owned(),
                    timeout: self.config.timeout,
                }
            }
            _ => return,
        };

        shell_warn!("{:?}", failure);
        self.progress.hide(&mut self.view);
        self.surface.stop_loading();
        self.view.notify(Notice {
            text: failure.to_string(),
            duration: NoticeDuration::Long,
        });
        self.dirty = true;
    }

    /// Fires the watchdog if its deadline has passed. The host calls this
    /// after draining its queued events, so a finish that is already queued
    /// always wins against the deadline.
    pub fn poll_watchdog(&mut self) {
        if let Some(ticket) = self.watchdog.take_due(self.clock.now()) {
            self.on_watchdog_fired(ticket);
        }
    }

    pub fn decide_back_press(&self) -> BackPressDecision {
        let timed_out = self.state() == SessionState::TimedOut;
        if self.surface.can_go_back() && !timed_out {
            BackPressDecision::NavigateBack
        } else if timed_out {
            BackPressDecision::RetryLoad
        } else {
            BackPressDecision::DelegateToHost
        }
    }

    pub fn on_back_pressed(&mut self) -> BackPressDecision {
        let decision = self.decide_back_press();
        shell_debug!("back pressed -> {:?}", decision);
        match decision {
            BackPressDecision::NavigateBack => self.surface.go_back(),
            BackPressDecision::RetryLoad => {
                let url = self
                    .session
                    .as_ref()
                    .map(|session| session.target_url().to_owned())
                    .unwrap_or_else(|| self.config.target_url.clone());
                self.start_session(&url);
            }
            BackPressDecision::DelegateToHost => {}
        }
        decision
    }

    pub fn on_progress(&mut self, value: i32) {
        self.progress.update(&mut self.view, value);
        self.dirty = true;
    }

    pub fn should_allow_navigation(&self, url: &str) -> NavigationDecision {
        let decision = self.policy.decide(url);
        if decision == NavigationDecision::Block {
            let blocked = ShellError::NavigationBlocked {
                url: url.to_owned(),
            };
            shell_debug!("{}", blocked);
        }
        decision
    }

    /// Writes the surface's serialized state into `bundle`. Returns false if
    /// the surface had nothing to save.
    pub fn save_state(&self, bundle: &mut Bundle) -> bool {
        match self.surface.save_state() {
            Some(blob) => {
                shell_debug!("saving surface state ({} bytes)", blob.len());
                self.store.save(bundle, blob);
                true
            }
            None => false,
        }
    }

    /// Hands saved surface state back to the engine instead of loading over
    /// the network. The session completes once the engine signals readiness
    /// with a page-finished event.
    pub fn restore_state(&mut self, bundle: &Bundle) -> bool {
        let Some(blob) = self.store.load(bundle) else {
            return false;
        };
        if !self.surface.restore_state(blob) {
            shell_warn!("surface rejected saved state ({} bytes)", blob.len());
            return false;
        }

        self.watchdog.disarm();
        self.session_ticket = None;
        self.session = Some(LoadSession::restored(
            self.config.target_url.clone(),
            self.clock.now(),
        ));
        self.dirty = true;
        shell_info!("restored surface state ({} bytes)", blob.len());
        true
    }

    pub fn pause(&mut self) {
        if !self.torn_down {
            self.surface.pause();
        }
    }

    pub fn resume(&mut self) {
        if !self.torn_down {
            self.surface.resume();
        }
    }

    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.session_ticket = None;
        self.watchdog.disarm();
        self.progress.hide(&mut self.view);
        self.surface.stop_loading();
        self.surface.release();
        self.dirty = true;
        shell_info!("surface released");
    }

    /// Event-queue entry point. Only a back press produces a decision.
    pub fn handle(&mut self, msg: ShellMsg) -> Option<BackPressDecision> {
        match msg {
            ShellMsg::Progress(value) => self.on_progress(value),
            ShellMsg::PageFinished { url } => self.on_page_finished(&url),
            ShellMsg::ReceivedError(error) => self.on_page_error(error),
            ShellMsg::NavigationRequested { url } => {
                if self.should_allow_navigation(&url).is_allow() && !self.torn_down {
                    self.surface.navigate(&url);
                }
            }
            ShellMsg::BackPressed => return Some(self.on_back_pressed()),
            ShellMsg::Pause => self.pause(),
            ShellMsg::Resume => self.resume(),
            ShellMsg::Teardown => self.teardown(),
        }
        None
    }

    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Idle, LoadSession::state)
    }

    pub fn session(&self) -> Option<&LoadSession> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn host_view(&self) -> &V {
        &self.view
    }

    pub fn host_view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn view(&self) -> ShellViewModel {
        ShellViewModel {
            state: self.state(),
            target_url: self.session.as_ref().map(|s| s.target_url().to_owned()),
            progress: self.progress.value(),
            indicator_visible: self.progress.is_visible(),
            surface_visible: self.surface_visible,
            watchdog_armed: self.watchdog.is_armed(),
        }
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn set_surface_visible(&mut self, visible: bool) {
        if self.surface_visible != visible {
            self.surface_visible = visible;
            self.surface.set_visible(visible);
        }
    }
}
