#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use webshell_core::{
    BrowserSurface, ControllerConfig, HostView, LoadController, ManualClock, Notice,
    NoticeDuration, SurfaceSettings,
};

pub const TARGET: &str = "https://app.example.com/";
pub const TIMEOUT: Duration = Duration::from_millis(100);

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(webshell_logging::initialize_for_tests);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Configure,
    Navigate(String),
    StopLoading,
    GoBack,
    Restore(Vec<u8>),
    SetVisible(bool),
    Pause,
    Resume,
    Release,
}

#[derive(Debug, Default)]
pub struct FakeSurface {
    pub calls: Vec<SurfaceCall>,
    pub history_len: usize,
    pub saved: Option<Vec<u8>>,
    pub reject_restore: bool,
}

impl FakeSurface {
    pub fn navigations(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Navigate(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &SurfaceCall) -> usize {
        self.calls.iter().filter(|call| *call == wanted).count()
    }
}

impl BrowserSurface for FakeSurface {
    fn configure(&mut self, _settings: &SurfaceSettings) {
        self.calls.push(SurfaceCall::Configure);
    }

    fn navigate(&mut self, url: &str) {
        self.calls.push(SurfaceCall::Navigate(url.to_string()));
    }

    fn stop_loading(&mut self) {
        self.calls.push(SurfaceCall::StopLoading);
    }

    fn can_go_back(&self) -> bool {
        self.history_len > 1
    }

    fn go_back(&mut self) {
        self.history_len = self.history_len.saturating_sub(1);
        self.calls.push(SurfaceCall::GoBack);
    }

    fn save_state(&self) -> Option<Vec<u8>> {
        self.saved.clone()
    }

    fn restore_state(&mut self, blob: &[u8]) -> bool {
        self.calls.push(SurfaceCall::Restore(blob.to_vec()));
        !self.reject_restore
    }

    fn set_visible(&mut self, visible: bool) {
        self.calls.push(SurfaceCall::SetVisible(visible));
    }

    fn pause(&mut self) {
        self.calls.push(SurfaceCall::Pause);
    }

    fn resume(&mut self) {
        self.calls.push(SurfaceCall::Resume);
    }

    fn release(&mut self) {
        self.calls.push(SurfaceCall::Release);
    }
}

#[derive(Debug, Default)]
pub struct FakeView {
    pub indicator: Vec<bool>,
    pub progress: Vec<u8>,
    pub notices: Vec<Notice>,
}

impl FakeView {
    pub fn hides(&self) -> usize {
        self.indicator.iter().filter(|visible| !**visible).count()
    }

    pub fn notices_of(&self, duration: NoticeDuration) -> usize {
        self.notices
            .iter()
            .filter(|notice| notice.duration == duration)
            .count()
    }
}

impl HostView for FakeView {
    fn set_indicator_visible(&mut self, visible: bool) {
        self.indicator.push(visible);
    }

    fn set_indicator_progress(&mut self, percent: u8) {
        self.progress.push(percent);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

pub type TestController = LoadController<FakeSurface, FakeView, ManualClock>;

pub fn controller_with(surface: FakeSurface) -> (TestController, ManualClock) {
    init_logging();
    let clock = ManualClock::new();
    let config = ControllerConfig::new(TARGET).with_timeout(TIMEOUT);
    let controller = LoadController::new(config, surface, FakeView::default(), clock.clone());
    (controller, clock)
}

pub fn controller() -> (TestController, ManualClock) {
    controller_with(FakeSurface::default())
}

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}
