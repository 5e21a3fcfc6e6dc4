use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use webshell_core::{
    BrowserSurface, ControllerConfig, HostView, LoadController, MonotonicClock, Notice,
    SessionState, ShellMsg,
};
use webshell_engine::{
    FetchError, FetchOutput, FetchSettings, Fetcher, HttpSurface, ProgressSink, SurfaceEvent,
    SurfaceEvents,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn next_event(events: &SurfaceEvents) -> Option<SurfaceEvent> {
    for _ in 0..200 {
        if let Some(event) = events.try_recv() {
            return Some(event);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}

async fn next_terminal_event(events: &SurfaceEvents) -> Option<SurfaceEvent> {
    while let Some(event) = next_event(events).await {
        if !matches!(event, SurfaceEvent::Progress(_)) {
            return Some(event);
        }
    }
    None
}

/// Answers instantly, except for URLs ending in `/hang`, which never complete.
#[derive(Default)]
struct ScriptedFetcher {
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, sink: &dyn ProgressSink) -> Result<FetchOutput, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.ends_with("/hang") {
            std::future::pending::<()>().await;
        }
        sink.emit(SurfaceEvent::Progress(100));
        Ok(FetchOutput {
            original_url: url.to_string(),
            final_url: url.to_string(),
            redirect_count: 0,
            content_type: None,
            byte_len: 0,
            blocked_redirect: None,
        })
    }
}

async fn wait_for_calls(fetcher: &ScriptedFetcher, expected: usize) {
    for _ in 0..200 {
        if fetcher.calls() >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(fetcher.calls(), expected);
}

async fn page_server() -> MockServer {
    let server = MockServer::start().await;
    for page in ["/", "/results"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn navigate_reports_progress_then_finish() {
    let server = page_server().await;
    let (mut surface, events) = HttpSurface::new(FetchSettings::default());
    let url = format!("{}/", server.uri());

    surface.navigate(&url);

    let mut progress = Vec::new();
    let finished = loop {
        match next_event(&events).await {
            Some(SurfaceEvent::Progress(value)) => progress.push(value),
            other => break other,
        }
    };
    assert_eq!(progress.last(), Some(&100));
    assert_eq!(finished, Some(SurfaceEvent::PageFinished { url: url.clone() }));
    assert_eq!(surface.history_len(), 1);
    assert!(!surface.can_go_back());
}

#[tokio::test]
async fn server_error_is_a_main_frame_error() {
    let server = page_server().await;
    let (mut surface, events) = HttpSurface::new(FetchSettings::default());
    let url = format!("{}/broken", server.uri());

    surface.navigate(&url);

    match next_terminal_event(&events).await {
        Some(SurfaceEvent::ReceivedError(error)) => {
            assert!(error.is_main_frame);
            assert_eq!(error.url, url);
            assert!(error.description.contains("500"));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(surface.history_len(), 0);
}

#[tokio::test]
async fn go_back_returns_to_previous_page() {
    let server = page_server().await;
    let (mut surface, events) = HttpSurface::new(FetchSettings::default());
    let home = format!("{}/", server.uri());
    let results = format!("{}/results", server.uri());

    surface.navigate(&home);
    next_terminal_event(&events).await;
    surface.navigate(&results);
    next_terminal_event(&events).await;
    assert!(surface.can_go_back());

    surface.go_back();

    assert_eq!(
        next_terminal_event(&events).await,
        Some(SurfaceEvent::PageFinished { url: home })
    );
    assert!(!surface.can_go_back());
    assert_eq!(surface.history_len(), 1);
}

#[tokio::test]
async fn stopped_load_reports_nothing() {
    let server = page_server().await;
    let (mut surface, events) = HttpSurface::new(FetchSettings::default());

    surface.navigate(&format!("{}/slow", server.uri()));
    surface.stop_loading();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(events.try_recv(), None);
}

#[tokio::test]
async fn saved_state_restores_without_network() {
    let server = page_server().await;
    let (mut surface, events) = HttpSurface::new(FetchSettings::default());
    let home = format!("{}/", server.uri());
    let results = format!("{}/results", server.uri());
    surface.navigate(&home);
    next_terminal_event(&events).await;
    surface.navigate(&results);
    next_terminal_event(&events).await;
    let blob = surface.save_state().expect("history saved");
    let requests_before = server.received_requests().await.unwrap_or_default().len();

    let (mut recreated, recreated_events) = HttpSurface::new(FetchSettings::default());
    assert!(recreated.restore_state(&blob));

    assert_eq!(
        recreated_events.try_recv(),
        Some(SurfaceEvent::PageFinished { url: results })
    );
    assert!(recreated.can_go_back());
    let requests_after = server.received_requests().await.unwrap_or_default().len();
    assert_eq!(requests_before, requests_after);
}

#[tokio::test]
async fn garbage_state_is_rejected() {
    let (mut surface, events) = HttpSurface::new(FetchSettings::default());

    assert!(!surface.restore_state(b"{not json"));
    assert!(!surface.restore_state(br#"{"entries":[]}"#));
    assert_eq!(surface.save_state(), None);
    assert_eq!(events.try_recv(), None);
}

#[tokio::test]
async fn released_surface_ignores_navigation() {
    let server = page_server().await;
    let (mut surface, events) = HttpSurface::new(FetchSettings::default());

    surface.release();
    surface.navigate(&format!("{}/", server.uri()));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(events.try_recv(), None);
}

#[derive(Default)]
struct RecordingView {
    notices: Vec<Notice>,
}

impl HostView for RecordingView {
    fn set_indicator_visible(&mut self, _visible: bool) {}

    fn set_indicator_progress(&mut self, _percent: u8) {}

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

#[tokio::test]
async fn controller_reaches_loaded_through_http_surface() {
    webshell_logging::initialize_for_tests();
    let server = page_server().await;
    let (surface, events) = HttpSurface::new(FetchSettings::default());
    let config = ControllerConfig::new(format!("{}/", server.uri()));
    let mut controller =
        LoadController::new(config, surface, RecordingView::default(), MonotonicClock::new());

    controller.launch(None);
    while let Some(event) = next_event(&events).await {
        let terminal = !matches!(event, SurfaceEvent::Progress(_));
        controller.handle(ShellMsg::from(event));
        controller.poll_watchdog();
        if terminal {
            break;
        }
    }

    assert_eq!(controller.state(), SessionState::Loaded);
    assert!(controller.view().surface_visible);
    assert!(controller.host_view().notices.is_empty());
}

#[tokio::test]
async fn stop_discards_events_already_queued() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let (mut surface, events) = HttpSurface::with_fetcher(fetcher.clone());

    surface.navigate("https://app.example.com/");
    wait_for_calls(&fetcher, 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    surface.stop_loading();

    assert_eq!(events.try_recv(), None);
}

#[tokio::test]
async fn finish_of_a_replaced_load_leaves_the_new_session_loading() {
    webshell_logging::initialize_for_tests();
    let fetcher = Arc::new(ScriptedFetcher::default());
    let (surface, events) = HttpSurface::with_fetcher(fetcher.clone());
    let config = ControllerConfig::new("https://app.example.com/");
    let mut controller =
        LoadController::new(config, surface, RecordingView::default(), MonotonicClock::new());

    controller.launch(None);
    wait_for_calls(&fetcher, 1).await;
    // Let the first load's finish sit undrained in the channel.
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.start_session("https://app.example.com/hang");
    wait_for_calls(&fetcher, 2).await;

    while let Some(event) = events.try_recv() {
        controller.handle(ShellMsg::from(event));
    }

    let view = controller.view();
    assert_eq!(view.state, SessionState::Loading);
    assert!(view.watchdog_armed);
    assert!(view.indicator_visible);
    assert!(!view.surface_visible);
}

#[tokio::test]
async fn paused_surface_defers_navigation_until_resume() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let (mut surface, events) = HttpSurface::with_fetcher(fetcher.clone());
    let url = "https://app.example.com/".to_string();

    surface.pause();
    assert!(surface.is_paused());
    surface.navigate(&url);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(events.try_recv(), None);

    surface.resume();

    assert!(!surface.is_paused());
    assert_eq!(
        next_terminal_event(&events).await,
        Some(SurfaceEvent::PageFinished { url })
    );
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(surface.history_len(), 1);
}

#[tokio::test]
async fn stop_while_paused_drops_the_deferred_load() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let (mut surface, events) = HttpSurface::with_fetcher(fetcher.clone());

    surface.pause();
    surface.navigate("https://app.example.com/");
    surface.stop_loading();
    surface.resume();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(events.try_recv(), None);
}
