use std::sync::{
    atomic::{AtomicU64, Ordering},
    mpsc, Arc, Mutex,
};
use std::thread;

use tokio_util::sync::CancellationToken;
use webshell_core::{BrowserSurface, ErrorInfo, SurfaceSettings};
use webshell_logging::{shell_debug, shell_error, shell_info, shell_warn};

use crate::fetch::{FetchSettings, Fetcher, ProgressSink, ReqwestFetcher};
use crate::{SurfaceEvent, SurfaceHistory};

/// An event stamped with the load generation that produced it.
struct Envelope {
    generation: u64,
    event: SurfaceEvent,
}

struct LoadRequest {
    url: String,
    record: bool,
    generation: u64,
    token: CancellationToken,
    fetcher: Arc<dyn Fetcher>,
    history: Arc<Mutex<SurfaceHistory>>,
    event_tx: mpsc::Sender<Envelope>,
}

struct PendingLoad {
    url: String,
    record: bool,
}

enum SurfaceCommand {
    Load(LoadRequest),
}

/// Receiving end of the surface's event channel, drained by the host loop.
pub struct SurfaceEvents {
    event_rx: mpsc::Receiver<Envelope>,
    generation: Arc<AtomicU64>,
}

impl SurfaceEvents {
    /// Next event of the current load. Anything a stopped or replaced load
    /// queued before it was cancelled is discarded here.
    pub fn try_recv(&self) -> Option<SurfaceEvent> {
        loop {
            let envelope = self.event_rx.try_recv().ok()?;
            if envelope.generation == self.generation.load(Ordering::Acquire) {
                return Some(envelope.event);
            }
            shell_debug!(
                "dropping event from replaced load #{}: {:?}",
                envelope.generation,
                envelope.event
            );
        }
    }
}

/// Headless browser surface: loads pages over HTTP on a background tokio
/// runtime and reports progress, completion and failures as [`SurfaceEvent`]s.
pub struct HttpSurface {
    cmd_tx: mpsc::Sender<SurfaceCommand>,
    event_tx: mpsc::Sender<Envelope>,
    settings: FetchSettings,
    fetcher: Arc<dyn Fetcher>,
    custom_fetcher: bool,
    history: Arc<Mutex<SurfaceHistory>>,
    generation: Arc<AtomicU64>,
    in_flight: Option<CancellationToken>,
    // Navigation requested while paused; issued on resume.
    pending: Option<PendingLoad>,
    visible: bool,
    paused: bool,
    released: bool,
}

impl HttpSurface {
    pub fn new(settings: FetchSettings) -> (Self, SurfaceEvents) {
        let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(settings.clone()));
        Self::build(settings, fetcher, false)
    }

    /// Uses `fetcher` for every load; `configure` then leaves it untouched.
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>) -> (Self, SurfaceEvents) {
        Self::build(FetchSettings::default(), fetcher, true)
    }

    fn build(
        settings: FetchSettings,
        fetcher: Arc<dyn Fetcher>,
        custom_fetcher: bool,
    ) -> (Self, SurfaceEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let generation = Arc::new(AtomicU64::new(0));

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    shell_error!("surface runtime failed to start: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    SurfaceCommand::Load(request) => {
                        runtime.spawn(run_load(request));
                    }
                }
            }
        });

        let surface = Self {
            cmd_tx,
            event_tx,
            settings,
            fetcher,
            custom_fetcher,
            history: Arc::new(Mutex::new(SurfaceHistory::new())),
            generation: generation.clone(),
            in_flight: None,
            pending: None,
            visible: true,
            paused: false,
            released: false,
        };
        (surface, SurfaceEvents { event_rx, generation })
    }

    pub fn history_len(&self) -> usize {
        self.with_history(|history| history.len()).unwrap_or(0)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn load(&mut self, url: &str, record: bool) {
        if self.released {
            shell_warn!("load of {} after release ignored", url);
            return;
        }
        self.stop_loading();
        if self.paused {
            shell_debug!("surface paused; deferring load of {}", url);
            self.pending = Some(PendingLoad {
                url: url.to_string(),
                record,
            });
            return;
        }

        let token = CancellationToken::new();
        let request = LoadRequest {
            url: url.to_string(),
            record,
            generation: self.current_generation(),
            token: token.clone(),
            fetcher: self.fetcher.clone(),
            history: self.history.clone(),
            event_tx: self.event_tx.clone(),
        };
        if self.cmd_tx.send(SurfaceCommand::Load(request)).is_err() {
            shell_error!("surface runtime is gone; load of {} dropped", url);
            return;
        }
        self.in_flight = Some(token);
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Invalidates everything the previous load has sent or will send.
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn with_history<R>(&self, f: impl FnOnce(&mut SurfaceHistory) -> R) -> Option<R> {
        match self.history.lock() {
            Ok(mut history) => Some(f(&mut history)),
            Err(_) => {
                shell_error!("surface history lock poisoned");
                None
            }
        }
    }
}

impl BrowserSurface for HttpSurface {
    fn configure(&mut self, settings: &SurfaceSettings) {
        shell_debug!(
            "surface settings cache={:?} user_agent={:?}",
            settings.cache_mode,
            settings.user_agent
        );
        self.settings.cache_mode = settings.cache_mode;
        self.settings.user_agent = settings.user_agent.clone();
        if !self.custom_fetcher {
            self.fetcher = Arc::new(ReqwestFetcher::new(self.settings.clone()));
        }
    }

    fn navigate(&mut self, url: &str) {
        shell_info!("navigate {}", url);
        self.load(url, true);
    }

    fn stop_loading(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        self.pending = None;
        self.next_generation();
    }

    fn can_go_back(&self) -> bool {
        self.with_history(|history| history.can_go_back())
            .unwrap_or(false)
    }

    fn go_back(&mut self) {
        let previous = self
            .with_history(|history| history.go_back().map(str::to_owned))
            .flatten();
        if let Some(url) = previous {
            shell_info!("back to {}", url);
            self.load(&url, false);
        }
    }

    fn save_state(&self) -> Option<Vec<u8>> {
        self.with_history(|history| {
            if history.is_empty() {
                None
            } else {
                history.to_blob().ok()
            }
        })
        .flatten()
    }

    fn restore_state(&mut self, blob: &[u8]) -> bool {
        let restored = match SurfaceHistory::from_blob(blob) {
            Ok(history) => history,
            Err(err) => {
                shell_warn!("saved surface state unreadable: {}", err);
                return false;
            }
        };
        let Some(current) = restored.current().map(str::to_owned) else {
            return false;
        };
        if self.with_history(|history| *history = restored).is_none() {
            return false;
        }

        // Readiness from restored state; no network load is issued.
        let generation = self.next_generation();
        let _ = self.event_tx.send(Envelope {
            generation,
            event: SurfaceEvent::PageFinished { url: current },
        });
        true
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
        if let Some(pending) = self.pending.take() {
            shell_debug!("surface resumed; loading {}", pending.url);
            self.load(&pending.url, pending.record);
        }
    }

    fn release(&mut self) {
        self.stop_loading();
        self.with_history(SurfaceHistory::clear);
        self.released = true;
    }
}

struct CancellableSink {
    tx: mpsc::Sender<Envelope>,
    generation: u64,
    token: CancellationToken,
}

impl ProgressSink for CancellableSink {
    fn emit(&self, event: SurfaceEvent) {
        if !self.token.is_cancelled() {
            let _ = self.tx.send(Envelope {
                generation: self.generation,
                event,
            });
        }
    }
}

async fn run_load(request: LoadRequest) {
    let LoadRequest {
        url,
        record,
        generation,
        token,
        fetcher,
        history,
        event_tx,
    } = request;
    let sink = CancellableSink {
        tx: event_tx.clone(),
        generation,
        token: token.clone(),
    };

    let Some(result) = token.run_until_cancelled(fetcher.fetch(&url, &sink)).await else {
        shell_debug!("load of {} cancelled", url);
        return;
    };
    if token.is_cancelled() {
        return;
    }

    let event = match result {
        Ok(output) => {
            let shown = if output.blocked_redirect.is_some() {
                output.original_url
            } else {
                output.final_url
            };
            if record {
                if let Ok(mut history) = history.lock() {
                    history.push(&shown);
                }
            }
            shell_debug!(
                "loaded {} bytes={} redirects={}",
                shown,
                output.byte_len,
                output.redirect_count
            );
            SurfaceEvent::PageFinished { url: shown }
        }
        Err(err) => SurfaceEvent::ReceivedError(ErrorInfo::main_frame(url, err.to_string())),
    };
    let _ = event_tx.send(Envelope { generation, event });
}
