use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use webshell_core::CacheMode;
use webshell_logging::shell_debug;

use crate::{FailureKind, FetchError, FetchOutput, SurfaceEvent, MAX_REDIRECTS};

/// Decides whether a redirect hop may be followed.
pub type NavigationHandler = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub cache_mode: CacheMode,
    pub user_agent: Option<String>,
    pub navigation_handler: NavigationHandler,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            redirect_limit: MAX_REDIRECTS,
            cache_mode: CacheMode::NoCache,
            user_agent: None,
            navigation_handler: Arc::new(|_| true),
        }
    }
}

impl std::fmt::Debug for FetchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchSettings")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("redirect_limit", &self.redirect_limit)
            .field("cache_mode", &self.cache_mode)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: SurfaceEvent);
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, sink: &dyn ProgressSink) -> Result<FetchOutput, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(
        &self,
        redirect_counter: Arc<AtomicUsize>,
        blocked: Arc<Mutex<Option<String>>>,
    ) -> Result<reqwest::Client, FetchError> {
        let redirect_limit = self.settings.redirect_limit;
        let allow = self.settings.navigation_handler.clone();
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if !allow(attempt.url().as_str()) {
                if let Ok(mut slot) = blocked.lock() {
                    *slot = Some(attempt.url().to_string());
                }
                attempt.stop()
            } else if count > redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(policy)
            .default_headers(self.default_headers());
        if let Some(agent) = &self.settings.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if self.settings.cache_mode == CacheMode::NoCache {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        }
        headers
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, sink: &dyn ProgressSink) -> Result<FetchOutput, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let redirect_counter = Arc::new(AtomicUsize::new(0));
        let blocked = Arc::new(Mutex::new(None));
        let client = self.build_client(redirect_counter.clone(), blocked.clone())?;

        let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;

        let blocked_redirect = blocked.lock().ok().and_then(|mut slot| slot.take());
        if let Some(target) = &blocked_redirect {
            shell_debug!("redirect from {} to {} refused", url, target);
        } else if response.status().is_client_error() || response.status().is_server_error() {
            let status = response.status();
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let expected = response.content_length().filter(|len| *len > 0);

        let mut received: u64 = 0;
        let mut last_percent = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            received += chunk.len() as u64;
            if let Some(total) = expected {
                let percent = (received.min(total) * 100 / total) as i32;
                if percent > last_percent {
                    last_percent = percent;
                    sink.emit(SurfaceEvent::Progress(percent));
                }
            }
        }
        if last_percent < 100 {
            sink.emit(SurfaceEvent::Progress(100));
        }

        Ok(FetchOutput {
            original_url: url.to_string(),
            final_url,
            redirect_count: redirect_counter.load(Ordering::Relaxed),
            content_type,
            byte_len: received,
            blocked_redirect,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
