use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use webshell_core::{ControllerConfig, NavigationPolicy, SurfaceSettings, DEFAULT_TIMEOUT};
use webshell_engine::FetchSettings;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "webshell.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub target_url: String,
    pub timeout_ms: u64,
    pub state_path: PathBuf,
    pub log_destination: LogDestination,
    pub verbose: bool,
    pub surface: SurfaceSettings,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            target_url: "https://example.com/".to_string(),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            state_path: PathBuf::from(".webshell_state.ron"),
            log_destination: LogDestination::default(),
            verbose: false,
            surface: SurfaceSettings::default(),
        }
    }
}

impl ShellConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        let config: ShellConfig = ron::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !NavigationPolicy::new().decide(&self.target_url).is_allow() {
            bail!("target_url must be an http(s) URL, got {:?}", self.target_url);
        }
        if self.timeout_ms == 0 {
            bail!("timeout_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            target_url: self.target_url.clone(),
            timeout: self.timeout(),
            surface: self.surface.clone(),
        }
    }

    /// Redirect hops are held to the same policy as in-surface navigation.
    pub fn fetch_settings(&self) -> FetchSettings {
        let policy = NavigationPolicy::new();
        FetchSettings {
            cache_mode: self.surface.cache_mode,
            user_agent: self.surface.user_agent.clone(),
            navigation_handler: std::sync::Arc::new(move |url: &str| policy.decide(url).is_allow()),
            ..FetchSettings::default()
        }
    }
}
