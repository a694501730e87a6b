//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "FLIPBALL_BACK_CONFIG_PATH";

const DEFAULT_RECENT_EVENTS_WINDOW: usize = 20;
const DEFAULT_TRANSITION_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_COMPLETION_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Number of preceding events handed to the state machine with each new one.
    pub recent_events_window: usize,
    /// Upper bound on a single serialized transition; `0` disables the limit.
    pub transition_timeout_ms: u64,
    /// Buffer size of the completed-game broadcast channel.
    pub completion_channel_capacity: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        recent_events_window = app_config.recent_events_window,
                        transition_timeout_ms = app_config.transition_timeout_ms,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recent_events_window: DEFAULT_RECENT_EVENTS_WINDOW,
            transition_timeout_ms: DEFAULT_TRANSITION_TIMEOUT_MS,
            completion_channel_capacity: DEFAULT_COMPLETION_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
/// Missing keys take their defaults.
struct RawConfig {
    recent_events_window: Option<usize>,
    transition_timeout_ms: Option<u64>,
    completion_channel_capacity: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            // The flip-cup fallback needs at least the preceding event.
            recent_events_window: value
                .recent_events_window
                .unwrap_or(defaults.recent_events_window)
                .max(1),
            transition_timeout_ms: value
                .transition_timeout_ms
                .unwrap_or(defaults.transition_timeout_ms),
            completion_channel_capacity: value
                .completion_channel_capacity
                .unwrap_or(defaults.completion_channel_capacity)
                .max(1),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
