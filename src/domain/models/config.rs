//! Application configuration model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for studyfeed.
///
/// Loaded once at startup and shared read-only (`Arc<AppConfig>`) with every
/// component that needs a URL or an interval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    /// Deployment environment name (local, dev, prod)
    #[serde(default = "default_env")]
    pub env: String,

    /// Base URL of the REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL of the push channel; `/ws` is appended on connect
    #[serde(default = "default_ws_base_url")]
    pub ws_base_url: String,

    /// Token exchange endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Fallback credential used only for local/debug deployments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_access_token: Option<String>,

    /// Lookback window for snapshot fetches in seconds (0 = unbounded)
    #[serde(default = "default_lookback_secs")]
    pub lookback_secs: u64,

    /// Interval between reconnect attempts in seconds
    #[serde(default = "default_reconnect_interval_secs")]
    pub reconnect_interval_secs: u64,

    /// Durable token storage
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Live view geometry
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Host prefix baked into the default URLs; see `ConfigLoader::rebase`.
pub const DEFAULT_HTTP_ORIGIN: &str = "http://127.0.0.1:9095";
/// WebSocket counterpart of [`DEFAULT_HTTP_ORIGIN`].
pub const DEFAULT_WS_ORIGIN: &str = "ws://127.0.0.1:9095";

fn default_env() -> String {
    "local".to_string()
}

fn default_api_base_url() -> String {
    format!("{DEFAULT_HTTP_ORIGIN}/api/1")
}

fn default_ws_base_url() -> String {
    format!("{DEFAULT_WS_ORIGIN}/api/1")
}

fn default_token_url() -> String {
    format!("{DEFAULT_HTTP_ORIGIN}/token")
}

const fn default_lookback_secs() -> u64 {
    24 * 60 * 60
}

const fn default_reconnect_interval_secs() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: default_env(),
            api_base_url: default_api_base_url(),
            ws_base_url: default_ws_base_url(),
            token_url: default_token_url(),
            debug_access_token: None,
            lookback_secs: default_lookback_secs(),
            reconnect_interval_secs: default_reconnect_interval_secs(),
            credentials: CredentialsConfig::default(),
            viewport: ViewportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Full URL of the push channel endpoint.
    pub fn ws_endpoint(&self) -> String {
        format!("{}/ws", self.ws_base_url.trim_end_matches('/'))
    }

    /// Snapshot lookback window, `None` when unbounded.
    pub fn lookback(&self) -> Option<Duration> {
        (self.lookback_secs > 0).then(|| Duration::from_secs(self.lookback_secs))
    }

    /// Reconnect interval as a [`Duration`].
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_interval_secs)
    }
}

/// Durable token storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CredentialsConfig {
    /// Path of the token file
    #[serde(default = "default_credentials_path")]
    pub path: PathBuf,

    /// Entry name holding the bearer token
    #[serde(default = "default_credentials_key")]
    pub key: String,
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from(".studyfeed/credentials.json")
}

fn default_credentials_key() -> String {
    "access_token".to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: default_credentials_path(),
            key: default_credentials_key(),
        }
    }
}

/// Live view geometry used to derive the page size
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ViewportConfig {
    /// Available height for rows
    #[serde(default = "default_viewport_height")]
    pub height: u32,

    /// Height of a single row
    #[serde(default = "default_row_height")]
    pub row_height: u32,
}

const fn default_viewport_height() -> u32 {
    20
}

const fn default_row_height() -> u32 {
    1
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            height: default_viewport_height(),
            row_height: default_row_height(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
