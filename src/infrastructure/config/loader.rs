//! Layered configuration loading and validation.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;
use url::Url;

use crate::domain::models::config::{AppConfig, DEFAULT_HTTP_ORIGIN, DEFAULT_WS_ORIGIN};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A URL field does not parse.
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl {
        /// Config key.
        field: &'static str,
        /// Rejected value.
        value: String,
    },

    /// A URL field uses the wrong scheme.
    #[error("Invalid scheme for {field}: {value}. Must be one of: {expected}")]
    InvalidScheme {
        /// Config key.
        field: &'static str,
        /// Rejected value.
        value: String,
        /// Accepted schemes.
        expected: &'static str,
    },

    /// Reconnect interval must be positive.
    #[error("Invalid reconnect_interval_secs: 0. Must be at least 1")]
    ZeroReconnectInterval,

    /// Row height must be positive.
    #[error("Invalid viewport row_height: 0. Must be at least 1")]
    ZeroRowHeight,

    /// Credentials key is empty.
    #[error("Credentials key cannot be empty")]
    EmptyCredentialsKey,

    /// Unknown log level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown log format.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// Value passed to `--server` is not a bare origin.
    #[error("Invalid server origin: {0}. Expected http(s)://host[:port]")]
    InvalidOrigin(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .studyfeed/config.yaml (project config)
    /// 3. .studyfeed/local.yaml (local overrides, optional)
    /// 4. Environment variables (STUDYFEED_* prefix, `__` for nesting)
    pub fn load() -> Result<AppConfig> {
        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Yaml::file(".studyfeed/config.yaml"))
            .merge(Yaml::file(".studyfeed/local.yaml"))
            .merge(Env::prefixed("STUDYFEED_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file; environment still wins.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file {} does not exist", path.display());
        }

        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("STUDYFEED_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Point the default local endpoints at another server.
    ///
    /// Only URLs still carrying the built-in `127.0.0.1:9095` origin are
    /// rewritten; explicitly configured URLs are left alone. `https` maps the
    /// push channel to `wss`.
    pub fn rebase(mut config: AppConfig, origin: &str) -> Result<AppConfig, ConfigError> {
        let parsed = Url::parse(origin).map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))?;
        let ws_scheme = match parsed.scheme() {
            "http" => "ws",
            "https" => "wss",
            _ => return Err(ConfigError::InvalidOrigin(origin.to_string())),
        };
        let Some(host) = parsed.host_str() else {
            return Err(ConfigError::InvalidOrigin(origin.to_string()));
        };
        let authority = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let http_origin = format!("{}://{authority}", parsed.scheme());
        let ws_origin = format!("{ws_scheme}://{authority}");

        for url in [&mut config.api_base_url, &mut config.token_url] {
            if let Some(rest) = url.strip_prefix(DEFAULT_HTTP_ORIGIN) {
                *url = format!("{http_origin}{rest}");
            }
        }
        if let Some(rest) = config.ws_base_url.strip_prefix(DEFAULT_WS_ORIGIN) {
            config.ws_base_url = format!("{ws_origin}{rest}");
        }

        tracing::debug!(origin = %http_origin, "configuration rebased");
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
        check_url("api_base_url", &config.api_base_url, &["http", "https"], "http, https")?;
        check_url("token_url", &config.token_url, &["http", "https"], "http, https")?;
        check_url("ws_base_url", &config.ws_base_url, &["ws", "wss"], "ws, wss")?;

        if config.reconnect_interval_secs == 0 {
            return Err(ConfigError::ZeroReconnectInterval);
        }

        if config.viewport.row_height == 0 {
            return Err(ConfigError::ZeroRowHeight);
        }

        if config.credentials.key.is_empty() {
            return Err(ConfigError::EmptyCredentialsKey);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

fn check_url(
    field: &'static str,
    value: &str,
    schemes: &[&str],
    expected: &'static str,
) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::InvalidScheme {
            field,
            value: value.to_string(),
            expected,
        });
    }
    Ok(())
}
