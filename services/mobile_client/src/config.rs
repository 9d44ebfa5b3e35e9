//! services/mobile_client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub log_level: Level,
    /// Response bound for ordinary interactive calls.
    pub request_timeout: Duration,
    /// Response bound for calls that may hit a dormant backend.
    pub cold_start_timeout: Duration,
    /// Delay before the single automatic retry after a cold start.
    pub cold_start_retry_delay: Duration,
    /// How long each "thinking" phase is shown.
    pub progress_interval: Duration,
    pub token_path: PathBuf,
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to keep tests hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Backend endpoint ---
        let api_base_url = lookup("COACH_API_BASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("COACH_API_BASE_URL".to_string()))?;
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "COACH_API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Timing ---
        let request_timeout =
            Duration::from_secs(parse_u64(&lookup, "COACH_REQUEST_TIMEOUT_SECS", 15)?);
        let cold_start_timeout =
            Duration::from_secs(parse_u64(&lookup, "COACH_COLD_START_TIMEOUT_SECS", 70)?);
        let cold_start_retry_delay =
            Duration::from_secs(parse_u64(&lookup, "COACH_COLD_START_RETRY_DELAY_SECS", 60)?);
        let progress_interval =
            Duration::from_millis(parse_u64(&lookup, "COACH_PROGRESS_INTERVAL_MS", 2000)?);

        if cold_start_timeout <= request_timeout {
            return Err(ConfigError::InvalidValue(
                "COACH_COLD_START_TIMEOUT_SECS".to_string(),
                "must be larger than COACH_REQUEST_TIMEOUT_SECS".to_string(),
            ));
        }
        if progress_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "COACH_PROGRESS_INTERVAL_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        // --- Token storage ---
        let token_path = match lookup("COACH_TOKEN_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_token_path()?,
        };

        Ok(Self {
            api_base_url,
            log_level,
            request_timeout,
            cold_start_timeout,
            cold_start_retry_delay,
            progress_interval,
            token_path,
        })
    }
}

fn parse_u64<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
    }
}

fn default_token_path() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("coach").join("session.json"))
        .ok_or_else(|| ConfigError::MissingVar("COACH_TOKEN_PATH".to_string()))
}
