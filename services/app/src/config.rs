//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
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
pub struct Config {
    /// Base URL of the portal, e.g. `https://portal.example.com`.
    pub portal_url: String,
    /// Token-auth pair sent as `Authorization: token {key}:{secret}`.
    pub api_key: String,
    pub api_secret: String,
    /// Where the cached identity snapshot lives on disk.
    pub credential_store_path: PathBuf,
    pub log_level: Level,
    /// Applied to every directory request. The original client had no
    /// timeout at all; a hung request left its spinner up forever.
    pub http_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let portal_url = std::env::var("PORTAL_URL")
            .map_err(|_| ConfigError::MissingVar("PORTAL_URL".to_string()))?;
        let api_key = std::env::var("PORTAL_API_KEY")
            .map_err(|_| ConfigError::MissingVar("PORTAL_API_KEY".to_string()))?;
        let api_secret = std::env::var("PORTAL_API_SECRET")
            .map_err(|_| ConfigError::MissingVar("PORTAL_API_SECRET".to_string()))?;

        let credential_store_path = std::env::var("CREDENTIAL_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./credentials.json"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let timeout_secs = match std::env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "HTTP_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a number of seconds", raw),
                )
            })?,
            Err(_) => 30,
        };

        Ok(Self {
            portal_url,
            api_key,
            api_secret,
            credential_store_path,
            log_level,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
