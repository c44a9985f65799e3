//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//! - `STOREGATE_DB_PATH` - SQLite database file (default: in-memory store)
//! - `STOREGATE_BUSY_TIMEOUT_MS` - lock wait before the store reports busy (default: 5000)
//! - `STOREGATE_LOG_LEVEL` - `trace|debug|info|warn|error` (default: build-mode level)
//! - `STOREGATE_LOG_DIR` - absolute directory for rolling log files (default: logging off)

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "STOREGATE_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "STOREGATE_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "STOREGATE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "STOREGATE_LOG_DIR";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidEnvVar { key: String, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEnvVar { key, message } => {
                write!(f, "invalid environment variable {key}: {message}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Connection and logging settings for one store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. `None` opens an in-memory store.
    pub database_path: Option<PathBuf>,
    pub busy_timeout_ms: u64,
    pub log_level: String,
    /// Rolling log directory. `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    /// Returns `ConfigError` when a set variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Unset or blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let busy_timeout_ms = match get(ENV_BUSY_TIMEOUT_MS) {
            Some(value) => value
                .parse::<u64>()
                .map_err(|err| ConfigError::InvalidEnvVar {
                    key: ENV_BUSY_TIMEOUT_MS.to_string(),
                    message: err.to_string(),
                })?,
            None => defaults.busy_timeout_ms,
        };

        Ok(Self {
            database_path: get(ENV_DB_PATH).map(PathBuf::from),
            busy_timeout_ms,
            log_level: get(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}
