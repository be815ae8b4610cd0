//! Configuration management for the todo application.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The binary calls `dotenvy::dotenv()` first, so a `.env` file works too.
//!
//! | variable | default |
//! |---|---|
//! | `DATABASE_URL` | `sqlite::memory:` |
//! | `DATABASE_MAX_CONNECTIONS` | `5` |
//! | `NETWORK_LATENCY_MS` | `2000` |
//! | `REMOTE_SYNC_MODE` | `background` (or `inline`) |
//! | `STORE_SHUTDOWN_TIMEOUT_SECS` | `5` |

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use taskboard_repository::SyncMode;
use thiserror::Error;

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Local database
    pub database: DatabaseConfig,
    /// Simulated remote
    pub network: NetworkConfig,
    /// Store lifecycle
    pub store: StoreSettings,
}

/// Local `SQLite` configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL
    pub url: String,
    /// Maximum number of connections in the pool (ignored for in-memory URLs)
    pub max_connections: u32,
}

/// Simulated remote configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Latency added to every remote call, in milliseconds
    pub latency_ms: u64,
    /// `background` or `inline`
    pub sync_mode: String,
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 5,
            },
            network: NetworkConfig {
                latency_ms: 2000,
                sync_mode: "background".to_string(),
            },
            store: StoreSettings {
                shutdown_timeout_secs: 5,
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a numeric variable does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a numeric variable does not
    /// parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_var(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                )?,
            },
            network: NetworkConfig {
                latency_ms: parse_var(&lookup, "NETWORK_LATENCY_MS", defaults.network.latency_ms)?,
                sync_mode: lookup("REMOTE_SYNC_MODE")
                    .map(|mode| mode.trim().to_lowercase())
                    .unwrap_or(defaults.network.sync_mode),
            },
            store: StoreSettings {
                shutdown_timeout_secs: parse_var(
                    &lookup,
                    "STORE_SHUTDOWN_TIMEOUT_SECS",
                    defaults.store.shutdown_timeout_secs,
                )?,
            },
        })
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "DATABASE_URL cannot be empty".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "DATABASE_MAX_CONNECTIONS must be > 0".to_string(),
            ));
        }
        self.sync_mode()?;
        Ok(())
    }

    /// Parsed remote mirroring mode
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for anything other than
    /// `background` or `inline`.
    pub fn sync_mode(&self) -> Result<SyncMode, ConfigError> {
        match self.network.sync_mode.as_str() {
            "background" => Ok(SyncMode::Background),
            "inline" => Ok(SyncMode::Inline),
            other => Err(ConfigError::ValidationError(format!(
                "invalid REMOTE_SYNC_MODE: {other}. Must be one of: background, inline"
            ))),
        }
    }

    /// Get network latency as Duration
    #[must_use]
    pub const fn network_latency(&self) -> Duration {
        Duration::from_millis(self.network.latency_ms)
    }

    /// Get shutdown timeout as Duration
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.store.shutdown_timeout_secs)
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}
