//! Database configuration loading from file and environment variables.

use serde::Deserialize;
use thiserror::Error;

use crate::pool::DbRuntimeSettings;

/// Top-level configuration for the data-access layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,

    /// Busy timeout for SQLite connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Deadline for a single query operation, in milliseconds.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl DatabaseConfig {
    /// Returns the pool tunables carried by this configuration.
    pub fn runtime_settings(&self) -> DbRuntimeSettings {
        DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            pool_max_size: self.pool_max_size,
        }
    }
}

fn default_db_path() -> String {
    "roost.db".to_string()
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_query_timeout_ms() -> u64 {
    5_000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            pool_max_size: default_pool_max_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// A missing file is not an error; defaults apply. Environment variable
/// overrides, applied after the file:
/// - `ROOST_DB_PATH` overrides `database.path`
/// - `ROOST_DB_POOL_MAX_SIZE` overrides `database.pool_max_size`
/// - `ROOST_DB_BUSY_TIMEOUT_MS` overrides `database.busy_timeout_ms`
/// - `ROOST_DB_QUERY_TIMEOUT_MS` overrides `database.query_timeout_ms`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    if let Ok(db_path) = std::env::var("ROOST_DB_PATH") {
        config.database.path = db_path;
    }
    if let Ok(size) = std::env::var("ROOST_DB_POOL_MAX_SIZE") {
        if let Ok(parsed) = size.parse() {
            config.database.pool_max_size = parsed;
        }
    }
    if let Ok(timeout) = std::env::var("ROOST_DB_BUSY_TIMEOUT_MS") {
        if let Ok(parsed) = timeout.parse() {
            config.database.busy_timeout_ms = parsed;
        }
    }
    if let Ok(timeout) = std::env::var("ROOST_DB_QUERY_TIMEOUT_MS") {
        if let Ok(parsed) = timeout.parse() {
            config.database.query_timeout_ms = parsed;
        }
    }

    Ok(config)
}
