//! Environment-driven configuration.
//!
//! Values are read through a lookup function so tests can supply them
//! without touching the process environment.

use crate::task::adapters::postgres::{PostgresTaskStore, TaskPgPool};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::env;
use thiserror::Error;
use tracing::Level;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "TASKTRAIL_DATABASE_URL";
/// Environment variable holding the maximum pool size.
pub const POOL_SIZE_VAR: &str = "TASKTRAIL_POOL_SIZE";
/// Environment variable holding the default log level.
pub const LOG_LEVEL_VAR: &str = "TASKTRAIL_LOG_LEVEL";
/// Environment variable enabling JSON log output.
pub const LOG_JSON_VAR: &str = "TASKTRAIL_LOG_JSON";

const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while loading configuration or building resources from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable holds a value that cannot be parsed.
    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

/// Settings for the `PostgreSQL` task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Connection URL.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_pool_size: u32,
}

impl StoreConfig {
    /// Loads the store settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the database URL is unset and
    /// [`ConfigError::Invalid`] for a non-numeric or zero pool size.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads the store settings through `lookup`.
    ///
    /// # Errors
    ///
    /// As [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
        let max_pool_size = match lookup(POOL_SIZE_VAR) {
            Some(raw) => parse_pool_size(&raw)?,
            None => DEFAULT_POOL_SIZE,
        };
        Ok(Self {
            database_url,
            max_pool_size,
        })
    }

    /// Builds a connection pool for these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the pool cannot establish its
    /// initial connections.
    pub fn build_pool(&self) -> Result<TaskPgPool, ConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(&self.database_url);
        Ok(Pool::builder()
            .max_size(self.max_pool_size)
            .build(manager)?)
    }

    /// Builds a `PostgreSQL` task store for these settings.
    ///
    /// # Errors
    ///
    /// As [`Self::build_pool`].
    pub fn build_store(&self) -> Result<PostgresTaskStore, ConfigError> {
        Ok(PostgresTaskStore::new(self.build_pool()?))
    }
}

fn parse_pool_size(raw: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: POOL_SIZE_VAR,
        value: raw.to_owned(),
        reason,
    };
    let size = raw
        .trim()
        .parse::<u32>()
        .map_err(|err| invalid(err.to_string()))?;
    if size == 0 {
        return Err(invalid("pool size must be positive".to_owned()));
    }
    Ok(size)
}

/// Settings for structured logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Default log level. Overridden by `RUST_LOG`.
    pub log_level: Level,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Loads logging settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown level or a
    /// non-boolean JSON flag.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads logging settings through `lookup`.
    ///
    /// # Errors
    ///
    /// As [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(raw) => raw.trim().parse::<Level>().map_err(|err| ConfigError::Invalid {
                name: LOG_LEVEL_VAR,
                value: raw.clone(),
                reason: err.to_string(),
            })?,
            None => defaults.log_level,
        };
        let json = match lookup(LOG_JSON_VAR) {
            Some(raw) => parse_flag(LOG_JSON_VAR, &raw)?,
            None => defaults.json,
        };
        Ok(Self { log_level, json })
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_owned(),
            reason: "expected a boolean".to_owned(),
        }),
    }
}
