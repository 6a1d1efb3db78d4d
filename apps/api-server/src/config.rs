//! Application configuration loaded from environment variables.

use std::env;

use thiserror::Error;

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConfig;

/// Configuration errors. Any of these aborts startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Bring the schema up to date before serving.
    pub run_migrations: bool,
    #[cfg(feature = "postgres")]
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        #[cfg(feature = "postgres")]
        let database = DatabaseConfig {
            url: lookup("DATABASE_URL")
                .filter(|url| !url.is_empty())
                .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", 1)?,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            #[cfg(feature = "postgres")]
            database,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
