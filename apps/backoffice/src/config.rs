//! Backoffice configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, once at startup, and passed down explicitly. Nothing reads
//! the environment after `AppConfig::load` returns.

use serde::{Deserialize, Serialize};
use std::env;

/// Backoffice configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Maximum connections in the database pool
    pub db_max_connections: u32,

    /// Whether the recurring sweep emits reminder notifications
    pub reminders_enabled: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = AppConfig {
            database_path: env::var("PRESSWORK_DB_PATH")
                .unwrap_or_else(|_| "./presswork.db".to_string()),

            db_max_connections: env::var("PRESSWORK_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PRESSWORK_DB_MAX_CONNECTIONS".to_string()))?,

            reminders_enabled: env::var("PRESSWORK_REMINDERS_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PRESSWORK_REMINDERS_ENABLED".to_string()))?,
        };

        if config.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("PRESSWORK_DB_PATH".to_string()));
        }

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "PRESSWORK_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
