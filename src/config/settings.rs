//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// Chat id of the admin group. Membership in this group grants admin
    /// rights; it also receives new-registration notifications.
    pub admin_group_id: i64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the daily-rolling log file. Stdout-only when unset.
    pub file_path: Option<String>,
}

impl Settings {
    /// Load settings from the configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("SHOPCAST").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> crate::utils::errors::Result<()> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_group_id: 0,
            },
            database: DatabaseConfig {
                url: "sqlite://shopcast.db".to_string(),
                max_connections: 5,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
            },
        }
    }
}
