//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{Result, ShopcastError};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(ShopcastError::Config("Bot token is required".to_string()));
    }

    if config.admin_group_id == 0 {
        return Err(ShopcastError::Config(
            "Admin group id is required".to_string(),
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(ShopcastError::Config(
            "Database URL is required".to_string(),
        ));
    }

    if config.max_connections == 0 {
        return Err(ShopcastError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ShopcastError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ShopcastError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "123:abc".to_string();
        settings.bot.admin_group_id = -1001234567890;
        settings
    }

    #[test]
    fn accepts_valid_settings() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn rejects_missing_token() {
        let mut settings = valid_settings();
        settings.bot.token = String::new();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn rejects_missing_admin_group() {
        let mut settings = valid_settings();
        settings.bot.admin_group_id = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
