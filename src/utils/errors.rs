//! Error handling for Shopcast
//!
//! This module defines the main error type used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the Shopcast application
#[derive(Error, Debug)]
pub enum ShopcastError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Shopcast operations
pub type Result<T> = std::result::Result<T, ShopcastError>;
