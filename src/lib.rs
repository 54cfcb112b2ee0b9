//! Shopcast Telegram Bot
//!
//! A Telegram bot that registers retailers through a three-step
//! conversational form, lets a designated admin group broadcast a staged
//! message to every registered non-banned user with per-recipient delivery
//! reporting, and lets admins ban users by handle.

pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{Result, ShopcastError};

pub use database::UserRepository;
pub use services::{AdminGate, BroadcastOutcome};
pub use state::{ConversationState, SessionStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
