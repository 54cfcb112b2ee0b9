//! Bot handlers module
//!
//! This module contains all Telegram bot handlers organized by type:
//! - Command handlers for bot commands
//! - Callback handlers for inline keyboard interactions
//! - Message handlers for free-text messages

pub mod callbacks;
pub mod commands;
pub mod keyboards;
pub mod messages;
