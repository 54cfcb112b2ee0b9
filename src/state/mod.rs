//! Conversation state module
//!
//! This module tracks per-user conversation state: which flow a user is in
//! and the values captured so far.

pub mod flow;
pub mod store;

// Re-export commonly used state components
pub use flow::{BroadcastState, ConversationState, RegistrationState};
pub use store::SessionStore;
