//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod broadcast;

// Re-export commonly used services
pub use auth::AdminGate;
pub use broadcast::{run_broadcast, BroadcastOutcome, Courier, DeliveryError, TelegramCourier};
