//! Data models module

pub mod user;

pub use user::{User, HANDLE_PLACEHOLDER};
