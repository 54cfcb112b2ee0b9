//! User model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Handle stored and displayed for users without a Telegram username.
/// Never a valid ban target (see `UserRepository::ban_by_username`).
pub const HANDLE_PLACEHOLDER: &str = "no_username";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub city: String,
    pub shop_address: String,
    pub is_banned: bool,
    pub registered_at: NaiveDateTime,
}

impl User {
    /// Handle to display in reports and notifications.
    pub fn handle(&self) -> &str {
        self.username.as_deref().unwrap_or(HANDLE_PLACEHOLDER)
    }
}
