//! User repository implementation

use sqlx::Pool;
use sqlx::Sqlite;

use crate::models::user::{User, HANDLE_PLACEHOLDER};
use crate::utils::errors::ShopcastError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: Pool<Sqlite>,
}

impl UserRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Insert a user, overwriting the prior record on re-registration.
    ///
    /// The ban flag is deliberately left out of the conflict update: a ban
    /// is monotonic and must survive a repeated registration.
    pub async fn upsert(
        &self,
        user_id: i64,
        username: Option<&str>,
        full_name: &str,
        city: &str,
        shop_address: &str,
    ) -> Result<(), ShopcastError> {
        let handle = username.unwrap_or(HANDLE_PLACEHOLDER);

        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, full_name, city, shop_address)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                full_name = excluded.full_name,
                city = excluded.city,
                shop_address = excluded.shop_address,
                registered_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(user_id)
        .bind(handle)
        .bind(full_name)
        .bind(city)
        .bind(shop_address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find a user by Telegram ID
    pub async fn find_by_telegram_id(&self, user_id: i64) -> Result<Option<User>, ShopcastError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, full_name, city, shop_address, is_banned, registered_at \
             FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List all non-banned users
    pub async fn list_active(&self) -> Result<Vec<User>, ShopcastError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT user_id, username, full_name, city, shop_address, is_banned, registered_at \
             FROM users WHERE is_banned = 0",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Count non-banned users
    pub async fn count_active(&self) -> Result<i64, ShopcastError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_banned = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Ban a user by username. Returns true iff a row actually changed:
    /// an unknown or already-banned handle is a no-op returning false.
    ///
    /// The placeholder handle for username-less users is never a valid
    /// target; it would ban every user registered without a username.
    pub async fn ban_by_username(&self, username: &str) -> Result<bool, ShopcastError> {
        let username = username.trim().trim_start_matches('@');

        if username.is_empty() || username == HANDLE_PLACEHOLDER {
            return Ok(false);
        }

        let result = sqlx::query("UPDATE users SET is_banned = 1 WHERE username = ? AND is_banned = 0")
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check whether a user is banned. Unknown users are not banned.
    pub async fn is_banned(&self, user_id: i64) -> Result<bool, ShopcastError> {
        let row: Option<(bool,)> = sqlx::query_as("SELECT is_banned FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(banned,)| banned).unwrap_or(false))
    }
}
