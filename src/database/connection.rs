//! Database connection management

use std::str::FromStr;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;
use crate::utils::errors::ShopcastError;

pub type DatabasePool = Pool<Sqlite>;

/// Embedded schema migrations, shared with the integration tests.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, ShopcastError> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    // Test the connection
    sqlx::query("SELECT 1").execute(&pool).await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), ShopcastError> {
    tracing::info!("Running database migrations...");

    MIGRATOR.run(pool).await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
