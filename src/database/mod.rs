//! Database module
//!
//! This module handles database connections and operations

pub mod connection;
pub mod repositories;

// Re-export commonly used database components
pub use connection::{create_pool, run_migrations, DatabasePool, MIGRATOR};
pub use repositories::UserRepository;
