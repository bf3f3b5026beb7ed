//! # Mimcal DB
//!
//! Database pool and utilities for the Mimcal API.
//!
//! This crate provides database connection pool initialization using SQLx
//! with PostgreSQL. Schema migrations live in the workspace `migrations/`
//! directory and are applied by the server binary at startup.
//!
//! # Example
//!
//! ```ignore
//! use mimcal_config::DatabaseConfig;
//! use mimcal_db::init_db_pool;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sqlx::Error> {
//!     let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//!     // Use pool for database operations
//!     Ok(())
//! }
//! ```

use mimcal_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;

/// Initializes a PostgreSQL connection pool.
///
/// The returned pool is cheaply cloneable and should be stored in the
/// application state and shared by every request handler.
///
/// # Errors
///
/// Returns [`sqlx::Error::Configuration`] when `DATABASE_URL` is not set, or
/// the connection error when the database cannot be reached.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database pool initialized"
    );

    Ok(pool)
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
