//! Database module for Lunchly
//!
//! Customer and reservation models, the repositories that read and write
//! them, and helpers for building the connection pool and running
//! migrations.

pub mod models;
pub mod operations;

pub use models::{Customer, Reservation, TopCustomer};
pub use operations::{CustomerRepository, ReservationRepository, ReservationSource, TOP_CUSTOMERS_LIMIT};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::error::{AppError, DatabaseError};
use crate::Result;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| AppError::DatabaseError(DatabaseError::ConnectionError(e)))
}

/// Apply the embedded `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
