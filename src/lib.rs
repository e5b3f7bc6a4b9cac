pub mod config;
pub mod db;
pub mod error;
pub mod telemetry;

use std::sync::Arc;
use sqlx::PgPool;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use db::{Customer, CustomerRepository, Reservation, ReservationRepository, ReservationSource, TopCustomer};

/// Application state shared with the web front-end's handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db_pool: Arc<PgPool>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let db_pool = db::create_pool(&config.database).await?;

        Ok(Self {
            config: Arc::new(config),
            db_pool: Arc::new(db_pool),
        })
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.db_pool.clone())
    }

    pub fn reservations(&self) -> ReservationRepository {
        ReservationRepository::new(self.db_pool.clone())
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.db_pool.close().await;
        Ok(())
    }
}
