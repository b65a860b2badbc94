pub mod app_config;
pub mod database;
pub mod flight_repo;
pub mod seed;
pub mod user_repo;

use std::sync::Arc;

use skyfare_core::repository::{
    FlightRepository, MemoryFlightRepository, MemoryUserRepository, UserRepository,
};
use tracing::info;

use app_config::{DatabaseBackend, DatabaseConfig};
pub use database::DbClient;
pub use flight_repo::PostgresFlightRepository;
pub use user_repo::PostgresUserRepository;

/// The pair of repositories the services run on.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub flights: Arc<dyn FlightRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
            flights: Arc::new(MemoryFlightRepository::new()),
        }
    }

    /// Opens the configured backend; Postgres is migrated before use.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        match config.backend {
            DatabaseBackend::Memory => {
                info!("Using in-memory store; data is lost on shutdown");
                Ok(Self::in_memory())
            }
            DatabaseBackend::Postgres => {
                let db = DbClient::new(config).await?;
                db.migrate().await?;
                Ok(Self {
                    users: Arc::new(PostgresUserRepository::new(db.pool.clone())),
                    flights: Arc::new(PostgresFlightRepository::new(db.pool)),
                })
            }
        }
    }
}
