//! Database service layer
//!
//! Bundles the repositories behind one handle that the domain services
//! share, together with transaction access to the underlying pool.

use sqlx::{Postgres, Transaction};

use crate::database::{
    connection, CategoryRepository, DatabasePool, EventRepository, LocationRepository,
    RequestRepository, UserRepository,
};
use crate::utils::errors::EventboardError;

#[derive(Clone)]
pub struct DatabaseService {
    pub pool: DatabasePool,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub locations: LocationRepository,
    pub events: EventRepository,
    pub requests: RequestRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            locations: LocationRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            requests: RequestRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open a transaction on the shared pool.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, EventboardError> {
        Ok(self.pool.begin().await?)
    }

    /// Ping the database.
    pub async fn health_check(&self) -> Result<(), EventboardError> {
        connection::health_check(&self.pool).await
    }
}
