//! Services module
//!
//! This module contains business logic services

pub mod event;
pub mod presenter;
pub mod request;
pub mod stats;

// Re-export commonly used services
pub use event::{AdminSearch, EventService, PublicSearch};
pub use presenter::EventPresenter;
pub use request::RequestService;
pub use stats::{EndpointHit, StatsClient, ViewStats};

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory wiring the services to the database and the stats client
#[derive(Clone)]
pub struct Services {
    pub events: EventService,
    pub requests: RequestService,
    db: DatabaseService,
}

impl Services {
    /// Create all services from one database handle and the settings
    pub fn new(db: DatabaseService, settings: Settings) -> Result<Self> {
        let stats = StatsClient::new(settings)?;
        let presenter = EventPresenter::new(db.clone(), stats.clone());
        let events = EventService::new(db.clone(), presenter, stats);
        let requests = RequestService::new(db.clone());

        Ok(Self {
            events,
            requests,
            db,
        })
    }

    /// Liveness check used by the health endpoint
    pub async fn health_check(&self) -> Result<()> {
        self.db.health_check().await
    }
}
