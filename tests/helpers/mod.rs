//! Shared test infrastructure
//!
//! Database provisioning, raw fixture inserts, a wiremock double for the
//! stats service, and a spawned application for HTTP suites.

#![allow(dead_code)]

pub mod app;
pub mod database_helper;
pub mod fixtures;
pub mod stats_mock;

pub use app::TestApp;
pub use database_helper::TestDatabase;
pub use stats_mock::StatsMock;

use eventboard::config::Settings;
use eventboard::database::DatabaseService;
use eventboard::services::Services;

/// Database, stats double and wired services for service-level suites.
pub struct TestContext {
    pub db: TestDatabase,
    pub stats: StatsMock,
    pub services: Services,
}

impl TestContext {
    /// Provision everything, or None when no database is available so the
    /// calling test can skip.
    pub async fn new() -> Option<Self> {
        let db = TestDatabase::spin_up().await?;
        db.cleanup().await;
        let stats = StatsMock::start().await;
        let services = Services::new(
            DatabaseService::new(db.pool.clone()),
            test_settings(&stats.uri()),
        )
        .expect("Failed to wire services");
        Some(Self { db, stats, services })
    }
}

/// Settings pointed at the given stats double.
pub fn test_settings(stats_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.stats.base_url = stats_url.to_string();
    settings.stats.app_name = "eventboard-test".to_string();
    settings.stats.timeout_seconds = 2;
    settings.stats.fail_open = true;
    settings
}
