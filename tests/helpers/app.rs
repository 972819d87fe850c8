//! Spawned application for HTTP suites
//!
//! Binds the real router to an ephemeral port and drives it with reqwest,
//! so the tests cross the same wire a deployment would.

use std::net::SocketAddr;

use eventboard::database::DatabaseService;
use eventboard::handlers;
use eventboard::services::Services;

use super::database_helper::TestDatabase;
use super::stats_mock::StatsMock;
use super::test_settings;

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub db: TestDatabase,
    pub stats: StatsMock,
}

impl TestApp {
    /// Spawn the application, or None when no database is available.
    pub async fn spawn() -> Option<Self> {
        let db = TestDatabase::spin_up().await?;
        db.cleanup().await;
        let stats = StatsMock::start().await;

        let services = Services::new(
            DatabaseService::new(db.pool.clone()),
            test_settings(&stats.uri()),
        )
        .expect("Failed to wire services");
        let app = handlers::router(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Test server stopped");
        });

        Some(Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            db,
            stats,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
