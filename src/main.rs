//! Eventboard server
//!
//! Main application entry point

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{error, info};

use eventboard::config::Settings;
use eventboard::database::{connection, DatabaseService};
use eventboard::handlers;
use eventboard::services::Services;
use eventboard::utils::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file appender on drop
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting eventboard v{}...", eventboard::VERSION);

    // Initialize database connection
    info!("Connecting to database...");
    let pool = connection::create_pool(&settings.database).await?;

    // Run database migrations
    info!("Running database migrations...");
    connection::run_migrations(&pool).await?;

    let database_service = DatabaseService::new(pool);

    // Initialize services
    info!("Initializing services...");
    let services = Services::new(database_service, settings.clone())?;

    let app = handlers::router(services);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Eventboard is listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Eventboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
