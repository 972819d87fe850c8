//! Eventboard
//!
//! A backend for publishing events and arbitrating attendance. Initiators
//! draft events, an administrator publishes or rejects them, visitors browse
//! what is published, and participation requests are confirmed or rejected
//! under capacity and moderation rules. Read views join live confirmed
//! counts with view counts from an external stats service.

pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EventboardError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::Services;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
