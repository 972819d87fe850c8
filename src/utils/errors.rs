//! Error handling for eventboard
//!
//! This module defines the main error type used throughout the application,
//! the stats-client error type, and the HTTP rendering of errors into the
//! wire error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::utils::time;

/// Main error type for eventboard operations
#[derive(Error, Debug)]
pub enum EventboardError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Stats service error: {0}")]
    Stats(#[from] StatsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("User with id={user_id} was not found")]
    UserNotFound { user_id: i64 },

    #[error("Category with id={category_id} was not found")]
    CategoryNotFound { category_id: i64 },

    #[error("Event with id={event_id} was not found")]
    EventNotFound { event_id: i64 },

    #[error("Request with id={request_id} was not found")]
    RequestNotFound { request_id: i64 },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Stats service client errors
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Stats request failed: {0}")]
    RequestFailed(String),

    #[error("Stats request timed out")]
    Timeout,

    #[error("Invalid stats response: {0}")]
    InvalidResponse(String),

    #[error("Stats service unavailable")]
    ServiceUnavailable,
}

/// Result type alias for eventboard operations
pub type Result<T> = std::result::Result<T, EventboardError>;

/// Result type alias for stats client operations
pub type StatsResult<T> = std::result::Result<T, StatsError>;

/// Wire shape of an error reply.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: String,
    pub reason: String,
    pub message: String,
    pub timestamp: String,
}

impl EventboardError {
    /// HTTP status this error travels as. State-machine violations share 409
    /// with constraint conflicts.
    pub fn status_code(&self) -> StatusCode {
        match self {
            EventboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EventboardError::UserNotFound { .. }
            | EventboardError::CategoryNotFound { .. }
            | EventboardError::EventNotFound { .. }
            | EventboardError::RequestNotFound { .. } => StatusCode::NOT_FOUND,
            EventboardError::Forbidden(_) | EventboardError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status label carried in the body. Forbidden keeps its own label even
    /// though it travels as HTTP 409.
    fn status_label(&self) -> &'static str {
        match self {
            EventboardError::InvalidInput(_) => "BAD_REQUEST",
            EventboardError::UserNotFound { .. }
            | EventboardError::CategoryNotFound { .. }
            | EventboardError::EventNotFound { .. }
            | EventboardError::RequestNotFound { .. } => "NOT_FOUND",
            EventboardError::Forbidden(_) => "FORBIDDEN",
            EventboardError::Conflict(_) => "CONFLICT",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            EventboardError::InvalidInput(_) => "Incorrect request.",
            EventboardError::UserNotFound { .. }
            | EventboardError::CategoryNotFound { .. }
            | EventboardError::EventNotFound { .. }
            | EventboardError::RequestNotFound { .. } => "Object not found.",
            EventboardError::Forbidden(_) => "Operation forbidden.",
            EventboardError::Conflict(_) => "Constraints violation.",
            _ => "Unexpected error.",
        }
    }

    /// Build the wire body for this error.
    pub fn to_api_error(&self) -> ApiError {
        ApiError {
            status: self.status_label().to_string(),
            reason: self.reason().to_string(),
            message: self.to_string(),
            timestamp: time::format_datetime(&Utc::now()),
        }
    }
}

impl IntoResponse for EventboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(error = %self, status = %status, "Request rejected");
        }
        (status, Json(self.to_api_error())).into_response()
    }
}

/// Map a unique-constraint violation (SQLSTATE 23505) to a domain conflict,
/// passing every other database error through unchanged.
pub fn map_unique_violation(err: sqlx::Error, message: &str) -> EventboardError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            EventboardError::Conflict(message.to_string())
        }
        _ => EventboardError::Database(err),
    }
}
