//! HTTP handlers module
//!
//! This module contains all HTTP handlers organized by surface:
//! - Public handlers for the anonymous read side
//! - Owner handlers for an initiator's own events
//! - Request handlers for participation requests
//! - Admin handlers for moderation

pub mod admin;
pub mod owner;
pub mod params;
pub mod public;
pub mod requests;

use axum::extract::State;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::json;

use crate::services::Services;
use crate::utils::errors::Result;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

/// Build the application router over the full endpoint surface.
pub fn router(services: Services) -> Router {
    let state = AppState { services };
    Router::new()
        .route("/events", get(public::search_events))
        .route("/events/:event_id", get(public::event_by_id))
        .route(
            "/users/:user_id/events",
            get(owner::list_events).post(owner::add_event),
        )
        .route(
            "/users/:user_id/events/:event_id",
            get(owner::event_by_id).patch(owner::update_event),
        )
        .route(
            "/users/:user_id/events/:event_id/requests",
            get(requests::by_event)
                .post(requests::create)
                .patch(requests::update_statuses),
        )
        .route("/users/:user_id/requests", get(requests::by_requester))
        .route(
            "/users/:user_id/requests/:request_id/cancel",
            patch(requests::cancel),
        )
        .route("/admin/events", get(admin::search_events))
        .route("/admin/events/:event_id", patch(admin::update_event))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Liveness probe with a database ping behind it.
async fn healthz(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    state.services.health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}
