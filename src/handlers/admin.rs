//! Admin moderation surface
//!
//! Unrestricted event search and the publish/reject decision. Admin reads
//! are never counted as views, though the search still reports view counts.

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::handlers::params::AdminSearchParams;
use crate::handlers::AppState;
use crate::models::event::{AdminEventUpdate, EventFull};
use crate::utils::errors::Result;

/// `GET /admin/events`
pub async fn search_events(
    State(state): State<AppState>,
    Query(params): Query<AdminSearchParams>,
) -> Result<Json<Vec<EventFull>>> {
    let query = params.into_query()?;
    let events = state.services.events.search_admin(query).await?;
    Ok(Json(events))
}

/// `PATCH /admin/events/{eventId}`
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(update): Json<AdminEventUpdate>,
) -> Result<Json<EventFull>> {
    let event = state
        .services
        .events
        .update_by_admin(event_id, update)
        .await?;
    Ok(Json(event))
}
