//! Owner event surface
//!
//! An initiator's own events: drafting, reading back and updating. These
//! views never carry view counts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::handlers::params::PageParams;
use crate::handlers::AppState;
use crate::models::event::{EventFull, EventSummary, NewEvent, OwnerEventUpdate};
use crate::utils::errors::Result;

/// `POST /users/{userId}/events`
pub async fn add_event(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(draft): Json<NewEvent>,
) -> Result<(StatusCode, Json<EventFull>)> {
    let event = state.services.events.add_event(user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /users/{userId}/events`
pub async fn list_events(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<EventSummary>>> {
    let page = params.into_page()?;
    let events = state.services.events.events_by_owner(user_id, page).await?;
    Ok(Json(events))
}

/// `GET /users/{userId}/events/{eventId}`
pub async fn event_by_id(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<EventFull>> {
    let event = state
        .services
        .events
        .event_by_owner(user_id, event_id)
        .await?;
    Ok(Json(event))
}

/// `PATCH /users/{userId}/events/{eventId}`
pub async fn update_event(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    Json(update): Json<OwnerEventUpdate>,
) -> Result<Json<EventFull>> {
    let event = state
        .services
        .events
        .update_by_owner(user_id, event_id, update)
        .await?;
    Ok(Json(event))
}
