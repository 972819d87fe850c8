//! Participation request surface
//!
//! Requesters file and cancel their own requests; event owners read and
//! decide the requests filed against their events.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::handlers::AppState;
use crate::models::request::{RequestView, StatusUpdate, StatusUpdateResult};
use crate::utils::errors::Result;

/// `POST /users/{userId}/events/{eventId}/requests`
pub async fn create(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<(StatusCode, Json<RequestView>)> {
    let request = state.services.requests.create(user_id, event_id).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// `GET /users/{userId}/events/{eventId}/requests`
pub async fn by_event(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<RequestView>>> {
    let requests = state
        .services
        .requests
        .by_event_owner(user_id, event_id)
        .await?;
    Ok(Json(requests))
}

/// `PATCH /users/{userId}/events/{eventId}/requests`
pub async fn update_statuses(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<StatusUpdateResult>> {
    let result = state
        .services
        .requests
        .update_statuses(user_id, event_id, update)
        .await?;
    Ok(Json(result))
}

/// `GET /users/{userId}/requests`
pub async fn by_requester(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<RequestView>>> {
    let requests = state.services.requests.by_requester(user_id).await?;
    Ok(Json(requests))
}

/// `PATCH /users/{userId}/requests/{requestId}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    Path((user_id, request_id)): Path<(i64, i64)>,
) -> Result<Json<RequestView>> {
    let request = state.services.requests.cancel(user_id, request_id).await?;
    Ok(Json(request))
}
