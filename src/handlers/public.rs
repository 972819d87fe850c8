//! Public event surface
//!
//! Anonymous read endpoints. Both record a view hit against the stats
//! service, keyed by the caller's connection address.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::Json;

use crate::handlers::params::PublicSearchParams;
use crate::handlers::AppState;
use crate::models::event::{EventFull, EventSummary};
use crate::utils::errors::Result;

/// `GET /events`
pub async fn search_events(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(params): Query<PublicSearchParams>,
) -> Result<Json<Vec<EventSummary>>> {
    let query = params.into_query()?;
    let events = state
        .services
        .events
        .search_public(query, addr.ip().to_string())
        .await?;
    Ok(Json(events))
}

/// `GET /events/{eventId}`
pub async fn event_by_id(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventFull>> {
    let event = state
        .services
        .events
        .published_by_id(event_id, addr.ip().to_string())
        .await?;
    Ok(Json(event))
}
