//! Event model
//!
//! Stored rows, lifecycle enums, mutation payloads and read-side views for
//! events. Category, initiator and location live behind plain foreign keys;
//! presentation resolves them through repository lookups.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{Category, GeoPoint, UserShort};
use crate::utils::errors::{EventboardError, Result};
use crate::utils::time;

/// Accepted character-length bounds for the text fields.
pub const TITLE_LEN: RangeInclusive<usize> = 3..=120;
pub const ANNOTATION_LEN: RangeInclusive<usize> = 20..=2000;
pub const DESCRIPTION_LEN: RangeInclusive<usize> = 20..=7000;

/// Lifecycle state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "event_state", rename_all = "UPPERCASE")]
pub enum EventState {
    Pending,
    Published,
    Canceled,
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventState::Pending => "PENDING",
            EventState::Published => "PUBLISHED",
            EventState::Canceled => "CANCELED",
        };
        write!(f, "{name}")
    }
}

/// Review actions available to the event owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerStateAction {
    SendToReview,
    CancelReview,
}

/// Publication decisions available to the administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminStateAction {
    PublishEvent,
    RejectEvent,
}

/// Stored event row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category_id: i64,
    pub initiator_id: i64,
    pub location_id: i64,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    pub created_on: DateTime<Utc>,
    pub published_on: Option<DateTime<Utc>>,
}

/// Payload for creating an event draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category: i64,
    #[serde(with = "time::wire_format")]
    pub event_date: DateTime<Utc>,
    pub location: GeoPoint,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub participant_limit: i32,
    #[serde(default = "default_request_moderation")]
    pub request_moderation: bool,
}

fn default_request_moderation() -> bool {
    true
}

impl NewEvent {
    /// Check text bounds and the participant-limit sign. The lead-time rule
    /// is checked separately against the service clock.
    pub fn validate(&self) -> Result<()> {
        ensure_text_bounds("title", &self.title, TITLE_LEN)?;
        ensure_text_bounds("annotation", &self.annotation, ANNOTATION_LEN)?;
        ensure_text_bounds("description", &self.description, DESCRIPTION_LEN)?;
        ensure_limit_sign(self.participant_limit)?;
        Ok(())
    }
}

/// Field patch shared by the owner and admin update paths. Absent fields
/// leave the event untouched; blank strings are ignored rather than written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub title: Option<String>,
    pub annotation: Option<String>,
    pub description: Option<String>,
    pub category: Option<i64>,
    #[serde(default, with = "time::wire_format_opt")]
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<GeoPoint>,
    pub paid: Option<bool>,
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
}

/// Owner update payload: field patch plus an optional review action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerEventUpdate {
    #[serde(flatten)]
    pub patch: EventPatch,
    pub state_action: Option<OwnerStateAction>,
}

/// Admin update payload: publication decision plus the same field patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEventUpdate {
    #[serde(flatten)]
    pub patch: EventPatch,
    pub state_action: Option<AdminStateAction>,
}

/// Resolved insert payload handed to the event repository.
#[derive(Debug, Clone)]
pub struct NewEventRecord {
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category_id: i64,
    pub initiator_id: i64,
    pub location_id: i64,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
}

/// Full read view of an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFull {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category: Category,
    pub initiator: UserShort,
    pub location: GeoPoint,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    #[serde(with = "time::wire_format")]
    pub created_on: DateTime<Utc>,
    #[serde(default, with = "time::wire_format_opt")]
    pub published_on: Option<DateTime<Utc>>,
    #[serde(with = "time::wire_format")]
    pub event_date: DateTime<Utc>,
    pub confirmed_requests: i64,
    /// Absent on surfaces that do not consult the stats service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<i64>,
}

/// Condensed read view used by listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub category: Category,
    #[serde(with = "time::wire_format")]
    pub event_date: DateTime<Utc>,
    pub initiator: UserShort,
    pub paid: bool,
    pub confirmed_requests: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<i64>,
}

/// Check one text field against its bounds. Character counts, not bytes.
pub(crate) fn ensure_text_bounds(
    field: &str,
    value: &str,
    bounds: RangeInclusive<usize>,
) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EventboardError::InvalidInput(format!(
            "Field '{field}' must not be blank"
        )));
    }
    let len = value.chars().count();
    if !bounds.contains(&len) {
        return Err(EventboardError::InvalidInput(format!(
            "Field '{field}' must be {}..={} characters, got {len}",
            bounds.start(),
            bounds.end()
        )));
    }
    Ok(())
}

/// Participant limits are counts; zero means unlimited.
pub(crate) fn ensure_limit_sign(limit: i32) -> Result<()> {
    if limit < 0 {
        return Err(EventboardError::InvalidInput(
            "Field 'participantLimit' must not be negative".to_string(),
        ));
    }
    Ok(())
}
