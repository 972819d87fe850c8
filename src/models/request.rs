//! Participation request model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::time;

/// Status of a participation request. PENDING and CONFIRMED count as
/// active; REJECTED and CANCELED free the requester to file again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "request_status", rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Confirmed,
    Rejected,
    Canceled,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Confirmed => "CONFIRMED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Canceled => "CANCELED",
        };
        write!(f, "{name}")
    }
}

/// Stored participation request row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParticipationRequest {
    pub id: i64,
    pub created: DateTime<Utc>,
    pub event_id: i64,
    pub requester_id: i64,
    pub status: RequestStatus,
}

/// Wire view of a participation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestView {
    pub id: i64,
    #[serde(with = "time::wire_format")]
    pub created: DateTime<Utc>,
    pub event: i64,
    pub requester: i64,
    pub status: RequestStatus,
}

impl From<ParticipationRequest> for RequestView {
    fn from(row: ParticipationRequest) -> Self {
        Self {
            id: row.id,
            created: row.created,
            event: row.event_id,
            requester: row.requester_id,
            status: row.status,
        }
    }
}

/// Owner's batch decision payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub request_ids: Vec<i64>,
    pub status: RequestStatus,
}

/// Outcome of a batch decision, including requests auto-rejected because
/// the confirmation filled the event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResult {
    pub confirmed_requests: Vec<RequestView>,
    pub rejected_requests: Vec<RequestView>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn request_view_uses_wire_field_names() {
        let row = ParticipationRequest {
            id: 5,
            created: Utc.with_ymd_and_hms(2035, 2, 3, 10, 0, 0).unwrap(),
            event_id: 9,
            requester_id: 4,
            status: RequestStatus::Pending,
        };
        let json = serde_json::to_value(RequestView::from(row)).unwrap();
        assert_eq!(json["event"], 9);
        assert_eq!(json["requester"], 4);
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["created"], "2035-02-03 10:00:00");
    }

    #[test]
    fn status_update_parses_camel_case_ids() {
        let update: StatusUpdate =
            serde_json::from_str(r#"{"requestIds": [1, 2, 3], "status": "CONFIRMED"}"#).unwrap();
        assert_eq!(update.request_ids, vec![1, 2, 3]);
        assert_eq!(update.status, RequestStatus::Confirmed);
    }
}
