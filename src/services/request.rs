//! Participation request service
//!
//! Arbitrates who attends: filing requests against capacity and moderation
//! rules, the owner's batch confirm/reject decisions, and the requester's
//! own cancel and listing surface. The decision rules are pure functions;
//! the service runs them under a lock on the event row so two concurrent
//! requests cannot both take the last seat.

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::event::{Event, EventState};
use crate::models::request::{
    ParticipationRequest, RequestStatus, RequestView, StatusUpdate, StatusUpdateResult,
};
use crate::utils::errors::{EventboardError, Result};

/// Resolved outcome of one batch decision, before it is written.
#[derive(Debug, Default, PartialEq)]
struct Arbitration {
    confirm: Vec<i64>,
    reject: Vec<i64>,
    /// Confirming filled the event; every other pending request is closed.
    close_remaining: bool,
}

/// Service for participation request operations.
#[derive(Clone)]
pub struct RequestService {
    db: DatabaseService,
}

impl RequestService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// File a request for an event. The event row stays locked from the
    /// capacity check to the insert.
    pub async fn create(&self, requester_id: i64, event_id: i64) -> Result<RequestView> {
        debug!(
            requester_id = requester_id,
            event_id = event_id,
            "Creating participation request"
        );

        if self.db.users.find_by_id(requester_id).await?.is_none() {
            return Err(EventboardError::UserNotFound {
                user_id: requester_id,
            });
        }

        let mut tx = self.db.begin().await?;
        let event = match self.db.events.find_by_id_for_update(&mut *tx, event_id).await? {
            Some(event) => event,
            None => return Err(EventboardError::EventNotFound { event_id }),
        };
        ensure_can_request(&event, requester_id)?;

        if self
            .db
            .requests
            .exists_active(&mut *tx, event_id, requester_id)
            .await?
        {
            return Err(EventboardError::Conflict(
                "An active request for this event already exists".to_string(),
            ));
        }
        if event.participant_limit > 0 {
            let confirmed = self.db.requests.count_confirmed(&mut *tx, event_id).await?;
            if confirmed >= i64::from(event.participant_limit) {
                return Err(EventboardError::Conflict(
                    "The participant limit has been reached".to_string(),
                ));
            }
        }

        let status = initial_status(&event);
        let request = self
            .db
            .requests
            .create(&mut *tx, event_id, requester_id, status)
            .await?;
        tx.commit().await?;

        info!(
            request_id = request.id,
            event_id = event_id,
            status = %request.status,
            "Participation request created"
        );
        Ok(RequestView::from(request))
    }

    /// Cancel the requester's own request. Canceling a confirmed request
    /// frees its seat.
    pub async fn cancel(&self, requester_id: i64, request_id: i64) -> Result<RequestView> {
        let request = match self
            .db
            .requests
            .find_by_id_and_requester(request_id, requester_id)
            .await?
        {
            Some(request) => request,
            None => return Err(EventboardError::RequestNotFound { request_id }),
        };

        let request = self
            .db
            .requests
            .update_status(request.id, RequestStatus::Canceled)
            .await?;

        info!(request_id = request.id, "Participation request canceled");
        Ok(RequestView::from(request))
    }

    /// All requests the user has filed.
    pub async fn by_requester(&self, requester_id: i64) -> Result<Vec<RequestView>> {
        if self.db.users.find_by_id(requester_id).await?.is_none() {
            return Err(EventboardError::UserNotFound {
                user_id: requester_id,
            });
        }
        let requests = self.db.requests.find_by_requester(requester_id).await?;
        Ok(into_views(requests))
    }

    /// All requests filed against one of the owner's events.
    pub async fn by_event_owner(&self, owner_id: i64, event_id: i64) -> Result<Vec<RequestView>> {
        if self
            .db
            .events
            .find_by_id_and_initiator(event_id, owner_id)
            .await?
            .is_none()
        {
            return Err(EventboardError::EventNotFound { event_id });
        }
        let requests = self.db.requests.find_by_event(event_id).await?;
        Ok(into_views(requests))
    }

    /// The owner's batch decision over named requests. Either the whole
    /// batch applies or none of it does.
    pub async fn update_statuses(
        &self,
        owner_id: i64,
        event_id: i64,
        update: StatusUpdate,
    ) -> Result<StatusUpdateResult> {
        debug!(
            owner_id = owner_id,
            event_id = event_id,
            target = %update.status,
            requests = update.request_ids.len(),
            "Updating request statuses"
        );

        let mut tx = self.db.begin().await?;
        let event = match self.db.events.find_by_id_for_update(&mut *tx, event_id).await? {
            Some(event) if event.initiator_id == owner_id => event,
            _ => return Err(EventboardError::EventNotFound { event_id }),
        };
        if !event.request_moderation || event.participant_limit == 0 {
            return Err(EventboardError::Conflict(
                "The event does not moderate participation requests".to_string(),
            ));
        }

        let mut ids = update.request_ids.clone();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(StatusUpdateResult::default());
        }

        let named = self
            .db
            .requests
            .find_by_ids_for_event(&mut *tx, &ids, event_id)
            .await?;
        if named.len() != ids.len() {
            let found: Vec<i64> = named.iter().map(|request| request.id).collect();
            for id in &ids {
                if !found.contains(id) {
                    return Err(EventboardError::RequestNotFound { request_id: *id });
                }
            }
        }

        let confirmed_count = self.db.requests.count_confirmed(&mut *tx, event_id).await?;
        let arbitration = arbitrate(&event, &named, confirmed_count, update.status)?;

        let mut result = StatusUpdateResult::default();
        if !arbitration.confirm.is_empty() {
            let confirmed = self
                .db
                .requests
                .update_status_many(&mut *tx, &arbitration.confirm, RequestStatus::Confirmed)
                .await?;
            result.confirmed_requests = into_views(confirmed);
        }
        if !arbitration.reject.is_empty() {
            let rejected = self
                .db
                .requests
                .update_status_many(&mut *tx, &arbitration.reject, RequestStatus::Rejected)
                .await?;
            result.rejected_requests.extend(into_views(rejected));
        }
        if arbitration.close_remaining {
            // Runs after the batch write, so only genuinely unnamed
            // requests are still pending here.
            let closed = self
                .db
                .requests
                .reject_pending_for_event(&mut *tx, event_id)
                .await?;
            result.rejected_requests.extend(into_views(closed));
        }
        tx.commit().await?;

        info!(
            event_id = event_id,
            confirmed = result.confirmed_requests.len(),
            rejected = result.rejected_requests.len(),
            "Request statuses updated"
        );
        Ok(result)
    }
}

fn into_views(requests: Vec<ParticipationRequest>) -> Vec<RequestView> {
    requests.into_iter().map(RequestView::from).collect()
}

/// Requests are only open on published events, and never to the initiator.
fn ensure_can_request(event: &Event, requester_id: i64) -> Result<()> {
    if event.state != EventState::Published {
        return Err(EventboardError::Conflict(
            "Participation is only open for published events".to_string(),
        ));
    }
    if event.initiator_id == requester_id {
        return Err(EventboardError::Conflict(
            "The initiator cannot join their own event".to_string(),
        ));
    }
    Ok(())
}

/// Requests skip moderation when the event does not moderate or does not
/// limit participation.
fn initial_status(event: &Event) -> RequestStatus {
    if !event.request_moderation || event.participant_limit == 0 {
        RequestStatus::Confirmed
    } else {
        RequestStatus::Pending
    }
}

/// Decide a batch. Called with the event locked, the named requests loaded,
/// and the live confirmed count; returns what to write without writing it.
fn arbitrate(
    event: &Event,
    named: &[ParticipationRequest],
    confirmed_count: i64,
    target: RequestStatus,
) -> Result<Arbitration> {
    match target {
        RequestStatus::Confirmed => {
            if named.iter().any(|request| request.status != RequestStatus::Pending) {
                return Err(EventboardError::Conflict(
                    "Only pending requests can be confirmed".to_string(),
                ));
            }
            let limit = i64::from(event.participant_limit);
            let filled = confirmed_count + named.len() as i64;
            if filled > limit {
                return Err(EventboardError::Conflict(
                    "The participant limit has been reached".to_string(),
                ));
            }
            Ok(Arbitration {
                confirm: named.iter().map(|request| request.id).collect(),
                reject: Vec::new(),
                close_remaining: filled == limit,
            })
        }
        RequestStatus::Rejected => {
            if named.iter().any(|request| request.status == RequestStatus::Confirmed) {
                return Err(EventboardError::Conflict(
                    "Confirmed requests cannot be rejected".to_string(),
                ));
            }
            Ok(Arbitration {
                confirm: Vec::new(),
                reject: named
                    .iter()
                    .filter(|request| request.status == RequestStatus::Pending)
                    .map(|request| request.id)
                    .collect(),
                close_remaining: false,
            })
        }
        other => Err(EventboardError::InvalidInput(format!(
            "Target status must be CONFIRMED or REJECTED, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn published_event(participant_limit: i32, request_moderation: bool) -> Event {
        Event {
            id: 7,
            title: "Rooftop concert".to_string(),
            annotation: "An evening of live music above the city".to_string(),
            description: "Four local bands play an acoustic set on the rooftop terrace."
                .to_string(),
            category_id: 1,
            initiator_id: 2,
            location_id: 3,
            event_date: Utc.with_ymd_and_hms(2035, 6, 1, 19, 0, 0).unwrap(),
            paid: false,
            participant_limit,
            request_moderation,
            state: EventState::Published,
            created_on: Utc.with_ymd_and_hms(2035, 1, 1, 12, 0, 0).unwrap(),
            published_on: Some(Utc.with_ymd_and_hms(2035, 1, 2, 12, 0, 0).unwrap()),
        }
    }

    fn stored_request(id: i64, status: RequestStatus) -> ParticipationRequest {
        ParticipationRequest {
            id,
            created: Utc.with_ymd_and_hms(2035, 2, 3, 10, 0, 0).unwrap(),
            event_id: 7,
            requester_id: 100 + id,
            status,
        }
    }

    #[test]
    fn requests_skip_moderation_when_not_required() {
        assert_eq!(
            initial_status(&published_event(10, false)),
            RequestStatus::Confirmed
        );
        assert_eq!(
            initial_status(&published_event(0, true)),
            RequestStatus::Confirmed
        );
        assert_eq!(
            initial_status(&published_event(10, true)),
            RequestStatus::Pending
        );
    }

    #[test]
    fn filing_requires_a_published_foreign_event() {
        assert!(ensure_can_request(&published_event(10, true), 99).is_ok());

        let err = ensure_can_request(&published_event(10, true), 2).unwrap_err();
        assert!(matches!(err, EventboardError::Conflict(_)));

        let mut pending = published_event(10, true);
        pending.state = EventState::Pending;
        let err = ensure_can_request(&pending, 99).unwrap_err();
        assert!(matches!(err, EventboardError::Conflict(_)));
    }

    #[test]
    fn confirming_an_exact_fit_closes_the_event() {
        let event = published_event(3, true);
        let named = vec![
            stored_request(1, RequestStatus::Pending),
            stored_request(2, RequestStatus::Pending),
        ];

        let arbitration = arbitrate(&event, &named, 1, RequestStatus::Confirmed).unwrap();
        assert_eq!(arbitration.confirm, vec![1, 2]);
        assert!(arbitration.reject.is_empty());
        assert!(arbitration.close_remaining);
    }

    #[test]
    fn confirming_below_the_limit_keeps_the_event_open() {
        let event = published_event(5, true);
        let named = vec![stored_request(1, RequestStatus::Pending)];

        let arbitration = arbitrate(&event, &named, 1, RequestStatus::Confirmed).unwrap();
        assert_eq!(arbitration.confirm, vec![1]);
        assert!(!arbitration.close_remaining);
    }

    #[test]
    fn overflowing_batches_are_refused_whole() {
        let event = published_event(3, true);
        let named = vec![
            stored_request(1, RequestStatus::Pending),
            stored_request(2, RequestStatus::Pending),
        ];

        let err = arbitrate(&event, &named, 2, RequestStatus::Confirmed).unwrap_err();
        assert!(matches!(err, EventboardError::Conflict(_)));
    }

    #[test]
    fn only_pending_requests_confirm() {
        let event = published_event(10, true);
        let named = vec![
            stored_request(1, RequestStatus::Pending),
            stored_request(2, RequestStatus::Rejected),
        ];

        let err = arbitrate(&event, &named, 0, RequestStatus::Confirmed).unwrap_err();
        assert!(matches!(err, EventboardError::Conflict(_)));
    }

    #[test]
    fn rejecting_spares_everything_but_pending() {
        let event = published_event(10, true);
        let named = vec![
            stored_request(1, RequestStatus::Pending),
            stored_request(2, RequestStatus::Canceled),
            stored_request(3, RequestStatus::Pending),
        ];

        let arbitration = arbitrate(&event, &named, 0, RequestStatus::Rejected).unwrap();
        assert_eq!(arbitration.reject, vec![1, 3]);
        assert!(arbitration.confirm.is_empty());
        assert!(!arbitration.close_remaining);
    }

    #[test]
    fn rejecting_a_confirmed_request_is_refused() {
        let event = published_event(10, true);
        let named = vec![stored_request(1, RequestStatus::Confirmed)];

        let err = arbitrate(&event, &named, 1, RequestStatus::Rejected).unwrap_err();
        assert!(matches!(err, EventboardError::Conflict(_)));
    }

    #[test]
    fn batch_targets_are_limited_to_decisions() {
        let event = published_event(10, true);
        let err = arbitrate(&event, &[], 0, RequestStatus::Canceled).unwrap_err();
        assert!(matches!(err, EventboardError::InvalidInput(_)));
        let err = arbitrate(&event, &[], 0, RequestStatus::Pending).unwrap_err();
        assert!(matches!(err, EventboardError::InvalidInput(_)));
    }
}
