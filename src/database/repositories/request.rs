//! Participation request repository implementation
//!
//! Confirmed counts are always computed live; nothing here caches them.
//! Methods taking a connection are meant to run on the transaction that
//! holds the event row lock.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use crate::models::request::{ParticipationRequest, RequestStatus};
use crate::utils::errors::{map_unique_violation, EventboardError};

#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a request. A concurrent duplicate trips the partial unique
    /// index and surfaces as a conflict.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
        requester_id: i64,
        status: RequestStatus,
    ) -> Result<ParticipationRequest, EventboardError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(
            r#"
            INSERT INTO requests (created, event_id, requester_id, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created, event_id, requester_id, status
            "#,
        )
        .bind(Utc::now())
        .bind(event_id)
        .bind(requester_id)
        .bind(status)
        .fetch_one(&mut *conn)
        .await
        .map_err(|err| map_unique_violation(err, "An active request for this event already exists"))?;

        Ok(request)
    }

    /// Find a request owned by the given requester
    pub async fn find_by_id_and_requester(
        &self,
        id: i64,
        requester_id: i64,
    ) -> Result<Option<ParticipationRequest>, EventboardError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(
            "SELECT id, created, event_id, requester_id, status FROM requests WHERE id = $1 AND requester_id = $2",
        )
        .bind(id)
        .bind(requester_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// All requests filed against an event
    pub async fn find_by_event(
        &self,
        event_id: i64,
    ) -> Result<Vec<ParticipationRequest>, EventboardError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(
            "SELECT id, created, event_id, requester_id, status FROM requests WHERE event_id = $1 ORDER BY id ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// All requests filed by a requester
    pub async fn find_by_requester(
        &self,
        requester_id: i64,
    ) -> Result<Vec<ParticipationRequest>, EventboardError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(
            "SELECT id, created, event_id, requester_id, status FROM requests WHERE requester_id = $1 ORDER BY id ASC",
        )
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Load the named requests, restricted to one event.
    pub async fn find_by_ids_for_event(
        &self,
        conn: &mut PgConnection,
        ids: &[i64],
        event_id: i64,
    ) -> Result<Vec<ParticipationRequest>, EventboardError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(
            "SELECT id, created, event_id, requester_id, status FROM requests WHERE id = ANY($1) AND event_id = $2 ORDER BY id ASC",
        )
        .bind(ids.to_vec())
        .bind(event_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(requests)
    }

    /// Does the requester hold a pending or confirmed request for the event?
    pub async fn exists_active(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
        requester_id: i64,
    ) -> Result<bool, EventboardError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM requests WHERE event_id = $1 AND requester_id = $2 AND status IN ('PENDING', 'CONFIRMED')",
        )
        .bind(event_id)
        .bind(requester_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(count.0 > 0)
    }

    /// Live confirmed count for one event, read under the caller's lock.
    pub async fn count_confirmed(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
    ) -> Result<i64, EventboardError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM requests WHERE event_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(event_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(count.0)
    }

    /// Live confirmed counts for a batch of events. Events without
    /// confirmations are simply absent from the map.
    pub async fn confirmed_counts(
        &self,
        event_ids: &[i64],
    ) -> Result<HashMap<i64, i64>, EventboardError> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT event_id, COUNT(*) FROM requests WHERE event_id = ANY($1) AND status = 'CONFIRMED' GROUP BY event_id",
        )
        .bind(event_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Flip one request to a new status.
    pub async fn update_status(
        &self,
        id: i64,
        status: RequestStatus,
    ) -> Result<ParticipationRequest, EventboardError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(
            r#"
            UPDATE requests
            SET status = $2
            WHERE id = $1
            RETURNING id, created, event_id, requester_id, status
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    /// Flip a set of requests to a new status.
    pub async fn update_status_many(
        &self,
        conn: &mut PgConnection,
        ids: &[i64],
        status: RequestStatus,
    ) -> Result<Vec<ParticipationRequest>, EventboardError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(
            r#"
            UPDATE requests
            SET status = $2
            WHERE id = ANY($1)
            RETURNING id, created, event_id, requester_id, status
            "#,
        )
        .bind(ids.to_vec())
        .bind(status)
        .fetch_all(&mut *conn)
        .await?;

        Ok(requests)
    }

    /// Reject whatever is still pending for an event. Called once a
    /// confirmation batch fills the participant limit.
    pub async fn reject_pending_for_event(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
    ) -> Result<Vec<ParticipationRequest>, EventboardError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(
            r#"
            UPDATE requests
            SET status = 'REJECTED'
            WHERE event_id = $1 AND status = 'PENDING'
            RETURNING id, created, event_id, requester_id, status
            "#,
        )
        .bind(event_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(requests)
    }
}
