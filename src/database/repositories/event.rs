//! Event repository implementation
//!
//! All event SQL lives here, including the translation of listing criteria
//! into a dynamically built query.

use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::models::event::{Event, EventState, NewEventRecord};
use crate::models::filter::{Criterion, EventFilter, Page};
use crate::utils::errors::EventboardError;

/// Row ordering applied by `search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    /// Soonest first, id as tiebreak.
    EventDate,
    /// Insertion order.
    Id,
}

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fresh draft. Runs on the caller's transaction so the
    /// location upsert and the insert commit together.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        record: NewEventRecord,
    ) -> Result<Event, EventboardError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, annotation, description, category_id, initiator_id, location_id, event_date, paid, participant_limit, request_moderation, state, created_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, title, annotation, description, category_id, initiator_id, location_id, event_date, paid, participant_limit, request_moderation, state, created_on, published_on
            "#
        )
        .bind(record.title)
        .bind(record.annotation)
        .bind(record.description)
        .bind(record.category_id)
        .bind(record.initiator_id)
        .bind(record.location_id)
        .bind(record.event_date)
        .bind(record.paid)
        .bind(record.participant_limit)
        .bind(record.request_moderation)
        .bind(EventState::Pending)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(event)
    }

    /// Write a patched event back as a whole row.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        event: &Event,
    ) -> Result<Event, EventboardError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = $2,
                annotation = $3,
                description = $4,
                category_id = $5,
                location_id = $6,
                event_date = $7,
                paid = $8,
                participant_limit = $9,
                request_moderation = $10,
                state = $11,
                published_on = $12
            WHERE id = $1
            RETURNING id, title, annotation, description, category_id, initiator_id, location_id, event_date, paid, participant_limit, request_moderation, state, created_on, published_on
            "#
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.annotation)
        .bind(&event.description)
        .bind(event.category_id)
        .bind(event.location_id)
        .bind(event.event_date)
        .bind(event.paid)
        .bind(event.participant_limit)
        .bind(event.request_moderation)
        .bind(event.state)
        .bind(event.published_on)
        .fetch_one(&mut *conn)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, EventboardError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, title, annotation, description, category_id, initiator_id, location_id, event_date, paid, participant_limit, request_moderation, state, created_on, published_on FROM events WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find an event and lock its row until the transaction ends. Capacity
    /// checks ride on this lock.
    pub async fn find_by_id_for_update(
        &self,
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<Event>, EventboardError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, title, annotation, description, category_id, initiator_id, location_id, event_date, paid, participant_limit, request_moderation, state, created_on, published_on FROM events WHERE id = $1 FOR UPDATE"
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(event)
    }

    /// Find an event owned by the given initiator
    pub async fn find_by_id_and_initiator(
        &self,
        id: i64,
        initiator_id: i64,
    ) -> Result<Option<Event>, EventboardError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, title, annotation, description, category_id, initiator_id, location_id, event_date, paid, participant_limit, request_moderation, state, created_on, published_on FROM events WHERE id = $1 AND initiator_id = $2"
        )
        .bind(id)
        .bind(initiator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// List an initiator's events, oldest first
    pub async fn find_by_initiator(
        &self,
        initiator_id: i64,
        page: Page,
    ) -> Result<Vec<Event>, EventboardError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, title, annotation, description, category_id, initiator_id, location_id, event_date, paid, participant_limit, request_moderation, state, created_on, published_on FROM events WHERE initiator_id = $1 ORDER BY id ASC LIMIT $2 OFFSET $3"
        )
        .bind(initiator_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Run a criteria search. `page: None` fetches the whole matching set,
    /// which the views-ordered listing needs before it can window.
    pub async fn search(
        &self,
        filter: &EventFilter,
        order: SearchOrder,
        page: Option<Page>,
    ) -> Result<Vec<Event>, EventboardError> {
        let mut query = build_search_query(filter, order, page);
        let events = query
            .build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await?;

        debug!(
            criteria = filter.criteria().len(),
            matched = events.len(),
            "Event search completed"
        );
        Ok(events)
    }
}

/// Translate criteria into SQL, in build order, as one conjunction.
fn build_search_query(
    filter: &EventFilter,
    order: SearchOrder,
    page: Option<Page>,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(
        "SELECT id, title, annotation, description, category_id, initiator_id, location_id, event_date, paid, participant_limit, request_moderation, state, created_on, published_on FROM events",
    );

    for (position, criterion) in filter.criteria().iter().enumerate() {
        query.push(if position == 0 { " WHERE " } else { " AND " });
        match criterion {
            Criterion::TextLike(text) => {
                let pattern = format!("%{}%", escape_like(text));
                query.push("(title ILIKE ");
                query.push_bind(pattern.clone());
                query.push(" OR annotation ILIKE ");
                query.push_bind(pattern.clone());
                query.push(" OR description ILIKE ");
                query.push_bind(pattern);
                query.push(")");
            }
            Criterion::CategoryIn(ids) => {
                query.push("category_id = ANY(");
                query.push_bind(ids.clone());
                query.push(")");
            }
            Criterion::InitiatorIn(ids) => {
                query.push("initiator_id = ANY(");
                query.push_bind(ids.clone());
                query.push(")");
            }
            Criterion::StateIn(names) => {
                query.push("state::text = ANY(");
                query.push_bind(names.clone());
                query.push(")");
            }
            Criterion::PaidEq(paid) => {
                query.push("paid = ");
                query.push_bind(*paid);
            }
            Criterion::StartsOnOrAfter(bound) => {
                query.push("event_date >= ");
                query.push_bind(*bound);
            }
            Criterion::StartsOnOrBefore(bound) => {
                query.push("event_date <= ");
                query.push_bind(*bound);
            }
            Criterion::OnlyAvailable => {
                query.push(
                    "(participant_limit = 0 OR participant_limit > (SELECT COUNT(*) FROM requests WHERE requests.event_id = events.id AND requests.status = 'CONFIRMED'))",
                );
            }
        }
    }

    match order {
        SearchOrder::EventDate => query.push(" ORDER BY event_date ASC, id ASC"),
        SearchOrder::Id => query.push(" ORDER BY id ASC"),
    };

    if let Some(page) = page {
        query.push(" LIMIT ");
        query.push_bind(page.limit);
        query.push(" OFFSET ");
        query.push_bind(page.offset);
    }

    query
}

/// Escape LIKE wildcards so user text stays a literal substring.
fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
