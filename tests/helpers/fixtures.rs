//! Raw fixture inserts
//!
//! Users and categories are administered outside this system, so tests seed
//! them straight into the tables. Events can be seeded in any lifecycle
//! state, which the HTTP surface alone cannot arrange.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn seed_user(pool: &PgPool, name: &str) -> i64 {
    let email = format!("{}-{}@example.com", name, Uuid::new_v4());
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id")
            .bind(name)
            .bind(email)
            .fetch_one(pool)
            .await
            .expect("Failed to seed user");
    id
}

pub async fn seed_category(pool: &PgPool, name: &str) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO categories (name) VALUES ($1) RETURNING id")
            .bind(format!("{}-{}", name, &Uuid::new_v4().to_string()[..8]))
            .fetch_one(pool)
            .await
            .expect("Failed to seed category");
    id
}

pub async fn seed_location(pool: &PgPool, lat: f64, lon: f64) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO locations (lat, lon) VALUES ($1, $2) RETURNING id")
            .bind(lat)
            .bind(lon)
            .fetch_one(pool)
            .await
            .expect("Failed to seed location");
    id
}

/// Builder for a seeded event row.
pub struct EventSeed {
    pub initiator_id: i64,
    pub category_id: i64,
    pub location_id: i64,
    pub title: String,
    pub annotation: Option<String>,
    pub state: &'static str,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
}

impl EventSeed {
    pub fn new(initiator_id: i64, category_id: i64, location_id: i64) -> Self {
        Self {
            initiator_id,
            category_id,
            location_id,
            title: "Rooftop concert".to_string(),
            annotation: None,
            state: "PUBLISHED",
            event_date: Utc::now() + Duration::days(30),
            paid: false,
            participant_limit: 0,
            request_moderation: true,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn annotation(mut self, annotation: &str) -> Self {
        self.annotation = Some(annotation.to_string());
        self
    }

    pub fn state(mut self, state: &'static str) -> Self {
        self.state = state;
        self
    }

    pub fn event_date(mut self, event_date: DateTime<Utc>) -> Self {
        self.event_date = event_date;
        self
    }

    pub fn paid(mut self, paid: bool) -> Self {
        self.paid = paid;
        self
    }

    pub fn limit(mut self, participant_limit: i32) -> Self {
        self.participant_limit = participant_limit;
        self
    }

    pub fn moderation(mut self, request_moderation: bool) -> Self {
        self.request_moderation = request_moderation;
        self
    }

    pub async fn insert(self, pool: &PgPool) -> i64 {
        let published_on = (self.state == "PUBLISHED").then(Utc::now);
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO events (title, annotation, description, category_id, initiator_id, location_id, event_date, paid, participant_limit, request_moderation, state, created_on, published_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11::event_state, $12, $13)
            RETURNING id
            "#,
        )
        .bind(&self.title)
        .bind(
            self.annotation
                .unwrap_or_else(|| format!("Annotation for {}", self.title)),
        )
        .bind(format!("A longer description text for {}", self.title))
        .bind(self.category_id)
        .bind(self.initiator_id)
        .bind(self.location_id)
        .bind(self.event_date)
        .bind(self.paid)
        .bind(self.participant_limit)
        .bind(self.request_moderation)
        .bind(self.state)
        .bind(Utc::now())
        .bind(published_on)
        .fetch_one(pool)
        .await
        .expect("Failed to seed event");
        id
    }
}

pub async fn seed_request(pool: &PgPool, event_id: i64, requester_id: i64, status: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO requests (created, event_id, requester_id, status)
        VALUES ($1, $2, $3, $4::request_status)
        RETURNING id
        "#,
    )
    .bind(Utc::now())
    .bind(event_id)
    .bind(requester_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .expect("Failed to seed request");
    id
}

pub async fn request_status(pool: &PgPool, request_id: i64) -> String {
    let (status,): (String,) =
        sqlx::query_as("SELECT status::text FROM requests WHERE id = $1")
            .bind(request_id)
            .fetch_one(pool)
            .await
            .expect("Failed to read request status");
    status
}

pub async fn event_state(pool: &PgPool, event_id: i64) -> String {
    let (state,): (String,) = sqlx::query_as("SELECT state::text FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read event state");
    state
}
