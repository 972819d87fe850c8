//! Location repository implementation

use sqlx::{PgConnection, PgPool};

use crate::models::location::{GeoPoint, Location};
use crate::utils::errors::EventboardError;

#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return the row for a coordinate pair, inserting it on first sight.
    /// Runs on the caller's transaction alongside the event write.
    pub async fn find_or_create(
        &self,
        conn: &mut PgConnection,
        point: GeoPoint,
    ) -> Result<Location, EventboardError> {
        let existing = sqlx::query_as::<_, Location>(
            "SELECT id, lat, lon FROM locations WHERE lat = $1 AND lon = $2",
        )
        .bind(point.lat)
        .bind(point.lon)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(location) = existing {
            return Ok(location);
        }

        let location = sqlx::query_as::<_, Location>(
            "INSERT INTO locations (lat, lon) VALUES ($1, $2) RETURNING id, lat, lon",
        )
        .bind(point.lat)
        .bind(point.lon)
        .fetch_one(&mut *conn)
        .await?;

        Ok(location)
    }

    /// Find location by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Location>, EventboardError> {
        let location =
            sqlx::query_as::<_, Location>("SELECT id, lat, lon FROM locations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(location)
    }

    /// Batch lookup for presentation joins
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Location>, EventboardError> {
        let locations =
            sqlx::query_as::<_, Location>("SELECT id, lat, lon FROM locations WHERE id = ANY($1)")
                .bind(ids.to_vec())
                .fetch_all(&self.pool)
                .await?;

        Ok(locations)
    }
}
