//! User repository implementation
//!
//! Users are managed elsewhere; this service only resolves them.

use sqlx::PgPool;

use crate::models::user::User;
use crate::utils::errors::EventboardError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, EventboardError> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Batch lookup for presentation joins
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, EventboardError> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }
}
