//! Category repository implementation
//!
//! Category administration lives elsewhere; this service only resolves
//! categories for validation and presentation.

use sqlx::PgPool;

use crate::models::category::Category;
use crate::utils::errors::EventboardError;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find category by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Category>, EventboardError> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(category)
    }

    /// Batch lookup for presentation joins
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Category>, EventboardError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ANY($1)")
                .bind(ids.to_vec())
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }
}
