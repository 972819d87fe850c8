//! Category model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Event category. The row doubles as its own read view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}
