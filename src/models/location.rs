//! Location model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored location row. Rows are shared: every event at the same coordinate
/// pair references one row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

/// Wire shape of a location: a bare coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl From<&Location> for GeoPoint {
    fn from(location: &Location) -> Self {
        Self {
            lat: location.lat,
            lon: location.lon,
        }
    }
}
