//! Wire timestamp handling
//!
//! Every timestamp that crosses the HTTP boundary (JSON bodies, query
//! parameters, the stats exchange) uses the same `yyyy-MM-dd HH:mm:ss`
//! format, interpreted as UTC wall time. This module owns that format plus
//! the lead-time rule applied to event start dates.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::utils::errors::{EventboardError, Result};

/// Timestamp format used on every wire surface.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Minimum distance between "now" and an event's start date, both at
/// creation and whenever the date is rescheduled.
pub const EVENT_LEAD_TIME_HOURS: i64 = 2;

/// Format a timestamp in the wire format.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

/// Parse a wire-format timestamp, as it arrives in query parameters.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            EventboardError::InvalidInput(format!(
                "Invalid datetime '{value}', expected yyyy-MM-dd HH:mm:ss"
            ))
        })
}

/// Check the lead-time rule for an event start date.
pub fn ensure_lead_time(event_date: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if event_date < now + Duration::hours(EVENT_LEAD_TIME_HOURS) {
        return Err(EventboardError::InvalidInput(format!(
            "Event date {} must be at least {} hours from now",
            format_datetime(&event_date),
            EVENT_LEAD_TIME_HOURS
        )));
    }
    Ok(())
}

/// Serde adapter for mandatory wire-format timestamps.
pub mod wire_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_TIME_FORMAT;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(DATE_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, DATE_TIME_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional wire-format timestamps.
pub mod wire_format_opt {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_TIME_FORMAT;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => serializer.serialize_str(&inner.format(DATE_TIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|value| {
            NaiveDateTime::parse_from_str(&value, DATE_TIME_FORMAT)
                .map(|naive| naive.and_utc())
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
