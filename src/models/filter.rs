//! Listing criteria model
//!
//! Listings are described as an ordered list of predicate descriptors built
//! through a fluent filter. The descriptors know nothing about storage; the
//! event repository translates them into SQL when a search runs. Criteria
//! always combine as a conjunction, in the order they were added.

use chrono::{DateTime, Utc};

use crate::models::EventState;
use crate::utils::errors::{EventboardError, Result};

/// One predicate of a listing query.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Case-insensitive substring match over title, annotation, description.
    TextLike(String),
    CategoryIn(Vec<i64>),
    InitiatorIn(Vec<i64>),
    /// State names compared textually; unknown names match nothing.
    StateIn(Vec<String>),
    PaidEq(bool),
    StartsOnOrAfter(DateTime<Utc>),
    StartsOnOrBefore(DateTime<Utc>),
    /// Unlimited events, or events whose live confirmed count is below the
    /// participant limit.
    OnlyAvailable,
}

/// Ordered conjunction of criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    criteria: Vec<Criterion>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to published events. The public surface adds this first.
    pub fn published_only(mut self) -> Self {
        self.criteria
            .push(Criterion::StateIn(vec![EventState::Published.to_string()]));
        self
    }

    /// Add a free-text criterion; blank input adds nothing.
    pub fn text(mut self, text: Option<&str>) -> Self {
        if let Some(text) = text {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                self.criteria.push(Criterion::TextLike(trimmed.to_string()));
            }
        }
        self
    }

    pub fn categories(mut self, ids: Option<Vec<i64>>) -> Self {
        if let Some(ids) = ids {
            if !ids.is_empty() {
                self.criteria.push(Criterion::CategoryIn(ids));
            }
        }
        self
    }

    pub fn initiators(mut self, ids: Option<Vec<i64>>) -> Self {
        if let Some(ids) = ids {
            if !ids.is_empty() {
                self.criteria.push(Criterion::InitiatorIn(ids));
            }
        }
        self
    }

    pub fn states(mut self, names: Option<Vec<String>>) -> Self {
        if let Some(names) = names {
            if !names.is_empty() {
                self.criteria.push(Criterion::StateIn(names));
            }
        }
        self
    }

    pub fn paid(mut self, paid: Option<bool>) -> Self {
        if let Some(paid) = paid {
            self.criteria.push(Criterion::PaidEq(paid));
        }
        self
    }

    /// Add event-date bounds. Fails when the range is inverted.
    pub fn date_range(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(EventboardError::InvalidInput(
                    "rangeStart must not be after rangeEnd".to_string(),
                ));
            }
        }
        if let Some(start) = start {
            self.criteria.push(Criterion::StartsOnOrAfter(start));
        }
        if let Some(end) = end {
            self.criteria.push(Criterion::StartsOnOrBefore(end));
        }
        Ok(self)
    }

    pub fn only_available(mut self, flag: bool) -> Self {
        if flag {
            self.criteria.push(Criterion::OnlyAvailable);
        }
        self
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// Orderings offered by the public listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Soonest first; paged in SQL.
    #[default]
    EventDate,
    /// Most viewed first; windowed in memory after the views join.
    Views,
}

impl SortKey {
    /// Parse the wire name of a sort key.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "EVENT_DATE" => Ok(SortKey::EventDate),
            "VIEWS" => Ok(SortKey::Views),
            other => Err(EventboardError::InvalidInput(format!(
                "Unknown sort: {other}"
            ))),
        }
    }
}

/// Exact offset/limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_SIZE: i64 = 10;

    /// Build a window from the `from`/`size` wire parameters.
    pub fn new(from: Option<i64>, size: Option<i64>) -> Result<Self> {
        let offset = from.unwrap_or(0);
        let limit = size.unwrap_or(Self::DEFAULT_SIZE);
        if offset < 0 {
            return Err(EventboardError::InvalidInput(
                "Parameter 'from' must not be negative".to_string(),
            ));
        }
        if limit <= 0 {
            return Err(EventboardError::InvalidInput(
                "Parameter 'size' must be positive".to_string(),
            ));
        }
        Ok(Self { offset, limit })
    }

    /// Cut this window out of an in-memory result set.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn criteria_keep_build_order() {
        let start = Utc.with_ymd_and_hms(2035, 1, 1, 0, 0, 0).unwrap();
        let filter = EventFilter::new()
            .published_only()
            .text(Some("concert"))
            .categories(Some(vec![1, 2]))
            .paid(Some(true))
            .date_range(Some(start), None)
            .unwrap()
            .only_available(true);

        assert_eq!(
            filter.criteria(),
            &[
                Criterion::StateIn(vec!["PUBLISHED".to_string()]),
                Criterion::TextLike("concert".to_string()),
                Criterion::CategoryIn(vec![1, 2]),
                Criterion::PaidEq(true),
                Criterion::StartsOnOrAfter(start),
                Criterion::OnlyAvailable,
            ]
        );
    }

    #[test]
    fn blank_and_empty_inputs_add_nothing() {
        let filter = EventFilter::new()
            .text(Some("   "))
            .text(None)
            .categories(Some(vec![]))
            .states(None)
            .paid(None)
            .only_available(false);
        assert!(filter.is_empty());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let start = Utc.with_ymd_and_hms(2035, 5, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2035, 4, 1, 0, 0, 0).unwrap();
        let err = EventFilter::new()
            .date_range(Some(start), Some(end))
            .unwrap_err();
        assert!(matches!(err, EventboardError::InvalidInput(_)));
    }

    #[test]
    fn equal_range_bounds_are_allowed() {
        let moment = Utc.with_ymd_and_hms(2035, 5, 1, 0, 0, 0).unwrap();
        let filter = EventFilter::new()
            .date_range(Some(moment), Some(moment))
            .unwrap();
        assert_eq!(filter.criteria().len(), 2);
    }

    #[test]
    fn sort_keys_parse_their_wire_names() {
        assert_eq!(SortKey::parse("EVENT_DATE").unwrap(), SortKey::EventDate);
        assert_eq!(SortKey::parse("VIEWS").unwrap(), SortKey::Views);
        let err = SortKey::parse("POPULARITY").unwrap_err();
        assert!(err.to_string().contains("Unknown sort: POPULARITY"));
    }

    #[test]
    fn page_defaults_and_bounds() {
        let page = Page::new(None, None).unwrap();
        assert_eq!(page.offset, 0);
        assert_eq!(page.limit, 10);

        assert!(Page::new(Some(-1), None).is_err());
        assert!(Page::new(None, Some(0)).is_err());

        let window = Page::new(Some(3), Some(5)).unwrap();
        let sliced = window.slice((0..20).collect::<Vec<_>>());
        assert_eq!(sliced, vec![3, 4, 5, 6, 7]);
    }
}
