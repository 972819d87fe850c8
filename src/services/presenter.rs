//! Read-side presentation assembly
//!
//! Events store bare foreign keys; the presenter resolves categories,
//! initiators and locations in batched lookups, attaches live confirmed
//! counts, and — on public surfaces — view counts from the stats service.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, warn};

use crate::database::DatabaseService;
use crate::models::category::Category;
use crate::models::event::{Event, EventFull, EventSummary};
use crate::models::location::GeoPoint;
use crate::models::user::UserShort;
use crate::services::stats::StatsClient;
use crate::utils::errors::{EventboardError, Result};

/// Batched lookups for one set of events, keyed for composition.
struct Resolved {
    categories: HashMap<i64, Category>,
    initiators: HashMap<i64, UserShort>,
    locations: HashMap<i64, GeoPoint>,
    confirmed: HashMap<i64, i64>,
    views: Option<HashMap<i64, i64>>,
}

impl Resolved {
    fn category(&self, event: &Event) -> Result<Category> {
        match self.categories.get(&event.category_id) {
            Some(category) => Ok(category.clone()),
            None => Err(EventboardError::CategoryNotFound {
                category_id: event.category_id,
            }),
        }
    }

    fn initiator(&self, event: &Event) -> Result<UserShort> {
        match self.initiators.get(&event.initiator_id) {
            Some(initiator) => Ok(initiator.clone()),
            None => Err(EventboardError::UserNotFound {
                user_id: event.initiator_id,
            }),
        }
    }

    fn location(&self, event: &Event) -> Result<GeoPoint> {
        match self.locations.get(&event.location_id) {
            // The FK makes a miss unreachable; surface it as a database
            // inconsistency rather than panicking.
            Some(point) => Ok(*point),
            None => Err(EventboardError::Database(sqlx::Error::RowNotFound)),
        }
    }

    fn confirmed(&self, event: &Event) -> i64 {
        self.confirmed.get(&event.id).copied().unwrap_or(0)
    }

    fn views(&self, event: &Event) -> Option<i64> {
        self.views
            .as_ref()
            .map(|views| views.get(&event.id).copied().unwrap_or(0))
    }
}

/// Composes event read views from rows.
#[derive(Clone)]
pub struct EventPresenter {
    db: DatabaseService,
    stats: StatsClient,
}

impl EventPresenter {
    pub fn new(db: DatabaseService, stats: StatsClient) -> Self {
        Self { db, stats }
    }

    /// Full view of a single event.
    pub async fn full_view(&self, event: &Event, with_views: bool) -> Result<EventFull> {
        let mut views = self
            .full_views(std::slice::from_ref(event), with_views)
            .await?;
        match views.pop() {
            Some(view) => Ok(view),
            None => Err(EventboardError::EventNotFound { event_id: event.id }),
        }
    }

    /// Full views for a batch of events, in input order.
    pub async fn full_views(&self, events: &[Event], with_views: bool) -> Result<Vec<EventFull>> {
        if events.is_empty() {
            return Ok(Vec::new());
        }
        let resolved = self.resolve(events, with_views).await?;
        events
            .iter()
            .map(|event| {
                Ok(EventFull {
                    id: event.id,
                    title: event.title.clone(),
                    annotation: event.annotation.clone(),
                    description: event.description.clone(),
                    category: resolved.category(event)?,
                    initiator: resolved.initiator(event)?,
                    location: resolved.location(event)?,
                    paid: event.paid,
                    participant_limit: event.participant_limit,
                    request_moderation: event.request_moderation,
                    state: event.state,
                    created_on: event.created_on,
                    published_on: event.published_on,
                    event_date: event.event_date,
                    confirmed_requests: resolved.confirmed(event),
                    views: resolved.views(event),
                })
            })
            .collect()
    }

    /// Condensed views for a batch of events, in input order.
    pub async fn summaries(&self, events: &[Event], with_views: bool) -> Result<Vec<EventSummary>> {
        if events.is_empty() {
            return Ok(Vec::new());
        }
        let resolved = self.resolve(events, with_views).await?;
        events
            .iter()
            .map(|event| {
                Ok(EventSummary {
                    id: event.id,
                    title: event.title.clone(),
                    annotation: event.annotation.clone(),
                    category: resolved.category(event)?,
                    event_date: event.event_date,
                    initiator: resolved.initiator(event)?,
                    paid: event.paid,
                    confirmed_requests: resolved.confirmed(event),
                    views: resolved.views(event),
                })
            })
            .collect()
    }

    /// View counts per event id for a batch, queried over the window from the
    /// earliest creation to now with per-visitor uniqueness. Events the stats
    /// service does not mention count as zero.
    pub async fn view_counts(&self, events: &[Event]) -> Result<HashMap<i64, i64>> {
        let start = match events.iter().map(|event| event.created_on).min() {
            Some(start) => start,
            None => return Ok(HashMap::new()),
        };
        let uris: Vec<String> = events
            .iter()
            .map(|event| format!("/events/{}", event.id))
            .collect();

        let lines = match self.stats.stats(start, Utc::now(), &uris, true).await {
            Ok(lines) => lines,
            Err(e) if self.stats.fail_open() => {
                warn!(error = %e, "View stats unavailable, defaulting views to zero");
                return Ok(events.iter().map(|event| (event.id, 0)).collect());
            }
            Err(e) => return Err(e),
        };

        let mut views: HashMap<i64, i64> = events.iter().map(|event| (event.id, 0)).collect();
        for line in lines {
            let id = line
                .uri
                .strip_prefix("/events/")
                .and_then(|rest| rest.parse::<i64>().ok());
            if let Some(id) = id {
                if let Some(slot) = views.get_mut(&id) {
                    *slot = line.hits;
                }
            }
        }

        debug!(events = events.len(), "Joined view counts");
        Ok(views)
    }

    async fn resolve(&self, events: &[Event], with_views: bool) -> Result<Resolved> {
        let category_ids = distinct(events.iter().map(|event| event.category_id));
        let initiator_ids = distinct(events.iter().map(|event| event.initiator_id));
        let location_ids = distinct(events.iter().map(|event| event.location_id));
        let event_ids: Vec<i64> = events.iter().map(|event| event.id).collect();

        let categories = self
            .db
            .categories
            .find_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|category| (category.id, category))
            .collect();
        let initiators = self
            .db
            .users
            .find_by_ids(&initiator_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, UserShort::from(&user)))
            .collect();
        let locations = self
            .db
            .locations
            .find_by_ids(&location_ids)
            .await?
            .into_iter()
            .map(|location| (location.id, GeoPoint::from(&location)))
            .collect();
        let confirmed = self.db.requests.confirmed_counts(&event_ids).await?;
        let views = if with_views {
            Some(self.view_counts(events).await?)
        } else {
            None
        };

        Ok(Resolved {
            categories,
            initiators,
            locations,
            confirmed,
            views,
        })
    }
}

fn distinct(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_drops_duplicates_and_sorts() {
        assert_eq!(distinct([3, 1, 3, 2, 1].into_iter()), vec![1, 2, 3]);
        assert_eq!(distinct(std::iter::empty()), Vec::<i64>::new());
    }
}
