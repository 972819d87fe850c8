//! Event lifecycle and listing service
//!
//! Drafting, owner and admin updates, and the public/owner/admin read
//! surfaces. State transitions and field patching are pure functions; the
//! service wraps them in transactions and hands rows to the presenter.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::{debug, info};

use crate::database::{DatabaseService, SearchOrder};
use crate::models::event::{
    ensure_limit_sign, ensure_text_bounds, AdminEventUpdate, AdminStateAction, Event, EventFull,
    EventPatch, EventState, EventSummary, NewEvent, NewEventRecord, OwnerEventUpdate,
    OwnerStateAction, ANNOTATION_LEN, DESCRIPTION_LEN, TITLE_LEN,
};
use crate::models::filter::{EventFilter, Page, SortKey};
use crate::services::presenter::EventPresenter;
use crate::services::stats::StatsClient;
use crate::utils::errors::{EventboardError, Result};
use crate::utils::time;

/// Public listing query, as assembled by the handler layer.
#[derive(Debug, Clone, Default)]
pub struct PublicSearch {
    pub text: Option<String>,
    pub categories: Option<Vec<i64>>,
    pub paid: Option<bool>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
    pub only_available: bool,
    pub sort: SortKey,
    pub page: Page,
}

/// Admin listing query.
#[derive(Debug, Clone, Default)]
pub struct AdminSearch {
    pub users: Option<Vec<i64>>,
    pub states: Option<Vec<String>>,
    pub categories: Option<Vec<i64>>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
    pub page: Page,
}

/// Service for event lifecycle operations and listings.
#[derive(Clone)]
pub struct EventService {
    db: DatabaseService,
    presenter: EventPresenter,
    stats: StatsClient,
}

impl EventService {
    pub fn new(db: DatabaseService, presenter: EventPresenter, stats: StatsClient) -> Self {
        Self {
            db,
            presenter,
            stats,
        }
    }

    /// Create a draft event. The draft always starts PENDING and waits for
    /// an administrator's decision.
    pub async fn add_event(&self, initiator_id: i64, draft: NewEvent) -> Result<EventFull> {
        debug!(initiator_id = initiator_id, title = %draft.title, "Creating event draft");

        draft.validate()?;
        time::ensure_lead_time(draft.event_date, Utc::now())?;

        if self.db.users.find_by_id(initiator_id).await?.is_none() {
            return Err(EventboardError::UserNotFound {
                user_id: initiator_id,
            });
        }
        let category = match self.db.categories.find_by_id(draft.category).await? {
            Some(category) => category,
            None => {
                return Err(EventboardError::CategoryNotFound {
                    category_id: draft.category,
                })
            }
        };

        let mut tx = self.db.begin().await?;
        let location = self
            .db
            .locations
            .find_or_create(&mut *tx, draft.location)
            .await?;
        let record = NewEventRecord {
            title: draft.title,
            annotation: draft.annotation,
            description: draft.description,
            category_id: category.id,
            initiator_id,
            location_id: location.id,
            event_date: draft.event_date,
            paid: draft.paid,
            participant_limit: draft.participant_limit,
            request_moderation: draft.request_moderation,
        };
        let event = self.db.events.create(&mut *tx, record).await?;
        tx.commit().await?;

        info!(
            event_id = event.id,
            initiator_id = initiator_id,
            "Event draft created"
        );
        self.presenter.full_view(&event, false).await
    }

    /// Owner update: field patch first, then the optional review action.
    pub async fn update_by_owner(
        &self,
        owner_id: i64,
        event_id: i64,
        update: OwnerEventUpdate,
    ) -> Result<EventFull> {
        debug!(owner_id = owner_id, event_id = event_id, "Owner event update");

        let mut tx = self.db.begin().await?;
        let mut event = match self.db.events.find_by_id_for_update(&mut *tx, event_id).await? {
            Some(event) if event.initiator_id == owner_id => event,
            _ => return Err(EventboardError::EventNotFound { event_id }),
        };
        ensure_owner_can_update(&event)?;

        self.apply_patch(&mut *tx, &mut event, update.patch).await?;
        if let Some(action) = update.state_action {
            owner_transition(&mut event, action);
        }
        let event = self.db.events.update(&mut *tx, &event).await?;
        tx.commit().await?;

        info!(event_id = event.id, state = %event.state, "Event updated by owner");
        self.presenter.full_view(&event, false).await
    }

    /// Admin update: publication decision first, then the same field patch.
    pub async fn update_by_admin(
        &self,
        event_id: i64,
        update: AdminEventUpdate,
    ) -> Result<EventFull> {
        debug!(event_id = event_id, action = ?update.state_action, "Admin event update");

        let mut tx = self.db.begin().await?;
        let mut event = match self.db.events.find_by_id_for_update(&mut *tx, event_id).await? {
            Some(event) => event,
            None => return Err(EventboardError::EventNotFound { event_id }),
        };
        if let Some(action) = update.state_action {
            admin_transition(&mut event, action, Utc::now())?;
        }
        self.apply_patch(&mut *tx, &mut event, update.patch).await?;
        let event = self.db.events.update(&mut *tx, &event).await?;
        tx.commit().await?;

        info!(event_id = event.id, state = %event.state, "Event updated by admin");
        self.presenter.full_view(&event, false).await
    }

    /// An owner's events, paged, oldest first.
    pub async fn events_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<EventSummary>> {
        if self.db.users.find_by_id(owner_id).await?.is_none() {
            return Err(EventboardError::UserNotFound { user_id: owner_id });
        }
        let events = self.db.events.find_by_initiator(owner_id, page).await?;
        self.presenter.summaries(&events, false).await
    }

    /// One of the owner's events, in full.
    pub async fn event_by_owner(&self, owner_id: i64, event_id: i64) -> Result<EventFull> {
        let event = match self
            .db
            .events
            .find_by_id_and_initiator(event_id, owner_id)
            .await?
        {
            Some(event) => event,
            None => return Err(EventboardError::EventNotFound { event_id }),
        };
        self.presenter.full_view(&event, false).await
    }

    /// Public detail view. Unpublished events stay invisible, and every
    /// successful lookup counts as a view.
    pub async fn published_by_id(&self, event_id: i64, viewer_ip: String) -> Result<EventFull> {
        let event = match self.db.events.find_by_id(event_id).await? {
            Some(event) if event.state == EventState::Published => event,
            _ => return Err(EventboardError::EventNotFound { event_id }),
        };

        self.stats
            .record_hit_background(format!("/events/{event_id}"), viewer_ip);
        self.presenter.full_view(&event, true).await
    }

    /// Public listing: published events only, upcoming by default, with
    /// views attached. One hit is recorded per listing call.
    pub async fn search_public(
        &self,
        query: PublicSearch,
        viewer_ip: String,
    ) -> Result<Vec<EventSummary>> {
        let unbounded = query.range_start.is_none() && query.range_end.is_none();
        let mut filter = EventFilter::new()
            .published_only()
            .text(query.text.as_deref())
            .categories(query.categories)
            .paid(query.paid)
            .date_range(query.range_start, query.range_end)?
            .only_available(query.only_available);
        if unbounded {
            filter = filter.date_range(Some(Utc::now()), None)?;
        }

        self.stats
            .record_hit_background("/events".to_string(), viewer_ip);

        match query.sort {
            SortKey::EventDate => {
                let events = self
                    .db
                    .events
                    .search(&filter, SearchOrder::EventDate, Some(query.page))
                    .await?;
                self.presenter.summaries(&events, true).await
            }
            SortKey::Views => {
                // The window depends on the counts, so the whole matching set
                // is fetched and ordered here before paging.
                let mut events = self.db.events.search(&filter, SearchOrder::Id, None).await?;
                let views = self.presenter.view_counts(&events).await?;
                events.sort_by(|a, b| {
                    let a_views = views.get(&a.id).copied().unwrap_or(0);
                    let b_views = views.get(&b.id).copied().unwrap_or(0);
                    b_views.cmp(&a_views).then(a.id.cmp(&b.id))
                });
                let windowed = query.page.slice(events);

                let mut summaries = self.presenter.summaries(&windowed, false).await?;
                for summary in &mut summaries {
                    summary.views = Some(views.get(&summary.id).copied().unwrap_or(0));
                }
                Ok(summaries)
            }
        }
    }

    /// Admin listing: unrestricted criteria, full views with view counts.
    pub async fn search_admin(&self, query: AdminSearch) -> Result<Vec<EventFull>> {
        let filter = EventFilter::new()
            .initiators(query.users)
            .states(query.states)
            .categories(query.categories)
            .date_range(query.range_start, query.range_end)?;

        let events = self
            .db
            .events
            .search(&filter, SearchOrder::Id, Some(query.page))
            .await?;
        self.presenter.full_views(&events, true).await
    }

    /// Resolve and apply a field patch onto a loaded event. Scalars are
    /// validated first, then category and location resolve through the
    /// repositories.
    async fn apply_patch(
        &self,
        conn: &mut PgConnection,
        event: &mut Event,
        patch: EventPatch,
    ) -> Result<()> {
        apply_scalar_fields(event, &patch, Utc::now())?;

        if let Some(category_id) = patch.category {
            match self.db.categories.find_by_id(category_id).await? {
                Some(category) => event.category_id = category.id,
                None => return Err(EventboardError::CategoryNotFound { category_id }),
            }
        }
        if let Some(point) = patch.location {
            let location = self.db.locations.find_or_create(conn, point).await?;
            event.location_id = location.id;
        }
        Ok(())
    }
}

/// Owners may touch drafts and canceled events only.
fn ensure_owner_can_update(event: &Event) -> Result<()> {
    if event.state == EventState::Published {
        return Err(EventboardError::Forbidden(
            "Only pending or canceled events can be changed".to_string(),
        ));
    }
    Ok(())
}

fn owner_transition(event: &mut Event, action: OwnerStateAction) {
    match action {
        OwnerStateAction::SendToReview => event.state = EventState::Pending,
        OwnerStateAction::CancelReview => event.state = EventState::Canceled,
    }
}

fn admin_transition(event: &mut Event, action: AdminStateAction, now: DateTime<Utc>) -> Result<()> {
    match action {
        AdminStateAction::PublishEvent => {
            if event.state != EventState::Pending {
                return Err(EventboardError::Forbidden(format!(
                    "Only pending events can be published, current state: {}",
                    event.state
                )));
            }
            event.state = EventState::Published;
            event.published_on = Some(now);
        }
        AdminStateAction::RejectEvent => {
            if event.state == EventState::Published {
                return Err(EventboardError::Forbidden(
                    "Published events cannot be rejected".to_string(),
                ));
            }
            event.state = EventState::Canceled;
        }
    }
    Ok(())
}

/// Apply the plain-value part of a patch. Blank strings are ignored; present
/// values are validated before they overwrite.
fn apply_scalar_fields(event: &mut Event, patch: &EventPatch, now: DateTime<Utc>) -> Result<()> {
    if let Some(title) = &patch.title {
        if !title.trim().is_empty() {
            ensure_text_bounds("title", title, TITLE_LEN)?;
            event.title = title.clone();
        }
    }
    if let Some(annotation) = &patch.annotation {
        if !annotation.trim().is_empty() {
            ensure_text_bounds("annotation", annotation, ANNOTATION_LEN)?;
            event.annotation = annotation.clone();
        }
    }
    if let Some(description) = &patch.description {
        if !description.trim().is_empty() {
            ensure_text_bounds("description", description, DESCRIPTION_LEN)?;
            event.description = description.clone();
        }
    }
    if let Some(event_date) = patch.event_date {
        time::ensure_lead_time(event_date, now)?;
        event.event_date = event_date;
    }
    if let Some(limit) = patch.participant_limit {
        ensure_limit_sign(limit)?;
        event.participant_limit = limit;
    }
    if let Some(paid) = patch.paid {
        event.paid = paid;
    }
    if let Some(request_moderation) = patch.request_moderation {
        event.request_moderation = request_moderation;
    }
    Ok(())
}
