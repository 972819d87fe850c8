//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod category;
pub mod event;
pub mod filter;
pub mod location;
pub mod request;
pub mod user;

// Re-export commonly used models
pub use category::Category;
pub use event::{
    AdminEventUpdate, AdminStateAction, Event, EventFull, EventPatch, EventState, EventSummary,
    NewEvent, NewEventRecord, OwnerEventUpdate, OwnerStateAction,
};
pub use filter::{Criterion, EventFilter, Page, SortKey};
pub use location::{GeoPoint, Location};
pub use request::{
    ParticipationRequest, RequestStatus, RequestView, StatusUpdate, StatusUpdateResult,
};
pub use user::{User, UserShort};
