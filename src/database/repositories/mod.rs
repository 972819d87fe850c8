//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod category;
pub mod event;
pub mod location;
pub mod request;
pub mod user;

// Re-export repositories
pub use category::CategoryRepository;
pub use event::{EventRepository, SearchOrder};
pub use location::LocationRepository;
pub use request::RequestRepository;
pub use user::UserRepository;
