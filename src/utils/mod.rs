//! Utility modules
//!
//! This module contains common utilities used throughout the application,
//! including error handling, logging setup, and wire timestamp handling.

pub mod errors;
pub mod logging;
pub mod time;

pub use errors::{EventboardError, Result};
