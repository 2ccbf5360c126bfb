//! Core types for ThekaWatch.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod crowd;
pub mod id;
pub mod travel_mode;

pub use category::{ShopCategory, UnknownCategory};
pub use crowd::{CrowdLevel, InvalidCrowdLevel};
pub use id::*;
pub use travel_mode::TravelMode;
