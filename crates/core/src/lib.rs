//! ThekaWatch Core - Shared domain library.
//!
//! This crate provides the types and algorithms used across ThekaWatch components:
//! - `api` - Public HTTP API (shops, crowd, status, routing)
//! - `cli` - Command-line tools for migrations and discovery
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Callers pass in votes and the current time; the
//! aggregation results are fully determined by those inputs.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, shop categories, crowd levels, travel modes
//! - [`geo`] - Coordinates and great-circle distance
//! - [`voting`] - Lookback windows, crowd/status aggregation, vote cooldown

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod geo;
pub mod types;
pub mod voting;

pub use geo::{Coordinates, CoordinatesError, haversine_km, round_to_hundredths};
pub use types::*;
pub use voting::{
    CROWD_WINDOW, CrowdSummary, OpenStatus, STATUS_WINDOW, StatusSummary, VOTE_COOLDOWN,
    cooldown_remaining, summarize_crowd, summarize_status,
};
