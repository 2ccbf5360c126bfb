//! Business logic shared by route handlers and the CLI.
//!
//! - [`aggregation`] - current crowd level and open status for a shop
//! - [`votes`] - cooldown-checked vote submission
//! - [`discovery`] - nearby-shop lookup, persistence, enrichment, caching

pub mod aggregation;
pub mod discovery;
pub mod votes;

pub use discovery::{NearbyQuery, NearbyShops, ShopDiscovery};
