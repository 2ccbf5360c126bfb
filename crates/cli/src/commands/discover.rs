//! One-off shop discovery for a point.
//!
//! Runs the same Overpass fetch and upsert the API performs on a cache miss,
//! without the enrichment step. Useful for warming a fresh database or
//! checking that an Overpass mirror answers.
//!
//! ```bash
//! tw-cli discover --lat 28.6139 --lon 77.2090 --radius 5000
//! ```

use chrono::Utc;
use thekawatch_api::config::{ConfigError, UpstreamConfig, get_database_url};
use thekawatch_api::db;
use thekawatch_api::error::AppError;
use thekawatch_api::overpass::{OverpassClient, OverpassError};
use thekawatch_api::services::NearbyQuery;
use thekawatch_api::services::discovery::refresh_shops;
use thekawatch_core::{Coordinates, CoordinatesError};

/// Errors from a discovery run.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid coordinates: {0}")]
    Coordinates(#[from] CoordinatesError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Overpass client error: {0}")]
    Client(#[from] OverpassError),

    #[error("Discovery failed: {0}")]
    Discovery(#[from] AppError),
}

/// Fetch shops around a point and store them.
///
/// # Errors
///
/// Returns `DiscoverError` if configuration is missing, the coordinates are
/// out of range, or the fetch or upsert fails.
pub async fn run(lat: f64, lon: f64, radius_m: u32) -> Result<(), DiscoverError> {
    let _ = dotenvy::dotenv();

    let center = Coordinates::new(lat, lon)?;
    let database_url = get_database_url("THEKAWATCH_DATABASE_URL")?;
    let upstream = UpstreamConfig::from_env()?;

    let pool = db::create_pool(&database_url).await?;
    let overpass = OverpassClient::new(upstream.overpass_url)?;

    tracing::info!(lat, lon, radius_m, "Discovering shops");
    let shops = refresh_shops(
        &overpass,
        &pool,
        NearbyQuery { center, radius_m },
        Utc::now(),
    )
    .await?;

    for shop in &shops {
        tracing::debug!(
            osm_id = %shop.osm_id,
            name = %shop.name,
            category = %shop.category,
            "Stored shop"
        );
    }

    tracing::info!(count = shops.len(), "Discovery complete");
    Ok(())
}
