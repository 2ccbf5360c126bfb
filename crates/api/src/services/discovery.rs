//! Nearby-shop discovery and enrichment.
//!
//! A nearby lookup runs the full pipeline on a cache miss:
//!
//! 1. Query Overpass for alcohol shops, beverage shops and bars in the radius
//! 2. Upsert every result into `thekawatch.shop`
//! 3. Attach distance, crowd level and open status to each shop concurrently
//! 4. Sort by ascending distance
//!
//! The finished response is cached in memory (`moka`, default 5-minute TTL)
//! keyed by the rounded centre and radius, which bounds how often Overpass is
//! hit for the same area. Votes cast meanwhile show up once the entry expires.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use thekawatch_core::{Coordinates, CrowdLevel, OpenStatus, haversine_km, round_to_hundredths};
use tracing::{debug, info, instrument};

use super::aggregation::shop_summaries;
use crate::db::{RepositoryError, ShopRepository};
use crate::error::Result;
use crate::models::NewShop;
use crate::overpass::OverpassClient;

/// Search radius used when the client does not send one, in metres.
pub const DEFAULT_RADIUS_M: u32 = 3000;

/// Largest accepted search radius, in metres.
pub const MAX_RADIUS_M: u32 = 50_000;

const CACHE_CAPACITY: u64 = 1000;

/// Validated parameters of a nearby lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub center: Coordinates,
    pub radius_m: u32,
}

/// Cache key: centre in micro-degrees (about 0.1 m) plus radius.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct NearbyKey {
    lat_e6: i64,
    lon_e6: i64,
    radius_m: u32,
}

impl From<&NearbyQuery> for NearbyKey {
    #[allow(clippy::cast_possible_truncation)] // |degrees| * 1e6 fits easily in i64
    fn from(query: &NearbyQuery) -> Self {
        Self {
            lat_e6: (query.center.lat * 1e6).round() as i64,
            lon_e6: (query.center.lon * 1e6).round() as i64,
            radius_m: query.radius_m,
        }
    }
}

/// A discovered shop with distance and live vote aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedShop {
    #[serde(flatten)]
    pub shop: NewShop,
    /// Kilometres from the query centre, two decimal places.
    pub distance: f64,
    pub crowd_level: Option<CrowdLevel>,
    pub open_status: Option<OpenStatus>,
}

/// Response body of a nearby lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyShops {
    pub shops: Vec<EnrichedShop>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Nearby-shop lookup with a TTL cache in front of Overpass.
#[derive(Clone)]
pub struct ShopDiscovery {
    inner: Arc<ShopDiscoveryInner>,
}

struct ShopDiscoveryInner {
    overpass: OverpassClient,
    cache: Cache<NearbyKey, Arc<NearbyShops>>,
}

impl ShopDiscovery {
    /// Create a discovery service whose cached responses live for `ttl`.
    #[must_use]
    pub fn new(overpass: OverpassClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(ShopDiscoveryInner { overpass, cache }),
        }
    }

    /// Shops around `query.center`, nearest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Overpass` if discovery fails and
    /// `AppError::Database` if shops cannot be stored or enriched.
    #[instrument(skip(self, pool, query), fields(lat = query.center.lat, lon = query.center.lon, radius = query.radius_m))]
    pub async fn nearby(
        &self,
        pool: &PgPool,
        query: NearbyQuery,
        now: DateTime<Utc>,
    ) -> Result<Arc<NearbyShops>> {
        let key = NearbyKey::from(&query);

        if let Some(cached) = self.inner.cache.get(&key).await {
            debug!("Cache hit for nearby shops");
            return Ok(cached);
        }

        let shops = refresh_shops(&self.inner.overpass, pool, query, now).await?;
        let shops = enrich(pool, query.center, shops, now).await?;

        let response = Arc::new(NearbyShops {
            count: shops.len(),
            shops,
            timestamp: now,
        });

        self.inner.cache.insert(key, Arc::clone(&response)).await;
        Ok(response)
    }
}

/// Fetch shops from Overpass and upsert them, returning what was found.
///
/// # Errors
///
/// Returns `AppError::Overpass` or `AppError::Database`.
pub async fn refresh_shops(
    overpass: &OverpassClient,
    pool: &PgPool,
    query: NearbyQuery,
    now: DateTime<Utc>,
) -> Result<Vec<NewShop>> {
    let shops = overpass.nearby_shops(query.center, query.radius_m).await?;
    ShopRepository::new(pool).upsert_many(&shops, now).await?;

    info!(count = shops.len(), "Shops refreshed from Overpass");
    Ok(shops)
}

/// Attach distance and vote summaries to each shop, nearest first.
///
/// Shops are enriched concurrently; each one issues its crowd and status
/// queries in parallel.
///
/// # Errors
///
/// Returns the first `RepositoryError` encountered.
pub async fn enrich(
    pool: &PgPool,
    center: Coordinates,
    shops: Vec<NewShop>,
    now: DateTime<Utc>,
) -> std::result::Result<Vec<EnrichedShop>, RepositoryError> {
    let mut enriched = try_join_all(shops.into_iter().map(|shop| async move {
        let (crowd, status) = shop_summaries(pool, &shop.osm_id, now).await?;
        let distance = round_to_hundredths(haversine_km(center, shop.coordinates()));

        Ok::<_, RepositoryError>(EnrichedShop {
            shop,
            distance,
            crowd_level: crowd.crowd_level,
            open_status: status.open_status,
        })
    }))
    .await?;

    sort_by_distance(&mut enriched);
    Ok(enriched)
}

fn sort_by_distance(shops: &mut [EnrichedShop]) {
    shops.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}
