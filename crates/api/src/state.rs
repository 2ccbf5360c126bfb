//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::osrm::{OsrmClient, OsrmError};
use crate::overpass::{OverpassClient, OverpassError};
use crate::services::ShopDiscovery;

/// Error building the upstream HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("overpass client: {0}")]
    Overpass(#[from] OverpassError),
    #[error("osrm client: {0}")]
    Osrm(#[from] OsrmError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    discovery: ShopDiscovery,
    osrm: OsrmClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if an upstream HTTP client cannot be built.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, StateError> {
        let overpass = OverpassClient::new(config.upstream.overpass_url.clone())?;
        let discovery = ShopDiscovery::new(overpass, config.shops_cache_ttl);
        let osrm = OsrmClient::new(config.upstream.osrm_url.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                discovery,
                osrm,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cached shop discovery service.
    #[must_use]
    pub fn discovery(&self) -> &ShopDiscovery {
        &self.inner.discovery
    }

    /// Get a reference to the OSRM routing client.
    #[must_use]
    pub fn osrm(&self) -> &OsrmClient {
        &self.inner.osrm
    }
}
