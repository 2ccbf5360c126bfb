//! Overpass API client for shop discovery.
//!
//! # Architecture
//!
//! - Sends an Overpass QL query (see [`query`]) as a `text/plain` POST body
//! - Parses the JSON `elements` array and normalizes it into [`NewShop`]s
//! - 30 second request timeout, no retries
//!
//! Caching happens one level up, in [`crate::services::discovery`], because
//! the cached value also includes vote aggregation.

pub mod query;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use thekawatch_core::Coordinates;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::models::NewShop;
use types::OverpassResponse;

/// Request timeout for discovery queries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when querying Overpass.
#[derive(Debug, Error)]
pub enum OverpassError {
    /// HTTP request failed (connect error, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Overpass answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for an Overpass-API-compatible interpreter endpoint.
#[derive(Clone)]
pub struct OverpassClient {
    inner: Arc<OverpassClientInner>,
}

struct OverpassClientInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl OverpassClient {
    /// Create a new Overpass client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(endpoint: Url) -> Result<Self, OverpassError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("thekawatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(OverpassClientInner { client, endpoint }),
        })
    }

    /// Fetch and normalize every alcohol-selling place within `radius_m` metres.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, times out, returns a non-2xx
    /// status, or the body is not valid Overpass JSON.
    #[instrument(skip(self, center), fields(lat = center.lat, lon = center.lon))]
    pub async fn nearby_shops(
        &self,
        center: Coordinates,
        radius_m: u32,
    ) -> Result<Vec<NewShop>, OverpassError> {
        let body = query::nearby_shops(center, radius_m);

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .header("Content-Type", "text/plain")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Overpass returned non-success status"
            );
            return Err(OverpassError::Api {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        let parsed: OverpassResponse = serde_json::from_str(&text)?;
        let element_count = parsed.elements.len();
        let shops = parsed.into_shops();

        debug!(elements = element_count, shops = shops.len(), "Overpass query complete");
        Ok(shops)
    }
}
