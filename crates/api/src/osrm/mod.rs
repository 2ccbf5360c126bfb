//! OSRM routing client.
//!
//! Calls the `route` service of an OSRM-compatible server and reduces the
//! first returned route to kilometres, whole minutes, and a `GeoJSON` line.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thekawatch_core::{Coordinates, TravelMode, round_to_hundredths};
use thiserror::Error;
use tracing::instrument;
use url::Url;

/// Request timeout for routing calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OSRM response codes meaning the points cannot be connected.
const NO_ROUTE_CODES: [&str; 2] = ["NoRoute", "NoSegment"];

/// Errors that can occur when querying OSRM.
#[derive(Debug, Error)]
pub enum OsrmError {
    /// HTTP request failed (connect error, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// OSRM answered with a non-success status it did not explain as "no route".
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// OSRM found no route between the points.
    #[error("no route found")]
    NoRoute,

    /// The configured base URL cannot be extended into a route URL.
    #[error("invalid OSRM URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A normalized route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Kilometres, two decimal places.
    pub distance: f64,
    /// Minutes, rounded up.
    pub duration: u64,
    /// `GeoJSON` `LineString`, passed through from OSRM.
    pub geometry: serde_json::Value,
    pub mode: TravelMode,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    /// Metres.
    distance: f64,
    /// Seconds.
    duration: f64,
    geometry: serde_json::Value,
}

impl RawRoute {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // non-negative, far below u64::MAX
    fn normalize(self, mode: TravelMode) -> Route {
        Route {
            distance: round_to_hundredths(self.distance / 1000.0),
            duration: (self.duration / 60.0).ceil().max(0.0) as u64,
            geometry: self.geometry,
            mode,
        }
    }
}

/// Client for an OSRM-compatible routing server.
#[derive(Clone)]
pub struct OsrmClient {
    inner: Arc<OsrmClientInner>,
}

struct OsrmClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl OsrmClient {
    /// Create a new OSRM client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: Url) -> Result<Self, OsrmError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("thekawatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(OsrmClientInner { client, base_url }),
        })
    }

    /// Build the `route` service URL. OSRM takes coordinates as `lon,lat`.
    fn route_url(
        &self,
        from: Coordinates,
        to: Coordinates,
        mode: TravelMode,
    ) -> Result<Url, OsrmError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{base}/route/v1/{}/{},{};{},{}",
            mode.profile(),
            from.lon,
            from.lat,
            to.lon,
            to.lat
        ))?;

        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson")
            .append_pair("steps", "false");

        Ok(url)
    }

    /// Fetch a route between two points.
    ///
    /// # Errors
    ///
    /// Returns `OsrmError::NoRoute` when OSRM reports the points cannot be
    /// connected, and other variants for transport, status, or parse failures.
    #[instrument(skip(self, mode), fields(mode = %mode))]
    pub async fn route(
        &self,
        from: Coordinates,
        to: Coordinates,
        mode: TravelMode,
    ) -> Result<Route, OsrmError> {
        let url = self.route_url(from, to, mode)?;
        let response = self.inner.client.get(url).send().await?;

        let status = response.status();
        let text = response.text().await?;

        parse_route_response(status, &text, mode)
    }
}

/// Interpret an OSRM `route` response.
fn parse_route_response(
    status: reqwest::StatusCode,
    body: &str,
    mode: TravelMode,
) -> Result<Route, OsrmError> {
    if !status.is_success() {
        // OSRM explains unreachable destinations with a 400 and a JSON code
        if let Ok(parsed) = serde_json::from_str::<RouteResponse>(body)
            && NO_ROUTE_CODES.contains(&parsed.code.as_str())
        {
            return Err(OsrmError::NoRoute);
        }

        tracing::error!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "OSRM returned non-success status"
        );
        return Err(OsrmError::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    let parsed: RouteResponse = serde_json::from_str(body)?;
    if parsed.code != "Ok" {
        tracing::debug!(code = %parsed.code, message = ?parsed.message, "OSRM reported no route");
        return Err(OsrmError::NoRoute);
    }

    parsed
        .routes
        .into_iter()
        .next()
        .map(|r| r.normalize(mode))
        .ok_or(OsrmError::NoRoute)
}
