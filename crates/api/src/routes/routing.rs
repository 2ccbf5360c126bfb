//! Route handler.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use thekawatch_core::TravelMode;

use super::{coordinates, optional_param};
use crate::error::{AppError, Result};
use crate::osrm::Route;
use crate::state::AppState;

/// Query parameters for `GET /routing/route`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteParams {
    #[serde(default, deserialize_with = "optional_param")]
    pub from_lat: Option<f64>,
    #[serde(default, deserialize_with = "optional_param")]
    pub from_lon: Option<f64>,
    #[serde(default, deserialize_with = "optional_param")]
    pub to_lat: Option<f64>,
    #[serde(default, deserialize_with = "optional_param")]
    pub to_lon: Option<f64>,
    /// `car` or `foot` (default).
    pub mode: Option<String>,
}

/// Walking or driving route between two points.
///
/// # Errors
///
/// 400 for missing or out-of-range coordinates, 404 when no route exists,
/// 500 if the routing service fails.
pub async fn route(
    State(state): State<AppState>,
    params: std::result::Result<Query<RouteParams>, QueryRejection>,
) -> Result<Json<Route>> {
    let Query(params) = params?;

    let (Some(from_lat), Some(from_lon), Some(to_lat), Some(to_lon)) = (
        params.from_lat,
        params.from_lon,
        params.to_lat,
        params.to_lon,
    ) else {
        return Err(AppError::BadRequest(
            "fromLat, fromLon, toLat, and toLon are required".to_string(),
        ));
    };

    let from = coordinates(from_lat, from_lon)?;
    let to = coordinates(to_lat, to_lon)?;
    let mode = TravelMode::from_query(params.mode.as_deref());

    let route = state.osrm().route(from, to, mode).await?;
    Ok(Json(route))
}
