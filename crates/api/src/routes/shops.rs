//! Shop handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thekawatch_core::{
    Coordinates, CrowdLevel, OpenStatus, ShopId, haversine_km, round_to_hundredths,
};

use super::{coordinates, optional_param};
use crate::db::ShopRepository;
use crate::error::{AppError, Result};
use crate::models::Shop;
use crate::services::aggregation::shop_summaries;
use crate::services::discovery::{DEFAULT_RADIUS_M, MAX_RADIUS_M};
use crate::services::{NearbyQuery, NearbyShops};
use crate::state::AppState;

/// Query parameters for `GET /shops/nearby`.
#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    #[serde(default, deserialize_with = "optional_param")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "optional_param")]
    pub lon: Option<f64>,
    /// Metres.
    #[serde(default, deserialize_with = "optional_param")]
    pub radius: Option<u32>,
}

impl NearbyParams {
    fn validate(self) -> Result<NearbyQuery> {
        let (Some(lat), Some(lon)) = (self.lat, self.lon) else {
            return Err(AppError::BadRequest("lat and lon are required".to_string()));
        };

        let radius_m = self.radius.unwrap_or(DEFAULT_RADIUS_M);
        if radius_m == 0 || radius_m > MAX_RADIUS_M {
            return Err(AppError::BadRequest(format!(
                "radius must be between 1 and {MAX_RADIUS_M} metres"
            )));
        }

        Ok(NearbyQuery {
            center: coordinates(lat, lon)?,
            radius_m,
        })
    }
}

/// Query parameters for `GET /shops/{shop_id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowParams {
    #[serde(default, deserialize_with = "optional_param")]
    pub user_lat: Option<f64>,
    #[serde(default, deserialize_with = "optional_param")]
    pub user_lon: Option<f64>,
}

/// A stored shop with live vote aggregation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopDetails {
    #[serde(flatten)]
    pub shop: Shop,
    /// Kilometres from the caller, when the caller sent a position.
    pub distance: Option<f64>,
    pub crowd_level: Option<CrowdLevel>,
    pub open_status: Option<OpenStatus>,
}

/// Shops near a point, nearest first, with crowd and status.
///
/// # Errors
///
/// 400 for missing or out-of-range parameters, 500 if discovery or storage fails.
pub async fn nearby(
    State(state): State<AppState>,
    params: std::result::Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<NearbyShops>> {
    let Query(params) = params?;
    let query = params.validate()?;

    let response = state
        .discovery()
        .nearby(state.pool(), query, Utc::now())
        .await?;

    Ok(Json(NearbyShops::clone(&response)))
}

/// A single stored shop.
///
/// # Errors
///
/// 404 if the shop was never discovered, 400 for an out-of-range position,
/// 500 on storage failure.
pub async fn show(
    State(state): State<AppState>,
    Path(shop_id): Path<String>,
    params: std::result::Result<Query<ShowParams>, QueryRejection>,
) -> Result<Json<ShopDetails>> {
    let Query(params) = params?;
    let user_position = match (params.user_lat, params.user_lon) {
        (Some(lat), Some(lon)) => Some(coordinates(lat, lon)?),
        _ => None,
    };

    let shop_id = ShopId::from(shop_id);
    let shop = ShopRepository::new(state.pool())
        .get_by_id(&shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found".to_string()))?;

    let (crowd, status) = shop_summaries(state.pool(), &shop_id, Utc::now()).await?;
    let distance = user_position
        .map(|from: Coordinates| round_to_hundredths(haversine_km(from, shop.coordinates())));

    Ok(Json(ShopDetails {
        shop,
        distance,
        crowd_level: crowd.crowd_level,
        open_status: status.open_status,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(lat: Option<f64>, lon: Option<f64>, radius: Option<u32>) -> NearbyParams {
        NearbyParams { lat, lon, radius }
    }

    #[test]
    fn test_default_radius() {
        let query = params(Some(28.6), Some(77.2), None).validate().unwrap();
        assert_eq!(query.radius_m, 3000);
    }

    #[test]
    fn test_missing_coordinates() {
        let err = params(Some(28.6), None, None).validate().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "lat and lon are required"));
    }

    #[test]
    fn test_radius_bounds() {
        assert!(params(Some(1.0), Some(1.0), Some(0)).validate().is_err());
        assert!(params(Some(1.0), Some(1.0), Some(50_001)).validate().is_err());
        assert!(params(Some(1.0), Some(1.0), Some(50_000)).validate().is_ok());
    }

    #[test]
    fn test_out_of_range_latitude() {
        let err = params(Some(123.0), Some(1.0), None).validate().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
