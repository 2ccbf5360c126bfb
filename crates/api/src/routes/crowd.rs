//! Crowd level handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thekawatch_core::{CrowdLevel, CrowdSummary, ShopId, VoterId};

use super::require_text;
use crate::error::{AppError, Result};
use crate::services::{aggregation, votes};
use crate::state::AppState;

/// Crowd vote request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrowdVoteRequest {
    pub shop_id: Option<String>,
    pub user_id: Option<String>,
    pub level: Option<i64>,
}

/// Crowd vote response body.
#[derive(Debug, Serialize)]
pub struct CrowdVoteResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: CrowdSummary,
}

/// Submit a crowd level vote (1 = quiet, 3 = packed).
///
/// # Errors
///
/// 400 for missing or out-of-range fields, 429 while the voter's cooldown for
/// this shop is active, 500 on storage failure.
pub async fn vote(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CrowdVoteRequest>, JsonRejection>,
) -> Result<Json<CrowdVoteResponse>> {
    let Json(body) = payload?;

    let (Some(shop_id), Some(user_id), Some(level)) = (
        require_text(body.shop_id),
        require_text(body.user_id),
        body.level,
    ) else {
        return Err(AppError::BadRequest(
            "shopId, userId, and level are required".to_string(),
        ));
    };

    let level = CrowdLevel::try_from(level)
        .map_err(|_| AppError::BadRequest("level must be between 1 and 3".to_string()))?;

    let summary = votes::cast_crowd_vote(
        state.pool(),
        &ShopId::from(shop_id),
        &VoterId::from(user_id),
        level,
        Utc::now(),
    )
    .await?;

    Ok(Json(CrowdVoteResponse {
        success: true,
        summary,
    }))
}

/// Current crowd level for a shop.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn show(
    State(state): State<AppState>,
    Path(shop_id): Path<String>,
) -> Result<Json<CrowdSummary>> {
    let summary =
        aggregation::crowd_summary(state.pool(), &ShopId::from(shop_id), Utc::now()).await?;
    Ok(Json(summary))
}
