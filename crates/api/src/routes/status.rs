//! Open/closed status handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thekawatch_core::{ShopId, StatusSummary, VoterId};

use super::require_text;
use crate::error::{AppError, Result};
use crate::services::{aggregation, votes};
use crate::state::AppState;

/// Status vote request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusVoteRequest {
    pub shop_id: Option<String>,
    pub user_id: Option<String>,
    pub is_open: Option<bool>,
}

/// Status vote response body.
#[derive(Debug, Serialize)]
pub struct StatusVoteResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: StatusSummary,
}

/// Submit an open/closed vote.
///
/// # Errors
///
/// 400 for missing fields or a non-boolean `isOpen`, 429 while the voter's
/// cooldown for this shop is active, 500 on storage failure.
pub async fn vote(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StatusVoteRequest>, JsonRejection>,
) -> Result<Json<StatusVoteResponse>> {
    let Json(body) = payload?;

    let (Some(shop_id), Some(user_id), Some(is_open)) = (
        require_text(body.shop_id),
        require_text(body.user_id),
        body.is_open,
    ) else {
        return Err(AppError::BadRequest(
            "shopId, userId, and isOpen are required".to_string(),
        ));
    };

    let summary = votes::cast_status_vote(
        state.pool(),
        &ShopId::from(shop_id),
        &VoterId::from(user_id),
        is_open,
        Utc::now(),
    )
    .await?;

    Ok(Json(StatusVoteResponse {
        success: true,
        summary,
    }))
}

/// Current open/closed estimate for a shop.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn show(
    State(state): State<AppState>,
    Path(shop_id): Path<String>,
) -> Result<Json<StatusSummary>> {
    let summary =
        aggregation::status_summary(state.pool(), &ShopId::from(shop_id), Utc::now()).await?;
    Ok(Json(summary))
}
