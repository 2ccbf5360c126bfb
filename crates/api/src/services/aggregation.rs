//! Read-side vote aggregation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thekawatch_core::{
    CROWD_WINDOW, CrowdSummary, STATUS_WINDOW, ShopId, StatusSummary, summarize_crowd,
    summarize_status,
};

use crate::db::{CrowdVoteRepository, RepositoryError, StatusVoteRepository};

/// Crowd level over the last 20 minutes of votes.
///
/// # Errors
///
/// Returns `RepositoryError` if the votes cannot be loaded.
pub async fn crowd_summary(
    pool: &PgPool,
    shop_id: &ShopId,
    now: DateTime<Utc>,
) -> Result<CrowdSummary, RepositoryError> {
    let levels = CrowdVoteRepository::new(pool)
        .levels_since(shop_id, now - CROWD_WINDOW)
        .await?;

    Ok(summarize_crowd(levels))
}

/// Open/closed majority over the last 15 minutes of votes.
///
/// # Errors
///
/// Returns `RepositoryError` if the votes cannot be loaded.
pub async fn status_summary(
    pool: &PgPool,
    shop_id: &ShopId,
    now: DateTime<Utc>,
) -> Result<StatusSummary, RepositoryError> {
    let votes = StatusVoteRepository::new(pool)
        .since(shop_id, now - STATUS_WINDOW)
        .await?;

    Ok(summarize_status(
        votes.into_iter().map(|v| (v.is_open, v.created_at)),
        now,
    ))
}

/// Both summaries, loaded concurrently.
///
/// # Errors
///
/// Returns the first `RepositoryError` from either query.
pub async fn shop_summaries(
    pool: &PgPool,
    shop_id: &ShopId,
    now: DateTime<Utc>,
) -> Result<(CrowdSummary, StatusSummary), RepositoryError> {
    tokio::try_join!(
        crowd_summary(pool, shop_id, now),
        status_summary(pool, shop_id, now)
    )
}
