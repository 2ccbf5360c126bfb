//! Vote submission with a per-voter cooldown.
//!
//! The cooldown check and the insert are separate statements. Two requests
//! from the same voter racing each other can both pass the check; that gap is
//! accepted rather than closed with a unique constraint.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thekawatch_core::{
    CrowdLevel, CrowdSummary, ShopId, StatusSummary, VOTE_COOLDOWN, VoterId, cooldown_remaining,
};
use tracing::{info, instrument};

use super::aggregation::{crowd_summary, status_summary};
use crate::db::{CrowdVoteRepository, StatusVoteRepository};
use crate::error::{AppError, Result};

/// Reject the vote if `last_vote_at` is still inside the cooldown.
fn check_cooldown(last_vote_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<()> {
    last_vote_at
        .and_then(|last| cooldown_remaining(last, now))
        .map_or(Ok(()), |wait_minutes| {
            Err(AppError::CooldownActive { wait_minutes })
        })
}

/// Record a crowd vote and return the refreshed crowd level.
///
/// # Errors
///
/// Returns `AppError::CooldownActive` if the voter voted on this shop within
/// the last 10 minutes, or `AppError::Database` on storage failure.
#[instrument(
    skip(pool, shop_id, voter_id, level),
    fields(shop_id = %shop_id, level = level.level())
)]
pub async fn cast_crowd_vote(
    pool: &PgPool,
    shop_id: &ShopId,
    voter_id: &VoterId,
    level: CrowdLevel,
    now: DateTime<Utc>,
) -> Result<CrowdSummary> {
    let repo = CrowdVoteRepository::new(pool);

    let last = repo
        .latest_by_voter(shop_id, voter_id, now - VOTE_COOLDOWN)
        .await?;
    check_cooldown(last, now)?;

    repo.insert(shop_id, voter_id, level, now).await?;
    info!("Crowd vote recorded");

    Ok(crowd_summary(pool, shop_id, now).await?)
}

/// Record an open/closed vote and return the refreshed status.
///
/// # Errors
///
/// Returns `AppError::CooldownActive` if the voter voted on this shop within
/// the last 10 minutes, or `AppError::Database` on storage failure.
#[instrument(skip(pool, shop_id, voter_id), fields(shop_id = %shop_id))]
pub async fn cast_status_vote(
    pool: &PgPool,
    shop_id: &ShopId,
    voter_id: &VoterId,
    is_open: bool,
    now: DateTime<Utc>,
) -> Result<StatusSummary> {
    let repo = StatusVoteRepository::new(pool);

    let last = repo
        .latest_by_voter(shop_id, voter_id, now - VOTE_COOLDOWN)
        .await?;
    check_cooldown(last, now)?;

    repo.insert(shop_id, voter_id, is_open, now).await?;
    info!(is_open, "Status vote recorded");

    Ok(status_summary(pool, shop_id, now).await?)
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn test_no_previous_vote_passes() {
        assert!(check_cooldown(None, Utc::now()).is_ok());
    }

    #[test]
    fn test_second_vote_within_cooldown_is_rejected() {
        let now = Utc::now();
        let result = check_cooldown(Some(now - TimeDelta::minutes(2)), now);
        match result {
            Err(AppError::CooldownActive { wait_minutes }) => assert_eq!(wait_minutes, 8),
            other => panic!("expected cooldown, got {other:?}"),
        }
    }

    #[test]
    fn test_vote_after_cooldown_passes() {
        let now = Utc::now();
        assert!(check_cooldown(Some(now - TimeDelta::minutes(11)), now).is_ok());
    }
}
