//! Vote repositories.
//!
//! Both vote kinds are append-only. The cooldown is enforced by
//! [`latest_by_voter`](CrowdVoteRepository::latest_by_voter) followed by an
//! insert; the two statements are not atomic, so concurrent submissions from
//! the same voter can both be accepted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thekawatch_core::{CrowdLevel, ShopId, VoterId};

use super::RepositoryError;
use crate::models::{CrowdVote, StatusVote};

/// Repository for crowd votes.
pub struct CrowdVoteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CrowdVoteRepository<'a> {
    /// Create a new crowd vote repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Timestamp of the voter's most recent vote for the shop at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_by_voter(
        &self,
        shop_id: &ShopId,
        voter_id: &VoterId,
        since: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r"
            SELECT created_at FROM thekawatch.crowd_vote
            WHERE shop_id = $1 AND user_id = $2 AND created_at >= $3
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(shop_id)
        .bind(voter_id)
        .bind(since)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| r.0))
    }

    /// Record a crowd vote.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        shop_id: &ShopId,
        voter_id: &VoterId,
        level: CrowdLevel,
        cast_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO thekawatch.crowd_vote (shop_id, user_id, level, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(shop_id)
        .bind(voter_id)
        .bind(level.level())
        .bind(cast_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// All crowd levels voted for the shop at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored level is outside 1-3.
    pub async fn levels_since(
        &self,
        shop_id: &ShopId,
        since: DateTime<Utc>,
    ) -> Result<Vec<CrowdLevel>, RepositoryError> {
        let votes = sqlx::query_as::<_, CrowdVote>(
            r"
            SELECT shop_id, user_id, level, created_at
            FROM thekawatch.crowd_vote
            WHERE shop_id = $1 AND created_at >= $2
            ",
        )
        .bind(shop_id)
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        votes
            .into_iter()
            .map(|v| {
                CrowdLevel::try_from(v.level).map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "invalid crowd level for shop {}: {e}",
                        v.shop_id
                    ))
                })
            })
            .collect()
    }
}

/// Repository for open/closed votes.
pub struct StatusVoteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatusVoteRepository<'a> {
    /// Create a new status vote repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Timestamp of the voter's most recent status vote for the shop at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_by_voter(
        &self,
        shop_id: &ShopId,
        voter_id: &VoterId,
        since: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r"
            SELECT created_at FROM thekawatch.status_vote
            WHERE shop_id = $1 AND user_id = $2 AND created_at >= $3
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(shop_id)
        .bind(voter_id)
        .bind(since)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| r.0))
    }

    /// Record an open/closed vote.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        shop_id: &ShopId,
        voter_id: &VoterId,
        is_open: bool,
        cast_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO thekawatch.status_vote (shop_id, user_id, is_open, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(shop_id)
        .bind(voter_id)
        .bind(is_open)
        .bind(cast_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Status votes for the shop at or after `since`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn since(
        &self,
        shop_id: &ShopId,
        since: DateTime<Utc>,
    ) -> Result<Vec<StatusVote>, RepositoryError> {
        let votes = sqlx::query_as::<_, StatusVote>(
            r"
            SELECT shop_id, user_id, is_open, created_at
            FROM thekawatch.status_vote
            WHERE shop_id = $1 AND created_at >= $2
            ORDER BY created_at DESC
            ",
        )
        .bind(shop_id)
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        Ok(votes)
    }
}
