//! Crowd and status aggregation over recent votes.
//!
//! Votes are append-only and never expire from storage; only the ones cast
//! inside a lookback window count toward the current picture:
//!
//! | Vote kind | Window       | Result                                  |
//! |-----------|--------------|-----------------------------------------|
//! | crowd     | 20 minutes   | mean level bucketed into Low/Medium/High |
//! | status    | 15 minutes   | majority open/closed with confidence     |
//!
//! A voter may cast one vote of each kind per shop every 10 minutes.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::types::CrowdLevel;

/// Lookback window for crowd votes.
pub const CROWD_WINDOW: TimeDelta = TimeDelta::minutes(20);

/// Lookback window for open/closed votes.
pub const STATUS_WINDOW: TimeDelta = TimeDelta::minutes(15);

/// Minimum time between two votes of the same kind by one voter for one shop.
pub const VOTE_COOLDOWN: TimeDelta = TimeDelta::minutes(10);

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Aggregated crowd level for a shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrowdSummary {
    /// `None` when nobody voted inside the window.
    pub crowd_level: Option<CrowdLevel>,
    pub vote_count: usize,
}

/// Majority-vote estimate of whether a shop is open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStatus {
    pub is_open: bool,
    /// Whole minutes since the most recent vote.
    pub updated_ago: i64,
    /// Share of votes agreeing with the majority, in `0.5..=1.0`.
    pub confidence: f64,
}

/// Aggregated open/closed status for a shop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    /// `None` when nobody voted inside the window.
    pub open_status: Option<OpenStatus>,
    pub vote_count: usize,
}

/// Bucket the mean of the given crowd votes.
#[must_use]
pub fn summarize_crowd<I>(levels: I) -> CrowdSummary
where
    I: IntoIterator<Item = CrowdLevel>,
{
    let (count, sum) = levels
        .into_iter()
        .fold((0_usize, 0_i64), |(count, sum), level| {
            (count + 1, sum + i64::from(level.level()))
        });

    if count == 0 {
        return CrowdSummary {
            crowd_level: None,
            vote_count: 0,
        };
    }

    #[allow(clippy::cast_precision_loss)] // vote counts are tiny
    let mean = sum as f64 / count as f64;

    CrowdSummary {
        crowd_level: Some(CrowdLevel::from_mean(mean)),
        vote_count: count,
    }
}

/// Majority vote over `(is_open, cast_at)` pairs. A tie reports closed.
#[must_use]
pub fn summarize_status<I>(votes: I, now: DateTime<Utc>) -> StatusSummary
where
    I: IntoIterator<Item = (bool, DateTime<Utc>)>,
{
    let mut open = 0_usize;
    let mut closed = 0_usize;
    let mut latest: Option<DateTime<Utc>> = None;

    for (is_open, cast_at) in votes {
        if is_open {
            open += 1;
        } else {
            closed += 1;
        }
        latest = Some(latest.map_or(cast_at, |l| l.max(cast_at)));
    }

    let total = open + closed;
    let Some(latest) = latest else {
        return StatusSummary {
            open_status: None,
            vote_count: 0,
        };
    };

    #[allow(clippy::cast_precision_loss)] // vote counts are tiny
    let confidence = open.max(closed) as f64 / total as f64;
    let updated_ago = (now - latest).num_minutes().max(0);

    StatusSummary {
        open_status: Some(OpenStatus {
            is_open: open > closed,
            updated_ago,
            confidence,
        }),
        vote_count: total,
    }
}

/// Minutes a voter still has to wait after voting at `last_vote_at`.
///
/// Returns `None` once the cooldown has elapsed. Partial minutes round up and
/// the result is never below one.
#[must_use]
pub fn cooldown_remaining(last_vote_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    if now - last_vote_at > VOTE_COOLDOWN {
        return None;
    }

    let millis = (last_vote_at + VOTE_COOLDOWN - now).num_milliseconds();
    let minutes = (millis + MILLIS_PER_MINUTE - 1).div_euclid(MILLIS_PER_MINUTE);
    Some(minutes.max(1))
}
