//! Crowd and status aggregation through the public core API.

#![allow(clippy::unwrap_used)]

use chrono::{TimeDelta, TimeZone, Utc};
use thekawatch_core::{
    Coordinates, CrowdLevel, cooldown_remaining, haversine_km, summarize_crowd, summarize_status,
};

#[test]
fn test_mostly_quiet_votes_are_low() {
    let summary = summarize_crowd([CrowdLevel::Low, CrowdLevel::Low, CrowdLevel::Medium]);
    assert_eq!(summary.crowd_level, Some(CrowdLevel::Low));
    assert_eq!(summary.vote_count, 3);
}

#[test]
fn test_open_majority_confidence() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap();
    let votes = [
        (true, now - TimeDelta::minutes(7)),
        (true, now - TimeDelta::minutes(4)),
        (false, now - TimeDelta::minutes(9)),
    ];

    let summary = summarize_status(votes, now);
    let status = summary.open_status.unwrap();

    assert!(status.is_open);
    assert_eq!(status.updated_ago, 4);
    assert!((status.confidence - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(summary.vote_count, 3);
}

#[test]
fn test_no_votes_is_null_summary() {
    let now = Utc::now();
    let crowd = summarize_crowd(std::iter::empty::<CrowdLevel>());
    let status = summarize_status(std::iter::empty::<(bool, chrono::DateTime<Utc>)>(), now);

    let crowd_json = serde_json::to_value(&crowd).unwrap();
    let status_json = serde_json::to_value(&status).unwrap();

    assert!(crowd_json["crowdLevel"].is_null());
    assert_eq!(crowd_json["voteCount"], 0);
    assert!(status_json["openStatus"].is_null());
    assert_eq!(status_json["voteCount"], 0);
}

#[test]
fn test_cooldown_wait_is_positive() {
    let now = Utc::now();
    let wait = cooldown_remaining(now - TimeDelta::seconds(30), now).unwrap();
    assert!(wait >= 1);
}

#[test]
fn test_same_point_distance_is_zero() {
    let point = Coordinates::new(19.076, 72.8777).unwrap();
    assert!(haversine_km(point, point).abs() < f64::EPSILON);
}
