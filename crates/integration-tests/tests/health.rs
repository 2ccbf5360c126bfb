//! Liveness and readiness against a running server.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use thekawatch_integration_tests::TestContext;

#[tokio::test]
#[ignore = "requires a running API"]
async fn test_health() {
    let ctx = TestContext::from_env();
    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
#[ignore = "requires a running API and database"]
async fn test_ready() {
    let ctx = TestContext::from_env();
    let resp = ctx.client.get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
