//! Integration tests for ThekaWatch.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the API
//! cargo run -p thekawatch-cli -- migrate
//! cargo run -p thekawatch-api
//!
//! # Run the ignored server tests against it
//! THEKAWATCH_BASE_URL=http://127.0.0.1:5000 cargo test -p thekawatch-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `aggregation` - Crowd/status summaries through the public core API (no server)
//! - `voting` - Vote validation and cooldown against a running server
//! - `health` - Liveness and readiness against a running server

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use uuid::Uuid;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// HTTP client pointed at a running API.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Target `THEKAWATCH_BASE_URL`, or the local default port.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("THEKAWATCH_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Absolute URL for an API path such as `/api/crowd/vote`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// A shop id no real `OpenStreetMap` element will collide with.
#[must_use]
pub fn unique_shop_id() -> String {
    format!("node_test{}", Uuid::new_v4().simple())
}

/// A fresh anonymous voter id.
#[must_use]
pub fn unique_voter_id() -> String {
    Uuid::new_v4().to_string()
}
