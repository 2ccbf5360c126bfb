//! Per-IP rate limiting using governor and `tower_governor`.
//!
//! This sits in front of the per-voter cooldown and only caps raw request
//! volume from a single address. Rejections use the same JSON error body as
//! every other endpoint.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response, StatusCode},
    response::IntoResponse,
};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use serde_json::json;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor for the client IP.
///
/// The socket peer is the key unless `trust_proxy_headers` is set, in which
/// case the first hop of `X-Forwarded-For` (then `X-Real-IP`) wins. Proxy
/// headers are client-controlled without a proxy in front to overwrite them.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(trust_proxy_headers: bool) -> Self {
        Self {
            trust_proxy_headers,
        }
    }

    fn from_headers<T>(req: &Request<T>) -> Option<IpAddr> {
        let headers = req.headers();

        // First hop of X-Forwarded-For
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Some(ip);
        }

        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_proxy_headers
            && let Some(ip) = Self::from_headers(req)
        {
            return Ok(ip);
        }

        // Needs `into_make_service_with_connect_info`
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, Body>;

/// Create rate limiter for vote submission: ~30 requests per minute per IP.
///
/// Configuration: 1 request every 2 seconds (replenish), burst of 20. A
/// household sharing one address can still vote on a handful of shops at once.
///
/// # Panics
///
/// This function will not panic. `per_second(2)` and `burst_size(20)` are
/// both non-zero, which is all `GovernorConfigBuilder` checks.
#[must_use]
pub fn vote_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy_headers))
        .per_second(2)
        .burst_size(20)
        .finish()
        .expect("rate limiter config with per_second(2) and burst_size(20) is valid");
    GovernorLayer::new(Arc::new(config)).error_handler(governor_error_response)
}

/// JSON body for limiter rejections, keeping governor's `retry-after` headers.
fn governor_error_response(error: GovernorError) -> Response<Body> {
    match error {
        GovernorError::TooManyRequests { headers, .. } => {
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "Rate limit exceeded" })),
            )
                .into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        GovernorError::UnableToExtractKey => {
            tracing::error!("Rate limiter could not determine client IP");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
        GovernorError::Other { code, msg, headers } => {
            let mut response = (
                code,
                Json(json!({ "error": msg.unwrap_or_else(|| "Request rejected".to_string()) })),
            )
                .into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    const PEER: &str = "192.0.2.44:51000";

    fn request() -> axum::http::request::Builder {
        Request::builder()
            .uri("/api/crowd/vote")
            .extension(ConnectInfo(PEER.parse::<SocketAddr>().unwrap()))
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_ignores_proxy_headers_by_default() {
        let req = request()
            .header("x-forwarded-for", "203.0.113.9")
            .header("x-real-ip", "198.51.100.2")
            .body(())
            .unwrap();
        let key = ClientIpKeyExtractor::new(false).extract(&req).unwrap();
        assert_eq!(key, ip("192.0.2.44"));
    }

    #[test]
    fn test_trusted_proxy_prefers_forwarded_for() {
        let req = request()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .header("x-real-ip", "198.51.100.2")
            .body(())
            .unwrap();
        let key = ClientIpKeyExtractor::new(true).extract(&req).unwrap();
        assert_eq!(key, ip("203.0.113.9"));
    }

    #[test]
    fn test_trusted_proxy_falls_back_to_real_ip() {
        let req = request()
            .header("x-forwarded-for", "garbage")
            .header("x-real-ip", "198.51.100.2")
            .body(())
            .unwrap();
        let key = ClientIpKeyExtractor::new(true).extract(&req).unwrap();
        assert_eq!(key, ip("198.51.100.2"));
    }

    #[test]
    fn test_trusted_proxy_without_headers_uses_peer() {
        let req = request().body(()).unwrap();
        let key = ClientIpKeyExtractor::new(true).extract(&req).unwrap();
        assert_eq!(key, ip("192.0.2.44"));
    }

    #[test]
    fn test_no_key_without_peer() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9")
            .body(())
            .unwrap();
        assert!(ClientIpKeyExtractor::new(false).extract(&req).is_err());
    }

    #[tokio::test]
    async fn test_too_many_requests_is_json_with_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from(7_u64));

        let response = governor_error_response(GovernorError::TooManyRequests {
            wait_time: 7,
            headers: Some(headers),
        });

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("retry-after").unwrap(), "7");
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(body_json(response).await["error"], "Rate limit exceeded");
    }

    #[tokio::test]
    async fn test_missing_key_is_json_internal_error() {
        let response = governor_error_response(GovernorError::UnableToExtractKey);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Internal server error");
    }
}
