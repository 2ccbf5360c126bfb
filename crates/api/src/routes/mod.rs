//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Liveness
//! GET  /health/ready              - Readiness (database)
//!
//! # Crowd
//! POST /api/crowd/vote            - Submit crowd level vote (rate limited)
//! GET  /api/crowd/{shop_id}       - Current crowd level
//!
//! # Status
//! POST /api/status/vote           - Submit open/closed vote (rate limited)
//! GET  /api/status/{shop_id}      - Current open status
//!
//! # Shops
//! GET  /api/shops/nearby          - Shops around lat/lon, nearest first
//! GET  /api/shops/{shop_id}       - Single stored shop
//!
//! # Routing
//! GET  /api/routing/route         - Walking or driving route
//! ```

pub mod crowd;
pub mod health;
pub mod routing;
pub mod shops;
pub mod status;

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use serde::{Deserialize, Deserializer, de};
use thekawatch_core::Coordinates;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::middleware::{request_id_middleware, vote_rate_limiter};
use crate::state::AppState;

/// Create the crowd routes router.
pub fn crowd_routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route(
            "/vote",
            post(crowd::vote).layer(vote_rate_limiter(trust_proxy_headers)),
        )
        .route("/{shop_id}", get(crowd::show))
}

/// Create the status routes router.
pub fn status_routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route(
            "/vote",
            post(status::vote).layer(vote_rate_limiter(trust_proxy_headers)),
        )
        .route("/{shop_id}", get(status::show))
}

/// Create the shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/nearby", get(shops::nearby))
        .route("/{shop_id}", get(shops::show))
}

/// Create the routing routes router.
pub fn routing_routes() -> Router<AppState> {
    Router::new().route("/route", get(routing::route))
}

/// Create all `/api` routes.
pub fn api_routes(config: &ApiConfig) -> Router<AppState> {
    Router::new()
        .nest("/crowd", crowd_routes(config.trust_proxy_headers))
        .nest("/status", status_routes(config.trust_proxy_headers))
        .nest("/shops", shop_routes())
        .nest("/routing", routing_routes())
}

/// Build the full application router with tracing, request IDs and CORS.
///
/// Sentry layers are added by the binary so tests run without a client.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.config());
    let api = api_routes(state.config());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if config.cors_allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!(origin = %origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

/// Trimmed text, or `None` when absent or blank.
pub(crate) fn require_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Query parameter that treats an empty value (`?lat=`) as absent.
pub(crate) fn optional_param<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Validated coordinates from query parameters.
pub(crate) fn coordinates(lat: f64, lon: f64) -> Result<Coordinates> {
    Coordinates::new(lat, lon).map_err(|e| AppError::BadRequest(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::SocketAddr;

    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::config::test_config;
    use crate::db::create_lazy_pool;

    fn app() -> Router {
        let config = test_config();
        let pool = create_lazy_pool(&config.database_url).unwrap();
        router(AppState::new(config, pool).unwrap())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .extension(ConnectInfo("203.0.113.7:40000".parse::<SocketAddr>().unwrap()))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_uri(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn error_message(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        json["error"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text(Some("  node_1 ".to_string())).as_deref(), Some("node_1"));
        assert_eq!(require_text(Some("   ".to_string())), None);
        assert_eq!(require_text(None), None);
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(get_uri("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_crowd_vote_rejects_out_of_range_level() {
        for level in [0, 4, -1] {
            let body = format!(r#"{{"shopId":"node_1","userId":"u-1","level":{level}}}"#);
            let response = app()
                .oneshot(post_json("/api/crowd/vote", &body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(error_message(response).await, "level must be between 1 and 3");
        }
    }

    #[tokio::test]
    async fn test_vote_limiter_keys_on_peer_and_answers_json() {
        let app = app();
        let body = r#"{"shopId":"node_1","userId":"u-1","level":9}"#;

        let mut limited = None;
        for attempt in 0..30 {
            // Spoofed headers must not earn a fresh bucket
            let mut request = post_json("/api/crowd/vote", body);
            request.headers_mut().insert(
                "x-forwarded-for",
                format!("198.51.100.{attempt}").parse().unwrap(),
            );

            let response = app.clone().oneshot(request).await.unwrap();
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                limited = Some(response);
                break;
            }
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let response = limited.unwrap();
        assert!(response.headers().contains_key("retry-after"));
        assert_eq!(error_message(response).await, "Rate limit exceeded");
    }

    #[tokio::test]
    async fn test_crowd_vote_requires_all_fields() {
        let response = app()
            .oneshot(post_json("/api/crowd/vote", r#"{"shopId":"node_1","level":2}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(response).await,
            "shopId, userId, and level are required"
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = app()
            .oneshot(post_json("/api/crowd/vote", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_vote_requires_boolean() {
        let response = app()
            .oneshot(post_json(
                "/api/status/vote",
                r#"{"shopId":"node_1","userId":"u-1","isOpen":"yes"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app()
            .oneshot(post_json(
                "/api/status/vote",
                r#"{"shopId":"node_1","userId":"u-1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(response).await,
            "shopId, userId, and isOpen are required"
        );
    }

    #[tokio::test]
    async fn test_nearby_requires_coordinates() {
        let response = app()
            .oneshot(get_uri("/api/shops/nearby?lat=28.61"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await, "lat and lon are required");
    }

    #[tokio::test]
    async fn test_nearby_empty_coordinate_counts_as_missing() {
        let response = app()
            .oneshot(get_uri("/api/shops/nearby?lat=&lon=77.2"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await, "lat and lon are required");
    }

    #[tokio::test]
    async fn test_nearby_rejects_bad_radius() {
        let response = app()
            .oneshot(get_uri("/api/shops/nearby?lat=28.61&lon=77.2&radius=90000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app()
            .oneshot(get_uri("/api/shops/nearby?lat=28.61&lon=77.2&radius=wide"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_route_requires_all_coordinates() {
        let response = app()
            .oneshot(get_uri(
                "/api/routing/route?fromLat=28.61&fromLon=77.2&toLat=28.62",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(response).await,
            "fromLat, fromLon, toLat, and toLon are required"
        );
    }

    #[tokio::test]
    async fn test_route_rejects_out_of_range_coordinates() {
        let response = app()
            .oneshot(get_uri(
                "/api/routing/route?fromLat=95&fromLon=77.2&toLat=28.62&toLon=77.21",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
