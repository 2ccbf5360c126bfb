//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//!
//! Every error body is JSON with an `error` field. Server-side failures get a
//! generic message; the underlying cause is only logged.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::osrm::OsrmError;
use crate::overpass::OverpassError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Shop discovery failed.
    #[error("Overpass error: {0}")]
    Overpass(#[from] OverpassError),

    /// Routing failed for a reason other than "no route".
    #[error("Routing error: {0}")]
    Routing(OsrmError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Voter already voted on this shop within the cooldown window.
    #[error("Vote cooldown active for {wait_minutes} more minute(s)")]
    CooldownActive { wait_minutes: i64 },
}

impl From<OsrmError> for AppError {
    fn from(err: OsrmError) -> Self {
        match err {
            OsrmError::NoRoute => Self::NotFound("No route found".to_string()),
            other => Self::Routing(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Overpass(_) | Self::Routing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Database(_) => json!({ "error": "Internal server error" }),
            Self::Overpass(_) => json!({ "error": "Failed to fetch shops" }),
            Self::Routing(_) => json!({ "error": "Failed to fetch route" }),
            Self::NotFound(msg) | Self::BadRequest(msg) => json!({ "error": msg }),
            Self::CooldownActive { wait_minutes } => json!({
                "error": "Rate limit exceeded",
                "message": format!("Please wait {wait_minutes} more minute(s) before voting again"),
                "waitMinutes": wait_minutes,
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Shop not found".to_string());
        assert_eq!(err.to_string(), "Not found: Shop not found");

        let err = AppError::BadRequest("level must be between 1 and 3".to_string());
        assert_eq!(err.to_string(), "Bad request: level must be between 1 and 3");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::CooldownActive { wait_minutes: 3 }),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::DataCorruption(
                "test".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Routing(OsrmError::Api {
                status: 502,
                message: "bad gateway".to_string()
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_no_route_maps_to_not_found() {
        let err = AppError::from(OsrmError::NoRoute);
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "No route found"));
    }

    #[tokio::test]
    async fn test_cooldown_body_has_wait_guidance() {
        let body = body_json(AppError::CooldownActive { wait_minutes: 4 }.into_response()).await;
        assert_eq!(body["error"], "Rate limit exceeded");
        assert_eq!(body["waitMinutes"], 4);
        assert_eq!(
            body["message"],
            "Please wait 4 more minute(s) before voting again"
        );
    }

    #[tokio::test]
    async fn test_internal_errors_are_generic() {
        let err = AppError::Database(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        let body = body_json(err.into_response()).await;
        assert_eq!(body["error"], "Internal server error");
    }
}
