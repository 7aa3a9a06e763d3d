//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Token Errors**: File-access token missing, unknown, expired, or bound to another file
/// - **Validation Errors**: Invalid request data
/// - **Connection Errors**: OAuth install flow has not been completed
/// - **Upstream Errors**: HubSpot API calls that failed or returned a non-success status
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No access token was presented on a token-gated route.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Missing access token")]
    MissingToken,

    /// The presented token is not in the store (never issued, reaped, or process restarted).
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Unknown access token")]
    TokenNotFound,

    /// The presented token is past its expiry instant.
    ///
    /// Returns HTTP 401 Unauthorized. The record is removed by the store
    /// before this error is surfaced.
    #[error("Expired access token")]
    TokenExpired,

    /// The presented token is live but bound to a different file id.
    ///
    /// Returns HTTP 401 Unauthorized. The record stays valid for its own file.
    #[error("Access token is bound to a different file")]
    TokenMismatch,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// The OAuth install flow has not run, so no HubSpot credentials exist.
    ///
    /// Returns HTTP 503 Service Unavailable.
    #[error("HubSpot account is not connected")]
    NotConnected,

    /// An outbound HubSpot request failed at the transport level.
    ///
    /// This wraps any reqwest::Error using the `#[from]` attribute, which
    /// automatically implements `From<reqwest::Error> for AppError`.
    #[error("HubSpot request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// HubSpot answered with a non-success status code.
    ///
    /// Returns HTTP 502 Bad Gateway. The upstream body is logged where the
    /// response is read and never forwarded to the browser.
    #[error("HubSpot returned status {status}")]
    UpstreamStatus { status: u16 },
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `MissingToken` / `TokenNotFound` / `TokenExpired` / `TokenMismatch` → 401 Unauthorized,
///   all with the identical `unauthorized` body
/// - `InvalidRequest` → 400 Bad Request
/// - `NotConnected` → 503 Service Unavailable
/// - `Upstream` / `UpstreamStatus` → 502 Bad Gateway (hides upstream details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message).
        // Token failures collapse to one indistinguishable response; the
        // variant that actually occurred is only visible in server logs.
        let (status, code, message) = match self {
            AppError::MissingToken
            | AppError::TokenNotFound
            | AppError::TokenExpired
            | AppError::TokenMismatch => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::NotConnected => (
                StatusCode::SERVICE_UNAVAILABLE,
                "not_connected",
                self.to_string(),
            ),
            AppError::Upstream(_) | AppError::UpstreamStatus { .. } => (
                StatusCode::BAD_GATEWAY,
                "upstream_error",
                "HubSpot request failed".to_string(),
            ),
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn token_failures_are_indistinguishable() {
        let (missing_status, missing) = body_json(AppError::MissingToken).await;
        let (not_found_status, not_found) = body_json(AppError::TokenNotFound).await;
        let (expired_status, expired) = body_json(AppError::TokenExpired).await;
        let (mismatch_status, mismatch) = body_json(AppError::TokenMismatch).await;

        assert_eq!(missing_status, StatusCode::UNAUTHORIZED);
        assert_eq!(not_found_status, StatusCode::UNAUTHORIZED);
        assert_eq!(expired_status, StatusCode::UNAUTHORIZED);
        assert_eq!(mismatch_status, StatusCode::UNAUTHORIZED);

        // Identical bodies: the caller cannot tell which case occurred.
        assert_eq!(missing, not_found);
        assert_eq!(not_found, expired);
        assert_eq!(expired, mismatch);
    }

    #[tokio::test]
    async fn upstream_status_maps_to_a_generic_bad_gateway() {
        let (status, body) = body_json(AppError::UpstreamStatus { status: 403 }).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "upstream_error");
        // The upstream status never reaches the browser.
        assert_eq!(body["error"]["message"], "HubSpot request failed");
    }

    #[tokio::test]
    async fn invalid_request_carries_its_detail() {
        let (status, body) =
            body_json(AppError::InvalidRequest("file_id must not be empty".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
        assert_eq!(body["error"]["message"], "file_id must not be empty");
    }
}
