//! Health check endpoint for service monitoring.

use crate::state::AppState;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
///
/// Returns service status, HubSpot connection state, and the number of
/// live file-access tokens.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Whether the OAuth install flow has run in this process
    pub hubspot: String,

    /// Live (unexpired, unreaped) file-access tokens
    pub active_tokens: usize,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "hubspot": "connected",
///   "active_tokens": 3,
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
///
/// Always 200: a not-yet-connected bridge is alive, it just needs the
/// install flow run against it.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let hubspot = if state.hubspot.is_connected().await {
        "connected"
    } else {
        "not_connected"
    };

    // Reap anything already past expiry so the count reflects live tokens.
    state.tokens.sweep();

    Json(HealthResponse {
        status: "healthy".to_string(),
        hubspot: hubspot.to_string(),
        active_tokens: state.tokens.len(),
        timestamp: Utc::now(),
    })
}
