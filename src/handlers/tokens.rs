//! Explicit token minting endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::error::AppError;
use crate::models::file_token::{MintTokenRequest, MintTokenResponse};
use crate::state::AppState;

/// Mint a file-access token on request.
///
/// # Endpoint
///
/// `POST /api/file-tokens`
///
/// Called by the CRM UI extension when it already knows a file id and wants
/// a viewer link for it. The other two mint sites (attachment listing, card
/// building) mint internally.
///
/// # Request Body
///
/// ```json
/// {
///   "file_id": "192847561029",
///   "filename": "contract.pdf"
/// }
/// ```
///
/// # Response
///
/// Returns 201 Created with the token, its expiry, and a ready-to-open
/// viewer URL. This response is the only place a token value ever leaves
/// the process.
///
/// # Errors
///
/// - **400**: `file_id` missing or empty (no record is created)
pub async fn mint_token(
    State(state): State<AppState>,
    Json(request): Json<MintTokenRequest>,
) -> Result<(StatusCode, Json<MintTokenResponse>), AppError> {
    let record = state
        .tokens
        .mint(&request.file_id, request.filename.as_deref())?;

    tracing::info!(file_id = %record.file_id, "issued file access token");

    let view_url = state.config.view_url(&record.file_id, &record.token);
    Ok((
        StatusCode::CREATED,
        Json(MintTokenResponse::new(record, view_url)),
    ))
}
