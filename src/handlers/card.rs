//! CRM card data endpoint.
//!
//! HubSpot fetches this endpoint when a user opens a contact record that
//! has the bridge's card configured. Each attachment becomes one card row
//! whose link is a viewer-page URL with a freshly minted token embedded.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::card::CardResponse;
use crate::state::AppState;

/// Query parameters of the card fetch.
///
/// HubSpot sends the displayed record's id as `associatedObjectId`; the
/// snake_case alias keeps manual testing convenient.
#[derive(Debug, Deserialize)]
pub struct CardQuery {
    #[serde(alias = "associatedObjectId", alias = "hs_object_id")]
    pub associated_object_id: Option<String>,
}

/// Build the card payload for a contact record.
///
/// # Endpoint
///
/// `GET /api/card?associatedObjectId={contact_id}`
///
/// # Response
///
/// ```json
/// {
///   "results": [
///     { "objectId": 1, "title": "contract.pdf", "link": "https://bridge.example.com/files/42/view?token=..." }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - **400**: no record id in the query
///
/// Files whose metadata cannot be read are skipped, matching the
/// attachments endpoint.
pub async fn card_data(
    State(state): State<AppState>,
    Query(query): Query<CardQuery>,
) -> Result<Json<CardResponse>, AppError> {
    let contact_id = query
        .associated_object_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("missing associatedObjectId".to_string()))?;

    let file_ids = state.hubspot.contact_attachment_ids(contact_id).await?;

    let mut entries = Vec::with_capacity(file_ids.len());
    for file_id in file_ids {
        let file = match state.hubspot.file_metadata(&file_id).await {
            Ok(file) => file,
            Err(error) => {
                tracing::warn!(file_id = %file_id, error = %error, "skipping unreadable attachment");
                continue;
            }
        };

        let record = state.tokens.mint(&file.id, Some(&file.display_name()))?;
        let view_url = state.config.view_url(&record.file_id, &record.token);
        entries.push((record.filename, view_url));
    }

    tracing::info!(contact_id, count = entries.len(), "built CRM card");

    Ok(Json(CardResponse::new(entries)))
}
