//! Attachment listing for CRM contacts.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::AppError;
use crate::models::attachment::{AttachmentListResponse, AttachmentResponse};
use crate::state::AppState;

/// List a contact's file attachments with tokenized access URLs.
///
/// # Endpoint
///
/// `GET /api/contacts/{contact_id}/attachments`
///
/// # Process
///
/// 1. Walk the contact's notes for attachment ids (HubSpot client)
/// 2. Fetch metadata for each file
/// 3. Mint one fresh access token per file
/// 4. Return entries with viewer and content URLs embedding the tokens
///
/// # Response
///
/// ```json
/// {
///   "contact_id": "901",
///   "attachments": [
///     {
///       "file_id": "42",
///       "filename": "contract.pdf",
///       "extension": "pdf",
///       "size": 48213,
///       "view_url": "https://bridge.example.com/files/42/view?token=...",
///       "content_url": "https://bridge.example.com/files/42/content?token=...",
///       "expires_at": "2025-01-15T10:45:00Z"
///     }
///   ]
/// }
/// ```
///
/// # Error Handling
///
/// A file whose metadata cannot be read is skipped with a warning rather
/// than failing the whole listing; the remaining attachments still render.
pub async fn list_attachments(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
) -> Result<Json<AttachmentListResponse>, AppError> {
    let file_ids = state.hubspot.contact_attachment_ids(&contact_id).await?;

    let mut attachments = Vec::with_capacity(file_ids.len());
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
        let content_url = state.config.content_url(&record.file_id, &record.token);

        attachments.push(AttachmentResponse::new(&file, &record, view_url, content_url));
    }

    tracing::info!(
        contact_id = %contact_id,
        count = attachments.len(),
        "listed contact attachments"
    );

    Ok(Json(AttachmentListResponse {
        contact_id,
        attachments,
    }))
}
