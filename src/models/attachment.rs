//! File listing payloads for the attachments endpoint.
//!
//! Listing a contact's attachments mints one fresh access token per
//! discovered file, so each entry ships with ready-to-open URLs instead of
//! raw token material the UI would have to assemble itself.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::file_token::FileToken;
use crate::models::hubspot::HubSpotFile;

/// One attachment of a CRM contact, with tokenized access URLs.
///
/// # JSON Example
///
/// ```json
/// {
///   "file_id": "192847561029",
///   "filename": "contract.pdf",
///   "extension": "pdf",
///   "size": 48213,
///   "view_url": "https://bridge.example.com/files/192847561029/view?token=...",
///   "content_url": "https://bridge.example.com/files/192847561029/content?token=...",
///   "expires_at": "2025-01-15T10:45:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub file_id: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    pub view_url: String,
    pub content_url: String,
    /// When the embedded token stops working
    pub expires_at: DateTime<Utc>,
}

impl AttachmentResponse {
    /// Combine HubSpot file metadata with the token minted for it.
    pub fn new(file: &HubSpotFile, record: &FileToken, view_url: String, content_url: String) -> Self {
        Self {
            file_id: file.id.clone(),
            filename: record.filename.clone(),
            extension: file.extension.clone(),
            size: file.size,
            view_url,
            content_url,
            expires_at: record.expires_at,
        }
    }
}

/// Response body for `GET /api/contacts/{contact_id}/attachments`.
#[derive(Debug, Serialize)]
pub struct AttachmentListResponse {
    pub contact_id: String,
    pub attachments: Vec<AttachmentResponse>,
}
