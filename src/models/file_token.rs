//! Ephemeral file-access token record and token endpoint payloads.
//!
//! A token is an unguessable capability: whoever holds it can read exactly
//! one remote file (and upload edited results) until the token expires.
//! Tokens are minted server-side, travel as a query-string parameter on
//! generated URLs, and live only in process memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A live file-access token record.
///
/// # Fields
///
/// - `token`: 64 hex characters from 32 bytes of secure randomness
/// - `file_id`: the single HubSpot file this token authorizes
/// - `filename`: display name, non-authoritative (UI labeling only)
/// - `expires_at`: absolute instant; the token is invalid at or after it
///
/// Records are immutable once created and reachable only via the exact
/// token string. This struct deliberately does not implement `Serialize`:
/// the only place a token value may leave the process is the explicit
/// [`MintTokenResponse`].
#[derive(Debug, Clone)]
pub struct FileToken {
    pub token: String,
    pub file_id: String,
    pub filename: String,
    pub expires_at: DateTime<Utc>,
}

/// Request body for explicitly minting a file-access token.
///
/// # JSON Example
///
/// ```json
/// {
///   "file_id": "192847561029",
///   "filename": "contract.pdf"
/// }
/// ```
///
/// # Validation
///
/// - `file_id`: required, non-empty
/// - `filename`: optional, defaults to a generic placeholder
#[derive(Debug, Deserialize)]
pub struct MintTokenRequest {
    /// HubSpot file id the token will be bound to
    pub file_id: String,

    /// Display name carried alongside the token
    pub filename: Option<String>,
}

/// Response body for the mint endpoint.
///
/// # JSON Example
///
/// ```json
/// {
///   "token": "a1b2c3...",
///   "file_id": "192847561029",
///   "filename": "contract.pdf",
///   "expires_at": "2025-01-15T10:45:00Z",
///   "view_url": "https://bridge.example.com/files/192847561029/view?token=a1b2c3..."
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct MintTokenResponse {
    pub token: String,
    pub file_id: String,
    pub filename: String,
    pub expires_at: DateTime<Utc>,
    pub view_url: String,
}

impl MintTokenResponse {
    /// Build the response for a freshly minted record.
    pub fn new(record: FileToken, view_url: String) -> Self {
        Self {
            token: record.token,
            file_id: record.file_id,
            filename: record.filename,
            expires_at: record.expires_at,
            view_url,
        }
    }
}

/// Query-string carrier for the access token.
///
/// Tokens travel exclusively as `?token=...` on generated URLs; there is no
/// header or cookie transport.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

impl TokenQuery {
    /// The presented token, or `MissingToken` when absent or empty.
    pub fn require(&self) -> Result<&str, AppError> {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(AppError::MissingToken),
        }
    }
}
