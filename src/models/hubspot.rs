//! HubSpot REST wire types.
//!
//! Only the fields this service actually reads are modeled; HubSpot payloads
//! carry far more and serde ignores the rest.

use serde::{Deserialize, Serialize};

/// Response of `POST /oauth/v1/token` (both grant types).
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// File metadata from `GET /files/v3/files/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct HubSpotFile {
    pub id: String,
    pub name: Option<String>,
    pub extension: Option<String>,
    pub size: Option<i64>,
}

impl HubSpotFile {
    /// Filename for UI labeling: `name.extension` when both are present.
    ///
    /// HubSpot stores the base name and extension separately.
    pub fn display_name(&self) -> String {
        match (&self.name, &self.extension) {
            (Some(name), Some(ext)) => format!("{name}.{ext}"),
            (Some(name), None) => name.clone(),
            _ => "document".to_string(),
        }
    }
}

/// Response of `GET /files/v3/files/{id}/signed-url`.
///
/// The `url` is a time-limited, pre-authorized link issued by HubSpot for
/// direct content retrieval.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedUrlResponse {
    pub url: String,
}

/// Result of relaying a multipart upload to `POST /files/v3/files`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadedFile {
    pub id: String,
    pub name: Option<String>,
    pub extension: Option<String>,
    pub size: Option<i64>,
}

/// One page of `GET /crm/v4/objects/contacts/{id}/associations/notes`.
#[derive(Debug, Deserialize)]
pub struct AssociationPage {
    pub results: Vec<Association>,
}

/// A single association edge; only the target object id matters here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    pub to_object_id: i64,
}

/// Request body for `POST /crm/v3/objects/notes/batch/read`.
#[derive(Debug, Serialize)]
pub struct BatchReadRequest {
    pub properties: Vec<String>,
    pub inputs: Vec<ObjectRef>,
}

/// Object reference inside a batch-read request.
#[derive(Debug, Serialize)]
pub struct ObjectRef {
    pub id: String,
}

/// Response body of the notes batch read.
#[derive(Debug, Deserialize)]
pub struct BatchReadResponse {
    pub results: Vec<NoteObject>,
}

/// A note object; attachments hang off its `hs_attachment_ids` property.
#[derive(Debug, Deserialize)]
pub struct NoteObject {
    pub properties: NoteProperties,
}

/// Note properties requested by the batch read.
///
/// `hs_attachment_ids` is a `;`-separated list of file ids, or absent when
/// the note carries no attachments.
#[derive(Debug, Deserialize)]
pub struct NoteProperties {
    pub hs_attachment_ids: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_name_and_extension() {
        let file = HubSpotFile {
            id: "1".to_string(),
            name: Some("contract".to_string()),
            extension: Some("pdf".to_string()),
            size: None,
        };
        assert_eq!(file.display_name(), "contract.pdf");

        let bare = HubSpotFile {
            id: "2".to_string(),
            name: Some("notes".to_string()),
            extension: None,
            size: None,
        };
        assert_eq!(bare.display_name(), "notes");

        let unnamed = HubSpotFile {
            id: "3".to_string(),
            name: None,
            extension: Some("pdf".to_string()),
            size: None,
        };
        assert_eq!(unnamed.display_name(), "document");
    }

    #[test]
    fn association_page_parses_hubspot_casing() {
        let page: AssociationPage =
            serde_json::from_str(r#"{"results":[{"toObjectId":987654,"associationTypes":[]}]}"#)
                .unwrap();
        assert_eq!(page.results[0].to_object_id, 987654);
    }

    #[test]
    fn note_without_attachments_parses() {
        let response: BatchReadResponse = serde_json::from_str(
            r#"{"results":[{"id":"11","properties":{"hs_attachment_ids":null}}]}"#,
        )
        .unwrap();
        assert!(response.results[0].properties.hs_attachment_ids.is_none());
    }
}
