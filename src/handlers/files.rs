//! Token-gated file routes: content relay, viewer page, upload relay.
//!
//! These are the routes the browser reaches with a minted token in the
//! query string. The read routes bind the token to the exact file id in
//! the path; the upload route accepts any live token (see
//! [`FileTokenStore::validate_any`]).
//!
//! [`FileTokenStore::validate_any`]: crate::services::token_store::FileTokenStore::validate_any

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use crate::error::AppError;
use crate::models::file_token::{FileToken, TokenQuery};
use crate::models::hubspot::UploadedFile;
use crate::state::AppState;

/// Viewer shell loading the hosted document-viewer widget from its CDN.
///
/// Placeholders are substituted with `str::replace`, so the JavaScript
/// braces below stay literal.
const VIEWER_TEMPLATE: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{{filename}}</title>
    <style>
      html, body, #viewer { margin: 0; height: 100%; }
    </style>
  </head>
  <body>
    <div id="viewer"></div>
    <script src="https://unpkg.com/@pdftron/webviewer@10.12.0/webviewer.min.js"></script>
    <script>
      WebViewer({
        path: 'https://unpkg.com/@pdftron/webviewer@10.12.0/public',
        initialDoc: '{{content_url}}',
        filename: '{{filename}}',
        enableFilePicker: false,
      }, document.getElementById('viewer')).then(function (instance) {
        var documentViewer = instance.Core.documentViewer;
        var annotationManager = instance.Core.annotationManager;
        instance.UI.setHeaderItems(function (header) {
          header.push({
            type: 'actionButton',
            img: 'icon-save',
            title: 'Save back to CRM',
            onClick: function () {
              annotationManager.exportAnnotations().then(function (xfdf) {
                return documentViewer.getDocument().getFileData({ xfdfString: xfdf });
              }).then(function (data) {
                var blob = new Blob([new Uint8Array(data)], { type: 'application/pdf' });
                var form = new FormData();
                form.append('file', blob, '{{filename}}');
                return fetch('{{upload_url}}', { method: 'POST', body: form });
              }).then(function (response) {
                alert(response.ok ? 'Saved to HubSpot' : 'Save failed');
              });
            },
          });
        });
      });
    </script>
  </body>
</html>
"#;

/// Validate the presented token against the file id in the path.
///
/// Outcomes are logged with the correlating file id only; token values
/// never reach the logs. The caller sees an undifferentiated 401 for every
/// failure case.
fn authorize(state: &AppState, query: &TokenQuery, file_id: &str) -> Result<FileToken, AppError> {
    match query
        .require()
        .and_then(|token| state.tokens.validate(token, file_id))
    {
        Ok(record) => {
            tracing::debug!(file_id, "file access token accepted");
            Ok(record)
        }
        Err(error) => {
            tracing::warn!(file_id, %error, "file access token rejected");
            Err(error)
        }
    }
}

/// Relay raw file bytes.
///
/// # Endpoint
///
/// `GET /files/{file_id}/content?token=...`
///
/// # Process
///
/// 1. Validate the token against the file id in the path
/// 2. Ask HubSpot for a fresh signed URL and fetch it
/// 3. Stream the bytes back with the upstream content type
///
/// # Errors
///
/// - **401**: token missing, unknown, expired, or bound to another file
/// - **502**: HubSpot call failed
pub async fn file_content(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Response, AppError> {
    let record = authorize(&state, &query, &file_id)?;

    let (bytes, content_type) = state.hubspot.download(&file_id).await?;
    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    // Quotes stripped rather than escaped; the filename is display-only.
    let disposition = format!("inline; filename=\"{}\"", record.filename.replace('"', ""));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Render the viewer page.
///
/// # Endpoint
///
/// `GET /files/{file_id}/view?token=...`
///
/// The shell embeds the same token into the content URL it loads and the
/// upload URL its save button posts to, so one minted token carries the
/// whole open-edit-save round trip.
pub async fn viewer_page(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Html<String>, AppError> {
    let record = authorize(&state, &query, &file_id)?;

    let content_url = state.config.content_url(&file_id, &record.token);
    let upload_url = format!(
        "{}/files/upload?token={}",
        state.config.base_url.trim_end_matches('/'),
        record.token
    );

    Ok(Html(render_viewer(&record.filename, &content_url, &upload_url)))
}

/// Relay an edited document back to HubSpot.
///
/// # Endpoint
///
/// `POST /files/upload?token=...` (multipart: `file`, optional `folder_path`)
///
/// # Authorization
///
/// Requires a currently valid token, but does not bind it to a file id:
/// saving an edited document can create a new file that had no id when the
/// token was minted.
///
/// # Response
///
/// Returns 201 Created with the uploaded file's metadata.
///
/// # Errors
///
/// - **401**: token missing, unknown, or expired
/// - **400**: malformed multipart body, or no non-empty `file` field
/// - **502**: HubSpot upload failed
pub async fn upload_file(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadedFile>), AppError> {
    let record = match query
        .require()
        .and_then(|token| state.tokens.validate_any(token))
    {
        Ok(record) => record,
        Err(error) => {
            tracing::warn!(%error, "upload token rejected");
            return Err(error);
        }
    };

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut folder_path = "/".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::InvalidRequest(format!("malformed multipart body: {error}")))?
    {
        // The field name borrow must end before the field is consumed.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| record.filename.clone());
                let bytes = field.bytes().await.map_err(|error| {
                    AppError::InvalidRequest(format!("malformed multipart body: {error}"))
                })?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("folder_path") => {
                folder_path = field.text().await.map_err(|error| {
                    AppError::InvalidRequest(format!("malformed multipart body: {error}"))
                })?;
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| AppError::InvalidRequest("missing file field".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::InvalidRequest(
            "uploaded file is empty".to_string(),
        ));
    }

    let uploaded = state.hubspot.upload(&filename, bytes, &folder_path).await?;

    tracing::info!(file_id = %uploaded.id, filename = %filename, "uploaded edited document");

    Ok((StatusCode::CREATED, Json(uploaded)))
}

/// Substitute the viewer template's placeholders.
fn render_viewer(filename: &str, content_url: &str, upload_url: &str) -> String {
    VIEWER_TEMPLATE
        .replace("{{filename}}", &escape_html(filename))
        .replace("{{content_url}}", content_url)
        .replace("{{upload_url}}", upload_url)
}

/// Minimal HTML escaping for the display filename.
///
/// The URLs are never escaped here: they are built by this service from a
/// hex token and a path-extracted file id, not from free-form input.
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<img src=x onerror="x">.pdf"#),
            "&lt;img src=x onerror=&quot;x&quot;&gt;.pdf"
        );
        assert_eq!(escape_html("plain.pdf"), "plain.pdf");
    }

    #[test]
    fn viewer_template_embeds_the_urls() {
        let page = render_viewer(
            "contract.pdf",
            "http://localhost:3000/files/42/content?token=abc",
            "http://localhost:3000/files/upload?token=abc",
        );

        assert!(page.contains("<title>contract.pdf</title>"));
        assert!(page.contains("initialDoc: 'http://localhost:3000/files/42/content?token=abc'"));
        assert!(page.contains("fetch('http://localhost:3000/files/upload?token=abc'"));
        // No leftover placeholders.
        assert!(!page.contains("{{"));
    }
}
