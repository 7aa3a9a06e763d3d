//! HubSpot API client.
//!
//! This service owns the outbound side of the bridge: the OAuth credential
//! exchange and refresh, Files API metadata/signed-url/upload calls, and the
//! association walk that discovers a contact's file attachments.
//!
//! # Credentials
//!
//! The OAuth install flow hands over an access token, a refresh token, and a
//! lifetime. They are held in memory only; a process restart requires
//! re-running the install flow. The access token is refreshed with the
//! refresh grant shortly before it expires.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use url::Url;

use crate::config::Config;
use crate::error::AppError;
use crate::models::hubspot::{
    AssociationPage, BatchReadRequest, BatchReadResponse, HubSpotFile, OAuthTokenResponse,
    ObjectRef, SignedUrlResponse, UploadedFile,
};

/// HubSpot's user-facing authorization page (not part of the API base).
const AUTHORIZE_URL: &str = "https://app.hubspot.com/oauth/authorize";

/// OAuth scopes the bridge needs: file read/write plus contact read.
const OAUTH_SCOPES: &str = "files crm.objects.contacts.read";

/// Refresh the access token this long before its actual expiry.
const EXPIRY_SKEW_SECONDS: i64 = 60;

/// OAuth credentials obtained from the install flow.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credentials {
    fn from_response(response: OAuthTokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
        }
    }

    /// Stale means within the skew window of expiry, not just past it.
    fn is_stale(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_SKEW_SECONDS) >= self.expires_at
    }
}

/// Client for the HubSpot REST APIs, shared across request handlers.
#[derive(Clone)]
pub struct HubSpotClient {
    http: reqwest::Client,
    api_base: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    credentials: Arc<RwLock<Option<Credentials>>>,
}

impl HubSpotClient {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()
            .expect("reqwest client options are valid");

        Self {
            http,
            api_base: config.hubspot_api_base.trim_end_matches('/').to_string(),
            client_id: config.hubspot_client_id.clone(),
            client_secret: config.hubspot_client_secret.clone(),
            redirect_uri: config.redirect_uri(),
            credentials: Arc::new(RwLock::new(None)),
        }
    }

    /// The URL users are sent to when starting the install flow.
    pub fn authorize_url(&self) -> String {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", OAUTH_SCOPES),
            ],
        )
        .expect("authorize URL is valid");

        url.to_string()
    }

    /// Exchange an authorization code for credentials and store them.
    ///
    /// Called by the OAuth callback handler with the `code` HubSpot appended
    /// to the redirect.
    pub async fn connect(&self, code: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(format!("{}/oauth/v1/token", self.api_base))
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await?;

        let tokens: OAuthTokenResponse = Self::parse(response).await?;
        self.store_credentials(Credentials::from_response(tokens))
            .await;

        tracing::info!("HubSpot account connected");
        Ok(())
    }

    /// Replace the held credentials (install flow, or tests seeding state).
    pub async fn store_credentials(&self, credentials: Credentials) {
        *self.credentials.write().await = Some(credentials);
    }

    /// Whether the install flow has run in this process.
    pub async fn is_connected(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// A live access token, refreshing through the refresh grant if the
    /// held one is within the skew window of expiry.
    ///
    /// # Errors
    ///
    /// - `NotConnected`: the install flow has not run
    /// - `Upstream` / `UpstreamStatus`: the refresh call failed
    async fn access_token(&self) -> Result<String, AppError> {
        {
            let guard = self.credentials.read().await;
            match guard.as_ref() {
                Some(credentials) if !credentials.is_stale() => {
                    return Ok(credentials.access_token.clone());
                }
                Some(_) => {}
                None => return Err(AppError::NotConnected),
            }
        }

        self.refresh().await
    }

    async fn refresh(&self) -> Result<String, AppError> {
        let mut guard = self.credentials.write().await;
        let credentials = guard.as_ref().ok_or(AppError::NotConnected)?;

        // Another request may have refreshed while we waited for the lock.
        if !credentials.is_stale() {
            return Ok(credentials.access_token.clone());
        }

        let response = self
            .http
            .post(format!("{}/oauth/v1/token", self.api_base))
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", credentials.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let tokens: OAuthTokenResponse = Self::parse(response).await?;
        let refreshed = Credentials::from_response(tokens);
        let access_token = refreshed.access_token.clone();
        *guard = Some(refreshed);

        tracing::debug!("refreshed HubSpot access token");
        Ok(access_token)
    }

    /// File metadata: `GET /files/v3/files/{id}`.
    pub async fn file_metadata(&self, file_id: &str) -> Result<HubSpotFile, AppError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}/files/v3/files/{}", self.api_base, file_id))
            .bearer_auth(&token)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Time-limited download URL: `GET /files/v3/files/{id}/signed-url`.
    pub async fn signed_url(&self, file_id: &str) -> Result<SignedUrlResponse, AppError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!(
                "{}/files/v3/files/{}/signed-url",
                self.api_base, file_id
            ))
            .bearer_auth(&token)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Fetch the file bytes through a fresh signed URL.
    ///
    /// Returns the content bytes and the content type reported by the
    /// storage backend (if any).
    pub async fn download(
        &self,
        file_id: &str,
    ) -> Result<(axum::body::Bytes, Option<String>), AppError> {
        let signed = self.signed_url(file_id).await?;

        // The signed URL is pre-authorized; no bearer token goes with it.
        let response = self.http.get(&signed.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                file_id,
                status = status.as_u16(),
                "signed URL fetch returned an error response"
            );
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let bytes = response.bytes().await?;

        Ok((bytes, content_type))
    }

    /// Relay an edited document to `POST /files/v3/files` (multipart).
    pub async fn upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        folder_path: &str,
    ) -> Result<UploadedFile, AppError> {
        let token = self.access_token().await?;

        let options = serde_json::json!({
            "access": "PRIVATE",
            "overwrite": false,
        })
        .to_string();

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()),
            )
            .text("folderPath", folder_path.to_string())
            .text("options", options);

        let response = self
            .http
            .post(format!("{}/files/v3/files", self.api_base))
            .bearer_auth(&token)
            .multipart(form)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// File ids attached to a contact, in discovery order, de-duplicated.
    ///
    /// # Process
    ///
    /// 1. `GET /crm/v4/objects/contacts/{id}/associations/notes` for the
    ///    contact's note ids
    /// 2. `POST /crm/v3/objects/notes/batch/read` for `hs_attachment_ids`
    /// 3. Split the `;`-separated lists, dropping duplicates (one file can
    ///    be attached to several notes)
    pub async fn contact_attachment_ids(&self, contact_id: &str) -> Result<Vec<String>, AppError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(format!(
                "{}/crm/v4/objects/contacts/{}/associations/notes",
                self.api_base, contact_id
            ))
            .query(&[("limit", "100")])
            .bearer_auth(&token)
            .send()
            .await?;
        let page: AssociationPage = Self::parse(response).await?;

        if page.results.is_empty() {
            return Ok(Vec::new());
        }

        let request = BatchReadRequest {
            properties: vec!["hs_attachment_ids".to_string()],
            inputs: page
                .results
                .iter()
                .map(|association| ObjectRef {
                    id: association.to_object_id.to_string(),
                })
                .collect(),
        };

        let response = self
            .http
            .post(format!("{}/crm/v3/objects/notes/batch/read", self.api_base))
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;
        let notes: BatchReadResponse = Self::parse(response).await?;

        let mut seen = HashSet::new();
        let mut file_ids = Vec::new();
        for note in notes.results {
            let Some(list) = note.properties.hs_attachment_ids else {
                continue;
            };
            for id in list.split(';').map(str::trim).filter(|id| !id.is_empty()) {
                if seen.insert(id.to_string()) {
                    file_ids.push(id.to_string());
                }
            }
        }

        Ok(file_ids)
    }

    /// Check the status and deserialize the body.
    ///
    /// Non-success statuses become `UpstreamStatus`; the upstream body is
    /// kept for logs but never forwarded to the browser.
    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %body, "HubSpot returned an error response");
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}
