//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `HUBSPOT_CLIENT_ID` (required): OAuth client id of the HubSpot app
/// - `HUBSPOT_CLIENT_SECRET` (required): OAuth client secret of the HubSpot app
/// - `HUBSPOT_API_BASE` (optional): HubSpot API root, defaults to the public one
/// - `BASE_URL` (optional): public URL of this service, used in generated links
/// - `ALLOWED_ORIGINS` (optional): comma-separated browser origins for the API routes
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub hubspot_client_id: String,

    pub hubspot_client_secret: String,

    #[serde(default = "default_api_base")]
    pub hubspot_api_base: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_port")]
    pub server_port: u16,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

/// Default public base URL, matching the default port.
fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

/// Production HubSpot API root.
fn default_api_base() -> String {
    "https://api.hubapi.com".to_string()
}

/// The CRM UI is the only browser origin that talks to the API routes by default.
fn default_origins() -> Vec<String> {
    vec!["https://app.hubspot.com".to_string()]
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., HUBSPOT_CLIENT_ID)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: base_url -> BASE_URL
        envy::from_env::<Config>()
    }

    /// OAuth redirect URI registered with the HubSpot app.
    ///
    /// Always `<base_url>/oauth/callback`; the path is fixed by the router.
    pub fn redirect_uri(&self) -> String {
        format!("{}/oauth/callback", self.base_url.trim_end_matches('/'))
    }

    /// Absolute viewer-page URL for a file, with the access token attached.
    pub fn view_url(&self, file_id: &str, token: &str) -> String {
        format!(
            "{}/files/{}/view?token={}",
            self.base_url.trim_end_matches('/'),
            file_id,
            token
        )
    }

    /// Absolute raw-content URL for a file, with the access token attached.
    pub fn content_url(&self, file_id: &str, token: &str) -> String {
        format!(
            "{}/files/{}/content?token={}",
            self.base_url.trim_end_matches('/'),
            file_id,
            token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> Config {
        Config {
            hubspot_client_id: "id".to_string(),
            hubspot_client_secret: "secret".to_string(),
            hubspot_api_base: default_api_base(),
            base_url: base_url.to_string(),
            allowed_origins: default_origins(),
            server_port: 3000,
        }
    }

    #[test]
    fn redirect_uri_strips_trailing_slash() {
        let config = test_config("https://bridge.example.com/");

        assert_eq!(
            config.redirect_uri(),
            "https://bridge.example.com/oauth/callback"
        );
    }

    #[test]
    fn view_url_embeds_file_id_and_token() {
        let config = test_config("http://localhost:3000");

        assert_eq!(
            config.view_url("42", "abc123"),
            "http://localhost:3000/files/42/view?token=abc123"
        );
        assert_eq!(
            config.content_url("42", "abc123"),
            "http://localhost:3000/files/42/content?token=abc123"
        );
    }
}
