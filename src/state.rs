//! Shared application state.
//!
//! One instance is built at startup and handed to every request handler via
//! axum's `State` extraction. All members are cheaply cloneable handles over
//! shared interiors.

use crate::config::Config;
use crate::services::hubspot::HubSpotClient;
use crate::services::token_store::FileTokenStore;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded environment configuration
    pub config: Config,

    /// Ephemeral file-access token store
    pub tokens: FileTokenStore,

    /// HubSpot API client holding the OAuth credentials
    pub hubspot: HubSpotClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let hubspot = HubSpotClient::new(&config);
        Self {
            config,
            tokens: FileTokenStore::new(),
            hubspot,
        }
    }
}
