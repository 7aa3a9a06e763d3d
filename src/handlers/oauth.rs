//! OAuth install flow handlers.
//!
//! HubSpot apps authenticate through a standard authorization-code flow:
//! `/oauth/install` sends the user to HubSpot's consent page, and HubSpot
//! redirects back to `/oauth/callback` with a one-time code that the
//! HubSpot client exchanges for credentials.

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Confirmation page shown after a successful code exchange.
const CONNECTED_PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Connected</title>
    <style>
      body { font-family: sans-serif; margin: 4rem auto; max-width: 28rem; text-align: center; }
    </style>
  </head>
  <body>
    <h1>HubSpot connected</h1>
    <p>The file bridge is authorized. You can close this window.</p>
  </body>
</html>
"#;

/// Query parameters HubSpot appends to the callback redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// One-time authorization code (success case)
    pub code: Option<String>,

    /// Error identifier (user denied consent, expired request, ...)
    pub error: Option<String>,
}

/// Start the install flow.
///
/// # Endpoint
///
/// `GET /oauth/install`
///
/// Redirects to HubSpot's authorization page with this app's client id,
/// redirect URI, and requested scopes.
pub async fn install(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.hubspot.authorize_url())
}

/// Finish the install flow.
///
/// # Endpoint
///
/// `GET /oauth/callback?code=...`
///
/// # Response
///
/// - **Success (200 OK)**: HTML confirmation page
/// - **Error (400)**: HubSpot reported an error, or no code was supplied
/// - **Error (502)**: the code exchange against HubSpot failed
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Html<&'static str>, AppError> {
    if let Some(error) = query.error {
        return Err(AppError::InvalidRequest(format!(
            "HubSpot rejected the authorization: {error}"
        )));
    }

    let code = query
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("missing authorization code".to_string()))?;

    state.hubspot.connect(code).await?;

    Ok(Html(CONNECTED_PAGE))
}
