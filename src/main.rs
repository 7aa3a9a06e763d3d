//! HubSpot File Bridge - Main Application Entry Point
//!
//! This is the backend of a CRM UI extension: it fetches file attachments from the HubSpot Files API, hands them to a hosted document-viewer widget, and relays edited results back.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Authorization**: ephemeral file-access tokens minted server-side, presented as a query parameter
//! - **Upstream**: HubSpot CRM/Files REST APIs via reqwest, OAuth credentials held in memory
//! - **Format**: JSON API responses, HTML for the viewer and OAuth pages
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build shared state (token store, HubSpot client)
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

mod config;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Build shared state: token store and HubSpot client
    let state = state::AppState::new(config.clone());

    // API routes called from the CRM UI in the browser (origin-restricted)
    let api_routes = Router::new()
        .route("/api/file-tokens", post(handlers::tokens::mint_token))
        .route(
            "/api/contacts/{contact_id}/attachments",
            get(handlers::attachments::list_attachments),
        )
        .route("/api/card", get(handlers::card::card_data))
        .layer(middleware::cors::cors_layer(&config));

    let app = Router::new()
        // Public routes (no token required)
        .route("/health", get(handlers::health::health_check))
        .route("/oauth/install", get(handlers::oauth::install))
        .route("/oauth/callback", get(handlers::oauth::callback))
        // Token-gated file routes: the read routes bind the token to the
        // file id in the path, the upload route accepts any live token
        .route("/files/{file_id}/content", get(handlers::files::file_content))
        .route("/files/{file_id}/view", get(handlers::files::viewer_page))
        .route("/files/upload", post(handlers::files::upload_file))
        // Merge origin-restricted API routes
        .merge(api_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share state with all handlers via State extraction
        .with_state(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
