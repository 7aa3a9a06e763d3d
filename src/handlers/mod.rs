//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Performs business logic (token checks, HubSpot calls)
//! 3. Returns HTTP response (JSON, HTML, raw bytes)

/// Attachment listing for CRM contacts
pub mod attachments;
/// CRM card data endpoint
pub mod card;
/// Token-gated file routes (content, viewer, upload)
pub mod files;
/// Health check endpoint
pub mod health;
/// OAuth install flow
pub mod oauth;
/// Explicit token minting
pub mod tokens;
