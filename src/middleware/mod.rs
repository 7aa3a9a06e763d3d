//! HTTP middleware components.
//!
//! Middleware are layers that run around route handlers.
//! They can:
//! - Enforce the browser origin policy
//! - Log requests
//! - Short-circuit requests (reject disallowed origins)

/// Browser origin policy for the API routes
pub mod cors;
