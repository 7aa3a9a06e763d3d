//! Browser origin policy for the API routes.
//!
//! The mint, attachments, and card endpoints are called from the CRM UI in
//! the user's browser, so they carry a CORS layer restricted to configured
//! origins. The token-gated file routes are opened by top-level navigation
//! (links and the viewer page) and need no CORS handling.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use url::Url;

use crate::config::Config;

/// Build the CORS layer from the configured origin list.
///
/// Entries that do not parse as http(s) origins are skipped with a warning
/// rather than failing startup: a typo in one origin should not take the
/// whole bridge down.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| parse_origin(origin))
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Normalize one configured origin into a header value.
///
/// Accepts full URLs and reduces them to their origin, so trailing slashes
/// or stray paths in the environment variable still match correctly.
fn parse_origin(origin: &str) -> Option<HeaderValue> {
    let parsed = match Url::parse(origin) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => {
            tracing::warn!(origin, "ignoring unparseable allowed origin");
            return None;
        }
    };

    let serialized = parsed.origin().ascii_serialization();
    match HeaderValue::from_str(&serialized) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(origin, "ignoring unparseable allowed origin");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_normalized() {
        let value = parse_origin("https://app.hubspot.com/").unwrap();
        assert_eq!(value, HeaderValue::from_static("https://app.hubspot.com"));

        let with_port = parse_origin("http://localhost:3000").unwrap();
        assert_eq!(with_port, HeaderValue::from_static("http://localhost:3000"));
    }

    #[test]
    fn non_http_origins_are_rejected() {
        assert!(parse_origin("ftp://files.example.com").is_none());
        assert!(parse_origin("not a url").is_none());
    }
}
