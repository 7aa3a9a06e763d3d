//! Ephemeral file-access token store.
//!
//! This service mints, validates, and reaps the short-lived capability
//! tokens that gate the file routes. A trusted server-side flow mints a
//! token bound to one HubSpot file id; the token is embedded into a URL
//! handed to the browser; the file routes then check the presented token
//! against both expiry and the bound file id before touching HubSpot.
//!
//! # Lifecycle
//!
//! Records are immutable once created and are removed on two paths:
//! a deferred per-token task firing at the expiry instant, and lazily by
//! the first validation that observes the record is past expiry. Both
//! removals are delete-if-present, so racing each other is a no-op.
//!
//! The store is process-wide, in-memory state with no persistence: a
//! restart invalidates every outstanding token.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;

use crate::error::AppError;
use crate::models::file_token::FileToken;

/// Fixed token lifetime. Deliberately not configurable per call.
const TOKEN_TTL_MINUTES: i64 = 15;

/// Placeholder display name when the caller supplies none.
const DEFAULT_FILENAME: &str = "document";

/// Concurrency-safe map of live tokens, shared with request handlers.
///
/// All operations are independent key-based insert/lookup/delete, so a
/// sharded map gives linearizability per key without any cross-record
/// coordination.
#[derive(Clone)]
pub struct FileTokenStore {
    inner: Arc<DashMap<String, FileToken>>,
}

impl FileTokenStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Mint a token granting access to `file_id` for the next 15 minutes.
    ///
    /// # Process
    ///
    /// 1. Reject an empty `file_id` before touching the store
    /// 2. Generate a 64-hex-character token from 32 bytes of randomness
    /// 3. Insert the record keyed by the token value
    /// 4. Schedule the deferred deletion task for the expiry instant
    ///
    /// # Errors
    ///
    /// - `InvalidRequest`: `file_id` is empty (no record is created)
    pub fn mint(&self, file_id: &str, filename: Option<&str>) -> Result<FileToken, AppError> {
        self.mint_with_ttl(file_id, filename, Duration::minutes(TOKEN_TTL_MINUTES))
    }

    /// Mint with an explicit lifetime. Tests use short or elapsed TTLs to
    /// exercise the expiry paths without waiting out the real window.
    fn mint_with_ttl(
        &self,
        file_id: &str,
        filename: Option<&str>,
        ttl: Duration,
    ) -> Result<FileToken, AppError> {
        if file_id.is_empty() {
            return Err(AppError::InvalidRequest(
                "file_id must not be empty".to_string(),
            ));
        }

        let token = generate_token();
        let record = FileToken {
            token: token.clone(),
            file_id: file_id.to_string(),
            filename: filename.unwrap_or(DEFAULT_FILENAME).to_string(),
            expires_at: Utc::now() + ttl,
        };

        self.inner.insert(token.clone(), record.clone());

        // Deferred deletion at the expiry instant. Token values are never
        // reused, so removing a key the lazy path already reaped is a no-op.
        if let Ok(delay) = ttl.to_std() {
            let map = Arc::clone(&self.inner);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                map.remove(&token);
            });
        }

        tracing::debug!(file_id = %record.file_id, "minted file access token");

        Ok(record)
    }

    /// Validate a token against the file id the caller is acting on.
    ///
    /// # Checks (in order)
    ///
    /// 1. Unknown token → `TokenNotFound`
    /// 2. Past expiry → record removed, `TokenExpired`
    /// 3. Bound to another file → `TokenMismatch` (record left intact)
    ///
    /// Validation never extends or refreshes expiry.
    pub fn validate(&self, token: &str, expected_file_id: &str) -> Result<FileToken, AppError> {
        let record = self.lookup_live(token)?;

        if record.file_id != expected_file_id {
            return Err(AppError::TokenMismatch);
        }

        Ok(record)
    }

    /// Validate that a token is live, without binding it to a file id.
    ///
    /// Only the upload relay uses this: an edited document may be saved as
    /// a new file that had no id when the token was minted, so the upload
    /// site cannot bind-check. The read paths always use [`validate`].
    ///
    /// [`validate`]: FileTokenStore::validate
    pub fn validate_any(&self, token: &str) -> Result<FileToken, AppError> {
        self.lookup_live(token)
    }

    /// Expiry and existence checks shared by both validation entry points.
    fn lookup_live(&self, token: &str) -> Result<FileToken, AppError> {
        // Clone the record and drop the shard guard before any removal.
        let record = match self.inner.get(token) {
            Some(entry) => entry.value().clone(),
            None => return Err(AppError::TokenNotFound),
        };

        if Utc::now() >= record.expires_at {
            // Lazy deletion: the deferred task may be delayed or already
            // done; either way the key is gone after this.
            self.inner.remove(token);
            return Err(AppError::TokenExpired);
        }

        Ok(record)
    }

    /// Remove every expired record, returning how many were dropped.
    ///
    /// The deferred per-token tasks keep the store bounded on their own;
    /// this exists as an explicit operation for callers that want to force
    /// a full reap.
    pub fn sweep(&self) -> usize {
        let before = self.inner.len();
        let now = Utc::now();
        self.inner.retain(|_, record| record.expires_at > now);
        before - self.inner.len()
    }

    /// Number of live (not yet reaped) records.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a cryptographically secure opaque token.
///
/// 64 hex characters from 32 random bytes: wide enough that collision with
/// any live token, or guessing by enumeration, is computationally infeasible.
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validates_immediately_after_mint() {
        let store = FileTokenStore::new();
        let minted = store.mint("42", Some("a.pdf")).unwrap();

        let record = store.validate(&minted.token, "42").unwrap();
        assert_eq!(record.file_id, "42");
        assert_eq!(record.filename, "a.pdf");
        assert_eq!(record.expires_at, minted.expires_at);
    }

    #[tokio::test]
    async fn mismatched_file_id_fails_and_leaves_record_intact() {
        let store = FileTokenStore::new();
        let minted = store.mint("42", Some("a.pdf")).unwrap();

        assert!(matches!(
            store.validate(&minted.token, "99"),
            Err(AppError::TokenMismatch)
        ));

        // Still valid for the file it was bound to.
        assert!(store.validate(&minted.token, "42").is_ok());
    }

    #[test]
    fn unknown_token_fails_not_found() {
        let store = FileTokenStore::new();
        assert!(matches!(
            store.validate("never-issued", "42"),
            Err(AppError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn fresh_token_is_valid_before_expiry() {
        let store = FileTokenStore::new();
        let minted = store
            .mint_with_ttl("42", None, Duration::seconds(60))
            .unwrap();

        assert!(store.validate(&minted.token, "42").is_ok());
    }

    #[test]
    fn expired_token_is_reaped_on_validation() {
        let store = FileTokenStore::new();
        let minted = store
            .mint_with_ttl("42", Some("a.pdf"), Duration::milliseconds(-1))
            .unwrap();

        // First observation of the elapsed expiry removes the record.
        assert!(matches!(
            store.validate(&minted.token, "42"),
            Err(AppError::TokenExpired)
        ));

        // The record is gone, so the same token now reads as never issued.
        assert!(matches!(
            store.validate(&minted.token, "42"),
            Err(AppError::TokenNotFound)
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn tokens_for_the_same_file_are_independent() {
        let store = FileTokenStore::new();
        let first = store
            .mint_with_ttl("42", None, Duration::milliseconds(-1))
            .unwrap();
        let second = store.mint("42", None).unwrap();

        assert_ne!(first.token, second.token);

        // Expiring the first must not affect the second.
        assert!(matches!(
            store.validate(&first.token, "42"),
            Err(AppError::TokenExpired)
        ));
        assert!(store.validate(&second.token, "42").is_ok());
    }

    #[test]
    fn empty_file_id_is_rejected_before_the_store() {
        let store = FileTokenStore::new();
        assert!(matches!(
            store.mint("", Some("a.pdf")),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn filename_defaults_to_placeholder() {
        let store = FileTokenStore::new();
        let minted = store.mint("42", None).unwrap();
        assert_eq!(minted.filename, "document");
    }

    #[tokio::test]
    async fn validate_any_accepts_any_live_token() {
        let store = FileTokenStore::new();
        let minted = store.mint("42", None).unwrap();

        // No file id binding on this path.
        assert!(store.validate_any(&minted.token).is_ok());

        let expired = store
            .mint_with_ttl("7", None, Duration::milliseconds(-1))
            .unwrap();
        assert!(matches!(
            store.validate_any(&expired.token),
            Err(AppError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn sweep_drops_only_expired_records() {
        let store = FileTokenStore::new();
        store
            .mint_with_ttl("1", None, Duration::milliseconds(-1))
            .unwrap();
        store
            .mint_with_ttl("2", None, Duration::milliseconds(-1))
            .unwrap();
        let live = store.mint("3", None).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.sweep(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.validate(&live.token, "3").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn deferred_task_removes_record_at_expiry() {
        let store = FileTokenStore::new();
        let minted = store.mint("42", None).unwrap();
        assert_eq!(store.len(), 1);

        // Paused clock: this jumps past the 15-minute expiry instantly,
        // letting the deferred deletion task fire.
        tokio::time::sleep(std::time::Duration::from_secs(TOKEN_TTL_MINUTES as u64 * 60 + 1))
            .await;

        assert!(store.is_empty());
        assert!(matches!(
            store.validate(&minted.token, "42"),
            Err(AppError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn token_shape_is_64_hex_characters() {
        let store = FileTokenStore::new();
        let minted = store.mint("42", None).unwrap();

        assert_eq!(minted.token.len(), 64);
        assert!(minted.token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
