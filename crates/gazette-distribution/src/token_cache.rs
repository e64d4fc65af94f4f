//! Shared cache of OAuth access tokens, keyed by recipient identity.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// A bearer token with its buffered absolute expiry.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Concurrent token cache shared by every recipient of every action.
///
/// Entries are overwritten on re-acquisition and never evicted otherwise;
/// recipient cardinality is low hundreds, so an unbounded map is fine.
/// Only per-key consistency is guaranteed, which is all callers need.
///
/// The cache never acquires tokens itself: an absent or expired entry means
/// the caller must go back to [`crate::auth::OAuthClient`].
#[derive(Debug, Clone)]
pub struct TokenCache {
    entries: Arc<RwLock<HashMap<String, CachedToken>>>,
    buffer_secs: u64,
}

impl TokenCache {
    /// Create a cache that shortens issued token lifetimes by
    /// `buffer_secs`, so a token is never used right up against its real
    /// expiry.
    #[must_use]
    pub fn new(buffer_secs: u64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            buffer_secs,
        }
    }

    /// Return the cached token for a recipient if present and unexpired.
    pub async fn get(&self, recipient_id: &str) -> Option<String> {
        self.get_at(recipient_id, Utc::now()).await
    }

    /// Store (or overwrite) a recipient's token.
    ///
    /// The cached expiry is `issued_expiry_secs - buffer`; a token issued
    /// for no longer than the buffer is stored already expired and will
    /// never be served.
    pub async fn put(&self, recipient_id: &str, access_token: String, issued_expiry_secs: u64) {
        self.put_at(recipient_id, access_token, issued_expiry_secs, Utc::now())
            .await;
    }

    pub(crate) async fn get_at(&self, recipient_id: &str, now: DateTime<Utc>) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(recipient_id).and_then(|cached| {
            if now < cached.expires_at {
                Some(cached.access_token.clone())
            } else {
                None
            }
        })
    }

    pub(crate) async fn put_at(
        &self,
        recipient_id: &str,
        access_token: String,
        issued_expiry_secs: u64,
        now: DateTime<Utc>,
    ) {
        let usable_secs = issued_expiry_secs.saturating_sub(self.buffer_secs);
        let cached = CachedToken {
            access_token,
            expires_at: now + Duration::seconds(usable_secs as i64),
        };
        let mut entries = self.entries.write().await;
        entries.insert(recipient_id.to_string(), cached);
    }
}
