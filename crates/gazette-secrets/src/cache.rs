//! TTL caching decorator over any secret provider.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{SecretProvider, SecretResult, SecretValue};

/// Internal cache entry wrapping a [`SecretValue`] with its expiry.
#[derive(Debug, Clone)]
struct CachedSecret {
    secret: SecretValue,
    expires_at: DateTime<Utc>,
}

/// A [`SecretProvider`] wrapper that adds TTL-based caching to any inner
/// provider.
///
/// If the inner provider fails after an entry has expired, the stale value
/// is served instead so that a transient secret store outage does not take
/// down callers that were working a moment ago.
pub struct CachedSecretProvider {
    inner: Arc<dyn SecretProvider>,
    entries: RwLock<HashMap<String, CachedSecret>>,
    ttl_seconds: u64,
}

impl CachedSecretProvider {
    /// Wrap the given provider with a cache of `ttl_seconds` per entry.
    pub fn new(inner: Arc<dyn SecretProvider>, ttl_seconds: u64) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
            ttl_seconds,
        }
    }

    async fn get_cached(&self, name: &str, include_expired: bool) -> Option<SecretValue> {
        let entries = self.entries.read().await;
        entries.get(name).and_then(|cached| {
            if include_expired || Utc::now() < cached.expires_at {
                Some(cached.secret.clone())
            } else {
                None
            }
        })
    }

    async fn store(&self, secret: SecretValue) {
        let cached = CachedSecret {
            expires_at: Utc::now() + chrono::Duration::seconds(self.ttl_seconds as i64),
            secret,
        };
        let mut entries = self.entries.write().await;
        entries.insert(cached.secret.name.clone(), cached);
    }
}

impl std::fmt::Debug for CachedSecretProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSecretProvider")
            .field("inner", &self.inner.provider_kind())
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

#[async_trait]
impl SecretProvider for CachedSecretProvider {
    async fn get_secret(&self, name: &str) -> SecretResult<SecretValue> {
        if let Some(cached) = self.get_cached(name, false).await {
            tracing::debug!(secret_name = name, "secret cache hit");
            return Ok(cached);
        }

        match self.inner.get_secret(name).await {
            Ok(secret) => {
                self.store(secret.clone()).await;
                Ok(secret)
            }
            Err(e) => {
                // Degraded mode: fall back to a stale entry if one exists.
                if let Some(stale) = self.get_cached(name, true).await {
                    tracing::warn!(
                        secret_name = name,
                        provider = self.inner.provider_kind(),
                        error = %e,
                        "secret provider unavailable, serving stale cached value"
                    );
                    return Ok(stale);
                }
                Err(e)
            }
        }
    }

    fn provider_kind(&self) -> &'static str {
        self.inner.provider_kind()
    }
}
