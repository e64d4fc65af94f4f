//! OAuth client-credentials token acquisition for third-party recipients.

use std::sync::Arc;

use gazette_secrets::SecretProvider;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DistributionError, DistributionResult};
use crate::models::RecipientConfig;
use crate::token_cache::TokenCache;

/// Token response from a recipient's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Issued lifetime in seconds. Endpoints that omit it get no usable
    /// cache entry, so every call re-acquires.
    #[serde(default)]
    expires_in: u64,
}

/// Acquires access tokens for recipients via the `client_credentials`
/// grant, populating the shared [`TokenCache`].
///
/// Acquisition failures are values, never panics: one unreachable token
/// endpoint must not abort a distribution round covering other recipients.
#[derive(Clone)]
pub struct OAuthClient {
    secrets: Arc<dyn SecretProvider>,
    cache: TokenCache,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Create a client resolving credentials through `secrets` and caching
    /// tokens in `cache`.
    pub fn new(
        secrets: Arc<dyn SecretProvider>,
        cache: TokenCache,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            secrets,
            cache,
            http_client,
        }
    }

    /// Return a bearer token for the recipient, from cache when possible.
    ///
    /// This is the entry point for content deliveries; a cache miss (or an
    /// expired entry) falls through to [`Self::acquire_token`].
    pub async fn get_token(&self, recipient: &RecipientConfig) -> DistributionResult<String> {
        if let Some(token) = self.cache.get(&recipient.id).await {
            debug!(recipient = %recipient.id, "access token served from cache");
            return Ok(token);
        }
        self.acquire_token(recipient).await
    }

    /// Acquire a fresh token from the recipient's token endpoint and cache
    /// it, overwriting any stale entry.
    ///
    /// Health checks call this directly, bypassing the cache: a liveness
    /// probe is expected to exercise the recipient's token endpoint
    /// end-to-end, and a cached token would mask an outage there.
    pub async fn acquire_token(&self, recipient: &RecipientConfig) -> DistributionResult<String> {
        let client_id = self.resolve_secret(&recipient.client_id_key).await?;
        let client_secret = self.resolve_secret(&recipient.client_secret_key).await?;
        let scope = self.resolve_secret(&recipient.scope_key).await?;

        debug!(
            recipient = %recipient.id,
            token_url = %recipient.token_url,
            "requesting access token"
        );

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http_client
            .post(&recipient.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.acquisition_failure(recipient, format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(self.acquisition_failure(
                recipient,
                format!("token endpoint returned {status}: {body}"),
            ));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            self.acquisition_failure(recipient, format!("unusable token response: {e}"))
        })?;

        self.cache
            .put(&recipient.id, token.access_token.clone(), token.expires_in)
            .await;

        Ok(token.access_token)
    }

    async fn resolve_secret(&self, name: &str) -> DistributionResult<String> {
        let value = self.secrets.get_secret(name).await.map_err(|source| {
            warn!(secret_name = name, error = %source, "credential resolution failed");
            DistributionError::CredentialResolution {
                name: name.to_string(),
                source,
            }
        })?;
        let text = value
            .as_str()
            .map_err(|source| DistributionError::CredentialResolution {
                name: name.to_string(),
                source,
            })?;
        Ok(text.to_string())
    }

    fn acquisition_failure(&self, recipient: &RecipientConfig, detail: String) -> DistributionError {
        warn!(
            recipient = %recipient.id,
            token_url = %recipient.token_url,
            detail = %detail,
            "token acquisition failed"
        );
        DistributionError::TokenAcquisition {
            recipient: recipient.id.clone(),
            detail,
        }
    }
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("secrets", &self.secrets.provider_kind())
            .finish()
    }
}
