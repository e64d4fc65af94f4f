//! Third-party publication distribution for the gazette platform.
//!
//! Pushes publication events (new, updated, deleted, or a liveness probe)
//! to independently configured external recipient systems. Each recipient
//! authenticates via an OAuth `client_credentials` grant whose tokens are
//! cached with a safety buffer; each outbound call is retried with
//! exponential backoff; and a failed recipient never blocks delivery to
//! the others, except during health-check rounds, which fail fast.

pub mod artefacts;
pub mod auth;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod retry;
pub mod token_cache;

pub use artefacts::{ArtefactStore, ArtefactStoreError};
pub use auth::OAuthClient;
pub use client::{DeliveryClient, DeliveryStatus};
pub use config::DistributionConfig;
pub use dispatcher::{DispatchError, SubscriptionDispatcher};
pub use error::{DistributionError, DistributionResult, HealthCheckFailure};
pub use models::{
    ActionKind, Artefact, DeliveryPayload, DistributionAction, Location, PublicationMetadata,
    RecipientConfig,
};
pub use retry::RetryPolicy;
pub use token_cache::TokenCache;

use std::sync::Arc;

use gazette_secrets::SecretProvider;

/// Build a [`SubscriptionDispatcher`] from process configuration and the
/// two collaborator interfaces.
///
/// This is the single shared constructor used by the request-handling
/// layer; it wires the shared HTTP client, token cache, OAuth client,
/// retry policy and delivery client together consistently.
///
/// # Errors
///
/// Returns [`DistributionError::InvalidConfig`] if the HTTP client cannot
/// be built.
pub fn build_dispatcher(
    config: &DistributionConfig,
    secrets: Arc<dyn SecretProvider>,
    artefacts: Arc<dyn ArtefactStore>,
) -> DistributionResult<SubscriptionDispatcher> {
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("gazette-distribution/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            DistributionError::InvalidConfig(format!("failed to build HTTP client: {e}"))
        })?;

    let cache = TokenCache::new(config.token_expiry_buffer_secs);
    let auth = OAuthClient::new(secrets, cache, http_client.clone());
    let retry = RetryPolicy::new(config.max_retries, config.base_backoff_secs);
    let client = DeliveryClient::new(http_client, auth, retry);

    Ok(SubscriptionDispatcher::new(artefacts, client))
}
