//! Shared fixtures for the distribution integration tests: recipient and
//! secret wiring against a wiremock server, plus an in-memory artefact
//! store.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Once};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use gazette_distribution::{
    Artefact, ArtefactStore, ArtefactStoreError, DeliveryClient, Location, OAuthClient,
    PublicationMetadata, RecipientConfig, RetryPolicy, SubscriptionDispatcher, TokenCache,
};
use gazette_secrets::MemorySecretProvider;

static INIT: Once = Once::new();

/// Route test logs through tracing-subscriber when RUST_LOG is set.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A recipient whose destination and token endpoints live on the given
/// mock server, under `/api/{id}` and `/token/{id}`.
pub fn recipient(server: &MockServer, id: &str) -> RecipientConfig {
    RecipientConfig::new(
        id,
        format!("{}/api/{id}", server.uri()),
        format!("{}/token/{id}", server.uri()),
        format!("{id}_client_id"),
        format!("{id}_client_secret"),
        format!("{id}_scope"),
    )
}

/// Secret provider holding credentials for the given recipient ids.
pub fn secrets_for(ids: &[&str]) -> Arc<MemorySecretProvider> {
    let mut provider = MemorySecretProvider::new();
    for id in ids {
        provider = provider
            .with_secret(format!("{id}_client_id"), format!("{id}-client"))
            .with_secret(format!("{id}_client_secret"), format!("{id}-secret"))
            .with_secret(format!("{id}_scope"), format!("api://{id}/.default"));
    }
    Arc::new(provider)
}

/// OAuth client over the given secrets with a 60 s expiry buffer.
pub fn oauth_client(secrets: Arc<MemorySecretProvider>) -> OAuthClient {
    OAuthClient::new(secrets, TokenCache::new(60), reqwest::Client::new())
}

/// Delivery client with zero backoff so retry tests run instantly.
pub fn delivery_client(secrets: Arc<MemorySecretProvider>, max_retries: u32) -> DeliveryClient {
    init_tracing();
    DeliveryClient::new(
        reqwest::Client::new(),
        oauth_client(secrets),
        RetryPolicy::new(max_retries, 0),
    )
}

/// Mount a token endpoint for the recipient returning `access_token`
/// with a one-hour lifetime.
pub async fn mount_token_endpoint(server: &MockServer, id: &str, access_token: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/token/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "expires_in": 3600,
        })))
        .mount(server)
        .await;
}

/// Metadata fixture for a publication.
pub fn metadata(publication_id: Uuid) -> PublicationMetadata {
    PublicationMetadata {
        publication_id,
        list_type: "CIVIL_DAILY_CAUSE_LIST".to_string(),
        location_name: "Central Court".to_string(),
        content_date: Utc::now(),
        sensitivity: "PUBLIC".to_string(),
        language: "ENGLISH".to_string(),
        display_from: Utc::now(),
        display_to: Utc::now(),
    }
}

/// Artefact fixture matching [`metadata`].
pub fn artefact(is_flat_file: bool, source_artefact_id: &str) -> Artefact {
    Artefact {
        list_type: "CIVIL_DAILY_CAUSE_LIST".to_string(),
        location_id: "15".to_string(),
        content_date: Utc::now(),
        sensitivity: "PUBLIC".to_string(),
        language: "ENGLISH".to_string(),
        display_from: Utc::now(),
        display_to: Utc::now(),
        is_flat_file,
        source_artefact_id: source_artefact_id.to_string(),
    }
}

/// In-memory artefact store with call counting.
pub struct StaticArtefactStore {
    pub artefact: Artefact,
    pub json: String,
    pub flat_file: Vec<u8>,
    pub fail: bool,
    pub artefact_calls: AtomicU32,
}

impl StaticArtefactStore {
    pub fn json_publication(json: &str) -> Self {
        Self {
            artefact: artefact(false, "upload.json"),
            json: json.to_string(),
            flat_file: Vec::new(),
            fail: false,
            artefact_calls: AtomicU32::new(0),
        }
    }

    pub fn flat_file_publication(content: &[u8], source_artefact_id: &str) -> Self {
        Self {
            artefact: artefact(true, source_artefact_id),
            json: String::new(),
            flat_file: content.to_vec(),
            fail: false,
            artefact_calls: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        let mut store = Self::json_publication("{}");
        store.fail = true;
        store
    }

    pub fn artefact_calls(&self) -> u32 {
        self.artefact_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtefactStore for StaticArtefactStore {
    async fn get_artefact(&self, publication_id: Uuid) -> Result<Artefact, ArtefactStoreError> {
        self.artefact_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(ArtefactStoreError::NotFound(publication_id))
        } else {
            Ok(self.artefact.clone())
        }
    }

    async fn get_location(&self, _location_id: &str) -> Result<Location, ArtefactStoreError> {
        Ok(Location {
            name: "Central Court".to_string(),
        })
    }

    async fn get_flat_file(&self, _publication_id: Uuid) -> Result<Vec<u8>, ArtefactStoreError> {
        Ok(self.flat_file.clone())
    }

    async fn get_json_blob(&self, _publication_id: Uuid) -> Result<String, ArtefactStoreError> {
        Ok(self.json.clone())
    }
}

/// Dispatcher over the given store and a zero-backoff delivery client.
///
/// Takes the store as an `Arc` so tests can keep a handle for call-count
/// assertions.
pub fn dispatcher(
    store: Arc<StaticArtefactStore>,
    secrets: Arc<MemorySecretProvider>,
    max_retries: u32,
) -> SubscriptionDispatcher {
    SubscriptionDispatcher::new(store, delivery_client(secrets, max_retries))
}

/// Requests the mock server received for the given path.
pub async fn requests_for(server: &MockServer, wanted: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .into_iter()
        .filter(|request| request.url.path() == wanted)
        .collect()
}

/// Whether a multipart body contains a part with the given name.
pub fn has_part(request: &Request, part_name: &str) -> bool {
    let body = String::from_utf8_lossy(&request.body);
    body.contains(&format!("name=\"{part_name}\""))
}
