//! HTTP delivery client for third-party recipient endpoints.
//!
//! Performs the four outbound operations (create, update, delete, health
//! check) with bearer authentication, multipart body assembly and bounded
//! retry. The failure contract differs by operation class: content
//! deliveries swallow terminal failures (returning
//! [`DeliveryStatus::Abandoned`] and logging), while health checks surface
//! them as [`HealthCheckFailure`].

use std::time::Instant;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::OAuthClient;
use crate::error::{DistributionError, DistributionResult, HealthCheckFailure};
use crate::models::{DeliveryPayload, PublicationMetadata, RecipientConfig};
use crate::retry::RetryPolicy;

/// Maximum response body length embedded into error details.
const MAX_ERROR_BODY_CHARS: usize = 4096;

/// Outcome of a content delivery, as seen by the orchestrator.
///
/// Deliberately not a `Result`: an abandoned delivery is an expected,
/// already-logged condition that must not stop the remaining recipients of
/// a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The recipient acknowledged the request with a 2xx response.
    Delivered,
    /// The retry budget (or token acquisition) was exhausted; the failure
    /// has been logged.
    Abandoned,
}

/// Client for one process's outbound deliveries to all recipients.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    http_client: reqwest::Client,
    auth: OAuthClient,
    retry: RetryPolicy,
}

impl DeliveryClient {
    /// Create a delivery client. `http_client` should carry the process's
    /// per-attempt timeout and user agent.
    pub fn new(http_client: reqwest::Client, auth: OAuthClient, retry: RetryPolicy) -> Self {
        Self {
            http_client,
            auth,
            retry,
        }
    }

    /// Notify a recipient of a new publication: POST to its destination
    /// URL with a multipart body.
    pub async fn send_new(
        &self,
        recipient: &RecipientConfig,
        metadata: &PublicationMetadata,
        payload: &DeliveryPayload,
    ) -> DeliveryStatus {
        let url = recipient.destination_url.clone();
        self.send_content(recipient, Method::POST, url, metadata, payload)
            .await
    }

    /// Notify a recipient of an updated publication: PUT to
    /// `{destination}/{publication_id}` with a multipart body.
    pub async fn send_update(
        &self,
        recipient: &RecipientConfig,
        metadata: &PublicationMetadata,
        payload: &DeliveryPayload,
    ) -> DeliveryStatus {
        let url = format!("{}/{}", recipient.destination_url, metadata.publication_id);
        self.send_content(recipient, Method::PUT, url, metadata, payload)
            .await
    }

    /// Notify a recipient that a publication was deleted: DELETE on
    /// `{destination}/{publication_id}`, no body.
    pub async fn send_delete(
        &self,
        recipient: &RecipientConfig,
        publication_id: Uuid,
    ) -> DeliveryStatus {
        let url = format!("{}/{}", recipient.destination_url, publication_id);

        let token = match self.auth.get_token(recipient).await {
            Ok(token) => token,
            Err(e) => return self.abandon(recipient, &url, &e),
        };

        let result = self
            .retry
            .execute("send_delete", || {
                let request = self
                    .http_client
                    .request(Method::DELETE, &url)
                    .bearer_auth(&token);
                Self::attempt(request, &url)
            })
            .await;

        self.conclude(recipient, &url, result)
    }

    /// Probe a recipient's liveness: GET on its destination URL.
    ///
    /// Token acquisition deliberately bypasses the cache so the probe
    /// exercises the recipient's token endpoint as well as its content
    /// endpoint; a failure either way is reported, never swallowed.
    pub async fn health_check(&self, recipient: &RecipientConfig) -> Result<(), HealthCheckFailure> {
        let url = recipient.destination_url.clone();

        let token = match self.auth.acquire_token(recipient).await {
            Ok(token) => token,
            Err(e) => {
                return Err(HealthCheckFailure {
                    recipient: recipient.id.clone(),
                    url,
                    status: None,
                    attempts: 0,
                    detail: e.to_string(),
                })
            }
        };

        let result = self
            .retry
            .execute("health_check", || {
                let request = self
                    .http_client
                    .request(Method::GET, &url)
                    .bearer_auth(&token);
                Self::attempt(request, &url)
            })
            .await;

        match result {
            Ok(()) => {
                info!(recipient = %recipient.id, url = %url, "health check passed");
                Ok(())
            }
            Err(DistributionError::RetryExhausted {
                url,
                status,
                attempts,
                detail,
            }) => Err(HealthCheckFailure {
                recipient: recipient.id.clone(),
                url,
                status,
                attempts,
                detail,
            }),
            Err(other) => Err(HealthCheckFailure {
                recipient: recipient.id.clone(),
                url,
                status: None,
                attempts: 0,
                detail: other.to_string(),
            }),
        }
    }

    // ── Internals ─────────────────────────────────────────────────────

    async fn send_content(
        &self,
        recipient: &RecipientConfig,
        method: Method,
        url: String,
        metadata: &PublicationMetadata,
        payload: &DeliveryPayload,
    ) -> DeliveryStatus {
        let token = match self.auth.get_token(recipient).await {
            Ok(token) => token,
            Err(e) => return self.abandon(recipient, &url, &e),
        };

        let metadata_json = match serde_json::to_string(metadata) {
            Ok(json) => json,
            Err(e) => {
                let err = DistributionError::Request {
                    url: url.clone(),
                    status: None,
                    detail: format!("failed to encode metadata: {e}"),
                };
                return self.abandon(recipient, &url, &err);
            }
        };

        let result = self
            .retry
            .execute("send_content", || {
                // Multipart forms are consumed on send, so each attempt
                // builds its own.
                let request = self
                    .http_client
                    .request(method.clone(), &url)
                    .bearer_auth(&token)
                    .multipart(build_form(&metadata_json, payload));
                Self::attempt(request, &url)
            })
            .await;

        self.conclude(recipient, &url, result)
    }

    /// One network attempt: send, then map non-2xx responses to errors
    /// carrying the status and a truncated body.
    async fn attempt(request: reqwest::RequestBuilder, url: &str) -> DistributionResult<()> {
        let start = Instant::now();
        let response = request.send().await.map_err(|e| DistributionError::Request {
            url: url.to_string(),
            status: None,
            detail: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(
                url = %url,
                status = status.as_u16(),
                latency_ms = start.elapsed().as_millis() as u64,
                "request succeeded"
            );
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();

        Err(DistributionError::Request {
            url: url.to_string(),
            status: Some(status.as_u16()),
            detail: if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body
            },
        })
    }

    /// Terminal handling for content operations: success logs at info,
    /// failure logs at warn and is swallowed.
    fn conclude(
        &self,
        recipient: &RecipientConfig,
        url: &str,
        result: DistributionResult<()>,
    ) -> DeliveryStatus {
        match result {
            Ok(()) => {
                info!(recipient = %recipient.id, url = %url, "delivery succeeded");
                DeliveryStatus::Delivered
            }
            Err(e) => self.abandon(recipient, url, &e),
        }
    }

    fn abandon(
        &self,
        recipient: &RecipientConfig,
        url: &str,
        error: &DistributionError,
    ) -> DeliveryStatus {
        warn!(
            recipient = %recipient.id,
            url = %url,
            error = %error,
            "delivery abandoned"
        );
        DeliveryStatus::Abandoned
    }
}

/// Assemble the multipart body for a content operation.
///
/// The `metadata` part is always present; `payload` only for a non-empty
/// JSON string; `file` only for a non-empty blob, carrying the delivery
/// filename in its content disposition.
fn build_form(metadata_json: &str, payload: &DeliveryPayload) -> Form {
    let metadata_part = Part::text(metadata_json.to_string())
        .mime_str("application/json")
        .unwrap_or_else(|_| Part::text(metadata_json.to_string()));
    let mut form = Form::new().part("metadata", metadata_part);

    match payload {
        DeliveryPayload::Json(json) if !json.is_empty() => {
            let part = Part::text(json.clone())
                .mime_str("application/json")
                .unwrap_or_else(|_| Part::text(json.clone()));
            form = form.part("payload", part);
        }
        DeliveryPayload::FlatFile { content, filename } if !content.is_empty() => {
            form = form.part(
                "file",
                Part::bytes(content.clone()).file_name(filename.clone()),
            );
        }
        _ => {}
    }

    form
}

// Multipart assembly rules (metadata always, payload/file conditional) are
// asserted against the wire in tests/delivery_tests.rs, where the mock
// server exposes the received body.
