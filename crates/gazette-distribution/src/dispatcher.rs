//! Orchestration of one distribution action across the recipient list.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::artefacts::ArtefactStore;
use crate::client::{DeliveryClient, DeliveryStatus};
use crate::error::{DistributionError, DistributionResult, HealthCheckFailure};
use crate::models::{
    flat_file_name, ActionKind, DeliveryPayload, DistributionAction, PublicationMetadata,
    RecipientConfig,
};

/// Fans one distribution action out to every configured recipient.
///
/// Publication content is resolved once per action and shared read-only
/// across recipients; recipients are independent of each other.
///
/// The two loop policies are deliberate and must stay distinct:
/// content actions continue past failed recipients (failures are logged by
/// the delivery client), while health checks stop at the first failed
/// recipient and propagate it.
pub struct SubscriptionDispatcher {
    artefacts: Arc<dyn ArtefactStore>,
    client: DeliveryClient,
}

/// Result of a health-check round, distinguishing the propagated failure
/// from infrastructure errors.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    HealthCheck(#[from] HealthCheckFailure),
}

impl SubscriptionDispatcher {
    /// Create a dispatcher over the given artefact store and delivery
    /// client.
    pub fn new(artefacts: Arc<dyn ArtefactStore>, client: DeliveryClient) -> Self {
        Self { artefacts, client }
    }

    /// Execute one distribution action, returning a human-readable
    /// summary.
    ///
    /// Per-recipient content-delivery outcomes are observable only via
    /// logs; a completed content action is a success from the caller's
    /// perspective even if some recipients were unreachable.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Distribution`] if publication content cannot be
    ///   resolved (nothing has been delivered at that point).
    /// - [`DispatchError::HealthCheck`] if a health-check round hits an
    ///   unreachable recipient; remaining recipients are not probed.
    pub async fn dispatch(&self, action: &DistributionAction) -> Result<String, DispatchError> {
        match action.kind {
            ActionKind::NewPublication => self.distribute_content(action, false).await,
            ActionKind::UpdatePublication => self.distribute_content(action, true).await,
            ActionKind::DeletePublication => Ok(self.distribute_delete(action).await),
            ActionKind::HealthCheck => {
                self.probe_recipients(&action.recipients).await?;
                Ok(format!(
                    "All {} third-party recipient(s) are reachable",
                    action.recipients.len()
                ))
            }
        }
    }

    async fn distribute_content(
        &self,
        action: &DistributionAction,
        is_update: bool,
    ) -> Result<String, DispatchError> {
        let (metadata, payload) = self.resolve_publication(action.publication_id).await?;

        info!(
            publication_id = %action.publication_id,
            list_type = %metadata.list_type,
            recipient_count = action.recipients.len(),
            update = is_update,
            "distributing publication"
        );

        let mut delivered = 0usize;
        for recipient in &action.recipients {
            let status = if is_update {
                self.client
                    .send_update(recipient, &metadata, &payload)
                    .await
            } else {
                self.client.send_new(recipient, &metadata, &payload).await
            };
            if status == DeliveryStatus::Delivered {
                delivered += 1;
            }
        }

        info!(
            publication_id = %action.publication_id,
            delivered,
            recipient_count = action.recipients.len(),
            "distribution round complete"
        );

        Ok(format!(
            "Distributed publication {} to {} third-party recipient(s)",
            action.publication_id,
            action.recipients.len()
        ))
    }

    async fn distribute_delete(&self, action: &DistributionAction) -> String {
        for recipient in &action.recipients {
            self.client
                .send_delete(recipient, action.publication_id)
                .await;
        }
        format!(
            "Deleted publication {} from {} third-party recipient(s)",
            action.publication_id,
            action.recipients.len()
        )
    }

    /// Probe recipients in list order, stopping at the first failure.
    ///
    /// Sequential probing keeps "first failure" deterministic; recipients
    /// after a failed one are not contacted.
    async fn probe_recipients(
        &self,
        recipients: &[RecipientConfig],
    ) -> Result<(), HealthCheckFailure> {
        for recipient in recipients {
            if let Err(failure) = self.client.health_check(recipient).await {
                warn!(
                    recipient = %failure.recipient,
                    error = %failure,
                    "aborting health-check round on first failure"
                );
                return Err(failure);
            }
        }
        Ok(())
    }

    /// Resolve metadata and content for a content-bearing action, once per
    /// action.
    async fn resolve_publication(
        &self,
        publication_id: Uuid,
    ) -> DistributionResult<(PublicationMetadata, DeliveryPayload)> {
        let artefact = self
            .artefacts
            .get_artefact(publication_id)
            .await
            .map_err(|e| DistributionError::Artefact {
                publication_id,
                detail: e.to_string(),
            })?;

        let location = self
            .artefacts
            .get_location(&artefact.location_id)
            .await
            .map_err(|e| DistributionError::Artefact {
                publication_id,
                detail: e.to_string(),
            })?;

        let payload = if artefact.is_flat_file {
            let content = self
                .artefacts
                .get_flat_file(publication_id)
                .await
                .map_err(|e| DistributionError::Artefact {
                    publication_id,
                    detail: e.to_string(),
                })?;
            DeliveryPayload::FlatFile {
                filename: flat_file_name(publication_id, &artefact.source_artefact_id),
                content,
            }
        } else {
            let json = self
                .artefacts
                .get_json_blob(publication_id)
                .await
                .map_err(|e| DistributionError::Artefact {
                    publication_id,
                    detail: e.to_string(),
                })?;
            DeliveryPayload::Json(json)
        };

        let metadata = artefact.into_metadata(publication_id, location.name);
        Ok((metadata, payload))
    }
}

impl std::fmt::Debug for SubscriptionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionDispatcher").finish_non_exhaustive()
    }
}
