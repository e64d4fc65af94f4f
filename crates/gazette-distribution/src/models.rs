//! Data model for distribution actions and recipient configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One external subscriber system.
///
/// Holds the *names* of the recipient's OAuth credentials, not the secrets
/// themselves; values are resolved through the secret provider at use time.
/// Constructed per distribution request and never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientConfig {
    /// Opaque recipient identity, used as the token cache key and in logs.
    pub id: String,
    /// Base endpoint for content operations.
    pub destination_url: String,
    /// OAuth token endpoint.
    pub token_url: String,
    /// Secret name for the OAuth client id.
    pub client_id_key: String,
    /// Secret name for the OAuth client secret.
    pub client_secret_key: String,
    /// Secret name for the OAuth scope.
    pub scope_key: String,
}

impl RecipientConfig {
    /// Create a recipient configuration, normalizing trailing slashes off
    /// the destination URL so path concatenation is uniform.
    pub fn new(
        id: impl Into<String>,
        destination_url: impl Into<String>,
        token_url: impl Into<String>,
        client_id_key: impl Into<String>,
        client_secret_key: impl Into<String>,
        scope_key: impl Into<String>,
    ) -> Self {
        let destination_url = destination_url.into();
        Self {
            id: id.into(),
            destination_url: destination_url.trim_end_matches('/').to_string(),
            token_url: token_url.into(),
            client_id_key: client_id_key.into(),
            client_secret_key: client_secret_key.into(),
            scope_key: scope_key.into(),
        }
    }
}

/// Publication metadata sent to every recipient of a content action.
///
/// Built once per action by joining artefact and location data, then shared
/// read-only across recipients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationMetadata {
    pub publication_id: Uuid,
    pub list_type: String,
    pub location_name: String,
    pub content_date: DateTime<Utc>,
    pub sensitivity: String,
    pub language: String,
    pub display_from: DateTime<Utc>,
    pub display_to: DateTime<Utc>,
}

/// Content accompanying a publication event.
///
/// Built once per action, not per recipient. Delete and health-check
/// actions carry no content.
#[derive(Debug, Clone)]
pub enum DeliveryPayload {
    /// JSON case-list payload.
    Json(String),
    /// Binary artefact plus the filename used in its content disposition.
    FlatFile { content: Vec<u8>, filename: String },
    /// No content (delete, health check).
    Empty,
}

/// The kind of distribution being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    NewPublication,
    UpdatePublication,
    DeletePublication,
    HealthCheck,
}

/// One distribution request: an action applied to a publication, fanned out
/// to an ordered list of recipients.
#[derive(Debug, Clone)]
pub struct DistributionAction {
    pub kind: ActionKind,
    pub publication_id: Uuid,
    pub recipients: Vec<RecipientConfig>,
}

/// Artefact record as returned by the artefact store collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artefact {
    pub list_type: String,
    pub location_id: String,
    pub content_date: DateTime<Utc>,
    pub sensitivity: String,
    pub language: String,
    pub display_from: DateTime<Utc>,
    pub display_to: DateTime<Utc>,
    /// Whether the stored content is a binary file rather than JSON.
    pub is_flat_file: bool,
    /// Id of the source artefact as uploaded, including its file extension.
    pub source_artefact_id: String,
}

/// Location record as returned by the artefact store collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
}

impl Artefact {
    /// Build the metadata shared across all recipients of an action.
    pub fn into_metadata(self, publication_id: Uuid, location_name: String) -> PublicationMetadata {
        PublicationMetadata {
            publication_id,
            list_type: self.list_type,
            location_name,
            content_date: self.content_date,
            sensitivity: self.sensitivity,
            language: self.language,
            display_from: self.display_from,
            display_to: self.display_to,
        }
    }
}

/// Derive the delivery filename for a flat file: the publication id with
/// the extension of the stored source artefact.
pub fn flat_file_name(publication_id: Uuid, source_artefact_id: &str) -> String {
    match source_artefact_id.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("{publication_id}.{ext}"),
        _ => publication_id.to_string(),
    }
}
