//! Artefact store collaborator interface.
//!
//! The store of publication artefacts and their metadata lives elsewhere in
//! the platform; this subsystem only reads from it, once per content
//! action.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Artefact, Location};

/// Errors surfaced by an artefact store implementation.
#[derive(Debug, thiserror::Error)]
pub enum ArtefactStoreError {
    #[error("artefact not found: {0}")]
    NotFound(Uuid),

    #[error("location not found: {0}")]
    LocationNotFound(String),

    #[error("artefact store unavailable: {0}")]
    Unavailable(String),
}

/// Read-side interface to the publication artefact store.
#[async_trait]
pub trait ArtefactStore: Send + Sync {
    /// Fetch the artefact record for a publication.
    async fn get_artefact(&self, publication_id: Uuid) -> Result<Artefact, ArtefactStoreError>;

    /// Fetch the location record referenced by an artefact.
    async fn get_location(&self, location_id: &str) -> Result<Location, ArtefactStoreError>;

    /// Fetch the binary content of a flat-file publication.
    async fn get_flat_file(&self, publication_id: Uuid) -> Result<Vec<u8>, ArtefactStoreError>;

    /// Fetch the JSON payload of a structured publication.
    async fn get_json_blob(&self, publication_id: Uuid) -> Result<String, ArtefactStoreError>;
}
