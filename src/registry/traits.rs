// ABOUTME: Registry capability trait used by the retention pipeline.
// ABOUTME: Paged image listing and batched deletion by digest.

use crate::types::ImageRecord;
use async_trait::async_trait;
use nonempty::NonEmpty;

/// One page of an image listing.
#[derive(Debug, Clone, Default)]
pub struct ImagePage {
    pub images: Vec<ImageRecord>,
    /// Cursor for the next page; `None` once the listing is exhausted.
    pub next_token: Option<String>,
}

/// Per-digest result of a batch delete call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: Vec<String>,
    pub failures: Vec<DeleteFailure>,
}

/// A digest the registry refused to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub digest: String,
    pub code: Option<String>,
    pub reason: Option<String>,
}

/// Image listing and deletion for a container registry.
#[async_trait]
pub trait ImageRegistry: Send + Sync {
    /// List one page of images in a repository.
    async fn list_images(
        &self,
        repository: &str,
        next_token: Option<&str>,
    ) -> Result<ImagePage, RegistryError>;

    /// Delete a batch of images by digest.
    async fn delete_images(
        &self,
        repository: &str,
        digests: &NonEmpty<String>,
    ) -> Result<DeleteOutcome, RegistryError>;
}

/// Errors surfaced by a registry client.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("registry service error: {0}")]
    Service(String),

    #[error("transport error: {0}")]
    Transport(String),
}
