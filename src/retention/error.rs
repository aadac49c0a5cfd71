// ABOUTME: Non-fatal error types raised while enforcing a retention policy.
// ABOUTME: Fetch, invalid-policy and batch-delete failures, SNAFU style.

use snafu::Snafu;

use crate::registry::RegistryError;

/// A failure that is logged and tolerated: processing continues past it.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CleanupError {
    #[snafu(display("error fetching images from {repository}: {source}"))]
    Fetch {
        repository: String,
        source: RegistryError,
    },

    #[snafu(display(
        "invalid policy for tag {key}: keep count must be greater than 0, got {keep_count}"
    ))]
    InvalidPolicy { key: String, keep_count: u32 },

    #[snafu(display("failed to delete batch {batch} from {repository}: {source}"))]
    DeleteBatch {
        repository: String,
        batch: usize,
        source: RegistryError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupErrorKind {
    /// Listing stopped early; the run continued with a partial image list.
    Fetch,
    /// A tag key was skipped because its keep-count was not positive.
    InvalidPolicy,
    /// One delete batch failed; later batches were still attempted.
    DeleteBatch,
}

impl CleanupError {
    pub fn kind(&self) -> CleanupErrorKind {
        match self {
            CleanupError::Fetch { .. } => CleanupErrorKind::Fetch,
            CleanupError::InvalidPolicy { .. } => CleanupErrorKind::InvalidPolicy,
            CleanupError::DeleteBatch { .. } => CleanupErrorKind::DeleteBatch,
        }
    }
}
