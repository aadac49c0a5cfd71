// ABOUTME: Batched deletion of planned images, or a logged preview under dry-run.
// ABOUTME: A failed batch is recorded and the remaining batches still run.

use std::num::NonZeroUsize;

use nonempty::NonEmpty;
use serde_json::json;
use snafu::ResultExt;

use super::error::DeleteBatchSnafu;
use crate::diagnostics::Diagnostics;
use crate::registry::{DeleteFailure, ImageRegistry};
use crate::types::ImageRecord;

/// What a deletion pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Delete calls issued (or, under dry-run, that would have been issued).
    pub batches: usize,
    pub deleted: Vec<String>,
    /// Digests that a dry-run would have deleted.
    pub previewed: Vec<String>,
    /// Digests the registry refused, or that were in a failed batch.
    pub failed: Vec<DeleteFailure>,
    /// Images left alone because they have no digest.
    pub missing_digest: usize,
}

impl DeletionReport {
    pub fn merge(&mut self, other: DeletionReport) {
        self.batches += other.batches;
        self.deleted.extend(other.deleted);
        self.previewed.extend(other.previewed);
        self.failed.extend(other.failed);
        self.missing_digest += other.missing_digest;
    }
}

/// Applies deletions to one repository in fixed-size batches.
pub struct DeletionExecutor<'r, R: ?Sized> {
    registry: &'r R,
    repository: &'r str,
    batch_size: NonZeroUsize,
    dry_run: bool,
}

impl<'r, R: ImageRegistry + ?Sized> DeletionExecutor<'r, R> {
    pub fn new(registry: &'r R, repository: &'r str, batch_size: NonZeroUsize, dry_run: bool) -> Self {
        Self {
            registry,
            repository,
            batch_size,
            dry_run,
        }
    }

    /// Delete `images` in consecutive batches of at most `batch_size` digests.
    ///
    /// Images without a digest are skipped. Under dry-run no registry call is
    /// made; each batch is logged instead.
    pub async fn delete(&self, images: &[&ImageRecord], diag: &mut Diagnostics) -> DeletionReport {
        let mut report = DeletionReport::default();
        if images.is_empty() {
            return report;
        }

        let digests: Vec<String> = images
            .iter()
            .filter_map(|image| image.digest().map(str::to_string))
            .collect();
        report.missing_digest = images.len() - digests.len();
        if report.missing_digest > 0 {
            tracing::warn!(
                count = report.missing_digest,
                "Skipping images without a digest"
            );
        }

        for (index, chunk) in digests.chunks(self.batch_size.get()).enumerate() {
            let Some(batch) = NonEmpty::from_slice(chunk) else {
                continue;
            };
            report.batches += 1;
            let image_ids = image_ids(&batch);

            if self.dry_run {
                tracing::info!(
                    batch = index + 1,
                    image_ids = %image_ids,
                    "Dry-run: Skip deletion of the following images"
                );
                report.previewed.extend(batch);
                continue;
            }

            match self
                .registry
                .delete_images(self.repository, &batch)
                .await
                .context(DeleteBatchSnafu {
                    repository: self.repository,
                    batch: index + 1,
                }) {
                Ok(outcome) => {
                    tracing::info!(
                        batch = index + 1,
                        deleted = outcome.deleted.len(),
                        failed = outcome.failures.len(),
                        deleted_image_ids = %image_ids,
                        "Deleted {} images",
                        outcome.deleted.len()
                    );
                    for failure in &outcome.failures {
                        tracing::warn!(
                            digest = %failure.digest,
                            code = failure.code.as_deref().unwrap_or("unknown"),
                            reason = failure.reason.as_deref().unwrap_or(""),
                            "Registry refused to delete image"
                        );
                    }
                    report.deleted.extend(outcome.deleted);
                    report.failed.extend(outcome.failures);
                }
                Err(e) => {
                    diag.record(e);
                    report.failed.extend(batch.into_iter().map(|digest| DeleteFailure {
                        digest,
                        code: None,
                        reason: Some("batch request failed".to_string()),
                    }));
                }
            }
        }

        report
    }
}

fn image_ids(batch: &NonEmpty<String>) -> serde_json::Value {
    batch
        .iter()
        .map(|digest| json!({ "imageDigest": digest }))
        .collect()
}
