// ABOUTME: Applies a retention policy to one repository end to end.
// ABOUTME: Fetch, sort, normalize, classify, plan, dedupe by digest, then delete.

use std::num::NonZeroUsize;

use super::classify::classify;
use super::delete::{DeletionExecutor, DeletionReport};
use super::error::{CleanupError, CleanupErrorKind};
use super::fetch::fetch_all;
use super::plan::{KeyPlan, KeyStatus, plan_policy};
use crate::diagnostics::Diagnostics;
use crate::registry::ImageRegistry;
use crate::types::{ImageRecord, Policy, PolicyKey, sort_newest_first};

/// Maximum number of digests sent in one delete call unless configured.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(100).unwrap();

/// A repository under retention management. Owns its registry handle.
#[derive(Debug)]
pub struct Repository<R> {
    name: String,
    registry: R,
    batch_size: NonZeroUsize,
}

/// Per-key summary of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyReport {
    pub key: PolicyKey,
    pub keep_count: u32,
    pub total: usize,
    pub status: KeyStatus,
    /// Images the keep-count rule selected.
    pub planned: usize,
    /// Images actually handed to the executor after removing digests an
    /// earlier key already scheduled.
    pub scheduled: usize,
}

/// Everything one `manage_images` run did.
#[derive(Debug)]
pub struct RepositoryReport {
    pub repository: String,
    pub dry_run: bool,
    pub total_images: usize,
    pub keys: Vec<KeyReport>,
    pub deletion: DeletionReport,
    pub errors: Vec<CleanupError>,
}

impl RepositoryReport {
    pub fn key(&self, key: &str) -> Option<&KeyReport> {
        self.keys.iter().find(|k| k.key.as_str() == key)
    }
}

impl<R: ImageRegistry> Repository<R> {
    pub fn new(name: impl Into<String>, registry: R) -> Self {
        Self {
            name: name.into(),
            registry,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn batch_size(mut self, batch_size: NonZeroUsize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Fetch all images, newest first, with push times in canonical form.
    pub async fn images(&self, diag: &mut Diagnostics) -> Vec<ImageRecord> {
        let mut images = fetch_all(&self.registry, &self.name, diag).await;
        sort_newest_first(&mut images);
        images.into_iter().map(ImageRecord::normalized).collect()
    }

    /// Enforce `policy`. With `dry_run` set no mutating registry call is made.
    #[tracing::instrument(skip_all, fields(repository = %self.name, dry_run = dry_run))]
    pub async fn manage_images(&self, policy: &Policy, dry_run: bool) -> RepositoryReport {
        let mut diag = Diagnostics::default();
        let images = self.images(&mut diag).await;
        tracing::info!(total_images = images.len(), "Image count");

        let classified = classify(&images, policy.tag_keys());
        let plan = plan_policy(&classified, policy);
        let executor = DeletionExecutor::new(&self.registry, &self.name, self.batch_size, dry_run);

        let mut keys = Vec::with_capacity(plan.keys.len());
        let mut deletion = DeletionReport::default();

        for (key_plan, batch) in plan.keys.iter().zip(plan.scheduled()) {
            if key_plan.status == KeyStatus::InvalidPolicy {
                diag.record(CleanupError::InvalidPolicy {
                    key: key_plan.key.to_string(),
                    keep_count: key_plan.keep_count,
                });
                keys.push(key_report(key_plan, 0));
                continue;
            }

            log_key_plan(key_plan, batch.len());
            if key_plan.key == PolicyKey::Untagged {
                log_untagged_details(&batch);
            }

            deletion.merge(executor.delete(&batch, &mut diag).await);
            keys.push(key_report(key_plan, batch.len()));
        }

        tracing::info!(
            planned = plan.planned_count(),
            deleted = deletion.deleted.len(),
            previewed = deletion.previewed.len(),
            failed = deletion.failed.len(),
            "Retention policy applied"
        );
        if diag.has_errors() {
            tracing::warn!(
                fetch = diag.count(CleanupErrorKind::Fetch),
                invalid_policy = diag.count(CleanupErrorKind::InvalidPolicy),
                delete_batch = diag.count(CleanupErrorKind::DeleteBatch),
                "Retention run finished with errors"
            );
        }

        RepositoryReport {
            repository: self.name.clone(),
            dry_run,
            total_images: images.len(),
            keys,
            deletion,
            errors: diag.into_errors(),
        }
    }
}

fn key_report(plan: &KeyPlan<'_>, scheduled: usize) -> KeyReport {
    KeyReport {
        key: plan.key.clone(),
        keep_count: plan.keep_count,
        total: plan.total,
        status: plan.status,
        planned: plan.to_delete.len(),
        scheduled,
    }
}

fn log_key_plan(plan: &KeyPlan<'_>, scheduled: usize) {
    let planned = plan.to_delete.len();
    match plan.key {
        PolicyKey::Untagged => tracing::info!(
            delete_count = planned,
            total = plan.total,
            keep_count = plan.keep_count,
            "Total images to delete with untagged"
        ),
        PolicyKey::Tag(ref tag) => tracing::info!(
            tag = %tag,
            delete_count = planned,
            keep_count = plan.keep_count,
            total = plan.total,
            "Total images to delete with tag"
        ),
    }

    if scheduled < planned {
        tracing::debug!(
            key = %plan.key,
            already_scheduled = planned - scheduled,
            "Images already scheduled under an earlier key"
        );
    }
}

/// Log the newest and oldest untagged images about to go.
fn log_untagged_details(images: &[&ImageRecord]) {
    let Some(first) = images.first() else {
        return;
    };
    tracing::debug!(
        first = %serde_json::json!({ "imageDigest": first.digest, "imagePushedAt": first.pushed_at }),
        "First image id and publish date from untagged images"
    );
    if images.len() > 1
        && let Some(last) = images.last()
    {
        tracing::debug!(
            last = %serde_json::json!({ "imageDigest": last.digest, "imagePushedAt": last.pushed_at }),
            "Last image id and publish date from untagged images"
        );
    }
}
