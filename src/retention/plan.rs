// ABOUTME: Retention decisions: which images in each bucket fall beyond the keep-count.
// ABOUTME: Pure functions over classified buckets; no registry access or logging.

use std::collections::HashSet;

use super::classify::ClassifiedImages;
use crate::types::{ImageRecord, Policy, PolicyKey};

/// The oldest images of a newest-first bucket beyond `keep_count`.
///
/// Empty when the bucket holds no more than `keep_count` images.
pub fn plan<'b, 'a>(bucket: &'b [&'a ImageRecord], keep_count: u32) -> &'b [&'a ImageRecord] {
    let keep = usize::try_from(keep_count).unwrap_or(usize::MAX);
    let delete_count = bucket.len().saturating_sub(keep);
    &bucket[bucket.len() - delete_count..]
}

/// Outcome of planning one policy key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    /// Some images fall beyond the keep-count.
    Delete,
    /// The bucket fits within the keep-count.
    Keep,
    /// A tag key with a keep-count of 0 is refused rather than wiping the tag.
    InvalidPolicy,
}

/// Planned deletions for a single policy key.
#[derive(Debug, Clone)]
pub struct KeyPlan<'a> {
    pub key: PolicyKey,
    pub keep_count: u32,
    /// Images in the key's bucket.
    pub total: usize,
    pub status: KeyStatus,
    /// Oldest-last slice of the bucket selected for deletion.
    pub to_delete: Vec<&'a ImageRecord>,
}

/// Deletion plan for a whole policy, one entry per key.
#[derive(Debug, Clone, Default)]
pub struct RetentionPlan<'a> {
    pub keys: Vec<KeyPlan<'a>>,
}

impl<'a> RetentionPlan<'a> {
    /// Images planned for deletion across all keys.
    pub fn planned_count(&self) -> usize {
        self.keys.iter().map(|k| k.to_delete.len()).sum()
    }

    /// The images to actually delete for each key, aligned with `keys`. A
    /// digest planned under more than one key is kept only under the first.
    /// Images without a digest are passed through.
    pub fn scheduled(&self) -> Vec<Vec<&'a ImageRecord>> {
        let mut seen = HashSet::new();
        self.keys
            .iter()
            .map(|k| {
                k.to_delete
                    .iter()
                    .copied()
                    .filter(|image| image.digest().is_none_or(|d| seen.insert(d)))
                    .collect()
            })
            .collect()
    }

    pub fn key(&self, key: &str) -> Option<&KeyPlan<'a>> {
        self.keys.iter().find(|k| k.key.as_str() == key)
    }
}

/// Plan every key of `policy`: tag and prefix keys in policy order, then the
/// untagged key, which always takes part (keep-count 0 when not configured).
pub fn plan_policy<'a>(classified: &ClassifiedImages<'a>, policy: &Policy) -> RetentionPlan<'a> {
    let mut keys = Vec::with_capacity(policy.len() + 1);

    for (key, keep_count) in policy.iter() {
        let PolicyKey::Tag(tag) = key else {
            continue;
        };
        let bucket = classified.bucket(tag);

        if keep_count == 0 {
            keys.push(KeyPlan {
                key: key.clone(),
                keep_count,
                total: bucket.len(),
                status: KeyStatus::InvalidPolicy,
                to_delete: Vec::new(),
            });
            continue;
        }

        keys.push(key_plan(key.clone(), bucket, keep_count));
    }

    keys.push(key_plan(
        PolicyKey::Untagged,
        &classified.untagged,
        policy.untagged_keep(),
    ));

    RetentionPlan { keys }
}

fn key_plan<'a>(key: PolicyKey, bucket: &[&'a ImageRecord], keep_count: u32) -> KeyPlan<'a> {
    let to_delete = plan(bucket, keep_count).to_vec();
    KeyPlan {
        key,
        keep_count,
        total: bucket.len(),
        status: if to_delete.is_empty() {
            KeyStatus::Keep
        } else {
            KeyStatus::Delete
        },
        to_delete,
    }
}
