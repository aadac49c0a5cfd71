// ABOUTME: Typed image record as returned by a registry listing.
// ABOUTME: Digest and tags are explicit optionals instead of missing keys.

use super::timestamp::PushedAt;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;

/// One image in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    /// Content digest, the only identifier used for deletion.
    pub digest: Option<String>,
    pub pushed_at: PushedAt,
    /// Tags in registry order. Empty means the image is untagged.
    pub tags: Vec<String>,
}

impl ImageRecord {
    pub fn new(digest: impl Into<String>, pushed_at: impl Into<PushedAt>) -> Self {
        Self {
            digest: Some(digest.into()),
            pushed_at: pushed_at.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// Copy of this record with its push time in canonical string form.
    pub fn normalized(self) -> Self {
        Self {
            pushed_at: self.pushed_at.normalized(),
            ..self
        }
    }
}

/// Sort newest first. The sort is stable, so equal push times keep fetch order.
/// Records whose push time cannot be read sort first, so keep-counts retain
/// them instead of deleting them.
pub fn sort_newest_first(images: &mut [ImageRecord]) {
    images.sort_by_key(|image| {
        Reverse(image.pushed_at.instant().unwrap_or(DateTime::<Utc>::MAX_UTC))
    });
}
