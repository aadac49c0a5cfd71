// ABOUTME: Partitions a sorted image list into per-tag, per-prefix and untagged buckets.
// ABOUTME: Buckets keep the input order; classification never re-sorts.

use std::collections::{BTreeMap, HashSet};

use crate::types::{ImageRecord, UNTAGGED};

/// Images grouped by tag or prefix key, plus the untagged ones.
#[derive(Debug, Default)]
pub struct ClassifiedImages<'a> {
    pub by_tag: BTreeMap<String, Vec<&'a ImageRecord>>,
    pub untagged: Vec<&'a ImageRecord>,
}

impl<'a> ClassifiedImages<'a> {
    /// The bucket for a tag or prefix key; empty when no image matched it.
    pub fn bucket(&self, key: &str) -> &[&'a ImageRecord] {
        self.by_tag.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_bucket(&self, key: &str) -> bool {
        self.by_tag.contains_key(key)
    }
}

/// Classify `images` (already sorted newest first) against the policy keys.
///
/// Every tag seen gets its own bucket. The first image carrying a tag only
/// creates that bucket; later images with the same tag are appended to it.
/// Independently, an image is appended to the bucket of every policy key its
/// tag starts with, which includes a key equal to the tag itself. An image is
/// never added twice to the same bucket.
pub fn classify<'a, I, S>(images: &'a [ImageRecord], keys: I) -> ClassifiedImages<'a>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefixes: Vec<String> = keys
        .into_iter()
        .map(|k| k.as_ref().to_string())
        .filter(|k| k.as_str() != UNTAGGED)
        .collect();

    let mut builder = BucketBuilder::default();

    // First pass: the set of distinct tags decides which exact buckets exist.
    for tag in images.iter().flat_map(|image| &image.tags) {
        builder.ensure(tag);
    }

    // Second pass: populate buckets in input order.
    let mut untagged = Vec::new();
    for (index, image) in images.iter().enumerate() {
        if image.is_untagged() {
            untagged.push(image);
            continue;
        }

        for tag in &image.tags {
            if !builder.claim(tag) {
                builder.push(tag, index, image);
            }

            for prefix in prefixes.iter().filter(|p| tag.starts_with(p.as_str())) {
                builder.push(prefix, index, image);
            }
        }
    }

    ClassifiedImages {
        by_tag: builder.finish(),
        untagged,
    }
}

#[derive(Default)]
struct Bucket<'a> {
    images: Vec<&'a ImageRecord>,
    last_index: Option<usize>,
}

/// Per-run classification state.
#[derive(Default)]
struct BucketBuilder<'a> {
    buckets: BTreeMap<String, Bucket<'a>>,
    /// Tags whose first occurrence has already created their bucket.
    claimed: HashSet<String>,
}

impl<'a> BucketBuilder<'a> {
    fn ensure(&mut self, key: &str) {
        if !self.buckets.contains_key(key) {
            self.buckets.insert(key.to_string(), Bucket::default());
        }
    }

    /// Mark the creation trigger for `tag`. Returns true only for the first
    /// occurrence, which does not populate the bucket.
    fn claim(&mut self, tag: &str) -> bool {
        if self.claimed.contains(tag) {
            false
        } else {
            self.claimed.insert(tag.to_string());
            true
        }
    }

    fn push(&mut self, key: &str, index: usize, image: &'a ImageRecord) {
        self.ensure(key);
        if let Some(bucket) = self.buckets.get_mut(key)
            && bucket.last_index != Some(index)
        {
            bucket.images.push(image);
            bucket.last_index = Some(index);
        }
    }

    fn finish(self) -> BTreeMap<String, Vec<&'a ImageRecord>> {
        self.buckets
            .into_iter()
            .map(|(key, bucket)| (key, bucket.images))
            .collect()
    }
}
