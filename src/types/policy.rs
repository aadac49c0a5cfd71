// ABOUTME: Retention policy mapping tags, tag prefixes and "untagged" to keep-counts.
// ABOUTME: Preserves the order keys were configured in.

use serde::Serialize;
use std::fmt;

/// Reserved policy key selecting images without any tag.
pub const UNTAGGED: &str = "untagged";

/// A policy key: a tag or tag prefix, or the reserved untagged key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PolicyKey {
    Tag(String),
    Untagged,
}

impl PolicyKey {
    pub fn new(key: &str) -> Self {
        if key == UNTAGGED {
            PolicyKey::Untagged
        } else {
            PolicyKey::Tag(key.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PolicyKey::Tag(tag) => tag,
            PolicyKey::Untagged => UNTAGGED,
        }
    }
}

impl fmt::Display for PolicyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PolicyKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Serialize for Policy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Keep-counts per key: how many of the most recent images to retain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    entries: Vec<(PolicyKey, u32)>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keep-count for a key. Re-inserting a key replaces its count but
    /// keeps its original position.
    pub fn insert(&mut self, key: PolicyKey, keep_count: u32) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = keep_count,
            None => self.entries.push((key, keep_count)),
        }
    }

    pub fn with(mut self, key: &str, keep_count: u32) -> Self {
        self.insert(PolicyKey::new(key), keep_count);
        self
    }

    pub fn get(&self, key: &PolicyKey) -> Option<u32> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PolicyKey, u32)> {
        self.entries.iter().map(|(k, count)| (k, *count))
    }

    /// Tag and prefix keys in configured order, excluding "untagged".
    pub fn tag_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(k, _)| match k {
            PolicyKey::Tag(tag) => Some(tag.as_str()),
            PolicyKey::Untagged => None,
        })
    }

    /// Keep-count for untagged images. Absent means 0: every untagged image
    /// is eligible for deletion.
    pub fn untagged_keep(&self) -> u32 {
        self.get(&PolicyKey::Untagged).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_key_is_reserved() {
        assert_eq!(PolicyKey::new("untagged"), PolicyKey::Untagged);
        assert_eq!(PolicyKey::new("latest"), PolicyKey::Tag("latest".into()));
    }

    #[test]
    fn untagged_defaults_to_zero() {
        let policy = Policy::new().with("latest", 3);
        assert_eq!(policy.untagged_keep(), 0);
        assert_eq!(policy.with("untagged", 5).untagged_keep(), 5);
    }

    #[test]
    fn reinsert_keeps_position() {
        let policy = Policy::new()
            .with("beta", 2)
            .with("latest", 1)
            .with("beta", 4);
        let keys: Vec<_> = policy.iter().collect();
        assert_eq!(
            keys,
            vec![
                (&PolicyKey::Tag("beta".into()), 4),
                (&PolicyKey::Tag("latest".into()), 1),
            ]
        );
    }

    #[test]
    fn serializes_as_map() {
        let policy = Policy::new().with("latest", 3).with("untagged", 1);
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(json, r#"{"latest":3,"untagged":1}"#);
    }

    #[test]
    fn tag_keys_skip_untagged() {
        let policy = Policy::new()
            .with("untagged", 1)
            .with("release-", 2)
            .with("latest", 1);
        assert_eq!(policy.tag_keys().collect::<Vec<_>>(), vec!["release-", "latest"]);
    }
}
