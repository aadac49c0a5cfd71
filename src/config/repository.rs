// ABOUTME: Repository policy entries for the config file and command line.
// ABOUTME: Parses "name:key=count,key=count" into a repository name and policy.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::str::FromStr;

use crate::types::{Policy, PolicyKey};

/// Why a repository policy entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigParseError {
    #[error("invalid repository configuration: {entry}: expected <repository>:<key>=<count>,...")]
    Separator { entry: String },

    #[error("invalid repository configuration: {entry}: repository name cannot be empty")]
    EmptyName { entry: String },

    #[error("invalid repository configuration: {entry}: policy item '{item}' is missing '='")]
    MissingEquals { entry: String, item: String },

    #[error("invalid repository configuration: {entry}: policy item '{item}' has an empty key")]
    EmptyKey { entry: String, item: String },

    #[error("invalid repository configuration: {entry}: policy key {key} is not a tag or prefix")]
    InvalidKey { entry: String, key: String },

    #[error("invalid repository configuration: {entry}: invalid keep count '{count}' for {key}")]
    InvalidCount {
        entry: String,
        key: String,
        count: String,
    },

    #[error(
        "invalid repository configuration: {entry}: expected a <repository>:<key>=<count>,... string or a mapping with name and policy"
    )]
    Unrecognized { entry: String },
}

/// A repository name and the retention policy to enforce on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub name: String,
    pub policy: Policy,
}

impl RepositoryConfig {
    /// Parse `repository:key=count,...`. Keys are tags, tag prefixes or
    /// `untagged`; `untagged` is set to 0 when absent. Empty items, as left by
    /// a trailing comma, are ignored.
    pub fn parse(entry: &str) -> Result<Self, ConfigParseError> {
        let s = entry.trim();

        let (name, policy_part) = match s.split_once(':') {
            Some((name, rest)) if !rest.contains(':') => (name.trim(), rest),
            _ => {
                return Err(ConfigParseError::Separator {
                    entry: entry.to_string(),
                });
            }
        };

        if name.is_empty() {
            return Err(ConfigParseError::EmptyName {
                entry: entry.to_string(),
            });
        }

        let mut policy = Policy::new();
        for item in policy_part.split(',').map(str::trim) {
            if item.is_empty() {
                continue;
            }

            let (key, count) = item
                .split_once('=')
                .ok_or_else(|| ConfigParseError::MissingEquals {
                    entry: entry.to_string(),
                    item: item.to_string(),
                })?;
            let (key, count) = (key.trim(), count.trim());

            if key.is_empty() {
                return Err(ConfigParseError::EmptyKey {
                    entry: entry.to_string(),
                    item: item.to_string(),
                });
            }

            policy.insert(PolicyKey::new(key), keep_count(entry, key, count)?);
        }

        Ok(Self::new(name, policy))
    }

    /// Build a config, adding an explicit `untagged=0` when the policy has none.
    pub fn new(name: impl Into<String>, mut policy: Policy) -> Self {
        if policy.get(&PolicyKey::Untagged).is_none() {
            policy.insert(PolicyKey::Untagged, 0);
        }
        Self {
            name: name.into(),
            policy,
        }
    }
}

impl FromStr for RepositoryConfig {
    type Err = ConfigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn keep_count(entry: &str, key: &str, count: &str) -> Result<u32, ConfigParseError> {
    count
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigParseError::InvalidCount {
            entry: entry.to_string(),
            key: key.to_string(),
            count: count.to_string(),
        })
}

/// A repository entry as written in a config file: either the compact
/// `name:key=count` string or a mapping with `name` and `policy`.
///
/// Counts in the mapping form are checked when the entry is converted, so a
/// bad entry fails on its own instead of failing the whole file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RepositoryEntry {
    Simple(String),
    Detailed(DetailedEntry),
    Invalid(Value),
}

/// Mapping form of a repository entry, policy values not yet validated.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedEntry {
    pub name: String,
    #[serde(default)]
    pub policy: Mapping,
}

impl RepositoryEntry {
    pub fn into_repository_config(self) -> Result<RepositoryConfig, ConfigParseError> {
        match self {
            RepositoryEntry::Simple(s) => RepositoryConfig::parse(&s),
            RepositoryEntry::Detailed(detailed) => detailed.into_repository_config(),
            RepositoryEntry::Invalid(value) => Err(ConfigParseError::Unrecognized {
                entry: scalar_text(&value).unwrap_or_else(|| yaml_text(&value)),
            }),
        }
    }
}

impl DetailedEntry {
    fn into_repository_config(self) -> Result<RepositoryConfig, ConfigParseError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ConfigParseError::EmptyName {
                entry: yaml_text(&Value::String(self.name.clone())),
            });
        }

        let mut policy = Policy::new();
        for (key, count) in &self.policy {
            let key = scalar_text(key).ok_or_else(|| ConfigParseError::InvalidKey {
                entry: name.to_string(),
                key: yaml_text(key),
            })?;
            if key.trim().is_empty() {
                return Err(ConfigParseError::EmptyKey {
                    entry: name.to_string(),
                    item: key,
                });
            }

            let count = scalar_text(count).unwrap_or_else(|| yaml_text(count));
            policy.insert(PolicyKey::new(key.trim()), keep_count(name, &key, &count)?);
        }

        Ok(RepositoryConfig::new(name, policy))
    }
}

/// Text of a string, number or boolean YAML value.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn yaml_text(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_default()
}

impl From<String> for RepositoryEntry {
    fn from(s: String) -> Self {
        RepositoryEntry::Simple(s)
    }
}
