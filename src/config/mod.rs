// ABOUTME: Configuration file parsing and run settings resolution.
// ABOUTME: Merges the YAML config file with command-line overrides.

mod repository;

pub use repository::{ConfigParseError, DetailedEntry, RepositoryConfig, RepositoryEntry};

use crate::error::{Error, Result};
use crate::retention::DEFAULT_BATCH_SIZE;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::Path;

/// Contents of a config file.
///
/// ```yaml
/// region: us-east-1
/// batch_size: 50
/// repositories:
///   - my-repo:latest=3,stable=2,untagged=10
///   - name: my-other-repo
///     policy:
///       release-: 5
///       untagged: 1
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub batch_size: Option<NonZeroUsize>,

    #[serde(default)]
    pub dry_run: Option<bool>,

    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

/// Values given on the command line. They win over the config file, except
/// for the repository list, which comes from the file when one is given.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repositories: Vec<String>,
    pub region: Option<String>,
    pub batch_size: Option<NonZeroUsize>,
    /// Force preview mode.
    pub dry_run: bool,
    /// Allow deletions.
    pub execute: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub repositories: Vec<RepositoryEntry>,
    pub region: String,
    pub batch_size: NonZeroUsize,
    pub dry_run: bool,
}

impl Settings {
    pub fn resolve(file: Option<Config>, overrides: Overrides) -> Result<Self> {
        let file_given = file.is_some();
        let file = file.unwrap_or_default();

        let repositories = if file_given {
            file.repositories
        } else {
            overrides
                .repositories
                .into_iter()
                .map(RepositoryEntry::from)
                .collect()
        };

        let region = overrides
            .region
            .or(file.region)
            .filter(|r| !r.trim().is_empty())
            .ok_or(Error::MissingRegion)?;

        let batch_size = overrides
            .batch_size
            .or(file.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE);

        // Deleting requires an explicit opt-in.
        let dry_run = if overrides.dry_run {
            true
        } else if overrides.execute {
            false
        } else {
            file.dry_run.unwrap_or(true)
        };

        Ok(Settings {
            repositories,
            region,
            batch_size,
            dry_run,
        })
    }
}
