// ABOUTME: Application-wide error types for ecr-cleaner.
// ABOUTME: Uses thiserror for ergonomic error handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no region configured: pass --region or set region in the config file")]
    MissingRegion,

    #[error("{0} repository configuration(s) could not be parsed")]
    InvalidEntries(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
