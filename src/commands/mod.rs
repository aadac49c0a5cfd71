// ABOUTME: Command module aggregator for the ecr-cleaner CLI.
// ABOUTME: Re-exports the clean command handler.

mod clean;

pub use clean::clean;
