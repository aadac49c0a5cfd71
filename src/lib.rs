// ABOUTME: Library root for ecr-cleaner - exposes the retention pipeline for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod registry;
pub mod retention;
pub mod types;
