// ABOUTME: Retention pipeline from image listing to batched deletion.
// ABOUTME: Exports the fetcher, classifier, planner, executor and Repository driver.

mod classify;
mod delete;
mod error;
mod fetch;
mod plan;
mod repository;

pub use classify::{ClassifiedImages, classify};
pub use delete::{DeletionExecutor, DeletionReport};
pub use error::{CleanupError, CleanupErrorKind};
pub use fetch::fetch_all;
pub use plan::{KeyPlan, KeyStatus, RetentionPlan, plan, plan_policy};
pub use repository::{DEFAULT_BATCH_SIZE, KeyReport, Repository, RepositoryReport};
