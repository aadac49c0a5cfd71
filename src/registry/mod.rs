// ABOUTME: Registry access for listing and deleting images.
// ABOUTME: Defines the ImageRegistry trait and its Amazon ECR implementation.

mod ecr;
mod traits;

pub use ecr::EcrRegistry;
pub use traits::{DeleteFailure, DeleteOutcome, ImagePage, ImageRegistry, RegistryError};
