// ABOUTME: Domain types shared by the registry, config and retention modules.
// ABOUTME: Image records, push timestamps and retention policies.

mod image;
mod policy;
mod timestamp;

pub use image::{ImageRecord, sort_newest_first};
pub use policy::{Policy, PolicyKey, UNTAGGED};
pub use timestamp::PushedAt;
