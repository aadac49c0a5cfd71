// ABOUTME: Test support utilities.
// ABOUTME: Provides an in-memory registry and image fixtures for integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ecr_cleaner::types::ImageRecord;
use std::sync::Once;

// Each test binary only uses some of these helpers, so allow dead_code.
#[allow(dead_code)]
pub mod fake_registry;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("ecr_cleaner=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Fixed reference time all fixtures count back from.
#[allow(dead_code)]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// An image pushed `age` hours before the reference time, with digest
/// `sha256:<name>`.
#[allow(dead_code)]
pub fn image(name: &str, age: i64, tags: &[&str]) -> ImageRecord {
    ImageRecord::new(format!("sha256:{name}"), base_time() - Duration::hours(age))
        .with_tags(tags.iter().copied())
}

#[allow(dead_code)]
pub fn digest(name: &str) -> String {
    format!("sha256:{name}")
}

/// Digests of a bucket or deletion set, in order.
#[allow(dead_code)]
pub fn digests(images: &[&ImageRecord]) -> Vec<String> {
    images.iter().filter_map(|i| i.digest.clone()).collect()
}
