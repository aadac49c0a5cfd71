// ABOUTME: Diagnostics accumulator for non-fatal failures during a retention run.
// ABOUTME: Logs each failure as it is recorded and keeps it for the run report.

use crate::retention::{CleanupError, CleanupErrorKind};

/// Collects tolerated failures for one repository run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<CleanupError>,
}

impl Diagnostics {
    /// Record a failure, auto-logging it via tracing.
    pub fn record(&mut self, error: CleanupError) {
        match error.kind() {
            CleanupErrorKind::InvalidPolicy => tracing::warn!("{}", error),
            CleanupErrorKind::Fetch | CleanupErrorKind::DeleteBatch => {
                tracing::error!("{}", error)
            }
        }
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn count(&self, kind: CleanupErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn into_errors(self) -> Vec<CleanupError> {
        self.errors
    }
}
