// ABOUTME: Clean command implementation.
// ABOUTME: Applies each repository's policy in turn and reports run totals.

use aws_config::SdkConfig;
use ecr_cleaner::config::Settings;
use ecr_cleaner::error::{Error, Result};
use ecr_cleaner::registry::EcrRegistry;
use ecr_cleaner::retention::{Repository, RepositoryReport};

/// Totals across all repositories of one run.
#[derive(Debug, Default)]
struct RunSummary {
    repositories: usize,
    images: usize,
    deleted: usize,
    previewed: usize,
    failed: usize,
    errors: usize,
}

impl RunSummary {
    fn add(&mut self, report: &RepositoryReport) {
        self.repositories += 1;
        self.images += report.total_images;
        self.deleted += report.deletion.deleted.len();
        self.previewed += report.deletion.previewed.len();
        self.failed += report.deletion.failed.len();
        self.errors += report.errors.len();
    }
}

/// Enforce every configured repository policy, one repository at a time.
///
/// Malformed entries are logged and skipped; the run still fails at the end
/// so the caller notices.
pub async fn clean(settings: Settings) -> Result<()> {
    tracing::debug!(
        region = %settings.region,
        dry_run = settings.dry_run,
        batch_size = settings.batch_size.get(),
        repositories = settings.repositories.len(),
        "args"
    );

    if !settings.dry_run {
        tracing::warn!("Running with --execute: images will be deleted");
    }

    let mut sdk_config: Option<SdkConfig> = None;
    let mut summary = RunSummary::default();
    let mut invalid = 0usize;

    for entry in settings.repositories {
        let repo_config = match entry.into_repository_config() {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("{}", e);
                invalid += 1;
                continue;
            }
        };

        tracing::debug!(
            repository = %repo_config.name,
            policy = %serde_json::to_string(&repo_config.policy).unwrap_or_default(),
            "Repository policy"
        );

        let sdk = match &sdk_config {
            Some(c) => c.clone(),
            None => {
                let c = EcrRegistry::load_config(&settings.region).await;
                sdk_config = Some(c.clone());
                c
            }
        };

        let repository = Repository::new(repo_config.name, EcrRegistry::new(&sdk))
            .batch_size(settings.batch_size);
        let report = repository
            .manage_images(&repo_config.policy, settings.dry_run)
            .await;
        summary.add(&report);
    }

    tracing::info!(
        repositories = summary.repositories,
        images = summary.images,
        deleted = summary.deleted,
        previewed = summary.previewed,
        failed = summary.failed,
        errors = summary.errors,
        dry_run = settings.dry_run,
        "Run complete"
    );

    if invalid > 0 {
        return Err(Error::InvalidEntries(invalid));
    }

    Ok(())
}
