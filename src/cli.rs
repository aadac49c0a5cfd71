// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Takes a config file or explicit repositories plus region.

use clap::Parser;
use ecr_cleaner::config::Overrides;
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecr-cleaner")]
#[command(about = "Delete old images from Amazon ECR repositories using tag-based keep counts")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file in YAML format
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Repository names and policies (keep most recent), e.g. my-repo:latest=3,tag-prefix=2,untagged=10
    #[arg(long, num_args = 1.., value_name = "ENTRY")]
    pub repositories: Vec<String>,

    /// ECR region
    #[arg(long)]
    pub region: Option<String>,

    /// Max number of images that can be deleted in one call [default: 100]
    #[arg(long)]
    pub batch_size: Option<NonZeroUsize>,

    /// Check result without deleting images (the default unless --execute is given)
    #[arg(long, conflicts_with = "execute")]
    pub dry_run: bool,

    /// Actually delete images
    #[arg(long)]
    pub execute: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// A config file, or both repositories and a region, must be given.
    pub fn has_inputs(&self) -> bool {
        self.config_file.is_some() || (!self.repositories.is_empty() && self.region.is_some())
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            repositories: self.repositories.clone(),
            region: self.region.clone(),
            batch_size: self.batch_size,
            dry_run: self.dry_run,
            execute: self.execute,
        }
    }
}
