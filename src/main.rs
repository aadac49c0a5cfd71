// ABOUTME: Entry point for the ecr-cleaner CLI application.
// ABOUTME: Parses arguments, sets up logging and runs the clean command.

mod cli;
mod commands;

use clap::{CommandFactory, Parser};
use cli::Cli;
use ecr_cleaner::config::{Config, Settings};
use ecr_cleaner::error::Result;
use ecr_cleaner::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init(cli.debug);

    if !cli.has_inputs() {
        let _ = Cli::command().print_help();
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let file = cli.config_file.as_deref().map(Config::load).transpose()?;
    let settings = Settings::resolve(file, cli.overrides())?;
    commands::clean(settings).await
}
