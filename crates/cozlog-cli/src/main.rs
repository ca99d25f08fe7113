use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cozlog_cli::commands::report;
use cozlog_cli::{Cli, Config};
use cozlog_core::IngestOptions;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so the report on stdout stays clean.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let options = IngestOptions {
        session_gap: config.session_gap(),
        strict: cli.strict || config.strict,
    };
    let log_dir = cli.log_dir.unwrap_or(config.log_dir);

    report::run(&log_dir, &options, cli.json)
}
