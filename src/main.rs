//! dep-tracker CLI entry point

use anyhow::Context;
use clap::Parser;
use dep_tracker::cli::{Cli, Commands};
use dep_tracker::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("DEP_TRACKER_LOG"))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::load().context("loading default configuration")?,
    };

    match cli.command {
        Commands::Replay(args) => dep_tracker::cli::replay::run(args, config)
            .context("replaying recorded events")?,
    }

    Ok(())
}
