//! CLI command definitions and handlers

pub mod replay;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Provenance records for dependency resolution
#[derive(Parser, Debug)]
#[command(name = "dep-tracker")]
#[command(author, version)]
#[command(about = "Replay recorded resolution events through the provenance tracker")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to $DEP_TRACKER_HOME/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Feed a JSON file of recorded events through the tracker
    Replay(ReplayArgs),
}

#[derive(clap::Args, Debug)]
pub struct ReplayArgs {
    /// JSON array of recorded events
    pub events: PathBuf,

    /// Local repository the events refer to
    #[arg(short, long)]
    pub local_repo: PathBuf,
}
