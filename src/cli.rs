use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A companion application for HomeWizard products
#[derive(Debug, Parser)]
#[command(name = "homewizard-companion", version)]
pub struct Cli {
    /// Config file (default is $HOME/.homewizard-companion)
    #[arg(long, global = true, env = "CONFIG_FILE", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Synchronizes gas meter readings to mindergas.nl
    SyncMindergas,
}
