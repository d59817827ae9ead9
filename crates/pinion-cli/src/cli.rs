//! CLI argument definitions for Pinion.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pinion",
    version,
    about = "Resolve package requirements into one compatible set of versions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of ~/.pinion/config.toml
    #[arg(long, global = true, env = "PINION_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a requirements file and print the selected versions
    Resolve {
        /// Requirements file with a [dependencies] table
        #[arg(default_value = "pinion.toml")]
        requirements: PathBuf,
        /// Feed directory laid out as <package>/<version>.toml
        #[arg(short, long)]
        feed: PathBuf,
        /// Skip the persistent manifest cache for this run
        #[arg(long)]
        no_cache: bool,
    },

    /// Manage the persistent manifest cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show the number of cached manifests and their size
    Stats,
    /// Remove every cached manifest
    Clear,
}

pub fn parse() -> Cli {
    Cli::parse()
}
