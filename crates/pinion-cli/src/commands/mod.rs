//! Command dispatch and handler modules.

mod cache;
mod resolve;

use miette::Result;
use pinion_core::config::PinionConfig;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PinionConfig::load(path)?,
        None => PinionConfig::load_default()?,
    };
    tracing::debug!("manifest cache at {}", config.cache.dir_path().display());

    match cli.command {
        Command::Resolve {
            requirements,
            feed,
            no_cache,
        } => resolve::exec(&config, &requirements, &feed, no_cache, cli.verbose).await,
        Command::Cache { action } => cache::exec(&config, action),
    }
}
