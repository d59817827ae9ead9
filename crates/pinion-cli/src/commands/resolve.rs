//! Resolve command implementation.

use std::path::Path;

use miette::Result;
use pinion_core::config::PinionConfig;
use pinion_feed::{LocalFeed, RequirementsFile};
use pinion_resolver::{ManifestStore, Resolution, ResolveError, Resolver};
use pinion_util::errors::PinionError;
use pinion_util::progress::{status, status_error, status_info};

pub async fn exec(
    config: &PinionConfig,
    requirements: &Path,
    feed: &Path,
    no_cache: bool,
    verbose: bool,
) -> Result<()> {
    let roots = RequirementsFile::load(requirements)?.requirements()?;

    let mut resolver = Resolver::new(LocalFeed::new(feed), config.resolver.clone());
    if !no_cache {
        if let Some(store) = ManifestStore::from_config(&config.cache) {
            resolver = resolver.with_store(store);
        }
    }

    status(
        "Resolving",
        &format!("{} requirements from {}", roots.len(), requirements.display()),
    );
    let (resolution, stats) = resolver.resolve_with_stats(roots).await.map_err(|e| match e {
        ResolveError::Feed(e) => miette::Report::from(PinionError::Feed {
            message: e.to_string(),
        }),
        exhausted @ ResolveError::Exhausted { .. } => miette::Report::from(exhausted),
    })?;

    if verbose {
        status_info(
            "Searched",
            &format!(
                "{} steps, {} candidates, {} feed lookups, {} cached manifests",
                stats.steps,
                stats.attempts.len(),
                stats.cache.version_calls + stats.cache.manifest_calls,
                stats.cache.store_hits
            ),
        );
    }

    match resolution {
        Resolution::Ok(packages) => {
            for package in &packages {
                println!("{} {}", package.name, package.version);
            }
            status("Resolved", &format!("{} packages", packages.len()));
            Ok(())
        }
        Resolution::Conflict(conflict) => {
            status_error("Conflict", "no compatible set of versions exists");
            eprint!("{conflict}");
            Err(PinionError::Resolution {
                message: format!("{} requirement(s) could not be satisfied", conflict.open.len()),
            }
            .into())
        }
    }
}
