//! The backtracking search.
//!
//! Each step picks the most constrained open requirement, walks its
//! candidate versions in strategy order and recurses into the state each
//! candidate produces. The first complete assignment wins. When a branch
//! fails, the packages it left open are boosted so sibling attempts settle
//! them earlier.

use std::future::Future;
use std::pin::Pin;

use miette::Diagnostic;
use pinion_core::config::SearchConfig;
use pinion_core::{FeedError, PackageFeed, PackageName, PackageRequirement, ResolverStrategy, Version};
use thiserror::Error;
use tracing::{debug, info, info_span, trace, Instrument};

use crate::boost::ConflictBoost;
use crate::cache::{CacheStats, FeedCache};
use crate::conflict::{Conflict, Resolution};
use crate::selector;
use crate::state::SearchState;
use crate::store::ManifestStore;

/// Hard failures of a resolution. A [`Conflict`] is not one of them.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ResolveError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Feed(#[from] FeedError),

    #[error("resolution gave up after {steps} steps")]
    #[diagnostic(help("Raise `max-steps` under [resolver] in the config, or pin more requirements"))]
    Exhausted { steps: u64 },
}

/// What a resolution did along the way.
#[derive(Debug, Clone, Default)]
pub struct ResolutionStats {
    /// Search steps taken, one per recursive invocation.
    pub steps: u64,
    /// Every candidate tried, in the order it was tried.
    pub attempts: Vec<(PackageName, Version)>,
    pub cache: CacheStats,
}

/// Resolves root requirements against a [`PackageFeed`].
///
/// Each call to [`Resolver::resolve`] starts with an empty in-memory cache
/// and boost table; only the persistent store outlives it.
pub struct Resolver<F> {
    feed: F,
    config: SearchConfig,
    store: Option<ManifestStore>,
}

impl<F: PackageFeed> Resolver<F> {
    pub fn new(feed: F, config: SearchConfig) -> Self {
        Self {
            feed,
            config,
            store: None,
        }
    }

    /// Read and write manifests through `store` across runs.
    pub fn with_store(mut self, store: ManifestStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub async fn resolve(&self, roots: Vec<PackageRequirement>) -> Result<Resolution, ResolveError> {
        self.resolve_with_stats(roots).await.map(|(resolution, _)| resolution)
    }

    /// Like [`Resolver::resolve`], also reporting how the search went.
    pub async fn resolve_with_stats(
        &self,
        roots: Vec<PackageRequirement>,
    ) -> Result<(Resolution, ResolutionStats), ResolveError> {
        let span = info_span!("resolve", roots = roots.len());
        async move {
            let state = match SearchState::from_roots(roots) {
                Ok(state) => state,
                Err(conflict) => {
                    info!("root requirements conflict with each other");
                    return Ok((Resolution::Conflict(conflict), ResolutionStats::default()));
                }
            };

            let mut search = Search {
                cache: FeedCache::new(&self.feed, self.store.clone()),
                boost: ConflictBoost::new(),
                prefetch: self.config.prefetch,
                max_steps: self.config.max_steps,
                steps: 0,
                attempts: Vec::new(),
            };
            let resolution = search.step(state).await?;

            match &resolution {
                Resolution::Ok(packages) => {
                    info!("resolved {} packages in {} steps", packages.len(), search.steps)
                }
                Resolution::Conflict(conflict) => info!(
                    "no solution after {} steps, {} requirements left open",
                    search.steps,
                    conflict.open.len()
                ),
            }

            let stats = ResolutionStats {
                steps: search.steps,
                cache: search.cache.stats(),
                attempts: search.attempts,
            };
            Ok((resolution, stats))
        }
        .instrument(span)
        .await
    }
}

type StepFuture<'s> = Pin<Box<dyn Future<Output = Result<Resolution, ResolveError>> + Send + 's>>;

/// Mutable state of one resolution call.
struct Search<'a, F> {
    cache: FeedCache<'a, F>,
    boost: ConflictBoost,
    prefetch: usize,
    max_steps: Option<u64>,
    steps: u64,
    attempts: Vec<(PackageName, Version)>,
}

impl<F: PackageFeed> Search<'_, F> {
    fn step(&mut self, state: SearchState) -> StepFuture<'_> {
        Box::pin(async move {
            self.steps += 1;
            if let Some(limit) = self.max_steps {
                if self.steps > limit {
                    return Err(ResolveError::Exhausted { steps: limit });
                }
            }

            let Some((current, rest)) = selector::pick(&state.open, &self.boost) else {
                return Ok(Resolution::Ok(state.into_packages()));
            };

            let candidates = self.candidates(&current).await?;
            if candidates.is_empty() {
                debug!("no version of {} matches {}", current.name, current.range);
                return Ok(Resolution::Conflict(Conflict::new(state.open.into_values(), Vec::new())));
            }
            trace!("{}: {} candidates", current, candidates.len());

            self.cache
                .prefetch_manifests(&current.name, &candidates, self.prefetch)
                .await;

            let mut clashes = Vec::new();
            for version in &candidates {
                let manifest = self.cache.fetch_manifest(&current.name, version).await?;
                self.attempts.push((current.name.clone(), version.clone()));

                let next = match state.choose(&current, rest.clone(), manifest) {
                    Ok(next) => next,
                    Err(clash) => {
                        debug!("{} {version} ruled out: {clash}", current.name);
                        if !clashes.contains(&clash) {
                            clashes.push(clash);
                        }
                        continue;
                    }
                };

                match self.step(next).await? {
                    ok @ Resolution::Ok(_) => return Ok(ok),
                    Resolution::Conflict(conflict) => {
                        trace!("{} {version} failed", current.name);
                        self.boost.boost(conflict.package_names());
                        for clash in conflict.clashes {
                            if !clashes.contains(&clash) {
                                clashes.push(clash);
                            }
                        }
                    }
                }
            }

            Ok(Resolution::Conflict(Conflict::new(state.open.into_values(), clashes)))
        })
    }

    /// Versions of `requirement`'s package it admits, in the order to try them.
    async fn candidates(&self, requirement: &PackageRequirement) -> Result<Vec<Version>, ResolveError> {
        let versions = self.cache.list_versions(&requirement.name).await?;
        let mut candidates: Vec<Version> = versions
            .iter()
            .filter(|v| requirement.range.matches(v))
            .cloned()
            .collect();
        candidates.sort();
        candidates.dedup();
        if requirement.strategy == ResolverStrategy::Max {
            candidates.reverse();
        }
        Ok(candidates)
    }
}
