//! Resolution session cache in front of a [`PackageFeed`].
//!
//! Querying a feed dominates the cost of resolution, so every lookup is
//! memoized for the run. Each key owns a [`OnceCell`]: concurrent lookups for
//! the same key wait on the one in-flight feed call and all of them observe
//! its result, failures included. Manifests additionally go through the
//! persistent [`ManifestStore`] when one is configured.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::join_all;
use pinion_core::{FeedError, PackageFeed, PackageName, ResolvedPackage, Version};
use tokio::sync::OnceCell;
use tracing::{debug, trace, warn};

use crate::store::ManifestStore;

type VersionCell = Arc<OnceCell<Result<Arc<[Version]>, FeedError>>>;
type ManifestCell = Arc<OnceCell<Result<Arc<ResolvedPackage>, FeedError>>>;

/// Per-run cache of version listings and manifests.
pub struct FeedCache<'a, F> {
    feed: &'a F,
    store: Option<ManifestStore>,
    versions: DashMap<PackageName, VersionCell>,
    manifests: DashMap<(PackageName, Version), ManifestCell>,
    version_calls: AtomicUsize,
    manifest_calls: AtomicUsize,
    store_hits: AtomicUsize,
}

/// How much work a [`FeedCache`] handed to its feed and store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// `list_versions` calls made to the feed.
    pub version_calls: usize,
    /// `fetch_manifest` calls made to the feed.
    pub manifest_calls: usize,
    /// Manifests served by the persistent store.
    pub store_hits: usize,
}

impl<'a, F: PackageFeed> FeedCache<'a, F> {
    pub fn new(feed: &'a F, store: Option<ManifestStore>) -> Self {
        Self {
            feed,
            store,
            versions: DashMap::new(),
            manifests: DashMap::new(),
            version_calls: AtomicUsize::new(0),
            manifest_calls: AtomicUsize::new(0),
            store_hits: AtomicUsize::new(0),
        }
    }

    /// All versions of `name`, asking the feed at most once per run.
    pub async fn list_versions(&self, name: &PackageName) -> Result<Arc<[Version]>, FeedError> {
        let cell = self.versions.entry(name.clone()).or_default().value().clone();
        cell.get_or_init(|| async {
            self.version_calls.fetch_add(1, Ordering::Relaxed);
            debug!("listing versions of {name}");
            self.feed.list_versions(name).await.map(|versions| {
                trace!("{name} has {} versions", versions.len());
                Arc::<[Version]>::from(versions)
            })
        })
        .await
        .clone()
    }

    /// The manifest of `name` at `version`, from memory, the store, or the
    /// feed, in that order.
    pub async fn fetch_manifest(
        &self,
        name: &PackageName,
        version: &Version,
    ) -> Result<Arc<ResolvedPackage>, FeedError> {
        let cell = self
            .manifests
            .entry((name.clone(), version.clone()))
            .or_default()
            .value()
            .clone();
        cell.get_or_init(|| self.load_manifest(name, version))
            .await
            .clone()
    }

    async fn load_manifest(
        &self,
        name: &PackageName,
        version: &Version,
    ) -> Result<Arc<ResolvedPackage>, FeedError> {
        if let Some(package) = self.store.as_ref().and_then(|s| s.get(name, version)) {
            self.store_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::new(package));
        }

        self.manifest_calls.fetch_add(1, Ordering::Relaxed);
        debug!("fetching manifest of {name} {version}");
        let package = self.feed.fetch_manifest(name, version).await?;

        if let Some(store) = &self.store {
            if let Err(e) = store.put(name, version, &package) {
                warn!("failed to persist manifest of {name} {version}: {e}");
            }
        }
        Ok(Arc::new(package))
    }

    /// Warm the manifests of up to `limit` leading `versions` concurrently.
    ///
    /// Outcomes are left in the cache for the search to consume in its own
    /// order; nothing is reported here.
    pub async fn prefetch_manifests(&self, name: &PackageName, versions: &[Version], limit: usize) {
        if limit == 0 || versions.len() < 2 {
            return;
        }
        join_all(
            versions
                .iter()
                .take(limit)
                .map(|version| self.fetch_manifest(name, version)),
        )
        .await;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            version_calls: self.version_calls.load(Ordering::Relaxed),
            manifest_calls: self.manifest_calls.load(Ordering::Relaxed),
            store_hits: self.store_hits.load(Ordering::Relaxed),
        }
    }
}
