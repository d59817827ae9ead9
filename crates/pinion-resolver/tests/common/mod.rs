//! An in-memory package feed for driving the resolver in tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use pinion_core::{
    FeedError, PackageFeed, PackageName, PackageRequirement, ResolvedPackage, ResolverStrategy, Version,
    VersionRange,
};

pub fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

pub fn root(name: &str, range: &str) -> PackageRequirement {
    PackageRequirement::root(name, VersionRange::parse(range).unwrap(), ResolverStrategy::Max)
}

pub fn root_min(name: &str, range: &str) -> PackageRequirement {
    PackageRequirement::root(name, VersionRange::parse(range).unwrap(), ResolverStrategy::Min)
}

#[derive(Default)]
pub struct MemoryFeed {
    packages: BTreeMap<PackageName, BTreeMap<Version, Vec<(String, String)>>>,
    unavailable: HashSet<PackageName>,
    vanished: HashSet<(PackageName, Version)>,
    delay: Option<Duration>,
    list_calls: Mutex<HashMap<PackageName, usize>>,
    fetch_calls: Mutex<HashMap<(PackageName, Version), usize>>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `name` at `version` depending on `deps` as `(name, range)` pairs.
    pub fn package(mut self, name: &str, version: &str, deps: &[(&str, &str)]) -> Self {
        let deps = deps.iter().map(|(n, r)| (n.to_string(), r.to_string())).collect();
        self.packages
            .entry(PackageName::from(name))
            .or_default()
            .insert(v(version), deps);
        self
    }

    /// Every lookup of `name` fails as if its feed were down.
    pub fn unavailable(mut self, name: &str) -> Self {
        self.unavailable.insert(PackageName::from(name));
        self
    }

    /// `name` at `version` is listed but its manifest is gone.
    pub fn vanished(mut self, name: &str, version: &str) -> Self {
        self.vanished.insert((PackageName::from(name), v(version)));
        self
    }

    /// Sleep this long inside every call.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn list_calls(&self, name: &str) -> usize {
        let calls = self.list_calls.lock().unwrap();
        calls.get(&PackageName::from(name)).copied().unwrap_or(0)
    }

    pub fn fetch_calls(&self, name: &str, version: &str) -> usize {
        let calls = self.fetch_calls.lock().unwrap();
        calls.get(&(PackageName::from(name), v(version))).copied().unwrap_or(0)
    }

    pub fn total_fetch_calls(&self) -> usize {
        self.fetch_calls.lock().unwrap().values().sum()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl PackageFeed for MemoryFeed {
    async fn list_versions(&self, name: &PackageName) -> Result<Vec<Version>, FeedError> {
        *self.list_calls.lock().unwrap().entry(name.clone()).or_insert(0) += 1;
        self.pause().await;
        if self.unavailable.contains(name) {
            return Err(FeedError::unavailable(name, "connection refused"));
        }
        Ok(self
            .packages
            .get(name)
            .map(|versions| versions.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_manifest(&self, name: &PackageName, version: &Version) -> Result<ResolvedPackage, FeedError> {
        *self
            .fetch_calls
            .lock()
            .unwrap()
            .entry((name.clone(), version.clone()))
            .or_insert(0) += 1;
        self.pause().await;
        if self.unavailable.contains(name) {
            return Err(FeedError::unavailable(name, "connection refused"));
        }
        if self.vanished.contains(&(name.clone(), version.clone())) {
            return Err(FeedError::not_found(name, version));
        }
        let deps = self
            .packages
            .get(name)
            .and_then(|versions| versions.get(version))
            .ok_or_else(|| FeedError::not_found(name, version))?;

        let dependencies = deps
            .iter()
            .map(|(dep, range)| {
                PackageRequirement::transitive(
                    dep.as_str(),
                    VersionRange::parse(range).unwrap(),
                    ResolverStrategy::Max,
                    name.clone(),
                    version.clone(),
                )
            })
            .collect();
        Ok(ResolvedPackage::new(name.clone(), version.clone()).with_dependencies(dependencies))
    }
}
