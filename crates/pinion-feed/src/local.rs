//! A feed backed by a directory tree.
//!
//! ```text
//! <root>/
//!   PackageX/
//!     1.0.toml
//!     1.5.toml
//!   PackageY/
//!     2.0.0-beta.1.toml
//! ```

use std::path::{Path, PathBuf};

use pinion_core::{FeedError, PackageFeed, PackageName, ResolvedPackage, Version};
use tokio::fs;
use tracing::{debug, warn};

use crate::manifest::ManifestFile;

/// Serves packages from `<root>/<package>/<version>.toml`.
///
/// Package directories are matched case-insensitively; when several
/// spellings exist the first by path wins. File stems that are not versions
/// are ignored.
#[derive(Debug, Clone)]
pub struct LocalFeed {
    root: PathBuf,
}

impl LocalFeed {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn source_id(&self) -> String {
        self.root.display().to_string()
    }

    async fn package_dir(&self, name: &PackageName) -> Result<Option<PathBuf>, FeedError> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            FeedError::unavailable(name, format!("cannot read feed {}: {e}", self.root.display()))
        })?;
        let mut matched: Option<PathBuf> = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FeedError::unavailable(name, e.to_string()))?
        {
            let file_name = entry.file_name();
            let path = entry.path();
            if file_name.to_string_lossy().to_lowercase() == name.key()
                && path.is_dir()
                && matched.as_ref().map_or(true, |m| path < *m)
            {
                matched = Some(path);
            }
        }
        Ok(matched)
    }

    /// Every `(version, path)` pair in a package directory, ordered by path.
    ///
    /// Equal versions spelled differently (`1.0.toml`, `1.0.0.toml`) always
    /// come back in the same order.
    async fn manifests(&self, name: &PackageName, dir: &Path) -> Result<Vec<(Version, PathBuf)>, FeedError> {
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| FeedError::unavailable(name, e.to_string()))?;
        let mut found = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FeedError::unavailable(name, e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match Version::parse(stem) {
                Ok(version) => found.push((version, path)),
                Err(e) => debug!("skipping {}: {e}", path.display()),
            }
        }
        found.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(found)
    }
}

impl PackageFeed for LocalFeed {
    async fn list_versions(&self, name: &PackageName) -> Result<Vec<Version>, FeedError> {
        let Some(dir) = self.package_dir(name).await? else {
            debug!("{name} is not in {}", self.root.display());
            return Ok(Vec::new());
        };
        let manifests = self.manifests(name, &dir).await?;
        Ok(manifests.into_iter().map(|(version, _)| version).collect())
    }

    async fn fetch_manifest(&self, name: &PackageName, version: &Version) -> Result<ResolvedPackage, FeedError> {
        let dir = self
            .package_dir(name)
            .await?
            .ok_or_else(|| FeedError::not_found(name, version))?;
        let path = self
            .manifests(name, &dir)
            .await?
            .into_iter()
            .find(|(v, _)| v == version)
            .map(|(_, path)| path)
            .ok_or_else(|| FeedError::not_found(name, version))?;

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FeedError::not_found(name, version));
            }
            Err(e) => return Err(FeedError::unavailable(name, e.to_string())),
        };
        let file = ManifestFile::parse(&content).map_err(|e| {
            warn!("invalid manifest {}: {e}", path.display());
            FeedError::unavailable(name, format!("invalid manifest {}: {e}", path.display()))
        })?;
        let mut package = file
            .into_package(name, version)
            .map_err(|e| FeedError::unavailable(name, format!("invalid manifest {}: {e}", path.display())))?;
        package.source = Some(self.source_id());
        Ok(package)
    }
}
