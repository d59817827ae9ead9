//! Persistent manifest store shared across resolution runs.
//!
//! Layout: `<root>/<lowercase package name>/<normalized version>.json`.
//! Entries are keyed purely by `(name, version)` and never rewritten with
//! different content, so concurrent writers and readers are safe as long as
//! each write lands atomically.

use std::fs;
use std::path::{Path, PathBuf};

use pinion_core::config::CacheConfig;
use pinion_core::{PackageName, ResolvedPackage, Version};
use pinion_util::fs::{dir_size, write_atomic};
use tracing::{debug, warn};

/// On-disk manifest cache.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    root: PathBuf,
}

/// Size of a manifest store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub entries: usize,
    pub bytes: u64,
}

impl ManifestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store described by `config`, or `None` when persistence is disabled.
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        config.persistent.then(|| Self::new(config.dir_path()))
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the entry for a given package version.
    pub fn entry_path(&self, name: &PackageName, version: &Version) -> PathBuf {
        self.root
            .join(escape_component(name.key()))
            .join(format!("{}.json", escape_component(&version.normalized())))
    }

    /// Read a stored manifest.
    ///
    /// Unreadable or mismatched entries are reported and treated as absent.
    pub fn get(&self, name: &PackageName, version: &Version) -> Option<ResolvedPackage> {
        let path = self.entry_path(name, version);
        if !path.is_file() {
            return None;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("ignoring unreadable manifest cache entry {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str::<ResolvedPackage>(&content) {
            Ok(package) if package.name == *name && package.version == *version => {
                debug!("manifest cache hit for {name} {version}");
                Some(package)
            }
            Ok(package) => {
                warn!(
                    "ignoring manifest cache entry {}: it describes {package}",
                    path.display()
                );
                None
            }
            Err(e) => {
                warn!("ignoring corrupt manifest cache entry {}: {e}", path.display());
                None
            }
        }
    }

    /// Store a manifest under `(name, version)`.
    pub fn put(
        &self,
        name: &PackageName,
        version: &Version,
        package: &ResolvedPackage,
    ) -> std::io::Result<PathBuf> {
        let path = self.entry_path(name, version);
        let json = serde_json::to_vec_pretty(package)?;
        write_atomic(&path, &json)?;
        Ok(path)
    }

    /// Remove every entry. Returns the number of entries removed.
    pub fn clear(&self) -> std::io::Result<usize> {
        let removed = self.stats().entries;
        if self.root.is_dir() {
            fs::remove_dir_all(&self.root)?;
        }
        Ok(removed)
    }

    /// Count entries and total bytes on disk.
    pub fn stats(&self) -> StoreStats {
        let Ok(packages) = fs::read_dir(&self.root) else {
            return StoreStats::default();
        };
        let entries = packages
            .flatten()
            .filter(|e| e.path().is_dir())
            .map(|e| {
                fs::read_dir(e.path())
                    .map(|rd| {
                        rd.flatten()
                            .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
                            .count()
                    })
                    .unwrap_or(0)
            })
            .sum();
        StoreStats {
            entries,
            bytes: dir_size(&self.root),
        }
    }
}

/// Make a name safe to use as a single path component.
///
/// Characters outside `[a-z0-9._-]` and a leading `.` are percent-encoded,
/// so distinct names never collide and no name escapes the store root.
fn escape_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, byte) in raw.bytes().enumerate() {
        let safe = byte.is_ascii_lowercase()
            || byte.is_ascii_digit()
            || byte == b'-'
            || byte == b'_'
            || (byte == b'.' && i > 0);
        if safe {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
