use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use pinion_util::errors::{PinionError, PinionResult};

/// User configuration loaded from `~/.pinion/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinionConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub resolver: SearchConfig,
}

/// Persistent manifest cache settings from `[cache]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
    /// When `false`, manifests are only cached for the duration of one run.
    #[serde(default = "default_persistent")]
    pub persistent: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            persistent: default_persistent(),
        }
    }
}

fn default_cache_dir() -> String {
    "~/.pinion/manifests".to_string()
}

fn default_persistent() -> bool {
    true
}

impl CacheConfig {
    /// The cache directory with a leading `~` expanded to the home directory.
    pub fn dir_path(&self) -> PathBuf {
        expand_home(&self.dir)
    }
}

/// Search settings from `[resolver]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// How many candidate manifests to fetch ahead of the search. `0` disables prefetching.
    #[serde(default = "default_prefetch")]
    pub prefetch: usize,
    /// Abort after this many search steps.
    #[serde(default, rename = "max-steps")]
    pub max_steps: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            prefetch: default_prefetch(),
            max_steps: None,
        }
    }
}

fn default_prefetch() -> usize {
    4
}

impl PinionConfig {
    /// Load configuration from `path`.
    pub fn load(path: &Path) -> PinionResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PinionError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| {
            PinionError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Load `~/.pinion/config.toml`, or return defaults if the file doesn't exist.
    pub fn load_default() -> PinionResult<Self> {
        let path = Self::default_path();
        if path.is_file() {
            Self::load(&path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Returns the default path to the config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the Pinion data directory (`~/.pinion/`).
pub fn dirs_path() -> PathBuf {
    home_dir().join(".pinion")
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
}

fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        home_dir()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else {
        PathBuf::from(path)
    }
}
