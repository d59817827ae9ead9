//! Case-insensitive package identifiers.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A package identifier.
///
/// The spelling a feed or requirements file used is kept for display, while
/// equality, ordering and hashing go through the lowercase form so that
/// `Newtonsoft.Json` and `newtonsoft.json` name the same package.
#[derive(Debug, Clone)]
pub struct PackageName {
    original: String,
    key: String,
}

impl PackageName {
    pub fn new(name: impl Into<String>) -> Self {
        let original = name.into().trim().to_string();
        let key = original.to_lowercase();
        Self { original, key }
    }

    /// The name as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// The lowercase form used for comparisons and storage keys.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PartialEq for PackageName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PackageName {}

impl Hash for PackageName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Ord for PackageName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl PartialOrd for PackageName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl From<&str> for PackageName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PackageName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl Serialize for PackageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

impl<'de> Deserialize<'de> for PackageName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}
