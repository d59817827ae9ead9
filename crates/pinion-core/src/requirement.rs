//! Requirements: a package name bound to an acceptable version range.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::name::PackageName;
use crate::version::{Version, VersionRange};

/// Which end of the matching versions to try first.
///
/// The strategy only orders candidates; it never changes which versions
/// satisfy a requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverStrategy {
    /// Newest matching version first.
    #[default]
    Max,
    /// Oldest matching version first.
    Min,
}

impl fmt::Display for ResolverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverStrategy::Max => f.write_str("max"),
            ResolverStrategy::Min => f.write_str("min"),
        }
    }
}

/// Where a requirement came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RequirementSource {
    /// Declared directly by the project.
    Root,
    /// Introduced by the manifest of a resolved package.
    Package { name: PackageName, version: Version },
}

impl RequirementSource {
    pub fn is_root(&self) -> bool {
        matches!(self, RequirementSource::Root)
    }
}

impl fmt::Display for RequirementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementSource::Root => f.write_str("the root requirements"),
            RequirementSource::Package { name, version } => write!(f, "{name} {version}"),
        }
    }
}

/// A constraint on one package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageRequirement {
    pub name: PackageName,
    pub range: VersionRange,
    #[serde(default)]
    pub strategy: ResolverStrategy,
    pub parent: RequirementSource,
    /// Feed identifiers this requirement may be resolved against, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl PackageRequirement {
    /// A requirement declared directly by the project.
    pub fn root(name: impl Into<PackageName>, range: VersionRange, strategy: ResolverStrategy) -> Self {
        Self {
            name: name.into(),
            range,
            strategy,
            parent: RequirementSource::Root,
            sources: Vec::new(),
        }
    }

    /// A requirement introduced by the manifest of `parent` at `parent_version`.
    pub fn transitive(
        name: impl Into<PackageName>,
        range: VersionRange,
        strategy: ResolverStrategy,
        parent: PackageName,
        parent_version: Version,
    ) -> Self {
        Self {
            name: name.into(),
            range,
            strategy,
            parent: RequirementSource::Package {
                name: parent,
                version: parent_version,
            },
            sources: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_root()
    }

    pub fn is_pinned(&self) -> bool {
        self.range.is_pinned()
    }

    /// Combine two requirements on the same package into one.
    ///
    /// The result admits only versions both admit and keeps this
    /// requirement's origin and strategy; `other`'s sources are appended
    /// after this requirement's. Returns `None` when the ranges are disjoint.
    pub fn merge(&self, other: &PackageRequirement) -> Option<PackageRequirement> {
        let range = self.range.intersect(&other.range)?;
        let mut sources = self.sources.clone();
        for source in &other.sources {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }
        Some(PackageRequirement {
            name: self.name.clone(),
            range,
            strategy: self.strategy,
            parent: self.parent.clone(),
            sources,
        })
    }
}

impl fmt::Display for PackageRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.range)
    }
}
