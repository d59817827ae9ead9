//! Resolved package manifests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::name::PackageName;
use crate::requirement::PackageRequirement;
use crate::version::Version;

/// Target-framework expressions a package's dependencies are restricted to.
///
/// The resolver carries these through untouched; interpreting them is up to
/// the installer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameworkRestrictions(Vec<String>);

impl FrameworkRestrictions {
    pub fn new(restrictions: Vec<String>) -> Self {
        Self(restrictions)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for FrameworkRestrictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// A package bound to one concrete version plus the requirements it
/// introduces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub name: PackageName,
    pub version: Version,
    #[serde(default)]
    pub dependencies: Vec<PackageRequirement>,
    #[serde(default, skip_serializing_if = "FrameworkRestrictions::is_empty")]
    pub restrictions: FrameworkRestrictions,
    /// Feed the manifest was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ResolvedPackage {
    pub fn new(name: impl Into<PackageName>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            dependencies: Vec::new(),
            restrictions: FrameworkRestrictions::default(),
            source: None,
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<PackageRequirement>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

impl fmt::Display for ResolvedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}
