//! TOML formats for package manifests and requirements files.
//!
//! ```toml
//! restrictions = ["net8.0"]
//!
//! [dependencies]
//! log = ">= 1.0 < 2.0"
//! json = { version = "~> 2.1", strategy = "min" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use pinion_core::{
    FrameworkRestrictions, PackageName, PackageRequirement, ResolvedPackage, ResolverStrategy, Version,
    VersionRange,
};
use pinion_util::errors::{PinionError, PinionResult};
use serde::{Deserialize, Serialize};

/// One entry of a `[dependencies]` table.
///
/// Either a bare range string or a table with the range and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    Range(String),
    Detailed(DetailedDependency),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedDependency {
    #[serde(default = "any_version")]
    pub version: String,
    #[serde(default)]
    pub strategy: ResolverStrategy,
    #[serde(default)]
    pub sources: Vec<String>,
}

fn any_version() -> String {
    "*".to_string()
}

impl DependencySpec {
    pub fn range(&self) -> &str {
        match self {
            DependencySpec::Range(range) => range,
            DependencySpec::Detailed(d) => &d.version,
        }
    }

    pub fn strategy(&self) -> ResolverStrategy {
        match self {
            DependencySpec::Range(_) => ResolverStrategy::default(),
            DependencySpec::Detailed(d) => d.strategy,
        }
    }

    fn sources(&self) -> &[String] {
        match self {
            DependencySpec::Range(_) => &[],
            DependencySpec::Detailed(d) => &d.sources,
        }
    }
}

/// The manifest of one package version, as stored by [`crate::LocalFeed`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestFile {
    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencySpec>,
    #[serde(default)]
    pub restrictions: Vec<String>,
}

impl ManifestFile {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Bind this manifest to `name` at `version`.
    ///
    /// Dependencies become transitive requirements whose parent is the
    /// package itself. An unparseable range is reported as an error message.
    pub fn into_package(self, name: &PackageName, version: &Version) -> Result<ResolvedPackage, String> {
        let mut dependencies = Vec::with_capacity(self.dependencies.len());
        for (dep, spec) in &self.dependencies {
            let range = VersionRange::parse(spec.range()).map_err(|e| format!("dependency '{dep}': {e}"))?;
            dependencies.push(
                PackageRequirement::transitive(dep.as_str(), range, spec.strategy(), name.clone(), version.clone())
                    .with_sources(spec.sources().to_vec()),
            );
        }
        let mut package = ResolvedPackage::new(name.clone(), version.clone()).with_dependencies(dependencies);
        package.restrictions = FrameworkRestrictions::new(self.restrictions);
        Ok(package)
    }
}

/// A project's root requirements.
///
/// ```toml
/// sources = ["local"]
///
/// [dependencies]
/// PackageX = "== 1.0"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementsFile {
    /// Feeds every requirement may be resolved against, unless it lists its own.
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencySpec>,
}

impl RequirementsFile {
    pub fn load(path: &Path) -> PinionResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PinionError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse(&content).map_err(|message| {
            PinionError::Manifest {
                message: format!("{}: {message}", path.display()),
            }
            .into()
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// The root requirements, in name order.
    pub fn requirements(&self) -> PinionResult<Vec<PackageRequirement>> {
        self.dependencies
            .iter()
            .map(|(name, spec)| {
                let range = VersionRange::parse(spec.range()).map_err(|e| PinionError::Manifest {
                    message: format!("dependency '{name}': {e}"),
                })?;
                let sources = if spec.sources().is_empty() {
                    self.sources.clone()
                } else {
                    spec.sources().to_vec()
                };
                Ok(PackageRequirement::root(name.as_str(), range, spec.strategy()).with_sources(sources))
            })
            .collect()
    }
}
