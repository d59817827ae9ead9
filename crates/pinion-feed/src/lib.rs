//! Package feeds and the files they read.
//!
//! [`LocalFeed`] serves packages from a directory tree, one TOML manifest per
//! version. The same dependency table syntax is used by requirements files,
//! which declare the root requirements of a project.

pub mod local;
pub mod manifest;

pub use local::LocalFeed;
pub use manifest::{DependencySpec, ManifestFile, RequirementsFile};
