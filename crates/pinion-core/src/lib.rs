//! Core data types for the Pinion dependency resolver.
//!
//! This crate defines the values the resolution search operates on: package
//! names, versions and version ranges, requirements and where they came from,
//! resolved package manifests, the [`feed::PackageFeed`] interface through
//! which versions and manifests are discovered, and configuration.
//!
//! This crate is intentionally free of network I/O.

pub mod config;
pub mod feed;
pub mod name;
pub mod package;
pub mod requirement;
pub mod version;

pub use feed::{FeedError, PackageFeed};
pub use name::PackageName;
pub use package::{FrameworkRestrictions, ResolvedPackage};
pub use requirement::{PackageRequirement, RequirementSource, ResolverStrategy};
pub use version::{Version, VersionParseError, VersionRange};
