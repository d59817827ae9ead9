//! The interface through which the resolver discovers packages.
//!
//! A feed answers two questions: which versions of a package exist, and what
//! one concrete version depends on. The resolver never calls a feed directly;
//! every lookup goes through its cache layer.

use std::future::Future;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::name::PackageName;
use crate::package::ResolvedPackage;
use crate::version::Version;

/// A feed failure. Either one aborts the whole resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum FeedError {
    /// No configured feed for the package could be reached.
    #[error("no feed for {package} is reachable: {message}")]
    #[diagnostic(help("Check the feed configuration and your network connection"))]
    SourceUnavailable { package: String, message: String },

    /// A listed version disappeared before its manifest was fetched.
    #[error("{package} {version} is no longer available from its feed")]
    #[diagnostic(help("The feed changed during resolution; run the resolution again"))]
    NotFound { package: String, version: String },
}

impl FeedError {
    pub fn unavailable(package: &PackageName, message: impl Into<String>) -> Self {
        FeedError::SourceUnavailable {
            package: package.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(package: &PackageName, version: &Version) -> Self {
        FeedError::NotFound {
            package: package.to_string(),
            version: version.to_string(),
        }
    }
}

/// A source of package versions and manifests.
///
/// Implementations must be idempotent: asking the same question twice during
/// one resolution must produce the same answer.
pub trait PackageFeed: Send + Sync {
    /// Every version known to exist for `name`, in no particular order.
    fn list_versions(
        &self,
        name: &PackageName,
    ) -> impl Future<Output = Result<Vec<Version>, FeedError>> + Send;

    /// The manifest of `name` at exactly `version`.
    fn fetch_manifest(
        &self,
        name: &PackageName,
        version: &Version,
    ) -> impl Future<Output = Result<ResolvedPackage, FeedError>> + Send;
}

impl<F: PackageFeed> PackageFeed for Arc<F> {
    fn list_versions(
        &self,
        name: &PackageName,
    ) -> impl Future<Output = Result<Vec<Version>, FeedError>> + Send {
        (**self).list_versions(name)
    }

    fn fetch_manifest(
        &self,
        name: &PackageName,
        version: &Version,
    ) -> impl Future<Output = Result<ResolvedPackage, FeedError>> + Send {
        (**self).fetch_manifest(name, version)
    }
}
