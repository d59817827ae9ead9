use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for Pinion operations outside the resolution search.
#[derive(Debug, Error, Diagnostic)]
pub enum PinionError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed configuration file.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check your pinion config.toml for syntax errors"))]
    Config { message: String },

    /// Invalid or malformed requirements or feed manifest file.
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Entries take the form `name = \">= 1.0 < 2.0\"` or a table with a `version` key"))]
    Manifest { message: String },

    /// The requirements could not be satisfied.
    #[error("Dependency resolution failed: {message}")]
    #[diagnostic(help("Relax the conflicting version ranges or pin a compatible version"))]
    Resolution { message: String },

    /// A package feed could not provide the data needed to resolve.
    #[error("Feed error: {message}")]
    #[diagnostic(help("This is an infrastructure problem, not a version constraint problem"))]
    Feed { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type PinionResult<T> = miette::Result<T>;
