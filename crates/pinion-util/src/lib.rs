//! Shared utilities for Pinion.
//!
//! This crate provides the cross-cutting concerns used by the other Pinion
//! crates: the unified error type, the filesystem helpers the persistent
//! manifest store relies on, and Cargo-style status lines for the CLI.

pub mod errors;
pub mod fs;
pub mod progress;
