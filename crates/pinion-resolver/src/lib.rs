//! Dependency resolution engine: a depth-first backtracking search over
//! lazily discovered versions and manifests, ordered by a conflict-aware
//! heuristic and backed by a single-flight cache with a persistent
//! manifest store.

pub mod boost;
pub mod cache;
pub mod conflict;
pub mod resolver;
pub mod selector;
pub mod state;
pub mod store;

pub use boost::ConflictBoost;
pub use cache::{CacheStats, FeedCache};
pub use conflict::{Clash, Conflict, Resolution};
pub use resolver::{ResolutionStats, ResolveError, Resolver};
pub use store::{ManifestStore, StoreStats};
