//! Conflict boost tracker.
//!
//! Packages that took part in a conflict get a priority bonus so the search
//! settles them earlier on the next attempt and fails fast on the same
//! trouble spot instead of rediscovering it deep inside unrelated branches.

use std::collections::{BTreeSet, HashMap};

use pinion_core::PackageName;

/// Per-resolution mapping from package to the number of conflicts it was in.
///
/// Counts only ever grow. A tracker lives exactly as long as one call to
/// [`crate::Resolver::resolve`].
#[derive(Debug, Clone, Default)]
pub struct ConflictBoost {
    boosts: HashMap<PackageName, u32>,
}

impl ConflictBoost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one conflict involving `names`. Each distinct name gains 1.
    pub fn boost<'n>(&mut self, names: impl IntoIterator<Item = &'n PackageName>) {
        let distinct: BTreeSet<&PackageName> = names.into_iter().collect();
        for name in distinct {
            *self.boosts.entry(name.clone()).or_insert(0) += 1;
        }
    }

    pub fn current(&self, name: &PackageName) -> u32 {
        self.boosts.get(name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.boosts.is_empty()
    }
}
