//! The search triple carried through one branch of the resolution.
//!
//! A [`SearchState`] is never mutated once handed to a branch: choosing a
//! version produces a new state, so abandoning a branch is just dropping its
//! value. Manifests are shared behind [`Arc`] so snapshots stay cheap.

use std::collections::BTreeMap;
use std::sync::Arc;

use pinion_core::{PackageName, PackageRequirement, ResolvedPackage};

use crate::conflict::{Clash, Conflict};

/// Requirements keyed by package, at most one per package.
pub type RequirementMap = BTreeMap<PackageName, PackageRequirement>;

/// `selected`, `closed` and `open` for one branch.
///
/// `closed` and `open` never share a package, and every package in
/// `closed` has exactly one entry in `selected`.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub selected: Vec<Arc<ResolvedPackage>>,
    pub closed: RequirementMap,
    pub open: RequirementMap,
}

impl SearchState {
    /// The initial state: nothing selected, every root requirement open.
    ///
    /// Root requirements naming the same package are merged; if they admit
    /// no common version the resolution is a conflict before it starts.
    pub fn from_roots(roots: impl IntoIterator<Item = PackageRequirement>) -> Result<Self, Conflict> {
        let mut open = RequirementMap::new();
        for root in roots {
            match open.get(&root.name) {
                Some(existing) => match existing.merge(&root) {
                    Some(merged) => {
                        open.insert(merged.name.clone(), merged);
                    }
                    None => {
                        let clash = Clash {
                            requirement: root,
                            conflicts_with: existing.clone(),
                            selected: None,
                        };
                        return Err(Conflict::new(open.into_values(), vec![clash]));
                    }
                },
                None => {
                    open.insert(root.name.clone(), root);
                }
            }
        }
        Ok(Self {
            open,
            ..Self::default()
        })
    }

    /// The state after resolving `current` to `manifest`.
    ///
    /// `rest` is the open set with `current` already removed. Each dependency
    /// of the manifest is merged with any requirement on the same package in
    /// `closed` or `rest`; a dependency that rules out an earlier choice, or
    /// leaves no acceptable version, is returned as a [`Clash`].
    pub fn choose(
        &self,
        current: &PackageRequirement,
        rest: RequirementMap,
        manifest: Arc<ResolvedPackage>,
    ) -> Result<SearchState, Clash> {
        let mut selected = self.selected.clone();
        let mut closed = self.closed.clone();
        let mut open = rest;

        closed.insert(current.name.clone(), current.clone());
        selected.push(Arc::clone(&manifest));

        for dependency in &manifest.dependencies {
            if let Some(existing) = closed.get(&dependency.name) {
                let chosen = selected
                    .iter()
                    .find(|p| p.name == dependency.name)
                    .map(|p| p.version.clone());
                let merged = match &chosen {
                    Some(version) if dependency.range.matches(version) => existing.merge(dependency),
                    _ => None,
                };
                match merged {
                    Some(merged) => {
                        closed.insert(merged.name.clone(), merged);
                    }
                    None => {
                        return Err(Clash {
                            requirement: dependency.clone(),
                            conflicts_with: existing.clone(),
                            selected: chosen,
                        })
                    }
                }
            } else if let Some(existing) = open.get(&dependency.name) {
                match existing.merge(dependency) {
                    Some(merged) => {
                        open.insert(merged.name.clone(), merged);
                    }
                    None => {
                        return Err(Clash {
                            requirement: dependency.clone(),
                            conflicts_with: existing.clone(),
                            selected: None,
                        })
                    }
                }
            } else {
                open.insert(dependency.name.clone(), dependency.clone());
            }
        }

        Ok(SearchState {
            selected,
            closed,
            open,
        })
    }

    /// The selected packages in selection order.
    pub fn into_packages(self) -> Vec<ResolvedPackage> {
        self.selected.into_iter().map(Arc::unwrap_or_clone).collect()
    }
}
