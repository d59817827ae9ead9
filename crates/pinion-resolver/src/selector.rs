//! Picks the next open requirement to resolve.
//!
//! The order is total. Keys, most significant first:
//!
//! 1. pinned ranges before open ones
//! 2. root requirements before transitive ones
//! 3. strategy, `max` before `min`
//! 4. higher conflict boost first
//! 5. narrower range first
//! 6. package name ascending

use std::cmp::Ordering;

use pinion_core::PackageRequirement;

use crate::boost::ConflictBoost;
use crate::state::RequirementMap;

/// Compare two open requirements; `Less` means `a` is resolved first.
pub fn compare(a: &PackageRequirement, b: &PackageRequirement, boost: &ConflictBoost) -> Ordering {
    b.is_pinned()
        .cmp(&a.is_pinned())
        .then_with(|| b.is_root().cmp(&a.is_root()))
        .then_with(|| a.strategy.cmp(&b.strategy))
        .then_with(|| boost.current(&b.name).cmp(&boost.current(&a.name)))
        .then_with(|| a.range.cmp_width(&b.range))
        .then_with(|| a.name.cmp(&b.name))
}

/// Split `open` into the requirement to resolve next and the rest.
///
/// Returns `None` when nothing is open.
pub fn pick(open: &RequirementMap, boost: &ConflictBoost) -> Option<(PackageRequirement, RequirementMap)> {
    let current = open.values().min_by(|a, b| compare(a, b, boost))?.clone();
    let mut rest = open.clone();
    rest.remove(&current.name);
    Some((current, rest))
}
