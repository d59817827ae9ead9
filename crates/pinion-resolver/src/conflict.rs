//! Resolution outcomes and conflict reporting.

use std::fmt;

use pinion_core::{PackageName, PackageRequirement, ResolvedPackage, Version};

/// The outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// One version per package, in the order they were selected.
    Ok(Vec<ResolvedPackage>),
    /// No assignment satisfies the requirements.
    Conflict(Conflict),
}

impl Resolution {
    pub fn is_ok(&self) -> bool {
        matches!(self, Resolution::Ok(_))
    }

    pub fn packages(&self) -> Option<&[ResolvedPackage]> {
        match self {
            Resolution::Ok(packages) => Some(packages),
            Resolution::Conflict(_) => None,
        }
    }

    pub fn conflict(&self) -> Option<&Conflict> {
        match self {
            Resolution::Ok(_) => None,
            Resolution::Conflict(conflict) => Some(conflict),
        }
    }
}

/// Two requirements on one package that admit no common version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clash {
    /// The requirement a manifest introduced.
    pub requirement: PackageRequirement,
    /// The requirement already in force for the same package.
    pub conflicts_with: PackageRequirement,
    /// The version already chosen for the package, if any.
    pub selected: Option<Version>,
}

impl fmt::Display for Clash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (required by {}) does not intersect {} (required by {})",
            self.requirement.name,
            self.requirement.range,
            self.requirement.parent,
            self.conflicts_with.range,
            self.conflicts_with.parent
        )?;
        if let Some(version) = &self.selected {
            write!(f, ", {version} is already selected")?;
        }
        Ok(())
    }
}

/// The requirements still open when a branch ran out of candidates, plus
/// every clash that ruled a candidate out beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conflict {
    pub open: Vec<PackageRequirement>,
    pub clashes: Vec<Clash>,
}

impl Conflict {
    pub fn new(open: impl IntoIterator<Item = PackageRequirement>, clashes: Vec<Clash>) -> Self {
        let mut open: Vec<_> = open.into_iter().collect();
        open.sort_by(|a, b| a.name.cmp(&b.name));
        Self { open, clashes }
    }

    /// Names of the packages in the open set, used to boost them.
    pub fn package_names(&self) -> impl Iterator<Item = &PackageName> {
        self.open.iter().map(|r| &r.name)
    }

    /// Whether `name` is open or involved in a clash.
    pub fn mentions(&self, name: &PackageName) -> bool {
        self.open.iter().any(|r| &r.name == name)
            || self.clashes.iter().any(|c| &c.requirement.name == name)
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Unable to satisfy {} requirement(s):", self.open.len())?;
        for req in &self.open {
            writeln!(f, "  {req} (required by {})", req.parent)?;
        }
        if !self.clashes.is_empty() {
            writeln!(f, "Incompatible requirements:")?;
            for clash in &self.clashes {
                writeln!(f, "  {clash}")?;
            }
        }
        Ok(())
    }
}
