//! Package version parsing, comparison, and range matching.
//!
//! Versions are dotted numeric release segments with an optional prerelease
//! label:
//! - Missing release segments count as zero, so `1.0` and `1.0.0` are equal
//! - A prerelease sorts before the release it precedes (`2.0-beta < 2.0`)
//! - Prerelease identifiers compare numerically when both are numbers,
//!   otherwise case-insensitively, and numbers sort before words
//! - Build metadata after `+` is ignored

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error raised when a version or range expression cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    #[error("invalid version range '{0}': {1}")]
    InvalidRange(String, String),
}

/// A parsed package version.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    release: Vec<u64>,
    pre: Vec<Identifier>,
}

#[derive(Debug, Clone)]
enum Identifier {
    Numeric(u64),
    Text(String),
}

impl Version {
    pub fn parse(version: &str) -> Result<Self, VersionParseError> {
        let trimmed = version.trim();
        let invalid = || VersionParseError::InvalidVersion(version.to_string());

        let without_build = trimmed.split('+').next().unwrap_or_default();
        let (release_part, pre_part) = match without_build.split_once('-') {
            Some((release, pre)) => (release, Some(pre)),
            None => (without_build, None),
        };

        if release_part.is_empty() {
            return Err(invalid());
        }
        let release = release_part
            .split('.')
            .map(|seg| seg.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match pre_part {
            Some(pre) if pre.is_empty() => return Err(invalid()),
            Some(pre) => pre
                .split(['.', '-'])
                .filter(|id| !id.is_empty())
                .map(classify)
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            original: trimmed.to_string(),
            release,
            pre,
        })
    }

    /// Build a release version from numeric segments.
    pub fn from_release(segments: &[u64]) -> Self {
        let original = segments
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".");
        Self {
            original,
            release: segments.to_vec(),
            pre: Vec::new(),
        }
    }

    /// Numeric release segments as written.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Canonical text for this version, stable across equal spellings.
    ///
    /// Trailing zero segments are dropped and the release is padded back to
    /// three segments, so `1`, `1.0` and `1.0.0.0` all normalize to `1.0.0`.
    pub fn normalized(&self) -> String {
        let mut release: Vec<u64> = self.significant_release().to_vec();
        while release.len() < 3 {
            release.push(0);
        }
        let mut out = release
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".");
        if !self.pre.is_empty() {
            out.push('-');
            out.push_str(
                &self
                    .pre
                    .iter()
                    .map(|id| match id {
                        Identifier::Numeric(n) => n.to_string(),
                        Identifier::Text(t) => t.to_lowercase(),
                    })
                    .collect::<Vec<_>>()
                    .join("."),
            );
        }
        out
    }

    fn significant_release(&self) -> &[u64] {
        let len = self
            .release
            .iter()
            .rposition(|&s| s != 0)
            .map_or(0, |i| i + 1);
        &self.release[..len]
    }

    fn segment(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }
}

fn classify(token: &str) -> Identifier {
    match token.parse::<u64>() {
        Ok(n) => Identifier::Numeric(n),
        Err(_) => Identifier::Text(token.to_string()),
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            let ord = self.segment(i).cmp(&other.segment(i));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        compare_prerelease(&self.pre, &other.pre)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_prerelease(a: &[Identifier], b: &[Identifier]) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    for (x, y) in a.iter().zip(b) {
        let ord = match (x, y) {
            (Identifier::Numeric(x), Identifier::Numeric(y)) => x.cmp(y),
            (Identifier::Numeric(_), Identifier::Text(_)) => Ordering::Less,
            (Identifier::Text(_), Identifier::Numeric(_)) => Ordering::Greater,
            (Identifier::Text(x), Identifier::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A contiguous range of acceptable versions.
///
/// Parses two notations:
/// - operators: `>= 1.0 < 2.0`, `> 1.0`, `<= 5.0`, `== 1.0`, `~> 1.2`,
///   a bare `1.0` (meaning `>= 1.0`), and `*` for any version
/// - brackets: `[1.0,2.0)`, `[1.0,]`, `(,2.0)`, `[1.0]` (exact)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl Bound {
    fn inclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: true,
        }
    }

    fn exclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: false,
        }
    }
}

impl VersionRange {
    /// The range accepting every version.
    pub fn any() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// The range accepting exactly `version`.
    pub fn exactly(version: Version) -> Self {
        Self {
            lower: Some(Bound::inclusive(version.clone())),
            upper: Some(Bound::inclusive(version)),
        }
    }

    /// The range accepting `version` and everything above it.
    pub fn at_least(version: Version) -> Self {
        Self {
            lower: Some(Bound::inclusive(version)),
            upper: None,
        }
    }

    /// The half-open range `[lower, upper)`.
    pub fn between(lower: Version, upper: Version) -> Self {
        Self {
            lower: Some(Bound::inclusive(lower)),
            upper: Some(Bound::exclusive(upper)),
        }
    }

    /// Parse a version range expression in either notation.
    pub fn parse(spec: &str) -> Result<Self, VersionParseError> {
        let s = spec.trim();
        if s.is_empty() || s == "*" {
            return Ok(Self::any());
        }
        if s.starts_with('[') || s.starts_with('(') {
            return parse_brackets(s);
        }
        parse_operators(s)
    }

    /// Check if a version satisfies this range.
    pub fn matches(&self, version: &Version) -> bool {
        if let Some(ref lower) = self.lower {
            let cmp = version.cmp(&lower.version);
            if lower.inclusive {
                if cmp == Ordering::Less {
                    return false;
                }
            } else if cmp != Ordering::Greater {
                return false;
            }
        }
        if let Some(ref upper) = self.upper {
            let cmp = version.cmp(&upper.version);
            if upper.inclusive {
                if cmp == Ordering::Greater {
                    return false;
                }
            } else if cmp != Ordering::Less {
                return false;
            }
        }
        true
    }

    /// Whether the range admits exactly one version.
    pub fn is_pinned(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) => {
                lower.inclusive && upper.inclusive && lower.version == upper.version
            }
            _ => false,
        }
    }

    /// The single version a pinned range admits.
    pub fn pinned_version(&self) -> Option<&Version> {
        if self.is_pinned() {
            self.lower.as_ref().map(|b| &b.version)
        } else {
            None
        }
    }

    /// The versions accepted by both ranges, or `None` when no version is.
    ///
    /// The result is never wider than either input.
    pub fn intersect(&self, other: &VersionRange) -> Option<VersionRange> {
        let lower = tighter_lower(self.lower.as_ref(), other.lower.as_ref());
        let upper = tighter_upper(self.upper.as_ref(), other.upper.as_ref());

        if let (Some(lo), Some(hi)) = (&lower, &upper) {
            match lo.version.cmp(&hi.version) {
                Ordering::Greater => return None,
                Ordering::Equal if !(lo.inclusive && hi.inclusive) => return None,
                _ => {}
            }
        }
        Some(VersionRange { lower, upper })
    }

    /// Order ranges from narrowest to widest.
    ///
    /// Pinned ranges come first, then ranges bounded on both sides (by the
    /// segment-wise distance between their bounds), then ranges bounded on
    /// one side, then the unbounded range.
    pub fn cmp_width(&self, other: &VersionRange) -> Ordering {
        let rank = self.width_rank().cmp(&other.width_rank());
        if rank != Ordering::Equal {
            return rank;
        }
        match (self.span(), other.span()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => Ordering::Equal,
        }
    }

    fn width_rank(&self) -> u8 {
        if self.is_pinned() {
            return 0;
        }
        match (&self.lower, &self.upper) {
            (Some(_), Some(_)) => 1,
            (Some(_), None) | (None, Some(_)) => 2,
            (None, None) => 3,
        }
    }

    fn span(&self) -> Option<Vec<i128>> {
        let lower = &self.lower.as_ref()?.version;
        let upper = &self.upper.as_ref()?.version;
        let len = lower.release.len().max(upper.release.len());
        Some(
            (0..len)
                .map(|i| i128::from(upper.segment(i)) - i128::from(lower.segment(i)))
                .collect(),
        )
    }
}

fn tighter_lower(a: Option<&Bound>, b: Option<&Bound>) -> Option<Bound> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
        (Some(x), Some(y)) => match x.version.cmp(&y.version) {
            Ordering::Greater => Some(x.clone()),
            Ordering::Less => Some(y.clone()),
            Ordering::Equal => Some(Bound {
                version: x.version.clone(),
                inclusive: x.inclusive && y.inclusive,
            }),
        },
    }
}

fn tighter_upper(a: Option<&Bound>, b: Option<&Bound>) -> Option<Bound> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
        (Some(x), Some(y)) => match x.version.cmp(&y.version) {
            Ordering::Less => Some(x.clone()),
            Ordering::Greater => Some(y.clone()),
            Ordering::Equal => Some(Bound {
                version: x.version.clone(),
                inclusive: x.inclusive && y.inclusive,
            }),
        },
    }
}

fn parse_brackets(s: &str) -> Result<VersionRange, VersionParseError> {
    let invalid = |reason: &str| VersionParseError::InvalidRange(s.to_string(), reason.to_string());
    if s.len() < 2 || !(s.ends_with(']') || s.ends_with(')')) {
        return Err(invalid("missing closing bracket"));
    }

    let open_inclusive = s.starts_with('[');
    let close_inclusive = s.ends_with(']');
    let inner = &s[1..s.len() - 1];

    if let Some((lower, upper)) = inner.split_once(',') {
        let lower = lower.trim();
        let upper = upper.trim();
        let range = VersionRange {
            lower: if lower.is_empty() {
                None
            } else {
                Some(Bound {
                    version: Version::parse(lower)?,
                    inclusive: open_inclusive,
                })
            },
            upper: if upper.is_empty() {
                None
            } else {
                Some(Bound {
                    version: Version::parse(upper)?,
                    inclusive: close_inclusive,
                })
            },
        };
        // Reject ranges such as `[2.0,1.0]` that admit nothing.
        range
            .intersect(&VersionRange::any())
            .ok_or_else(|| invalid("range is empty"))
    } else {
        if !(open_inclusive && close_inclusive) {
            return Err(invalid("an exact version must use square brackets"));
        }
        Ok(VersionRange::exactly(Version::parse(inner)?))
    }
}

fn parse_operators(s: &str) -> Result<VersionRange, VersionParseError> {
    let invalid = |reason: String| VersionParseError::InvalidRange(s.to_string(), reason);
    let mut range = VersionRange::any();
    let mut rest = s;
    let mut clauses = 0;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let (op, after_op) = split_operator(rest);
        let after_op = after_op.trim_start();
        let end = after_op
            .find(|c: char| c.is_whitespace() || c == ',' || c == '<' || c == '>' || c == '=')
            .unwrap_or(after_op.len());
        let token = &after_op[..end];
        if token.is_empty() {
            return Err(invalid(format!("operator '{op}' is missing a version")));
        }
        let version = Version::parse(token)?;
        rest = &after_op[end..];

        let clause = match op {
            ">=" => VersionRange::at_least(version),
            ">" => VersionRange {
                lower: Some(Bound::exclusive(version)),
                upper: None,
            },
            "<=" => VersionRange {
                lower: None,
                upper: Some(Bound::inclusive(version)),
            },
            "<" => VersionRange {
                lower: None,
                upper: Some(Bound::exclusive(version)),
            },
            "==" | "=" => VersionRange::exactly(version),
            "~>" => twiddle_wakka(version).ok_or_else(|| invalid("'~>' upper bound overflows".to_string()))?,
            "" if clauses == 0 => VersionRange::at_least(version),
            _ => return Err(invalid(format!("unexpected '{token}' without an operator"))),
        };
        clauses += 1;

        range = range
            .intersect(&clause)
            .ok_or_else(|| invalid("range is empty".to_string()))?;
    }

    Ok(range)
}

fn split_operator(s: &str) -> (&str, &str) {
    for op in [">=", "<=", "==", "~>", ">", "<", "="] {
        if let Some(rest) = s.strip_prefix(op) {
            return (op, rest);
        }
    }
    ("", s)
}

/// `~> 1.2` admits `[1.2, 2.0)`; `~> 1.2.3` admits `[1.2.3, 1.3)`.
///
/// Returns `None` when the bumped segment does not fit in a `u64`.
fn twiddle_wakka(version: Version) -> Option<VersionRange> {
    let release = version.release();
    let mut upper: Vec<u64> = if release.len() <= 1 {
        release.to_vec()
    } else {
        release[..release.len() - 1].to_vec()
    };
    if let Some(last) = upper.last_mut() {
        *last = last.checked_add(1)?;
    }
    let upper = Version::from_release(&upper);
    Some(VersionRange::between(version, upper))
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(version) = self.pinned_version() {
            return write!(f, "== {version}");
        }
        match (&self.lower, &self.upper) {
            (None, None) => f.write_str("*"),
            (lower, upper) => {
                let mut parts = Vec::new();
                if let Some(lower) = lower {
                    let op = if lower.inclusive { ">=" } else { ">" };
                    parts.push(format!("{op} {}", lower.version));
                }
                if let Some(upper) = upper {
                    let op = if upper.inclusive { "<=" } else { "<" };
                    parts.push(format!("{op} {}", upper.version));
                }
                f.write_str(&parts.join(" "))
            }
        }
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        VersionRange::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn r(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    #[test]
    fn basic_ordering() {
        assert!(v("1.0") < v("2.0"));
        assert!(v("1.0.0") < v("1.0.1"));
        assert!(v("1.0.1") < v("1.1.0"));
        assert!(v("1.9") < v("1.10"));
    }

    #[test]
    fn trailing_zeros_equal() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("1"), v("1.0.0.0"));
    }

    #[test]
    fn prerelease_before_release() {
        assert!(v("2.0-beta") < v("2.0"));
        assert!(v("2.0-alpha") < v("2.0-beta"));
        assert!(v("2.0-beta.2") < v("2.0-beta.10"));
        assert!(v("2.0-beta") < v("2.0-beta.1"));
        assert!(v("1.9") < v("2.0-alpha"));
    }

    #[test]
    fn build_metadata_ignored() {
        assert_eq!(v("1.2.3+abc"), v("1.2.3"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("one.two").is_err());
        assert!(Version::parse("1.0-").is_err());
    }

    #[test]
    fn normalized_is_stable_across_spellings() {
        assert_eq!(v("1").normalized(), "1.0.0");
        assert_eq!(v("1.0.0.0").normalized(), "1.0.0");
        assert_eq!(v("1.2.3.4").normalized(), "1.2.3.4");
        assert_eq!(v("2.0-Beta.1").normalized(), "2.0.0-beta.1");
    }

    #[test]
    fn display_keeps_original() {
        assert_eq!(v("1.8.0").to_string(), "1.8.0");
    }

    #[test]
    fn operator_range() {
        let range = r(">= 1.0 < 2.0");
        assert!(range.matches(&v("1.0")));
        assert!(range.matches(&v("1.9.9")));
        assert!(!range.matches(&v("2.0")));
        assert!(!range.matches(&v("0.9")));
    }

    #[test]
    fn operator_range_without_spaces() {
        assert_eq!(r(">=1.0<2.0"), r(">= 1.0 < 2.0"));
        assert_eq!(r(">=1.0, <2.0"), r(">= 1.0 < 2.0"));
    }

    #[test]
    fn bare_version_is_minimum() {
        let range = r("1.5");
        assert!(range.matches(&v("1.5")));
        assert!(range.matches(&v("3.0")));
        assert!(!range.matches(&v("1.4")));
    }

    #[test]
    fn pinned_forms() {
        assert!(r("== 1.0").is_pinned());
        assert!(r("= 1.0").is_pinned());
        assert!(r("[1.0]").is_pinned());
        assert!(!r(">= 1.0").is_pinned());
        assert_eq!(r("== 1.0").pinned_version(), Some(&v("1.0")));
    }

    #[test]
    fn twiddle_wakka_bounds() {
        let minor = r("~> 1.2");
        assert!(minor.matches(&v("1.9")));
        assert!(!minor.matches(&v("2.0")));

        let patch = r("~> 1.2.3");
        assert!(patch.matches(&v("1.2.9")));
        assert!(!patch.matches(&v("1.3")));
        assert!(!patch.matches(&v("1.2.2")));
    }

    #[test]
    fn twiddle_wakka_rejects_overflowing_segment() {
        let err = VersionRange::parse("~> 18446744073709551615").unwrap_err();
        assert!(matches!(err, VersionParseError::InvalidRange(..)));
        assert!(VersionRange::parse("~> 1.18446744073709551615").is_ok());
        assert!(VersionRange::parse("~> 18446744073709551615.3").is_err());
    }

    #[test]
    fn bracket_ranges() {
        let range = r("[1.0,2.0)");
        assert!(range.matches(&v("1.0")));
        assert!(!range.matches(&v("2.0")));

        let open_lower = r("(,2.0]");
        assert!(open_lower.matches(&v("0.1")));
        assert!(open_lower.matches(&v("2.0")));

        let exclusive_lower = r("(1.0,]");
        assert!(!exclusive_lower.matches(&v("1.0")));
        assert!(exclusive_lower.matches(&v("1.0.1")));
    }

    #[test]
    fn any_range() {
        assert!(r("*").matches(&v("0.0.1")));
        assert!(r("").matches(&v("99")));
    }

    #[test]
    fn invalid_ranges() {
        assert!(VersionRange::parse(">= 2.0 < 1.0").is_err());
        assert!(VersionRange::parse("[2.0,1.0]").is_err());
        assert!(VersionRange::parse("[1.0").is_err());
        assert!(VersionRange::parse(">=").is_err());
        assert!(VersionRange::parse("1.0 2.0").is_err());
        assert!(VersionRange::parse("(1.0)").is_err());
    }

    #[test]
    fn intersect_narrows() {
        let merged = r(">= 1.0 < 3.0").intersect(&r(">= 2.0")).unwrap();
        assert_eq!(merged, r(">= 2.0 < 3.0"));
    }

    #[test]
    fn intersect_with_self_is_identity() {
        let range = r("> 1.0 <= 4.0");
        assert_eq!(range.intersect(&range), Some(range.clone()));
    }

    #[test]
    fn intersect_disjoint_is_empty() {
        assert!(r("== 1.0").intersect(&r("== 2.0")).is_none());
        assert!(r("< 1.0").intersect(&r(">= 1.0")).is_none());
        assert!(r("<= 1.0").intersect(&r(">= 1.0")).is_some());
    }

    #[test]
    fn intersect_touching_exclusive_bounds_is_empty() {
        assert!(r("< 2.0").intersect(&r("> 2.0")).is_none());
        assert!(r("<= 2.0").intersect(&r("> 2.0")).is_none());
    }

    #[test]
    fn width_ordering() {
        assert_eq!(r("== 1.0").cmp_width(&r(">= 1.0 <= 5.0")), Ordering::Less);
        assert_eq!(r(">= 1.0 < 2.0").cmp_width(&r(">= 1.0 <= 5.0")), Ordering::Less);
        assert_eq!(r(">= 1.2 < 1.3").cmp_width(&r(">= 1.0 < 2.0")), Ordering::Less);
        assert_eq!(r(">= 1.0 < 2.0").cmp_width(&r(">= 1.0")), Ordering::Less);
        assert_eq!(r(">= 1.0").cmp_width(&r("*")), Ordering::Less);
        assert_eq!(r(">= 1.0").cmp_width(&r("< 9.0")), Ordering::Equal);
    }

    #[test]
    fn display_round_trips() {
        for spec in ["== 1.0", ">= 1.0 < 2.0", "> 1.0 <= 2.0", "*", "< 3.0"] {
            assert_eq!(r(spec).to_string(), spec);
            assert_eq!(r(&r(spec).to_string()), r(spec));
        }
    }
}
