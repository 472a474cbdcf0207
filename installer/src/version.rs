//! Go release version identifiers.
//!
//! A [`Version`] is parsed from text such as `go1.21.5`, `go1.22rc1`, or
//! `go1.21beta1` and keeps that text verbatim for display. Versions are
//! totally ordered by `(major, minor, patch, qualifier)`, where a stable
//! release outranks every beta and release candidate of the same triple.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Literal prefix carried by Go release names.
pub const VERSION_PREFIX: &str = "go";

const RC_MARKER: &str = "rc";
const BETA_MARKER: &str = "beta";

/// Errors raised while parsing version text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text does not follow the `go<major>.<minor>[.<patch>]` grammar.
    #[error("malformed version \"{text}\": {reason}")]
    MalformedVersion {
        /// The rejected input, exactly as given.
        text: String,
        /// Which rule the input broke.
        reason: String,
    },
}

/// Pre-release qualifier of a version.
///
/// Variants are declared in ascending precedence, so the derived ordering
/// ranks betas below release candidates and both below a stable release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qualifier {
    /// `betaN`.
    Beta(u32),
    /// `rcN`.
    ReleaseCandidate(u32),
    /// No qualifier: a finished release.
    Stable,
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beta(n) => write!(f, "{BETA_MARKER}{n}"),
            Self::ReleaseCandidate(n) => write!(f, "{RC_MARKER}{n}"),
            Self::Stable => Ok(()),
        }
    }
}

/// A parsed Go release version.
///
/// Equality, hashing, and ordering use the numeric fields and qualifier only,
/// so `go1.12` and `go1.12.0` are equal even though each displays its own
/// original text.
///
/// # Examples
///
/// ```
/// use goenv::version::Version;
///
/// let stable = Version::parse("go1.21.0")?;
/// let candidate = Version::parse("go1.21rc2")?;
/// assert!(candidate < stable);
/// assert_eq!(candidate.to_string(), "go1.21rc2");
/// # Ok::<(), goenv::version::ParseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
    qualifier: Qualifier,
    original: String,
}

/// One dotted segment: its number and an optional qualifier suffix.
struct Segment {
    number: u32,
    qualifier: Option<Qualifier>,
}

impl Version {
    /// Parse version text, keeping the input as the display form.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedVersion`] when the text is empty, has
    /// fewer than two or more than three segments, mixes `rc` and `beta`,
    /// carries a marker without digits on both sides, or places a qualifier
    /// anywhere but the final segment.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let malformed = |reason: &str| ParseError::MalformedVersion {
            text: text.to_owned(),
            reason: reason.to_owned(),
        };

        let body = text.strip_prefix(VERSION_PREFIX).unwrap_or(text);
        if body.is_empty() {
            return Err(malformed("no version numbers"));
        }
        if body.contains(RC_MARKER) && body.contains(BETA_MARKER) {
            return Err(malformed("both rc and beta markers present"));
        }

        let parts: Vec<&str> = body.split('.').collect();
        let (major_text, minor_text, patch_text) = match parts.as_slice() {
            [major, minor] => (*major, *minor, None),
            [major, minor, patch] => (*major, *minor, Some(*patch)),
            [_] => return Err(malformed("expected at least major and minor")),
            _ => return Err(malformed("expected at most three segments")),
        };

        let major = parse_segment(major_text).map_err(|reason| malformed(reason.as_str()))?;
        let minor = parse_segment(minor_text).map_err(|reason| malformed(reason.as_str()))?;
        let patch = patch_text
            .map(parse_segment)
            .transpose()
            .map_err(|reason| malformed(reason.as_str()))?;

        if major.qualifier.is_some() {
            return Err(malformed("qualifier on the major segment"));
        }
        let qualifier = match (minor.qualifier, &patch) {
            (Some(_), Some(_)) => return Err(malformed("qualifier before the final segment")),
            (Some(qualifier), None) => Some(qualifier),
            (None, Some(last)) => last.qualifier,
            (None, None) => None,
        };

        Ok(Self {
            major: major.number,
            minor: minor.number,
            patch: patch.map_or(0, |segment| segment.number),
            qualifier: qualifier.unwrap_or(Qualifier::Stable),
            original: text.to_owned(),
        })
    }

    /// Compare two versions by release precedence.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.precedence().cmp(&other.precedence())
    }

    /// Major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Patch component; zero when the text had no third segment.
    #[must_use]
    pub const fn patch(&self) -> u32 {
        self.patch
    }

    /// Pre-release qualifier.
    #[must_use]
    pub const fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    /// Whether this is a finished release rather than a beta or candidate.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        matches!(self.qualifier, Qualifier::Stable)
    }

    /// The original text this version was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }

    const fn precedence(&self) -> (u32, u32, u32, Qualifier) {
        (self.major, self.minor, self.patch, self.qualifier)
    }
}

/// Parse `N`, `NrcM`, or `NbetaM`.
fn parse_segment(segment: &str) -> Result<Segment, String> {
    let split = if let Some((number, sequence)) = segment.split_once(RC_MARKER) {
        Some((number, sequence, RC_MARKER))
    } else {
        segment
            .split_once(BETA_MARKER)
            .map(|(number, sequence)| (number, sequence, BETA_MARKER))
    };

    let Some((number_text, sequence_text, marker)) = split else {
        return Ok(Segment {
            number: parse_number(segment)?,
            qualifier: None,
        });
    };

    let number = parse_number(number_text)?;
    let sequence = parse_number(sequence_text)
        .map_err(|_| format!("\"{marker}\" must be followed by digits in \"{segment}\""))?;
    let qualifier = if marker == RC_MARKER {
        Qualifier::ReleaseCandidate(sequence)
    } else {
        Qualifier::Beta(sequence)
    };
    Ok(Segment {
        number,
        qualifier: Some(qualifier),
    })
}

fn parse_number(digits: &str) -> Result<u32, String> {
    if digits.is_empty() {
        return Err("empty numeric segment".to_owned());
    }
    if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(format!("\"{digits}\" is not a decimal number"));
    }
    digits
        .parse::<u32>()
        .map_err(|err| format!("\"{digits}\": {err}"))
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.precedence() == other.precedence()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.precedence().hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
