//! Four-component dotted versions (`major.minor.build.revision`)

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An immutable `major.minor.build.revision` version
///
/// Ordering is lexicographic over the four components; the derived
/// `Ord` relies on the field declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub build: u64,
    pub revision: u64,
}

impl SemanticVersion {
    pub const fn new(major: u64, minor: u64, build: u64, revision: u64) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a dotted version string.
    ///
    /// Missing trailing components default to 0, and a segment that is not
    /// an integer degrades to 0 instead of failing. Segments past the fourth
    /// are ignored. Only empty or blank input is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_version(input));
        }

        let mut parts = [0u64; 4];
        for (slot, segment) in parts.iter_mut().zip(trimmed.split('.')) {
            *slot = segment.trim().parse().unwrap_or(0);
        }

        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }

    /// Whether `self` is strictly newer than `other`
    pub fn is_newer_than(&self, other: &SemanticVersion) -> bool {
        self > other
    }
}

impl FromStr for SemanticVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}
