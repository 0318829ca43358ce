//! Remote update descriptor
//!
//! The manifest is plain text with three populated lines:
//!
//! ```text
//! https://example.com/app.exe
//! 1.4.0.2
//! major
//! ```

use keymaster_core::{Error, Result, SemanticVersion};

/// Whether an update needs the user's consent before it is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Applied without asking
    Patch,
    /// Requires consent
    Major,
}

impl UpdateKind {
    /// `"major"` (any case, surrounding whitespace ignored) is Major; anything else is Patch
    pub fn from_keyword(keyword: &str) -> Self {
        if keyword.trim().to_lowercase() == "major" {
            Self::Major
        } else {
            Self::Patch
        }
    }
}

/// Parsed update manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateManifest {
    pub download_url: String,
    pub latest_version: SemanticVersion,
    pub update_kind: UpdateKind,
}

impl UpdateManifest {
    /// Parse manifest text, ignoring blank lines.
    ///
    /// The URL is taken as-is; a malformed one fails later at download time.
    pub fn parse(raw: &str) -> Result<Self> {
        let lines: Vec<&str> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.len() < 3 {
            return Err(Error::InvalidManifestFormat { found: lines.len() });
        }

        Ok(Self {
            download_url: lines[0].to_string(),
            latest_version: SemanticVersion::parse(lines[1])?,
            update_kind: UpdateKind::from_keyword(lines[2]),
        })
    }

    pub fn is_major(&self) -> bool {
        self.update_kind == UpdateKind::Major
    }
}
