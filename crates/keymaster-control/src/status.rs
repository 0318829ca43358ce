//! Control-channel status tokens

use std::fmt;

/// Status published on the control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlStatus {
    Active,
    Paused,
    Stopped,
    /// Nothing observed yet, or a token with no meaning
    #[default]
    Unknown,
}

impl ControlStatus {
    /// Normalize a raw payload: trimmed and upper-cased
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    /// Map a normalized token to a status
    pub fn from_token(token: &str) -> Self {
        match token {
            "ACTIVE" => Self::Active,
            "PAUSED" => Self::Paused,
            "STOPPED" => Self::Stopped,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
            Self::Stopped => "STOPPED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
