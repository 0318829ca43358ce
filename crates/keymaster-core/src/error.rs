//! Error types for keymaster-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using keymaster-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while checking for, downloading, staging or monitoring
#[derive(Error, Debug)]
pub enum Error {
    /// Remote fetch failed or returned a non-success status
    #[error("{message}")]
    Network { message: String },

    /// Manifest had fewer than three populated lines
    #[error("Invalid update info format: expected 3 lines, found {found}")]
    InvalidManifestFormat { found: usize },

    /// Version string was empty or blank
    #[error("Invalid version format: {version:?}")]
    InvalidVersionFormat { version: String },

    /// Local write or move failed
    #[error("File system error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The detached watcher process could not be spawned
    #[error("Failed to launch update watcher: {0}")]
    WatcherLaunch(#[source] std::io::Error),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersionFormat {
            version: version.into(),
        }
    }

    /// Create a file system error for `path`
    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Taxonomy name of this error, as written to local error logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "NetworkError",
            Self::InvalidManifestFormat { .. } => "InvalidManifestFormat",
            Self::InvalidVersionFormat { .. } => "InvalidVersionFormat",
            Self::FileSystem { .. } => "FileSystemError",
            Self::WatcherLaunch(_) => "WatcherLaunchError",
            Self::ConfigNotFound { .. } | Self::InvalidConfig { .. } | Self::YamlParse(_) => {
                "ConfigError"
            }
            Self::Io(_) => "IoError",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err.to_string())
    }
}
