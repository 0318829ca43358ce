//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. User config (~/.keymaster/keymaster.yaml)
//! 3. Explicit config file (KEYMASTER_CONFIG or the host's --config flag)
//! 4. Environment variables (KEYMASTER_* prefix)

use crate::error::{Error, Result};
use crate::types::RuntimeConfig;
use crate::utils::get_home_dir;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

const DEFAULTS_FILE: &str = "runtime-defaults.yaml";
const USER_CONFIG_FILE: &str = "keymaster.yaml";
const CONFIG_PATH_ENV: &str = "KEYMASTER_CONFIG";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,

    /// Explicit config file layered over the user config
    explicit_file: Option<Utf8PathBuf>,
}

impl HierarchicalConfigLoader {
    /// Create a new hierarchical config loader rooted at ~/.keymaster
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self::with_dir(config_dir))
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self {
            config_dir,
            explicit_file: None,
        }
    }

    /// Layer an explicit config file over the user config
    pub fn with_file(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.explicit_file = path;
        self
    }

    /// Get the standard config directory (~/.keymaster)
    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = get_home_dir()?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|p| Error::invalid_config(format!("Non UTF-8 home directory: {:?}", p)))?;
        Ok(home.join(".keymaster"))
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        // Start with embedded defaults
        let mut config = Self::load_embedded_defaults()?;

        let user_config_path = self.config_dir.join(USER_CONFIG_FILE);
        if user_config_path.exists() {
            debug!("Loading user config from {}", user_config_path);
            config = self.load_yaml_file(&user_config_path)?;
        }

        if let Some(path) = self.explicit_config_path() {
            if !path.exists() {
                return Err(Error::config_not_found(path.as_str()));
            }
            debug!("Loading config from {}", path);
            config = self.load_yaml_file(&path)?;
        }

        self.apply_env_overrides(config)
    }

    /// The explicit file from the builder wins over KEYMASTER_CONFIG
    fn explicit_config_path(&self) -> Option<Utf8PathBuf> {
        self.explicit_file
            .clone()
            .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(Utf8PathBuf::from))
    }

    fn load_embedded_defaults() -> Result<RuntimeConfig> {
        let embedded_file = EmbeddedConfigs::get(DEFAULTS_FILE).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", DEFAULTS_FILE))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", DEFAULTS_FILE))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                DEFAULTS_FILE, e
            ))
        })
    }

    /// Load a YAML file; fields it omits take their serde defaults
    fn load_yaml_file(&self, path: &Utf8Path) -> Result<RuntimeConfig> {
        let content = fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("KEYMASTER_TIMEOUT_SECS") {
            config.network.timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("KEYMASTER_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("KEYMASTER_MANIFEST_URL") {
            config.update.manifest_url = val;
        }

        if let Ok(val) = env::var("KEYMASTER_CHECK_INTERVAL_SECS") {
            config.update.check_interval_secs = val.parse().map_err(|_| {
                Error::invalid_config("KEYMASTER_CHECK_INTERVAL_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("KEYMASTER_STATUS_URL") {
            config.control.status_url = val;
        }

        if let Ok(val) = env::var("KEYMASTER_POLL_INTERVAL_SECS") {
            config.control.poll_interval_secs = val.parse().map_err(|_| {
                Error::invalid_config("KEYMASTER_POLL_INTERVAL_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("KEYMASTER_LOG_LEVEL") {
            config.logging.level = val;
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
