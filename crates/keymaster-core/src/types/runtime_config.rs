//! Runtime configuration types for operational parameters
//!
//! These types define configuration that controls runtime behavior like
//! network timeouts, remote endpoints, poll intervals and logging.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Update checking and self-replacement
    #[serde(default)]
    pub update: UpdateConfig,

    /// Control channel polling
    #[serde(default)]
    pub control: ControlConfig,

    /// Log level and optional log file
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Connect/read timeout for every request, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Download chunk size in bytes
    #[serde(default = "default_chunk_size")]
    pub download_chunk_size: usize,
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            download_chunk_size: default_chunk_size(),
        }
    }
}

fn default_timeout() -> u64 {
    45
}
fn default_chunk_size() -> usize {
    8 * 1024
}
fn default_user_agent() -> String {
    format!(
        "keymaster/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Update check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UpdateConfig {
    /// URL of the three-line update manifest
    #[serde(default = "default_manifest_url")]
    pub manifest_url: String,

    /// Interval between periodic update checks, in seconds
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Delay between launching the watcher and terminating, in milliseconds
    #[serde(default = "default_relaunch_grace")]
    pub relaunch_grace_ms: u64,

    /// Where downloads and the watcher script are written (system temp dir when unset)
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
}

impl UpdateConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn relaunch_grace(&self) -> Duration {
        Duration::from_millis(self.relaunch_grace_ms)
    }

    /// Resolved staging directory
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            manifest_url: default_manifest_url(),
            check_interval_secs: default_check_interval(),
            relaunch_grace_ms: default_relaunch_grace(),
            staging_dir: None,
        }
    }
}

fn default_manifest_url() -> String {
    "https://keymaster-agni.vercel.app/update.txt".to_string()
}
fn default_check_interval() -> u64 {
    3600 // 1 hour
}
fn default_relaunch_grace() -> u64 {
    500
}

/// Control channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ControlConfig {
    /// URL of the single-token status file
    #[serde(default = "default_status_url")]
    pub status_url: String,

    /// Interval between polls, in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Local file receiving timestamped fetch errors
    #[serde(default = "default_error_log")]
    pub error_log: PathBuf,
}

impl ControlConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            status_url: default_status_url(),
            poll_interval_secs: default_poll_interval(),
            error_log: default_error_log(),
        }
    }
}

fn default_status_url() -> String {
    "https://keymaster-agni.vercel.app/control.txt".to_string()
}
fn default_poll_interval() -> u64 {
    2
}
fn default_error_log() -> PathBuf {
    PathBuf::from("control_errors.log")
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Default tracing filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional file that receives a copy of all log lines
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
