//! Self-update functionality for Keymaster hosts
//!
//! Provides:
//! - Parsing of the three-line update manifest
//! - Streaming binary download with progress reporting
//! - Executable replacement through a detached watcher script
//! - The check → download → stage → relaunch state machine

pub mod download;
pub mod manifest;
pub mod orchestrator;
pub mod replace;

pub use download::Downloader;
pub use manifest::{UpdateKind, UpdateManifest};
pub use orchestrator::{CheckOutcome, UpdateOrchestrator, UpdateState};
pub use replace::{render_watcher_script, SelfReplaceAgent, Stager, WatcherPlan};
