//! # keymaster-core
//!
//! Core library shared by the Keymaster update and control crates:
//! - Error taxonomy and `Result` alias
//! - Four-component version parsing and ordering
//! - Runtime configuration with hierarchical loading
//! - UI bridge, control hierarchy traversal and the UI marshaling pump
//! - Remote text sources over an injected HTTP client
//! - Stoppable periodic tasks

pub mod bridge;
pub mod config;
pub mod error;
pub mod schedule;
pub mod source;
pub mod types;
pub mod ui;
pub mod utils;
pub mod version;

pub use bridge::{set_tree_enabled, ControlNode, Notice, NoticeSeverity, UiBridge, Widget};
pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use schedule::{spawn_periodic, PeriodicTask};
pub use source::{HttpSource, TextSource};
pub use types::{DownloadProgress, RuntimeConfig};
pub use ui::{ui_channel, PumpExit, UiDispatcher, UiPump};
pub use utils::get_home_dir;
pub use version::SemanticVersion;
