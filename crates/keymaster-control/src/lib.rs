//! # keymaster-control
//!
//! Remote kill-switch and maintenance mode for Keymaster hosts.
//!
//! A [`ControlChannelMonitor`] polls a single-token status document on its
//! own timer and reacts to changes only:
//! - `ACTIVE` re-enables the UI
//! - `PAUSED` disables the UI and shows a maintenance notice once
//! - `STOPPED` shows an out-of-service notice and terminates the host
//!
//! Fetch failures are appended to a local [`ErrorLog`] and never stop the loop.

pub mod error_log;
pub mod monitor;
pub mod status;

pub use error_log::ErrorLog;
pub use monitor::ControlChannelMonitor;
pub use status::ControlStatus;
