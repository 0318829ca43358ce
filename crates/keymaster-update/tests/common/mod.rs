//! Common test infrastructure for keymaster-update tests
//!
//! # Modules
//!
//! - `constants`: Version strings, manifest payloads, binary content
//! - `bridge`: Recording UI bridge with a scripted consent answer
//! - `stager`: Recording stager standing in for the watcher script
//! - `mock_server`: Wiremock setup helpers for manifest and binary endpoints
//! - `builders`: Orchestrator harness wired to a mock server
//! - `raw_server`: Slow or length-less responses over a bare TCP socket

// Allow unused code in test infrastructure - not every test file uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod bridge;
pub mod builders;
pub mod constants;
pub mod mock_server;
pub mod raw_server;
pub mod stager;

pub use bridge::*;
pub use builders::*;
pub use constants::*;
pub use mock_server::*;
pub use raw_server::*;
pub use stager::*;
