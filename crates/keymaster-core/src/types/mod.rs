//! Type definitions shared across Keymaster crates

mod progress;
mod runtime_config;

pub use progress::*;
pub use runtime_config::*;
