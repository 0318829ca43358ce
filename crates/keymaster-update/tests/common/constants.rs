//! Shared constants for test infrastructure

pub const VERSION_1_0_0_0: &str = "1.0.0.0";
pub const VERSION_1_0_0_1: &str = "1.0.0.1";
pub const VERSION_2_0_0_0: &str = "2.0.0.0";

pub const MANIFEST_PATH: &str = "/update.txt";
pub const BINARY_PATH: &str = "/app.exe";

pub const FAKE_BINARY_CONTENT: &[u8] = b"fake binary content for testing";
pub const ORIGINAL_CONTENT: &[u8] = b"original content";

/// Build a manifest body pointing at `base` + [`BINARY_PATH`]
pub fn manifest_body(base: &str, version: &str, kind: &str) -> String {
    format!("{}{}\n{}\n{}\n", base, BINARY_PATH, version, kind)
}

/// Deterministic payload of `len` bytes
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
