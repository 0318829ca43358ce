//! Mock server helpers for manifest and binary endpoints

use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

/// Serve `body` as the update manifest
pub async fn mock_manifest(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(MANIFEST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serve a manifest pointing at this server's binary endpoint
pub async fn mock_manifest_for(server: &MockServer, version: &str, kind: &str) {
    mock_manifest(server, &manifest_body(&server.uri(), version, kind)).await;
}

/// Serve the binary; `expected` asserts how many downloads happen
pub async fn mock_binary(server: &MockServer, content: &[u8], expected: u64) {
    Mock::given(method("GET"))
        .and(path(BINARY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .expect(expected)
        .mount(server)
        .await;
}

/// Serve the binary after a delay, keeping the session busy
pub async fn mock_slow_binary(server: &MockServer, content: &[u8], delay: Duration) {
    Mock::given(method("GET"))
        .and(path(BINARY_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .set_delay(delay),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Binary endpoint that always fails with `status`
pub async fn mock_failing_binary(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(BINARY_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub fn manifest_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), MANIFEST_PATH)
}

pub fn binary_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), BINARY_PATH)
}
