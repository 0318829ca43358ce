//! Builder for orchestrators wired to a mock server
//!
//! Every orchestrator built here stages into a temp directory, relaunches
//! without a grace delay and hands off to a [`RecordingStager`].

use keymaster_core::{HttpSource, SemanticVersion};
use keymaster_update::{Downloader, UpdateOrchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

use super::bridge::RecordingBridge;
use super::constants::*;
use super::mock_server::manifest_url;
use super::stager::RecordingStager;

/// Orchestrator plus the fakes it talks to
pub struct Harness {
    pub orchestrator: Arc<UpdateOrchestrator>,
    pub bridge: Arc<RecordingBridge>,
    pub stager: Arc<RecordingStager>,
    pub staging: TempDir,
    pub target: PathBuf,
}

pub struct HarnessBuilder {
    current: String,
    consent: bool,
    stager: RecordingStager,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            current: VERSION_1_0_0_0.to_string(),
            consent: false,
            stager: RecordingStager::new(),
        }
    }

    /// Version the host reports as running
    pub fn current(mut self, version: &str) -> Self {
        self.current = version.to_string();
        self
    }

    /// Answer for major-update prompts
    pub fn consent(mut self, answer: bool) -> Self {
        self.consent = answer;
        self
    }

    /// Use a stager that fails to launch the watcher
    pub fn failing_stager(mut self) -> Self {
        self.stager = RecordingStager::failing();
        self
    }

    pub fn build(self, server: &MockServer) -> Harness {
        let staging = TempDir::new().unwrap();
        let target = staging.path().join("keymaster-test");
        std::fs::write(&target, ORIGINAL_CONTENT).unwrap();

        let bridge = Arc::new(RecordingBridge::answering(self.consent));
        let stager = Arc::new(self.stager);
        let client = reqwest::Client::new();

        let orchestrator = UpdateOrchestrator::new(
            SemanticVersion::parse(&self.current).unwrap(),
            manifest_url(server),
            &target,
            bridge.clone(),
            Arc::new(HttpSource::with_client(client.clone())),
            Downloader::with_client(client),
            stager.clone(),
        )
        .with_staging_dir(staging.path())
        .with_relaunch_grace(Duration::ZERO);

        Harness {
            orchestrator: Arc::new(orchestrator),
            bridge,
            stager,
            staging,
            target,
        }
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}
