//! Recording UI bridge

use async_trait::async_trait;
use keymaster_core::{DownloadProgress, Notice, SemanticVersion, UiBridge};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Captures every bridge call; answers prompts with a fixed reply
#[derive(Default)]
pub struct RecordingBridge {
    pub statuses: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub progress: Mutex<Vec<DownloadProgress>>,
    pub latest: Mutex<Vec<SemanticVersion>>,
    pub notices: Mutex<Vec<Notice>>,
    pub enabled: Mutex<Vec<bool>>,
    pub terminations: AtomicUsize,
    consent: AtomicBool,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge whose prompts are answered with `answer`
    pub fn answering(answer: bool) -> Self {
        let bridge = Self::default();
        bridge.consent.store(answer, Ordering::SeqCst);
        bridge
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses.lock().unwrap().last().cloned()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn progress(&self) -> Vec<DownloadProgress> {
        self.progress.lock().unwrap().clone()
    }

    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UiBridge for RecordingBridge {
    fn display_status(&self, text: &str) {
        self.statuses.lock().unwrap().push(text.to_string());
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.lock().unwrap().push(enabled);
    }

    async fn prompt_consent(&self, question: &str) -> bool {
        self.prompts.lock().unwrap().push(question.to_string());
        self.consent.load(Ordering::SeqCst)
    }

    async fn show_notice(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn terminate_application(&self) {
        self.terminations.fetch_add(1, Ordering::SeqCst);
    }

    fn display_progress(&self, progress: &DownloadProgress) {
        self.progress.lock().unwrap().push(*progress);
    }

    fn display_latest_version(&self, latest: &SemanticVersion) {
        self.latest.lock().unwrap().push(*latest);
    }
}
