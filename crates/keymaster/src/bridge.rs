//! Console implementation of the UI bridge
//!
//! Status lines and notices go to the terminal, download progress to an
//! `indicatif` bar and consent prompts to `dialoguer`. The enabled state of
//! the host's controls is tracked in a [`Widget`] tree.

use async_trait::async_trait;
use console::{style, Term};
use dialoguer::Confirm;
use indicatif::ProgressBar;
use keymaster_core::{
    set_tree_enabled, DownloadProgress, Notice, NoticeSeverity, SemanticVersion, UiBridge, Widget,
};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::output;

/// Controls a console host exposes
pub fn default_controls() -> Widget {
    Widget::new("keymaster")
        .with_child(
            Widget::new("actions")
                .with_child(Widget::new("check-updates"))
                .with_child(Widget::new("start")),
        )
        .with_child(Widget::new("settings").with_child(Widget::new("save")))
}

pub struct ConsoleBridge {
    controls: Mutex<Widget>,
    progress: Mutex<Option<ProgressBar>>,
    interactive: bool,
}

impl ConsoleBridge {
    /// Prompts and notices wait for the user only when `interactive`
    pub fn new(controls: Widget, interactive: bool) -> Self {
        Self {
            controls: Mutex::new(controls),
            progress: Mutex::new(None),
            interactive,
        }
    }

    #[cfg(test)]
    fn controls(&self) -> Widget {
        self.lock_controls().clone()
    }

    fn lock_controls(&self) -> MutexGuard<'_, Widget> {
        self.controls.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn finish_progress(&self) {
        let bar = self
            .progress
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    }
}

#[async_trait]
impl UiBridge for ConsoleBridge {
    fn display_status(&self, text: &str) {
        self.finish_progress();
        output::info(text);
    }

    fn set_enabled(&self, enabled: bool) {
        let toggled = set_tree_enabled(&mut *self.lock_controls(), enabled);
        debug!("Set {} controls enabled={}", toggled, enabled);
        if enabled {
            output::success("Controls enabled");
        } else {
            output::warning("Controls disabled");
        }
    }

    async fn prompt_consent(&self, question: &str) -> bool {
        if !self.interactive {
            output::warning(&format!("{} (no terminal attached, declining)", question));
            return false;
        }

        let question = question.to_string();
        let answer = tokio::task::spawn_blocking(move || {
            Confirm::new()
                .with_prompt(question)
                .default(false)
                .interact()
        })
        .await;

        match answer {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                warn!("Consent prompt failed: {}", e);
                false
            }
            Err(e) => {
                warn!("Consent prompt task failed: {}", e);
                false
            }
        }
    }

    async fn show_notice(&self, notice: Notice) {
        self.finish_progress();
        output::header(&notice.title);
        match notice.severity {
            NoticeSeverity::Info => println!("{}", style(&notice.message).yellow()),
            NoticeSeverity::Stop => println!("{}", style(&notice.message).red().bold()),
        }

        if !self.interactive {
            return;
        }

        let acknowledged = tokio::task::spawn_blocking(|| {
            let term = Term::stdout();
            term.write_line(&style("Press Enter to continue").dim().to_string())?;
            term.read_line()
        })
        .await;
        if !matches!(acknowledged, Ok(Ok(_))) {
            debug!("Notice dismissed without input");
        }
    }

    fn terminate_application(&self) {
        self.finish_progress();
        output::info("Shutting down");
    }

    fn display_progress(&self, progress: &DownloadProgress) {
        let mut slot = self.progress.lock().unwrap_or_else(|p| p.into_inner());
        let bar = slot.get_or_insert_with(|| output::download_bar(progress.total_bytes));
        bar.set_position(progress.bytes_read);
    }

    fn display_latest_version(&self, latest: &SemanticVersion) {
        output::kv("Latest version", &latest.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge() -> ConsoleBridge {
        ConsoleBridge::new(default_controls(), false)
    }

    #[test]
    fn test_set_enabled_toggles_every_control() {
        let bridge = bridge();

        bridge.set_enabled(false);
        let controls = bridge.controls();
        assert!(controls.all_descendants(false));
        assert!(!controls.find("save").unwrap().enabled);

        bridge.set_enabled(true);
        assert!(bridge.controls().all_descendants(true));
    }

    #[tokio::test]
    async fn test_non_interactive_prompt_declines() {
        assert!(!bridge().prompt_consent("Update now?").await);
    }

    #[tokio::test]
    async fn test_non_interactive_notice_returns() {
        bridge()
            .show_notice(Notice::info("Maintenance Mode", "Back soon"))
            .await;
    }

    #[test]
    fn test_progress_bar_is_reused_until_status() {
        let bridge = bridge();
        let mut progress = DownloadProgress::new(100);
        progress.update(40);
        bridge.display_progress(&progress);
        progress.update(80);
        bridge.display_progress(&progress);

        let position = bridge
            .progress
            .lock()
            .unwrap()
            .as_ref()
            .map(|bar| bar.position());
        assert_eq!(position, Some(80));

        bridge.display_status("Preparing installer...");
        assert!(bridge.progress.lock().unwrap().is_none());
    }
}
