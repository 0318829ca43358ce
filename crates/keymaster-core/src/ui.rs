//! Single marshaling point for UI mutations
//!
//! [`ui_channel`] wraps a host bridge in a [`UiDispatcher`] that any task may
//! call, and a [`UiPump`] that applies the queued calls one at a time on the
//! task that owns the UI.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::bridge::{Notice, UiBridge};
use crate::types::DownloadProgress;
use crate::version::SemanticVersion;

enum UiCommand {
    Status(String),
    Enabled(bool),
    Progress(DownloadProgress),
    LatestVersion(SemanticVersion),
    Consent {
        question: String,
        reply: oneshot::Sender<bool>,
    },
    Notice {
        notice: Notice,
        done: oneshot::Sender<()>,
    },
    Terminate,
}

/// Why [`UiPump::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// `terminate_application` was applied
    Terminated,
    /// Every dispatcher was dropped
    Disconnected,
}

/// Cloneable, thread-safe handle that queues UI calls for the pump
#[derive(Clone)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<UiCommand>,
}

/// Applies queued UI calls to the wrapped bridge, in order
pub struct UiPump<B: UiBridge> {
    bridge: Arc<B>,
    rx: mpsc::UnboundedReceiver<UiCommand>,
}

/// Create a dispatcher/pump pair around `bridge`
pub fn ui_channel<B: UiBridge>(bridge: Arc<B>) -> (UiDispatcher, UiPump<B>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiDispatcher { tx }, UiPump { bridge, rx })
}

impl UiDispatcher {
    fn send(&self, command: UiCommand) {
        if self.tx.send(command).is_err() {
            debug!("UI pump has stopped; dropping UI call");
        }
    }
}

#[async_trait]
impl UiBridge for UiDispatcher {
    fn display_status(&self, text: &str) {
        self.send(UiCommand::Status(text.to_string()));
    }

    fn set_enabled(&self, enabled: bool) {
        self.send(UiCommand::Enabled(enabled));
    }

    async fn prompt_consent(&self, question: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        self.send(UiCommand::Consent {
            question: question.to_string(),
            reply,
        });
        // An unanswered prompt counts as a refusal.
        answer.await.unwrap_or(false)
    }

    async fn show_notice(&self, notice: Notice) {
        let (done, dismissed) = oneshot::channel();
        self.send(UiCommand::Notice { notice, done });
        let _ = dismissed.await;
    }

    fn terminate_application(&self) {
        self.send(UiCommand::Terminate);
    }

    fn display_progress(&self, progress: &DownloadProgress) {
        self.send(UiCommand::Progress(*progress));
    }

    fn display_latest_version(&self, latest: &SemanticVersion) {
        self.send(UiCommand::LatestVersion(*latest));
    }
}

impl<B: UiBridge> UiPump<B> {
    /// Apply queued calls until termination or until all dispatchers are gone
    pub async fn run(mut self) -> PumpExit {
        while let Some(command) = self.rx.recv().await {
            if Self::apply(&self.bridge, command).await {
                return PumpExit::Terminated;
            }
        }
        PumpExit::Disconnected
    }

    /// Returns true once termination has been applied
    async fn apply(bridge: &B, command: UiCommand) -> bool {
        match command {
            UiCommand::Status(text) => bridge.display_status(&text),
            UiCommand::Enabled(enabled) => bridge.set_enabled(enabled),
            UiCommand::Progress(progress) => bridge.display_progress(&progress),
            UiCommand::LatestVersion(version) => bridge.display_latest_version(&version),
            UiCommand::Consent { question, reply } => {
                let answer = bridge.prompt_consent(&question).await;
                if reply.send(answer).is_err() {
                    warn!("Consent answer arrived after the requester gave up");
                }
            }
            UiCommand::Notice { notice, done } => {
                bridge.show_notice(notice).await;
                let _ = done.send(());
            }
            UiCommand::Terminate => {
                bridge.terminate_application();
                return true;
            }
        }
        false
    }
}
