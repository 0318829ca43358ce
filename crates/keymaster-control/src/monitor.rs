//! Control-channel poll loop
//!
//! ```text
//! (none) ─ACTIVE──→ Active  : enable UI, clear maintenance latch
//!        ─PAUSED──→ Paused  : disable UI, maintenance notice unless latched
//!        ─STOPPED─→ Stopped : out-of-service notice, terminate
//!        ─other───→ Unknown : remembered, nothing dispatched
//! ```
//!
//! Only changes of the normalized token dispatch anything, so a status that
//! stays the same across polls is acted on once.

use keymaster_core::types::RuntimeConfig;
use keymaster_core::{
    spawn_periodic, HttpSource, Notice, PeriodicTask, Result, TextSource, UiBridge,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::error_log::ErrorLog;
use crate::status::ControlStatus;

pub const STOPPED_TITLE: &str = "Application Stopped";
pub const STOPPED_MESSAGE: &str =
    "This application is currently out of service. Please try again later.";
pub const MAINTENANCE_TITLE: &str = "Maintenance Mode";
pub const MAINTENANCE_MESSAGE: &str =
    "The application is currently under maintenance. Please try again later.";

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Default)]
struct ChannelState {
    last_token: Option<String>,
    maintenance_notice_shown: bool,
}

/// Polls the control channel and drives the UI bridge on status changes
pub struct ControlChannelMonitor {
    status_url: String,
    poll_interval: Duration,
    source: Arc<dyn TextSource>,
    bridge: Arc<dyn UiBridge>,
    error_log: Option<ErrorLog>,
    state: Mutex<ChannelState>,
    status: watch::Sender<ControlStatus>,
}

impl ControlChannelMonitor {
    pub fn new(
        status_url: impl Into<String>,
        source: Arc<dyn TextSource>,
        bridge: Arc<dyn UiBridge>,
    ) -> Self {
        let (status, _) = watch::channel(ControlStatus::Unknown);
        Self {
            status_url: status_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            source,
            bridge,
            error_log: None,
            state: Mutex::new(ChannelState::default()),
            status,
        }
    }

    /// Monitor for the configured status URL, logging failures to the
    /// configured error log
    pub fn from_config(config: &RuntimeConfig, bridge: Arc<dyn UiBridge>) -> Result<Self> {
        let source = Arc::new(HttpSource::new(&config.network)?);
        Ok(Self::new(config.control.status_url.clone(), source, bridge)
            .with_poll_interval(config.control.poll_interval())
            .with_error_log(ErrorLog::new(config.control.error_log.clone())))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_error_log(mut self, log: ErrorLog) -> Self {
        self.error_log = Some(log);
        self
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn error_log(&self) -> Option<&ErrorLog> {
        self.error_log.as_ref()
    }

    /// Last observed status; `Unknown` before the first successful poll
    pub fn current_status(&self) -> ControlStatus {
        *self.status.borrow()
    }

    /// Watch status changes
    pub fn subscribe(&self) -> watch::Receiver<ControlStatus> {
        self.status.subscribe()
    }

    /// Apply one raw payload. Returns the status that was dispatched, or
    /// `None` when the token was unchanged or carries no action.
    pub async fn observe(&self, raw: &str) -> Option<ControlStatus> {
        let token = ControlStatus::normalize(raw);
        let mut state = self.state.lock().await;

        if state.last_token.as_deref() == Some(token.as_str()) {
            return None;
        }

        let status = ControlStatus::from_token(&token);
        info!(
            "Control status changed: {} -> {:?}",
            state.last_token.as_deref().unwrap_or("<none>"),
            token
        );
        state.last_token = Some(token);
        self.status.send_replace(status);

        match status {
            ControlStatus::Stopped => {
                self.bridge
                    .show_notice(Notice::stop(STOPPED_TITLE, STOPPED_MESSAGE))
                    .await;
                self.bridge.terminate_application();
            }
            ControlStatus::Paused => {
                self.bridge.set_enabled(false);
                if !state.maintenance_notice_shown {
                    state.maintenance_notice_shown = true;
                    self.bridge
                        .show_notice(Notice::info(MAINTENANCE_TITLE, MAINTENANCE_MESSAGE))
                        .await;
                }
            }
            ControlStatus::Active => {
                self.bridge.set_enabled(true);
                state.maintenance_notice_shown = false;
            }
            ControlStatus::Unknown => {
                debug!("Ignoring unrecognized control token");
                return None;
            }
        }

        Some(status)
    }

    /// Fetch the status once and apply it. Failures are logged and swallowed.
    pub async fn poll_once(&self) -> Option<ControlStatus> {
        match self.source.fetch_text(&self.status_url).await {
            Ok(raw) => self.observe(&raw).await,
            Err(e) => {
                warn!("Control channel poll failed: {}", e);
                if let Some(log) = &self.error_log {
                    if let Err(log_err) = log.record(&e) {
                        error!(
                            "Failed to write control error log {}: {}",
                            log.path().display(),
                            log_err
                        );
                    }
                }
                None
            }
        }
    }

    /// Poll now and then every poll interval
    pub fn start(self: &Arc<Self>) -> PeriodicTask {
        let this = Arc::clone(self);
        spawn_periodic("control channel", self.poll_interval, move || {
            let this = Arc::clone(&this);
            async move {
                this.poll_once().await;
            }
        })
    }
}
