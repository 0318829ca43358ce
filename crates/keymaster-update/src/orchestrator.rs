//! Update check and session state machine
//!
//! ```text
//! Idle → Checking → UpToDate ───────────────────────────────→ Idle
//!                 → AwaitingConsent → (declined) ───────────→ Idle
//!                                   → (accepted) ┐
//!                 → Downloading ←────────────────┘
//!                     → Staging → Relaunching → terminate → Idle
//! Checking | Downloading | Staging → Failed ────────────────→ Idle
//! ```
//!
//! `check()` never retries; the periodic timer calling it again is the only
//! recovery path. Sessions run as a tokio task held by the orchestrator and
//! are guarded by a single in-progress flag: a second `begin_download`
//! while one is running is dropped, not queued.

use keymaster_core::types::RuntimeConfig;
use keymaster_core::{
    spawn_periodic, Error, HttpSource, PeriodicTask, Result, SemanticVersion, TextSource,
    UiBridge,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::download::Downloader;
use crate::manifest::UpdateManifest;
use crate::replace::{SelfReplaceAgent, Stager};

pub const STATUS_UP_TO_DATE: &str = "Your application is up to date";
pub const STATUS_POSTPONED: &str = "Update postponed by user.";
pub const STATUS_DOWNLOADING: &str = "Downloading update...";
pub const STATUS_PREPARING: &str = "Preparing installer...";
pub const STATUS_RESTARTING: &str = "Restarting application...";

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Idle,
    Checking,
    UpToDate,
    AwaitingConsent,
    Downloading,
    Staging,
    Relaunching,
    Failed,
}

/// Result of one `check()`
#[derive(Debug)]
pub enum CheckOutcome {
    /// Remote version is not newer than ours
    UpToDate { latest: SemanticVersion },
    /// Major update declined by the user
    Postponed { latest: SemanticVersion },
    /// A download session was started
    UpdateStarted { manifest: UpdateManifest },
    /// A session is already running; nothing was fetched or started
    SessionActive,
    /// Fetch or parse failed; already reported through the bridge
    Failed(Error),
}

/// One download-and-apply attempt. Only `in_progress` guards concurrency.
#[derive(Debug, Default)]
struct UpdateSession {
    in_progress: AtomicBool,
    temp_file_path: Mutex<Option<PathBuf>>,
}

/// Drives update checks and download sessions for one host
pub struct UpdateOrchestrator {
    current_version: SemanticVersion,
    manifest_url: String,
    target_executable: PathBuf,
    staging_dir: PathBuf,
    relaunch_grace: Duration,

    bridge: Arc<dyn UiBridge>,
    source: Arc<dyn TextSource>,
    downloader: Downloader,
    stager: Arc<dyn Stager>,

    session: UpdateSession,
    session_task: Mutex<Option<JoinHandle<()>>>,
    state: watch::Sender<UpdateState>,
}

impl UpdateOrchestrator {
    /// Create an orchestrator from explicit collaborators
    pub fn new(
        current_version: SemanticVersion,
        manifest_url: impl Into<String>,
        target_executable: impl Into<PathBuf>,
        bridge: Arc<dyn UiBridge>,
        source: Arc<dyn TextSource>,
        downloader: Downloader,
        stager: Arc<dyn Stager>,
    ) -> Self {
        let (state, _) = watch::channel(UpdateState::Idle);
        Self {
            current_version,
            manifest_url: manifest_url.into(),
            target_executable: target_executable.into(),
            staging_dir: std::env::temp_dir(),
            relaunch_grace: Duration::from_millis(500),
            bridge,
            source,
            downloader,
            stager,
            session: UpdateSession::default(),
            session_task: Mutex::new(None),
            state,
        }
    }

    /// Create an orchestrator for the running executable from runtime config
    pub fn from_config(
        config: &RuntimeConfig,
        current_version: &str,
        bridge: Arc<dyn UiBridge>,
    ) -> Result<Self> {
        let current_version = SemanticVersion::parse(current_version)?;
        let target = std::env::current_exe().map_err(|e| Error::file_system("current_exe", e))?;
        let staging_dir = config.update.staging_dir();

        debug!(
            "Update orchestrator initialized: version={}, path={:?}",
            current_version, target
        );

        Ok(Self::new(
            current_version,
            config.update.manifest_url.clone(),
            target,
            bridge,
            Arc::new(HttpSource::new(&config.network)?),
            Downloader::new(&config.network)?,
            Arc::new(SelfReplaceAgent::new(staging_dir.clone())),
        )
        .with_staging_dir(staging_dir)
        .with_relaunch_grace(config.update.relaunch_grace()))
    }

    /// Directory receiving downloaded binaries
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Delay between launching the watcher and terminating
    pub fn with_relaunch_grace(mut self, grace: Duration) -> Self {
        self.relaunch_grace = grace;
        self
    }

    pub fn current_version(&self) -> &SemanticVersion {
        &self.current_version
    }

    pub fn target_executable(&self) -> &Path {
        &self.target_executable
    }

    pub fn state(&self) -> UpdateState {
        *self.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<UpdateState> {
        self.state.subscribe()
    }

    /// Whether a download session is active
    pub fn is_updating(&self) -> bool {
        self.session.in_progress.load(Ordering::SeqCst)
    }

    /// Temp file of the current or last session; failed sessions leave it on disk
    pub fn temp_file_path(&self) -> Option<PathBuf> {
        self.session
            .temp_file_path
            .lock()
            .ok()
            .and_then(|p| p.clone())
    }

    fn transition(&self, next: UpdateState) {
        let previous = self.state.send_replace(next);
        debug!("Update state {:?} -> {:?}", previous, next);
    }

    /// Fetch the manifest and act on it
    pub async fn check(self: &Arc<Self>) -> CheckOutcome {
        if self.is_updating() {
            debug!("Skipping update check while a session is running");
            return CheckOutcome::SessionActive;
        }

        self.transition(UpdateState::Checking);
        info!("Checking for updates at {}", self.manifest_url);

        let raw = match self.source.fetch_text(&self.manifest_url).await {
            Ok(raw) => raw,
            Err(e) => return self.fail_check(format!("Update check failed: {}", e), e),
        };

        let manifest = match UpdateManifest::parse(&raw) {
            Ok(manifest) => manifest,
            Err(e @ Error::InvalidManifestFormat { .. }) => {
                return self.fail_check("Invalid update info format".to_string(), e)
            }
            Err(e) => return self.fail_check(format!("Version error: {}", e), e),
        };

        let latest = manifest.latest_version;
        self.bridge.display_latest_version(&latest);

        if !latest.is_newer_than(&self.current_version) {
            info!("Up to date (current {}, latest {})", self.current_version, latest);
            self.transition(UpdateState::UpToDate);
            self.bridge.display_status(STATUS_UP_TO_DATE);
            self.transition(UpdateState::Idle);
            return CheckOutcome::UpToDate { latest };
        }

        if manifest.is_major() {
            self.transition(UpdateState::AwaitingConsent);
            let question = format!(
                "A major update (v{}) is available.\nCurrent version: {}\n\nUpdate now?",
                latest, self.current_version
            );
            if !self.bridge.prompt_consent(&question).await {
                info!("Major update {} postponed by user", latest);
                self.bridge.display_status(STATUS_POSTPONED);
                self.transition(UpdateState::Idle);
                return CheckOutcome::Postponed { latest };
            }
        }

        info!("Update {} available ({:?})", latest, manifest.update_kind);
        if self.begin_download(manifest.download_url.clone()) {
            CheckOutcome::UpdateStarted { manifest }
        } else {
            CheckOutcome::SessionActive
        }
    }

    fn fail_check(&self, message: String, err: Error) -> CheckOutcome {
        warn!("{}", message);
        self.transition(UpdateState::Failed);
        self.bridge.display_status(&message);
        self.transition(UpdateState::Idle);
        CheckOutcome::Failed(err)
    }

    /// Start a download session unless one is already running.
    ///
    /// Returns `false` when the call was dropped by the in-progress guard.
    pub fn begin_download(self: &Arc<Self>, url: String) -> bool {
        if self
            .session
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Update session already in progress; ignoring {}", url);
            return false;
        }

        self.transition(UpdateState::Downloading);
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run_session(url).await });

        if let Ok(mut slot) = self.session_task.lock() {
            *slot = Some(handle);
        }
        true
    }

    /// Wait for the session task started by `begin_download`, if any
    pub async fn wait_for_session(&self) {
        let handle = self.session_task.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Update session task panicked: {}", e);
            }
        }
    }

    async fn run_session(self: Arc<Self>, url: String) {
        match self.download_and_stage(&url).await {
            Ok(()) => {
                self.bridge.terminate_application();
                info!("Update staged; application terminated for relaunch");
            }
            Err(e) => {
                error!("Update failed: {}", e);
                self.transition(UpdateState::Failed);
                self.bridge.display_status(&format!("Error: {}", e));
            }
        }

        self.session.in_progress.store(false, Ordering::SeqCst);
        self.transition(UpdateState::Idle);
    }

    async fn download_and_stage(&self, url: &str) -> Result<()> {
        self.bridge.display_status(STATUS_DOWNLOADING);

        let temp_file = self.staging_dir.join(format!("{}.exe", Uuid::new_v4()));
        if let Ok(mut slot) = self.session.temp_file_path.lock() {
            *slot = Some(temp_file.clone());
        }

        let bridge = Arc::clone(&self.bridge);
        self.downloader
            .fetch(url, &temp_file, |progress| bridge.display_progress(progress))
            .await?;

        if !temp_file.exists() {
            return Err(Error::file_system(
                &temp_file,
                std::io::Error::new(std::io::ErrorKind::NotFound, "Downloaded file not found"),
            ));
        }

        self.transition(UpdateState::Staging);
        self.bridge.display_status(STATUS_PREPARING);
        self.stager.stage(&self.target_executable, &temp_file)?;

        self.transition(UpdateState::Relaunching);
        self.bridge.display_status(STATUS_RESTARTING);
        tokio::time::sleep(self.relaunch_grace).await;
        Ok(())
    }

    /// Run `check()` now and then every `period`
    pub fn start_periodic_checks(self: &Arc<Self>, period: Duration) -> PeriodicTask {
        let this = Arc::clone(self);
        spawn_periodic("update checks", period, move || {
            let this = Arc::clone(&this);
            async move {
                let outcome = this.check().await;
                debug!("Periodic update check: {:?}", outcome);
            }
        })
    }
}
