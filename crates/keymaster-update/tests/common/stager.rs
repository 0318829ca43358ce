//! Recording stager

use keymaster_core::{Error, Result};
use keymaster_update::Stager;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A staged hand-off as seen by the stager
#[derive(Debug, Clone)]
pub struct StagedCall {
    pub target: PathBuf,
    pub staged: PathBuf,
    pub content: Vec<u8>,
}

/// Records hand-offs instead of launching a watcher
#[derive(Default)]
pub struct RecordingStager {
    pub calls: Mutex<Vec<StagedCall>>,
    fail: bool,
}

impl RecordingStager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stager that fails like a watcher spawn failure
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<StagedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Stager for RecordingStager {
    fn stage(&self, target: &Path, staged: &Path) -> Result<()> {
        let content = fs::read(staged).map_err(|e| Error::file_system(staged, e))?;
        self.calls.lock().unwrap().push(StagedCall {
            target: target.to_path_buf(),
            staged: staged.to_path_buf(),
            content,
        });

        if self.fail {
            return Err(Error::WatcherLaunch(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cmd.exe not found",
            )));
        }
        Ok(())
    }
}
