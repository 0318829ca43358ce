//! Append-only log of control-channel failures
//!
//! One line per failure: `<UTC timestamp>  <ErrorKind>: <message>`.

use chrono::{DateTime, Utc};
use keymaster_core::{Error, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a line for `err`, timestamped now
    pub fn record(&self, err: &Error) -> Result<()> {
        self.append(Utc::now(), err.kind(), &err.to_string())
    }

    /// Append a line with an explicit timestamp
    pub fn append(&self, at: DateTime<Utc>, kind: &str, message: &str) -> Result<()> {
        let line = format_line(at, kind, message);
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::file_system(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| Error::file_system(&self.path, e))?;
        Ok(())
    }
}

fn format_line(at: DateTime<Utc>, kind: &str, message: &str) -> String {
    format!("{}  {}: {}\n", at.format("%Y-%m-%d %H:%M:%SZ"), kind, message)
}
