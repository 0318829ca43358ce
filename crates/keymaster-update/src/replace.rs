//! Executable replacement through a detached watcher script
//!
//! A running executable cannot be overwritten by the process that holds it,
//! so the swap happens in two phases:
//!
//! 1. This process writes a standalone script to a fixed path in the
//!    staging directory and launches it detached, then exits.
//! 2. The script polls once a second until the host has exited (by image
//!    name on Windows, by PID on Unix), replaces `<target>.bak` with the current
//!    executable, moves the staged file into place, launches it, and
//!    deletes itself.
//!
//! Phase 2 has no error channel back to the user. Moving the old binary to
//! `.bak` is best effort and does not abort the sequence.

use keymaster_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Fixed name of the watcher script. Concurrent sessions from different
/// instances sharing a staging directory overwrite each other's script.
#[cfg(windows)]
pub const WATCHER_SCRIPT_NAME: &str = "update.bat";
#[cfg(not(windows))]
pub const WATCHER_SCRIPT_NAME: &str = "update.sh";

/// Backup file extension
pub const BACKUP_EXT: &str = ".bak";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;
#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;

/// Hands a downloaded binary over for installation
pub trait Stager: Send + Sync {
    /// Arrange for `staged` to replace `target` once this process exits
    fn stage(&self, target: &Path, staged: &Path) -> Result<()>;
}

/// Everything the watcher script needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherPlan {
    /// Executable currently running, and relaunched afterwards
    pub target: PathBuf,

    /// Downloaded replacement
    pub staged: PathBuf,

    /// Where the previous executable is kept
    pub backup: PathBuf,

    /// Path the script is written to (it deletes itself at the end)
    pub script: PathBuf,

    /// Image name polled on Windows until the host has exited
    pub process_name: String,

    /// Host PID polled on Unix until the host has exited
    pub pid: u32,
}

impl WatcherPlan {
    pub fn new(target: &Path, staged: &Path, script_dir: &Path) -> Result<Self> {
        let process_name = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::file_system(
                    target,
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "Cannot determine executable name",
                    ),
                )
            })?
            .to_string();

        Ok(Self {
            target: target.to_path_buf(),
            staged: staged.to_path_buf(),
            backup: backup_path(target),
            script: script_dir.join(WATCHER_SCRIPT_NAME),
            process_name,
            pid: std::process::id(),
        })
    }

    /// Wait for `pid` instead of the current process
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }
}

/// `<target>.bak`
pub fn backup_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(BACKUP_EXT);
    PathBuf::from(name)
}

/// Render the watcher script for the current platform
#[cfg(windows)]
pub fn render_watcher_script(plan: &WatcherPlan) -> String {
    let target = plan.target.display();
    let name = &plan.process_name;
    format!(
        "@echo off\r\n\
         chcp 65001 >nul\r\n\
         :loop\r\n\
         tasklist /fi \"IMAGENAME eq {name}\" | find /i \"{name}\" >nul\r\n\
         if %errorlevel%==0 (\r\n\
         \x20   timeout /t 1 /nobreak >nul\r\n\
         \x20   goto loop\r\n\
         )\r\n\
         del \"{backup}\" 2>nul\r\n\
         move \"{target}\" \"{backup}\" 2>nul\r\n\
         move \"{staged}\" \"{target}\"\r\n\
         start \"\" \"{target}\"\r\n\
         del \"{script}\"\r\n\
         exit\r\n",
        name = name,
        target = target,
        backup = plan.backup.display(),
        staged = plan.staged.display(),
        script = plan.script.display(),
    )
}

/// Render the watcher script for the current platform
///
/// A PID that only remains as a zombie counts as exited.
#[cfg(not(windows))]
pub fn render_watcher_script(plan: &WatcherPlan) -> String {
    format!(
        "#!/bin/sh\n\
         while kill -0 {pid} 2>/dev/null; do\n\
         \x20   case \"$(ps -o stat= -p {pid} 2>/dev/null)\" in\n\
         \x20       *Z*) break ;;\n\
         \x20   esac\n\
         \x20   sleep 1\n\
         done\n\
         rm -f {backup} 2>/dev/null\n\
         mv -f {target} {backup} 2>/dev/null\n\
         mv -f {staged} {target}\n\
         nohup {target} >/dev/null 2>&1 &\n\
         rm -f {script}\n\
         exit 0\n",
        pid = plan.pid,
        target = sh_quote(&plan.target.to_string_lossy()),
        backup = sh_quote(&plan.backup.to_string_lossy()),
        staged = sh_quote(&plan.staged.to_string_lossy()),
        script = sh_quote(&plan.script.to_string_lossy()),
    )
}

/// Single-quote for POSIX sh
#[cfg(not(windows))]
fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// [`Stager`] that writes and launches the watcher script
#[derive(Debug, Clone)]
pub struct SelfReplaceAgent {
    /// Directory receiving the watcher script
    script_dir: PathBuf,

    /// Process the watcher waits for, normally this one
    watched_pid: u32,
}

impl SelfReplaceAgent {
    pub fn new(script_dir: impl Into<PathBuf>) -> Self {
        Self {
            script_dir: script_dir.into(),
            watched_pid: std::process::id(),
        }
    }

    /// Make the watcher wait for another process to exit
    pub fn watching(mut self, pid: u32) -> Self {
        self.watched_pid = pid;
        self
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    /// Path the watcher script is written to
    pub fn script_path(&self) -> PathBuf {
        self.script_dir.join(WATCHER_SCRIPT_NAME)
    }

    fn write_script(&self, plan: &WatcherPlan) -> Result<()> {
        let script = render_watcher_script(plan);
        fs::write(&plan.script, script).map_err(|e| Error::file_system(&plan.script, e))?;
        debug!("Watcher script written to {}", plan.script.display());
        Ok(())
    }

    /// Launch the script so that it outlives this process
    #[cfg(windows)]
    fn launch(&self, plan: &WatcherPlan) -> Result<()> {
        use std::os::windows::process::CommandExt;

        Command::new("cmd.exe")
            .arg("/c")
            .arg("start")
            .arg("")
            .arg(&plan.script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .creation_flags(CREATE_NO_WINDOW | DETACHED_PROCESS)
            .spawn()
            .map_err(Error::WatcherLaunch)?;
        Ok(())
    }

    /// Launch the script so that it outlives this process
    #[cfg(not(windows))]
    fn launch(&self, plan: &WatcherPlan) -> Result<()> {
        use std::os::unix::process::CommandExt;

        Command::new("sh")
            .arg(&plan.script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(Error::WatcherLaunch)?;
        Ok(())
    }
}

impl Stager for SelfReplaceAgent {
    fn stage(&self, target: &Path, staged: &Path) -> Result<()> {
        let plan =
            WatcherPlan::new(target, staged, &self.script_dir)?.with_pid(self.watched_pid);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(staged)
                .map_err(|e| Error::file_system(staged, e))?
                .permissions();
            perms.set_mode(0o755);
            fs::set_permissions(staged, perms).map_err(|e| Error::file_system(staged, e))?;
        }

        self.write_script(&plan)?;
        self.launch(&plan)?;

        info!(
            "Watcher launched; {} will be replaced after exit",
            plan.target.display()
        );
        Ok(())
    }
}
