//! Background process control: start a detached monitor, stop it by PID.

use anyhow::{anyhow, bail, Context, Result};
use scopeguard::defer;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use sysinfo::{Pid, System};
use tracing::{info, warn};

/// Hidden flag that makes the binary run the monitor loop in-process
pub const BACKGROUND_FLAG: &str = "--background";

/// Launch a child that outlives the invoking terminal
pub trait Spawner {
    fn spawn_detached(&self, args: &[&str]) -> Result<u32>;
}

/// Forcefully end a process by PID
pub trait Terminator {
    fn terminate(&self, pid: u32) -> Result<()>;
}

/// Re-executes the current binary in its own process group with null stdio
pub struct DetachedSpawner;

impl Spawner for DetachedSpawner {
    fn spawn_detached(&self, args: &[&str]) -> Result<u32> {
        let exe = env::current_exe().context("Failed to locate own executable")?;
        let cwd = env::current_dir().context("Failed to read working directory")?;
        let mut command = Command::new(exe);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut command);
        let child = command
            .spawn()
            .context("Failed to spawn background monitor")?;
        Ok(child.id())
    }
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach(_command: &mut Command) {}

/// Kills through sysinfo (SIGKILL on Unix, TerminateProcess on Windows)
pub struct SysinfoTerminator;

impl Terminator for SysinfoTerminator {
    fn terminate(&self, pid: u32) -> Result<()> {
        let sys = System::new_all();
        let process = sys
            .process(Pid::from_u32(pid))
            .ok_or_else(|| anyhow!("no process with PID {}", pid))?;
        let own_exe = env::current_exe().context("Failed to locate own executable")?;
        if !is_same_binary(process.exe(), &own_exe) {
            bail!(
                "PID {} belongs to {:?}, not a clipboard monitor",
                pid,
                process.name()
            );
        }
        info!(pid, name = %process.name().to_string_lossy(), "Killing process");
        if !process.kill() {
            bail!("kill signal could not be sent to PID {}", pid);
        }
        Ok(())
    }
}

/// Whether a process image is this binary. A rebuilt binary still matches by file name.
fn is_same_binary(candidate: Option<&Path>, own: &Path) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };
    if candidate == own {
        return true;
    }
    let file_name = |path: &Path| {
        path.file_name()
            .map(|name| name.to_string_lossy().trim_end_matches(" (deleted)").to_string())
    };
    matches!(
        (file_name(candidate), file_name(own)),
        (Some(a), Some(b)) if a == b
    )
}

/// File holding the background monitor's PID as a decimal string
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn write(&self, pid: u32) -> Result<()> {
        fs::write(&self.path, pid.to_string())
            .with_context(|| format!("Failed to write PID file {}", self.path.display()))
    }

    pub fn read(&self) -> Result<u32> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read PID file {}", self.path.display()))?;
        content
            .trim()
            .parse()
            .with_context(|| format!("Invalid PID {:?} in {}", content.trim(), self.path.display()))
    }

    /// Delete the file; already gone counts as success
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e)
                .with_context(|| format!("Failed to remove PID file {}", self.path.display())),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// No PID file; nothing was attempted
    NotRunning,
    Stopped(u32),
    /// Termination (or reading the PID) failed; the PID file was still removed
    Failed { pid: Option<u32>, reason: String },
}

pub struct Controller<S, T> {
    pid_file: PidFile,
    spawner: S,
    terminator: T,
}

impl Controller<DetachedSpawner, SysinfoTerminator> {
    pub fn system(pid_file: PidFile) -> Self {
        Self::new(pid_file, DetachedSpawner, SysinfoTerminator)
    }
}

impl<S: Spawner, T: Terminator> Controller<S, T> {
    pub fn new(pid_file: PidFile, spawner: S, terminator: T) -> Self {
        Self {
            pid_file,
            spawner,
            terminator,
        }
    }

    /// Spawn the background monitor and record its PID
    pub fn start(&self) -> Result<u32> {
        if self.pid_file.exists() {
            warn!(path = %self.pid_file.path().display(), "Overwriting existing PID file");
        }
        let pid = self.spawner.spawn_detached(&[BACKGROUND_FLAG])?;
        self.pid_file.write(pid)?;
        info!(pid, "Started background monitor");
        Ok(pid)
    }

    /// Kill the recorded process. Once the PID file is found it is always removed.
    pub fn stop(&self) -> Result<StopOutcome> {
        if !self.pid_file.exists() {
            return Ok(StopOutcome::NotRunning);
        }
        defer! {
            if let Err(e) = self.pid_file.remove() {
                warn!(error = %format!("{:#}", e), "PID file cleanup failed");
            }
        }

        let pid = match self.pid_file.read() {
            Ok(pid) => pid,
            Err(e) => {
                return Ok(StopOutcome::Failed {
                    pid: None,
                    reason: format!("{:#}", e),
                })
            }
        };

        match self.terminator.terminate(pid) {
            Ok(()) => {
                info!(pid, "Stopped background monitor");
                Ok(StopOutcome::Stopped(pid))
            }
            Err(e) => {
                warn!(pid, error = %format!("{:#}", e), "Failed to stop background monitor");
                Ok(StopOutcome::Failed {
                    pid: Some(pid),
                    reason: format!("{:#}", e),
                })
            }
        }
    }
}
