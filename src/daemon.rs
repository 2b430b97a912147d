//! Daemon lifecycle: detaching, the pidfile, and the stop signal.
//!
//! The daemon records its process id in a plain-text pidfile. `stop` reads
//! it back and sends SIGTERM; the running daemon turns that signal into a
//! clean loop exit, and the `PidFile` guard removes the file on the way out
//! whatever the exit path was.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use daemonize::Daemonize;
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

/// Error type for daemon-lifecycle failures.
#[derive(Debug)]
pub enum DaemonError {
    /// A pidfile already exists; a daemon instance appears to be running.
    AlreadyRunning(PathBuf),
    /// `stop` found no daemon to signal.
    NotRunning,
    /// The pidfile exists but does not hold a decimal process id.
    InvalidPidFile(String),
    /// Forking into the background failed.
    Detach(String),
    /// Filesystem or signalling failure.
    Io(io::Error),
}

impl std::fmt::Display for DaemonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaemonError::AlreadyRunning(path) => {
                write!(f, "already running (pidfile {} exists)", path.display())
            }
            DaemonError::NotRunning => write!(f, "daemon not running"),
            DaemonError::InvalidPidFile(contents) => {
                write!(f, "pidfile does not contain a pid: {:?}", contents)
            }
            DaemonError::Detach(msg) => write!(f, "failed to detach: {}", msg),
            DaemonError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for DaemonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DaemonError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DaemonError {
    fn from(e: io::Error) -> Self {
        DaemonError::Io(e)
    }
}

/// Pidfile guard: written on creation, removed on drop, whichever exit path
/// drops it.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Records the current process id at `path`.
    ///
    /// Creation is exclusive: an existing file means another instance is
    /// (or crashed while) running.
    pub fn create(path: &Path) -> Result<Self, DaemonError> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(DaemonError::AlreadyRunning(path.to_path_buf()));
            }
            Err(e) => return Err(DaemonError::Io(e)),
        };
        writeln!(file, "{}", process::id())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Where the pid is recorded.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Forks the process into the background.
///
/// Detaches from the controlling terminal (double fork + setsid) and
/// redirects stdout/stderr into the report log, so anything the daemon
/// prints lands next to the reports. The parent process exits inside this
/// call; only the daemon returns.
pub fn detach(report_path: &Path) -> Result<(), DaemonError> {
    let stdout = OpenOptions::new()
        .append(true)
        .create(true)
        .open(report_path)?;
    let stderr = stdout.try_clone()?;

    Daemonize::new()
        .working_directory("/")
        .stdout(stdout)
        .stderr(stderr)
        .start()
        .map_err(|e| DaemonError::Detach(e.to_string()))
}

/// Signals the recorded daemon to terminate. Returns the signalled pid.
///
/// A missing pidfile means no daemon is running. A pidfile whose process is
/// gone is stale: it is removed so the next `start` succeeds, and the result
/// is still "not running".
pub fn stop(pid_path: &Path) -> Result<i32, DaemonError> {
    let contents = match fs::read_to_string(pid_path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(DaemonError::NotRunning),
        Err(e) => return Err(DaemonError::Io(e)),
    };

    let pid: i32 = contents
        .trim()
        .parse()
        .map_err(|_| DaemonError::InvalidPidFile(contents.trim().to_string()))?;

    match kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => Ok(pid),
        Err(Errno::ESRCH) => {
            let _ = fs::remove_file(pid_path);
            Err(DaemonError::NotRunning)
        }
        Err(e) => Err(DaemonError::Io(io::Error::from(e))),
    }
}
