//! Immutable run configuration, assembled once at startup.
//!
//! All paths the daemon touches live here and are passed explicitly to the
//! components that need them; there is no module-level mutable state.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

/// Default pidfile location.
pub const DEFAULT_PID_PATH: &str = "/var/run/hostmon.pid";
/// Default report sink.
pub const DEFAULT_REPORT_PATH: &str = "/var/log/hostmon.log";
/// Default monitored system log.
pub const DEFAULT_SYSLOG_PATH: &str = "/var/log/syslog";
/// Default partition to watch for disk usage.
pub const DEFAULT_DISK_PATH: &str = "/var";
/// Default proc filesystem root.
pub const DEFAULT_PROC_PATH: &str = "/proc";

/// Run parameters, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Monitored host address. Recorded in the startup log; the sampling
    /// logic itself is local-only.
    pub host: Ipv4Addr,
    /// Poll interval, whole seconds, at least 1.
    pub interval: Duration,
    /// Proc filesystem root (overridable for testing).
    pub proc_path: PathBuf,
    /// Partition whose usage is reported.
    pub disk_path: PathBuf,
    /// System log tailed for error lines.
    pub syslog_path: PathBuf,
    /// Append-only report sink.
    pub report_path: PathBuf,
    /// Pidfile recording the daemon's process id.
    pub pid_path: PathBuf,
    /// Stay attached to the terminal instead of daemonizing.
    pub foreground: bool,
}
