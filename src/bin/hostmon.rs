//! hostmon - minimal host monitoring daemon.
//!
//! `start` validates its arguments, detaches into the background and writes
//! one report block per poll cycle to the report log. `stop` reads the
//! pidfile and signals the recorded process to terminate.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use hostmon::collector::RealFs;
use hostmon::config::{self, RunConfig};
use hostmon::daemon::{self, DaemonError, PidFile};
use hostmon::poll::PollLoop;
use hostmon::report::ReportWriter;

#[derive(Parser)]
#[command(name = "hostmon", about = "Minimal host monitoring daemon", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Start the monitoring daemon.
    Start(StartArgs),
    /// Stop a running daemon.
    Stop {
        /// Pidfile recorded by `start`.
        #[arg(long, value_name = "PATH", default_value = config::DEFAULT_PID_PATH)]
        pid_file: PathBuf,
    },
}

#[derive(clap::Args)]
struct StartArgs {
    /// Monitored host address (IPv4). Recorded in the startup log.
    host: Ipv4Addr,

    /// Poll interval in seconds. Minimum 1.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Stay attached to the terminal instead of daemonizing.
    #[arg(long)]
    foreground: bool,

    /// Report sink.
    #[arg(long, value_name = "PATH", default_value = config::DEFAULT_REPORT_PATH)]
    report_log: PathBuf,

    /// System log tailed for error lines.
    #[arg(long, value_name = "PATH", default_value = config::DEFAULT_SYSLOG_PATH)]
    syslog: PathBuf,

    /// Partition whose usage is reported.
    #[arg(long, value_name = "PATH", default_value = config::DEFAULT_DISK_PATH)]
    disk_path: PathBuf,

    /// Pidfile location.
    #[arg(long, value_name = "PATH", default_value = config::DEFAULT_PID_PATH)]
    pid_file: PathBuf,

    /// Path to the proc filesystem (for testing/mocking).
    #[arg(long, value_name = "PATH", default_value = config::DEFAULT_PROC_PATH)]
    proc_path: PathBuf,
}

impl StartArgs {
    /// Paths are absolutized up front because daemonizing changes the
    /// working directory to `/`.
    fn into_config(self) -> RunConfig {
        RunConfig {
            host: self.host,
            interval: Duration::from_secs(self.interval),
            proc_path: absolutize(self.proc_path),
            disk_path: absolutize(self.disk_path),
            syslog_path: absolutize(self.syslog),
            report_path: absolutize(self.report_log),
            pid_path: absolutize(self.pid_file),
            foreground: self.foreground,
        }
    }
}

fn absolutize(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("hostmon={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Installs the SIGTERM/SIGINT handler and returns the shared run flag.
fn termination_flag() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set termination handler: {}", e);
    }

    running
}

fn run_start(config: RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Pre-fork check, so the refusal reaches the operator's terminal.
    // PidFile::create re-checks exclusively after the fork.
    if config.pid_path.exists() {
        return Err(Box::new(DaemonError::AlreadyRunning(config.pid_path)));
    }

    if !config.foreground {
        daemon::detach(&config.report_path)?;
    }

    let pid_file = PidFile::create(&config.pid_path)?;
    let running = termination_flag();

    info!("hostmon {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: host={}, interval={}s, disk={}, syslog={}, report={}",
        config.host,
        config.interval.as_secs(),
        config.disk_path.display(),
        config.syslog_path.display(),
        config.report_path.display()
    );
    info!("Pidfile at {}", pid_file.path().display());

    let writer = ReportWriter::open(&config.report_path)?;
    let mut poll = PollLoop::new(&config, RealFs::new(), writer, running);
    let result = poll.run();

    info!("hostmon stopped");
    result.map_err(Into::into)
}

fn run_stop(pid_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let pid = daemon::stop(pid_file)?;
    info!("Sent SIGTERM to daemon (pid {})", pid);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Start(args) => run_start(args.into_config()),
        Command::Stop { pid_file } => run_stop(&pid_file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hostmon: {}", e);
            ExitCode::FAILURE
        }
    }
}
