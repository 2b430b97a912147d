//! The sampling loop: one report block per cycle, forever.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Local;
use tracing::debug;

use crate::collector::{FileSystem, QueryError, Sampler, TOP_PROCESS_LIMIT};
use crate::config::RunConfig;
use crate::delta::DeltaTracker;
use crate::report::{ReportWriter, render_report};
use crate::sample::Sample;
use crate::tailer::LogTailer;

/// Granularity at which the sleep between cycles checks the stop flag.
const SHUTDOWN_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Error produced by a poll cycle.
///
/// Every cycle failure is fatal to the daemon; this enum is the single point
/// through which sampling and I/O failures leave the loop.
#[derive(Debug)]
pub enum PollError {
    /// A metric query failed.
    Query(QueryError),
    /// The log tail or the report sink failed.
    Io(io::Error),
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::Query(e) => write!(f, "{}", e),
            PollError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PollError::Query(e) => Some(e),
            PollError::Io(e) => Some(e),
        }
    }
}

impl From<QueryError> for PollError {
    fn from(e: QueryError) -> Self {
        PollError::Query(e)
    }
}

impl From<io::Error> for PollError {
    fn from(e: io::Error) -> Self {
        PollError::Io(e)
    }
}

/// Drives the sample / delta / tail / report cycle at a fixed interval.
///
/// Owns all mutable per-cycle state (delta trackers, tail offset). The only
/// cross-thread state is the stop flag.
pub struct PollLoop<F: FileSystem> {
    sampler: Sampler<F>,
    tailer: LogTailer,
    writer: ReportWriter,
    process_tracker: DeltaTracker,
    disk_tracker: DeltaTracker,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl<F: FileSystem> PollLoop<F> {
    /// Wires a loop from the run configuration.
    pub fn new(
        config: &RunConfig,
        fs: F,
        writer: ReportWriter,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            sampler: Sampler::new(fs, &config.proc_path, &config.disk_path),
            tailer: LogTailer::new(&config.syslog_path),
            writer,
            process_tracker: DeltaTracker::new(),
            disk_tracker: DeltaTracker::new(),
            interval: config.interval,
            running,
        }
    }

    /// Runs cycles until the stop flag clears or a cycle fails.
    pub fn run(&mut self) -> Result<(), PollError> {
        while self.running.load(Ordering::SeqCst) {
            self.run_cycle()?;
            self.wait_interval();
        }
        Ok(())
    }

    /// Executes exactly one cycle.
    ///
    /// Step order is fixed: process count (and its delta), top-memory
    /// ranking, disk usage (delta only when a reading is present), then the
    /// log tail, then the report. Each tracker advances at most once per
    /// cycle.
    pub fn run_cycle(&mut self) -> Result<(), PollError> {
        let timestamp = Local::now();

        let process_count = self.sampler.process_count()?;
        let process_delta = self.process_tracker.observe(process_count as i64);

        let top_memory = self.sampler.top_memory_processes(TOP_PROCESS_LIMIT)?;

        let disk_used_percent = self.sampler.disk_used_percent()?;
        let disk_delta = disk_used_percent.map(|p| self.disk_tracker.observe(i64::from(p)));

        let new_error_lines = self.tailer.poll_new_error_lines()?;
        debug!(
            "cycle: {} processes, {} new error lines, tail offset {}",
            process_count,
            new_error_lines.len(),
            self.tailer.offset()
        );

        let sample = Sample {
            timestamp,
            process_count,
            top_memory,
            disk_used_percent,
            new_error_lines,
        };

        let block = render_report(&sample, process_delta, disk_delta, self.sampler.disk_path());
        self.writer.append(&block)?;
        Ok(())
    }

    /// Sleeps for the configured interval in short slices so a stop request
    /// abandons the remaining wait instead of finishing it.
    fn wait_interval(&self) {
        let mut remaining = self.interval;
        while remaining > Duration::ZERO && self.running.load(Ordering::SeqCst) {
            let slice = remaining.min(SHUTDOWN_CHECK_INTERVAL);
            std::thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}
