//! Per-cycle snapshot model.

use chrono::{DateTime, Local};

use crate::collector::TopProcess;

/// Everything one poll cycle observed, captured once and then rendered.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Wall-clock capture time, second precision in the report.
    pub timestamp: DateTime<Local>,
    /// Total number of processes.
    pub process_count: u64,
    /// Up to five processes, descending by memory share.
    pub top_memory: Vec<TopProcess>,
    /// Used percentage of the watched partition; `None` when the reading
    /// is unavailable (soft-fail).
    pub disk_used_percent: Option<u8>,
    /// Error lines appended to the system log since the previous cycle.
    pub new_error_lines: Vec<String>,
}
