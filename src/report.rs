//! Report rendering and the append-only sink.
//!
//! Each poll cycle produces one fixed-layout text block:
//!
//! ```text
//! 2026-08-05-14:03:07
//! -------------------
//! current number of process: 213 and increase/decrease: +2
//! top 5 process by memory usage:
//!     1234  5.2 chrome
//!     ...
//! disk space usage in /var: 42% and increase/decrease: +1%
//! ERROR disk full
//!
//! ```
//!
//! The block ends with a blank line so consecutive reports stay separated
//! when the sink is tailed live.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::sample::Sample;

/// Timestamp layout used for the report header.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

const SEPARATOR: &str = "-------------------";

/// Renders one cycle's sample into the fixed report layout.
///
/// `disk_delta` mirrors `sample.disk_used_percent`: both present or both
/// absent. When absent the disk line is omitted entirely, no placeholder.
pub fn render_report(
    sample: &Sample,
    process_delta: i64,
    disk_delta: Option<i64>,
    disk_path: &Path,
) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{}\n{}\n",
        sample.timestamp.format(TIMESTAMP_FORMAT),
        SEPARATOR
    ));
    out.push_str(&format!(
        "current number of process: {} and increase/decrease: {:+}\n",
        sample.process_count, process_delta
    ));

    out.push_str("top 5 process by memory usage:\n");
    for process in &sample.top_memory {
        out.push_str(&format!(
            "\t{:>5} {:>4.1} {}\n",
            process.pid, process.mem_percent, process.name
        ));
    }

    if let (Some(percent), Some(delta)) = (sample.disk_used_percent, disk_delta) {
        out.push_str(&format!(
            "disk space usage in {}: {}% and increase/decrease: {:+}%\n",
            disk_path.display(),
            percent,
            delta
        ));
    }

    for line in &sample.new_error_lines {
        out.push_str(line);
        out.push('\n');
    }

    out.push('\n');
    out
}

/// Append-only writer over the report sink.
pub struct ReportWriter {
    file: File,
}

impl ReportWriter {
    /// Opens the sink for appending, creating it if needed.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        Ok(Self { file })
    }

    /// Appends one report block and flushes, so an operator tailing the file
    /// sees the cycle immediately.
    pub fn append(&mut self, block: &str) -> io::Result<()> {
        self.file.write_all(block.as_bytes())?;
        self.file.flush()
    }
}
