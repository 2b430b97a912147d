//! Incremental error-line tailer for the monitored system log.
//!
//! Tracks a byte offset into the file and, on each poll, reads only what was
//! appended since the previous poll, keeping lines that mention "error".

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Substring that marks a log line as an error, matched case-insensitively.
/// Deliberately broad: "Errored" and "ERRORS" match too.
const ERROR_MARKER: &str = "error";

/// Reads new error lines appended to a log file since the last poll.
///
/// The offset starts at 0, so the first poll scans the entire existing file.
/// If the file shrinks below the stored offset (truncation or rotation), the
/// offset resets to 0 and the next read rescans from the start.
#[derive(Debug)]
pub struct LogTailer {
    path: PathBuf,
    offset: u64,
}

impl LogTailer {
    /// Creates a tailer positioned at the beginning of the file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
        }
    }

    /// Reads everything appended since the last poll and returns the lines
    /// that mention an error, trimmed, in file order.
    ///
    /// An unreadable file is an error; the caller treats it as fatal to the
    /// cycle.
    pub fn poll_new_error_lines(&mut self) -> io::Result<Vec<String>> {
        let metadata = fs::metadata(&self.path)?;
        if metadata.len() < self.offset {
            self.offset = 0;
        }

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.offset))?;

        let mut appended = String::new();
        let read = file.read_to_string(&mut appended)?;

        let matched = appended
            .lines()
            .filter(|line| line.to_lowercase().contains(ERROR_MARKER))
            .map(|line| line.trim().to_string())
            .collect();

        self.offset += read as u64;
        Ok(matched)
    }

    /// Byte position up to which the file has been scanned.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The tailed file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
