//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions over string input, so they can be tested without
//! a live `/proc`.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// The fields of `/proc/[pid]/status` the sampler cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcStatus {
    pub name: String,
    pub vm_rss_kb: u64,
}

/// Parses `/proc/[pid]/status` content.
///
/// Format is `Key:\tvalue` pairs, one per line. Missing fields default:
/// kernel threads carry no `VmRSS` and report 0.
pub fn parse_proc_status(content: &str) -> ProcStatus {
    let mut status = ProcStatus::default();

    for line in content.lines() {
        if let Some((key, value)) = line.split_once(':') {
            match key.trim() {
                "Name" => status.name = value.trim().to_string(),
                // Memory fields are in kB format: "12345 kB"
                "VmRSS" => {
                    status.vm_rss_kb = value
                        .split_whitespace()
                        .next()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(0);
                }
                _ => {}
            }
        }
    }

    status
}

/// Parses the `MemTotal` line out of `/proc/meminfo` content.
///
/// Unlike the per-process status parse this is strict: without a total,
/// memory percentages cannot be computed at all.
pub fn parse_mem_total_kb(content: &str) -> Result<u64, ParseError> {
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            return rest
                .split_whitespace()
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| ParseError::new("invalid MemTotal value"));
        }
    }
    Err(ParseError::new("MemTotal not found in meminfo"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_name_and_rss() {
        let content = "Name:\tfirefox\nUmask:\t0022\nPid:\t4242\nVmPeak:\t  201000 kB\nVmRSS:\t    8000 kB\n";
        let status = parse_proc_status(content);
        assert_eq!(status.name, "firefox");
        assert_eq!(status.vm_rss_kb, 8000);
    }

    #[test]
    fn parse_status_kernel_thread_has_no_rss() {
        let content = "Name:\tkworker/0:1\nPid:\t17\n";
        let status = parse_proc_status(content);
        assert_eq!(status.name, "kworker/0:1");
        assert_eq!(status.vm_rss_kb, 0);
    }

    #[test]
    fn parse_status_garbage_defaults() {
        let status = parse_proc_status("not a status file at all");
        assert_eq!(status, ProcStatus::default());
    }

    #[test]
    fn parse_mem_total() {
        let content = "MemTotal:       16384000 kB\nMemFree:         1024000 kB\n";
        assert_eq!(parse_mem_total_kb(content).unwrap(), 16384000);
    }

    #[test]
    fn parse_mem_total_missing_is_error() {
        let err = parse_mem_total_kb("MemFree: 12 kB\n").unwrap_err();
        assert!(err.message.contains("MemTotal"));
    }

    #[test]
    fn parse_mem_total_non_numeric_is_error() {
        assert!(parse_mem_total_kb("MemTotal: lots kB\n").is_err());
    }
}
