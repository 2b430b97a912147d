//! System metric sampling.
//!
//! The `Sampler` answers the three point-in-time questions the report needs:
//! how many processes exist, which ones hold the most memory, and how full
//! the watched partition is. All system access goes through the `FileSystem`
//! trait so every query can run against `MockFs` in tests.

pub mod mock;
pub mod procfs;
pub mod traits;

pub use mock::MockFs;
pub use traits::{DiskUsage, FileSystem, RealFs};

use std::io;
use std::path::{Path, PathBuf};

use procfs::{parse_mem_total_kb, parse_proc_status};

/// How many memory consumers a report lists.
pub const TOP_PROCESS_LIMIT: usize = 5;

/// Error type for sampling failures.
///
/// Any variant is fatal to the poll cycle; the loop makes no attempt to
/// retry or degrade.
#[derive(Debug)]
pub enum QueryError {
    /// The underlying system source could not be read.
    Io(io::Error),
    /// The source produced output we could not interpret.
    Parse(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Io(e) => write!(f, "query I/O error: {}", e),
            QueryError::Parse(msg) => write!(f, "query parse error: {}", msg),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Io(e) => Some(e),
            QueryError::Parse(_) => None,
        }
    }
}

impl From<io::Error> for QueryError {
    fn from(e: io::Error) -> Self {
        QueryError::Io(e)
    }
}

/// One entry of the top-memory ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct TopProcess {
    pub pid: u32,
    /// Resident set as a percentage of MemTotal.
    pub mem_percent: f64,
    /// Process name from `/proc/[pid]/status`.
    pub name: String,
}

/// Samples system metrics through a `FileSystem` implementation.
pub struct Sampler<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
    disk_path: PathBuf,
}

impl<F: FileSystem> Sampler<F> {
    /// Creates a new sampler.
    ///
    /// `proc_path` is the proc filesystem root (usually "/proc");
    /// `disk_path` selects the partition whose usage is reported.
    pub fn new(fs: F, proc_path: impl Into<PathBuf>, disk_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            disk_path: disk_path.into(),
        }
    }

    /// Numeric entries under the proc root, ascending.
    fn pids(&self) -> Result<Vec<u32>, QueryError> {
        let entries = self.fs.read_dir(&self.proc_path)?;
        let mut pids: Vec<u32> = entries
            .iter()
            .filter_map(|path| path.file_name()?.to_str()?.parse().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    /// Counts the processes currently present.
    pub fn process_count(&self) -> Result<u64, QueryError> {
        Ok(self.pids()?.len() as u64)
    }

    /// Ranks processes by resident memory, descending, at most `limit` deep.
    ///
    /// Equal percentages keep ascending-pid order (the scan order), matching
    /// what a stable ranking over the process table yields. A process that
    /// exits mid-scan is skipped, not an error.
    pub fn top_memory_processes(&self, limit: usize) -> Result<Vec<TopProcess>, QueryError> {
        let meminfo = self.fs.read_to_string(&self.proc_path.join("meminfo"))?;
        let mem_total_kb =
            parse_mem_total_kb(&meminfo).map_err(|e| QueryError::Parse(e.message))?;

        let mut processes = Vec::new();
        for pid in self.pids()? {
            let status_path = self.proc_path.join(pid.to_string()).join("status");
            let Ok(content) = self.fs.read_to_string(&status_path) else {
                continue;
            };
            let status = parse_proc_status(&content);
            let mem_percent = if mem_total_kb > 0 {
                status.vm_rss_kb as f64 * 100.0 / mem_total_kb as f64
            } else {
                0.0
            };
            processes.push(TopProcess {
                pid,
                mem_percent,
                name: status.name,
            });
        }

        processes.sort_by(|a, b| b.mem_percent.total_cmp(&a.mem_percent));
        processes.truncate(limit);
        Ok(processes)
    }

    /// Used percentage of the watched partition, computed the way `df` does:
    /// `used / (used + available)`, rounded up.
    ///
    /// Returns `Ok(None)` when the filesystem reports no data blocks at all
    /// (pseudo filesystems) - absence of a reading, not a failure.
    pub fn disk_used_percent(&self) -> Result<Option<u8>, QueryError> {
        let usage = self.fs.disk_usage(&self.disk_path)?;
        Ok(used_percent(usage))
    }

    /// The partition this sampler watches.
    pub fn disk_path(&self) -> &Path {
        &self.disk_path
    }
}

fn used_percent(usage: DiskUsage) -> Option<u8> {
    let used = usage.blocks.saturating_sub(usage.blocks_free);
    let reachable = used + usage.blocks_available;
    if reachable == 0 {
        return None;
    }
    let percent = (used * 100).div_ceil(reachable);
    Some(percent.min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typical_fs() -> MockFs {
        let mut fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal:       1000000 kB\nMemFree: 1 kB\n");
        fs.add_process(1, "init", 10_000);
        fs.add_process(42, "postgres", 250_000);
        fs.add_process(43, "chrome", 500_000);
        fs.add_process(99, "sshd", 10_000);
        fs
    }

    #[test]
    fn process_count_counts_numeric_dirs() {
        let mut fs = typical_fs();
        // Non-numeric entries are not processes.
        fs.add_dir("/proc/sys");
        fs.add_file("/proc/uptime", "100 200");

        let sampler = Sampler::new(fs, "/proc", "/var");
        assert_eq!(sampler.process_count().unwrap(), 4);
    }

    #[test]
    fn process_count_fails_without_proc() {
        let sampler = Sampler::new(MockFs::new(), "/proc", "/var");
        assert!(matches!(
            sampler.process_count(),
            Err(QueryError::Io(_))
        ));
    }

    #[test]
    fn top_memory_sorted_descending() {
        let sampler = Sampler::new(typical_fs(), "/proc", "/var");
        let top = sampler.top_memory_processes(TOP_PROCESS_LIMIT).unwrap();

        assert_eq!(top.len(), 4);
        assert_eq!(top[0].name, "chrome");
        assert_eq!(top[1].name, "postgres");
        assert!((top[0].mem_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn top_memory_truncates_to_limit() {
        let mut fs = typical_fs();
        fs.add_process(100, "a", 1);
        fs.add_process(101, "b", 2);
        fs.add_process(102, "c", 3);

        let sampler = Sampler::new(fs, "/proc", "/var");
        let top = sampler.top_memory_processes(TOP_PROCESS_LIMIT).unwrap();
        assert_eq!(top.len(), TOP_PROCESS_LIMIT);
    }

    #[test]
    fn top_memory_ties_keep_pid_order() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal: 1000 kB\n");
        fs.add_process(30, "late", 100);
        fs.add_process(10, "early", 100);
        fs.add_process(20, "middle", 100);

        let sampler = Sampler::new(fs, "/proc", "/var");
        let top = sampler.top_memory_processes(TOP_PROCESS_LIMIT).unwrap();
        let pids: Vec<u32> = top.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![10, 20, 30]);
    }

    #[test]
    fn top_memory_requires_mem_total() {
        let mut fs = typical_fs();
        fs.add_file("/proc/meminfo", "MemFree: 1 kB\n");

        let sampler = Sampler::new(fs, "/proc", "/var");
        assert!(matches!(
            sampler.top_memory_processes(TOP_PROCESS_LIMIT),
            Err(QueryError::Parse(_))
        ));
    }

    #[test]
    fn disk_percent_rounds_up_like_df() {
        let mut fs = typical_fs();
        // used = 40, available = 50 -> 40/90 = 44.4% -> df reports 45%.
        fs.add_disk(
            "/var",
            DiskUsage {
                blocks: 100,
                blocks_free: 60,
                blocks_available: 50,
            },
        );

        let sampler = Sampler::new(fs, "/proc", "/var");
        assert_eq!(sampler.disk_used_percent().unwrap(), Some(45));
    }

    #[test]
    fn disk_percent_absent_for_pseudo_fs() {
        let mut fs = typical_fs();
        fs.add_disk("/var", DiskUsage::default());

        let sampler = Sampler::new(fs, "/proc", "/var");
        assert_eq!(sampler.disk_used_percent().unwrap(), None);
    }

    #[test]
    fn disk_percent_io_error_is_hard_failure() {
        let sampler = Sampler::new(typical_fs(), "/proc", "/var");
        assert!(matches!(
            sampler.disk_used_percent(),
            Err(QueryError::Io(_))
        ));
    }

    #[test]
    fn disk_percent_full_clamps_to_100() {
        let mut fs = typical_fs();
        fs.add_disk(
            "/var",
            DiskUsage {
                blocks: 100,
                blocks_free: 0,
                blocks_available: 0,
            },
        );

        let sampler = Sampler::new(fs, "/proc", "/var");
        assert_eq!(sampler.disk_used_percent().unwrap(), Some(100));
    }
}
