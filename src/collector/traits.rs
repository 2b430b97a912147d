//! Abstractions for system access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the sampler to read from the real `/proc`
//! filesystem and partition table, or from an in-memory mock in tests.

use std::io;
use std::path::{Path, PathBuf};

/// Raw block counts for a mounted filesystem, as reported by `statvfs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskUsage {
    /// Total blocks on the filesystem.
    pub blocks: u64,
    /// Free blocks (including the root-reserved share).
    pub blocks_free: u64,
    /// Blocks available to unprivileged users.
    pub blocks_available: u64,
}

/// Abstraction for the system queries the sampler performs.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Returns block counts for the filesystem containing `path`.
    fn disk_usage(&self, path: &Path) -> io::Result<DiskUsage>;
}

/// Real implementation that delegates to `std::fs` and `statvfs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    fn disk_usage(&self, path: &Path) -> io::Result<DiskUsage> {
        let vfs = nix::sys::statvfs::statvfs(path).map_err(io::Error::from)?;
        Ok(DiskUsage {
            blocks: vfs.blocks() as u64,
            blocks_free: vfs.blocks_free() as u64,
            blocks_available: vfs.blocks_available() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn real_fs_read_to_string() {
        let fs = RealFs::new();
        let cargo_toml = env::current_dir().unwrap().join("Cargo.toml");
        let content = fs.read_to_string(&cargo_toml).unwrap();
        assert!(content.contains("[package]"));
    }

    #[test]
    fn real_fs_exists() {
        let fs = RealFs::new();
        let cargo_toml = env::current_dir().unwrap().join("Cargo.toml");
        assert!(fs.exists(&cargo_toml));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }

    #[test]
    fn real_fs_read_dir() {
        let fs = RealFs::new();
        let src_dir = env::current_dir().unwrap().join("src");
        let entries = fs.read_dir(&src_dir).unwrap();
        assert!(!entries.is_empty());
    }

    #[test]
    fn real_fs_disk_usage_reports_blocks() {
        let fs = RealFs::new();
        let usage = fs.disk_usage(Path::new("/")).unwrap();
        assert!(usage.blocks > 0);
        assert!(usage.blocks_free <= usage.blocks);
    }
}
