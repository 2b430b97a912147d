//! hostmon - minimal host monitoring daemon library.
//!
//! Samples the process count, the top memory consumers, disk usage on one
//! partition and new error lines appended to the system log, and writes a
//! timestamped report block per cycle to an append-only log file. The
//! `hostmon` binary runs this loop as a detached background process
//! controlled by `start`/`stop`.

pub mod collector;
pub mod config;
pub mod daemon;
pub mod delta;
pub mod poll;
pub mod report;
pub mod sample;
pub mod tailer;
