//! Scan progress reporting and termination status.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Why a scan stopped producing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Records are still being produced.
    Running,
    /// Every reachable entry within the depth limit was visited.
    Completed,
    /// The wall-clock budget ran out.
    TimedOut,
    /// The record cap was reached.
    RecordLimitReached,
}

impl ScanStatus {
    /// Whether the scan stopped on a soft limit before visiting everything.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TimedOut | Self::RecordLimitReached)
    }

    /// Whether the scan has stopped for any reason.
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::TimedOut => "timed out",
            Self::RecordLimitReached => "record limit reached",
        };
        f.write_str(label)
    }
}

/// Progress information during a scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanProgress {
    /// Number of records yielded so far.
    pub records_yielded: u64,
    /// Number of file records yielded so far.
    pub files_scanned: u64,
    /// Number of directory records yielded so far.
    pub dirs_scanned: u64,
    /// Total bytes of file records yielded so far.
    pub bytes_scanned: u64,
    /// Path of the most recent record.
    pub current_path: PathBuf,
    /// Number of entries or directories that could not be read.
    pub errors_count: u64,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            records_yielded: 0,
            files_scanned: 0,
            dirs_scanned: 0,
            bytes_scanned: 0,
            current_path: PathBuf::new(),
            errors_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scan rate in records per second.
    pub fn records_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.records_yielded as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Running counters owned by a scan session.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    records_yielded: u64,
    files_scanned: u64,
    dirs_scanned: u64,
    bytes_scanned: u64,
    errors_count: u64,
    current_path: PathBuf,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            records_yielded: 0,
            files_scanned: 0,
            dirs_scanned: 0,
            bytes_scanned: 0,
            errors_count: 0,
            current_path: PathBuf::new(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn records_yielded(&self) -> u64 {
        self.records_yielded
    }

    pub fn record_file(&mut self, path: &std::path::Path, size: u64) {
        self.records_yielded += 1;
        self.files_scanned += 1;
        self.bytes_scanned += size;
        self.current_path = path.to_path_buf();
    }

    pub fn record_dir(&mut self, path: &std::path::Path) {
        self.records_yielded += 1;
        self.dirs_scanned += 1;
        self.current_path = path.to_path_buf();
    }

    pub fn record_error(&mut self) {
        self.errors_count += 1;
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            records_yielded: self.records_yielded,
            files_scanned: self.files_scanned,
            dirs_scanned: self.dirs_scanned,
            bytes_scanned: self.bytes_scanned,
            current_path: self.current_path.clone(),
            errors_count: self.errors_count,
            elapsed: self.start_time.elapsed(),
        }
    }
}
