//! Bounded, cycle-safe depth-first directory walker.

use std::fs;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use sizemap_core::{FileRecord, ScanError, ScanLimits, ScanWarning};

use crate::batcher::RecordSink;
use crate::identity::IdentityTracker;
use crate::progress::{ProgressTracker, ScanProgress, ScanStatus};

/// Start a scan of `root` under `limits`.
///
/// The root is resolved to an absolute path and must be an existing
/// directory. Records are produced lazily as the returned [`Walk`] is
/// iterated.
pub fn scan(root: impl AsRef<Path>, limits: &ScanLimits) -> Result<Walk<'static>, ScanError> {
    Walk::new(root, limits.clone())
}

/// Start a scan whose records are also handed to `sink` before being
/// yielded.
pub fn scan_streaming<'a>(
    root: impl AsRef<Path>,
    limits: &ScanLimits,
    sink: &'a mut dyn RecordSink,
) -> Result<Walk<'a>, ScanError> {
    Ok(scan(root, limits)?.with_sink(sink))
}

/// State scoped to one scan: visited identities, counters and warnings.
#[derive(Debug)]
struct ScanSession {
    tracker: IdentityTracker,
    progress: ProgressTracker,
    warnings: Vec<ScanWarning>,
}

impl ScanSession {
    fn new() -> Self {
        Self {
            tracker: IdentityTracker::new(),
            progress: ProgressTracker::new(),
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, warning: ScanWarning) {
        tracing::debug!(
            path = %warning.path.display(),
            kind = ?warning.kind,
            "{}",
            warning.message
        );
        self.progress.record_error();
        self.warnings.push(warning);
    }

    /// Returns `false` if the entry behind `metadata` was already visited.
    fn first_visit(&mut self, path: &Path, metadata: &fs::Metadata) -> bool {
        let first = self.tracker.first_visit(metadata);
        if !first {
            tracing::trace!(path = %path.display(), "skipping already visited entry");
        }
        first
    }
}

/// Entries of one listed directory, consumed front to back.
#[derive(Debug)]
struct Frame {
    entries: std::vec::IntoIter<PathBuf>,
    depth: u32,
}

/// A lazy pre-order traversal of a directory tree.
///
/// Each call to `next` processes entries until one produces a record. A
/// directory's record is yielded before any of its children; the directory
/// itself is listed only when the walk resumes after yielding it.
pub struct Walk<'a> {
    root: PathBuf,
    limits: ScanLimits,
    session: ScanSession,
    stack: Vec<Frame>,
    pending_dir: Option<(PathBuf, u32)>,
    sink: Option<&'a mut dyn RecordSink>,
    status: ScanStatus,
}

/// Everything a finished walk produced.
#[derive(Debug)]
pub struct ScanReport {
    pub root: PathBuf,
    pub records: Vec<FileRecord>,
    pub status: ScanStatus,
    pub progress: ScanProgress,
    pub warnings: Vec<ScanWarning>,
}

impl ScanReport {
    /// Whether the scan stopped on a soft limit.
    pub fn is_truncated(&self) -> bool {
        self.status.is_truncated()
    }
}

impl Walk<'static> {
    /// Resolve `root` and prepare a walk over it.
    pub fn new(root: impl AsRef<Path>, limits: ScanLimits) -> Result<Self, ScanError> {
        let root = root.as_ref();
        let root_path = root
            .canonicalize()
            .map_err(|e| ScanError::invalid_root(root, &e))?;
        let metadata = fs::metadata(&root_path).map_err(|e| ScanError::invalid_root(&root_path, &e))?;
        if !metadata.is_dir() {
            return Err(ScanError::not_a_directory(root_path));
        }

        let mut session = ScanSession::new();
        // The root counts as visited so a symlink back to it is not followed.
        session.first_visit(&root_path, &metadata);

        tracing::info!(
            root = %root_path.display(),
            max_depth = limits.max_depth,
            max_records = limits.max_records,
            timeout_secs = limits.timeout.as_secs_f64(),
            follow_symlinks = limits.follow_symlinks,
            "starting scan"
        );

        Ok(Self {
            pending_dir: Some((root_path.clone(), 0)),
            root: root_path,
            limits,
            session,
            stack: Vec::new(),
            sink: None,
            status: ScanStatus::Running,
        })
    }
}

impl<'a> Walk<'a> {
    /// Hand every yielded record to `sink` before returning it.
    pub fn with_sink<'b>(self, sink: &'b mut dyn RecordSink) -> Walk<'b> {
        Walk {
            root: self.root,
            limits: self.limits,
            session: self.session,
            stack: self.stack,
            pending_dir: self.pending_dir,
            sink: Some(sink),
            status: self.status,
        }
    }

    /// Absolute, resolved scan root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current status; `Running` until the walk stops.
    pub fn status(&self) -> ScanStatus {
        self.status
    }

    /// Snapshot of the counters so far.
    pub fn progress(&self) -> ScanProgress {
        self.session.progress.snapshot()
    }

    /// Entries and directories that could not be read.
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.session.warnings
    }

    /// Drain the walk and collect everything it produced.
    pub fn into_report(mut self) -> ScanReport {
        let records: Vec<FileRecord> = self.by_ref().collect();
        ScanReport {
            root: self.root.clone(),
            records,
            status: self.status,
            progress: self.session.progress.snapshot(),
            warnings: std::mem::take(&mut self.session.warnings),
        }
    }

    fn finish(&mut self, status: ScanStatus) {
        self.status = status;
        self.stack.clear();
        self.pending_dir = None;

        let progress = self.session.progress.snapshot();
        match status {
            ScanStatus::TimedOut => tracing::warn!(
                records = progress.records_yielded,
                elapsed_secs = progress.elapsed.as_secs_f64(),
                "scan timeout"
            ),
            ScanStatus::RecordLimitReached => tracing::warn!(
                records = progress.records_yielded,
                "record limit reached"
            ),
            _ => tracing::info!(
                records = progress.records_yielded,
                files = progress.files_scanned,
                dirs = progress.dirs_scanned,
                bytes = progress.bytes_scanned,
                warnings = progress.errors_count,
                identities = self.session.tracker.len(),
                elapsed_secs = progress.elapsed.as_secs_f64(),
                "scan complete"
            ),
        }
    }

    /// The soft limit that has been crossed, if any.
    fn soft_limit(&self) -> Option<ScanStatus> {
        if self.session.progress.elapsed() > self.limits.timeout {
            Some(ScanStatus::TimedOut)
        } else if self.session.progress.records_yielded() >= self.limits.max_records {
            Some(ScanStatus::RecordLimitReached)
        } else {
            None
        }
    }

    /// List `dir` and push its entries. A listing failure keeps whatever was
    /// read before it and skips the rest.
    fn push_frame(&mut self, dir: PathBuf, depth: u32) {
        let read_dir = match fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(err) => {
                self.session.warn(ScanWarning::read_error(&dir, &err));
                return;
            }
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            match entry {
                Ok(entry) => entries.push(entry.path()),
                Err(err) => {
                    self.session.warn(ScanWarning::read_error(&dir, &err));
                    break;
                }
            }
        }
        // Sorted so repeated scans of an unchanged tree agree.
        entries.sort();

        self.stack.push(Frame {
            entries: entries.into_iter(),
            depth,
        });
    }

    /// Read one entry's metadata and turn it into a record, or `None` if it
    /// is skipped.
    fn visit(&mut self, path: &Path, depth: u32) -> Option<FileRecord> {
        let link_metadata = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(err) => {
                self.session.warn(ScanWarning::metadata_error(path, &err));
                return None;
            }
        };

        let is_symlink = link_metadata.file_type().is_symlink();
        if is_symlink && !self.limits.follow_symlinks {
            return None;
        }
        if !self.session.first_visit(path, &link_metadata) {
            return None;
        }

        let metadata = if is_symlink {
            match fs::metadata(path) {
                Ok(target) => {
                    if !self.session.first_visit(path, &target) {
                        return None;
                    }
                    target
                }
                Err(err) => {
                    self.session.warn(ScanWarning::metadata_error(path, &err));
                    return None;
                }
            }
        } else {
            link_metadata
        };

        let is_dir = metadata.is_dir();
        let size = metadata.len();
        if size == 0 && !is_dir {
            return None;
        }

        let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
        Some(FileRecord::new(path, size, is_dir, depth, modified))
    }
}

impl Iterator for Walk<'_> {
    type Item = FileRecord;

    fn next(&mut self) -> Option<FileRecord> {
        if self.status.is_finished() {
            return None;
        }
        if let Some((dir, depth)) = self.pending_dir.take() {
            if let Some(status) = self.soft_limit() {
                self.finish(status);
                return None;
            }
            self.push_frame(dir, depth);
        }

        loop {
            let next = match self.stack.last_mut() {
                Some(frame) => frame.entries.next().map(|path| (path, frame.depth + 1)),
                None => {
                    self.finish(ScanStatus::Completed);
                    return None;
                }
            };
            let Some((path, depth)) = next else {
                self.stack.pop();
                continue;
            };

            if let Some(status) = self.soft_limit() {
                self.finish(status);
                return None;
            }

            let Some(record) = self.visit(&path, depth) else {
                continue;
            };

            if record.is_dir {
                self.session.progress.record_dir(&record.path);
                if self.limits.allows_descent(record.depth) {
                    self.pending_dir = Some((record.path.clone(), record.depth));
                }
            } else {
                self.session.progress.record_file(&record.path, record.size);
            }

            if let Some(sink) = self.sink.as_mut() {
                sink.add_record(record.clone());
            }
            return Some(record);
        }
    }
}

impl FusedIterator for Walk<'_> {}
