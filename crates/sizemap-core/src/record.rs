//! File records and physical identities.

use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Physical identity of a filesystem entry, used to detect hardlinks and
/// symlink cycles regardless of the path that reached the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Device ID.
    pub device: u64,
    /// Inode number.
    pub inode: u64,
}

impl Identity {
    /// Create a new identity.
    pub fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }
}

/// A single discovered file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Size in bytes as reported by the entry's metadata.
    pub size: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Depth below the scan root; the root's children are depth 1.
    pub depth: u32,
    /// Last modification time.
    pub modified: SystemTime,
}

impl FileRecord {
    /// Create a new record.
    pub fn new(
        path: impl Into<PathBuf>,
        size: u64,
        is_dir: bool,
        depth: u32,
        modified: SystemTime,
    ) -> Self {
        Self {
            path: path.into(),
            size,
            is_dir,
            depth,
            modified,
        }
    }

    /// Create a file record.
    pub fn file(path: impl Into<PathBuf>, size: u64, depth: u32, modified: SystemTime) -> Self {
        Self::new(path, size, false, depth, modified)
    }

    /// Create a directory record.
    pub fn directory(path: impl Into<PathBuf>, size: u64, depth: u32, modified: SystemTime) -> Self {
        Self::new(path, size, true, depth, modified)
    }

    /// Final path component, lossily converted.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Whether the record is a regular file.
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }
}
