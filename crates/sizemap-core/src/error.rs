//! Error and warning types for scanning and streaming.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that prevent a scan from starting.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root does not exist, is unreadable, or is not a directory.
    #[error("Invalid scan root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// Scan limits failed validation.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScanError {
    /// Create an invalid-root error from the I/O failure that caused it.
    pub fn invalid_root(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        let reason = match source.kind() {
            std::io::ErrorKind::NotFound => "path does not exist".to_string(),
            std::io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => source.to_string(),
        };
        Self::InvalidRoot {
            path: path.into(),
            reason,
        }
    }

    /// Create an invalid-root error for a path that is not a directory.
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: "not a directory".to_string(),
        }
    }

    /// Whether the error concerns the scan root.
    pub fn is_invalid_root(&self) -> bool {
        matches!(self, Self::InvalidRoot { .. })
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error listing a directory.
    ReadError,
    /// Error reading metadata of a single entry.
    MetadataError,
}

/// An entry or directory that could not be accessed. The scan skips it and
/// continues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Warning for a directory whose listing failed.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::from_io(path, error, WarningKind::ReadError, "Read error")
    }

    /// Warning for an entry whose metadata could not be read.
    pub fn metadata_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::from_io(path, error, WarningKind::MetadataError, "Metadata error")
    }

    fn from_io(
        path: impl Into<PathBuf>,
        error: &std::io::Error,
        fallback: WarningKind,
        label: &str,
    ) -> Self {
        let path = path.into();
        if error.kind() == std::io::ErrorKind::PermissionDenied {
            return Self {
                message: format!("Permission denied: {}", path.display()),
                path,
                kind: WarningKind::PermissionDenied,
            };
        }
        Self {
            message: format!("{label}: {error}"),
            path,
            kind: fallback,
        }
    }
}

/// A batch sink failed to accept a delivery.
#[derive(Debug, Clone, Error)]
#[error("Batch delivery failed: {message}")]
pub struct DeliveryError {
    /// Human-readable reason.
    pub message: String,
}

impl DeliveryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_root_not_found() {
        let err = ScanError::invalid_root(
            "/missing",
            &std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_invalid_root());
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_permission_warning() {
        let warning = ScanWarning::read_error(
            "/test/path",
            &std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(warning.kind, WarningKind::PermissionDenied);
        assert!(warning.message.contains("Permission denied"));
    }

    #[test]
    fn test_metadata_warning() {
        let warning = ScanWarning::metadata_error(
            "/test/path",
            &std::io::Error::other("stale handle"),
        );
        assert_eq!(warning.kind, WarningKind::MetadataError);
        assert!(warning.message.contains("stale handle"));
    }
}
