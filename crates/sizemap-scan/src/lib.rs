//! Directory scanning for sizemap.
//!
//! This crate walks a directory tree under resource bounds and streams the
//! discovered entries to consumers.
//!
//! # Overview
//!
//! - **Lazy pre-order traversal** via [`Walk`], an iterator backed by an
//!   explicit stack of listed directories
//! - **Hardlink and symlink-cycle detection** through (device, inode)
//!   identities, so no physical entry is yielded twice
//! - **Soft limits** on depth, record count and wall-clock time; crossing one
//!   ends the walk cleanly and is reported by [`ScanStatus`]
//! - **Streaming** through [`StreamingBatcher`], which delivers records to a
//!   [`BatchSink`] in time-windowed batches
//!
//! # Example
//!
//! ```rust,no_run
//! use sizemap_scan::{ScanLimits, scan};
//!
//! let limits = ScanLimits::builder().max_depth(4u32).build().unwrap();
//! let walk = scan("/path/to/scan", &limits).unwrap();
//! let report = walk.into_report();
//!
//! println!("{} records ({})", report.records.len(), report.status);
//! ```
//!
//! # Streaming
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use sizemap_scan::{DeliveryError, FileRecord, ScanLimits, StreamingBatcher, scan_streaming};
//!
//! let sink = |batch: &[FileRecord]| -> Result<(), DeliveryError> {
//!     println!("received {} records", batch.len());
//!     Ok(())
//! };
//! let mut batcher = StreamingBatcher::new(sink, Duration::from_millis(500));
//!
//! let walk = scan_streaming("/path/to/scan", &ScanLimits::default(), &mut batcher).unwrap();
//! let count = walk.count();
//! batcher.flush();
//! println!("{count} records");
//! ```

mod batcher;
mod identity;
mod progress;
mod walker;

pub use batcher::{
    BatchSink, BatcherStats, DEFAULT_UPDATE_INTERVAL, RecordSink, StreamingBatcher,
};
pub use progress::{ScanProgress, ScanStatus};
pub use walker::{ScanReport, Walk, scan, scan_streaming};

// Re-export core types for convenience
pub use sizemap_core::{
    DeliveryError, FileRecord, Identity, ScanError, ScanLimits, ScanWarning, WarningKind,
};
