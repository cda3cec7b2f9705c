//! Core types for sizemap.
//!
//! This crate provides the data shared by the scanner and the layout engine:
//! file records, physical identities, scan limits, and the error taxonomy.

mod config;
mod error;
mod record;

pub use config::{ScanLimits, ScanLimitsBuilder, ScanLimitsBuilderError};
pub use error::{DeliveryError, ScanError, ScanWarning, WarningKind};
pub use record::{FileRecord, Identity};
