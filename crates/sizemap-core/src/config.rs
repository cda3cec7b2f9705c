//! Scan limit configuration.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Bounds applied to a single scan invocation.
///
/// Depth and record limits are checked before each entry is processed, as is
/// the timeout. Crossing any of them ends the scan cleanly rather than
/// failing it.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanLimits {
    /// Deepest directory level that is still listed. The root is depth 0.
    #[builder(default = "ScanLimits::DEFAULT_MAX_DEPTH")]
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of records a scan yields.
    #[builder(default = "ScanLimits::DEFAULT_MAX_RECORDS")]
    #[serde(default = "default_max_records")]
    pub max_records: u64,

    /// Wall-clock budget for the whole scan.
    #[builder(default = "ScanLimits::DEFAULT_TIMEOUT")]
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Follow symbolic links instead of skipping them.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_max_depth() -> u32 {
    ScanLimits::DEFAULT_MAX_DEPTH
}

fn default_max_records() -> u64 {
    ScanLimits::DEFAULT_MAX_RECORDS
}

fn default_timeout() -> Duration {
    ScanLimits::DEFAULT_TIMEOUT
}

impl ScanLimitsBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_records == Some(0) {
            return Err("max_records must be at least 1".to_string());
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err("timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl From<ScanLimitsBuilderError> for ScanError {
    fn from(err: ScanLimitsBuilderError) -> Self {
        ScanError::InvalidConfig {
            message: err.to_string(),
        }
    }
}

impl ScanLimits {
    pub const DEFAULT_MAX_DEPTH: u32 = 8;
    pub const DEFAULT_MAX_RECORDS: u64 = 100_000;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    /// Create a new limits builder.
    pub fn builder() -> ScanLimitsBuilder {
        ScanLimitsBuilder::default()
    }

    /// Whether a directory recorded at `depth` may be listed.
    pub fn allows_descent(&self, depth: u32) -> bool {
        depth <= self.max_depth
    }
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_records: Self::DEFAULT_MAX_RECORDS,
            timeout: Self::DEFAULT_TIMEOUT,
            follow_symlinks: false,
        }
    }
}
