//! Identity tracking for hardlink and symlink-cycle detection.

use std::fs::Metadata;

use dashmap::DashSet;
use sizemap_core::Identity;

/// Physical identity of the entry described by `metadata`, or `None` where
/// the platform has no stable device/inode pair.
#[cfg(unix)]
fn identity_of(metadata: &Metadata) -> Option<Identity> {
    use std::os::unix::fs::MetadataExt;
    Some(Identity::new(metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
fn identity_of(_metadata: &Metadata) -> Option<Identity> {
    None
}

/// Physical entries visited during one scan, keyed by (device, inode).
///
/// Reaching an entry a second time, through a hardlink or a symlink loop,
/// maps to an identity already in the set.
#[derive(Debug, Default)]
pub(crate) struct IdentityTracker {
    visited: DashSet<Identity>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the entry behind `metadata` as visited. Returns `false` if it was
    /// visited before. Entries without an identity always count as new.
    pub fn first_visit(&self, metadata: &Metadata) -> bool {
        match identity_of(metadata) {
            Some(identity) => self.visited.insert(identity),
            None => true,
        }
    }

    /// Distinct identities visited so far.
    pub fn len(&self) -> usize {
        self.visited.len()
    }
}
