//! Layout inputs and outputs.

use serde::{Deserialize, Serialize};
use sizemap_core::FileRecord;

/// A weighted item to place on the canvas. The payload is carried through
/// the layout untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizedItem<T> {
    pub payload: T,
    /// Weight in bytes. Items of size zero are never placed.
    pub size: u64,
}

impl<T> SizedItem<T> {
    pub fn new(payload: T, size: u64) -> Self {
        Self { payload, size }
    }
}

impl SizedItem<FileRecord> {
    /// Turn scan records into layout items, keeping only non-empty files.
    ///
    /// Directories are dropped: their size is the directory entry itself,
    /// not the data below it.
    pub fn from_records(records: impl IntoIterator<Item = FileRecord>) -> Vec<Self> {
        records
            .into_iter()
            .filter(|r| r.is_file() && r.size > 0)
            .map(|r| {
                let size = r.size;
                Self::new(r, size)
            })
            .collect()
    }
}

/// A placed item. Coordinates are canvas pixels with the origin at the top
/// left; `width` and `height` are at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle<T> {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub item: SizedItem<T>,
}

impl<T> Rectangle<T> {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the interiors of the two rectangles overlap.
    pub fn intersects<U>(&self, other: &Rectangle<U>) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn payload(&self) -> &T {
        &self.item.payload
    }
}
