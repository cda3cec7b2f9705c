//! Treemap layout for sizemap.
//!
//! Turns a list of sized items into non-overlapping, size-proportional
//! rectangles on a fixed canvas. The engine is a pure function of its inputs
//! and can be called from any thread.
//!
//! # Example
//!
//! ```rust
//! use sizemap_layout::{SizedItem, layout};
//!
//! let items = vec![
//!     SizedItem::new("a", 600),
//!     SizedItem::new("b", 300),
//!     SizedItem::new("c", 100),
//! ];
//! let rects = layout(items, 1000, 800, 0);
//!
//! assert_eq!(rects.len(), 3);
//! assert_eq!(*rects[0].payload(), "a");
//! assert_eq!((rects[0].width, rects[0].height), (600, 800));
//! ```

mod item;
mod treemap;

pub use item::{Rectangle, SizedItem};
pub use treemap::{LayoutConfig, LayoutConfigBuilder, TreemapLayout, layout};
