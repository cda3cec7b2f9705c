//! Recursive binary-split treemap layout.
//!
//! Items are given an integer pixel area proportional to their size, sorted
//! largest first, and the canvas is cut in two along its longer side. The cut
//! index is the one whose two halves have the best worst-case aspect ratio;
//! each half is then laid out the same way. The result is deterministic for a
//! given input.

use std::cmp::Reverse;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::item::{Rectangle, SizedItem};

/// Canvas and spacing parameters for a layout.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct LayoutConfig {
    /// Canvas width in pixels.
    pub width: u32,

    /// Canvas height in pixels.
    pub height: u32,

    /// Margin kept free on every side of the canvas.
    #[builder(default = "0")]
    #[serde(default)]
    pub padding: u32,

    /// Pixels left empty between the two groups of every split.
    #[builder(default = "LayoutConfig::DEFAULT_GAP")]
    #[serde(default = "default_gap")]
    pub gap: u32,

    /// Smallest pixel area any placed item is given.
    #[builder(default = "LayoutConfig::DEFAULT_MIN_AREA")]
    #[serde(default = "default_min_area")]
    pub min_area: u64,
}

fn default_gap() -> u32 {
    LayoutConfig::DEFAULT_GAP
}

fn default_min_area() -> u64 {
    LayoutConfig::DEFAULT_MIN_AREA
}

impl LayoutConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.width == Some(0) || self.height == Some(0) {
            return Err("Canvas dimensions must be positive".to_string());
        }
        if self.min_area == Some(0) {
            return Err("min_area must be at least 1".to_string());
        }
        Ok(())
    }
}

impl LayoutConfig {
    pub const DEFAULT_GAP: u32 = 1;
    pub const DEFAULT_MIN_AREA: u64 = 10;

    /// Create a new layout config builder.
    pub fn builder() -> LayoutConfigBuilder {
        LayoutConfigBuilder::default()
    }

    /// Config with default gap and area floor.
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            width,
            height,
            padding,
            gap: Self::DEFAULT_GAP,
            min_area: Self::DEFAULT_MIN_AREA,
        }
    }

    /// Width and height left for rectangles once padding is removed.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.inner_cell().map_or((0, 0), |cell| (cell.w, cell.h))
    }

    /// Drawable region after removing the padding, or `None` for an empty
    /// canvas. Padding is reduced so at least one pixel remains each way.
    fn inner_cell(&self) -> Option<Cell> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let pad = self
            .padding
            .min((self.width - 1) / 2)
            .min((self.height - 1) / 2);
        Some(Cell {
            x: pad,
            y: pad,
            w: self.width - 2 * pad,
            h: self.height - 2 * pad,
        })
    }
}

/// Lay out `items` on a `width` x `height` canvas with default spacing.
pub fn layout<T>(
    items: Vec<SizedItem<T>>,
    width: u32,
    height: u32,
    padding: u32,
) -> Vec<Rectangle<T>> {
    TreemapLayout::new(width, height, padding).layout(items)
}

/// Treemap layout engine bound to one canvas configuration.
#[derive(Debug, Clone)]
pub struct TreemapLayout {
    config: LayoutConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

/// A contiguous range of sorted items and the cell it must fill.
#[derive(Debug, Clone, Copy)]
struct Task {
    start: usize,
    end: usize,
    cell: Cell,
}

impl TreemapLayout {
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        Self::with_config(LayoutConfig::new(width, height, padding))
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Place `items`, returning rectangles largest first.
    ///
    /// Items of size zero are skipped, and an empty or all-zero input yields
    /// no rectangles. Every other item appears at most once; an item is only
    /// dropped when the canvas has no pixel left to give it.
    pub fn layout<T>(&self, items: Vec<SizedItem<T>>) -> Vec<Rectangle<T>> {
        let Some(canvas) = self.config.inner_cell() else {
            return Vec::new();
        };

        let items: Vec<SizedItem<T>> = items.into_iter().filter(|i| i.size > 0).collect();
        let total_size: u128 = items.iter().map(|i| u128::from(i.size)).sum();
        if total_size == 0 {
            return Vec::new();
        }

        let scale = (f64::from(canvas.w) * f64::from(canvas.h)) / total_size as f64;
        let mut weighted: Vec<(SizedItem<T>, u64)> = items
            .into_iter()
            .map(|item| {
                let area = (item.size as f64 * scale).round() as u64;
                let area = area.max(self.config.min_area);
                (item, area)
            })
            .collect();
        // Stable: equal areas keep input order.
        weighted.sort_by_key(|(_, area)| Reverse(*area));

        let (items, areas): (Vec<_>, Vec<_>) = weighted.into_iter().unzip();
        let placements = self.partition(&areas, canvas);

        let placed: Vec<Rectangle<T>> = items
            .into_iter()
            .zip(placements)
            .filter_map(|(item, cell)| {
                cell.map(|c| Rectangle {
                    x: c.x,
                    y: c.y,
                    width: c.w,
                    height: c.h,
                    item,
                })
            })
            .collect();

        tracing::debug!(
            items = areas.len(),
            placed = placed.len(),
            width = self.config.width,
            height = self.config.height,
            "treemap layout complete"
        );
        placed
    }

    /// Assign a cell to every item index, working through an explicit stack
    /// of (range, cell) tasks.
    fn partition(&self, areas: &[u64], canvas: Cell) -> Vec<Option<Cell>> {
        let mut prefix = Vec::with_capacity(areas.len() + 1);
        prefix.push(0u128);
        for &area in areas {
            let last = prefix[prefix.len() - 1];
            prefix.push(last + u128::from(area));
        }

        let mut placements = vec![None; areas.len()];
        let mut stack = vec![Task {
            start: 0,
            end: areas.len(),
            cell: canvas,
        }];

        while let Some(Task { start, end, cell }) = stack.pop() {
            match end - start {
                0 => continue,
                1 => {
                    placements[start] = Some(cell);
                    continue;
                }
                _ => {}
            }

            let vertical = cell.w > cell.h;
            let extent = if vertical { cell.w } else { cell.h };
            if extent < 2 {
                // No room for a second group: the largest item takes the cell.
                tracing::trace!(
                    dropped = end - start - 1,
                    "cell too small to split, dropping remaining items"
                );
                placements[start] = Some(cell);
                continue;
            }

            let split = best_split(&prefix, start, end, cell);
            let total = prefix[end] - prefix[start];
            let first_area = prefix[split] - prefix[start];

            let first = (u128::from(extent) * first_area / total) as u32;
            let first = first.clamp(1, extent - 1);
            let gap = if extent - first > self.config.gap {
                self.config.gap
            } else {
                0
            };
            let second = extent - first - gap;

            let (first_cell, second_cell) = if vertical {
                (
                    Cell { w: first, ..cell },
                    Cell {
                        x: cell.x + first + gap,
                        w: second,
                        ..cell
                    },
                )
            } else {
                (
                    Cell { h: first, ..cell },
                    Cell {
                        y: cell.y + first + gap,
                        h: second,
                        ..cell
                    },
                )
            };

            stack.push(Task {
                start: split,
                end,
                cell: second_cell,
            });
            stack.push(Task {
                start,
                end: split,
                cell: first_cell,
            });
        }

        placements
    }
}

/// Pick the split index in `start+1..end` whose two projected halves have the
/// smallest worst aspect ratio. The first minimum wins.
fn best_split(prefix: &[u128], start: usize, end: usize, cell: Cell) -> usize {
    let vertical = cell.w > cell.h;
    let (extent, cross) = if vertical {
        (cell.w, cell.h)
    } else {
        (cell.h, cell.w)
    };
    let total = prefix[end] - prefix[start];

    let mut best = start + 1;
    let mut best_ratio = f64::INFINITY;
    for split in start + 1..end {
        let first_area = prefix[split] - prefix[start];
        let first = (u128::from(extent) * first_area / total) as u32;
        let second = extent - first;

        let ratio = if cross > 0 && first > 0 && second > 0 {
            aspect(first, cross).max(aspect(second, cross))
        } else {
            f64::INFINITY
        };
        if ratio < best_ratio {
            best_ratio = ratio;
            best = split;
        }
    }
    best
}

fn aspect(a: u32, b: u32) -> f64 {
    let (a, b) = (f64::from(a), f64::from(b));
    (a / b).max(b / a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix_of(areas: &[u128]) -> Vec<u128> {
        let mut prefix = vec![0];
        for a in areas {
            prefix.push(prefix[prefix.len() - 1] + a);
        }
        prefix
    }

    #[test]
    fn test_best_split_prefers_balanced_halves() {
        let cell = Cell { x: 0, y: 0, w: 1000, h: 800 };
        let prefix = prefix_of(&[480_000, 240_000, 80_000]);
        assert_eq!(best_split(&prefix, 0, 3, cell), 1);
    }

    #[test]
    fn test_best_split_tie_keeps_first() {
        // Both splits leave a 100x100 and a 300x100 half.
        let cell = Cell { x: 0, y: 0, w: 400, h: 100 };
        let prefix = prefix_of(&[100, 200, 100]);
        assert_eq!(best_split(&prefix, 0, 3, cell), 1);
    }

    #[test]
    fn test_padding_is_clamped() {
        let config = LayoutConfig::new(5, 3, 10);
        let cell = config.inner_cell().unwrap();
        assert_eq!(cell, Cell { x: 1, y: 1, w: 3, h: 1 });
    }

    #[test]
    fn test_empty_canvas() {
        assert!(LayoutConfig::new(0, 10, 0).inner_cell().is_none());
        assert_eq!(LayoutConfig::new(0, 10, 0).drawable_size(), (0, 0));
    }

    #[test]
    fn test_drawable_size_excludes_padding() {
        assert_eq!(LayoutConfig::new(1200, 800, 0).drawable_size(), (1200, 800));
        assert_eq!(LayoutConfig::new(1200, 800, 20).drawable_size(), (1160, 760));
        assert_eq!(LayoutConfig::new(5, 3, 10).drawable_size(), (3, 1));
    }

    #[test]
    fn test_config_builder() {
        let config = LayoutConfig::builder()
            .width(640u32)
            .height(480u32)
            .gap(0u32)
            .build()
            .unwrap();
        assert_eq!(config.padding, 0);
        assert_eq!(config.gap, 0);
        assert_eq!(config.min_area, LayoutConfig::DEFAULT_MIN_AREA);

        assert!(LayoutConfig::builder().width(0u32).height(10u32).build().is_err());
    }
}
