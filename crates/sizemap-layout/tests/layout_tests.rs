use sizemap_core::FileRecord;
use sizemap_layout::{LayoutConfig, Rectangle, SizedItem, TreemapLayout, layout};
use std::time::SystemTime;

/// Deterministic pseudo-random sizes (64-bit LCG).
fn sizes(seed: u64, count: usize) -> Vec<u64> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            1 + (state >> 33) % 1_000_000
        })
        .collect()
}

fn items(sizes: &[u64]) -> Vec<SizedItem<usize>> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| SizedItem::new(i, size))
        .collect()
}

fn assert_well_formed<T>(rects: &[Rectangle<T>], width: u32, height: u32) {
    for r in rects {
        assert!(r.width >= 1 && r.height >= 1);
        assert!(r.right() <= width, "right edge {} > {width}", r.right());
        assert!(r.bottom() <= height, "bottom edge {} > {height}", r.bottom());
    }
    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            assert!(!a.intersects(b));
        }
    }
}

#[test]
fn test_three_item_scenario() {
    let rects = layout(
        vec![
            SizedItem::new("a", 600),
            SizedItem::new("b", 300),
            SizedItem::new("c", 100),
        ],
        1000,
        800,
        0,
    );

    let placed: Vec<_> = rects
        .iter()
        .map(|r| (*r.payload(), r.x, r.y, r.width, r.height))
        .collect();
    assert_eq!(
        placed,
        vec![
            ("a", 0, 0, 600, 800),
            ("b", 601, 0, 399, 600),
            ("c", 601, 601, 399, 199),
        ]
    );
}

#[test]
fn test_empty_and_zero_input() {
    assert!(layout(Vec::<SizedItem<()>>::new(), 1000, 800, 0).is_empty());
    assert!(layout(vec![SizedItem::new((), 0)], 1000, 800, 0).is_empty());
    assert!(layout(vec![SizedItem::new((), 0), SizedItem::new((), 0)], 1000, 800, 0).is_empty());
}

#[test]
fn test_single_item_fills_canvas() {
    let rects = layout(vec![SizedItem::new("only", 42)], 640, 480, 0);
    assert_eq!(rects.len(), 1);
    assert_eq!((rects[0].x, rects[0].y), (0, 0));
    assert_eq!((rects[0].width, rects[0].height), (640, 480));
}

#[test]
fn test_zero_sized_items_are_skipped() {
    let rects = layout(
        vec![SizedItem::new("empty", 0), SizedItem::new("full", 10)],
        100,
        100,
        0,
    );
    assert_eq!(rects.len(), 1);
    assert_eq!(*rects[0].payload(), "full");
}

#[test]
fn test_equal_sizes_keep_input_order() {
    let rects = layout(
        vec![SizedItem::new("first", 5), SizedItem::new("second", 5)],
        100,
        100,
        0,
    );
    assert_eq!(*rects[0].payload(), "first");
    assert_eq!((rects[0].x, rects[0].y, rects[0].width, rects[0].height), (0, 0, 100, 50));
    assert_eq!(*rects[1].payload(), "second");
    assert_eq!((rects[1].x, rects[1].y, rects[1].width, rects[1].height), (0, 51, 100, 49));
}

#[test]
fn test_tiny_item_stays_visible_and_in_bounds() {
    let rects = layout(
        vec![SizedItem::new("big", 1_000_000), SizedItem::new("tiny", 1)],
        100,
        100,
        0,
    );
    assert_eq!(rects.len(), 2);
    assert_eq!(*rects[1].payload(), "tiny");
    assert_eq!((rects[1].y, rects[1].height), (99, 1));
    assert_well_formed(&rects, 100, 100);
}

#[test]
fn test_no_overlap_and_within_bounds() {
    for (seed, count, width, height) in [
        (1, 10, 1000, 800),
        (7, 100, 1200, 800),
        (42, 500, 1920, 1080),
        (99, 50, 300, 1000),
        (5, 200, 64, 48),
    ] {
        let rects = layout(items(&sizes(seed, count)), width, height, 0);
        assert!(!rects.is_empty());
        assert_well_formed(&rects, width, height);
    }
}

#[test]
fn test_every_item_placed_at_most_once() {
    let input = sizes(3, 300);
    let rects = layout(items(&input), 1200, 800, 0);

    let mut ids: Vec<usize> = rects.iter().map(|r| *r.payload()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), rects.len());
    assert_eq!(rects.len(), input.len());

    for r in &rects {
        assert_eq!(r.item.size, input[*r.payload()]);
    }
}

#[test]
fn test_layout_is_deterministic() {
    let input = sizes(11, 250);
    let first = layout(items(&input), 1200, 800, 0);
    let second = layout(items(&input), 1200, 800, 0);
    assert_eq!(first, second);
}

#[test]
fn test_rectangles_sorted_largest_first() {
    let rects = layout(items(&[10, 500, 200, 50]), 800, 600, 0);
    let ids: Vec<usize> = rects.iter().map(|r| *r.payload()).collect();
    assert_eq!(ids, vec![1, 2, 3, 0]);
}

#[test]
fn test_padding_insets_canvas() {
    let rects = layout(items(&sizes(8, 40)), 500, 400, 10);
    for r in &rects {
        assert!(r.x >= 10 && r.y >= 10);
        assert!(r.right() <= 490 && r.bottom() <= 390);
    }
    assert_well_formed(&rects, 500, 400);
}

#[test]
fn test_tiny_canvas_never_overflows() {
    let rects = layout(items(&[5, 4, 3, 2, 1]), 2, 1, 0);
    assert!(!rects.is_empty());
    assert!(rects.len() <= 2);
    assert_well_formed(&rects, 2, 1);

    let rects = layout(items(&[5, 4, 3]), 1, 1, 0);
    assert_eq!(rects.len(), 1);
    assert_eq!(*rects[0].payload(), 0);
}

#[test]
fn test_gapless_layout_tiles_canvas() {
    let config = LayoutConfig::builder()
        .width(300u32)
        .height(200u32)
        .gap(0u32)
        .build()
        .unwrap();
    let rects = TreemapLayout::with_config(config).layout(items(&sizes(21, 30)));

    let covered: u64 = rects.iter().map(|r| r.area()).sum();
    assert_eq!(covered, 300 * 200);
    assert_well_formed(&rects, 300, 200);
}

#[test]
fn test_records_to_rectangles() {
    let records = vec![
        FileRecord::directory("/root/dir", 4096, 1, SystemTime::UNIX_EPOCH),
        FileRecord::file("/root/dir/big.iso", 9_000, 2, SystemTime::UNIX_EPOCH),
        FileRecord::file("/root/notes.txt", 1_000, 1, SystemTime::UNIX_EPOCH),
    ];
    let rects = layout(SizedItem::from_records(records), 1000, 800, 0);

    assert_eq!(rects.len(), 2);
    assert_eq!(rects[0].payload().name(), "big.iso");
    assert_eq!(rects[1].payload().name(), "notes.txt");
}

#[test]
fn test_rectangle_serializes_payload() {
    let rects = layout(vec![SizedItem::new("a", 1)], 10, 10, 0);
    let json = serde_json::to_string(&rects[0]).unwrap();
    assert!(json.contains("\"payload\":\"a\""));
    assert!(json.contains("\"width\":10"));
}
