// tests/scenarios.rs
use std::borrow::Cow;

use tessera_core::{get_layout_item, CompactionAxis, GridConfig, LayoutItem};
use tessera_layout::{
    compact, correct_bounds, detach_child, merge_items, move_element, overlapping_pairs, synchronize, GroupPolicy,
    ItemDescriptor, LayoutOptions,
};
use tessera_runtime::{GridSession, ManualClock};

fn rect(layout: &[LayoutItem], key: &str) -> (i32, i32, i32, i32) {
    let item = get_layout_item(layout, key).expect("item present");
    (item.x, item.y, item.w, item.h)
}

fn fixture() -> Vec<LayoutItem> {
    vec![
        LayoutItem::new("a", 0, 0, 3, 2),
        LayoutItem::new("b", 3, 0, 3, 3),
        LayoutItem::new("c", 0, 2, 6, 1),
        LayoutItem::new("d", 6, 0, 2, 4),
        LayoutItem::new("s", 8, 2, 2, 2).with_static(true),
        LayoutItem::new("e", 10, 0, 2, 1),
    ]
}

const TARGETS: [(&str, i32, i32); 8] = [
    ("a", 3, 1),
    ("c", 0, 0),
    ("d", 8, 1),
    ("b", 0, 5),
    ("a", 9, 0),
    ("e", 8, 3),
    ("c", 6, 2),
    ("d", 0, 0),
];

const AXES: [CompactionAxis; 3] = [CompactionAxis::Vertical, CompactionAxis::Horizontal, CompactionAxis::None];

#[test]
fn test_free_placement_displaces_along_row() {
    let layout = vec![LayoutItem::new("11", 6, 0, 2, 3), LayoutItem::new("8", 8, 0, 2, 2)];
    let options = LayoutOptions::new(12, CompactionAxis::None);

    let moved = move_element(&layout, "11", Some(8), Some(0), true, &options);
    assert_eq!(rect(&moved, "11"), (8, 0, 2, 3));
    assert_eq!(rect(&moved, "8"), (10, 0, 2, 2));
}

fn merge_by_hovering(layout: Vec<LayoutItem>, cols: i32, drag_x: i32) -> Vec<LayoutItem> {
    let clock = ManualClock::new();
    let mut session = GridSession::with_clock(GridConfig::new(cols), layout, clock.clone()).unwrap();

    session.start_drag("a");
    session.drag_to("a", drag_x, 0);
    clock.advance_ms(1000);
    session.end_drag("a", drag_x, 0).layout
}

#[test]
fn test_merge_side_by_side() {
    let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 2, 0, 2, 2)];
    let merged = merge_by_hovering(layout, 6, 1);

    assert_eq!(merged.len(), 1);
    let group = &merged[0];
    assert!(group.is_group);
    assert_eq!((group.x, group.y, group.w, group.h), (2, 0, 4, 2));
    assert_eq!(rect(&group.children, "a"), (0, 0, 2, 2));
    assert_eq!(rect(&group.children, "b"), (2, 0, 2, 2));
}

#[test]
fn test_merge_falls_back_to_stacking() {
    let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 4, 0, 2, 2)];
    let merged = merge_by_hovering(layout, 6, 3);

    assert_eq!(merged.len(), 1);
    let group = &merged[0];
    assert_eq!((group.x, group.y, group.w, group.h), (4, 0, 2, 4));
    assert_eq!(rect(&group.children, "a"), (0, 0, 2, 2));
    assert_eq!(rect(&group.children, "b"), (0, 2, 2, 2));
}

#[test]
fn test_synchronize_keeps_existing_and_appends_new() {
    let existing = vec![LayoutItem::new("a", 0, 5, 1, 1)];
    let descriptors = vec![ItemDescriptor::new("a"), ItemDescriptor::new("b")];

    let free = synchronize(&existing, &descriptors, &LayoutOptions::new(12, CompactionAxis::None)).unwrap();
    assert_eq!(rect(&free, "a"), (0, 5, 1, 1));
    assert_eq!(rect(&free, "b"), (0, 6, 1, 1));

    let compacted = synchronize(&existing, &descriptors, &LayoutOptions::new(12, CompactionAxis::Vertical)).unwrap();
    assert_eq!(rect(&compacted, "a"), (0, 0, 1, 1));
    assert_eq!(rect(&compacted, "b"), (0, 1, 1, 1));
}

#[test]
fn test_prevented_collision_returns_input() {
    let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 2, 0, 2, 2)];
    let options = LayoutOptions::new(12, CompactionAxis::Vertical).with_prevent_collision(true);

    let result = move_element(&layout, "a", Some(1), Some(0), true, &options);
    assert!(matches!(result, Cow::Borrowed(_)));
    assert_eq!(&*result, &layout[..]);
    assert!(!result[0].moved);
}

#[test]
fn test_no_overlaps_after_any_move() {
    let layout = fixture();
    for axis in AXES {
        let options = LayoutOptions::new(12, axis);
        for (key, x, y) in TARGETS {
            let moved = move_element(&layout, key, Some(x), Some(y), true, &options);
            let compacted = compact(&moved, axis, 12, false);
            let pairs = overlapping_pairs(&compacted, true);
            assert!(pairs.is_empty(), "{:?} {} -> ({},{}) left {:?}", axis, key, x, y, pairs);
        }
    }
}

#[test]
fn test_statics_never_move() {
    let layout = fixture();
    for axis in AXES {
        let options = LayoutOptions::new(12, axis);
        for (key, x, y) in TARGETS {
            let moved = move_element(&layout, key, Some(x), Some(y), true, &options);
            assert_eq!(rect(&moved, "s"), (8, 2, 2, 2));
            let compacted = compact(&moved, axis, 12, false);
            assert_eq!(rect(&compacted, "s"), (8, 2, 2, 2));
        }
        let dragged = move_element(&layout, "s", Some(0), Some(0), true, &options);
        assert!(matches!(dragged, Cow::Borrowed(_)));
    }
}

#[test]
fn test_compaction_is_idempotent() {
    let layout = fixture();
    for axis in AXES {
        let once = compact(&layout, axis, 12, false);
        assert_eq!(compact(&once, axis, 12, false), once, "{:?}", axis);
    }
}

#[test]
fn test_bounds_containment() {
    let mut layout = vec![
        LayoutItem::new("a", -4, 0, 3, 1),
        LayoutItem::new("b", 11, 0, 4, 1),
        LayoutItem::new("c", 3, 0, 30, 1),
        LayoutItem::new("d", 12, 3, 1, 1),
    ];
    for item in correct_bounds(&mut layout, 12).iter() {
        assert!(item.x >= 0 && item.x + item.w <= 12, "{:?}", item);
    }
}

#[test]
fn test_merge_then_detach_round_trip() {
    let layout = vec![
        LayoutItem::new("a", 0, 0, 2, 2),
        LayoutItem::new("b", 2, 0, 2, 2),
        LayoutItem::new("c", 0, 2, 1, 1),
    ];
    let options = LayoutOptions::new(6, CompactionAxis::Vertical);
    let policy = GroupPolicy::default();

    let grouped = merge_items(&layout, "a", "b", &policy, &options).into_owned();
    let group_key = grouped.iter().find(|item| item.is_group).map(|item| item.key.clone()).unwrap();
    assert_eq!(rect(&grouped, &group_key).2, 4);

    let grown = merge_items(&grouped, "c", &group_key, &policy, &options).into_owned();
    assert_eq!(get_layout_item(&grown, &group_key).unwrap().children.len(), 3);

    let shrunk = detach_child(&grown, &group_key, "c", &options).into_owned();
    assert_eq!(get_layout_item(&shrunk, &group_key).unwrap().children.len(), 2);

    let dissolved = detach_child(&shrunk, &group_key, "a", &options).into_owned();
    assert!(get_layout_item(&dissolved, &group_key).is_none());
    assert_eq!(rect(&dissolved, "b"), (2, 0, 2, 2));
    assert!(overlapping_pairs(&dissolved, true).is_empty());
}
