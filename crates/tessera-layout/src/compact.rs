// crates/tessera-layout/src/compact.rs
use tessera_core::{bottom, statics, CompactionAxis, Layout, LayoutItem};
use tracing::trace;

use crate::geometry::{collides, first_collision};
use crate::sort::sorted_indices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coord {
    X,
    Y,
}

impl Coord {
    fn get(self, item: &LayoutItem) -> i32 {
        match self {
            Coord::X => item.x,
            Coord::Y => item.y,
        }
    }

    fn set(self, item: &mut LayoutItem, value: i32) {
        match self {
            Coord::X => item.x = value,
            Coord::Y => item.y = value,
        }
    }

    fn span(self, item: &LayoutItem) -> i32 {
        match self {
            Coord::X => item.w,
            Coord::Y => item.h,
        }
    }
}

/// Removes gaps along `axis` and resolves every collision that results.
///
/// The returned layout has the input's order and every `moved` flag cleared.
/// With overlap allowed and no axis the items pass through untouched.
pub fn compact(layout: &[LayoutItem], axis: CompactionAxis, cols: i32, allow_overlap: bool) -> Layout {
    if allow_overlap && axis.is_none() {
        return layout
            .iter()
            .cloned()
            .map(|mut item| {
                item.moved = false;
                item
            })
            .collect();
    }

    let mut compare_with: Vec<LayoutItem> = statics(layout).cloned().collect();
    let order = sorted_indices(layout, axis);
    let mut sorted: Vec<LayoutItem> = order.iter().map(|&index| layout[index].clone()).collect();
    let mut out: Vec<Option<LayoutItem>> = vec![None; layout.len()];

    for position in 0..sorted.len() {
        if !sorted[position].is_static {
            compact_item(&compare_with, &mut sorted, position, axis, cols, allow_overlap);
            compare_with.push(sorted[position].clone());
        }
        let mut item = sorted[position].clone();
        item.moved = false;
        out[order[position]] = Some(item);
    }

    out.into_iter().flatten().collect()
}

/// Settles `sorted[position]` against the already placed items.
fn compact_item(
    compare_with: &[LayoutItem],
    sorted: &mut [LayoutItem],
    position: usize,
    axis: CompactionAxis,
    cols: i32,
    allow_overlap: bool,
) {
    match axis {
        CompactionAxis::Vertical => {
            let floor = bottom(compare_with);
            let item = &mut sorted[position];
            item.y = item.y.min(floor);
            while item.y > 0 && first_collision(compare_with, item).is_none() {
                item.y -= 1;
            }
        }
        CompactionAxis::Horizontal => {
            let item = &mut sorted[position];
            while item.x > 0 && first_collision(compare_with, item).is_none() {
                item.x -= 1;
            }
        }
        CompactionAxis::None => {}
    }

    while let Some(hit) = first_collision(compare_with, &sorted[position]) {
        if axis.is_none() && allow_overlap {
            break;
        }
        trace!("Compaction collision between {} and {}", sorted[position].key, hit.key);

        if axis == CompactionAxis::Horizontal {
            resolve_compaction_collision(sorted, position, hit.right(), Coord::X);
        } else {
            resolve_compaction_collision(sorted, position, hit.bottom(), Coord::Y);
        }

        let item = &mut sorted[position];
        if axis == CompactionAxis::Horizontal && item.right() > cols {
            item.x = cols - item.w;
            item.y += 1;
            while item.x > 0 && first_collision(compare_with, item).is_none() {
                item.x -= 1;
            }
        }
    }

    let item = &mut sorted[position];
    item.y = item.y.max(0);
    item.x = item.x.max(0);
}

/// Moves `sorted[index]` to `move_to`, first pushing later items it would
/// land on further along the same axis.
fn resolve_compaction_collision(sorted: &mut [LayoutItem], index: usize, move_to: i32, coord: Coord) {
    let bumped = coord.get(&sorted[index]).saturating_add(1);
    coord.set(&mut sorted[index], bumped);
    let span = coord.span(&sorted[index]);

    for other in index + 1..sorted.len() {
        if sorted[other].is_static {
            continue;
        }
        // Sorted order means nothing further down can be reached
        if sorted[other].y > sorted[index].bottom() {
            break;
        }
        if collides(&sorted[index], &sorted[other]) {
            resolve_compaction_collision(sorted, other, move_to.saturating_add(span), coord);
        }
    }

    coord.set(&mut sorted[index], move_to);
}
