// crates/tessera-layout/src/bounds.rs
use tessera_core::LayoutItem;
use tracing::trace;

use crate::geometry::first_collision;

/// Pulls every item back inside `cols` columns, in place.
///
/// Items hanging off the right edge slide left; items left of zero are pinned
/// to column 0 and keep their width unless it exceeds the grid. Every item
/// joins the obstacle set as it is visited, and a static item overlapping an
/// earlier item is pushed down a row at a time. Overlaps between movable
/// items are left for the next compaction.
pub fn correct_bounds(layout: &mut [LayoutItem], cols: i32) -> &mut [LayoutItem] {
    let mut obstacles: Vec<LayoutItem> = Vec::with_capacity(layout.len());

    for item in layout.iter_mut() {
        if item.right() > cols {
            item.x = cols - item.w;
        }
        if item.x < 0 {
            item.x = 0;
            item.w = item.w.min(cols);
        }

        if item.is_static {
            while first_collision(&obstacles, item).is_some() {
                trace!("Static {} overlaps an earlier item, moving down", item.key);
                item.y += 1;
            }
        }
        obstacles.push(item.clone());
    }

    layout
}
