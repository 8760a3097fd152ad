// crates/tessera-layout/src/resize.rs
use std::borrow::Cow;

use tessera_core::{index_of, LayoutItem, ResizeHandle};
use tracing::debug;

use crate::geometry::GridRect;
use crate::mover::move_element;
use crate::LayoutOptions;

/// Clamps a requested span into `[max(min, 1), max]`.
fn clamp_span(value: i32, min: Option<i32>, max: Option<i32>) -> i32 {
    let lower = min.unwrap_or(1).max(1);
    let upper = max.unwrap_or(i32::MAX).max(lower);
    value.clamp(lower, upper)
}

/// Resizes the item `key` to `w`x`h` cells, dragged from `handle`.
///
/// Spans are clamped to the item's min/max constraints and to the room left
/// in the grid. West and north handles keep the opposite edge fixed, so the
/// origin shifts by the size delta; a shift past zero reverts that dimension.
/// Origin-shifting resizes displace neighbours through the mover.
pub fn resize_element<'a>(
    layout: &'a [LayoutItem],
    key: &str,
    w: i32,
    h: i32,
    handle: ResizeHandle,
    options: &LayoutOptions,
) -> Cow<'a, [LayoutItem]> {
    let Some(index) = index_of(layout, key) else {
        debug!("resize_element: no item {}", key);
        return Cow::Borrowed(layout);
    };
    let item = &layout[index];

    let room = if handle.moves_x() {
        item.right()
    } else {
        options.cols - item.x
    };
    let max_w = Some(item.max_w.map_or(room, |max_w| max_w.min(room)));
    let mut w = clamp_span(w, item.min_w, max_w);
    let mut h = clamp_span(h, item.min_h, item.max_h);

    let (mut x, mut y) = item.position();
    if handle.moves_x() {
        x = item.x + (item.w - w);
        if x < 0 {
            x = item.x;
            w = item.w;
        }
    }
    if handle.moves_y() {
        y = item.y + (item.h - h);
        if y < 0 {
            y = item.y;
            h = item.h;
        }
    }

    if (x, y, w, h) == (item.x, item.y, item.w, item.h) {
        return Cow::Borrowed(layout);
    }

    if options.prevent_collision && !options.allow_overlap {
        let rect = GridRect::new(x, y, w, h);
        let blocked = layout
            .iter()
            .any(|other| other.key != item.key && GridRect::from(other).overlaps(&rect));
        if blocked {
            debug!("Resize of {} to {}x{} blocked by a collision", key, w, h);
            return Cow::Borrowed(layout);
        }
    }

    debug!("Resizing {} to {}x{} at [{},{}]", key, w, h, x, y);
    let mut resized = layout.to_vec();
    resized[index].w = w;
    resized[index].h = h;

    if (x, y) == item.position() {
        return Cow::Owned(resized);
    }
    if item.is_static {
        resized[index].x = x;
        resized[index].y = y;
        return Cow::Owned(resized);
    }
    let moved = move_element(&resized, key, Some(x), Some(y), true, options).into_owned();
    Cow::Owned(moved)
}
