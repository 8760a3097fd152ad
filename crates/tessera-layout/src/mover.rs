// crates/tessera-layout/src/mover.rs
use std::borrow::Cow;
use std::collections::HashSet;

use tessera_core::{index_of, CompactionAxis, LayoutItem};
use tracing::debug;

use crate::geometry::{collides, first_overlap, GridRect};
use crate::sort::sorted_indices;
use crate::LayoutOptions;

/// What a single step of the cascade did to the item it was asked to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStep {
    /// Static, or already at the target.
    Skipped,
    /// Collided while collisions are prevented; the item is back where it was.
    Reverted,
    /// Collided while overlap is allowed; nothing was displaced.
    Overlapped,
    Moved,
}

/// One top-level displacement. The visited set lives exactly as long as the
/// cascade, so an item moved once during the operation is never displaced again.
pub struct Cascade {
    items: Vec<LayoutItem>,
    axis: CompactionAxis,
    cols: i32,
    visited: HashSet<String>,
}

impl Cascade {
    pub fn new(items: Vec<LayoutItem>, options: &LayoutOptions) -> Self {
        Self {
            items,
            axis: options.axis,
            cols: options.cols,
            visited: HashSet::new(),
        }
    }

    pub fn into_items(self) -> Vec<LayoutItem> {
        self.items
    }

    pub fn move_item(
        &mut self,
        index: usize,
        x: Option<i32>,
        y: Option<i32>,
        is_user_action: bool,
        prevent_collision: bool,
        allow_overlap: bool,
    ) -> MoveStep {
        let item = &self.items[index];
        if item.is_static && !item.is_draggable.is_enabled() {
            return MoveStep::Skipped;
        }
        if x == Some(item.x) && y == Some(item.y) {
            return MoveStep::Skipped;
        }

        let (old_x, old_y) = item.position();
        let key = item.key.clone();
        debug!(
            "Moving element {} to [{},{}] from [{},{}]",
            key,
            x.unwrap_or(old_x),
            y.unwrap_or(old_y),
            old_x,
            old_y
        );

        {
            let item = &mut self.items[index];
            if let Some(x) = x {
                item.x = x;
            }
            if let Some(y) = y {
                item.y = y;
            }
            item.moved = true;
        }
        self.visited.insert(key.clone());

        // Nearest obstacles resolve first: reverse the sweep when moving toward the origin
        let mut order = sorted_indices(&self.items, self.axis);
        let moving_up = match self.axis {
            CompactionAxis::Vertical => y.map_or(false, |y| old_y >= y),
            CompactionAxis::Horizontal => x.map_or(false, |x| old_x >= x),
            CompactionAxis::None => false,
        };
        if moving_up {
            order.reverse();
        }

        let collisions: Vec<usize> = order
            .into_iter()
            .filter(|&other| collides(&self.items[other], &self.items[index]))
            .collect();

        if !collisions.is_empty() {
            if allow_overlap {
                return MoveStep::Overlapped;
            }
            if prevent_collision {
                debug!("Collision prevented on {}, reverting", key);
                let item = &mut self.items[index];
                item.x = old_x;
                item.y = old_y;
                item.moved = false;
                self.visited.remove(&key);
                return MoveStep::Reverted;
            }
        }

        for other in collisions {
            if self.visited.contains(&self.items[other].key) {
                continue;
            }
            if self.items[other].is_static {
                // Statics hold their ground; the mover yields
                self.move_away(other, index, is_user_action);
            } else {
                self.move_away(index, other, is_user_action);
            }
        }

        MoveStep::Moved
    }

    /// Displaces `to_move` out of `collides_with`.
    pub fn move_away(&mut self, collides_with: usize, to_move: usize, is_user_action: bool) {
        let prevent_collision = self.items[collides_with].is_static;
        let obstacle = GridRect::from(&self.items[collides_with]);
        let target = GridRect::from(&self.items[to_move]);

        // Only the primary collision of a user gesture tries the far side first
        if is_user_action {
            match self.axis {
                CompactionAxis::Vertical => {
                    let slot = GridRect::new(target.x, obstacle.y.saturating_sub(target.h).max(0), target.w, target.h);
                    match first_overlap(&self.items, &slot).map(GridRect::from) {
                        None => {
                            self.move_item(to_move, None, Some(slot.y), false, prevent_collision, false);
                            return;
                        }
                        Some(hit) if hit.bottom() > obstacle.y => {
                            self.move_item(to_move, None, Some(obstacle.y.saturating_add(1)), false, prevent_collision, false);
                            return;
                        }
                        Some(_) => {}
                    }
                }
                CompactionAxis::Horizontal => {
                    let slot = GridRect::new(obstacle.x.saturating_sub(target.w).max(0), target.y, target.w, target.h);
                    match first_overlap(&self.items, &slot).map(GridRect::from) {
                        None => {
                            self.move_item(to_move, Some(slot.x), None, false, prevent_collision, false);
                            return;
                        }
                        Some(hit) if obstacle.right() > hit.x => {
                            self.move_item(collides_with, Some(target.x), None, false, prevent_collision, false);
                            return;
                        }
                        Some(_) => {}
                    }
                }
                CompactionAxis::None => {
                    // Free placement: shove the item past the mover's trailing edge
                    // on the same row if it fits there, otherwise swap rows directly
                    let slot = GridRect::new(obstacle.right(), target.y, target.w, target.h);
                    let blocked = self
                        .items
                        .iter()
                        .enumerate()
                        .any(|(index, other)| index != to_move && GridRect::from(other).overlaps(&slot));
                    if slot.within_columns(self.cols) && !blocked {
                        self.move_item(to_move, Some(slot.x), Some(slot.y), false, prevent_collision, false);
                    } else if self.items[collides_with].is_static {
                        self.items[to_move].y = obstacle.bottom();
                    } else {
                        self.items[collides_with].y = target.y;
                        self.items[to_move].y = target.bottom();
                    }
                    return;
                }
            }
        }

        let (x, y) = match self.axis {
            CompactionAxis::Horizontal => (Some(target.x.saturating_add(1)), None),
            CompactionAxis::Vertical => (None, Some(target.y.saturating_add(1))),
            CompactionAxis::None => return,
        };
        self.move_item(to_move, x, y, false, prevent_collision, false);
    }
}

/// Moves the item `key` to the target cell, cascading displacement to
/// everything it lands on. `None` leaves that coordinate unchanged.
///
/// Returns the input unchanged (borrowed) when the item is missing, static,
/// already at the target, or reverted because collisions are prevented.
pub fn move_element<'a>(
    layout: &'a [LayoutItem],
    key: &str,
    x: Option<i32>,
    y: Option<i32>,
    is_user_action: bool,
    options: &LayoutOptions,
) -> Cow<'a, [LayoutItem]> {
    let Some(index) = index_of(layout, key) else {
        debug!("move_element: no item {}", key);
        return Cow::Borrowed(layout);
    };

    let mut cascade = Cascade::new(layout.to_vec(), options);
    match cascade.move_item(
        index,
        x,
        y,
        is_user_action,
        options.prevent_collision,
        options.allow_overlap,
    ) {
        MoveStep::Skipped | MoveStep::Reverted => Cow::Borrowed(layout),
        MoveStep::Overlapped | MoveStep::Moved => Cow::Owned(cascade.into_items()),
    }
}

/// Displaces `item_to_move` away from `collides_with`.
pub fn move_element_away_from_collision<'a>(
    layout: &'a [LayoutItem],
    collides_with: &str,
    item_to_move: &str,
    is_user_action: bool,
    options: &LayoutOptions,
) -> Cow<'a, [LayoutItem]> {
    let (Some(obstacle), Some(target)) = (index_of(layout, collides_with), index_of(layout, item_to_move)) else {
        return Cow::Borrowed(layout);
    };

    let mut cascade = Cascade::new(layout.to_vec(), options);
    cascade.move_away(obstacle, target, is_user_action);
    Cow::Owned(cascade.into_items())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::compact;
    use crate::geometry::overlapping_pairs;
    use tessera_core::{get_layout_item, Toggle};

    fn pos(layout: &[LayoutItem], key: &str) -> (i32, i32) {
        get_layout_item(layout, key).map(LayoutItem::position).unwrap()
    }

    fn vertical(cols: i32) -> LayoutOptions {
        LayoutOptions::new(cols, CompactionAxis::Vertical)
    }

    #[test]
    fn test_free_move_pushes_neighbour_along_row() {
        let layout = vec![LayoutItem::new("11", 6, 0, 2, 3), LayoutItem::new("8", 8, 0, 2, 2)];
        let options = LayoutOptions::new(12, CompactionAxis::None);

        let moved = move_element(&layout, "11", Some(8), Some(0), true, &options);
        assert_eq!(pos(&moved, "11"), (8, 0));
        assert_eq!(pos(&moved, "8"), (10, 0));
        assert_eq!(moved[1].w, 2);
        assert_eq!(moved[1].h, 2);
    }

    #[test]
    fn test_free_move_swaps_rows_when_row_is_full() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 10, 0, 2, 2)];
        let options = LayoutOptions::new(12, CompactionAxis::None);

        let moved = move_element(&layout, "a", Some(10), Some(0), true, &options);
        // No room right of "a"; "b" drops below its own height instead
        assert_eq!(pos(&moved, "a"), (10, 0));
        assert_eq!(pos(&moved, "b"), (10, 2));
    }

    #[test]
    fn test_free_move_drops_below_static() {
        let layout = vec![
            LayoutItem::new("s", 10, 0, 2, 2).with_static(true),
            LayoutItem::new("a", 0, 0, 2, 2),
        ];
        let options = LayoutOptions::new(12, CompactionAxis::None);

        let moved = move_element(&layout, "a", Some(10), Some(0), true, &options);
        assert_eq!(pos(&moved, "s"), (10, 0));
        assert_eq!(pos(&moved, "a"), (10, 2));
    }

    #[test]
    fn test_vertical_move_does_not_cause_jumps() {
        let layout = vec![
            LayoutItem::new("A", 0, 0, 1, 10),
            LayoutItem::new("B", 0, 10, 1, 1),
            LayoutItem::new("C", 0, 11, 1, 1),
        ];
        let options = vertical(10);
        let moved = move_element(&layout, "A", Some(0), Some(1), true, &options);
        let compacted = compact(&moved, CompactionAxis::Vertical, 10, false);

        assert_eq!(pos(&compacted, "A"), (0, 1));
        assert_eq!(pos(&compacted, "B"), (0, 0));
        assert_eq!(pos(&compacted, "C"), (0, 11));
    }

    #[test]
    fn test_move_to_top_cascades_down() {
        let layout = vec![
            LayoutItem::new("A", 0, 0, 1, 1),
            LayoutItem::new("B", 0, 1, 1, 1),
            LayoutItem::new("C", 0, 2, 1, 1),
        ];
        let moved = move_element(&layout, "C", Some(0), Some(0), true, &vertical(10));
        let compacted = compact(&moved, CompactionAxis::Vertical, 10, false);

        assert_eq!(pos(&compacted, "C"), (0, 0));
        assert_eq!(pos(&compacted, "A"), (0, 1));
        assert_eq!(pos(&compacted, "B"), (0, 2));
    }

    #[test]
    fn test_horizontal_swap_when_space_is_free() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 1), LayoutItem::new("b", 2, 0, 2, 1)];
        let options = LayoutOptions::new(12, CompactionAxis::Horizontal);
        let moved = move_element(&layout, "a", Some(2), Some(0), true, &options);

        assert_eq!(pos(&moved, "a"), (2, 0));
        assert_eq!(pos(&moved, "b"), (0, 0));
    }

    #[test]
    fn test_vertical_blocked_above_drops_below_mover() {
        let layout = vec![LayoutItem::new("a", 0, 0, 1, 2), LayoutItem::new("b", 0, 2, 1, 2)];
        let moved = move_element(&layout, "b", Some(0), Some(1), true, &vertical(12));

        // No room above "b", so "a" goes one row under the top of "b"
        assert_eq!(pos(&moved, "b"), (0, 1));
        assert_eq!(pos(&moved, "a"), (0, 2));

        let compacted = compact(&moved, CompactionAxis::Vertical, 12, false);
        assert_eq!(pos(&compacted, "b"), (0, 0));
        assert_eq!(pos(&compacted, "a"), (0, 2));
    }

    #[test]
    fn test_horizontal_blocked_left_pushes_mover_forward() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 1), LayoutItem::new("b", 2, 0, 2, 1)];
        let options = LayoutOptions::new(12, CompactionAxis::Horizontal);
        let moved = move_element(&layout, "a", Some(1), Some(0), true, &options);

        // "a" still covers the cells left of "b", so it jumps to the origin of
        // "b" and "b" steps one column right
        assert_eq!(pos(&moved, "a"), (2, 0));
        assert_eq!(pos(&moved, "b"), (3, 0));

        let compacted = compact(&moved, CompactionAxis::Horizontal, 12, false);
        assert_eq!(pos(&compacted, "a"), (0, 0));
        assert_eq!(pos(&compacted, "b"), (2, 0));
    }

    #[test]
    fn test_cascade_near_row_limit_does_not_overflow() {
        let layout = vec![
            LayoutItem::new("a", 0, i32::MAX - 1, 1, 2),
            LayoutItem::new("b", 0, 0, 1, 1),
        ];
        let moved = move_element(&layout, "b", Some(0), Some(i32::MAX - 1), true, &vertical(12));
        assert_eq!(pos(&moved, "b"), (0, i32::MAX - 1));
        assert_eq!(pos(&moved, "a"), (0, i32::MAX - 3));
    }

    #[test]
    fn test_prevent_collision_returns_input() {
        let layout = vec![LayoutItem::new("1", 0, 0, 1, 10), LayoutItem::new("2", 0, 10, 1, 1)];
        let options = vertical(10).with_prevent_collision(true);

        let result = move_element(&layout, "1", Some(0), Some(1), true, &options);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, &layout[..]);
        assert_eq!(pos(&result, "1"), (0, 0));
        assert!(!result[0].moved);
    }

    #[test]
    fn test_allow_overlap_accepts_collision() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 2, 0, 2, 2)];
        let options = vertical(12).with_allow_overlap(true);

        let result = move_element(&layout, "a", Some(1), Some(0), true, &options);
        assert!(matches!(result, Cow::Owned(_)));
        assert_eq!(pos(&result, "a"), (1, 0));
        assert_eq!(pos(&result, "b"), (2, 0));
        assert_eq!(layout[0].position(), (0, 0));
    }

    #[test]
    fn test_static_obstacle_displaces_mover() {
        let layout = vec![
            LayoutItem::new("s", 0, 2, 2, 2).with_static(true),
            LayoutItem::new("a", 0, 0, 2, 1),
        ];
        let moved = move_element(&layout, "a", Some(0), Some(2), true, &vertical(12));

        assert_eq!(pos(&moved, "s"), (0, 2));
        assert!(overlapping_pairs(&moved, true).is_empty());
    }

    #[test]
    fn test_static_items_are_not_dragged() {
        let layout = vec![LayoutItem::new("s", 0, 0, 1, 1).with_static(true)];
        let result = move_element(&layout, "s", Some(3), Some(3), true, &vertical(12));
        assert!(matches!(result, Cow::Borrowed(_)));

        let draggable = vec![layout[0].clone().with_draggable(Toggle::Enabled)];
        let result = move_element(&draggable, "s", Some(3), Some(3), true, &vertical(12));
        assert_eq!(pos(&result, "s"), (3, 3));
    }

    #[test]
    fn test_noop_cases_borrow() {
        let layout = vec![LayoutItem::new("a", 1, 1, 1, 1)];
        assert!(matches!(
            move_element(&layout, "a", Some(1), Some(1), true, &vertical(12)),
            Cow::Borrowed(_)
        ));
        assert!(matches!(
            move_element(&layout, "missing", Some(0), Some(0), true, &vertical(12)),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_moves_never_leave_overlaps_after_compaction() {
        let layout = vec![
            LayoutItem::new("a", 0, 0, 3, 2),
            LayoutItem::new("b", 3, 0, 3, 3),
            LayoutItem::new("c", 0, 2, 6, 1),
            LayoutItem::new("d", 6, 0, 2, 4),
            LayoutItem::new("s", 8, 2, 2, 2).with_static(true),
        ];
        let targets = [("a", 3, 1), ("c", 0, 0), ("d", 7, 2), ("b", 0, 5), ("a", 8, 0)];
        for axis in [CompactionAxis::Vertical, CompactionAxis::Horizontal] {
            let options = LayoutOptions::new(12, axis);
            for (key, x, y) in targets {
                let moved = move_element(&layout, key, Some(x), Some(y), true, &options);
                let compacted = compact(&moved, axis, 12, false);
                let pairs = overlapping_pairs(&compacted, false);
                assert!(pairs.is_empty(), "{:?} {} -> ({},{}) left {:?}", axis, key, x, y, pairs);
                assert_eq!(pos(&compacted, "s"), (8, 2));
            }
        }
    }

    #[test]
    fn test_away_from_collision_steps_one_cell() {
        let layout = vec![LayoutItem::new("a", 0, 0, 1, 2), LayoutItem::new("b", 0, 1, 1, 1)];
        let result = move_element_away_from_collision(&layout, "a", "b", false, &vertical(12));
        assert_eq!(pos(&result, "b"), (0, 2));
    }
}
