// crates/tessera-layout/src/grouping.rs
//! Merging items into groups, and layouts nested inside a group.
//!
//! A group's children live in their own coordinate space, relative to the
//! group's origin, with the group's width as their column count.

use std::borrow::Cow;
use std::collections::HashSet;

use tessera_core::{index_of, CompactionAxis, GridConfig, GroupAnchor, GroupArrangement, Layout, LayoutItem, ResizeHandle};
use tracing::{debug, warn};

use crate::compact::compact;
use crate::geometry::GridRect;
use crate::mover::move_element;
use crate::resize::resize_element;
use crate::sort::sorted_indices;
use crate::LayoutOptions;

/// How new groups are shaped and placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPolicy {
    pub arrangement: GroupArrangement,
    pub anchor: GroupAnchor,
    /// Minimum row advance when children wrap inside a group.
    pub wrap_rows: i32,
}

impl Default for GroupPolicy {
    fn default() -> Self {
        Self {
            arrangement: GroupArrangement::PreferHorizontal,
            anchor: GroupAnchor::Target,
            wrap_rows: 2,
        }
    }
}

impl From<&GridConfig> for GroupPolicy {
    fn from(config: &GridConfig) -> Self {
        Self {
            arrangement: config.group_arrangement,
            anchor: config.group_anchor,
            wrap_rows: config.group_wrap_rows,
        }
    }
}

/// The item a drag at `rect` would merge into: the non-static item sharing
/// the most area with it. Ties go to the earlier item.
pub fn merge_candidate<'a>(layout: &'a [LayoutItem], dragged: &str, rect: &GridRect) -> Option<&'a LayoutItem> {
    let mut best: Option<(&LayoutItem, i32)> = None;
    for item in layout {
        if item.key == dragged || item.is_static {
            continue;
        }
        let area = rect.intersection_area(&GridRect::from(item));
        if area > 0 && best.map_or(true, |(_, best_area)| area > best_area) {
            best = Some((item, area));
        }
    }
    best.map(|(item, _)| item)
}

/// First `group-{n}` key not used anywhere in the layout, children included.
pub fn fresh_group_key(layout: &[LayoutItem]) -> String {
    let taken: HashSet<&str> = layout.iter().flat_map(LayoutItem::keys).collect();
    (1..)
        .map(|n| format!("group-{}", n))
        .find(|key| !taken.contains(key.as_str()))
        .unwrap_or_default()
}

/// Merges `dragged` into `target`.
///
/// Two plain items form a new group at the target; a plain item dropped on a
/// group joins it and the group re-flows. Merges involving a dragged group are
/// not supported and leave the layout as it was.
pub fn merge_items<'a>(
    layout: &'a [LayoutItem],
    dragged: &str,
    target: &str,
    policy: &GroupPolicy,
    options: &LayoutOptions,
) -> Cow<'a, [LayoutItem]> {
    let (Some(dragged_index), Some(target_index)) = (index_of(layout, dragged), index_of(layout, target)) else {
        debug!("merge_items: missing {} or {}", dragged, target);
        return Cow::Borrowed(layout);
    };
    if dragged_index == target_index {
        return Cow::Borrowed(layout);
    }

    let source = &layout[dragged_index];
    let destination = &layout[target_index];
    if destination.is_static {
        warn!("Cannot merge {} into static item {}", dragged, target);
        return Cow::Borrowed(layout);
    }

    let merged = match (source.is_group, destination.is_group) {
        (false, false) => create_group(layout, source, destination, policy, options.cols),
        (false, true) => absorb_into_group(source, destination, policy, options.cols),
        (true, true) => {
            warn!("Merging group {} into group {} is not supported", dragged, target);
            return Cow::Borrowed(layout);
        }
        (true, false) => {
            warn!("Merging group {} into plain item {} is not supported", dragged, target);
            return Cow::Borrowed(layout);
        }
    };
    debug!(
        "Merged {} into {} as {} at [{},{}] {}x{}",
        dragged, target, merged.key, merged.x, merged.y, merged.w, merged.h
    );

    let mut next: Layout = Vec::with_capacity(layout.len() - 1);
    for (index, item) in layout.iter().enumerate() {
        if index == target_index {
            next.push(merged.clone());
        } else if index != dragged_index {
            next.push(item.clone());
        }
    }
    Cow::Owned(settle(next, options))
}

fn settle(layout: Layout, options: &LayoutOptions) -> Layout {
    if options.allow_overlap {
        layout
    } else {
        compact(&layout, options.axis, options.cols, false)
    }
}

fn clamp_into_columns(group: &mut LayoutItem, cols: i32) {
    if group.right() > cols {
        group.x = (cols - group.w).max(0);
    }
}

fn create_group(
    layout: &[LayoutItem],
    dragged: &LayoutItem,
    target: &LayoutItem,
    policy: &GroupPolicy,
    cols: i32,
) -> LayoutItem {
    let (x, y) = match policy.anchor {
        GroupAnchor::Target => target.position(),
        GroupAnchor::MinOrigin => (dragged.x.min(target.x), dragged.y.min(target.y)),
    };

    // Children keep the reading order of where they stood
    let pair = [dragged.clone(), target.clone()];
    let order = sorted_indices(&pair, CompactionAxis::Vertical);
    let mut first = pair[order[0]].clone();
    let mut second = pair[order[1]].clone();

    let horizontal = (first.w + second.w, first.h.max(second.h));
    let vertical = (first.w.max(second.w), first.h + second.h);
    let side_by_side = match policy.arrangement {
        GroupArrangement::PreferHorizontal => x + horizontal.0 <= cols,
        GroupArrangement::MinimizeArea => horizontal.0 * horizontal.1 <= vertical.0 * vertical.1,
    };

    first.x = 0;
    first.y = 0;
    let (w, h) = if side_by_side {
        second.x = first.w;
        second.y = 0;
        horizontal
    } else {
        second.x = 0;
        second.y = first.h;
        vertical
    };
    for child in [&mut first, &mut second] {
        child.moved = false;
    }

    let mut group = LayoutItem::group(fresh_group_key(layout), x, y, w, h, vec![first, second]);
    clamp_into_columns(&mut group, cols);
    group
}

fn absorb_into_group(dragged: &LayoutItem, group: &LayoutItem, policy: &GroupPolicy, cols: i32) -> LayoutItem {
    let mut group = group.clone();
    let mut child = dragged.clone();
    child.moved = false;
    group.children.push(child);
    reflow_children(&mut group, policy.wrap_rows, cols);
    clamp_into_columns(&mut group, cols);
    group
}

/// Packs children left to right, wrapping at the parent grid's right edge.
fn reflow_children(group: &mut LayoutItem, wrap_rows: i32, cols: i32) {
    let widest = group.children.iter().map(|child| child.w).max().unwrap_or(1);
    let available = (cols - group.x).max(widest);

    let (mut x, mut y, mut row_height) = (0, 0, 0);
    for child in &mut group.children {
        if x > 0 && x + child.w > available {
            y += row_height.max(wrap_rows);
            x = 0;
            row_height = 0;
        }
        child.x = x;
        child.y = y;
        x += child.w;
        row_height = row_height.max(child.h);
    }

    fit_to_children(group);
}

/// Sizes a group to the bounding box of its children.
pub fn fit_to_children(group: &mut LayoutItem) {
    group.w = group.children.iter().map(LayoutItem::right).max().unwrap_or(1).max(1);
    group.h = group.children.iter().map(LayoutItem::bottom).max().unwrap_or(1).max(1);
}

/// Normalizes a group after children were removed. Empty groups vanish; a
/// single remaining child replaces the group at its origin; otherwise the
/// group tightens around what is left.
pub fn settle_group(mut group: LayoutItem) -> Option<LayoutItem> {
    match group.children.len() {
        0 => None,
        1 => {
            let mut child = group.children.remove(0);
            child.x = group.x;
            child.y = group.y;
            child.moved = false;
            Some(child)
        }
        _ => {
            let min_x = group.children.iter().map(|child| child.x).min().unwrap_or(0);
            let min_y = group.children.iter().map(|child| child.y).min().unwrap_or(0);
            for child in &mut group.children {
                child.x -= min_x;
                child.y -= min_y;
            }
            group.x += min_x;
            group.y += min_y;
            fit_to_children(&mut group);
            Some(group)
        }
    }
}

/// Takes `child` out of `group` and puts it back on the parent grid at its
/// absolute position.
pub fn detach_child<'a>(
    layout: &'a [LayoutItem],
    group: &str,
    child: &str,
    options: &LayoutOptions,
) -> Cow<'a, [LayoutItem]> {
    let Some(group_index) = index_of(layout, group) else {
        return Cow::Borrowed(layout);
    };
    let mut owner = layout[group_index].clone();
    let Some(child_index) = index_of(&owner.children, child) else {
        debug!("detach_child: {} is not a child of {}", child, group);
        return Cow::Borrowed(layout);
    };

    let mut detached = owner.children.remove(child_index);
    detached.x += owner.x;
    detached.y += owner.y;
    debug!("Detached {} from {} to [{},{}]", child, group, detached.x, detached.y);

    let mut next: Layout = Vec::with_capacity(layout.len() + 1);
    for (index, item) in layout.iter().enumerate() {
        if index == group_index {
            next.extend(settle_group(owner.clone()));
            next.push(detached.clone());
        } else {
            next.push(item.clone());
        }
    }
    Cow::Owned(settle(next, options))
}

/// Moves a child within its group's own grid.
pub fn move_child<'a>(
    layout: &'a [LayoutItem],
    group: &str,
    child: &str,
    x: i32,
    y: i32,
    options: &LayoutOptions,
) -> Cow<'a, [LayoutItem]> {
    with_children(layout, group, options, |children, nested| {
        let item = children.iter().find(|item| item.key == child)?;
        let x = x.clamp(0, (nested.cols - item.w).max(0));
        let y = y.max(0);
        match move_element(children, child, Some(x), Some(y), true, nested) {
            Cow::Borrowed(_) => None,
            Cow::Owned(moved) => Some(moved),
        }
    })
}

/// Resizes a child within its group's own grid.
pub fn resize_child<'a>(
    layout: &'a [LayoutItem],
    group: &str,
    child: &str,
    w: i32,
    h: i32,
    handle: ResizeHandle,
    options: &LayoutOptions,
) -> Cow<'a, [LayoutItem]> {
    with_children(layout, group, options, |children, nested| {
        match resize_element(children, child, w, h, handle, nested) {
            Cow::Borrowed(_) => None,
            Cow::Owned(resized) => Some(resized),
        }
    })
}

/// Runs `edit` on a group's children as a standalone layout, then compacts
/// the children, lets the group's height follow them, and re-settles the
/// parent grid.
fn with_children<'a, F>(layout: &'a [LayoutItem], group: &str, options: &LayoutOptions, edit: F) -> Cow<'a, [LayoutItem]>
where
    F: FnOnce(&[LayoutItem], &LayoutOptions) -> Option<Layout>,
{
    let Some(group_index) = index_of(layout, group) else {
        return Cow::Borrowed(layout);
    };
    let owner = &layout[group_index];
    if !owner.is_group {
        return Cow::Borrowed(layout);
    }

    let nested = LayoutOptions {
        cols: owner.w,
        ..*options
    };
    let Some(children) = edit(&owner.children, &nested) else {
        return Cow::Borrowed(layout);
    };
    let children = settle(children, &nested);

    let mut next = layout.to_vec();
    let updated = &mut next[group_index];
    updated.h = children.iter().map(LayoutItem::bottom).max().unwrap_or(1).max(1);
    updated.children = children;
    Cow::Owned(settle(next, options))
}
