// crates/tessera-layout/src/sort.rs
use tessera_core::{CompactionAxis, LayoutItem};

/// Indices of `layout` in compaction order.
///
/// Vertical sorts row-major, horizontal column-major. The sort is stable and
/// never consults keys, so items on the same cell keep their relative order.
/// Without an axis the original order is returned.
pub fn sorted_indices(layout: &[LayoutItem], axis: CompactionAxis) -> Vec<usize> {
    let mut order: Vec<usize> = (0..layout.len()).collect();
    match axis {
        CompactionAxis::Vertical => order.sort_by_key(|&index| (layout[index].y, layout[index].x)),
        CompactionAxis::Horizontal => order.sort_by_key(|&index| (layout[index].x, layout[index].y)),
        CompactionAxis::None => {}
    }
    order
}

/// Items of `layout` in compaction order.
pub fn sort_layout_items(layout: &[LayoutItem], axis: CompactionAxis) -> Vec<&LayoutItem> {
    sorted_indices(layout, axis).into_iter().map(|index| &layout[index]).collect()
}
