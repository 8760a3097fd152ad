// crates/tessera-layout/src/geometry.rs
use tessera_core::LayoutItem;

/// An anonymous rectangle in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl GridRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Touching edges do not overlap.
    pub fn overlaps(&self, other: &GridRect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    /// Area shared with `other`, 0 when they do not overlap.
    pub fn intersection_area(&self, other: &GridRect) -> i32 {
        let w = self.right().min(other.right()).saturating_sub(self.x.max(other.x));
        let h = self.bottom().min(other.bottom()).saturating_sub(self.y.max(other.y));
        if w <= 0 || h <= 0 {
            0
        } else {
            w.saturating_mul(h)
        }
    }

    pub fn within_columns(&self, cols: i32) -> bool {
        self.x >= 0 && self.right() <= cols
    }
}

impl From<&LayoutItem> for GridRect {
    fn from(item: &LayoutItem) -> Self {
        Self::new(item.x, item.y, item.w, item.h)
    }
}

/// Whether two distinct items overlap. An item never collides with itself.
pub fn collides(a: &LayoutItem, b: &LayoutItem) -> bool {
    a.key != b.key && GridRect::from(a).overlaps(&GridRect::from(b))
}

/// First item in `layout` order colliding with `item`.
pub fn first_collision<'a>(layout: &'a [LayoutItem], item: &LayoutItem) -> Option<&'a LayoutItem> {
    layout.iter().find(|other| collides(other, item))
}

pub fn all_collisions<'a>(layout: &'a [LayoutItem], item: &LayoutItem) -> Vec<&'a LayoutItem> {
    layout.iter().filter(|other| collides(other, item)).collect()
}

/// First item overlapping an anonymous rectangle. No key is excluded.
pub fn first_overlap<'a>(layout: &'a [LayoutItem], rect: &GridRect) -> Option<&'a LayoutItem> {
    layout.iter().find(|other| GridRect::from(*other).overlaps(rect))
}

/// Every pair of colliding items, both non-static unless `include_static`.
pub fn overlapping_pairs(layout: &[LayoutItem], include_static: bool) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    for (index, a) in layout.iter().enumerate() {
        for b in &layout[index + 1..] {
            if !include_static && (a.is_static || b.is_static) {
                continue;
            }
            if collides(a, b) {
                pairs.push((a.key.as_str(), b.key.as_str()));
            }
        }
    }
    pairs
}
