// crates/tessera-core/src/item.rs
use serde::{Serialize, Serializer};

/// A three-valued flag: either inherits the container default or overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Toggle {
    #[default]
    Inherit,
    Enabled,
    Disabled,
}

impl Toggle {
    pub fn resolve(self, container_default: bool) -> bool {
        match self {
            Toggle::Inherit => container_default,
            Toggle::Enabled => true,
            Toggle::Disabled => false,
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, Toggle::Enabled)
    }

    pub fn as_option(self) -> Option<bool> {
        match self {
            Toggle::Inherit => None,
            Toggle::Enabled => Some(true),
            Toggle::Disabled => Some(false),
        }
    }
}

impl From<Option<bool>> for Toggle {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Toggle::Inherit,
            Some(true) => Toggle::Enabled,
            Some(false) => Toggle::Disabled,
        }
    }
}

impl Serialize for Toggle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

/// A positioned rectangle on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutItem {
    #[serde(rename = "i")]
    pub key: String,

    // Geometry, in grid cells
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,

    // Size constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_w: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_h: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_w: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_h: Option<i32>,

    // Behaviour flags
    #[serde(rename = "static")]
    pub is_static: bool,
    pub is_draggable: Toggle,
    pub is_resizable: Toggle,
    pub moved: bool,
    pub is_bounded: bool,

    // Grouping
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_group: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutItem>,
}

pub type Layout = Vec<LayoutItem>;

/// Largest coordinate or span magnitude the engine works with. A coordinate
/// plus a span always fits in an `i32`.
pub const MAX_CELL: i32 = i32::MAX / 4;

impl LayoutItem {
    pub fn new(key: impl Into<String>, x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            key: key.into(),
            x,
            y,
            w,
            h,
            min_w: None,
            min_h: None,
            max_w: None,
            max_h: None,
            is_static: false,
            is_draggable: Toggle::Inherit,
            is_resizable: Toggle::Inherit,
            moved: false,
            is_bounded: false,
            is_group: false,
            children: Vec::new(),
        }
    }

    /// Builds a group item owning `children`, whose coordinates are relative to the group.
    pub fn group(key: impl Into<String>, x: i32, y: i32, w: i32, h: i32, children: Vec<LayoutItem>) -> Self {
        Self {
            is_group: true,
            children,
            ..Self::new(key, x, y, w, h)
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_draggable(mut self, toggle: Toggle) -> Self {
        self.is_draggable = toggle;
        self
    }

    pub fn with_resizable(mut self, toggle: Toggle) -> Self {
        self.is_resizable = toggle;
        self
    }

    pub fn with_min_size(mut self, min_w: i32, min_h: i32) -> Self {
        self.min_w = Some(min_w);
        self.min_h = Some(min_h);
        self
    }

    pub fn with_max_size(mut self, max_w: i32, max_h: i32) -> Self {
        self.max_w = Some(max_w);
        self.max_h = Some(max_h);
        self
    }

    pub fn with_bounded(mut self, is_bounded: bool) -> Self {
        self.is_bounded = is_bounded;
        self
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Whether a drag may move this item. Static items only move when explicitly enabled.
    pub fn can_drag(&self, container_default: bool) -> bool {
        if self.is_static {
            return self.is_draggable.is_enabled();
        }
        self.is_draggable.resolve(container_default)
    }

    pub fn can_resize(&self, container_default: bool) -> bool {
        if self.is_static {
            return self.is_resizable.is_enabled();
        }
        self.is_resizable.resolve(container_default)
    }

    /// Returns a copy with every field set in `patch` replaced.
    pub fn patched(&self, patch: &ItemPatch) -> LayoutItem {
        LayoutItem {
            key: self.key.clone(),
            x: patch.x.unwrap_or(self.x),
            y: patch.y.unwrap_or(self.y),
            w: patch.w.unwrap_or(self.w),
            h: patch.h.unwrap_or(self.h),
            min_w: patch.min_w.or(self.min_w),
            min_h: patch.min_h.or(self.min_h),
            max_w: patch.max_w.or(self.max_w),
            max_h: patch.max_h.or(self.max_h),
            is_static: patch.is_static.unwrap_or(self.is_static),
            is_draggable: patch.is_draggable.unwrap_or(self.is_draggable),
            is_resizable: patch.is_resizable.unwrap_or(self.is_resizable),
            moved: false,
            is_bounded: patch.is_bounded.unwrap_or(self.is_bounded),
            is_group: self.is_group,
            children: self.children.clone(),
        }
    }

    /// Visits this item and every nested child key, depth first.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = vec![self.key.as_str()];
        for child in &self.children {
            keys.extend(child.keys());
        }
        keys
    }
}

/// Sparse override applied on top of a base item by [`LayoutItem::patched`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub w: Option<i32>,
    pub h: Option<i32>,
    pub min_w: Option<i32>,
    pub min_h: Option<i32>,
    pub max_w: Option<i32>,
    pub max_h: Option<i32>,
    pub is_static: Option<bool>,
    pub is_draggable: Option<Toggle>,
    pub is_resizable: Option<Toggle>,
    pub is_bounded: Option<bool>,
}

impl ItemPatch {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn sized(w: i32, h: i32) -> Self {
        Self {
            w: Some(w),
            h: Some(h),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Edge or corner a resize gesture is dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    #[default]
    Se,
    S,
    E,
    N,
    W,
    Ne,
    Nw,
    Sw,
}

impl ResizeHandle {
    /// Handles on the west edge move the item's origin horizontally.
    pub fn moves_x(self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::Nw | ResizeHandle::Sw)
    }

    /// Handles on the north edge move the item's origin vertically.
    pub fn moves_y(self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::Ne | ResizeHandle::Nw)
    }
}

/// Finds an item by key at the top level of a layout.
pub fn get_layout_item<'a>(layout: &'a [LayoutItem], key: &str) -> Option<&'a LayoutItem> {
    layout.iter().find(|item| item.key == key)
}

pub fn index_of(layout: &[LayoutItem], key: &str) -> Option<usize> {
    layout.iter().position(|item| item.key == key)
}

/// Bottom edge of the lowest item, 0 for an empty layout.
pub fn bottom(layout: &[LayoutItem]) -> i32 {
    layout.iter().map(LayoutItem::bottom).max().unwrap_or(0).max(0)
}

pub fn statics(layout: &[LayoutItem]) -> impl Iterator<Item = &LayoutItem> {
    layout.iter().filter(|item| item.is_static)
}

/// Deep equality used for change notifications. Transient `moved` flags are ignored.
pub fn layouts_equal(a: &[LayoutItem], b: &[LayoutItem]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(left, right)| {
            left.key == right.key
                && left.x == right.x
                && left.y == right.y
                && left.w == right.w
                && left.h == right.h
                && left.is_static == right.is_static
                && left.is_draggable == right.is_draggable
                && left.is_resizable == right.is_resizable
                && left.min_w == right.min_w
                && left.min_h == right.min_h
                && left.max_w == right.max_w
                && left.max_h == right.max_h
                && left.is_bounded == right.is_bounded
                && left.is_group == right.is_group
                && layouts_equal(&left.children, &right.children)
        })
}
