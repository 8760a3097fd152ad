// crates/tessera-layout/src/lib.rs
//! Grid layout algorithms: collision detection, compaction, displacement,
//! bounds correction, synchronization and grouping.
//!
//! Every public operation takes a borrowed layout and hands back a new one;
//! [`correct_bounds`] is the single in-place exception.

use tessera_core::{CompactionAxis, GridConfig};

pub mod geometry;
pub mod sort;
pub mod compact;
pub mod mover;
pub mod resize;
pub mod bounds;
pub mod sync;
pub mod grouping;

pub use geometry::*;
pub use sort::*;
pub use compact::*;
pub use mover::*;
pub use resize::*;
pub use bounds::*;
pub use sync::*;
pub use grouping::*;

/// Engine-facing subset of [`GridConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub axis: CompactionAxis,
    pub cols: i32,
    pub allow_overlap: bool,
    pub prevent_collision: bool,
}

impl LayoutOptions {
    pub fn new(cols: i32, axis: CompactionAxis) -> Self {
        Self {
            axis,
            cols,
            allow_overlap: false,
            prevent_collision: false,
        }
    }

    pub fn with_allow_overlap(mut self, allow_overlap: bool) -> Self {
        self.allow_overlap = allow_overlap;
        self
    }

    pub fn with_prevent_collision(mut self, prevent_collision: bool) -> Self {
        self.prevent_collision = prevent_collision;
        self
    }
}

impl From<&GridConfig> for LayoutOptions {
    fn from(config: &GridConfig) -> Self {
        Self {
            axis: config.compaction_axis,
            cols: config.column_count,
            allow_overlap: config.allow_overlap,
            prevent_collision: config.prevent_collision,
        }
    }
}
