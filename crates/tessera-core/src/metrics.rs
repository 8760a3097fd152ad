// crates/tessera-core/src/metrics.rs
use glam::Vec2;

use crate::{GridConfig, LayoutItem};

/// Pixel rectangle of an item inside the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub position: Vec2,
    pub size: Vec2,
}

/// Translates between grid cells and container pixels.
///
/// The engine itself never works in pixels.
#[derive(Debug, Clone)]
pub struct GridMetrics {
    columns: i32,
    max_rows: Option<i32>,
    container_width: f32,
    row_height: f32,
    margin: Vec2,
    padding: Vec2,
}

impl GridMetrics {
    pub fn new(config: &GridConfig, container_width: f32) -> Self {
        let padding = config.container_padding();
        Self {
            columns: config.column_count.max(1),
            max_rows: config.max_rows,
            container_width,
            row_height: config.row_height_px,
            margin: Vec2::from(config.margin_px),
            padding: Vec2::from(padding),
        }
    }

    pub fn column_width(&self) -> f32 {
        let columns = self.columns as f32;
        (self.container_width - self.margin.x * (columns - 1.0) - self.padding.x * 2.0) / columns
    }

    fn span_px(units: i32, unit_px: f32, margin_px: f32) -> f32 {
        (unit_px * units as f32 + ((units - 1).max(0) as f32) * margin_px).round()
    }

    pub fn item_rect(&self, item: &LayoutItem) -> PixelRect {
        let column_width = self.column_width();
        let position = Vec2::new(
            ((column_width + self.margin.x) * item.x as f32 + self.padding.x).round(),
            ((self.row_height + self.margin.y) * item.y as f32 + self.padding.y).round(),
        );
        let size = Vec2::new(
            Self::span_px(item.w, column_width, self.margin.x),
            Self::span_px(item.h, self.row_height, self.margin.y),
        );
        PixelRect { position, size }
    }

    /// Cell under a pixel offset for an item of `w`×`h`, clamped into the grid.
    pub fn cell_at(&self, offset: Vec2, w: i32, h: i32) -> (i32, i32) {
        let column_width = self.column_width();
        let x = ((offset.x - self.margin.x) / (column_width + self.margin.x)).round() as i32;
        let y = ((offset.y - self.margin.y) / (self.row_height + self.margin.y)).round() as i32;

        let x = x.clamp(0, (self.columns - w).max(0));
        let y = match self.max_rows {
            Some(max_rows) => y.clamp(0, (max_rows - h).max(0)),
            None => y.max(0),
        };
        (x, y)
    }

    /// Container height needed to show every row of a layout.
    pub fn container_height(&self, rows: i32) -> f32 {
        if rows <= 0 {
            return 0.0;
        }
        rows as f32 * self.row_height + (rows - 1) as f32 * self.margin.y + self.padding.y * 2.0
    }
}
