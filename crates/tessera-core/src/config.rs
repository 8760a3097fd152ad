// crates/tessera-core/src/config.rs
use serde::{Deserialize, Serialize};

use crate::{LayoutError, Result};

/// Direction gravity pulls items in during compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactionAxis {
    #[default]
    Vertical,
    Horizontal,
    None,
}

impl CompactionAxis {
    pub fn is_none(self) -> bool {
        matches!(self, CompactionAxis::None)
    }
}

/// How the two members of a freshly created group are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupArrangement {
    /// Side by side when that fits in the remaining columns, stacked otherwise.
    #[default]
    PreferHorizontal,
    /// Whichever arrangement has the smaller bounding area, side by side on ties.
    MinimizeArea,
}

/// Where a freshly created group is placed in the parent grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupAnchor {
    /// The drop target's original origin.
    #[default]
    Target,
    /// The component-wise minimum of both origins.
    MinOrigin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    pub column_count: i32,
    pub compaction_axis: CompactionAxis,
    pub allow_overlap: bool,
    pub prevent_collision: bool,
    /// Ceiling on the layout height, enforced by the session before placement.
    pub max_rows: Option<i32>,

    // Presentation pass-through, only consumed by pixel metrics
    pub row_height_px: f32,
    pub margin_px: [f32; 2],
    pub container_padding_px: Option<[f32; 2]>,

    // Container defaults for items that inherit
    pub is_draggable: bool,
    pub is_resizable: bool,

    // Grouping
    pub grouping: bool,
    pub group_merge_delay_ms: u64,
    /// Minimum rows between wrapped rows of group children. A row holding a
    /// taller child advances by that child's height instead.
    pub group_wrap_rows: i32,
    pub group_arrangement: GroupArrangement,
    pub group_anchor: GroupAnchor,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            column_count: 12,
            compaction_axis: CompactionAxis::Vertical,
            allow_overlap: false,
            prevent_collision: false,
            max_rows: None,
            row_height_px: 150.0,
            margin_px: [10.0, 10.0],
            container_padding_px: None,
            is_draggable: true,
            is_resizable: true,
            grouping: true,
            group_merge_delay_ms: 1000,
            group_wrap_rows: 2,
            group_arrangement: GroupArrangement::PreferHorizontal,
            group_anchor: GroupAnchor::Target,
        }
    }
}

impl GridConfig {
    pub fn new(column_count: i32) -> Self {
        Self {
            column_count,
            ..Self::default()
        }
    }

    pub fn with_axis(mut self, axis: CompactionAxis) -> Self {
        self.compaction_axis = axis;
        self
    }

    pub fn with_allow_overlap(mut self, allow_overlap: bool) -> Self {
        self.allow_overlap = allow_overlap;
        self
    }

    pub fn with_prevent_collision(mut self, prevent_collision: bool) -> Self {
        self.prevent_collision = prevent_collision;
        self
    }

    pub fn with_max_rows(mut self, max_rows: i32) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn with_grouping(mut self, grouping: bool) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_merge_delay_ms(mut self, delay_ms: u64) -> Self {
        self.group_merge_delay_ms = delay_ms;
        self
    }

    pub fn with_arrangement(mut self, arrangement: GroupArrangement) -> Self {
        self.group_arrangement = arrangement;
        self
    }

    pub fn with_anchor(mut self, anchor: GroupAnchor) -> Self {
        self.group_anchor = anchor;
        self
    }

    /// Padding falls back to the margin when unset.
    pub fn container_padding(&self) -> [f32; 2] {
        self.container_padding_px.unwrap_or(self.margin_px)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: GridConfig =
            serde_json::from_str(json).map_err(|e| LayoutError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.column_count < 1 {
            return Err(LayoutError::InvalidConfig(format!(
                "columnCount must be at least 1, got {}",
                self.column_count
            )));
        }
        if self.group_wrap_rows < 1 {
            return Err(LayoutError::InvalidConfig(format!(
                "groupWrapRows must be at least 1, got {}",
                self.group_wrap_rows
            )));
        }
        if let Some(max_rows) = self.max_rows {
            if max_rows < 1 {
                return Err(LayoutError::InvalidConfig(format!(
                    "maxRows must be at least 1, got {}",
                    max_rows
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GridConfig::default();
        assert_eq!(config.column_count, 12);
        assert_eq!(config.compaction_axis, CompactionAxis::Vertical);
        assert_eq!(config.group_merge_delay_ms, 1000);
        assert_eq!(config.container_padding(), [10.0, 10.0]);
    }

    #[test]
    fn test_from_json_uses_camel_case_keys() {
        let config = GridConfig::from_json(
            r#"{"columnCount": 6, "compactionAxis": "none", "preventCollision": true,
                "groupMergeDelayMs": 250, "groupArrangement": "minimizeArea"}"#,
        )
        .unwrap();
        assert_eq!(config.column_count, 6);
        assert_eq!(config.compaction_axis, CompactionAxis::None);
        assert!(config.prevent_collision);
        assert_eq!(config.group_merge_delay_ms, 250);
        assert_eq!(config.group_arrangement, GroupArrangement::MinimizeArea);
        assert_eq!(config.group_anchor, GroupAnchor::Target);
    }

    #[test]
    fn test_rejects_zero_columns() {
        let err = GridConfig::from_json(r#"{"columnCount": 0}"#).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfig(_)));
    }
}
