// crates/tessera-layout/src/sync.rs
use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tessera_core::{bottom, ensure_unique_keys, get_layout_item, validate_item, Layout, LayoutItem, RawItem, Result};
use tracing::debug;

use crate::bounds::correct_bounds;
use crate::compact::compact;
use crate::grouping::settle_group;
use crate::LayoutOptions;

/// A caller's description of one item to show, optionally with explicit geometry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDescriptor {
    pub key: String,
    #[serde(default)]
    pub data_grid: Option<RawItem>,
}

impl ItemDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            data_grid: None,
        }
    }

    pub fn with_grid(mut self, grid: RawItem) -> Self {
        self.data_grid = Some(grid);
        self
    }
}

/// Rebuilds a layout from the caller's current item list.
///
/// Known keys keep their interactive placement unless the descriptor carries
/// explicit geometry, which wins. Unknown keys enter as 1x1 items at the
/// bottom. Children of existing groups stay grouped; groups whose children
/// were all dropped disappear.
pub fn synchronize(existing: &[LayoutItem], descriptors: &[ItemDescriptor], options: &LayoutOptions) -> Result<Layout> {
    let owners = group_owners(existing);
    let described: HashSet<&str> = descriptors
        .iter()
        .filter(|descriptor| descriptor.data_grid.is_none())
        .map(|descriptor| descriptor.key.as_str())
        .collect();

    let mut layout: Layout = Vec::with_capacity(descriptors.len());
    let mut placed_groups: HashSet<&str> = HashSet::new();

    for (index, descriptor) in descriptors.iter().enumerate() {
        if let Some(raw) = &descriptor.data_grid {
            let raw = raw.clone().with_key(&descriptor.key);
            layout.push(validate_item(&raw, index)?);
            continue;
        }

        if let Some(group) = owners.get(descriptor.key.as_str()) {
            if placed_groups.insert(group.key.as_str()) {
                let mut kept = (*group).clone();
                kept.children.retain(|child| described.contains(child.key.as_str()));
                layout.extend(settle_group(kept));
            }
            continue;
        }

        let item = match get_layout_item(existing, &descriptor.key) {
            Some(item) => item.clone(),
            None => {
                let y = bottom(&layout);
                debug!("Synchronize: new item {} placed at [0,{}]", descriptor.key, y);
                LayoutItem::new(descriptor.key.clone(), 0, y, 1, 1)
            }
        };
        layout.push(item);
    }

    ensure_unique_keys(&layout)?;
    correct_bounds(&mut layout, options.cols);
    if options.allow_overlap {
        Ok(layout)
    } else {
        Ok(compact(&layout, options.axis, options.cols, false))
    }
}

/// Maps each grouped child key to the top-level group holding it.
fn group_owners(layout: &[LayoutItem]) -> HashMap<&str, &LayoutItem> {
    let mut owners = HashMap::new();
    for group in layout.iter().filter(|item| item.is_group) {
        for child in &group.children {
            owners.insert(child.key.as_str(), group);
        }
    }
    owners
}
