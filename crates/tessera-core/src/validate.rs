// crates/tessera-core/src/validate.rs
//! Boundary validation. Everything entering the engine from a caller passes
//! through here first; the layout algorithms assume well-formed input.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Number, Value};

use crate::{Layout, LayoutError, LayoutItem, Result, Toggle, MAX_CELL};

/// An item definition as supplied by a caller, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub i: Option<Value>,
    pub x: Option<Value>,
    pub y: Option<Value>,
    pub w: Option<Value>,
    pub h: Option<Value>,
    pub min_w: Option<i32>,
    pub min_h: Option<i32>,
    pub max_w: Option<i32>,
    pub max_h: Option<i32>,
    #[serde(rename = "static")]
    pub is_static: Option<bool>,
    pub is_draggable: Option<bool>,
    pub is_resizable: Option<bool>,
    pub is_bounded: Option<bool>,
    pub is_group: Option<bool>,
    pub children: Option<Vec<RawItem>>,
}

fn number(value: f64) -> Value {
    // NaN and infinities have no JSON representation and validate as non-numeric
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

impl RawItem {
    pub fn new(key: &str, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            i: Some(Value::String(key.to_string())),
            x: Some(number(x)),
            y: Some(number(y)),
            w: Some(number(w)),
            h: Some(number(h)),
            ..Self::default()
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.i = Some(Value::String(key.to_string()));
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = Some(is_static);
        self
    }

    /// The key if present and a string.
    pub fn key(&self) -> Option<&str> {
        self.i.as_ref().and_then(Value::as_str)
    }
}

fn integer_field(value: &Option<Value>, index: usize, field: &'static str) -> Result<f64> {
    let value = value.as_ref().ok_or(LayoutError::MissingField { index, field })?;
    let number = value.as_f64().ok_or(LayoutError::NotANumber { index, field })?;
    if number.is_nan() {
        return Err(LayoutError::NotANumber { index, field });
    }
    if number.fract() != 0.0 {
        return Err(LayoutError::NotAnInteger { index, field, value: number });
    }
    Ok(number)
}

/// Coordinates beyond [`MAX_CELL`] are clamped, so a huge `y` still reads as "at the bottom".
fn coordinate_field(value: &Option<Value>, index: usize, field: &'static str) -> Result<i32> {
    let number = integer_field(value, index, field)?;
    Ok(number.clamp(-(MAX_CELL as f64), MAX_CELL as f64) as i32)
}

fn span_field(value: &Option<Value>, index: usize, field: &'static str) -> Result<i32> {
    let number = integer_field(value, index, field)?;
    if number < 1.0 || number > MAX_CELL as f64 {
        return Err(LayoutError::InvalidSpan { index, field, value: number as i64 });
    }
    Ok(number as i32)
}

fn check_span(index: usize, field: &'static str, value: i32) -> Result<()> {
    if !(1..=MAX_CELL).contains(&value) {
        return Err(LayoutError::InvalidSpan { index, field, value: value.into() });
    }
    Ok(())
}

fn check_coordinate(index: usize, field: &'static str, value: i32) -> Result<()> {
    if !(-MAX_CELL..=MAX_CELL).contains(&value) {
        return Err(LayoutError::CoordinateOutOfRange { index, field, value });
    }
    Ok(())
}

fn in_child(index: usize, child: usize, error: LayoutError) -> LayoutError {
    LayoutError::InvalidChild {
        index,
        child,
        error: Box::new(error),
    }
}

/// Validates a single raw item (children included) into a [`LayoutItem`].
pub fn validate_item(raw: &RawItem, index: usize) -> Result<LayoutItem> {
    let key = match &raw.i {
        None => return Err(LayoutError::MissingField { index, field: "i" }),
        Some(Value::String(key)) => key.clone(),
        Some(other) => {
            return Err(LayoutError::InvalidKey {
                index,
                found: other.to_string(),
            })
        }
    };

    let x = coordinate_field(&raw.x, index, "x")?;
    let y = coordinate_field(&raw.y, index, "y")?;
    let w = span_field(&raw.w, index, "w")?;
    let h = span_field(&raw.h, index, "h")?;

    let children = match &raw.children {
        Some(children) => children
            .iter()
            .enumerate()
            .map(|(child_index, child)| {
                validate_item(child, child_index).map_err(|error| in_child(index, child_index, error))
            })
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(LayoutItem {
        key,
        x,
        y,
        w,
        h,
        min_w: raw.min_w,
        min_h: raw.min_h,
        max_w: raw.max_w,
        max_h: raw.max_h,
        is_static: raw.is_static.unwrap_or(false),
        is_draggable: Toggle::from(raw.is_draggable),
        is_resizable: Toggle::from(raw.is_resizable),
        moved: false,
        is_bounded: raw.is_bounded.unwrap_or(false),
        is_group: raw.is_group.unwrap_or(!children.is_empty()),
        children,
    })
}

/// Validates a whole layout. Fails on the first malformed item; nothing is coerced.
pub fn validate_layout(raw: &[RawItem]) -> Result<Layout> {
    let layout = raw
        .iter()
        .enumerate()
        .map(|(index, item)| validate_item(item, index))
        .collect::<Result<Layout>>()?;
    ensure_unique_keys(&layout)?;
    tracing::debug!("Validated layout with {} items", layout.len());
    Ok(layout)
}

/// Checks key uniqueness across the layout, group children included.
pub fn ensure_unique_keys(layout: &[LayoutItem]) -> Result<()> {
    let mut seen = HashSet::new();
    for item in layout {
        for key in item.keys() {
            if !seen.insert(key) {
                return Err(LayoutError::DuplicateKey(key.to_string()));
            }
        }
    }
    Ok(())
}

fn check_item(item: &LayoutItem, index: usize) -> Result<()> {
    check_coordinate(index, "x", item.x)?;
    check_coordinate(index, "y", item.y)?;
    check_span(index, "w", item.w)?;
    check_span(index, "h", item.h)?;
    for (child_index, child) in item.children.iter().enumerate() {
        check_item(child, child_index).map_err(|error| in_child(index, child_index, error))?;
    }
    Ok(())
}

/// Validates an already typed layout: coordinate range, spans and key uniqueness.
pub fn check_layout(layout: &[LayoutItem]) -> Result<()> {
    for (index, item) in layout.iter().enumerate() {
        check_item(item, index)?;
    }
    ensure_unique_keys(layout)
}

pub fn parse_layout_json(json: &str) -> Result<Layout> {
    let raw: Vec<RawItem> = serde_json::from_str(json).map_err(|e| LayoutError::MalformedLayout(e.to_string()))?;
    validate_layout(&raw)
}
