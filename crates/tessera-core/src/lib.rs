// crates/tessera-core/src/lib.rs
pub mod item;
pub mod config;
pub mod validate;
pub mod metrics;

pub use item::*;
pub use config::*;
pub use validate::*;
pub use metrics::*;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LayoutError {
    #[error("Item {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Item {index} has a non-numeric value for '{field}'")]
    NotANumber { index: usize, field: &'static str },

    #[error("Item {index} has a fractional value for '{field}': {value}")]
    NotAnInteger { index: usize, field: &'static str, value: f64 },

    #[error("Item {index} has an invalid span {field}={value}, spans must be between 1 and {max}", max = MAX_CELL)]
    InvalidSpan { index: usize, field: &'static str, value: i64 },

    #[error("Item {index} has {field}={value}, coordinates must stay within +/-{max}", max = MAX_CELL)]
    CoordinateOutOfRange { index: usize, field: &'static str, value: i32 },

    #[error("Item {index} has a non-string key: {found}")]
    InvalidKey { index: usize, found: String },

    #[error("Child {child} of item {index}: {error}")]
    InvalidChild { index: usize, child: usize, error: Box<LayoutError> },

    #[error("Duplicate item key: {0}")]
    DuplicateKey(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed layout: {0}")]
    MalformedLayout(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
