//! Error types for NBCLM

use thiserror::Error;

/// Main error type for NBCLM operations.
///
/// Only structural problems surface here. Per-pixel conditions (unobserved
/// values, night pixels seen by a day test, features outside the trained
/// range) are resolved inside the classifiers and never become errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Shape mismatch for {name}: expected ({er}, {ec}), got ({ar}, {ac})")]
    ShapeMismatch {
        name: String,
        er: usize,
        ec: usize,
        ar: usize,
        ac: usize,
    },

    #[error("Lookup table {table} not available for month {month}")]
    MissingTable { table: String, month: u8 },

    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Invalid lookup table {table}: {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for NBCLM operations
pub type Result<T> = std::result::Result<T, Error>;
