//! Error types for zxcel-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in zxcel-core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed A1-style reference text
    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    /// Malformed range text
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Coordinates outside the grid (or beyond the growth limits)
    #[error("Cell at row {row}, column {col} is out of bounds ({rows} x {cols})")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Color text that is not `#RRGGBB`
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}
