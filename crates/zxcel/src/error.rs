//! Error type for the zxcel facade

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by editor operations
///
/// Formula failures inside cells are not errors here: they are stored in the
/// cell and shown as `#ERROR`.
#[derive(Debug, Error)]
pub enum Error {
    /// Addressing or grid-shape error
    #[error(transparent)]
    Core(#[from] zxcel_core::Error),

    /// Formula error surfaced to the caller (direct evaluation only)
    #[error(transparent)]
    Formula(#[from] zxcel_formula::FormulaError),

    /// CSV import or export failed
    #[cfg(feature = "csv")]
    #[error(transparent)]
    Csv(#[from] zxcel_csv::CsvError),

    /// The clipboard could not be read or written
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}
