//! # zxcel-core
//!
//! Core data structures for the zxcel spreadsheet engine.
//!
//! This crate provides the fundamental types used throughout zxcel:
//! - [`CellValue`], [`CellType`] and [`CellError`] - What a cell holds
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`CellStyle`] - Presentational cell formatting (font, fill)
//! - [`Grid`] - The rectangular, growable store of cells
//! - [`Selection`] - The cell or range an editor operation targets
//! - [`CellRecord`] - The row-major exchange format used by importers and exporters
//!
//! ## Example
//!
//! ```rust
//! use zxcel_core::{CellValue, Grid};
//!
//! let mut grid = Grid::new(20, 10);
//!
//! grid.set_literal(1, 1, "10").unwrap();
//! grid.set_literal(2, 1, "twenty").unwrap();
//!
//! assert_eq!(grid.get(1, 1).unwrap().value, CellValue::Number(10.0));
//! assert_eq!(grid.cell("B3").unwrap().value, CellValue::Text("twenty".into()));
//! ```

pub mod cell;
pub mod error;
pub mod grid;
pub mod record;
pub mod selection;
pub mod style;

// Re-exports for convenience
pub use cell::{
    format_number, Cell, CellAddress, CellError, CellRange, CellType, CellValue, ERROR_MARKER,
};
pub use error::{Error, Result};
pub use grid::{Grid, DEFAULT_COLS, DEFAULT_ROWS};
pub use record::CellRecord;
pub use selection::Selection;
pub use style::{CellStyle, Color, FontSlant, FontStyle, FontWeight};

/// Maximum number of rows a grid may grow to
pub const MAX_ROWS: usize = 1_048_576;

/// Maximum number of columns a grid may grow to
pub const MAX_COLS: usize = 16_384;
