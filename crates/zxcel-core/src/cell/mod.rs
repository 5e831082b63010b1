//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The derived value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A normalized rectangle of cells (e.g., "A1:B10")
//! - [`Cell`] - Complete cell data including formula text and style

mod address;
mod data;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use data::Cell;
pub use value::{format_number, CellError, CellType, CellValue, ERROR_MARKER};
