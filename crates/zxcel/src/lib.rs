//! # zxcel
//!
//! A spreadsheet grid and formula engine.
//!
//! zxcel keeps a rectangular grid of cells, evaluates `=` formulas against
//! it and keeps every derived value current as the grid is edited.
//!
//! ## Features
//!
//! - Growable grid with row/column insertion, range clearing and styles
//! - Formulas with arithmetic, comparisons, `&` concatenation and the
//!   SUM, AVERAGE, MIN, MAX, COUNT, SUMIF and COUNTIF aggregates (English,
//!   legacy and Russian names)
//! - Dependency-ordered recalculation with reference cycle detection
//! - Copy/paste of tab-separated blocks through a [`Clipboard`]
//! - CSV/TSV import and export (`csv` feature, on by default)
//!
//! ## Example
//!
//! ```rust
//! use zxcel::prelude::*;
//!
//! let mut sheet = Spreadsheet::new();
//! sheet.set_cell(0, 0, "2").unwrap();
//! sheet.set_cell(1, 0, "pears").unwrap();
//! sheet.set_cell(2, 0, "8").unwrap();
//! sheet.set_cell(3, 0, "=COUNTIF(A1:A3, \">5\")").unwrap();
//! sheet.set_cell(4, 0, "=1/0").unwrap();
//!
//! assert_eq!(sheet.cell("A4").unwrap().value, CellValue::Number(1.0));
//! assert_eq!(sheet.cell("A5").unwrap().value.to_string(), "#ERROR");
//! ```

pub mod calculation;
pub mod clipboard;
pub mod error;
pub mod prelude;
pub mod range_ops;
pub mod sheet;

pub use calculation::{CalculationOptions, CalculationStats, GridCalculationExt};
pub use clipboard::{Clipboard, MemoryClipboard};
pub use error::{Error, Result};
pub use range_ops::{PasteOverflow, RangeOps};
pub use sheet::{SheetOptions, Spreadsheet};

// Re-export core types
pub use zxcel_core::{
    format_number, Cell, CellAddress, CellError, CellRange, CellRecord, CellStyle, CellType,
    CellValue, Color, FontSlant, FontStyle, FontWeight, Grid, Selection, DEFAULT_COLS,
    DEFAULT_ROWS, ERROR_MARKER, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use zxcel_formula::{
    evaluate, evaluate_formula, parse_formula, EvaluationContext, FormulaError, FormulaExpr,
    FormulaResult, FormulaValue,
};

// Re-export I/O types
#[cfg(feature = "csv")]
pub use zxcel_csv::{
    CsvDialect, CsvError, CsvExport, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter,
    LineTerminator,
};
