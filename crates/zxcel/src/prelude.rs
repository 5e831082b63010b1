//! Prelude module - common imports for zxcel users
//!
//! ```rust
//! use zxcel::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationOptions,
    CalculationStats,
    // Cell types
    Cell,
    CellAddress,
    CellError,
    CellRange,
    CellRecord,
    CellStyle,
    CellType,
    CellValue,
    // Clipboard
    Clipboard,
    Color,
    // Error types
    Error,
    FontStyle,
    // Main types
    Grid,
    // Extension traits
    GridCalculationExt,
    MemoryClipboard,
    PasteOverflow,
    RangeOps,
    Result,
    Selection,
    SheetOptions,
    Spreadsheet,
};

#[cfg(feature = "csv")]
pub use crate::{CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
