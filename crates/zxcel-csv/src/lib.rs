//! # zxcel-csv
//!
//! CSV and TSV import/export for zxcel grids.
//!
//! Fields starting with `=` are read back as formulas; their values are
//! filled in by the next recalculation. Export writes either the computed
//! values or the raw formula text.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvDialect, CsvExport, CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::CsvReader;
pub use writer::CsvWriter;
