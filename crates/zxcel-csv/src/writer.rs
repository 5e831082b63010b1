//! Saving a grid as delimited text

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvExport, CsvWriteOptions};
use zxcel_core::{Cell, Grid};

pub struct CsvWriter;

impl CsvWriter {
    pub fn write_file<P: AsRef<Path>>(
        grid: &Grid,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        Self::write(grid, File::create(path)?, options)
    }

    /// Write one record per grid row
    ///
    /// Unless `full_grid` is set, output stops at the last non-blank row and
    /// column, so a blank grid writes nothing.
    pub fn write<W: Write>(grid: &Grid, output: W, options: &CsvWriteOptions) -> CsvResult<()> {
        let mut out = options
            .dialect
            .writer()
            .terminator(options.line_terminator.into())
            .from_writer(output);

        let extent = if options.full_grid {
            grid.full_range()
        } else {
            grid.used_range()
        };

        if let Some(range) = extent {
            for row in range.start.row..=range.end.row {
                out.write_record((range.start.col..=range.end.col).map(|col| {
                    grid.get(row, col)
                        .map(|cell| field(cell, options.export))
                        .unwrap_or_default()
                }))?;
            }
            log::debug!("wrote {} delimited rows", range.row_count());
        }

        out.flush()?;
        Ok(())
    }

    pub fn write_string(grid: &Grid, options: &CsvWriteOptions) -> CsvResult<String> {
        let mut buf = Vec::new();
        Self::write(grid, &mut buf, options)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn field(cell: &Cell, export: CsvExport) -> String {
    match export {
        CsvExport::Values => cell.value.to_string(),
        CsvExport::Formulas => cell.input_text(),
    }
}
