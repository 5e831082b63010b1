//! Loading delimited text into a grid

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;
use zxcel_core::{CellRecord, Grid};

pub struct CsvReader;

impl CsvReader {
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Grid> {
        Self::read(File::open(path)?, options)
    }

    /// Build a grid from delimited text
    ///
    /// Rows of different lengths are padded; an empty input yields the
    /// default grid. Formula cells come back without a computed value.
    pub fn read<R: Read>(input: R, options: &CsvReadOptions) -> CsvResult<Grid> {
        let mut records = options
            .dialect
            .reader()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);

        let rows = records
            .records()
            .map(|record| {
                record.map(|fields| {
                    fields
                        .iter()
                        .map(|field| cell_record(field, options))
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("read {} delimited rows", rows.len());
        Ok(Grid::from_records(rows))
    }
}

fn cell_record(field: &str, options: &CsvReadOptions) -> CellRecord {
    let field = if options.trim { field.trim() } else { field };

    if field.starts_with('=') && !options.formulas_as_text {
        CellRecord::formula("", field)
    } else {
        CellRecord::literal(field)
    }
}
