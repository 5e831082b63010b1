//! Dialect and import/export settings

/// Delimiter and quote byte shared by reading and writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvDialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl CsvDialect {
    pub const COMMA: CsvDialect = CsvDialect {
        delimiter: b',',
        quote: b'"',
    };

    pub const TAB: CsvDialect = CsvDialect {
        delimiter: b'\t',
        quote: b'"',
    };

    pub(crate) fn reader(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.delimiter(self.delimiter).quote(self.quote);
        builder
    }

    pub(crate) fn writer(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder.delimiter(self.delimiter).quote(self.quote);
        builder
    }
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self::COMMA
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvReadOptions {
    pub dialect: CsvDialect,
    /// Strip surrounding whitespace from every field
    pub trim: bool,
    /// Keep `=` fields as plain text instead of formulas
    pub formulas_as_text: bool,
}

impl CsvReadOptions {
    pub fn tsv() -> Self {
        Self {
            dialect: CsvDialect::TAB,
            ..Self::default()
        }
    }
}

/// What a written field holds for formula cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CsvExport {
    /// The computed value (`#ERROR` for failed formulas)
    #[default]
    Values,
    /// The raw `=` text
    Formulas,
}

#[derive(Debug, Clone)]
pub struct CsvWriteOptions {
    pub dialect: CsvDialect,
    pub line_terminator: LineTerminator,
    pub export: CsvExport,
    /// Write every row and column of the grid, not just up to the last
    /// non-blank cell
    pub full_grid: bool,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            dialect: CsvDialect::COMMA,
            line_terminator: LineTerminator::Lf,
            export: CsvExport::Values,
            full_grid: false,
        }
    }
}

impl CsvWriteOptions {
    pub fn tsv() -> Self {
        Self {
            dialect: CsvDialect::TAB,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineTerminator {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl From<LineTerminator> for csv::Terminator {
    fn from(terminator: LineTerminator) -> Self {
        match terminator {
            LineTerminator::Lf => csv::Terminator::Any(b'\n'),
            LineTerminator::CrLf => csv::Terminator::CRLF,
        }
    }
}
