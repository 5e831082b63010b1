//! The editor session: one grid, the current selection and its options

use crate::calculation::{CalculationOptions, CalculationStats, GridCalculationExt};
use crate::clipboard::Clipboard;
use crate::range_ops::{PasteOverflow, RangeOps};
use crate::{
    Cell, CellAddress, CellRange, CellRecord, CellStyle, CellValue, Grid, Result, Selection,
    DEFAULT_COLS, DEFAULT_ROWS,
};

/// Options for a spreadsheet session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetOptions {
    /// Rows in a new grid (default: 20)
    pub initial_rows: usize,
    /// Columns in a new grid (default: 10)
    pub initial_cols: usize,
    /// What pasting past the grid edge does
    pub paste_overflow: PasteOverflow,
    /// Recalculation options used after every edit
    pub calculation: CalculationOptions,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            initial_rows: DEFAULT_ROWS,
            initial_cols: DEFAULT_COLS,
            paste_overflow: PasteOverflow::Drop,
            calculation: CalculationOptions::default(),
        }
    }
}

/// A spreadsheet being edited
///
/// Every mutating method leaves the grid fully recalculated, so reads never
/// see a formula value that is out of date.
///
/// # Example
///
/// ```rust
/// use zxcel::prelude::*;
///
/// let mut sheet = Spreadsheet::new();
/// sheet.set_cell(1, 1, "10").unwrap();
/// sheet.set_cell(2, 1, "20").unwrap();
/// sheet.set_cell(3, 1, "=SUM(B2:B3)").unwrap();
///
/// let total = sheet.cell("B4").unwrap();
/// assert_eq!(total.value, CellValue::Number(30.0));
/// assert_eq!(total.cell_type(), CellType::Number);
/// ```
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    grid: Grid,
    selection: Option<Selection>,
    options: SheetOptions,
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Spreadsheet {
    /// Create a sheet with the default 20 x 10 grid
    pub fn new() -> Self {
        Self::with_options(SheetOptions::default())
    }

    /// Create an empty sheet with custom options
    pub fn with_options(options: SheetOptions) -> Self {
        Self {
            grid: Grid::new(options.initial_rows, options.initial_cols),
            selection: None,
            options,
        }
    }

    /// Wrap an existing grid, recalculating its formulas
    pub fn from_grid(mut grid: Grid, options: SheetOptions) -> Self {
        grid.recalc_with_options(&options.calculation);
        Self {
            grid,
            selection: None,
            options,
        }
    }

    /// Load row-major records, recalculating their formulas
    pub fn from_records(records: Vec<Vec<CellRecord>>, options: SheetOptions) -> Self {
        Self::from_grid(Grid::from_records(records), options)
    }

    /// The underlying grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Take the grid out of the session
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// Session options
    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    /// Get a cell by row and column indices
    pub fn get(&self, row: usize, col: usize) -> Result<&Cell> {
        Ok(self.grid.get(row, col)?)
    }

    /// Get a cell by address string (e.g., "B4")
    pub fn cell(&self, reference: &str) -> Result<&Cell> {
        Ok(self.grid.cell(reference)?)
    }

    /// Store raw input in a cell (see [`GridCalculationExt::set_cell`])
    pub fn set_cell(&mut self, row: usize, col: usize, raw: &str) -> Result<CalculationStats> {
        self.grid
            .set_cell_with_options(row, col, raw, &self.options.calculation)
    }

    /// Store raw input in the cell named by an address string
    pub fn set_cell_ref(&mut self, reference: &str, raw: &str) -> Result<CalculationStats> {
        let addr = CellAddress::parse(reference)?;
        self.set_cell(addr.row, addr.col, raw)
    }

    /// Evaluate input against the current grid without storing it
    ///
    /// Unlike cell edits, a failing formula is returned as an error.
    pub fn evaluate(&self, input: &str) -> Result<CellValue> {
        Ok(zxcel_formula::evaluate_formula(input, &self.grid)?)
    }

    /// Insert an empty row before `index` and recalculate
    ///
    /// Formula text is left as written; references are not shifted.
    pub fn insert_row(&mut self, index: usize) -> Result<()> {
        self.grid.insert_row(index)?;
        self.recalc();
        Ok(())
    }

    /// Insert an empty column before `index` and recalculate
    pub fn insert_column(&mut self, index: usize) -> Result<()> {
        self.grid.insert_column(index)?;
        self.recalc();
        Ok(())
    }

    /// Clear a range (styles stay), returning whether any formula changed
    pub fn clear_range(&mut self, range: &CellRange) -> bool {
        self.grid.clear(range, &self.options.calculation)
    }

    /// Set a cell's style, growing the grid if needed
    pub fn set_style(&mut self, row: usize, col: usize, style: CellStyle) -> Result<()> {
        Ok(self.grid.set_style(row, col, style)?)
    }

    /// Recalculate every formula cell
    pub fn recalc(&mut self) -> CalculationStats {
        self.grid.recalc_with_options(&self.options.calculation)
    }

    /// Convert the grid into row-major records
    pub fn to_records(&self) -> Vec<Vec<CellRecord>> {
        self.grid.to_records()
    }

    // === Selection ===

    /// Current selection
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Select a single cell
    pub fn select_cell(&mut self, addr: CellAddress) {
        self.selection = Some(Selection::Cell(addr));
    }

    /// Select the rectangle between two corners, in any order
    pub fn select_range(&mut self, from: CellAddress, to: CellAddress) {
        self.selection = Some(Selection::between(from, to));
    }

    /// Forget the selection
    pub fn clear_selection_state(&mut self) {
        self.selection = None;
    }

    /// Reference text of the selection (`B2` or `A1:C3`)
    pub fn selection_reference(&self) -> Option<String> {
        self.selection.map(|s| s.reference())
    }

    /// Append the selection reference to formula text
    ///
    /// Returns the formula unchanged when nothing is selected.
    pub fn insert_selection_into_formula(&self, formula: &str) -> String {
        match self.selection_reference() {
            Some(reference) => format!("{}{}", formula, reference),
            None => formula.to_string(),
        }
    }

    /// Average over the selected cells inside the grid
    ///
    /// Every cell counts, with non-numeric cells contributing 0. `None` when
    /// nothing is selected.
    pub fn selection_average(&self) -> Option<f64> {
        let range = self.selection?.range();

        let (sum, count) = self
            .grid
            .range_cells(&range)
            .fold((0.0, 0usize), |(sum, count), (_, cell)| {
                (sum + cell.value.number_or_zero(), count + 1)
            });

        if count == 0 {
            return Some(0.0);
        }
        Some(sum / count as f64)
    }

    /// Clear the selected cells (the Delete key)
    ///
    /// Returns whether any formula value changed.
    pub fn delete_selection(&mut self) -> bool {
        match self.selection {
            Some(selection) => self.clear_range(&selection.range()),
            None => false,
        }
    }

    /// Copy the selected values to the clipboard
    ///
    /// Returns `false` without touching the clipboard when nothing is
    /// selected.
    pub fn copy_selection<C: Clipboard>(&self, clipboard: &mut C) -> Result<bool> {
        let Some(selection) = self.selection else {
            return Ok(false);
        };
        clipboard.write_text(&self.grid.copy_range(&selection.range()))?;
        Ok(true)
    }

    /// Paste clipboard text at the selection's top-left cell
    ///
    /// Returns the number of cells written.
    pub fn paste_from<C: Clipboard>(&mut self, clipboard: &mut C) -> Result<usize> {
        let Some(selection) = self.selection else {
            return Ok(0);
        };
        let text = clipboard.read_text()?;
        self.grid.paste_text(
            selection.anchor(),
            &text,
            self.options.paste_overflow,
            &self.options.calculation,
        )
    }

    /// Paste text at an explicit anchor
    pub fn paste_text(&mut self, anchor: CellAddress, text: &str) -> Result<usize> {
        self.grid.paste_text(
            anchor,
            text,
            self.options.paste_overflow,
            &self.options.calculation,
        )
    }
}

#[cfg(feature = "csv")]
mod csv_io {
    use super::{SheetOptions, Spreadsheet};
    use crate::Result;
    use std::path::Path;
    use zxcel_csv::{CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};

    impl Spreadsheet {
        /// Load a CSV/TSV file and recalculate its formulas
        pub fn open_csv<P: AsRef<Path>>(
            path: P,
            read_options: &CsvReadOptions,
            options: SheetOptions,
        ) -> Result<Self> {
            let grid = CsvReader::read_file(path, read_options)?;
            Ok(Self::from_grid(grid, options))
        }

        /// Save the grid as a CSV/TSV file
        pub fn save_csv<P: AsRef<Path>>(
            &self,
            path: P,
            write_options: &CsvWriteOptions,
        ) -> Result<()> {
            CsvWriter::write_file(&self.grid, path, write_options)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::{CellError, Error};
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    #[test]
    fn test_custom_dimensions() {
        let sheet = Spreadsheet::with_options(SheetOptions {
            initial_rows: 3,
            initial_cols: 2,
            ..SheetOptions::default()
        });
        assert_eq!(sheet.grid().dimensions(), (3, 2));
    }

    #[test]
    fn test_set_cell_ref() {
        let mut sheet = Spreadsheet::new();
        sheet.set_cell_ref("C2", "7").unwrap();
        assert_eq!(sheet.get(1, 2).unwrap().value, CellValue::Number(7.0));
        assert!(matches!(
            sheet.set_cell_ref("2C", "7"),
            Err(Error::Core(zxcel_core::Error::InvalidReference(_)))
        ));
    }

    #[test]
    fn test_evaluate_does_not_store() {
        let mut sheet = Spreadsheet::new();
        sheet.set_cell(0, 0, "4").unwrap();

        assert_eq!(sheet.evaluate("=A1^2").unwrap(), CellValue::Number(16.0));
        assert_eq!(sheet.evaluate("plain").unwrap(), CellValue::Text("plain".into()));
        assert!(matches!(sheet.evaluate("=1/0"), Err(Error::Formula(_))));
        assert!(sheet.get(0, 1).unwrap().is_blank());
    }

    #[test]
    fn test_insert_row_keeps_formula_text() {
        let mut sheet = Spreadsheet::new();
        sheet.set_cell(0, 0, "1").unwrap();
        sheet.set_cell(1, 0, "=A1+1").unwrap();

        sheet.insert_row(0).unwrap();
        assert_eq!(sheet.grid().dimensions(), (21, 10));
        // The formula moved to A3 but still reads A1, which is now blank
        let moved = sheet.get(2, 0).unwrap();
        assert_eq!(moved.formula_text(), Some("=A1+1"));
        assert_eq!(moved.value, CellValue::Number(1.0));

        sheet.insert_column(10).unwrap();
        assert_eq!(sheet.grid().dimensions(), (21, 11));
        assert!(sheet.insert_column(20).is_err());
    }

    #[test]
    fn test_selection_reference_and_formula_insert() {
        let mut sheet = Spreadsheet::new();
        assert_eq!(sheet.insert_selection_into_formula("=SUM("), "=SUM(");

        sheet.select_range(addr("C4"), addr("A1"));
        assert_eq!(sheet.selection_reference().as_deref(), Some("A1:C4"));
        assert_eq!(sheet.insert_selection_into_formula("=SUM("), "=SUM(A1:C4");

        sheet.select_cell(addr("B2"));
        assert_eq!(sheet.selection_reference().as_deref(), Some("B2"));

        sheet.clear_selection_state();
        assert_eq!(sheet.selection(), None);
    }

    #[test]
    fn test_selection_average_counts_every_cell() {
        let mut sheet = Spreadsheet::new();
        assert_eq!(sheet.selection_average(), None);

        sheet.set_cell(0, 0, "3").unwrap();
        sheet.set_cell(1, 0, "text").unwrap();
        sheet.set_cell(2, 0, "6").unwrap();
        sheet.select_range(addr("A1"), addr("A4"));

        assert_eq!(sheet.selection_average(), Some(2.25));

        sheet.select_range(addr("Z50"), addr("Z60"));
        assert_eq!(sheet.selection_average(), Some(0.0));
    }

    #[test]
    fn test_delete_selection() {
        let mut sheet = Spreadsheet::new();
        sheet.set_cell(0, 0, "2").unwrap();
        sheet.set_cell(0, 1, "=A1*5").unwrap();
        sheet
            .set_style(0, 0, CellStyle::default().bold(true))
            .unwrap();

        assert!(!sheet.delete_selection());

        sheet.select_cell(addr("A1"));
        assert!(sheet.delete_selection());
        assert_eq!(sheet.get(0, 1).unwrap().value, CellValue::Number(0.0));
        assert!(sheet.get(0, 0).unwrap().style.font.is_bold());
    }

    #[test]
    fn test_copy_and_paste_through_clipboard() {
        let mut sheet = Spreadsheet::new();
        let mut clipboard = MemoryClipboard::new();

        assert!(!sheet.copy_selection(&mut clipboard).unwrap());
        assert_eq!(sheet.paste_from(&mut clipboard).unwrap(), 0);

        sheet.set_cell(0, 0, "1").unwrap();
        sheet.set_cell(1, 0, "=A1/0").unwrap();
        sheet.select_range(addr("A1"), addr("A2"));
        assert!(sheet.copy_selection(&mut clipboard).unwrap());
        assert_eq!(clipboard.contents(), Some("1\n#ERROR"));

        sheet.select_cell(addr("C1"));
        assert_eq!(sheet.paste_from(&mut clipboard).unwrap(), 2);
        assert_eq!(sheet.cell("C1").unwrap().value, CellValue::Number(1.0));
        assert_eq!(
            sheet.cell("C2").unwrap().value,
            CellValue::Text("#ERROR".into())
        );
        assert_eq!(
            sheet.cell("A2").unwrap().value,
            CellValue::Error(CellError::DivisionByZero)
        );
    }

    #[test]
    fn test_paste_overflow_policy() {
        let mut sheet = Spreadsheet::with_options(SheetOptions {
            initial_rows: 1,
            initial_cols: 1,
            paste_overflow: PasteOverflow::Expand,
            ..SheetOptions::default()
        });

        assert_eq!(sheet.paste_text(addr("A1"), "1\t2\n3\t=A1+D4").unwrap(), 4);
        assert_eq!(sheet.grid().dimensions(), (2, 2));
        assert_eq!(sheet.cell("B2").unwrap().value, CellValue::Number(1.0));
    }

    #[test]
    fn test_from_records_recalculates() {
        let records = vec![
            vec![CellRecord::literal("2"), CellRecord::formula("stale", "=A1*A1")],
            vec![CellRecord::literal("x")],
        ];
        let sheet = Spreadsheet::from_records(records, SheetOptions::default());

        assert_eq!(sheet.grid().dimensions(), (2, 2));
        assert_eq!(sheet.cell("B1").unwrap().value, CellValue::Number(4.0));
        assert_eq!(sheet.to_records()[0][1].value, "4");
    }
}
