//! The rectangular, growable cell store

use crate::cell::{Cell, CellAddress, CellRange, CellValue};
use crate::error::{Error, Result};
use crate::style::CellStyle;
use crate::{MAX_COLS, MAX_ROWS};

/// Default number of rows in a new grid
pub const DEFAULT_ROWS: usize = 20;

/// Default number of columns in a new grid
pub const DEFAULT_COLS: usize = 10;

/// A dense, row-major grid of cells
///
/// Every row always has exactly [`Grid::col_count`] cells. Writes past the
/// current bounds grow the grid first (see [`Grid::expand_if_needed`]);
/// reads past the bounds fail with [`Error::OutOfBounds`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    /// Width of every row, kept so a grid with no rows still has one
    cols: usize,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl Grid {
    /// Create a grid of empty cells
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.min(MAX_ROWS);
        let cols = cols.min(MAX_COLS);
        Self {
            rows: (0..rows).map(|_| empty_row(cols)).collect(),
            cols,
        }
    }

    /// Build a grid from already constructed rows
    ///
    /// Ragged input is padded with empty cells to the widest row.
    pub fn from_rows(mut rows: Vec<Vec<Cell>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize_with(cols, Cell::default);
        }
        Self { rows, cols }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.cols)
    }

    /// Check whether the coordinates address an existing cell
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows.len() && col < self.cols
    }

    /// The range covering the whole grid, if it has any cells
    pub fn full_range(&self) -> Option<CellRange> {
        if self.rows.is_empty() || self.cols == 0 {
            None
        } else {
            Some(CellRange::from_indices(
                0,
                0,
                self.rows.len() - 1,
                self.cols - 1,
            ))
        }
    }

    /// The range from A1 to the last row and column holding content
    ///
    /// `None` when every cell is blank.
    pub fn used_range(&self) -> Option<CellRange> {
        let mut last: Option<(usize, usize)> = None;
        for (addr, _) in self.iter().filter(|(_, cell)| !cell.is_blank()) {
            let (row, col) = last.unwrap_or((0, 0));
            last = Some((row.max(addr.row), col.max(addr.col)));
        }
        last.map(|(row, col)| CellRange::from_indices(0, 0, row, col))
    }

    /// Get a cell by row and column indices
    pub fn get(&self, row: usize, col: usize) -> Result<&Cell> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or_else(|| self.out_of_bounds(row, col))
    }

    /// Get a mutable cell by row and column indices
    pub fn get_mut(&mut self, row: usize, col: usize) -> Result<&mut Cell> {
        let err = self.out_of_bounds(row, col);
        self.rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(err)
    }

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<&Cell> {
        let addr = CellAddress::parse(address)?;
        self.get(addr.row, addr.col)
    }

    /// Get a cell by address, `None` when outside the grid
    pub fn cell_at(&self, addr: CellAddress) -> Option<&Cell> {
        self.rows.get(addr.row).and_then(|r| r.get(addr.col))
    }

    /// Value at an address, with cells outside the grid reading as empty
    pub fn value_at(&self, addr: CellAddress) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.cell_at(addr).map(|c| &c.value).unwrap_or(EMPTY)
    }

    /// Grow the grid so that `(row, col)` addresses an existing cell
    ///
    /// Appends rows of empty cells and/or an empty cell to every row until the
    /// coordinate fits, so addressing one past the edge adds exactly one row or
    /// column. Returns whether anything was added. Calling it again for the same
    /// coordinate is a no-op.
    pub fn expand_if_needed(&mut self, row: usize, col: usize) -> Result<bool> {
        if row >= MAX_ROWS || col >= MAX_COLS {
            return Err(Error::OutOfBounds {
                row,
                col,
                rows: MAX_ROWS,
                cols: MAX_COLS,
            });
        }

        let mut grew = false;

        if col >= self.cols {
            let new_cols = col + 1;
            for r in &mut self.rows {
                r.resize_with(new_cols, Cell::default);
            }
            log::debug!("grid grew from {} to {} columns", self.cols, new_cols);
            self.cols = new_cols;
            grew = true;
        }

        if row >= self.rows.len() {
            let old_rows = self.rows.len();
            let cols = self.cols;
            self.rows.resize_with(row + 1, || empty_row(cols));
            log::debug!("grid grew from {} to {} rows", old_rows, row + 1);
            grew = true;
        }

        Ok(grew)
    }

    /// Insert an empty row before `index` (`index == row_count()` appends)
    pub fn insert_row(&mut self, index: usize) -> Result<()> {
        if index > self.rows.len() || self.rows.len() >= MAX_ROWS {
            return Err(self.out_of_bounds(index, 0));
        }
        self.rows.insert(index, empty_row(self.cols));
        Ok(())
    }

    /// Insert an empty column before `index` (`index == col_count()` appends)
    pub fn insert_column(&mut self, index: usize) -> Result<()> {
        if index > self.cols || self.cols >= MAX_COLS {
            return Err(self.out_of_bounds(0, index));
        }
        for row in &mut self.rows {
            row.insert(index, Cell::default());
        }
        self.cols += 1;
        Ok(())
    }

    /// Clear value and formula of every cell in the range, keeping styles
    ///
    /// The range is clipped to the grid. Returns the number of cells visited.
    pub fn clear_range(&mut self, range: &CellRange) -> usize {
        let Some(range) = range.clip(self.rows.len(), self.cols) else {
            return 0;
        };

        for row in &mut self.rows[range.start.row..=range.end.row] {
            for cell in &mut row[range.start.col..=range.end.col] {
                cell.clear_content();
            }
        }

        range.cell_count()
    }

    /// Store a literal (non-formula) input, growing the grid if needed
    pub fn set_literal(&mut self, row: usize, col: usize, raw: &str) -> Result<()> {
        self.expand_if_needed(row, col)?;
        let cell = self.get_mut(row, col)?;
        cell.value = CellValue::from_literal(raw);
        cell.formula = None;
        Ok(())
    }

    /// Store formula text along with its computed value, growing the grid if needed
    pub fn set_formula_result<S: Into<String>>(
        &mut self,
        row: usize,
        col: usize,
        formula: S,
        value: CellValue,
    ) -> Result<()> {
        self.expand_if_needed(row, col)?;
        let cell = self.get_mut(row, col)?;
        cell.value = value;
        cell.formula = Some(formula.into());
        Ok(())
    }

    /// Replace only the derived value of an existing cell
    pub fn set_value(&mut self, row: usize, col: usize, value: CellValue) -> Result<()> {
        self.get_mut(row, col)?.value = value;
        Ok(())
    }

    /// Set a cell's style, growing the grid if needed
    pub fn set_style(&mut self, row: usize, col: usize, style: CellStyle) -> Result<()> {
        self.expand_if_needed(row, col)?;
        self.get_mut(row, col)?.style = style;
        Ok(())
    }

    /// Iterate over every cell, row by row
    pub fn iter(&self) -> impl Iterator<Item = (CellAddress, &Cell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, cell)| (CellAddress::new(r, c), cell))
        })
    }

    /// Iterate over formula cells, row by row
    pub fn formula_cells(&self) -> impl Iterator<Item = (CellAddress, &str)> + '_ {
        self.iter()
            .filter_map(|(addr, cell)| cell.formula_text().map(|f| (addr, f)))
    }

    /// Iterate over the cells of a range that lie inside the grid
    pub fn range_cells<'a>(
        &'a self,
        range: &CellRange,
    ) -> impl Iterator<Item = (CellAddress, &'a Cell)> + 'a {
        range
            .clip(self.rows.len(), self.cols)
            .into_iter()
            .flat_map(|r| r.cells())
            .filter_map(move |addr| self.cell_at(addr).map(|cell| (addr, cell)))
    }

    /// Borrow the rows
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> Error {
        Error::OutOfBounds {
            row,
            col,
            rows: self.rows.len(),
            cols: self.cols,
        }
    }
}

fn empty_row(cols: usize) -> Vec<Cell> {
    (0..cols).map(|_| Cell::default()).collect()
}
