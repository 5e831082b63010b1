//! Bulk operations on rectangular ranges: copy, paste, clear
//!
//! Copied text is the clipboard format spreadsheets exchange: one line per
//! row, cells separated by tabs, values rather than formulas.

use crate::calculation::{CalculationOptions, GridCalculationExt};
use crate::{CellAddress, CellRange, CellValue, Grid, Result};

/// What a paste does with cells that land outside the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasteOverflow {
    /// Skip them
    #[default]
    Drop,
    /// Grow the grid to fit the pasted block
    Expand,
}

/// Extension trait for Grid to add range operations
pub trait RangeOps {
    /// Serialize the values of a range as tab/newline separated text
    ///
    /// Cells outside the grid are written as empty fields, so the text always
    /// has the shape of the range.
    fn copy_range(&self, range: &CellRange) -> String;

    /// Write a tab/newline separated block into the grid at `anchor`
    ///
    /// Every field is stored the way [`GridCalculationExt::set_cell`] would
    /// store it, followed by a single recalculation. Returns the number of
    /// cells written.
    fn paste_text(
        &mut self,
        anchor: CellAddress,
        text: &str,
        overflow: PasteOverflow,
        options: &CalculationOptions,
    ) -> Result<usize>;

    /// Clear values and formulas in a range (styles stay) and recalculate
    ///
    /// Returns whether any formula value changed as a result.
    fn clear(&mut self, range: &CellRange, options: &CalculationOptions) -> bool;
}

impl RangeOps for Grid {
    fn copy_range(&self, range: &CellRange) -> String {
        (range.start.row..=range.end.row)
            .map(|row| {
                (range.start.col..=range.end.col)
                    .map(|col| self.value_at(CellAddress::new(row, col)).to_string())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn paste_text(
        &mut self,
        anchor: CellAddress,
        text: &str,
        overflow: PasteOverflow,
        options: &CalculationOptions,
    ) -> Result<usize> {
        let block: Vec<Vec<&str>> = pasted_rows(text)
            .map(|line| line.split('\t').collect())
            .collect();

        // Grow once up front so a block that cannot fit fails before any
        // cell is written
        if overflow == PasteOverflow::Expand {
            let width = block.iter().map(Vec::len).max().unwrap_or(0);
            if width > 0 {
                self.expand_if_needed(anchor.row + block.len() - 1, anchor.col + width - 1)?;
            }
        }

        let mut written = 0;
        let mut dropped = 0;

        for (r, line) in block.iter().enumerate() {
            for (c, &field) in line.iter().enumerate() {
                let (row, col) = (anchor.row + r, anchor.col + c);

                if overflow == PasteOverflow::Drop && !self.contains(row, col) {
                    dropped += 1;
                    continue;
                }

                if field.starts_with('=') {
                    self.set_formula_result(row, col, field, CellValue::Empty)?;
                } else {
                    self.set_literal(row, col, field)?;
                }
                written += 1;
            }
        }

        if dropped > 0 {
            log::debug!("paste at {} dropped {} cells outside the grid", anchor, dropped);
        }

        self.recalc_with_options(options);
        Ok(written)
    }

    fn clear(&mut self, range: &CellRange, options: &CalculationOptions) -> bool {
        if self.clear_range(range) == 0 {
            return false;
        }
        self.recalc_with_options(options).mutated()
    }
}

/// Lines of a pasted block, without carriage returns
///
/// Every line counts, including an empty last one, so pasting the copy of a
/// blank range clears the same cells.
fn pasted_rows(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}
