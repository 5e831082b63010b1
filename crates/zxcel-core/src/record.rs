//! Row-major exchange format used by importers and exporters

use crate::cell::{Cell, CellValue};
use crate::grid::Grid;
use crate::style::CellStyle;

/// One cell as it crosses the persistence boundary
///
/// `value` is the displayed text, `formula` the raw `=` text (empty for
/// literal cells).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRecord {
    /// Displayed value
    pub value: String,
    /// Raw formula text, empty when the cell is a literal
    #[cfg_attr(feature = "serde", serde(default))]
    pub formula: String,
    /// Cell style
    #[cfg_attr(feature = "serde", serde(default))]
    pub style: CellStyle,
}

impl CellRecord {
    /// Create a record for a literal value
    pub fn literal<S: Into<String>>(value: S) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Create a record for a formula cell with its last displayed value
    pub fn formula<V: Into<String>, F: Into<String>>(value: V, formula: F) -> Self {
        Self {
            value: value.into(),
            formula: formula.into(),
            style: CellStyle::default(),
        }
    }

    fn into_cell(self) -> Cell {
        let value = CellValue::from_literal(&self.value);
        let formula = if self.formula.starts_with('=') {
            Some(self.formula)
        } else {
            None
        };

        Cell {
            value,
            formula,
            style: self.style,
        }
    }
}

impl From<&Cell> for CellRecord {
    fn from(cell: &Cell) -> Self {
        Self {
            value: cell.value.to_string(),
            formula: cell.formula.clone().unwrap_or_default(),
            style: cell.style.clone(),
        }
    }
}

impl Grid {
    /// Build a grid from row-major records
    ///
    /// Ragged input is padded to a rectangle. Formula cells keep their stored
    /// value until the next recalculation. Empty input yields the default grid.
    pub fn from_records(records: Vec<Vec<CellRecord>>) -> Self {
        if records.iter().all(Vec::is_empty) {
            return Grid::default();
        }

        Grid::from_rows(
            records
                .into_iter()
                .map(|row| row.into_iter().map(CellRecord::into_cell).collect())
                .collect(),
        )
    }

    /// Convert the grid into row-major records
    pub fn to_records(&self) -> Vec<Vec<CellRecord>> {
        self.rows()
            .iter()
            .map(|row| row.iter().map(CellRecord::from).collect())
            .collect()
    }
}
