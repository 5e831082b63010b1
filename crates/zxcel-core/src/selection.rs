//! The cell or range an editor operation targets

use crate::cell::{CellAddress, CellRange};
use std::fmt;

/// A selected cell or rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    /// A single selected cell
    Cell(CellAddress),
    /// A dragged-out rectangle (normalized)
    Range(CellRange),
}

impl Selection {
    /// Select the rectangle between two corners
    ///
    /// Collapses to [`Selection::Cell`] when both corners are the same cell.
    pub fn between(a: CellAddress, b: CellAddress) -> Self {
        if a == b {
            Selection::Cell(a)
        } else {
            Selection::Range(CellRange::new(a, b))
        }
    }

    /// The top-left cell, which is where pastes land
    pub fn anchor(&self) -> CellAddress {
        match self {
            Selection::Cell(addr) => *addr,
            Selection::Range(range) => range.start,
        }
    }

    /// The selection as a range
    pub fn range(&self) -> CellRange {
        match self {
            Selection::Cell(addr) => CellRange::single(*addr),
            Selection::Range(range) => *range,
        }
    }

    /// Reference text to insert into a formula (`B2` or `A1:C3`)
    pub fn reference(&self) -> String {
        match self {
            Selection::Cell(addr) => addr.to_a1_string(),
            Selection::Range(range) => {
                format!("{}:{}", range.start.to_a1_string(), range.end.to_a1_string())
            }
        }
    }
}

impl From<CellAddress> for Selection {
    fn from(addr: CellAddress) -> Self {
        Selection::Cell(addr)
    }
}

impl From<CellRange> for Selection {
    fn from(range: CellRange) -> Self {
        Selection::Range(range)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference())
    }
}
