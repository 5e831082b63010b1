//! Complete cell data

use super::{CellType, CellValue};
use crate::style::CellStyle;

/// One addressable unit of the grid
///
/// `formula` holds the raw `=`-prefixed text for formula cells and is `None`
/// for literal cells; `value` is always the derived, displayed content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    /// Derived value
    pub value: CellValue,
    /// Raw formula text (e.g., "=SUM(B2:B3)")
    pub formula: Option<String>,
    /// Presentational style, never evaluated
    pub style: CellStyle,
}

impl Cell {
    /// Create an empty cell with the default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a literal cell from raw input
    pub fn literal(raw: &str) -> Self {
        Self {
            value: CellValue::from_literal(raw),
            ..Self::default()
        }
    }

    /// Create a formula cell with an already computed value
    pub fn with_formula<S: Into<String>>(formula: S, value: CellValue) -> Self {
        Self {
            value,
            formula: Some(formula.into()),
            style: CellStyle::default(),
        }
    }

    /// Set the style (builder)
    pub fn styled(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }

    /// The derived type of the current value
    pub fn cell_type(&self) -> CellType {
        self.value.cell_type()
    }

    /// Check if this cell holds a formula
    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// Formula text, if any
    pub fn formula_text(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    /// Check if the cell has neither a value nor a formula
    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.formula.is_none()
    }

    /// The raw text a user would see when editing this cell
    pub fn input_text(&self) -> String {
        match &self.formula {
            Some(f) => f.clone(),
            None => self.value.to_string(),
        }
    }

    /// Reset value and formula, keeping the style
    pub fn clear_content(&mut self) {
        self.value = CellValue::Empty;
        self.formula = None;
    }
}
