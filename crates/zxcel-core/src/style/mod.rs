//! Cell styling types
//!
//! Styles are purely presentational: the formula engine never reads them,
//! and clearing a cell's content leaves its style in place.

mod color;
mod font;

pub use color::Color;
pub use font::{FontSlant, FontStyle, FontWeight};

/// Complete cell style
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellStyle {
    /// Font settings
    pub font: FontStyle,
    /// Background fill, if any
    pub fill: Option<Color>,
}

impl CellStyle {
    /// Create a new default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Bold or normal weight
    pub fn bold(mut self, bold: bool) -> Self {
        self.font.weight = if bold {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        };
        self
    }

    /// Italic or upright
    pub fn italic(mut self, italic: bool) -> Self {
        self.font.slant = if italic {
            FontSlant::Italic
        } else {
            FontSlant::Normal
        };
        self
    }

    /// Set font family
    pub fn font_family<S: Into<String>>(mut self, family: S) -> Self {
        self.font.family = family.into();
        self
    }

    /// Set font size
    pub fn font_size(mut self, size: f64) -> Self {
        self.font.size = size;
        self
    }

    /// Set background fill color
    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    /// Check if this is the default style
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
