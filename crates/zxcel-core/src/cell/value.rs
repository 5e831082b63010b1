//! Derived cell values and their display text

use std::fmt;

/// The text every failed cell displays
pub const ERROR_MARKER: &str = "#ERROR";

/// What a cell shows after its input was classified or its formula evaluated
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    #[default]
    Empty,

    /// Numeric value (always finite)
    Number(f64),

    Text(String),

    /// The cell's formula failed; displayed as `#ERROR`
    Error(CellError),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Classify raw literal input
    ///
    /// Text that parses (after trimming) as a finite float becomes a number,
    /// empty text becomes [`CellValue::Empty`], everything else is kept verbatim.
    ///
    /// ```
    /// use zxcel_core::CellValue;
    ///
    /// assert_eq!(CellValue::from_literal(" 12.5 "), CellValue::Number(12.5));
    /// assert_eq!(CellValue::from_literal(""), CellValue::Empty);
    /// assert_eq!(CellValue::from_literal("inf"), CellValue::text("inf"));
    /// ```
    pub fn from_literal(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }

        match parse_finite(raw) {
            Some(n) => CellValue::Number(n),
            None => CellValue::Text(raw.to_string()),
        }
    }

    /// Whether the cell holds nothing
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// The number, if this is a numeric value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value for arithmetic
    ///
    /// Text counts when it parses as a finite number; blank cells, other text
    /// and errors count as 0.
    pub fn number_or_zero(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => parse_finite(s).unwrap_or(0.0),
            CellValue::Empty | CellValue::Error(_) => 0.0,
        }
    }

    /// The derived cell type
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Number(_) => CellType::Number,
            _ => CellType::String,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

/// A boolean result is stored as the text `TRUE` or `FALSE`
impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Text(if b { "TRUE" } else { "FALSE" }.to_string())
    }
}

/// Trimmed text as a finite float
fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse().ok().filter(|n: &f64| n.is_finite())
}

/// Format a number the way cells display it
///
/// Integral values print without a fractional part (`30`, not `30.0`).
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        // Also folds -0 into 0
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Cell type, mirroring the spreadsheet `t` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellType {
    /// Numeric cell ("n")
    Number,
    /// Anything else ("s")
    #[default]
    String,
}

impl CellType {
    /// Short type code
    pub fn code(&self) -> &'static str {
        match self {
            CellType::Number => "n",
            CellType::String => "s",
        }
    }

    /// Parse a short type code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "n" => Some(CellType::Number),
            "s" => Some(CellType::String),
            _ => None,
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Why a cell's formula failed
///
/// Every kind displays as the same `#ERROR` marker; the kind is kept for
/// diagnostics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellError {
    /// Parse failure or invalid operand
    Formula,
    /// Division by zero
    DivisionByZero,
    /// Call to a function that isn't built in
    UnknownFunction,
    /// The cell takes part in a reference cycle
    Circular,
}

impl CellError {
    /// The displayed marker
    pub fn as_str(&self) -> &'static str {
        ERROR_MARKER
    }

    /// Short diagnostic name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            CellError::Formula => "formula",
            CellError::DivisionByZero => "division by zero",
            CellError::UnknownFunction => "unknown function",
            CellError::Circular => "circular reference",
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
