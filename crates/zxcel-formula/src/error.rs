//! Formula error types

use thiserror::Error;
use zxcel_core::CellError;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Circular reference
    #[error("Circular reference detected")]
    CircularReference,
}

impl FormulaError {
    /// The error kind stored in the failing cell
    pub fn cell_error(&self) -> CellError {
        match self {
            FormulaError::DivisionByZero => CellError::DivisionByZero,
            FormulaError::UnknownFunction(_) => CellError::UnknownFunction,
            FormulaError::CircularReference => CellError::Circular,
            FormulaError::Parse(_)
            | FormulaError::Evaluation(_)
            | FormulaError::Argument(_)
            | FormulaError::ArgumentCount { .. } => CellError::Formula,
        }
    }
}
