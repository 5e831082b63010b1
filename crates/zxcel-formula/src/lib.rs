//! # zxcel-formula
//!
//! Formula parser and evaluator for zxcel.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → value) against a [`zxcel_core::Grid`]
//! - The built-in aggregates (SUM, AVERAGE, MIN, MAX, COUNT, SUMIF, COUNTIF)
//!   under their English, legacy and Russian names
//! - Dependency tracking for recalculation order and cycle detection
//!
//! ## Example
//!
//! ```rust
//! use zxcel_core::{CellValue, Grid};
//! use zxcel_formula::{evaluate, parse_formula, EvaluationContext, FormulaValue};
//!
//! let mut grid = Grid::default();
//! grid.set_literal(0, 0, "4").unwrap();
//! grid.set_literal(1, 0, "6").unwrap();
//!
//! let ast = parse_formula("=AVERAGE(A1:A2)*10").unwrap();
//! let result = evaluate(&ast, &EvaluationContext::new(&grid)).unwrap();
//! assert_eq!(result, FormulaValue::Number(50.0));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use dependency::{CalculationOrder, DependencyGraph};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{
    evaluate, evaluate_formula, evaluate_formula_at, evaluate_to_cell_value, EvaluationContext,
    FormulaValue,
};
pub use functions::criteria::CriteriaMatcher;
pub use parser::parse_formula;
