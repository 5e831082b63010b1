//! Formula evaluator
//!
//! Evaluates formula ASTs bottom-up against a [`Grid`].

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{FunctionDef, FunctionRegistry};
use crate::parser::parse_formula;
use std::cmp::Ordering;
use std::sync::OnceLock;
use zxcel_core::{format_number, CellAddress, CellError, CellRange, CellValue, Grid};

fn function_registry() -> &'static FunctionRegistry {
    static REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();
    REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Boolean(bool),
    /// A failed cell read through a range
    Error(CellError),
    /// Raw cell values of a range, row by row
    Array(Vec<Vec<FormulaValue>>),
    Empty,
}

impl FormulaValue {
    /// Convert to number for arithmetic, if possible
    ///
    /// Blank counts as 0, booleans as 1/0, and text only if it is numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            FormulaValue::String(s) => s.trim().parse().ok().filter(|n: &f64| n.is_finite()),
            FormulaValue::Empty => Some(0.0),
            FormulaValue::Error(_) | FormulaValue::Array(_) => None,
        }
    }

    /// Force conversion to number for arithmetic
    pub fn to_number(&self) -> FormulaResult<f64> {
        self.as_number().ok_or_else(|| {
            FormulaError::Evaluation(format!("Expected a number, got {}", self.describe()))
        })
    }

    /// Convert to the text a cell would display
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::String(s) => s.clone(),
            FormulaValue::Boolean(true) => "TRUE".to_string(),
            FormulaValue::Boolean(false) => "FALSE".to_string(),
            FormulaValue::Error(e) => e.to_string(),
            FormulaValue::Empty => String::new(),
            FormulaValue::Array(_) => String::new(),
        }
    }

    /// Check if this is an array
    pub fn is_array(&self) -> bool {
        matches!(self, FormulaValue::Array(_))
    }

    /// Convert a final result into the value stored in the cell
    ///
    /// Text results are classified like typed input, so `=1&2` stores the
    /// number 12.
    pub fn into_cell_value(self) -> FormulaResult<CellValue> {
        match self {
            FormulaValue::Number(n) => Ok(CellValue::Number(finite(n)?)),
            FormulaValue::String(s) => Ok(CellValue::from_literal(&s)),
            FormulaValue::Boolean(b) => Ok(CellValue::from(b)),
            FormulaValue::Error(e) => Ok(CellValue::Error(e)),
            FormulaValue::Empty => Ok(CellValue::Empty),
            FormulaValue::Array(mut rows) => {
                // A single-cell range yields that cell
                if rows.len() == 1 && rows[0].len() == 1 {
                    if let Some(value) = rows[0].pop() {
                        return value.into_cell_value();
                    }
                }
                Err(FormulaError::Evaluation(
                    "A range cannot be the result of a formula".into(),
                ))
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            FormulaValue::String(s) => format!("text '{}'", s),
            FormulaValue::Array(_) => "a range".to_string(),
            FormulaValue::Error(e) => format!("an error ({})", e.kind()),
            other => other.as_string(),
        }
    }
}

impl From<&CellValue> for FormulaValue {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => FormulaValue::Empty,
            CellValue::Number(n) => FormulaValue::Number(*n),
            CellValue::Text(s) => FormulaValue::String(s.clone()),
            CellValue::Error(e) => FormulaValue::Error(*e),
        }
    }
}

/// Context for formula evaluation
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationContext<'a> {
    /// Grid for cell lookups
    pub grid: Option<&'a Grid>,
    /// Cell being evaluated, for diagnostics
    pub current: Option<CellAddress>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context over a grid
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid: Some(grid),
            current: None,
        }
    }

    /// Create a simple context without grid (for testing)
    pub fn simple() -> Self {
        Self::default()
    }

    /// Set the cell being evaluated
    pub fn at(mut self, addr: CellAddress) -> Self {
        self.current = Some(addr);
        self
    }

    /// Numeric value of a referenced cell
    ///
    /// Numeric text counts as its number, the same way aggregates read it.
    /// Blank, other text, error and out-of-grid cells read as 0.
    pub fn cell_number(&self, addr: CellAddress) -> f64 {
        self.grid
            .map(|g| g.value_at(addr).number_or_zero())
            .unwrap_or(0.0)
    }

    /// Raw value of a referenced cell
    pub fn cell_value(&self, addr: CellAddress) -> FormulaValue {
        self.grid
            .map(|g| FormulaValue::from(g.value_at(addr)))
            .unwrap_or(FormulaValue::Empty)
    }

    /// Raw values of the part of a range that lies inside the grid
    pub fn range_values(&self, range: &CellRange) -> FormulaValue {
        let Some(grid) = self.grid else {
            return FormulaValue::Array(vec![]);
        };
        let Some(clipped) = range.clip(grid.row_count(), grid.col_count()) else {
            return FormulaValue::Array(vec![]);
        };

        let rows = (clipped.start.row..=clipped.end.row)
            .map(|row| {
                (clipped.start.col..=clipped.end.col)
                    .map(|col| self.cell_value(CellAddress::new(row, col)))
                    .collect()
            })
            .collect();

        FormulaValue::Array(rows)
    }
}

/// Evaluate raw cell input against a grid
///
/// Text that does not start with `=` is returned as a literal.
///
/// ```
/// use zxcel_core::{CellValue, Grid};
/// use zxcel_formula::evaluate_formula;
///
/// let mut grid = Grid::default();
/// grid.set_literal(1, 1, "10").unwrap();
/// grid.set_literal(2, 1, "20").unwrap();
///
/// assert_eq!(evaluate_formula("=SUM(B2:B3)", &grid).unwrap(), CellValue::Number(30.0));
/// assert_eq!(evaluate_formula("plain", &grid).unwrap(), CellValue::text("plain"));
/// assert!(evaluate_formula("=1/0", &grid).is_err());
/// ```
pub fn evaluate_formula(formula: &str, grid: &Grid) -> FormulaResult<CellValue> {
    evaluate_input(formula, &EvaluationContext::new(grid))
}

/// Evaluate raw cell input for a specific cell
pub fn evaluate_formula_at(
    formula: &str,
    grid: &Grid,
    addr: CellAddress,
) -> FormulaResult<CellValue> {
    evaluate_input(formula, &EvaluationContext::new(grid).at(addr))
}

fn evaluate_input(formula: &str, ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    if !formula.starts_with('=') {
        return Ok(CellValue::from_literal(formula));
    }

    let ast = parse_formula(formula)?;
    evaluate_to_cell_value(&ast, ctx)
}

/// Evaluate a parsed formula into the value stored in the cell
pub fn evaluate_to_cell_value(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    evaluate(expr, ctx)?.into_cell_value()
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    match expr {
        // === Literals ===
        FormulaExpr::Number(n) => Ok(FormulaValue::Number(*n)),
        FormulaExpr::String(s) => Ok(FormulaValue::String(s.clone())),
        FormulaExpr::Boolean(b) => Ok(FormulaValue::Boolean(*b)),

        // === References ===
        FormulaExpr::CellRef(addr) => Ok(FormulaValue::Number(ctx.cell_number(*addr))),

        FormulaExpr::RangeRef(range) => Ok(ctx.range_values(range)),

        FormulaExpr::NameRef(name) => Err(FormulaError::Evaluation(format!(
            "Unknown name '{}'",
            name
        ))),

        FormulaExpr::Criteria { op, operand } => {
            let operand = match operand.as_ref() {
                FormulaExpr::NameRef(name) => name.clone(),
                other => scalar(evaluate(other, ctx)?)?.as_string(),
            };
            Ok(FormulaValue::String(format!("{}{}", op.symbol(), operand)))
        }

        // === Operators ===
        FormulaExpr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, ctx),

        FormulaExpr::UnaryOp { op, operand } => {
            let n = scalar(evaluate(operand, ctx)?)?.to_number()?;
            Ok(FormulaValue::Number(match op {
                UnaryOperator::Negate => -n,
                UnaryOperator::Percent => n / 100.0,
            }))
        }

        // === Functions ===
        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Evaluate a binary operation; both operands must be single values
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let lhs = scalar(evaluate(left, ctx)?)?;
    let rhs = scalar(evaluate(right, ctx)?)?;

    if op == BinaryOperator::Concat {
        return Ok(FormulaValue::String(lhs.as_string() + &rhs.as_string()));
    }
    if op.is_comparison() {
        return Ok(FormulaValue::Boolean(
            op.holds_for(compare_values(&lhs, &rhs)),
        ));
    }

    let (l, r) = (lhs.to_number()?, rhs.to_number()?);
    if op == BinaryOperator::Divide && r == 0.0 {
        return Err(FormulaError::DivisionByZero);
    }
    let result = op.apply_arithmetic(l, r).ok_or_else(|| {
        FormulaError::Evaluation(format!("'{}' is not an arithmetic operator", op.symbol()))
    })?;
    Ok(FormulaValue::Number(finite(result)?))
}

fn finite(n: f64) -> FormulaResult<f64> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(FormulaError::Evaluation(format!("{} is not a finite number", n)))
    }
}

/// Reject ranges and failed cells where a single value is required
fn scalar(value: FormulaValue) -> FormulaResult<FormulaValue> {
    match value {
        FormulaValue::Array(_) => Err(FormulaError::Evaluation(
            "A range can only be used as a function argument".into(),
        )),
        FormulaValue::Error(e) => Err(FormulaError::Evaluation(format!(
            "Operand is an error ({})",
            e.kind()
        ))),
        other => Ok(other),
    }
}

/// Compare two values for ordering
///
/// Numbers compare numerically, text case-insensitively, booleans FALSE < TRUE;
/// across types numbers sort before text, which sorts before booleans.
fn compare_values(left: &FormulaValue, right: &FormulaValue) -> Ordering {
    let rank = |v: &FormulaValue| match v {
        FormulaValue::Number(_) | FormulaValue::Empty => 0,
        FormulaValue::String(_) => 1,
        _ => 2,
    };

    match (left, right) {
        (FormulaValue::String(l), FormulaValue::String(r)) => {
            l.to_lowercase().cmp(&r.to_lowercase())
        }
        (FormulaValue::Boolean(l), FormulaValue::Boolean(r)) => l.cmp(r),
        _ if rank(left) == 0 && rank(right) == 0 => {
            let l = left.as_number().unwrap_or(0.0);
            let r = right.as_number().unwrap_or(0.0);
            l.partial_cmp(&r).unwrap_or(Ordering::Equal)
        }
        _ => rank(left).cmp(&rank(right)),
    }
}

/// Evaluate a function call
fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let def = function_registry()
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;
    def.check_arity(args.len())?;

    let values = args
        .iter()
        .enumerate()
        .map(|(index, arg)| function_argument(def, index, arg, ctx))
        .collect::<FormulaResult<Vec<_>>>()?;

    (def.implementation)(&values, ctx)
}

/// A reference argument is passed as the raw cell value, and a bare word in
/// the criteria position as text
fn function_argument(
    def: &FunctionDef,
    index: usize,
    arg: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    match arg {
        FormulaExpr::CellRef(addr) => Ok(FormulaValue::Array(vec![vec![ctx.cell_value(*addr)]])),
        FormulaExpr::NameRef(word) if def.criteria_arg == Some(index) => {
            Ok(FormulaValue::String(word.clone()))
        }
        other => evaluate(other, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn eval(formula: &str) -> FormulaResult<FormulaValue> {
        let ast = parse_formula(formula)?;
        let ctx = EvaluationContext::simple();
        evaluate(&ast, &ctx)
    }

    fn sample_grid() -> Grid {
        let mut grid = Grid::default();
        grid.set_literal(1, 1, "10").unwrap(); // B2
        grid.set_literal(2, 1, "20").unwrap(); // B3
        grid.set_literal(3, 1, "apples").unwrap(); // B4
        grid
    }

    #[test]
    fn test_scalar_expressions() {
        use FormulaValue::{Boolean, Number};

        let cases = [
            ("=2.75", Number(2.75)),
            ("=10-3", Number(7.0)),
            ("=20/4", Number(5.0)),
            ("=2^10", Number(1024.0)),
            ("=2+3*4-5", Number(9.0)),
            ("=(1+2)*3", Number(9.0)),
            ("=2^3^2", Number(512.0)),
            ("=-2^2", Number(4.0)),
            ("=--5", Number(5.0)),
            ("=+5", Number(5.0)),
            ("=50%", Number(0.5)),
            ("=TRUE+1", Number(2.0)),
            ("=1<2", Boolean(true)),
            ("=5<>5", Boolean(false)),
            ("=2>=2", Boolean(true)),
            ("=\"a\"=\"A\"", Boolean(true)),
            ("=1<\"a\"", Boolean(true)),
        ];

        for (formula, expected) in cases {
            assert_eq!(eval(formula).unwrap(), expected, "{}", formula);
        }
    }

    #[test]
    fn test_evaluate_concat() {
        assert_eq!(
            eval("=\"total: \"&2*3").unwrap(),
            FormulaValue::String("total: 6".into())
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("=1/0"), Err(FormulaError::DivisionByZero));
        assert_eq!(
            eval("=1/0").unwrap_err().cell_error(),
            CellError::DivisionByZero
        );
    }

    #[test]
    fn test_non_finite_is_error() {
        assert!(matches!(eval("=10^400"), Err(FormulaError::Evaluation(_))));
    }

    #[test]
    fn test_text_in_arithmetic() {
        assert!(matches!(eval("=\"abc\"*2"), Err(FormulaError::Evaluation(_))));
        assert_eq!(eval("=\"4\"*2").unwrap(), FormulaValue::Number(8.0));
    }

    #[test]
    fn test_unknown_function_and_name() {
        assert!(matches!(eval("=FOO(1)"), Err(FormulaError::UnknownFunction(_))));
        assert!(matches!(eval("=foo+1"), Err(FormulaError::Evaluation(_))));
    }

    #[test]
    fn test_references_read_numbers() {
        let grid = sample_grid();

        assert_eq!(
            evaluate_formula("=B2+B3", &grid).unwrap(),
            CellValue::Number(30.0)
        );
        // Text, blank and out-of-grid cells all read as 0
        assert_eq!(
            evaluate_formula("=B4+C1+Z999", &grid).unwrap(),
            CellValue::Number(0.0)
        );
        // So does a reference that can't exist
        assert_eq!(
            evaluate_formula("=A0+1", &grid).unwrap(),
            CellValue::Number(1.0)
        );
    }

    #[test]
    fn test_numeric_text_reads_the_same_everywhere() {
        let mut grid = Grid::new(2, 2);
        grid.set_value(0, 0, CellValue::text(" 7")).unwrap();

        assert_eq!(
            evaluate_formula("=A1*2", &grid).unwrap(),
            evaluate_formula("=SUM(A1)*2", &grid).unwrap()
        );
        assert_eq!(
            evaluate_formula("=A1*2", &grid).unwrap(),
            CellValue::Number(14.0)
        );
    }

    #[test]
    fn test_numeric_text_result_is_a_number() {
        let grid = Grid::default();
        assert_eq!(
            evaluate_formula("=1&2", &grid).unwrap(),
            CellValue::Number(12.0)
        );
        assert_eq!(
            evaluate_formula("=\"5\"", &grid).unwrap(),
            CellValue::Number(5.0)
        );
        assert_eq!(
            evaluate_formula("=\"5 apples\"", &grid).unwrap(),
            CellValue::text("5 apples")
        );
    }

    #[test]
    fn test_range_outside_function_is_error() {
        let grid = sample_grid();
        assert!(evaluate_formula("=B2:B3+1", &grid).is_err());
        assert!(evaluate_formula("=B2:B3", &grid).is_err());
        assert_eq!(
            evaluate_formula("=B4:B4", &grid).unwrap(),
            CellValue::text("apples")
        );
    }

    #[test]
    fn test_literal_passthrough() {
        let grid = Grid::default();
        assert_eq!(
            evaluate_formula("12", &grid).unwrap(),
            CellValue::Number(12.0)
        );
        assert_eq!(evaluate_formula("", &grid).unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_boolean_result_is_text() {
        let grid = sample_grid();
        assert_eq!(
            evaluate_formula("=B3>B2", &grid).unwrap(),
            CellValue::text("TRUE")
        );
    }

    #[test]
    fn test_nested_functions() {
        let grid = sample_grid();
        assert_eq!(
            evaluate_formula("=SUM(B2:B3)*2+MAX(B2:B4)", &grid).unwrap(),
            CellValue::Number(80.0)
        );
        assert_eq!(
            evaluate_formula("=SUM(MIN(B2:B3), MAX(B2:B3), 1)", &grid).unwrap(),
            CellValue::Number(31.0)
        );
    }
}
