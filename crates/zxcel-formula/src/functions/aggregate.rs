//! Aggregate functions: SUM, AVERAGE, MIN, MAX, COUNT, SUMIF, COUNTIF
//!
//! Every argument is either a range (an array of raw cell values, one entry
//! per in-grid cell) or a scalar, which counts as a single value. None of
//! these functions touch the grid.

use super::criteria::CriteriaMatcher;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{EvaluationContext, FormulaValue};

/// Numeric value of a cell or scalar, `None` for anything non-numeric
///
/// Blank cells are not numbers here; text counts only if it parses as a
/// finite float.
pub fn numeric_value(value: &FormulaValue) -> Option<f64> {
    match value {
        FormulaValue::Empty => None,
        other => other.as_number(),
    }
}

/// Every value an argument list covers, ranges flattened row by row
fn flatten(args: &[FormulaValue]) -> impl Iterator<Item = &FormulaValue> {
    args.iter().flat_map(|arg| {
        let (cells, scalar) = match arg {
            FormulaValue::Array(rows) => (Some(rows.iter().flatten()), None),
            scalar => (None, Some(scalar)),
        };
        cells.into_iter().flatten().chain(scalar)
    })
}

/// First column of a range argument; a scalar is a one-cell column
fn first_column(arg: &FormulaValue) -> Vec<&FormulaValue> {
    match arg {
        FormulaValue::Array(rows) => rows.iter().filter_map(|row| row.first()).collect(),
        scalar => vec![scalar],
    }
}

/// The `(range, criteria)` pair of SUMIF and COUNTIF
fn conditional_args<'a>(
    function: &str,
    args: &'a [FormulaValue],
) -> FormulaResult<(&'a FormulaValue, CriteriaMatcher)> {
    match args {
        [range, criteria] => Ok((range, CriteriaMatcher::new(criteria)?)),
        _ => Err(FormulaError::ArgumentCount {
            function: function.to_string(),
            expected: "2".to_string(),
            actual: args.len(),
        }),
    }
}

/// SUM: non-numeric cells contribute 0
pub fn fn_sum(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let sum: f64 = flatten(args)
        .map(|v| numeric_value(v).unwrap_or(0.0))
        .sum();
    Ok(FormulaValue::Number(sum))
}

/// AVERAGE: sum divided by the number of cells visited, numeric or not
///
/// Returns 0 when nothing was visited.
pub fn fn_average(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let (sum, count) = flatten(args).fold((0.0, 0usize), |(sum, count), v| {
        (sum + numeric_value(v).unwrap_or(0.0), count + 1)
    });

    if count == 0 {
        return Ok(FormulaValue::Number(0.0));
    }
    Ok(FormulaValue::Number(sum / count as f64))
}

/// MIN: ignores non-numeric cells, 0 when there are none
pub fn fn_min(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let min = flatten(args).filter_map(numeric_value).reduce(f64::min);
    Ok(FormulaValue::Number(min.unwrap_or(0.0)))
}

/// MAX: ignores non-numeric cells, 0 when there are none
pub fn fn_max(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let max = flatten(args).filter_map(numeric_value).reduce(f64::max);
    Ok(FormulaValue::Number(max.unwrap_or(0.0)))
}

/// COUNT: number of numeric cells
pub fn fn_count(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let count = flatten(args).filter(|v| numeric_value(v).is_some()).count();
    Ok(FormulaValue::Number(count as f64))
}

/// SUMIF(range, criteria): sums matching cells of the range's first column
pub fn fn_sumif(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let (range, matcher) = conditional_args("SUMIF", args)?;

    let sum: f64 = first_column(range)
        .into_iter()
        .filter(|v| matcher.matches(v))
        .map(|v| numeric_value(v).unwrap_or(0.0))
        .sum();

    Ok(FormulaValue::Number(sum))
}

/// COUNTIF(range, criteria): counts matching cells of the range's first column
pub fn fn_countif(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let (range, matcher) = conditional_args("COUNTIF", args)?;

    let count = first_column(range)
        .into_iter()
        .filter(|v| matcher.matches(v))
        .count();

    Ok(FormulaValue::Number(count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EvaluationContext<'static> {
        EvaluationContext::simple()
    }

    fn column(values: &[FormulaValue]) -> FormulaValue {
        FormulaValue::Array(values.iter().map(|v| vec![v.clone()]).collect())
    }

    fn num(n: f64) -> FormulaValue {
        FormulaValue::Number(n)
    }

    fn text(s: &str) -> FormulaValue {
        FormulaValue::String(s.into())
    }

    fn mixed() -> FormulaValue {
        column(&[num(3.0), text("x"), FormulaValue::Empty, num(7.0)])
    }

    #[test]
    fn test_sum_skips_text() {
        assert_eq!(fn_sum(&[mixed()], &ctx()).unwrap(), num(10.0));
        assert_eq!(fn_sum(&[num(1.0), num(2.5)], &ctx()).unwrap(), num(3.5));
    }

    #[test]
    fn test_average_counts_every_cell() {
        // 10 over four visited cells
        assert_eq!(fn_average(&[mixed()], &ctx()).unwrap(), num(2.5));
        assert_eq!(
            fn_average(&[FormulaValue::Array(vec![])], &ctx()).unwrap(),
            num(0.0)
        );
    }

    #[test]
    fn test_min_max() {
        assert_eq!(fn_min(&[mixed()], &ctx()).unwrap(), num(3.0));
        assert_eq!(fn_max(&[mixed()], &ctx()).unwrap(), num(7.0));

        let no_numbers = column(&[text("a"), FormulaValue::Empty]);
        assert_eq!(fn_min(&[no_numbers.clone()], &ctx()).unwrap(), num(0.0));
        assert_eq!(fn_max(&[no_numbers], &ctx()).unwrap(), num(0.0));

        let negatives = column(&[num(-4.0), num(-2.0)]);
        assert_eq!(fn_max(&[negatives], &ctx()).unwrap(), num(-2.0));
    }

    #[test]
    fn test_count() {
        assert_eq!(fn_count(&[mixed()], &ctx()).unwrap(), num(2.0));
    }

    #[test]
    fn test_countif() {
        let values = column(&[num(1.0), num(6.0), num(9.0), text("foo"), text("foo")]);

        assert_eq!(
            fn_countif(&[values.clone(), text(">5")], &ctx()).unwrap(),
            num(2.0)
        );
        assert_eq!(
            fn_countif(&[values.clone(), text("=foo")], &ctx()).unwrap(),
            num(2.0)
        );
        assert_eq!(
            fn_countif(&[values, text("<>foo")], &ctx()).unwrap(),
            num(3.0)
        );
    }

    #[test]
    fn test_conditional_uses_first_column_only() {
        let rect = FormulaValue::Array(vec![
            vec![num(10.0), num(100.0)],
            vec![num(1.0), num(100.0)],
        ]);

        assert_eq!(
            fn_sumif(&[rect.clone(), text(">5")], &ctx()).unwrap(),
            num(10.0)
        );
        assert_eq!(fn_countif(&[rect, text(">5")], &ctx()).unwrap(), num(1.0));
    }

    #[test]
    fn test_conditional_argument_count() {
        assert!(matches!(
            fn_countif(&[mixed()], &ctx()),
            Err(FormulaError::ArgumentCount { actual: 1, .. })
        ));
        assert!(matches!(
            fn_sumif(&[], &ctx()),
            Err(FormulaError::ArgumentCount { actual: 0, .. })
        ));
    }

    #[test]
    fn test_bad_criteria() {
        assert!(matches!(
            fn_sumif(&[mixed(), text(">x")], &ctx()),
            Err(FormulaError::Argument(_))
        ));
    }
}
