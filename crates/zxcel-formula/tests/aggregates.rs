//! Aggregate functions evaluated against a grid

use pretty_assertions::assert_eq;
use zxcel_core::{CellValue, Grid};
use zxcel_formula::{evaluate_formula, FormulaError};

/// A1:A6 = 2, "pears", 8, blank, 6, "foo"; B1:B3 = "foo", "bar", "foo"
fn grid() -> Grid {
    let mut grid = Grid::default();
    for (row, raw) in ["2", "pears", "8", "", "6", "foo"].iter().enumerate() {
        grid.set_literal(row, 0, raw).unwrap();
    }
    for (row, raw) in ["foo", "bar", "foo"].iter().enumerate() {
        grid.set_literal(row, 1, raw).unwrap();
    }
    grid
}

fn eval(formula: &str) -> CellValue {
    evaluate_formula(formula, &grid()).unwrap()
}

#[test]
fn test_sum_counts_only_numbers() {
    assert_eq!(eval("=SUM(A1:A6)"), CellValue::Number(16.0));
    assert_eq!(eval("=SUM(B1:B3)"), CellValue::Number(0.0));
}

#[test]
fn test_min_max_without_numbers_is_zero() {
    assert_eq!(eval("=MIN(B1:B3)"), CellValue::Number(0.0));
    assert_eq!(eval("=MAX(B1:B3)"), CellValue::Number(0.0));
    assert_eq!(eval("=MIN(A1:A6)"), CellValue::Number(2.0));
    assert_eq!(eval("=MAX(A1:A6)"), CellValue::Number(8.0));
}

#[test]
fn test_average_divides_by_cells_visited() {
    // 16 over six cells
    assert_eq!(
        eval("=AVERAGE(A1:A6)"),
        CellValue::Number(16.0 / 6.0)
    );
    assert_eq!(eval("=AVRG(A1:A3)"), CellValue::Number(10.0 / 3.0));
}

#[test]
fn test_average_ignores_cells_outside_grid() {
    // Only J20 exists out of J20:K21
    assert_eq!(eval("=AVERAGE(J20:K21)"), CellValue::Number(0.0));
    assert_eq!(eval("=AVERAGE(X50:Y60)"), CellValue::Number(0.0));
}

#[test]
fn test_count() {
    assert_eq!(eval("=COUNT(A1:B6)"), CellValue::Number(3.0));
}

#[test]
fn test_countif_numeric_and_text() {
    assert_eq!(eval("=COUNTIF(A1:A6,\">5\")"), CellValue::Number(2.0));
    assert_eq!(eval("=COUNTIF(A1:A6,>5)"), CellValue::Number(2.0));
    assert_eq!(eval("=COUNTIF(B1:B3,\"=foo\")"), CellValue::Number(2.0));
    assert_eq!(eval("=COUNTIF(B1:B3,foo)"), CellValue::Number(2.0));
    assert_eq!(eval("=COUNTIF(B1:B3,<>foo)"), CellValue::Number(1.0));
}

#[test]
fn test_conditional_reads_first_column() {
    // A1:B6 is two columns wide; only column A is tested
    assert_eq!(eval("=COUNTIF(A1:B6,foo)"), CellValue::Number(1.0));
    assert_eq!(eval("=SUMIF(A1:B6,>=6)"), CellValue::Number(14.0));
}

#[test]
fn test_localized_names() {
    assert_eq!(eval("=СУММ(A1:A6)"), CellValue::Number(16.0));
    assert_eq!(eval("=макс(A1:A6)"), CellValue::Number(8.0));
    assert_eq!(eval("=МИН(A1:A6)"), CellValue::Number(2.0));
    assert_eq!(eval("=СЧЁТ(A1:A6)"), CellValue::Number(3.0));
    assert_eq!(eval("=СЧЕТЕСЛИ(A1:A6,>5)"), CellValue::Number(2.0));
    assert_eq!(eval("=СУММЕСЛИ(A1:A6,<5)"), CellValue::Number(2.0));
    assert_eq!(eval("=СРЗНАЧ(A1:A2)"), CellValue::Number(1.0));
}

#[test]
fn test_argument_errors() {
    let grid = grid();
    assert!(matches!(
        evaluate_formula("=SUMIF(A1:A6)", &grid),
        Err(FormulaError::ArgumentCount { .. })
    ));
    assert!(matches!(
        evaluate_formula("=COUNTIF(A1:A6,>many)", &grid),
        Err(FormulaError::Argument(_))
    ));
    assert!(matches!(
        evaluate_formula("=MEDIAN(A1:A6)", &grid),
        Err(FormulaError::UnknownFunction(_))
    ));
}

#[test]
fn test_aggregates_mix_with_arithmetic() {
    assert_eq!(
        eval("=SUM(A1:A3)/COUNT(A1:A3)"),
        CellValue::Number(5.0)
    );
    assert_eq!(eval("=MAX(A1:A6)-MIN(A1:A6)"), CellValue::Number(6.0));
}
