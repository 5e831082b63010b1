//! Grid model tests through the public API

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use zxcel_core::{CellAddress, CellRange, CellType, CellValue, Grid, Selection};

#[test]
fn test_writes_grow_only_when_needed() {
    let mut grid = Grid::default();

    grid.set_literal(19, 9, "x").unwrap();
    assert_eq!(grid.dimensions(), (20, 10));

    grid.set_literal(20, 10, "y").unwrap();
    assert_eq!(grid.dimensions(), (21, 11));
    assert_eq!(grid.cell("K21").unwrap().value, CellValue::text("y"));

    // Previously touched coordinates stay readable
    assert!(grid.cell("J20").is_ok());
}

#[test]
fn test_literal_types() {
    let mut grid = Grid::default();
    grid.set_literal(0, 0, "3.25").unwrap();
    grid.set_literal(0, 1, "three").unwrap();

    assert_eq!(grid.cell("A1").unwrap().cell_type(), CellType::Number);
    assert_eq!(grid.cell("B1").unwrap().cell_type(), CellType::String);
}

#[test]
fn test_delete_selection_style_survives() {
    let mut grid = Grid::default();
    let style = zxcel_core::CellStyle::new().italic(true);
    grid.set_literal(4, 4, "keep style").unwrap();
    grid.set_style(4, 4, style.clone()).unwrap();

    let sel = Selection::between(CellAddress::new(5, 5), CellAddress::new(3, 3));
    grid.clear_range(&sel.range());

    let cell = grid.cell("E5").unwrap();
    assert!(cell.is_blank());
    assert_eq!(cell.style, style);
}

#[test]
fn test_range_text_round_trip() {
    let range: CellRange = "AA10:B2".parse().unwrap();
    assert_eq!(range.to_string(), "B2:AA10");
    assert_eq!(range.row_count(), 9);
    assert_eq!(range.col_count(), 26);
}

proptest! {
    #[test]
    fn numeric_literals_are_numbers(n in -1.0e9f64..1.0e9) {
        prop_assert_eq!(CellValue::from_literal(&n.to_string()), CellValue::Number(n));
    }

    #[test]
    fn expansion_is_idempotent(row in 0usize..60, col in 0usize..30) {
        let mut grid = Grid::default();
        grid.expand_if_needed(row, col).unwrap();
        let dims = grid.dimensions();
        prop_assert!(!grid.expand_if_needed(row, col).unwrap());
        prop_assert_eq!(grid.dimensions(), dims);
        prop_assert!(grid.get(row, col).is_ok());
        prop_assert_eq!(dims, (row.max(19) + 1, col.max(9) + 1));
    }
}
