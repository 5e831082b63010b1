//! Grid recalculation engine
//!
//! Every mutating editor operation ends with a recalculation pass that
//! refreshes the value of each formula cell. Formulas are visited in
//! dependency order, so a chain like `A3 = A2 + 1`, `A2 = A1 + 1` settles in
//! one pass regardless of where the cells sit. Cells whose formulas reach
//! themselves are marked with [`CellError::Circular`] instead of evaluated.
//!
//! [`CellError::Circular`]: crate::CellError::Circular
//!
//! # Example
//!
//! ```rust
//! use zxcel::prelude::*;
//!
//! let mut grid = Grid::default();
//! grid.set_cell(0, 0, "10").unwrap();
//! grid.set_cell(1, 0, "20").unwrap();
//! grid.set_cell(2, 0, "=A1+A2").unwrap();
//! assert_eq!(grid.get(2, 0).unwrap().value, CellValue::Number(30.0));
//!
//! // Nothing changed since the last pass
//! assert!(!grid.recalc_all());
//! ```

use crate::{CellAddress, CellValue, Grid, Result};
use std::collections::HashMap;
use zxcel_formula::{
    evaluate_formula_at, evaluate_to_cell_value, parse_formula, DependencyGraph,
    EvaluationContext, FormulaError, FormulaExpr, FormulaResult,
};

/// Options for grid recalculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationOptions {
    /// Order formulas by their dependencies and mark reference cycles
    pub detect_cycles: bool,
    /// Row-major passes to run when cycle detection is off (at least one)
    pub max_passes: u32,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            detect_cycles: true,
            max_passes: 1,
        }
    }
}

/// Statistics from a recalculation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Total number of formula cells
    pub formula_count: usize,
    /// Number of formula evaluations performed
    pub cells_calculated: usize,
    /// Number of cells whose value changed
    pub changed: usize,
    /// Number of cells caught in a reference cycle
    pub circular_references: usize,
    /// Number of formulas that ended in an error
    pub errors: usize,
    /// Number of passes over the formula cells
    pub passes: u32,
}

impl CalculationStats {
    /// Whether any cell value changed
    pub fn mutated(&self) -> bool {
        self.changed > 0
    }
}

/// Extension trait for Grid to add editing and recalculation
pub trait GridCalculationExt {
    /// Store raw input in a cell and recalculate
    ///
    /// Input starting with `=` is evaluated against the current grid;
    /// anything else is stored as a literal. The grid grows first when the
    /// coordinate lies past its edge. Formula failures are stored in the
    /// cell, never returned.
    fn set_cell(&mut self, row: usize, col: usize, raw: &str) -> Result<()>;

    /// [`set_cell`](Self::set_cell) with custom recalculation options
    fn set_cell_with_options(
        &mut self,
        row: usize,
        col: usize,
        raw: &str,
        options: &CalculationOptions,
    ) -> Result<CalculationStats>;

    /// Recalculate every formula cell, returning whether any value changed
    fn recalc_all(&mut self) -> bool;

    /// Recalculate with custom options
    fn recalc_with_options(&mut self, options: &CalculationOptions) -> CalculationStats;
}

impl GridCalculationExt for Grid {
    fn set_cell(&mut self, row: usize, col: usize, raw: &str) -> Result<()> {
        self.set_cell_with_options(row, col, raw, &CalculationOptions::default())?;
        Ok(())
    }

    fn set_cell_with_options(
        &mut self,
        row: usize,
        col: usize,
        raw: &str,
        options: &CalculationOptions,
    ) -> Result<CalculationStats> {
        self.expand_if_needed(row, col)?;

        if raw.starts_with('=') {
            let addr = CellAddress::new(row, col);
            let value = evaluate_formula_at(raw, self, addr).unwrap_or_else(|e| {
                log::warn!("{}: {}", addr, e);
                CellValue::Error(e.cell_error())
            });
            self.set_formula_result(row, col, raw, value)?;
        } else {
            self.set_literal(row, col, raw)?;
        }

        Ok(self.recalc_with_options(options))
    }

    fn recalc_all(&mut self) -> bool {
        self.recalc_with_options(&CalculationOptions::default())
            .mutated()
    }

    fn recalc_with_options(&mut self, options: &CalculationOptions) -> CalculationStats {
        let mut engine = CalculationEngine::new(options.clone());
        engine.calculate_all(self)
    }
}

/// The calculation engine
struct CalculationEngine {
    options: CalculationOptions,
    /// Parsed formula ASTs, keyed by cell
    parsed_formulas: HashMap<CellAddress, FormulaExpr>,
    /// Formulas that failed to parse
    parse_failures: Vec<(CellAddress, FormulaError)>,
}

impl CalculationEngine {
    fn new(options: CalculationOptions) -> Self {
        Self {
            options,
            parsed_formulas: HashMap::new(),
            parse_failures: Vec::new(),
        }
    }

    /// Recalculate all formulas in the grid
    fn calculate_all(&mut self, grid: &mut Grid) -> CalculationStats {
        let mut stats = CalculationStats::default();

        // Phase 1: Collect and parse all formulas
        self.collect_formulas(grid, &mut stats);

        if stats.formula_count == 0 {
            return stats;
        }

        // Unparseable formulas have no inputs; settle them first
        for (addr, e) in std::mem::take(&mut self.parse_failures) {
            store_result(grid, addr, Err(e), &mut stats);
        }

        // Phase 2: Order and evaluate
        if self.options.detect_cycles {
            self.calculate_cells_ordered(grid, &mut stats);
        } else {
            self.calculate_cells_linear(grid, &mut stats);
        }

        log::debug!(
            "recalculated {} of {} formula cells: {} changed, {} errors, {} circular",
            stats.cells_calculated,
            stats.formula_count,
            stats.changed,
            stats.errors,
            stats.circular_references
        );

        stats
    }

    fn collect_formulas(&mut self, grid: &Grid, stats: &mut CalculationStats) {
        for (addr, formula_text) in grid.formula_cells() {
            match parse_formula(formula_text) {
                Ok(ast) => {
                    self.parsed_formulas.insert(addr, ast);
                }
                Err(e) => self.parse_failures.push((addr, e)),
            }
            stats.formula_count += 1;
        }
    }

    /// Evaluate once in dependency order, marking cycle members
    fn calculate_cells_ordered(&self, grid: &mut Grid, stats: &mut CalculationStats) {
        let formulas: Vec<_> = self
            .parsed_formulas
            .iter()
            .map(|(addr, ast)| (*addr, ast.references()))
            .collect();
        let cells: Vec<CellAddress> = formulas.iter().map(|(addr, _)| *addr).collect();

        let order = DependencyGraph::from_formulas(&formulas).calculation_order(&cells);

        stats.circular_references = order.circular.len();
        for addr in order.circular {
            store_result(grid, addr, Err(FormulaError::CircularReference), stats);
        }

        for addr in order.ordered {
            self.calculate_cell(grid, addr, stats);
        }
        stats.passes = 1;
    }

    /// Evaluate in row-major order until nothing changes or the pass limit
    fn calculate_cells_linear(&self, grid: &mut Grid, stats: &mut CalculationStats) {
        let mut order: Vec<CellAddress> = self.parsed_formulas.keys().copied().collect();
        order.sort();

        for _ in 0..self.options.max_passes.max(1) {
            let before = stats.changed;
            for &addr in &order {
                self.calculate_cell(grid, addr, stats);
            }
            stats.passes += 1;

            if stats.changed == before {
                break;
            }
        }
    }

    fn calculate_cell(&self, grid: &mut Grid, addr: CellAddress, stats: &mut CalculationStats) {
        let Some(ast) = self.parsed_formulas.get(&addr) else {
            return;
        };

        let result = {
            let ctx = EvaluationContext::new(grid).at(addr);
            evaluate_to_cell_value(ast, &ctx)
        };
        stats.cells_calculated += 1;

        store_result(grid, addr, result, stats);
    }
}

/// Write a formula result into its cell, counting changes and errors
fn store_result(
    grid: &mut Grid,
    addr: CellAddress,
    result: FormulaResult<CellValue>,
    stats: &mut CalculationStats,
) {
    let (value, error) = match result {
        Ok(value) => (value, None),
        Err(e) => (CellValue::Error(e.cell_error()), Some(e)),
    };

    if error.is_some() {
        stats.errors += 1;
    }

    if grid.value_at(addr) == &value {
        return;
    }

    if let Some(e) = error {
        log::warn!("{}: {}", addr, e);
    }
    log::trace!("{} = {}", addr, value);

    if grid.set_value(addr.row, addr.col, value).is_ok() {
        stats.changed += 1;
    }
}
