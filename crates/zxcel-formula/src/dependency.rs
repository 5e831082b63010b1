//! Precedent/dependent edges between formula cells, and the order they
//! must be evaluated in

use ahash::{AHashMap, AHashSet};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use zxcel_core::{CellAddress, CellRange};

/// Which formula cells read which other formula cells
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Cells reading the key cell
    dependents: AHashMap<CellAddress, AHashSet<CellAddress>>,
    /// Cells the key cell reads
    precedents: AHashMap<CellAddress, AHashSet<CellAddress>>,
}

/// Order in which formula cells should be evaluated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationOrder {
    /// Cells outside any cycle, precedents first
    pub ordered: Vec<CellAddress>,
    /// Cells that take part in a reference cycle, row-major
    pub circular: Vec<CellAddress>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph between formula cells
    ///
    /// `formulas` pairs each formula cell with the ranges its formula reads.
    /// Only edges between formula cells are recorded; literal cells never
    /// need recalculating. Each range is matched against the formula cells
    /// from whichever side is smaller, so single-cell references cost one
    /// lookup.
    pub fn from_formulas(formulas: &[(CellAddress, Vec<CellRange>)]) -> Self {
        let mut graph = Self::new();
        let positions: AHashSet<CellAddress> = formulas.iter().map(|(addr, _)| *addr).collect();

        for (dependent, refs) in formulas {
            for range in refs {
                if range.cell_count() <= positions.len() {
                    for precedent in range.cells().filter(|cell| positions.contains(cell)) {
                        graph.add_dependency(precedent, *dependent);
                    }
                } else {
                    for precedent in positions.iter().filter(|cell| range.contains(cell)) {
                        graph.add_dependency(*precedent, *dependent);
                    }
                }
            }
        }

        graph
    }

    /// Record that `dependent` reads `precedent`
    pub fn add_dependency(&mut self, precedent: CellAddress, dependent: CellAddress) {
        self.dependents.entry(precedent).or_default().insert(dependent);
        self.precedents.entry(dependent).or_default().insert(precedent);
    }

    /// Cells whose formulas read `cell`
    pub fn get_dependents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        linked(&self.dependents, cell)
    }

    /// Cells read by the formula in `cell`
    pub fn get_precedents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        linked(&self.precedents, cell)
    }

    /// Whether `cell` eventually reads itself
    pub fn has_circular_reference(&self, cell: CellAddress) -> bool {
        let mut visited = AHashSet::new();
        let mut stack: Vec<CellAddress> = self.get_precedents(cell).collect();

        while let Some(current) = stack.pop() {
            if current == cell {
                return true;
            }
            if visited.insert(current) {
                stack.extend(self.get_precedents(current));
            }
        }

        false
    }

    /// Split `cells` into an evaluation order and the cells caught in cycles
    ///
    /// Cells that merely depend on a cycle are still ordered; they come after
    /// everything else they read. Ties are broken row-major so the order is
    /// deterministic.
    pub fn calculation_order(&self, cells: &[CellAddress]) -> CalculationOrder {
        let members: AHashSet<CellAddress> = cells.iter().copied().collect();

        // Kahn's algorithm leaves cycles (and what hangs off them) unvisited
        let remaining = self.kahn(&members, &AHashSet::new()).1;

        let mut circular: Vec<CellAddress> = remaining
            .into_iter()
            .filter(|cell| self.has_circular_reference(*cell))
            .collect();
        circular.sort();

        let excluded: AHashSet<CellAddress> = circular.iter().copied().collect();
        let (ordered, _) = self.kahn(&members, &excluded);

        CalculationOrder { ordered, circular }
    }

    /// Topological sort of `members` minus `excluded`, ignoring edges from
    /// excluded cells; returns the order and the cells it could not place
    fn kahn(
        &self,
        members: &AHashSet<CellAddress>,
        excluded: &AHashSet<CellAddress>,
    ) -> (Vec<CellAddress>, Vec<CellAddress>) {
        let counts = |cell: &CellAddress| {
            self.get_precedents(*cell)
                .filter(|p| members.contains(p) && !excluded.contains(p))
                .count()
        };

        let mut in_degree: AHashMap<CellAddress, usize> = members
            .iter()
            .filter(|c| !excluded.contains(c))
            .map(|c| (*c, counts(c)))
            .collect();

        let mut ready: BinaryHeap<Reverse<CellAddress>> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(cell, _)| Reverse(*cell))
            .collect();

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(Reverse(cell)) = ready.pop() {
            order.push(cell);
            for dependent in self.get_dependents(cell) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(dependent));
                    }
                }
            }
        }

        let placed: AHashSet<CellAddress> = order.iter().copied().collect();
        let unplaced = in_degree
            .keys()
            .filter(|c| !placed.contains(c))
            .copied()
            .collect();

        (order, unplaced)
    }
}

fn linked(
    edges: &AHashMap<CellAddress, AHashSet<CellAddress>>,
    cell: CellAddress,
) -> impl Iterator<Item = CellAddress> + '_ {
    edges.get(&cell).into_iter().flatten().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn a(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    #[test]
    fn test_edges_are_recorded_both_ways() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(a("A1"), a("B1"));
        graph.add_dependency(a("A1"), a("C1"));

        let mut dependents: Vec<_> = graph.get_dependents(a("A1")).collect();
        dependents.sort();
        assert_eq!(dependents, vec![a("B1"), a("C1")]);
        assert_eq!(graph.get_precedents(a("C1")).collect::<Vec<_>>(), vec![a("A1")]);
        assert_eq!(graph.get_precedents(a("A1")).count(), 0);
    }

    #[test]
    fn test_three_cell_loop_is_circular_everywhere() {
        let mut graph = DependencyGraph::new();
        for (from, to) in [("A1", "B1"), ("B1", "C1"), ("C1", "A1")] {
            graph.add_dependency(a(from), a(to));
        }

        for cell in ["A1", "B1", "C1"] {
            assert!(graph.has_circular_reference(a(cell)), "{}", cell);
        }
        assert!(!graph.has_circular_reference(a("D1")));
    }

    #[test]
    fn test_order_puts_precedents_first() {
        // C1 = B1 + 1, B1 = A1 + 1, A1 = 1
        let graph = DependencyGraph::from_formulas(&[
            (a("C1"), vec![CellRange::parse("B1").unwrap()]),
            (a("B1"), vec![CellRange::parse("A1").unwrap()]),
            (a("A1"), vec![]),
        ]);

        let order = graph.calculation_order(&[a("C1"), a("B1"), a("A1")]);
        assert_eq!(order.ordered, vec![a("A1"), a("B1"), a("C1")]);
        assert!(order.circular.is_empty());
    }

    #[test]
    fn test_order_separates_cycles() {
        // A1 <-> A2 form a cycle, A3 reads A1, B1 is independent
        let graph = DependencyGraph::from_formulas(&[
            (a("A1"), vec![CellRange::parse("A2").unwrap()]),
            (a("A2"), vec![CellRange::parse("A1").unwrap()]),
            (a("A3"), vec![CellRange::parse("A1:A2").unwrap()]),
            (a("B1"), vec![]),
        ]);

        let order = graph.calculation_order(&[a("A1"), a("A2"), a("A3"), a("B1")]);
        assert_eq!(order.circular, vec![a("A1"), a("A2")]);
        assert_eq!(order.ordered, vec![a("B1"), a("A3")]);
    }

    #[test]
    fn test_wide_and_narrow_ranges_find_the_same_cells() {
        // D1 reads a range far larger than the formula count, E1 a single cell
        let graph = DependencyGraph::from_formulas(&[
            (a("A1"), vec![]),
            (a("A2"), vec![]),
            (a("A900"), vec![]),
            (a("D1"), vec![CellRange::parse("A1:A1000").unwrap()]),
            (a("E1"), vec![CellRange::parse("A2").unwrap()]),
        ]);

        let mut read_by_d1: Vec<_> = graph.get_precedents(a("D1")).collect();
        read_by_d1.sort();
        assert_eq!(read_by_d1, vec![a("A1"), a("A2"), a("A900")]);
        assert_eq!(graph.get_precedents(a("E1")).collect::<Vec<_>>(), vec![a("A2")]);
    }

    #[test]
    fn test_self_reference() {
        let graph = DependencyGraph::from_formulas(&[(
            a("B2"),
            vec![CellRange::parse("A1:C3").unwrap()],
        )]);

        let order = graph.calculation_order(&[a("B2")]);
        assert_eq!(order.circular, vec![a("B2")]);
        assert!(order.ordered.is_empty());
    }
}
