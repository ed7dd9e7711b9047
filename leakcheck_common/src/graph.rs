//! Adjacency-list graph of cell nodes connected by wire edges.
//!
//! Grounded on `svql_common::index::graph_index`: fan-in/fan-out are
//! precomputed once as `HashMap<GraphNodeIdx, Vec<GraphNodeIdx>>` and queried
//! many times by the Normalizer and the checkers, rather than walking a
//! generic graph library's edge list on every query.

use indexmap::IndexMap;

use crate::cell::Cell;
use crate::ids::GraphNodeIdx;

/// A directed graph of [`Cell`] nodes. Used for both the raw graph produced
/// by the Loader and the simplified graph produced by the Normalizer — the
/// two differ only in which invariants their construction guarantees, not in
/// representation.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    cells: Vec<Cell>,
    names: IndexMap<String, GraphNodeIdx>,
    fanin: Vec<Vec<GraphNodeIdx>>,
    fanout: Vec<Vec<GraphNodeIdx>>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a cell, returning its stable index. If a cell with this name
    /// already exists, returns its existing index instead of inserting a
    /// duplicate (mirrors `CircuitGraph.py::__add_cell`'s "already exists"
    /// tolerance).
    pub fn add_cell(&mut self, cell: Cell) -> GraphNodeIdx {
        if let Some(&idx) = self.names.get(&cell.name) {
            return idx;
        }
        let idx = GraphNodeIdx::new(self.cells.len() as u32);
        self.names.insert(cell.name.clone(), idx);
        self.cells.push(cell);
        self.fanin.push(Vec::new());
        self.fanout.push(Vec::new());
        idx
    }

    /// Adds a directed edge from `from`'s output to `to`'s input.
    pub fn add_edge(&mut self, from: GraphNodeIdx, to: GraphNodeIdx) {
        self.fanout[from.as_usize()].push(to);
        self.fanin[to.as_usize()].push(from);
    }

    /// Looks up a node by its cell name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<GraphNodeIdx> {
        self.names.get(name).copied()
    }

    /// Returns the cell stored at the given index.
    #[must_use]
    pub fn cell(&self, idx: GraphNodeIdx) -> &Cell {
        &self.cells[idx.as_usize()]
    }

    /// Returns a mutable reference to the cell at the given index, used to
    /// attach labels produced by a labeling generator after the graph has
    /// already been loaded.
    pub fn cell_mut(&mut self, idx: GraphNodeIdx) -> &mut Cell {
        &mut self.cells[idx.as_usize()]
    }

    /// Returns the immediate predecessors (fan-in) of a node, in edge
    /// insertion order.
    #[must_use]
    pub fn predecessors(&self, idx: GraphNodeIdx) -> &[GraphNodeIdx] {
        &self.fanin[idx.as_usize()]
    }

    /// Returns the immediate successors (fan-out) of a node, in edge
    /// insertion order.
    #[must_use]
    pub fn successors(&self, idx: GraphNodeIdx) -> &[GraphNodeIdx] {
        &self.fanout[idx.as_usize()]
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterates over all node indices in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = GraphNodeIdx> + '_ {
        (0..self.cells.len() as u32).map(GraphNodeIdx::new)
    }

    /// Returns true if a node has neither predecessors nor successors.
    #[must_use]
    pub fn is_isolated(&self, idx: GraphNodeIdx) -> bool {
        self.predecessors(idx).is_empty() && self.successors(idx).is_empty()
    }

    /// Collects every ancestor of `idx` reachable by following fan-in edges,
    /// using an explicit worklist rather than recursion.
    #[must_use]
    pub fn all_predecessors(&self, idx: GraphNodeIdx) -> indexmap::IndexSet<GraphNodeIdx> {
        self.reachable(idx, Self::predecessors)
    }

    /// Collects every descendant of `idx` reachable by following fan-out
    /// edges. See [`Graph::all_predecessors`] for the iterative-worklist
    /// rationale.
    #[must_use]
    pub fn all_successors(&self, idx: GraphNodeIdx) -> indexmap::IndexSet<GraphNodeIdx> {
        self.reachable(idx, Self::successors)
    }

    fn reachable(
        &self,
        start: GraphNodeIdx,
        neighbors: impl Fn(&Self, GraphNodeIdx) -> &[GraphNodeIdx],
    ) -> indexmap::IndexSet<GraphNodeIdx> {
        let mut visited = indexmap::IndexSet::new();
        let mut worklist: Vec<GraphNodeIdx> = neighbors(self, start).to_vec();
        while let Some(n) = worklist.pop() {
            if visited.insert(n) {
                worklist.extend_from_slice(neighbors(self, n));
            }
        }
        visited
    }

    /// Returns every node with no successors — the circuit's output cells
    /// (used by the independence checker to form the `output` probe group).
    #[must_use]
    pub fn outputs(&self) -> Vec<GraphNodeIdx> {
        self.node_indices()
            .filter(|&idx| self.successors(idx).is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKind;

    #[test]
    fn duplicate_cell_names_share_one_index() {
        let mut g = Graph::new();
        let a = g.add_cell(Cell::gate("and_1", CellKind::And));
        let b = g.add_cell(Cell::gate("and_1", CellKind::And));
        assert_eq!(a, b);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn isolated_node_has_no_predecessors_or_successors() {
        let mut g = Graph::new();
        let a = g.add_cell(Cell::gate("and_1", CellKind::And));
        assert!(g.is_isolated(a));
        let b = g.add_cell(Cell::gate("and_2", CellKind::And));
        g.add_edge(a, b);
        assert!(!g.is_isolated(a));
        assert!(!g.is_isolated(b));
    }

    #[test]
    fn all_predecessors_is_transitive_and_iterative() {
        let mut g = Graph::new();
        let a = g.add_cell(Cell::gate("a", CellKind::And));
        let b = g.add_cell(Cell::gate("b", CellKind::And));
        let c = g.add_cell(Cell::gate("c", CellKind::And));
        g.add_edge(a, b);
        g.add_edge(b, c);
        let preds = g.all_predecessors(c);
        assert!(preds.contains(&a));
        assert!(preds.contains(&b));
    }
}
