//! Reduces a raw circuit graph to the canonical vocabulary the checkers
//! understand: `port`, `and`, `xor`, `xnor`, `dff`, `dffsr`, `mux`
//! (`original_source/CircuitGraph.py::__construct_graph`).
//!
//! Unlike the loader, this stage cannot fail on an unknown cell kind: every
//! [`CellKind`] already came from [`CellKind::from_type_token`] at load time,
//! so there is nothing left to validate here — the type system carries the
//! "fatal: unknown cell kind" check for us.

use indexmap::IndexMap;

use leakcheck_common::{Cell, CellKind, Graph, GraphNodeIdx};

/// Runs the six-step normalization algorithm, returning the simplified
/// graph. Node indices are **not** preserved: the simplified graph is built
/// fresh, with kept nodes renumbered in raw-graph order.
#[must_use]
pub fn normalize(raw: &Graph) -> Graph {
    let non_isolated: Vec<GraphNodeIdx> = raw
        .node_indices()
        .filter(|&idx| {
            let isolated = raw.is_isolated(idx);
            if isolated {
                tracing::warn!(node = %raw.cell(idx), "isolated node removed");
            }
            !isolated
        })
        .collect();

    // Step 2 + 5: classify each surviving raw node as kept (with its
    // possibly-rewritten kind) or dropped.
    let mut kept_kind: IndexMap<GraphNodeIdx, CellKind> = IndexMap::new();
    for &idx in &non_isolated {
        let cell = raw.cell(idx);
        let kind = match cell.kind {
            CellKind::Port if cell.is_dont_care_port() => continue,
            CellKind::Port
            | CellKind::And
            | CellKind::Xor
            | CellKind::Xnor
            | CellKind::Dff
            | CellKind::DffSr
            | CellKind::Mux => cell.kind,
            CellKind::Or => CellKind::And,
            CellKind::Not | CellKind::Const => continue,
        };
        kept_kind.insert(idx, kind);
    }

    let mut simplified = Graph::new();
    let mut remap: IndexMap<GraphNodeIdx, GraphNodeIdx> = IndexMap::new();
    for &idx in &non_isolated {
        if let Some(&kind) = kept_kind.get(&idx) {
            let raw_cell = raw.cell(idx);
            let new_cell = match kind {
                CellKind::Port => Cell::port(
                    raw_cell.name.clone(),
                    raw_cell.direction.expect("port cell always has a direction"),
                    raw_cell.labels.clone(),
                ),
                other => Cell::gate(raw_cell.name.clone(), other),
            };
            remap.insert(idx, simplified.add_cell(new_cell));
        }
    }

    // Step 6: copy every raw edge whose endpoints both survived.
    for &u in &non_isolated {
        if let Some(&new_u) = remap.get(&u) {
            for &v in raw.successors(u) {
                if let Some(&new_v) = remap.get(&v) {
                    add_edge_once(&mut simplified, new_u, new_v);
                }
            }
        }
    }

    // Step 3: bridge a NOT's kept predecessors directly to its kept
    // successors. Matches the original's single-level bridging — a chain of
    // two NOT gates does not get transitively absorbed, since neither NOT
    // itself is ever a member of the kept set.
    for &idx in &non_isolated {
        if raw.cell(idx).kind != CellKind::Not {
            continue;
        }
        for &p in raw.predecessors(idx) {
            let Some(&new_p) = remap.get(&p) else { continue };
            for &s in raw.successors(idx) {
                if let Some(&new_s) = remap.get(&s) {
                    add_edge_once(&mut simplified, new_p, new_s);
                }
            }
        }
    }

    for idx in simplified.node_indices() {
        let p = simplified.predecessors(idx).len();
        let s = simplified.successors(idx).len();
        if p == 0 && s == 0 {
            tracing::warn!(node = %simplified.cell(idx), "node is not connected after normalization");
        }
        let kind = simplified.cell(idx).kind;
        if matches!(kind, CellKind::And | CellKind::Xor) && (s < 1 || p != 2) {
            tracing::warn!(node = %simplified.cell(idx), predecessors = p, successors = s, "suspicious fan-in/fan-out");
        }
    }

    simplified
}

fn add_edge_once(graph: &mut Graph, from: GraphNodeIdx, to: GraphNodeIdx) {
    if !graph.predecessors(to).contains(&from) {
        graph.add_edge(from, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leakcheck_common::{Label, PortDirection};

    fn input_port(g: &mut Graph, name: &str) -> GraphNodeIdx {
        g.add_cell(Cell::port(name, PortDirection::Input, vec![Label::Secret(1)]))
    }

    #[test]
    fn or_is_rewritten_to_and() {
        let mut raw = Graph::new();
        let a = input_port(&mut raw, "a");
        let b = input_port(&mut raw, "b");
        let or_gate = raw.add_cell(Cell::gate("or_1", CellKind::Or));
        raw.add_edge(a, or_gate);
        raw.add_edge(b, or_gate);

        let simplified = normalize(&raw);
        let idx = simplified.index_of("or_1").unwrap();
        assert_eq!(simplified.cell(idx).kind, CellKind::And);
    }

    #[test]
    fn not_gate_is_absorbed_by_bridging_its_neighbors() {
        let mut raw = Graph::new();
        let a = input_port(&mut raw, "a");
        let not_gate = raw.add_cell(Cell::gate("not_1", CellKind::Not));
        let and_gate = raw.add_cell(Cell::gate("and_1", CellKind::And));
        let b = input_port(&mut raw, "b");
        raw.add_edge(a, not_gate);
        raw.add_edge(not_gate, and_gate);
        raw.add_edge(b, and_gate);

        let simplified = normalize(&raw);
        assert!(simplified.index_of("not_1").is_none());
        let a_idx = simplified.index_of("a").unwrap();
        let and_idx = simplified.index_of("and_1").unwrap();
        assert!(simplified.predecessors(and_idx).contains(&a_idx));
    }

    #[test]
    fn const_driver_is_dropped_with_its_edges() {
        let mut raw = Graph::new();
        let const_cell = raw.add_cell(Cell::gate("const_0", CellKind::Const));
        let not_gate = raw.add_cell(Cell::gate("not_1", CellKind::Not));
        raw.add_edge(const_cell, not_gate);

        let simplified = normalize(&raw);
        assert!(simplified.index_of("const_0").is_none());
    }

    #[test]
    fn dont_care_port_is_dropped() {
        let mut raw = Graph::new();
        let y = raw.add_cell(Cell::port("y_dc", PortDirection::Input, vec![Label::DontCare(1)]));
        let and_gate = raw.add_cell(Cell::gate("and_1", CellKind::And));
        raw.add_edge(y, and_gate);

        let simplified = normalize(&raw);
        assert!(simplified.index_of("y_dc").is_none());
    }

    #[test]
    fn isolated_node_is_removed() {
        let mut raw = Graph::new();
        raw.add_cell(Cell::gate("and_orphan", CellKind::And));
        let simplified = normalize(&raw);
        assert_eq!(simplified.node_count(), 0);
    }

    #[test]
    fn normalizing_an_already_simplified_graph_is_idempotent() {
        let mut raw = Graph::new();
        let a = input_port(&mut raw, "a");
        let b = input_port(&mut raw, "b");
        let and_gate = raw.add_cell(Cell::gate("and_1", CellKind::And));
        raw.add_edge(a, and_gate);
        raw.add_edge(b, and_gate);

        let once = normalize(&raw);
        let twice = normalize(&once);
        assert_eq!(once.node_count(), twice.node_count());
        for name in ["a", "b", "and_1"] {
            let first = once.cell(once.index_of(name).unwrap()).kind;
            let second = twice.cell(twice.index_of(name).unwrap()).kind;
            assert_eq!(first, second);
        }
    }
}
