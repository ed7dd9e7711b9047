//! Parses a Yosys-style netlist JSON document into the raw circuit graph
//! (`original_source/CircuitGraph.py::__parse_json`).

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use leakcheck_common::{Cell, CellKind, Graph, GraphNodeIdx, Label, LeakCheckError, PortDirection};

#[derive(Debug, Deserialize)]
struct NetlistDoc {
    top_module: String,
    modules: IndexMap<String, ModuleDoc>,
}

#[derive(Debug, Deserialize)]
struct ModuleDoc {
    #[serde(default)]
    ports: IndexMap<String, PortDoc>,
    #[serde(default)]
    cells: IndexMap<String, CellDoc>,
    #[serde(default)]
    #[allow(dead_code)]
    netnames: IndexMap<String, NetnameDoc>,
}

#[derive(Debug, Deserialize)]
struct PortDoc {
    #[allow(dead_code)]
    direction: String,
    bits: Vec<Value>,
    /// One label-list per entry of `bits`, present only on netlists that have
    /// already been labeled (the `-p` output, read back in by `-i`).
    #[serde(default)]
    label: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Deserialize)]
struct CellDoc {
    #[serde(rename = "type")]
    type_: String,
    #[serde(default)]
    port_directions: IndexMap<String, String>,
    #[serde(default)]
    connections: IndexMap<String, Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct NetnameDoc {
    #[allow(dead_code)]
    bits: Vec<Value>,
}

/// A single bit reference inside a `connections` or `bits` array: either a
/// net id or a literal constant token (`"0"`, `"1"`, `"x"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BitRef {
    Net(u64),
    Const(String),
}

fn bit_ref(v: &Value) -> BitRef {
    match v {
        Value::Number(n) => BitRef::Net(n.as_u64().unwrap_or(0)),
        Value::String(s) => BitRef::Const(s.clone()),
        other => BitRef::Const(other.to_string()),
    }
}

/// Extracts the gate-kind token from a Yosys cell `type` string: the segment
/// following the first `_` separator, lowercased (e.g. `$_AND_` → `and`).
fn kind_token(type_: &str) -> Option<String> {
    type_.split('_').nth(1).map(str::to_ascii_lowercase)
}

/// Extracts the cell instance number from the tail of its key after the last
/// `$` (e.g. `$abc$123$_AND_$456` → `456`).
fn instance_tail(cell_key: &str) -> &str {
    cell_key.rsplit('$').next().unwrap_or(cell_key)
}

/// Loads the raw circuit graph (before normalization) from a Yosys-style
/// netlist JSON document.
///
/// # Errors
/// Returns [`LeakCheckError::Json`] if the document doesn't match the
/// expected shape, [`LeakCheckError::MalformedNetlist`] if `top_module`
/// names a module absent from `modules`, and
/// [`LeakCheckError::UnknownCellKind`] if a cell's `type` doesn't map to a
/// known [`CellKind`].
pub fn load_netlist(json: &str) -> Result<Graph, LeakCheckError> {
    let doc: NetlistDoc = serde_json::from_str(json)?;
    let module = doc.modules.get(&doc.top_module).ok_or_else(|| {
        LeakCheckError::MalformedNetlist(format!(
            "top_module {:?} is not present in modules",
            doc.top_module
        ))
    })?;

    let mut graph = Graph::new();
    let mut producers: IndexMap<BitRef, GraphNodeIdx> = IndexMap::new();
    let mut consts: IndexMap<String, GraphNodeIdx> = IndexMap::new();
    let mut pending: Vec<(GraphNodeIdx, BitRef)> = Vec::new();

    for (name, port) in &module.ports {
        let direction = match port.direction.as_str() {
            "output" => PortDirection::Output,
            _ => PortDirection::Input,
        };
        for (i, bit) in port.bits.iter().enumerate() {
            let bit_ref_val = bit_ref(bit);
            let labels: Vec<Label> = port
                .label
                .as_ref()
                .and_then(|rows| rows.get(i))
                .map(|row| {
                    row.iter()
                        .filter_map(|s| s.parse::<Label>().ok())
                        .collect()
                })
                .unwrap_or_default();
            let node_name = match &bit_ref_val {
                BitRef::Net(id) => id.to_string(),
                BitRef::Const(tok) => format!("{name}_{tok}"),
            };
            let idx = graph.add_cell(Cell::port(node_name, direction, labels));
            match direction {
                // An input port originates its bit; it is the producer.
                PortDirection::Input => {
                    producers.insert(bit_ref_val, idx);
                }
                // An output port consumes whatever drives its bit.
                PortDirection::Output => pending.push((idx, bit_ref_val)),
            }
        }
    }

    for (cell_key, cell) in &module.cells {
        let token = kind_token(&cell.type_).unwrap_or_default();
        let kind = CellKind::from_type_token(&token).ok_or_else(|| LeakCheckError::UnknownCellKind {
            cell: cell_key.clone(),
            kind: cell.type_.clone(),
        })?;
        let node_name = format!("{kind}_{}", instance_tail(cell_key));
        let idx = graph.add_cell(Cell::gate(node_name, kind));

        for (port_name, direction) in &cell.port_directions {
            let Some(bits) = cell.connections.get(port_name) else {
                continue;
            };
            let Some(first) = bits.first() else { continue };
            let bit_ref_val = bit_ref(first);
            match direction.as_str() {
                "output" => {
                    producers.insert(bit_ref_val, idx);
                }
                _ => match bit_ref_val {
                    BitRef::Net(_) => pending.push((idx, bit_ref_val)),
                    BitRef::Const(tok) => {
                        let const_idx = *consts
                            .entry(tok.clone())
                            .or_insert_with(|| graph.add_cell(Cell::gate(format!("const_{tok}"), CellKind::Const)));
                        graph.add_edge(const_idx, idx);
                    }
                },
            }
        }
    }

    for (consumer, bit) in pending {
        match producers.get(&bit) {
            Some(&producer) => graph.add_edge(producer, consumer),
            None => {
                tracing::warn!(?bit, cell = %graph.cell(consumer), "no producer for wire; leaving input unconnected");
            }
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> &'static str {
        r#"{
            "top_module": "top",
            "modules": {
                "top": {
                    "ports": {
                        "a": { "direction": "input", "bits": [2] },
                        "b": { "direction": "input", "bits": [3] },
                        "y": { "direction": "output", "bits": [4] }
                    },
                    "cells": {
                        "$abc$1$_AND_$42": {
                            "type": "$_AND_",
                            "port_directions": { "A": "input", "B": "input", "Y": "output" },
                            "connections": { "A": [2], "B": [3], "Y": [4] }
                        }
                    },
                    "netnames": {}
                }
            }
        }"#
    }

    #[test]
    fn loads_two_input_gate_with_port_edges() {
        let graph = load_netlist(fixture()).unwrap();
        assert_eq!(graph.node_count(), 4);
        let and_idx = graph.index_of("and_42").expect("gate present");
        assert_eq!(graph.predecessors(and_idx).len(), 2);
        let y_idx = graph.index_of("4").expect("output port present");
        assert_eq!(graph.predecessors(y_idx), &[and_idx]);
    }

    #[test]
    fn unknown_cell_type_is_a_fatal_error() {
        let bad = fixture().replace("$_AND_", "$_NAND_");
        let err = load_netlist(&bad).unwrap_err();
        assert!(matches!(err, LeakCheckError::UnknownCellKind { .. }));
    }

    #[test]
    fn constant_driven_input_synthesizes_a_const_cell() {
        let json = r#"{
            "top_module": "top",
            "modules": {
                "top": {
                    "ports": { "y": { "direction": "output", "bits": [1] } },
                    "cells": {
                        "$1": {
                            "type": "$_NOT_",
                            "port_directions": { "A": "input", "Y": "output" },
                            "connections": { "A": ["0"], "Y": [1] }
                        }
                    }
                }
            }
        }"#;
        let graph = load_netlist(json).unwrap();
        let const_idx = graph.index_of("const_0").expect("const cell synthesized");
        assert_eq!(const_idx.as_usize() < graph.node_count(), true);
    }
}
