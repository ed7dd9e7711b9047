//! Attaches a generated [`Labeling`] onto a raw circuit graph's port cells
//! before normalization.

use leakcheck_common::Graph;
use leakcheck_labels::Labeling;

/// Clones `raw` and overwrites every port cell's labels with the ones the
/// labeling assigns to its bit id, leaving ports the labeling doesn't
/// mention untouched.
#[must_use]
pub fn apply_labeling(raw: &Graph, labeling: &Labeling) -> Graph {
    let mut graph = raw.clone();
    for (bit, labels) in labeling.iter() {
        if let Some(idx) = graph.index_of(bit) {
            graph.cell_mut(idx).labels = labels.clone();
        } else {
            tracing::warn!(bit, "labeling names a bit with no matching port cell");
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use leakcheck_common::{Cell, Label, PortDirection};
    use leakcheck_labels::parse_label_file;

    #[test]
    fn labeling_overwrites_only_named_ports() {
        let mut raw = Graph::new();
        raw.add_cell(Cell::port("1", PortDirection::Input, Vec::new()));
        raw.add_cell(Cell::port("2", PortDirection::Input, Vec::new()));

        let entries = parse_label_file("a_1: secret\n").unwrap();
        let labeling = leakcheck_labels::generate_single(&entries);
        let labeled = apply_labeling(&raw, &labeling);

        let idx = labeled.index_of("1").unwrap();
        assert_eq!(labeled.cell(idx).labels, vec![Label::Secret(1)]);
        let idx2 = labeled.index_of("2").unwrap();
        assert!(labeled.cell(idx2).labels.is_empty());
    }
}
