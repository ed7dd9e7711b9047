//! Independence checker: for each share group, can at most `d`
//! probes plus the full output reconstruct that group's secret? Unlike the
//! probing-security checker, this is always run in transient mode and
//! declares activation bits only for each group's own bits, not every node.

use easy_smt::{ContextBuilder, Response};
use indexmap::IndexMap;
use leakcheck_common::{variable_universe, Graph, GraphNodeIdx};

use crate::encoding::{at_most, leakage_formula, Activation, CircuitEncoder, Mode};
use crate::error::{Result, SmtError};
use crate::verdict::Verdict;

/// Parameters of one independence query.
#[derive(Clone, Debug)]
pub struct IndependenceConfig {
    /// Maximum number of simultaneously activated probes, per group.
    pub order: usize,
    /// If set and the query is SAT, write the satisfying activation
    /// assignment as JSON to this path.
    pub dump_model: Option<std::path::PathBuf>,
}

/// Probe groups: share-group name (plus the reserved `"output"` group) to
/// the graph nodes eligible to be probed within that group
/// (`original_source/helpers.py::get_shares`, resolved from bit ids to graph
/// nodes by the caller; this module never resolves label-file bit ids
/// itself, so it never needs to depend on the labeling crate).
pub type ProbeGroups = IndexMap<String, Vec<GraphNodeIdx>>;

/// Runs the independence check over a normalized graph for one labeling.
///
/// Each group gets its own `0 <= Sum(activations) <= d` bound, independent
/// of every other group; there
/// is no global "at least one probe" constraint — the leakage formula's
/// secret-survives disjunct already forces that.
///
/// # Errors
/// Returns [`SmtError`] on solver process failure, or if the solver answers
/// `unknown`.
pub fn check(graph: &Graph, groups: &ProbeGroups, config: IndependenceConfig) -> Result<Verdict> {
    let vars = variable_universe(
        graph
            .node_indices()
            .flat_map(|idx| graph.cell(idx).labels.iter().copied()),
    );

    let mut ctx = ContextBuilder::new()
        .solver("z3")
        .build()
        .map_err(SmtError::from_solver)?;

    let encoder = CircuitEncoder::build(&mut ctx, graph, vars, Mode::Transient)?;

    let bool_sort = ctx.bool_sort();
    let mut named_activations: Vec<(String, Activation)> = Vec::new();
    for (group, nodes) in groups {
        let mut group_bits = Vec::with_capacity(nodes.len());
        for &idx in nodes {
            let name = format!("activation_{group}_{}", graph.cell(idx).name);
            let act = ctx.declare_const(&name, bool_sort).map_err(SmtError::from_solver)?;
            group_bits.push(act);
            named_activations.push((group.clone(), (idx, act)));
        }
        let card = at_most(&ctx, &group_bits, config.order);
        ctx.assert(card).map_err(SmtError::from_solver)?;
    }

    let activations: Vec<Activation> = named_activations.iter().map(|(_, a)| *a).collect();
    let formula = leakage_formula(&ctx, &encoder, &activations);
    ctx.assert(formula).map_err(SmtError::from_solver)?;

    match ctx.check().map_err(SmtError::from_solver)? {
        Response::Unsat => Ok(Verdict::Secure),
        Response::Sat => {
            let (suspicious, model) = extract_model(&mut ctx, graph, &named_activations)?;
            if let Some(path) = &config.dump_model {
                crate::model_dump::write(path, &model)?;
            }
            Ok(Verdict::Insecure(suspicious))
        }
        Response::Unknown => Err(SmtError::from_solver("solver returned unknown")),
    }
}

fn extract_model(
    ctx: &mut easy_smt::Context,
    graph: &Graph,
    named_activations: &[(String, Activation)],
) -> Result<(Vec<String>, Vec<(String, bool)>)> {
    let terms: Vec<_> = named_activations.iter().map(|(_, (_, a))| *a).collect();
    let values = ctx.get_value(terms).map_err(SmtError::from_solver)?;
    let true_atom = ctx.true_();
    let mut suspicious = Vec::new();
    let mut model = Vec::new();
    for ((group, (idx, _)), &(_, value)) in named_activations.iter().zip(values.iter()) {
        let active = value == true_atom;
        let name = format!("{group}/{}", graph.cell(*idx).name);
        if active {
            suspicious.push(name.clone());
        }
        model.push((format!("activation_{name}"), active));
    }
    Ok((suspicious, model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_groups_have_no_activations() {
        let groups: ProbeGroups = IndexMap::new();
        assert!(groups.is_empty());
    }
}
