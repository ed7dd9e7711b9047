//! Probing-security checker: is there a set of at most `d` probes
//! that reconstructs a secret while every mask cancels out?

use easy_smt::{ContextBuilder, Response};
use leakcheck_common::{variable_universe, Graph};

use crate::encoding::{at_most, leakage_formula, Activation, CircuitEncoder, Mode};
use crate::error::{Result, SmtError};
use crate::verdict::Verdict;

/// Parameters of one probing-security query.
#[derive(Clone, Debug)]
pub struct ProbingConfig {
    /// Maximum number of simultaneously activated probes.
    pub order: usize,
    /// Whether glitches are modeled.
    pub mode: Mode,
    /// If set and the query is SAT, write the satisfying activation
    /// assignment as JSON to this path.
    pub dump_model: Option<std::path::PathBuf>,
}

/// Runs the probing-security check over a normalized graph for one labeling.
///
/// # Errors
/// Returns [`SmtError`] on solver process failure, or if the solver answers
/// `unknown`.
pub fn check(graph: &Graph, config: ProbingConfig) -> Result<Verdict> {
    let vars = variable_universe(
        graph
            .node_indices()
            .flat_map(|idx| graph.cell(idx).labels.iter().copied()),
    );

    let mut ctx = ContextBuilder::new()
        .solver("z3")
        .build()
        .map_err(SmtError::from_solver)?;

    let encoder = CircuitEncoder::build(&mut ctx, graph, vars, config.mode)?;

    let bool_sort = ctx.bool_sort();
    let mut activations: Vec<Activation> = Vec::with_capacity(graph.node_count());
    for idx in graph.node_indices() {
        let name = format!("activation_{}", graph.cell(idx).name);
        let act = ctx.declare_const(&name, bool_sort).map_err(SmtError::from_solver)?;
        activations.push((idx, act));
    }
    let bits: Vec<_> = activations.iter().map(|&(_, a)| a).collect();

    let card = at_most(&ctx, &bits, config.order);
    ctx.assert(card).map_err(SmtError::from_solver)?;
    // Probing/standard mode requires at least one active probe; independence mode does not.
    let at_least_one = crate::encoding::or_many(&ctx, &bits);
    ctx.assert(at_least_one).map_err(SmtError::from_solver)?;

    let formula = leakage_formula(&ctx, &encoder, &activations);
    ctx.assert(formula).map_err(SmtError::from_solver)?;

    match ctx.check().map_err(SmtError::from_solver)? {
        Response::Unsat => Ok(Verdict::Secure),
        Response::Sat => {
            let (suspicious, model) = extract_model(&mut ctx, graph, &activations)?;
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
    activations: &[Activation],
) -> Result<(Vec<String>, Vec<(String, bool)>)> {
    let terms: Vec<_> = activations.iter().map(|&(_, a)| a).collect();
    let values = ctx.get_value(terms).map_err(SmtError::from_solver)?;
    let true_atom = ctx.true_();
    let mut suspicious = Vec::new();
    let mut model = Vec::new();
    for (&(idx, _), &(_, value)) in activations.iter().zip(values.iter()) {
        let active = value == true_atom;
        let name = graph.cell(idx).name.clone();
        if active {
            suspicious.push(name.clone());
        }
        model.push((format!("activation_{name}"), active));
    }
    Ok((suspicious, model))
}
