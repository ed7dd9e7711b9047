//! Bit-blasted gate semantics shared by the probing-security and
//! independence checkers.

use easy_smt::{Context, SExpr};
use itertools::Itertools;
use leakcheck_common::{CellKind, Graph, GraphNodeIdx, Var};

use crate::error::{Result, SmtError};

/// Which layer of the per-node, per-variable dependence vector a query
/// targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Only final logical values are modeled.
    Stable,
    /// Final values plus every glitch combination reachable during settling.
    Transient,
}

impl Mode {
    /// True when the transient layer must also be declared and constrained.
    #[must_use]
    pub const fn has_transient_layer(self) -> bool {
        matches!(self, Self::Transient)
    }
}

/// One node's `stable`/`transient` dependence vectors, one entry per member
/// of the variable universe `V`.
#[derive(Clone, Debug)]
struct NodeLayers {
    stable: Vec<SExpr>,
    transient: Option<Vec<SExpr>>,
}

/// Declares and constrains the `stable`/`transient` dependence vectors for
/// every node of a simplified circuit graph, for a fixed variable universe.
///
/// Building this is the part of the encoding that is identical between the
/// probing-security and independence checkers; only probe-activation and the
/// leakage formula differ.
pub struct CircuitEncoder<'g> {
    graph: &'g Graph,
    vars: Vec<Var>,
    mode: Mode,
    layers: Vec<NodeLayers>,
}

impl<'g> CircuitEncoder<'g> {
    /// Declares the dependence vectors for every node and asserts every gate
    /// constraint in the leakage algebra (generalized to `mux`'s three-input
    /// case; see [`nonlinear_disjunction`]).
    ///
    /// # Errors
    /// Returns [`SmtError`] if declaring a constant or asserting a formula
    /// fails to round-trip through the solver process.
    pub fn build(ctx: &mut Context, graph: &'g Graph, vars: Vec<Var>, mode: Mode) -> Result<Self> {
        let bool_sort = ctx.bool_sort();
        let mut layers = Vec::with_capacity(graph.node_count());
        for idx in graph.node_indices() {
            let mut stable = Vec::with_capacity(vars.len());
            for v in &vars {
                stable.push(
                    ctx.declare_const(&format!("{v}_{}_stable", node_name(graph, idx)), bool_sort)
                        .map_err(SmtError::from_solver)?,
                );
            }
            let transient = if mode.has_transient_layer() {
                let mut t = Vec::with_capacity(vars.len());
                for v in &vars {
                    t.push(
                        ctx.declare_const(&format!("{v}_{}_transient", node_name(graph, idx)), bool_sort)
                            .map_err(SmtError::from_solver)?,
                    );
                }
                Some(t)
            } else {
                None
            };
            layers.push(NodeLayers { stable, transient });
        }

        let mut encoder = Self { graph, vars, mode, layers };
        for idx in graph.node_indices() {
            encoder.assert_gate(ctx, idx)?;
        }
        Ok(encoder)
    }

    /// Returns the `stable` (or, in transient mode, `transient`) SExpr for
    /// one node/variable pair — the value the checking-gate XORs over.
    #[must_use]
    pub fn layer(&self, idx: GraphNodeIdx, var_pos: usize) -> SExpr {
        let layers = &self.layers[idx.as_usize()];
        match (self.mode, &layers.transient) {
            (Mode::Transient, Some(t)) => t[var_pos],
            _ => layers.stable[var_pos],
        }
    }

    /// The fixed variable universe this encoder was built for.
    #[must_use]
    pub fn vars(&self) -> &[Var] {
        &self.vars
    }

    fn assert_gate(&mut self, ctx: &mut Context, idx: GraphNodeIdx) -> Result<()> {
        let cell = self.graph.cell(idx);
        let preds: Vec<GraphNodeIdx> = self.graph.predecessors(idx).to_vec();
        match cell.kind {
            CellKind::Port => self.assert_port(ctx, idx),
            CellKind::Xor | CellKind::Xnor => self.assert_linear(ctx, idx, &preds),
            CellKind::And | CellKind::Or | CellKind::Mux => self.assert_nonlinear(ctx, idx, &preds),
            CellKind::Dff | CellKind::DffSr => self.assert_register(ctx, idx, &preds),
            CellKind::Not | CellKind::Const => {
                unreachable!("normalizer removes not/const nodes before checking")
            }
        }
    }

    fn assert_port(&mut self, ctx: &mut Context, idx: GraphNodeIdx) -> Result<()> {
        let cell = self.graph.cell(idx);
        for pos in 0..self.vars.len() {
            let v = self.vars[pos];
            let expected = cell.labels.iter().any(|l| l.as_var() == Some(v));
            let stable = self.layers[idx.as_usize()].stable[pos];
            ctx.assert(iff(ctx, stable, expected)).map_err(SmtError::from_solver)?;
            if let Some(transient) = self.layers[idx.as_usize()].transient.clone() {
                ctx.assert(iff(ctx, transient[pos], expected)).map_err(SmtError::from_solver)?;
            }
        }
        Ok(())
    }

    fn assert_linear(&mut self, ctx: &mut Context, idx: GraphNodeIdx, preds: &[GraphNodeIdx]) -> Result<()> {
        match preds {
            [a, b] => {
                let out = self.layers[idx.as_usize()].stable.clone();
                let va = self.layers[a.as_usize()].stable.clone();
                let vb = self.layers[b.as_usize()].stable.clone();
                ctx.assert(xor_equation(ctx, &va, &vb, &out)).map_err(SmtError::from_solver)?;
                if self.mode.has_transient_layer() {
                    let out_t = self.layers[idx.as_usize()].transient.clone().unwrap();
                    let ta = self.layers[a.as_usize()].transient.clone().unwrap();
                    let tb = self.layers[b.as_usize()].transient.clone().unwrap();
                    ctx.assert(nonlinear_disjunction(ctx, &[ta, tb], &out_t))
                        .map_err(SmtError::from_solver)?;
                }
                Ok(())
            }
            [a] => self.assert_copy_from_single(ctx, idx, *a),
            other => panic!("xor/xnor gate has {} predecessors, expected 1 or 2", other.len()),
        }
    }

    fn assert_nonlinear(&mut self, ctx: &mut Context, idx: GraphNodeIdx, preds: &[GraphNodeIdx]) -> Result<()> {
        if preds.len() == 1 {
            return self.assert_copy_from_single(ctx, idx, preds[0]);
        }
        assert!(!preds.is_empty(), "and/or/mux gate must have at least one predecessor");
        let out = self.layers[idx.as_usize()].stable.clone();
        let operands: Vec<Vec<SExpr>> = preds.iter().map(|p| self.layers[p.as_usize()].stable.clone()).collect();
        ctx.assert(nonlinear_disjunction(ctx, &operands, &out)).map_err(SmtError::from_solver)?;
        if self.mode.has_transient_layer() {
            let out_t = self.layers[idx.as_usize()].transient.clone().unwrap();
            let operands_t: Vec<Vec<SExpr>> = preds
                .iter()
                .map(|p| self.layers[p.as_usize()].transient.clone().unwrap())
                .collect();
            ctx.assert(nonlinear_disjunction(ctx, &operands_t, &out_t))
                .map_err(SmtError::from_solver)?;
        }
        Ok(())
    }

    fn assert_register(&mut self, ctx: &mut Context, idx: GraphNodeIdx, preds: &[GraphNodeIdx]) -> Result<()> {
        let [a] = preds else {
            panic!("dff/dffsr gate has {} predecessors, expected 1", preds.len());
        };
        let stable_in = self.layers[a.as_usize()].stable.clone();
        let stable_out = self.layers[idx.as_usize()].stable.clone();
        ctx.assert(copy_equation(ctx, &stable_in, &stable_out)).map_err(SmtError::from_solver)?;
        // Registers filter glitches: the transient output equals the
        // predecessor's *stable* value, never its transient one.
        if let Some(transient_out) = self.layers[idx.as_usize()].transient.clone() {
            ctx.assert(copy_equation(ctx, &stable_in, &transient_out))
                .map_err(SmtError::from_solver)?;
        }
        Ok(())
    }

    fn assert_copy_from_single(&mut self, ctx: &mut Context, idx: GraphNodeIdx, pred: GraphNodeIdx) -> Result<()> {
        let stable_in = self.layers[pred.as_usize()].stable.clone();
        let stable_out = self.layers[idx.as_usize()].stable.clone();
        ctx.assert(copy_equation(ctx, &stable_in, &stable_out)).map_err(SmtError::from_solver)?;
        if self.mode.has_transient_layer() {
            let transient_in = self.layers[pred.as_usize()].transient.clone().unwrap();
            let transient_out = self.layers[idx.as_usize()].transient.clone().unwrap();
            ctx.assert(copy_equation(ctx, &transient_in, &transient_out))
                .map_err(SmtError::from_solver)?;
        }
        Ok(())
    }
}

fn node_name(graph: &Graph, idx: GraphNodeIdx) -> String {
    graph.cell(idx).name.clone()
}

fn iff(ctx: &Context, expr: SExpr, value: bool) -> SExpr {
    if value {
        expr
    } else {
        ctx.not(expr)
    }
}

/// `AND_i (out[i] == in[i])` — one vector exactly equals another.
fn copy_equation(ctx: &Context, input: &[SExpr], output: &[SExpr]) -> SExpr {
    let eqs: Vec<SExpr> = input.iter().zip(output).map(|(&i, &o)| ctx.eq(i, o)).collect();
    and_many(ctx, &eqs)
}

/// `AND_i (out[i] == (a[i] XOR b[i]))` — bitwise XOR between two vectors.
fn xor_equation(ctx: &Context, a: &[SExpr], b: &[SExpr], output: &[SExpr]) -> SExpr {
    let eqs: Vec<SExpr> = a
        .iter()
        .zip(b)
        .zip(output)
        .map(|((&x, &y), &o)| ctx.eq(o, xor2(ctx, x, y)))
        .collect();
    and_many(ctx, &eqs)
}

/// The sound nonlinear-gate abstraction: the output's dependence
/// vector is one of {empty, XOR over any non-empty subset of operands}. For
/// two operands this is exactly {empty, copy(a), copy(b), a XOR b}; for
/// three operands (mux: select, a, b — the original tool has no mux case at
/// all, so this is an open design point resolved here) it extends to the
/// eight subsets of {sel, a, b}, which is the same rule applied uniformly
/// rather than a special-cased mux formula.
fn nonlinear_disjunction(ctx: &Context, operands: &[Vec<SExpr>], output: &[SExpr]) -> SExpr {
    let width = output.len();
    let empty = empty_equation(ctx, output);
    let mut disjuncts = vec![empty];
    for subset_len in 1..=operands.len() {
        for subset in (0..operands.len()).combinations(subset_len) {
            let xor_vec: Vec<SExpr> = (0..width)
                .map(|i| {
                    subset
                        .iter()
                        .map(|&op| operands[op][i])
                        .reduce(|a, b| xor2(ctx, a, b))
                        .expect("subset is non-empty")
                })
                .collect();
            disjuncts.push(copy_equation(ctx, &xor_vec, output));
        }
    }
    or_many(ctx, &disjuncts)
}

fn empty_equation(ctx: &Context, output: &[SExpr]) -> SExpr {
    let negs: Vec<SExpr> = output.iter().map(|&o| ctx.not(o)).collect();
    and_many(ctx, &negs)
}

fn xor2(ctx: &Context, a: SExpr, b: SExpr) -> SExpr {
    ctx.list(vec![ctx.atom("xor"), a, b])
}

/// `AND` over a list of boolean `SExpr`s, `true` for the empty list.
pub fn and_many(ctx: &Context, items: &[SExpr]) -> SExpr {
    match items {
        [] => ctx.true_(),
        [single] => *single,
        _ => ctx.list(std::iter::once(ctx.atom("and")).chain(items.iter().copied()).collect()),
    }
}

/// `OR` over a list of boolean `SExpr`s, `false` for the empty list.
pub fn or_many(ctx: &Context, items: &[SExpr]) -> SExpr {
    match items {
        [] => ctx.false_(),
        [single] => *single,
        _ => ctx.list(std::iter::once(ctx.atom("or")).chain(items.iter().copied()).collect()),
    }
}

/// XOR over a list of boolean `SExpr`s, `false` for the empty list
/// (`original_source/Z3Checker.py::__xor_list`, generalized from its
/// recursive pairwise form to a fold).
pub fn xor_many(ctx: &Context, items: &[SExpr]) -> SExpr {
    items.iter().copied().reduce(|a, b| xor2(ctx, a, b)).unwrap_or_else(|| ctx.false_())
}

/// One probe activation bit, paired with the node it activates.
pub type Activation = (GraphNodeIdx, SExpr);

/// `checking_gate(v) = XOR_n (act[n] AND layer[n][v])`: the value an attacker watching every activated probe would see
/// for variable `v`, if those probes combine by XOR.
pub fn checking_gate(ctx: &Context, encoder: &CircuitEncoder, activations: &[Activation], var_pos: usize) -> SExpr {
    let terms: Vec<SExpr> = activations
        .iter()
        .map(|&(idx, act)| and_many(ctx, &[act, encoder.layer(idx, var_pos)]))
        .collect();
    xor_many(ctx, &terms)
}

/// The leakage formula shared by both checkers: some secret
/// survives the activated probe set while every mask is cancelled out.
pub fn leakage_formula(ctx: &Context, encoder: &CircuitEncoder, activations: &[Activation]) -> SExpr {
    let vars = encoder.vars().to_vec();
    let secret_terms: Vec<SExpr> = vars
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_secret())
        .map(|(pos, _)| checking_gate(ctx, encoder, activations, pos))
        .collect();
    let mask_terms: Vec<SExpr> = vars
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_mask())
        .map(|(pos, _)| ctx.not(checking_gate(ctx, encoder, activations, pos)))
        .collect();
    and_many(ctx, &[or_many(ctx, &secret_terms), and_many(ctx, &mask_terms)])
}

fn ite_int(ctx: &Context, b: SExpr) -> SExpr {
    ctx.list(vec![ctx.atom("ite"), b, ctx.numeral(1_i32), ctx.numeral(0_i32)])
}

fn sum_ints(ctx: &Context, terms: &[SExpr]) -> SExpr {
    match terms {
        [] => ctx.numeral(0_i32),
        [single] => *single,
        _ => ctx.list(std::iter::once(ctx.atom("+")).chain(terms.iter().copied()).collect()),
    }
}

/// `Sum_i ite(bits[i], 1, 0) <= k` — a probing-order cardinality bound
/// encoded over the integer sort rather than a pairwise pseudo-boolean
/// expansion, since the order `d` is small and the solver already carries
/// linear integer arithmetic.
pub fn at_most(ctx: &Context, bits: &[SExpr], k: usize) -> SExpr {
    let terms: Vec<SExpr> = bits.iter().map(|&b| ite_int(ctx, b)).collect();
    let sum = sum_ints(ctx, &terms);
    ctx.list(vec![ctx.atom("<="), sum, ctx.numeral(k as i32)])
}
