//! Cell kinds and the cell node payload stored in a [`crate::graph::Graph`].

use std::fmt;

use crate::label::Label;

/// Categorizes netlist cells into the vocabulary the leakage algebra
/// understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellKind {
    /// A primary input or output bit.
    Port,
    /// Logical AND gate.
    And,
    /// Logical OR gate. Rewritten to `And` by the normalizer.
    Or,
    /// Logical XOR gate.
    Xor,
    /// Logical XNOR gate.
    Xnor,
    /// Inverter. Absorbed by the normalizer.
    Not,
    /// Multiplexer.
    Mux,
    /// Edge-triggered flip-flop.
    Dff,
    /// Flip-flop with set/reset.
    DffSr,
    /// Constant driver. Dropped by the normalizer.
    Const,
}

impl CellKind {
    /// Returns the lowercase gate token as it appears after the first `_` of
    /// a Yosys cell `type` string.
    #[must_use]
    pub fn from_type_token(token: &str) -> Option<Self> {
        match token {
            "port" => Some(Self::Port),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "xor" => Some(Self::Xor),
            "xnor" => Some(Self::Xnor),
            "not" => Some(Self::Not),
            "mux" => Some(Self::Mux),
            "dff" => Some(Self::Dff),
            "dffsr" => Some(Self::DffSr),
            "const" => Some(Self::Const),
            _ => None,
        }
    }

    /// Returns true for cells the Normalizer carries over to the simplified
    /// graph unchanged: `and`, `xor`, `xnor`, `dff`,
    /// `dffsr`, `mux`. `or` is rewritten to `and` before this check, `port`
    /// survives via a separate rule (don't-care ports are dropped), and
    /// `not`/`const` are always dropped.
    #[must_use]
    pub const fn survives_normalization(&self) -> bool {
        matches!(
            self,
            Self::And | Self::Xor | Self::Xnor | Self::Dff | Self::DffSr | Self::Mux
        )
    }

    /// Returns true if this kind is treated as "nonlinear" by the checker's
    /// gate-constraint table: the output's variable-dependence
    /// set is abstracted as one of `{empty, copy of either operand,
    /// symmetric difference}` rather than computed exactly.
    #[must_use]
    pub const fn is_nonlinear(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Mux)
    }

    /// Returns true if this kind is treated as "linear" (exact XOR
    /// propagation) by the checker.
    #[must_use]
    pub const fn is_linear(&self) -> bool {
        matches!(self, Self::Xor | Self::Xnor)
    }

    /// Returns true for sequential elements, which filter transient glitches.
    #[must_use]
    pub const fn is_register(&self) -> bool {
        matches!(self, Self::Dff | Self::DffSr)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Port => "port",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Xnor => "xnor",
            Self::Not => "not",
            Self::Mux => "mux",
            Self::Dff => "dff",
            Self::DffSr => "dffsr",
            Self::Const => "const",
        };
        write!(f, "{s}")
    }
}

/// Direction of a port cell, carried only on `Port` nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// Primary input bit.
    Input,
    /// Primary output bit.
    Output,
}

/// A node of the circuit graph.
///
/// `predecessors` and `successors` are *not* stored on `Cell` itself — they
/// live in the owning [`crate::graph::Graph`]'s adjacency maps, so a `Cell`
/// can be cheaply cloned or swapped out during normalization without
/// invalidating edge bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Stable, human-readable name (`"and_12"`, `"a_0"`, ...).
    pub name: String,
    /// The gate kind.
    pub kind: CellKind,
    /// Port direction; only meaningful when `kind == CellKind::Port`.
    pub direction: Option<PortDirection>,
    /// Symbolic labels carried by a port bit. Empty for
    /// non-port cells.
    pub labels: Vec<Label>,
}

impl Cell {
    /// Creates a non-port cell (gate, register, or constant driver).
    #[must_use]
    pub fn gate(name: impl Into<String>, kind: CellKind) -> Self {
        Self {
            name: name.into(),
            kind,
            direction: None,
            labels: Vec::new(),
        }
    }

    /// Creates a port cell with the given direction and labels.
    #[must_use]
    pub fn port(name: impl Into<String>, direction: PortDirection, labels: Vec<Label>) -> Self {
        Self {
            name: name.into(),
            kind: CellKind::Port,
            direction: Some(direction),
            labels,
        }
    }

    /// Returns true if this is a port cell whose first label marks it
    /// don't-care (`y_*`), dropped during normalization.
    #[must_use]
    pub fn is_dont_care_port(&self) -> bool {
        self.kind == CellKind::Port
            && matches!(self.labels.first(), Some(Label::DontCare(_)))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.name)
    }
}
