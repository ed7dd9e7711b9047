//! Shared data model for the d-probing leakage verifier: cells, the circuit
//! graph, symbolic labels, and the crate-wide error type.
//!
//! Grounded on `svql_common`'s layering: design primitives (`cell`, `wire`)
//! live in one crate that every downstream crate (loader, checkers, driver)
//! depends on, rather than each crate defining its own copy.

pub mod cell;
pub mod error;
pub mod graph;
pub mod ids;
pub mod label;

pub use cell::{Cell, CellKind, PortDirection};
pub use error::LeakCheckError;
pub use graph::Graph;
pub use ids::{GraphNodeIdx, PortBitId};
pub use label::{variable_universe, Label, Var};
