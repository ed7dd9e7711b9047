//! Crate-wide error type.
//!
//! Grounded on `svql_driver::driver::DriverError`: a flat `thiserror` enum
//! with one variant per failure class, rather than a tree of nested error
//! types per module.

use thiserror::Error;

/// Errors surfaced while loading, normalizing, or labeling a netlist.
///
/// Every variant is fatal: callers should abort with the diagnostic rather
/// than attempt recovery. Solver-level failures (timeout/unknown) are
/// handled separately by `leakcheck_smt`/`leakcheck_driver`, which convert
/// them into a conservative `(insecure, [])` verdict instead of an error.
#[derive(Debug, Error)]
pub enum LeakCheckError {
    /// The netlist JSON did not match the expected Yosys-style shape.
    #[error("malformed netlist: {0}")]
    MalformedNetlist(String),
    /// A cell's `type` string did not map to a known gate kind.
    #[error("unknown cell kind {kind:?} for cell {cell:?}")]
    UnknownCellKind {
        /// The offending cell's name.
        cell: String,
        /// The unrecognized type token.
        kind: String,
    },
    /// A label string did not parse.
    #[error("malformed label: {0}")]
    MalformedLabel(String),
    /// A label-file line did not match `<signal>_<bit>: <kind>[ <group>]`.
    #[error("malformed label file line {line}: {text:?}")]
    MalformedLabelLine {
        /// 1-based line number.
        line: usize,
        /// The offending line text.
        text: String,
    },
    /// A `share` label line was missing its group identifier.
    #[error("share label on line {line} is missing a group identifier")]
    MissingShareGroup {
        /// 1-based line number.
        line: usize,
    },
    /// An I/O error occurred while reading a netlist or label file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The netlist JSON failed to deserialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
