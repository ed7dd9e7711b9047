//! Error type for the SMT encoding layer.

use thiserror::Error;

/// Failure communicating with, or declaring terms in, the underlying SMT
/// solver process. Distinct from a `Sat`/`Unsat`/`Unknown` verdict: those are
/// legitimate solver responses, this is the process misbehaving.
#[derive(Debug, Error)]
pub enum SmtError {
    /// The solver process could not be spawned, or a read/write to its
    /// stdin/stdout pipe failed.
    #[error("SMT solver error: {0}")]
    Solver(String),
}

impl SmtError {
    /// Wraps any error the `easy_smt` context surfaces (pipe I/O, a
    /// malformed response from the solver process) with its message.
    pub fn from_solver(err: impl std::fmt::Display) -> Self {
        Self::Solver(err.to_string())
    }
}

/// Convenience alias used throughout the encoding and checker modules.
pub type Result<T> = std::result::Result<T, SmtError>;
