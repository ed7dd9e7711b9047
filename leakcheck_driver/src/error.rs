//! Error type for the orchestration layer.

use thiserror::Error;

use leakcheck_common::LeakCheckError;
use leakcheck_smt::SmtError;

/// Failures that abort the whole run: malformed input, misuse, or I/O.
/// Solver failure is deliberately *not* a variant here — it is treated as
/// a conservative verdict (`Insecure`, logged), never a hard error, so
/// [`crate::run`] catches [`SmtError`] itself rather than letting it surface
/// through this type.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The netlist or label file was malformed, or a cell had an unknown
    /// kind: fatal.
    #[error(transparent)]
    Netlist(#[from] LeakCheckError),
    /// Reading a netlist or label file from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The `yosys` binary could not be located on `PATH`.
    #[error("yosys binary not found: {0}")]
    YosysNotFound(String),
    /// Bad CLI arguments: wrong file suffix, non-integer order, unknown mode:
    /// fatal at parse time.
    #[error("invalid usage: {0}")]
    Misuse(String),
    /// The worker thread pool could not be built.
    #[error("thread pool error: {0}")]
    Pool(String),
}

/// Convenience alias used throughout the driver and CLI.
pub type Result<T> = std::result::Result<T, DriverError>;
