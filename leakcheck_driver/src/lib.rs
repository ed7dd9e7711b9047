//! Orchestrates the checkers across the labelings a label file produces, and
//! hosts the CLI surface, mirroring the thin-`cli`-over-`driver` shape of
//! `svql_cli` over `svql_driver`/`svql_query`.

pub mod apply;
pub mod config;
pub mod error;
pub mod run;
pub mod synth;

pub use config::DriverConfig;
pub use error::{DriverError, Result};
pub use run::{run_independence, run_standard};
