//! SMT encoding of the gate-level leakage algebra and the two checkers built
//! on top of it.

pub mod encoding;
pub mod error;
pub mod independence;
mod model_dump;
pub mod probing;
pub mod verdict;

pub use encoding::Mode;
pub use error::{Result, SmtError};
pub use independence::{check as check_independence, IndependenceConfig, ProbeGroups};
pub use probing::{check as check_probing, ProbingConfig};
pub use verdict::Verdict;
