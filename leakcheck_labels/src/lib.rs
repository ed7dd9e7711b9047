//! Parses label files and generates the symbolic labelings the checkers
//! verify: a single canonical labeling, or an optimized per-secret family.

pub mod generator;
pub mod parser;

pub use generator::{generate_optimized, generate_single, Labeling};
pub use parser::{parse_label_file, shares, LabelEntry, LabelKind};
