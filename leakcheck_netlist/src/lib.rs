//! Loads Yosys-style netlist JSON into a raw circuit graph and reduces it to
//! the canonical vocabulary the checkers understand.

pub mod loader;
pub mod normalize;

pub use loader::load_netlist;
pub use normalize::normalize;
