//! Typed identifiers used throughout the leakage-verification pipeline.
//!
//! Using newtypes instead of raw `u32`/`usize` keeps cell indices, netlist
//! bit ids, and solver-variable indices from being accidentally interchanged
//! when threading them through the loader, normalizer, and checker.

use contracts::*;
use std::fmt;

/// Index of a node (cell) within a [`crate::graph::Graph`].
///
/// Stable for the lifetime of one graph (raw or simplified); indices are not
/// preserved across normalization, since normalization drops and renumbers
/// nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphNodeIdx {
    inner: u32,
}

impl GraphNodeIdx {
    /// Creates a new node index from a raw integer.
    #[ensures(ret.inner == id)]
    pub const fn new(id: u32) -> Self {
        Self { inner: id }
    }

    /// Returns the index as a `usize` for array access.
    #[ensures(ret == self.inner as usize)]
    pub const fn as_usize(self) -> usize {
        self.inner as usize
    }
}

impl fmt::Display for GraphNodeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.inner)
    }
}

impl From<usize> for GraphNodeIdx {
    #[inline]
    fn from(id: usize) -> Self {
        Self { inner: id as u32 }
    }
}

impl From<GraphNodeIdx> for usize {
    #[inline]
    fn from(id: GraphNodeIdx) -> Self {
        id.inner as Self
    }
}

/// A Yosys netlist bit id, as it appears in `"bits"` arrays of the JSON
/// document.
///
/// Bit ids are the wires of the raw netlist: the Loader resolves them to
/// [`GraphNodeIdx`] producer/consumer pairs while building the raw graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortBitId {
    inner: u32,
}

impl PortBitId {
    /// Creates a new bit id from a raw integer.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self { inner: id }
    }
}

impl fmt::Display for PortBitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<u32> for PortBitId {
    #[inline]
    fn from(id: u32) -> Self {
        Self { inner: id }
    }
}

impl From<PortBitId> for u32 {
    #[inline]
    fn from(id: PortBitId) -> Self {
        id.inner
    }
}
