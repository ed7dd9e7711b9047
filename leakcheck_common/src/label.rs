//! Symbolic labels attached to input port bits.

use std::fmt;
use std::str::FromStr;

use crate::error::LeakCheckError;

/// A symbolic identifier attached to a port bit: a secret share (`s_k`), a
/// mask (`m_k`), or a don't-care bit (`y_k`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    /// A secret-share variable, written `s_<k>`.
    Secret(u32),
    /// A mask variable, written `m_<k>`.
    Mask(u32),
    /// A don't-care variable, written `y_<k>`. Never a member of `V`.
    DontCare(u32),
}

impl Label {
    /// Converts this label into a member of the variable universe `V`,
    /// returning `None` for don't-care labels.
    #[must_use]
    pub const fn as_var(self) -> Option<Var> {
        match self {
            Self::Secret(k) => Some(Var::Secret(k)),
            Self::Mask(k) => Some(Var::Mask(k)),
            Self::DontCare(_) => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secret(k) => write!(f, "s_{k}"),
            Self::Mask(k) => write!(f, "m_{k}"),
            Self::DontCare(k) => write!(f, "y_{k}"),
        }
    }
}

impl FromStr for Label {
    type Err = LeakCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, rest) = s.split_once('_').ok_or_else(|| {
            LeakCheckError::MalformedLabel(format!("label {s:?} is missing a '_' separator"))
        })?;
        let k: u32 = rest
            .parse()
            .map_err(|_| LeakCheckError::MalformedLabel(format!("label {s:?} has a non-integer index")))?;
        match prefix {
            "s" => Ok(Self::Secret(k)),
            "m" => Ok(Self::Mask(k)),
            "y" => Ok(Self::DontCare(k)),
            other => Err(LeakCheckError::MalformedLabel(format!(
                "unknown label prefix {other:?} in {s:?}"
            ))),
        }
    }
}

/// A member of the variable universe `V`: a secret or a mask, never a
/// don't-care label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Var {
    /// A secret-share variable.
    Secret(u32),
    /// A mask variable.
    Mask(u32),
}

impl Var {
    /// Returns true if this variable is a secret.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::Secret(_))
    }

    /// Returns true if this variable is a mask.
    #[must_use]
    pub const fn is_mask(self) -> bool {
        matches!(self, Self::Mask(_))
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secret(k) => write!(f, "s_{k}"),
            Self::Mask(k) => write!(f, "m_{k}"),
        }
    }
}

impl From<Var> for Label {
    fn from(v: Var) -> Self {
        match v {
            Var::Secret(k) => Self::Secret(k),
            Var::Mask(k) => Self::Mask(k),
        }
    }
}

/// Builds the sorted variable universe `V` from a set of port labels.
///
/// `original_source/Z3Checker.py::__checker_init` sorts the Python string
/// form of each label (`sorted(set(variables) - set(unimportant_list))`),
/// which is a **lexicographic**, not numeric, sort: `m_10` precedes `m_2`.
/// This reproduces that exact ordering so that the fixed per-variable index
/// used across a whole query matches what the
/// original tool would compute, rather than picking a more "natural" numeric
/// order that happens to coincide with it only for single-digit indices.
#[must_use]
pub fn variable_universe(labels: impl IntoIterator<Item = Label>) -> Vec<Var> {
    let mut vars: Vec<Var> = labels.into_iter().filter_map(Label::as_var).collect();
    vars.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    vars.dedup();
    vars
}
