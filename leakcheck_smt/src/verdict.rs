//! The outcome shared by both checkers.

/// Result of a probing-security or independence query against a fixed
/// order `d`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// UNSAT: no probe set up to the configured order leaks a secret.
    Secure,
    /// SAT: the named cells are an example probe set that leaks a secret.
    /// Names are the normalized graph's cell names, not port-bit ids.
    Insecure(Vec<String>),
}

impl Verdict {
    /// True when no leak was found.
    #[must_use]
    pub const fn is_secure(&self) -> bool {
        matches!(self, Self::Secure)
    }
}
