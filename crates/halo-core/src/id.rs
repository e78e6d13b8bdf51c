//! Strongly-typed identifiers.

use std::fmt;

/// Monotonically increasing simulation cycle counter.
///
/// Every block starts at cycle 0 and advances by one in `COMPUTE`.
/// Ghost messages and reduction records are tagged with the cycle they
/// belong to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleId(pub u64);

impl CycleId {
    /// The following cycle.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CycleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
