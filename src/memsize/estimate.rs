use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
};

use serde::Serialize;

/// Result of a size estimation.
///
/// `Exact` totals are built only from kinds with a fully inspectable layout.
/// As soon as an opaque-kind estimate contributes, the total becomes
/// `Approximate` and stays so through any further addition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "bytes", rename_all = "lowercase")]
pub enum SizeEstimate {
    Exact(u64),
    Approximate(f64),
}

impl SizeEstimate {
    pub const ZERO: SizeEstimate = SizeEstimate::Exact(0);

    pub fn exact(bytes: u64) -> Self {
        SizeEstimate::Exact(bytes)
    }

    pub fn approximate(bytes: u64) -> Self {
        SizeEstimate::Approximate(bytes as f64)
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, SizeEstimate::Exact(_))
    }

    /// Same magnitude, flagged as approximate.
    pub fn into_approximate(self) -> Self {
        SizeEstimate::Approximate(self.as_f64())
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            SizeEstimate::Exact(bytes) => bytes as f64,
            SizeEstimate::Approximate(bytes) => bytes,
        }
    }

    /// Magnitude rounded to whole bytes.
    pub fn bytes(&self) -> u64 {
        match *self {
            SizeEstimate::Exact(bytes) => bytes,
            SizeEstimate::Approximate(bytes) => bytes.round() as u64,
        }
    }
}

impl Default for SizeEstimate {
    fn default() -> Self {
        SizeEstimate::ZERO
    }
}

impl Add for SizeEstimate {
    type Output = SizeEstimate;

    fn add(self, rhs: SizeEstimate) -> SizeEstimate {
        match (self, rhs) {
            (SizeEstimate::Exact(a), SizeEstimate::Exact(b)) => SizeEstimate::Exact(a + b),
            (a, b) => SizeEstimate::Approximate(a.as_f64() + b.as_f64()),
        }
    }
}

impl Add<u64> for SizeEstimate {
    type Output = SizeEstimate;

    fn add(self, rhs: u64) -> SizeEstimate {
        self + SizeEstimate::Exact(rhs)
    }
}

impl AddAssign for SizeEstimate {
    fn add_assign(&mut self, rhs: SizeEstimate) {
        *self = *self + rhs;
    }
}

impl Sum for SizeEstimate {
    fn sum<I: Iterator<Item = SizeEstimate>>(iter: I) -> Self {
        iter.fold(SizeEstimate::ZERO, Add::add)
    }
}

impl fmt::Display for SizeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeEstimate::Exact(bytes) => write!(f, "{}", bytes),
            SizeEstimate::Approximate(bytes) => write!(f, "{:.1}", bytes),
        }
    }
}
