//! Numeric-domain contract
//!
//! The interval engine manipulates real values only through this trait.
//! The production implementation is an exact real-algebraic-number
//! manager owned by the enclosing solver; [`crate::rationals::RationalManager`]
//! is a rational model of the same contract, sufficient for tests and
//! for problem sets that never branch on irrational roots.

use std::cmp::Ordering;

/// Operations the engine consumes from the numeric domain.
///
/// Values of type [`Num`](NumManager::Num) are copied with `Clone` and
/// torn down by `Drop`; implementations backed by manually managed
/// storage should hand out handles whose `Clone`/`Drop` do the
/// bookkeeping.
pub trait NumManager {
    /// A real value in the manager's domain.
    type Num: Clone + Default;

    /// Three-way comparison of two values.
    fn compare(&self, a: &Self::Num, b: &Self::Num) -> Ordering;

    /// `a == b` in the reals.
    fn eq(&self, a: &Self::Num, b: &Self::Num) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// `a < b` in the reals.
    fn lt(&self, a: &Self::Num, b: &Self::Num) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Whether `x` is a rational number.
    fn is_rational(&self, x: &Self::Num) -> bool;

    /// The largest integer strictly below `x`.
    fn int_lt(&self, x: &Self::Num) -> Self::Num;

    /// The smallest integer strictly above `x`.
    fn int_gt(&self, x: &Self::Num) -> Self::Num;

    /// Some value strictly between `a` and `b`.
    ///
    /// Requires `a < b`.
    fn select(&self, a: &Self::Num, b: &Self::Num) -> Self::Num;

    /// The integer `i` as a domain value.
    fn from_int(&self, i: i64) -> Self::Num;

    /// The rational `num/den` as a domain value.
    ///
    /// Requires `den != 0`.
    fn from_ratio(&self, num: i64, den: u64) -> Self::Num;

    /// Parse a plain decimal string (`-12`, `3.25`, `0.000001`).
    ///
    /// Returns `None` when `s` is not a finite decimal numeral. Used by
    /// the sampling heuristics to re-enter the domain from `f64`
    /// arithmetic; the round-trip is deliberately lossy.
    fn from_decimal_str(&self, s: &str) -> Option<Self::Num>;

    /// Render `x` as a decimal numeral, truncated to the manager's
    /// display precision.
    fn to_decimal_string(&self, x: &Self::Num) -> String;
}
