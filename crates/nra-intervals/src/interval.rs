//! Forbidden intervals and endpoint comparators
//!
//! Endpoint order is total once openness and infinities are taken into
//! account; the three comparators below encode every topology edge case
//! and are shared verbatim by union, subset, and adjacency tests.

use std::cmp::Ordering;
use std::fmt;

use nra_core::{ClauseId, Literal, NumManager};

/// One forbidden interval together with its justification.
///
/// When `lower_inf` (resp. `upper_inf`) is set, the corresponding value
/// field is unused and the side is necessarily open.
#[derive(Debug, Clone)]
pub struct Interval<N> {
    /// Lower endpoint excluded from the interval
    pub lower_open: bool,
    /// Upper endpoint excluded from the interval
    pub upper_open: bool,
    /// Lower endpoint is -oo
    pub lower_inf: bool,
    /// Upper endpoint is +oo
    pub upper_inf: bool,
    /// Literal whose truth forbids this interval
    pub justification: Literal,
    /// Clause that produced the justification, if any
    pub clause: Option<ClauseId>,
    /// Lower endpoint value (meaningful iff `!lower_inf`)
    pub lower: N,
    /// Upper endpoint value (meaningful iff `!upper_inf`)
    pub upper: N,
}

/// Compare the lower endpoints of `i1` and `i2`.
///
/// On equal values a closed lower is smaller than an open one: the
/// closed endpoint includes a value the open one excludes.
pub fn compare_lower_lower<M: NumManager>(
    m: &M,
    i1: &Interval<M::Num>,
    i2: &Interval<M::Num>,
) -> Ordering {
    if i1.lower_inf && i2.lower_inf {
        return Ordering::Equal;
    }
    if i1.lower_inf {
        return Ordering::Less;
    }
    if i2.lower_inf {
        return Ordering::Greater;
    }
    let s = m.compare(&i1.lower, &i2.lower);
    if s != Ordering::Equal {
        return s;
    }
    if i1.lower_open == i2.lower_open {
        Ordering::Equal
    } else if i1.lower_open {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

/// Compare the upper endpoints of `i1` and `i2`.
///
/// On equal values an open upper is smaller than a closed one.
pub fn compare_upper_upper<M: NumManager>(
    m: &M,
    i1: &Interval<M::Num>,
    i2: &Interval<M::Num>,
) -> Ordering {
    if i1.upper_inf && i2.upper_inf {
        return Ordering::Equal;
    }
    if i1.upper_inf {
        return Ordering::Greater;
    }
    if i2.upper_inf {
        return Ordering::Less;
    }
    let s = m.compare(&i1.upper, &i2.upper);
    if s != Ordering::Equal {
        return s;
    }
    if i1.upper_open == i2.upper_open {
        Ordering::Equal
    } else if i1.upper_open {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Compare `i1`'s upper endpoint against `i2`'s lower endpoint.
///
/// `Equal` means the endpoints actually meet (both closed); equal values
/// with an open side do not meet and compare `Less`.
pub fn compare_upper_lower<M: NumManager>(
    m: &M,
    i1: &Interval<M::Num>,
    i2: &Interval<M::Num>,
) -> Ordering {
    if i1.upper_inf || i2.lower_inf {
        return Ordering::Greater;
    }
    let s = m.compare(&i1.upper, &i2.lower);
    if s != Ordering::Equal {
        return s;
    }
    if !i1.upper_open && !i2.lower_open {
        Ordering::Equal
    } else {
        Ordering::Less
    }
}

/// Whether `curr` and `next` touch with no space between them.
///
/// `curr` must precede `next` in a well-formed set, so `curr.upper` is
/// finite and at most `next.lower`. Touching endpoints with both sides
/// open leave a one-point hole and are not adjacent.
pub fn adjacent<M: NumManager>(m: &M, curr: &Interval<M::Num>, next: &Interval<M::Num>) -> bool {
    debug_assert!(!curr.upper_inf);
    debug_assert!(!next.lower_inf);
    let sign = m.compare(&curr.upper, &next.lower);
    debug_assert!(sign != Ordering::Greater);
    if sign == Ordering::Equal {
        debug_assert!(curr.upper_open || next.lower_open);
        return !curr.upper_open || !next.lower_open;
    }
    false
}

/// Check the per-interval invariant: infinite sides are open, and finite
/// bounds satisfy `lower <= upper` with a point interval closed on both
/// sides.
pub fn check_interval<M: NumManager>(m: &M, i: &Interval<M::Num>) -> bool {
    if i.lower_inf && !i.lower_open {
        return false;
    }
    if i.upper_inf && !i.upper_open {
        return false;
    }
    if !i.lower_inf && !i.upper_inf {
        match m.compare(&i.lower, &i.upper) {
            Ordering::Greater => return false,
            Ordering::Equal => return !i.lower_open && !i.upper_open,
            Ordering::Less => {}
        }
    }
    true
}

/// Check that `curr` ends before `next` begins (equal endpoint values
/// need at least one open side).
pub fn check_no_overlap<M: NumManager>(
    m: &M,
    curr: &Interval<M::Num>,
    next: &Interval<M::Num>,
) -> bool {
    if curr.upper_inf || next.lower_inf {
        return false;
    }
    match m.compare(&curr.upper, &next.lower) {
        Ordering::Less => true,
        Ordering::Equal => curr.upper_open || next.lower_open,
        Ordering::Greater => false,
    }
}

/// Check that all intervals are valid, ordered, and disjoint.
pub fn check_interval_seq<M: NumManager>(m: &M, ints: &[Interval<M::Num>]) -> bool {
    ints.iter().all(|i| check_interval(m, i))
        && ints
            .windows(2)
            .all(|w| check_no_overlap(m, &w[0], &w[1]))
}

/// Adapter rendering one interval in decimal notation.
pub struct DisplayInterval<'a, M: NumManager> {
    m: &'a M,
    i: &'a Interval<M::Num>,
}

impl<'a, M: NumManager> DisplayInterval<'a, M> {
    /// Wrap `i` for display through `m`.
    pub fn new(m: &'a M, i: &'a Interval<M::Num>) -> Self {
        DisplayInterval { m, i }
    }
}

impl<M: NumManager> fmt::Display for DisplayInterval<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let i = self.i;
        if i.lower_inf {
            write!(f, "(-oo, ")?;
        } else {
            write!(
                f,
                "{}{}, ",
                if i.lower_open { "(" } else { "[" },
                self.m.to_decimal_string(&i.lower)
            )?;
        }
        if i.justification.sign() {
            write!(f, "~")?;
        }
        write!(f, "p{}, ", i.justification.var().0)?;
        if i.upper_inf {
            write!(f, "oo)")
        } else {
            write!(
                f,
                "{}{}",
                self.m.to_decimal_string(&i.upper),
                if i.upper_open { ")" } else { "]" }
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nra_core::{RationalManager, Var};
    use num_rational::BigRational;

    fn q(n: i64) -> BigRational {
        use nra_core::NumManager;
        RationalManager.from_int(n)
    }

    fn ival(
        lower_open: bool,
        lower_inf: bool,
        lower: i64,
        upper_open: bool,
        upper_inf: bool,
        upper: i64,
    ) -> Interval<BigRational> {
        Interval {
            lower_open,
            upper_open,
            lower_inf,
            upper_inf,
            justification: Literal::positive(Var(0)),
            clause: None,
            lower: q(lower),
            upper: q(upper),
        }
    }

    #[test]
    fn test_compare_lower_lower() {
        let m = RationalManager::new();
        let neg_ray = ival(true, true, 0, false, false, 1);
        let closed = ival(false, false, 1, false, false, 2);
        let open = ival(true, false, 1, true, false, 2);

        assert_eq!(compare_lower_lower(&m, &neg_ray, &neg_ray), Ordering::Equal);
        assert_eq!(compare_lower_lower(&m, &neg_ray, &closed), Ordering::Less);
        assert_eq!(compare_lower_lower(&m, &closed, &neg_ray), Ordering::Greater);
        // Equal values: closed lower is smaller than open lower.
        assert_eq!(compare_lower_lower(&m, &closed, &open), Ordering::Less);
        assert_eq!(compare_lower_lower(&m, &open, &closed), Ordering::Greater);
        assert_eq!(compare_lower_lower(&m, &open, &open), Ordering::Equal);
    }

    #[test]
    fn test_compare_upper_upper() {
        let m = RationalManager::new();
        let pos_ray = ival(false, false, 1, true, true, 0);
        let closed = ival(false, false, 1, false, false, 2);
        let open = ival(false, false, 1, true, false, 2);

        assert_eq!(compare_upper_upper(&m, &pos_ray, &pos_ray), Ordering::Equal);
        assert_eq!(compare_upper_upper(&m, &pos_ray, &closed), Ordering::Greater);
        assert_eq!(compare_upper_upper(&m, &closed, &pos_ray), Ordering::Less);
        // Equal values: open upper is smaller than closed upper.
        assert_eq!(compare_upper_upper(&m, &open, &closed), Ordering::Less);
        assert_eq!(compare_upper_upper(&m, &closed, &open), Ordering::Greater);
    }

    #[test]
    fn test_compare_upper_lower() {
        let m = RationalManager::new();
        let first = ival(false, false, 0, false, false, 2);
        let touching_closed = ival(false, false, 2, false, false, 3);
        let touching_open = ival(true, false, 2, false, false, 3);
        let apart = ival(false, false, 5, false, false, 6);

        // Closed-closed at the same value: the endpoints meet.
        assert_eq!(
            compare_upper_lower(&m, &first, &touching_closed),
            Ordering::Equal
        );
        // One open side: same value but no common point.
        assert_eq!(
            compare_upper_lower(&m, &first, &touching_open),
            Ordering::Less
        );
        assert_eq!(compare_upper_lower(&m, &first, &apart), Ordering::Less);
        assert_eq!(compare_upper_lower(&m, &apart, &first), Ordering::Greater);
        // Infinite sides always report overlap.
        let ray = ival(false, false, 0, true, true, 0);
        assert_eq!(compare_upper_lower(&m, &ray, &apart), Ordering::Greater);
    }

    #[test]
    fn test_adjacent() {
        let m = RationalManager::new();
        let a = ival(false, false, 0, false, false, 2);
        let b_open = ival(true, false, 2, false, false, 3);
        let b_gap = ival(false, false, 4, false, false, 5);
        assert!(adjacent(&m, &a, &b_open));
        assert!(!adjacent(&m, &a, &b_gap));
        // Both sides open at the same value: a one-point hole remains.
        let a_open = ival(false, false, 0, true, false, 2);
        assert!(!adjacent(&m, &a_open, &b_open));
    }

    #[test]
    fn test_check_interval() {
        let m = RationalManager::new();
        assert!(check_interval(&m, &ival(false, false, 1, false, false, 2)));
        // Point intervals must be closed on both sides.
        assert!(check_interval(&m, &ival(false, false, 1, false, false, 1)));
        assert!(!check_interval(&m, &ival(true, false, 1, false, false, 1)));
        // lower > upper is malformed.
        assert!(!check_interval(&m, &ival(false, false, 2, false, false, 1)));
        // Infinite sides must be open.
        assert!(!check_interval(&m, &ival(false, true, 0, false, false, 1)));
    }

    #[test]
    fn test_display() {
        let m = RationalManager::new();
        let mut i = ival(true, true, 0, false, false, 2);
        i.justification = Literal::negative(Var(3));
        assert_eq!(DisplayInterval::new(&m, &i).to_string(), "(-oo, ~p3, 2]");
        let j = ival(false, false, 1, true, true, 0);
        assert_eq!(DisplayInterval::new(&m, &j).to_string(), "[1, p0, oo)");
    }
}
