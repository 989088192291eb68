//! Interval-set manager
//!
//! Owns the numeric domain, the node pool, and the scratch state shared
//! by the set operations. Sets are handed out as `Option<SetId>`; `None`
//! is the empty set and is accepted by every operation.

use std::cmp::Ordering;
use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use nra_core::{ClauseId, Literal, NumManager};

use crate::interval::{
    adjacent, check_interval_seq, compare_lower_lower, compare_upper_lower, compare_upper_upper,
    DisplayInterval, Interval,
};
use crate::store::{NodePool, SetId};

/// Manager for forbidden-region interval sets over one variable domain.
pub struct IntervalSetManager<M: NumManager> {
    pub(crate) am: M,
    pub(crate) pool: NodePool<M::Num>,
    pub(crate) already_visited: Vec<bool>,
    pub(crate) rng: ChaCha8Rng,
}

impl<M: NumManager> IntervalSetManager<M> {
    /// Create a manager owning the numeric domain `am`.
    pub fn new(am: M) -> Self {
        IntervalSetManager {
            am,
            pool: NodePool::new(),
            already_visited: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    /// Reseed the PRNG used by randomized witness selection.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// The numeric domain.
    pub fn num_manager(&self) -> &M {
        &self.am
    }

    /// Return the empty set.
    pub fn mk_empty(&self) -> Option<SetId> {
        None
    }

    /// Return a set composed of a single interval.
    ///
    /// The node starts at ref-count 0; the caller must `inc_ref` it to
    /// keep it alive past the next release.
    #[allow(clippy::too_many_arguments)]
    pub fn mk(
        &mut self,
        lower_open: bool,
        lower_inf: bool,
        lower: &M::Num,
        upper_open: bool,
        upper_inf: bool,
        upper: &M::Num,
        justification: Literal,
        clause: Option<ClauseId>,
    ) -> SetId {
        let full = lower_inf && upper_inf;
        let interval = Interval {
            lower_open,
            upper_open,
            lower_inf,
            upper_inf,
            justification,
            clause,
            lower: if lower_inf {
                M::Num::default()
            } else {
                lower.clone()
            },
            upper: if upper_inf {
                M::Num::default()
            } else {
                upper.clone()
            },
        };
        self.alloc(vec![interval], full)
    }

    pub(crate) fn alloc(&mut self, intervals: Vec<Interval<M::Num>>, full: bool) -> SetId {
        debug_assert!(check_interval_seq(&self.am, &intervals));
        self.pool.alloc(intervals.into_boxed_slice(), full)
    }

    /// Increment the reference count. No-op on the empty set.
    pub fn inc_ref(&mut self, s: Option<SetId>) {
        if let Some(id) = s {
            self.pool.inc_ref(id);
        }
    }

    /// Decrement the reference count, freeing the node at zero. No-op on
    /// the empty set.
    pub fn dec_ref(&mut self, s: Option<SetId>) {
        if let Some(id) = s {
            self.pool.dec_ref(id);
        }
    }

    /// Return true if `s` is the empty set.
    pub fn is_empty(&self, s: Option<SetId>) -> bool {
        s.is_none()
    }

    /// Return true if the set contains all real numbers.
    pub fn is_full(&self, s: Option<SetId>) -> bool {
        match s {
            None => false,
            Some(id) => self.pool.get(id).full,
        }
    }

    /// Number of intervals in the set.
    pub fn num_intervals(&self, s: Option<SetId>) -> usize {
        match s {
            None => 0,
            Some(id) => self.pool.get(id).intervals.len(),
        }
    }

    /// The intervals of a non-empty set, in order.
    pub fn intervals(&self, s: SetId) -> &[Interval<M::Num>] {
        &self.pool.get(s).intervals
    }

    /// Return true if `s1` is a subset of `s2`.
    ///
    /// Each `s1` interval must be covered by a run of `s2` intervals
    /// chained through adjacency; any uncovered prefix, suffix, or gap
    /// refutes containment.
    pub fn subset(&self, s1: Option<SetId>, s2: Option<SetId>) -> bool {
        if s1 == s2 {
            return true;
        }
        let Some(id1) = s1 else { return true };
        let Some(id2) = s2 else { return false };
        let n1 = self.pool.get(id1);
        let n2 = self.pool.get(id2);
        if n2.full {
            return true;
        }
        if n1.full {
            return false;
        }
        let v1 = &n1.intervals;
        let v2 = &n2.intervals;
        let (sz1, sz2) = (v1.len(), v2.len());
        let mut i1 = 0;
        let mut i2 = 0;
        while i1 < sz1 && i2 < sz2 {
            let int1 = &v1[i1];
            if compare_lower_lower(&self.am, int1, &v2[i2]) == Ordering::Less {
                // s1: [ ...
                // s2:    [ ...
                return false;
            }
            while i2 < sz2 {
                let int2 = &v2[i2];
                match compare_upper_upper(&self.am, int1, int2) {
                    Ordering::Equal => {
                        // s1: ... ]
                        // s2: ... ]
                        i1 += 1;
                        i2 += 1;
                        break;
                    }
                    Ordering::Less => {
                        // int2 may cover further intervals of s1
                        // s1:  ... ]
                        // s2:    ... ]
                        i1 += 1;
                        break;
                    }
                    Ordering::Greater => {
                        if compare_upper_lower(&self.am, int2, int1) == Ordering::Less {
                            // s1:           [ ...
                            // s2: [ ... ]  ...
                            i2 += 1;
                            break;
                        }
                        // s1:      [ ...  ]
                        // s2: [ ...    ]
                        if i2 == sz2 - 1 {
                            // the tail [int2.upper, int1.upper] is not in s2
                            return false;
                        }
                        if !adjacent(&self.am, int2, &v2[i2 + 1]) {
                            // s1:   ... ]
                            // s2: ... ]   [
                            return false;
                        }
                        // continue with the adjacent interval of s2
                        // s1:    ...  ]
                        // s2:  ..][ ...
                        i2 += 1;
                    }
                }
            }
        }
        i1 == sz1
    }

    /// Return true if `s1` and `s2` cover the same subset of the reals.
    /// Justifications are ignored.
    pub fn set_eq(&self, s1: Option<SetId>, s2: Option<SetId>) -> bool {
        if s1.is_none() || s2.is_none() {
            return s1 == s2;
        }
        if self.is_full(s1) || self.is_full(s2) {
            return self.is_full(s1) == self.is_full(s2);
        }
        self.subset(s1, s2) && self.subset(s2, s1)
    }

    /// Full structural equality: flags, endpoint values, and
    /// justification literals (sign included).
    pub fn eq(&self, s1: Option<SetId>, s2: Option<SetId>) -> bool {
        let (Some(id1), Some(id2)) = (s1, s2) else {
            return s1 == s2;
        };
        let v1 = &self.pool.get(id1).intervals;
        let v2 = &self.pool.get(id2).intervals;
        if v1.len() != v2.len() {
            return false;
        }
        v1.iter().zip(v2.iter()).all(|(int1, int2)| {
            int1.lower_inf == int2.lower_inf
                && int1.lower_open == int2.lower_open
                && int1.upper_inf == int2.upper_inf
                && int1.upper_open == int2.upper_open
                && int1.justification == int2.justification
                && (int1.lower_inf || self.am.eq(&int1.lower, &int2.lower))
                && (int1.upper_inf || self.am.eq(&int1.upper, &int2.upper))
        })
    }

    /// Collect the distinct literals justifying `s`, and their attached
    /// clauses, in first-seen order.
    pub fn get_justifications(
        &mut self,
        s: Option<SetId>,
        js: &mut Vec<Literal>,
        clauses: &mut Vec<ClauseId>,
    ) {
        js.clear();
        clauses.clear();
        let Some(id) = s else { return };
        let Self {
            pool,
            already_visited,
            ..
        } = self;
        let intervals = &pool.get(id).intervals;
        for interval in intervals.iter() {
            let lidx = interval.justification.index();
            if already_visited.len() <= lidx {
                already_visited.resize(lidx + 1, false);
            }
            if already_visited[lidx] {
                continue;
            }
            already_visited[lidx] = true;
            js.push(interval.justification);
            if let Some(cls) = interval.clause {
                clauses.push(cls);
            }
        }
        // Scratch bitmap is cleared for the next call.
        for interval in intervals.iter() {
            already_visited[interval.justification.index()] = false;
        }
    }

    /// Return a fresh single-interval set holding interval `idx` of `s`.
    ///
    /// Debugging helper; requires `idx < num_intervals(s)`.
    pub fn get_interval(&mut self, s: SetId, idx: usize) -> SetId {
        let interval = self.pool.get(s).intervals[idx].clone();
        let full = interval.lower_inf && interval.upper_inf;
        self.alloc(vec![interval], full)
    }

    /// Render `s` for diagnostics: `{i1, i2, ...}`, trailing `*` when
    /// full, `{}` for the empty set.
    pub fn display(&self, s: Option<SetId>) -> DisplaySet<'_, M> {
        DisplaySet { mgr: self, s }
    }
}

/// Adapter rendering a whole set in decimal notation.
pub struct DisplaySet<'a, M: NumManager> {
    mgr: &'a IntervalSetManager<M>,
    s: Option<SetId>,
}

impl<M: NumManager> fmt::Display for DisplaySet<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(id) = self.s else {
            return write!(f, "{{}}");
        };
        let node = self.mgr.pool.get(id);
        write!(f, "{{")?;
        for (i, interval) in node.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", DisplayInterval::new(&self.mgr.am, interval))?;
        }
        write!(f, "}}")?;
        if node.full {
            write!(f, "*")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nra_core::{RationalManager, Var};
    use num_rational::BigRational;

    fn mgr() -> IntervalSetManager<RationalManager> {
        IntervalSetManager::new(RationalManager::new())
    }

    fn q(n: i64) -> BigRational {
        RationalManager.from_int(n)
    }

    fn mk_closed(
        m: &mut IntervalSetManager<RationalManager>,
        lo: i64,
        hi: i64,
        lit: Literal,
    ) -> SetId {
        m.mk(false, false, &q(lo), false, false, &q(hi), lit, None)
    }

    #[test]
    fn test_mk_and_predicates() {
        let mut m = mgr();
        let l1 = Literal::positive(Var(1));
        let s = Some(mk_closed(&mut m, 1, 2, l1));
        assert!(!m.is_full(s));
        assert!(!m.is_empty(s));
        assert_eq!(m.num_intervals(s), 1);
        assert_eq!(m.num_intervals(None), 0);
        assert!(m.is_empty(None));
        assert!(!m.is_full(None));
    }

    #[test]
    fn test_mk_full_line() {
        let mut m = mgr();
        let zero = q(0);
        let s = m.mk(
            true,
            true,
            &zero,
            true,
            true,
            &zero,
            Literal::positive(Var(0)),
            None,
        );
        assert!(m.is_full(Some(s)));
    }

    #[test]
    fn test_subset_basic() {
        let mut m = mgr();
        let a = Some(mk_closed(&mut m, 1, 2, Literal::positive(Var(1))));
        let b = Some(mk_closed(&mut m, 0, 3, Literal::positive(Var(2))));
        assert!(m.subset(a, b));
        assert!(!m.subset(b, a));
        assert!(m.subset(None, a));
        assert!(!m.subset(a, None));
        assert!(m.subset(a, a));
    }

    #[test]
    fn test_subset_through_adjacency() {
        let mut m = mgr();
        let l1 = Literal::positive(Var(1));
        let l2 = Literal::positive(Var(2));
        // [0, 2) and [2, 5] differ in justification, so they stay two
        // intervals and subset must chain through their adjacency.
        let left = Some(m.mk(false, false, &q(0), true, false, &q(2), l1, None));
        let right = Some(mk_closed(&mut m, 2, 5, l2));
        let cover = m.mk_union(left, right);
        assert_eq!(m.num_intervals(cover), 2);
        let probe = Some(mk_closed(&mut m, 1, 4, l1));
        assert!(m.subset(probe, cover));
        // A one-point hole at 2 breaks the chain.
        let left_open = Some(m.mk(false, false, &q(0), true, false, &q(2), l1, None));
        let right_open = Some(m.mk(true, false, &q(2), false, false, &q(5), l2, None));
        let holed = m.mk_union(left_open, right_open);
        assert!(!m.subset(probe, holed));
    }

    #[test]
    fn test_eq_includes_sign() {
        let mut m = mgr();
        let pos = Some(mk_closed(&mut m, 1, 2, Literal::positive(Var(1))));
        let neg = Some(mk_closed(&mut m, 1, 2, Literal::negative(Var(1))));
        assert!(m.set_eq(pos, neg));
        assert!(!m.eq(pos, neg));
        assert!(m.eq(pos, pos));
        assert!(m.eq(None, None));
        assert!(!m.eq(pos, None));
    }

    #[test]
    fn test_get_justifications_dedup() {
        let mut m = mgr();
        let l1 = Literal::positive(Var(1));
        let l2 = Literal::positive(Var(2));
        let a = Some(m.mk(false, false, &q(1), false, false, &q(2), l1, Some(ClauseId(7))));
        let b = Some(mk_closed(&mut m, 3, 4, l1));
        let c = Some(mk_closed(&mut m, 5, 6, l2));
        let ab = m.mk_union(a, b);
        let abc = m.mk_union(ab, c);
        let mut js = Vec::new();
        let mut clauses = Vec::new();
        m.get_justifications(abc, &mut js, &mut clauses);
        assert_eq!(js, vec![l1, l2]);
        assert_eq!(clauses, vec![ClauseId(7)]);
        // Scratch state is cleared; a second call sees the same result.
        m.get_justifications(abc, &mut js, &mut clauses);
        assert_eq!(js, vec![l1, l2]);
    }

    #[test]
    fn test_display_forms() {
        let mut m = mgr();
        assert_eq!(m.display(None).to_string(), "{}");
        let s = Some(mk_closed(&mut m, 1, 2, Literal::positive(Var(3))));
        assert_eq!(m.display(s).to_string(), "{[1, p3, 2]}");
        let zero = q(0);
        let ray_lo = Some(m.mk(
            true,
            true,
            &zero,
            true,
            false,
            &zero,
            Literal::positive(Var(1)),
            None,
        ));
        let ray_hi = Some(m.mk(
            false,
            false,
            &zero,
            true,
            true,
            &zero,
            Literal::negative(Var(2)),
            None,
        ));
        let full = m.mk_union(ray_lo, ray_hi);
        assert_eq!(
            m.display(full).to_string(),
            "{(-oo, p1, 0), [0, ~p2, oo)}*"
        );
    }

    #[test]
    fn test_get_interval() {
        let mut m = mgr();
        let l1 = Literal::positive(Var(1));
        let l2 = Literal::positive(Var(2));
        let a = Some(mk_closed(&mut m, 1, 2, l1));
        let b = Some(mk_closed(&mut m, 4, 5, l2));
        let u = m.mk_union(a, b).unwrap();
        let second = m.get_interval(u, 1);
        assert_eq!(m.num_intervals(Some(second)), 1);
        assert_eq!(m.intervals(second)[0].justification, l2);
    }
}
