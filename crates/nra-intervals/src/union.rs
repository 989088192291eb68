//! Ordered union of interval sets
//!
//! A single linear pass over both operands emits a sorted, disjoint run
//! of intervals; overlapping regions are clipped so that each emitted
//! piece keeps the justification of the operand that contributed it. A
//! final sweep fuses adjacent pieces that share a justification and
//! decides whether the result covers the whole line.

use std::cmp::Ordering;

use smallvec::SmallVec;
use tracing::{debug, trace};

use nra_core::{ClauseId, Literal, NumManager};

use crate::interval::{
    adjacent, check_interval, check_interval_seq, check_no_overlap, compare_lower_lower,
    compare_upper_lower, compare_upper_upper, Interval,
};
use crate::manager::IntervalSetManager;
use crate::store::SetId;

type IntervalBuffer<N> = SmallVec<[Interval<N>; 16]>;

#[allow(clippy::too_many_arguments)]
fn push_clipped<M: NumManager>(
    am: &M,
    buf: &mut IntervalBuffer<M::Num>,
    lower_open: bool,
    lower_inf: bool,
    lower: &M::Num,
    upper_open: bool,
    upper_inf: bool,
    upper: &M::Num,
    justification: Literal,
    clause: Option<ClauseId>,
) {
    let interval = Interval {
        lower_open,
        upper_open,
        lower_inf,
        upper_inf,
        justification,
        clause,
        lower: lower.clone(),
        upper: upper.clone(),
    };
    debug_assert!(check_interval(am, &interval));
    buf.push(interval);
}

fn push_copy<M: NumManager>(
    am: &M,
    buf: &mut IntervalBuffer<M::Num>,
    interval: &Interval<M::Num>,
) {
    debug_assert!(check_interval(am, interval));
    buf.push(interval.clone());
}

impl<M: NumManager> IntervalSetManager<M> {
    /// Return the union of two sets, freshly allocated at ref-count 0.
    ///
    /// Runs in one pass over both operands. When either operand already
    /// answers the question (empty, identical, or full), that operand is
    /// returned as-is with its reference count untouched.
    pub fn mk_union(&mut self, s1: Option<SetId>, s2: Option<SetId>) -> Option<SetId> {
        if s1.is_none() || s1 == s2 {
            return s2;
        }
        let Some(id1) = s1 else { return s2 };
        let Some(id2) = s2 else { return s1 };
        if self.pool.get(id1).full {
            return s1;
        }
        if self.pool.get(id2).full {
            return s2;
        }

        let mut result: IntervalBuffer<M::Num> = SmallVec::new();
        let full;
        {
            let am = &self.am;
            let v1 = &self.pool.get(id1).intervals;
            let v2 = &self.pool.get(id2).intervals;
            let (sz1, sz2) = (v1.len(), v2.len());
            let mut i1 = 0;
            let mut i2 = 0;
            loop {
                if i1 >= sz1 {
                    for interval in &v2[i2..] {
                        push_copy(am, &mut result, interval);
                    }
                    break;
                }
                if i2 >= sz2 {
                    for interval in &v1[i1..] {
                        push_copy(am, &mut result, interval);
                    }
                    break;
                }
                let int1 = &v1[i1];
                let int2 = &v2[i2];
                let l1_l2 = compare_lower_lower(am, int1, int2);
                let u1_u2 = compare_upper_upper(am, int1, int2);
                trace!(i1, i2, ?l1_l2, ?u1_u2, "merge step");
                if l1_l2 != Ordering::Greater {
                    match u1_u2 {
                        Ordering::Equal => {
                            // [   ]      [   ]
                            // [   ]  or    [ ]
                            push_copy(am, &mut result, int1);
                            i1 += 1;
                            i2 += 1;
                        }
                        Ordering::Greater => {
                            // [       ]
                            //   [   ]
                            // int1 may absorb further intervals of s2
                            i2 += 1;
                        }
                        Ordering::Less => {
                            match compare_upper_lower(am, int1, int2) {
                                Ordering::Less => {
                                    // [   ]
                                    //        [   ]
                                    push_copy(am, &mut result, int1);
                                    i1 += 1;
                                }
                                Ordering::Equal => {
                                    debug_assert!(!int1.upper_open && !int2.lower_open);
                                    if l1_l2 == Ordering::Less {
                                        // [   ]
                                        //     [   ]
                                        // closed endpoints touch; the seam
                                        // belongs to int2, clip int1 open
                                        push_clipped(
                                            am,
                                            &mut result,
                                            int1.lower_open,
                                            int1.lower_inf,
                                            &int1.lower,
                                            true,
                                            false,
                                            &int1.upper,
                                            int1.justification,
                                            int1.clause,
                                        );
                                        i1 += 1;
                                    } else {
                                        // int1 is a point at int2's closed
                                        // left edge; drop it
                                        i1 += 1;
                                    }
                                }
                                Ordering::Greater => {
                                    if l1_l2 == Ordering::Equal {
                                        // [   ]
                                        // [       ]
                                        i1 += 1;
                                    } else {
                                        // [     ]
                                        //    [     ]
                                        // keep int1's prefix up to int2's lower
                                        push_clipped(
                                            am,
                                            &mut result,
                                            int1.lower_open,
                                            int1.lower_inf,
                                            &int1.lower,
                                            !int2.lower_open,
                                            false,
                                            &int2.lower,
                                            int1.justification,
                                            int1.clause,
                                        );
                                        i1 += 1;
                                    }
                                }
                            }
                        }
                    }
                } else {
                    match u1_u2 {
                        Ordering::Equal => {
                            //   [ ]
                            // [   ]
                            push_copy(am, &mut result, int2);
                            i1 += 1;
                            i2 += 1;
                        }
                        Ordering::Less => {
                            //   [ ]
                            // [     ]
                            // int2 may absorb further intervals of s1
                            i1 += 1;
                        }
                        Ordering::Greater => {
                            match compare_upper_lower(am, int2, int1) {
                                Ordering::Less => {
                                    //        [   ]
                                    // [   ]
                                    push_copy(am, &mut result, int2);
                                    i2 += 1;
                                }
                                Ordering::Equal => {
                                    debug_assert!(!int1.lower_open && !int2.upper_open);
                                    //     [   ]
                                    // [   ]
                                    push_clipped(
                                        am,
                                        &mut result,
                                        int2.lower_open,
                                        int2.lower_inf,
                                        &int2.lower,
                                        true,
                                        false,
                                        &int2.upper,
                                        int2.justification,
                                        int2.clause,
                                    );
                                    i2 += 1;
                                }
                                Ordering::Greater => {
                                    //    [     ]
                                    // [     ]
                                    push_clipped(
                                        am,
                                        &mut result,
                                        int2.lower_open,
                                        int2.lower_inf,
                                        &int2.lower,
                                        !int1.lower_open,
                                        false,
                                        &int1.lower,
                                        int2.justification,
                                        int2.clause,
                                    );
                                    i2 += 1;
                                }
                            }
                        }
                    }
                }
                debug_assert!(
                    result.len() <= 1
                        || check_no_overlap(
                            am,
                            &result[result.len() - 2],
                            &result[result.len() - 1]
                        )
                );
            }

            debug_assert!(!result.is_empty());
            debug_assert!(check_interval_seq(am, &result));

            // Fuse adjacent intervals sharing a justification. Equality
            // covers the sign bit; adjacent regions forbidden by L and
            // !L stay separate.
            let merged = std::mem::take(&mut result);
            for next in merged {
                if let Some(curr) = result.last_mut() {
                    if curr.justification == next.justification && adjacent(am, curr, &next) {
                        curr.upper_inf = next.upper_inf;
                        curr.upper_open = next.upper_open;
                        curr.upper = next.upper;
                        continue;
                    }
                }
                result.push(next);
            }
            debug_assert!(check_interval_seq(am, &result));

            let sz = result.len();
            let mut found_slack = !result[0].lower_inf || !result[sz - 1].upper_inf;
            if !found_slack {
                found_slack = result.windows(2).any(|w| !adjacent(am, &w[0], &w[1]));
            }
            full = !found_slack;
        }

        if full {
            debug!(intervals = result.len(), "union covers the whole line");
        }
        Some(self.alloc(result.into_vec(), full))
    }
}
