//! Witness selection in the complement
//!
//! Given a non-full set, pick a value outside every interval. Default
//! mode returns the first available region (outer rays preferred),
//! random mode reservoir-selects uniformly among all viable regions, and
//! distribution mode weights regions by the probability mass a
//! per-variable distribution assigns to them.

use rand::Rng;
use tracing::trace;

use nra_core::NumManager;

use crate::distribution::Distribution;
use crate::manager::IntervalSetManager;
use crate::store::SetId;

/// Largest exponent of the random denominator drawn for a witness over
/// the empty set; denominators come from `{1, 2, 4, 8, 16}`.
const MAX_RANDOM_DEN_K: u32 = 4;

/// Witness-selection policy for [`IntervalSetManager::peek_in_complement`].
pub enum WitnessMode<'a> {
    /// First available region, outer rays preferred
    Default,
    /// Uniform reservoir choice among all viable regions
    Random,
    /// Regions weighted by a per-variable distribution
    Distribution(&'a mut Distribution),
}

impl<M: NumManager> IntervalSetManager<M> {
    /// Store in `w` a value not covered by `s`.
    ///
    /// Requires `!is_full(s)`. For integer-typed variables
    /// (`is_int`) the empty-set witness is kept integral; interior-gap
    /// witnesses may still be fractional.
    pub fn peek_in_complement(
        &mut self,
        s: Option<SetId>,
        is_int: bool,
        w: &mut M::Num,
        mode: WitnessMode<'_>,
    ) {
        debug_assert!(!self.is_full(s));
        match mode {
            WitnessMode::Default => self.peek_plain(s, is_int, w, false),
            WitnessMode::Random => self.peek_plain(s, is_int, w, true),
            WitnessMode::Distribution(dist) => self.peek_weighted(s, w, dist),
        }
    }

    fn peek_plain(&mut self, s: Option<SetId>, is_int: bool, w: &mut M::Num, randomize: bool) {
        let Some(id) = s else {
            if randomize {
                let num: i64 = if self.rng.gen_range(0u32..2) == 0 { 1 } else { -1 };
                let den: u64 = if is_int {
                    1
                } else {
                    1u64 << self.rng.gen_range(0..=MAX_RANDOM_DEN_K)
                };
                *w = self.am.from_ratio(num, den);
            } else {
                *w = self.am.from_int(0);
            }
            return;
        };
        let Self { am, pool, rng, .. } = self;
        let ints = &pool.get(id).intervals;
        let len = ints.len();
        let mut n: u32 = 0;

        if !ints[0].lower_inf {
            n += 1;
            *w = am.int_lt(&ints[0].lower);
            if !randomize {
                return;
            }
        }
        if !ints[len - 1].upper_inf {
            n += 1;
            if n == 1 || rng.gen_range(0..n) == 0 {
                *w = am.int_gt(&ints[len - 1].upper);
            }
            if !randomize {
                return;
            }
        }
        for i in 1..len {
            if am.lt(&ints[i - 1].upper, &ints[i].lower) {
                n += 1;
                if n == 1 || rng.gen_range(0..n) == 0 {
                    *w = am.select(&ints[i - 1].upper, &ints[i].lower);
                }
                if !randomize {
                    return;
                }
            }
        }
        if n > 0 {
            trace!(candidates = n, "witness from reservoir");
            return;
        }

        // Only zero-width seams remain: touching endpoints open on both
        // sides. Prefer a rational seam value.
        let mut fallback = None;
        for i in 1..len {
            if ints[i - 1].upper_open && ints[i].lower_open {
                debug_assert!(am.eq(&ints[i - 1].upper, &ints[i].lower));
                if am.is_rational(&ints[i - 1].upper) {
                    *w = ints[i - 1].upper.clone();
                    return;
                }
                if fallback.is_none() {
                    fallback = Some(i - 1);
                }
            }
        }
        // A non-full set with no region and no rational seam still has
        // an irrational seam.
        debug_assert!(fallback.is_some());
        if let Some(i) = fallback {
            *w = ints[i].upper.clone();
        }
    }

    fn peek_weighted(&self, s: Option<SetId>, w: &mut M::Num, dist: &mut Distribution) {
        let Some(id) = s else {
            dist.sample(&self.am, w);
            return;
        };
        let am = &self.am;
        let ints = &self.pool.get(id).intervals;
        let len = ints.len();

        if len == 1 {
            if ints[0].lower_inf {
                dist.sample_ray(am, w, true, &ints[0].upper);
                return;
            }
            if ints[0].upper_inf {
                dist.sample_ray(am, w, false, &ints[0].lower);
                return;
            }
        }

        // Mass per candidate region: index 0 is the left outer ray,
        // index len the right outer ray, index i the gap before
        // interval i. Zero-width seams get weight 0 here.
        let mut prob = vec![0.0f64; len + 1];
        let mut total = 0.0;
        if !ints[0].lower_inf {
            prob[0] = dist.prob_ray(am, false, &ints[0].lower);
            total += prob[0];
        }
        if !ints[len - 1].upper_inf {
            prob[len] = dist.prob_ray(am, true, &ints[len - 1].upper);
            total += prob[len];
        }
        for i in 1..len {
            if am.lt(&ints[i - 1].upper, &ints[i].lower) {
                prob[i] = dist.prob_band(am, &ints[i - 1].upper, &ints[i].lower);
                total += prob[i];
            }
        }

        if total != 0.0 {
            let mut r = dist.next_unit() * total;
            let mut index = 0usize;
            while index < len && (r - prob[index] > 0.0 || prob[index] == 0.0) {
                r -= prob[index];
                index += 1;
            }
            if prob[index] == 0.0 {
                if let Some(j) = prob.iter().rposition(|&p| p != 0.0) {
                    index = j;
                }
            }
            trace!(index, total, "distribution-weighted region");
            if index == 0 {
                dist.sample_ray(am, w, false, &ints[0].lower);
            } else if index == len {
                dist.sample_ray(am, w, true, &ints[len - 1].upper);
            } else {
                dist.sample_between(am, w, &ints[index - 1].upper, &ints[index].lower);
            }
            return;
        }

        // Every region has zero mass; fall back to the seams, picking
        // the rational seam with the highest point density.
        let mut best = 0.0f64;
        let mut fallback = None;
        for i in 1..len {
            if ints[i - 1].upper_open && ints[i].lower_open {
                debug_assert!(am.eq(&ints[i - 1].upper, &ints[i].lower));
                if am.is_rational(&ints[i - 1].upper) {
                    let cur = dist.prob_point(am, &ints[i - 1].upper);
                    if cur > best {
                        best = cur;
                        *w = ints[i - 1].upper.clone();
                    }
                }
                if fallback.is_none() {
                    fallback = Some(i - 1);
                }
            }
        }
        if best != 0.0 {
            return;
        }
        if let Some(i) = fallback {
            *w = ints[i].upper.clone();
            return;
        }
        // Every region's f64 mass underflowed to zero and the set has no
        // seam. Exact arithmetic still knows the regions; take the first
        // one the deterministic policy would.
        if !ints[0].lower_inf {
            *w = am.int_lt(&ints[0].lower);
        } else if !ints[len - 1].upper_inf {
            *w = am.int_gt(&ints[len - 1].upper);
        } else {
            for i in 1..len {
                if am.lt(&ints[i - 1].upper, &ints[i].lower) {
                    *w = am.select(&ints[i - 1].upper, &ints[i].lower);
                    return;
                }
            }
        }
    }
}
