//! Per-variable sampling distributions
//!
//! A distribution biases witness selection toward values the caller
//! considers likely. Two kinds are supported: Gaussian (mean/spread) and
//! Uniform (mean ± spread). Sampling works in `f64`, then re-enters the
//! exact domain through decimal formatting; the precision loss is
//! deliberate, the caller is a heuristic and not a proof obligation.
//!
//! The normal CDF uses the Abramowitz–Stegun 5-term rational
//! approximation, its inverse the Acklam three-region approximation.
//! The constants below are fixed; do not "improve" them.

use num_rational::BigRational;
use num_traits::ToPrimitive;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use nra_core::{NumManager, Var};

/// Resolution of the integer PRNG feeding every sampler: draws are
/// uniform in `[0, RANDOM_PRECISION)`.
pub const RANDOM_PRECISION: u32 = 8192;

const PI: f64 = 3.1415926;

// Abramowitz-Stegun 26.2.17
const CDF_GAMMA: f64 = 0.231641900;
const CDF_A1: f64 = 0.319381530;
const CDF_A2: f64 = -0.356563782;
const CDF_A3: f64 = 1.781477973;
const CDF_A4: f64 = -1.821255978;
const CDF_A5: f64 = 1.330274429;

// Acklam inverse-CDF coefficients
const PPF_LOW: f64 = 0.02425;
const PPF_HIGH: f64 = 0.97575;
const PPF_A: [f64; 6] = [
    -3.969683028665376e+01,
    2.209460984245205e+02,
    -2.759285104469687e+02,
    1.383577518672690e+02,
    -3.066479806614716e+01,
    2.506628277459239e+00,
];
const PPF_B: [f64; 5] = [
    -5.447609879822406e+01,
    1.615858368580409e+02,
    -1.556989798598866e+02,
    6.680131188771972e+01,
    -1.328068155288572e+01,
];
const PPF_C: [f64; 6] = [
    -7.784894002430293e-03,
    -3.223964580411365e-01,
    -2.400758277161838e+00,
    -2.549732539343734e+00,
    4.374664141464968e+00,
    2.938163982698783e+00,
];
const PPF_D: [f64; 4] = [
    7.784695709041462e-03,
    3.224671290700398e-01,
    2.445134137142996e+00,
    3.754408661907416e+00,
];

/// Shape of a per-variable sample source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionKind {
    /// Normal with the distribution's mean and spread
    Gaussian,
    /// Uniform on `mean ± spread`
    Uniform,
}

/// Outcome flag of an inverse-CDF evaluation outside its domain.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InverseCdfError {
    /// Probability outside `[0, 1]`; the result was forced to 0.0
    #[error("probability outside [0, 1]")]
    Domain,
    /// Probability exactly 0 or 1; the result is infinite
    #[error("probability at a range limit, result is infinite")]
    Range,
}

/// A seeded per-variable sample source.
#[derive(Debug, Clone)]
pub struct Distribution {
    var: Var,
    kind: DistributionKind,
    mean: BigRational,
    spread: BigRational,
    rng: ChaCha8Rng,
    ppf_error: Option<InverseCdfError>,
}

impl Distribution {
    /// Create a distribution for `var` with the given shape and seed.
    pub fn new(
        var: Var,
        kind: DistributionKind,
        mean: BigRational,
        spread: BigRational,
        seed: u64,
    ) -> Self {
        Distribution {
            var,
            kind,
            mean,
            spread,
            rng: ChaCha8Rng::seed_from_u64(seed),
            ppf_error: None,
        }
    }

    /// Reseed the sample source.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// The variable this distribution is attached to.
    pub fn var(&self) -> Var {
        self.var
    }

    /// The distribution's shape.
    pub fn kind(&self) -> DistributionKind {
        self.kind
    }

    /// The mean.
    pub fn mean(&self) -> &BigRational {
        &self.mean
    }

    /// The spread.
    pub fn spread(&self) -> &BigRational {
        &self.spread
    }

    /// Take the error flag of the most recent inverse-CDF evaluation.
    pub fn take_ppf_error(&mut self) -> Option<InverseCdfError> {
        self.ppf_error.take()
    }

    #[inline]
    fn next_raw(&mut self) -> u32 {
        self.rng.gen_range(0..RANDOM_PRECISION)
    }

    /// A draw in `[0, 1)`, used to pick a region by probability mass.
    pub(crate) fn next_unit(&mut self) -> f64 {
        f64::from(self.next_raw()) / f64::from(RANDOM_PRECISION)
    }

    /// A draw in `(0, 1)`; truncated sampling must avoid both limits of
    /// the inverse CDF.
    fn unit_open(&mut self) -> f64 {
        f64::from(self.next_raw() % (RANDOM_PRECISION - 1) + 1) / f64::from(RANDOM_PRECISION)
    }

    fn mean_f(&self) -> f64 {
        self.mean.to_f64().unwrap_or(0.0)
    }

    fn spread_f(&self) -> f64 {
        self.spread.to_f64().unwrap_or(0.0)
    }

    /// Box-Muller draw from N(mean, spread).
    fn rand_gd(&mut self, mean: f64, spread: f64) -> f64 {
        let u1 = f64::from(self.next_raw()) / f64::from(RANDOM_PRECISION);
        let u2 = f64::from(self.next_raw()) / f64::from(RANDOM_PRECISION);
        mean + spread * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Coin-flip draw from mean ± u·spread.
    fn rand_ud(&mut self, mean: f64, spread: f64) -> f64 {
        let sign = if self.next_raw() % 2 == 0 { 1.0 } else { -1.0 };
        let u = f64::from(self.next_raw()) * spread / f64::from(RANDOM_PRECISION);
        mean + sign * u
    }

    fn normal_pdf(z: f64) -> f64 {
        (-z * z / 2.0).exp() / (2.0 * PI).sqrt()
    }

    /// Standard normal CDF, Abramowitz-Stegun 26.2.17.
    fn norm_s_dist(z: f64) -> f64 {
        // Guard against overflow in the tails.
        if z > 1_000_000_000.0 {
            return 1.0;
        }
        if z < -1_000_000_000.0 {
            return 0.0;
        }
        let k = 1.0 / (1.0 + z.abs() * CDF_GAMMA);
        let n = k * (CDF_A1 + k * (CDF_A2 + k * (CDF_A3 + k * (CDF_A4 + k * CDF_A5))));
        let n = 1.0 - Self::normal_pdf(z) * n;
        if z < 0.0 {
            1.0 - n
        } else {
            n
        }
    }

    /// Standard normal inverse CDF, Acklam's three-region rational
    /// approximation. Sets the per-call error flag on out-of-domain
    /// input and at the limits, mirroring errno.
    fn normsinv(&mut self, p: f64) -> f64 {
        self.ppf_error = None;
        if !(0.0..=1.0).contains(&p) {
            self.ppf_error = Some(InverseCdfError::Domain);
            return 0.0;
        }
        if p == 0.0 {
            self.ppf_error = Some(InverseCdfError::Range);
            return f64::NEG_INFINITY;
        }
        if p == 1.0 {
            self.ppf_error = Some(InverseCdfError::Range);
            return f64::INFINITY;
        }
        let (a, b, c, d) = (&PPF_A, &PPF_B, &PPF_C, &PPF_D);
        if p < PPF_LOW {
            let q = (-2.0 * p.ln()).sqrt();
            (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
                / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
        } else if p > PPF_HIGH {
            let q = (-2.0 * (1.0 - p).ln()).sqrt();
            -(((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
                / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
        } else {
            let q = p - 0.5;
            let r = q * q;
            (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q
                / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + 1.0)
        }
    }

    /// CDF of this distribution's normal at `z`.
    pub fn cdf(&self, z: f64) -> f64 {
        Self::norm_s_dist((z - self.mean_f()) / self.spread_f())
    }

    /// Inverse CDF of this distribution's normal at probability `p`.
    pub fn ppf(&mut self, p: f64) -> f64 {
        let z = self.normsinv(p);
        z * self.spread_f() + self.mean_f()
    }

    /// Draw an unconstrained sample and store it in `w`.
    pub fn sample<M: NumManager>(&mut self, am: &M, w: &mut M::Num) {
        let r = match self.kind {
            DistributionKind::Gaussian => {
                let (mean, spread) = (self.mean_f(), self.spread_f());
                self.rand_gd(mean, spread)
            }
            DistributionKind::Uniform => {
                let (mean, spread) = (self.mean_f(), self.spread_f());
                self.rand_ud(mean, spread)
            }
        };
        assign_decimal(am, w, r);
    }

    /// Draw a sample truncated to `(lower, upper)` and store it in `w`.
    ///
    /// Gaussian truncation inverts the CDF over the band's own mass:
    /// `PPF(CDF(a) + u·(CDF(b) − CDF(a)))`.
    pub fn sample_between<M: NumManager>(
        &mut self,
        am: &M,
        w: &mut M::Num,
        lower: &M::Num,
        upper: &M::Num,
    ) {
        let u = self.unit_open();
        let a = to_f64(am, lower);
        let b = to_f64(am, upper);
        let r = match self.kind {
            DistributionKind::Gaussian => {
                let (ca, cb) = (self.cdf(a), self.cdf(b));
                self.ppf(ca + u * (cb - ca))
            }
            DistributionKind::Uniform => u * (b - a) + a,
        };
        assign_decimal(am, w, r);
    }

    /// Draw a sample truncated to an open ray and store it in `w`:
    /// above `bound` when `has_low`, below it otherwise.
    pub fn sample_ray<M: NumManager>(
        &mut self,
        am: &M,
        w: &mut M::Num,
        has_low: bool,
        bound: &M::Num,
    ) {
        let u = self.unit_open();
        let z = to_f64(am, bound);
        let r = if has_low {
            match self.kind {
                DistributionKind::Gaussian => {
                    let ca = self.cdf(z);
                    self.ppf(ca + u * (1.0 - ca))
                }
                DistributionKind::Uniform => z + u * self.spread_f(),
            }
        } else {
            match self.kind {
                DistributionKind::Gaussian => {
                    let cb = self.cdf(z);
                    self.ppf(u * cb)
                }
                DistributionKind::Uniform => z - u * self.spread_f(),
            }
        };
        assign_decimal(am, w, r);
    }

    /// Point density at `point`.
    ///
    /// The Uniform density is the fixed `1/RANDOM_PRECISION` regardless
    /// of spread; a heuristic convention kept for compatibility.
    pub fn prob_point<M: NumManager>(&self, am: &M, point: &M::Num) -> f64 {
        match self.kind {
            DistributionKind::Gaussian => {
                let loc = to_f64(am, point);
                let (mean, spread) = (self.mean_f(), self.spread_f());
                (-(loc - mean) * (loc - mean) / (2.0 * spread * spread)).exp()
                    / ((2.0 * PI).sqrt() * spread)
            }
            DistributionKind::Uniform => 1.0 / f64::from(RANDOM_PRECISION),
        }
    }

    /// Probability mass of the band `(lower, upper)`.
    pub fn prob_band<M: NumManager>(&self, am: &M, lower: &M::Num, upper: &M::Num) -> f64 {
        let a = to_f64(am, lower);
        let b = to_f64(am, upper);
        match self.kind {
            DistributionKind::Gaussian => self.cdf(b) - self.cdf(a),
            DistributionKind::Uniform => b - a,
        }
    }

    /// Probability mass of the ray above `bound` (`has_low`) or below it.
    pub fn prob_ray<M: NumManager>(&self, am: &M, has_low: bool, bound: &M::Num) -> f64 {
        match self.kind {
            DistributionKind::Gaussian => {
                let z = to_f64(am, bound);
                if has_low {
                    1.0 - self.cdf(z)
                } else {
                    self.cdf(z)
                }
            }
            DistributionKind::Uniform => self.spread_f(),
        }
    }
}

/// `f64` view of a domain value, via its decimal rendering.
fn to_f64<M: NumManager>(am: &M, x: &M::Num) -> f64 {
    am.to_decimal_string(x).parse().unwrap_or(0.0)
}

/// Store `r` in `w` through a 6-decimal rendering; non-finite draws
/// collapse to 0.
fn assign_decimal<M: NumManager>(am: &M, w: &mut M::Num, r: f64) {
    match am.from_decimal_str(&format!("{r:.6}")) {
        Some(v) => *w = v,
        None => *w = am.from_int(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nra_core::RationalManager;

    fn gaussian(mean: i64, spread: i64, seed: u64) -> Distribution {
        let m = RationalManager::new();
        Distribution::new(
            Var(0),
            DistributionKind::Gaussian,
            m.from_int(mean),
            m.from_int(spread),
            seed,
        )
    }

    fn uniform(mean: i64, spread: i64, seed: u64) -> Distribution {
        let m = RationalManager::new();
        Distribution::new(
            Var(0),
            DistributionKind::Uniform,
            m.from_int(mean),
            m.from_int(spread),
            seed,
        )
    }

    #[test]
    fn test_cdf_midpoint_and_tails() {
        let d = gaussian(0, 1, 1);
        assert!((d.cdf(0.0) - 0.5).abs() < 1e-7);
        assert!(d.cdf(-6.0) < 1e-6);
        assert!(d.cdf(6.0) > 1.0 - 1e-6);
        // Overflow guard clamps extreme arguments.
        assert_eq!(d.cdf(2e9), 1.0);
        assert_eq!(d.cdf(-2e9), 0.0);
    }

    #[test]
    fn test_ppf_midpoint_and_flag() {
        let mut d = gaussian(3, 1, 1);
        assert!((d.ppf(0.5) - 3.0).abs() < 1e-7);
        assert!(d.take_ppf_error().is_none());

        assert_eq!(d.ppf(0.0), f64::NEG_INFINITY);
        assert_eq!(d.take_ppf_error(), Some(InverseCdfError::Range));
        assert_eq!(d.ppf(1.0), f64::INFINITY);
        assert_eq!(d.take_ppf_error(), Some(InverseCdfError::Range));
        assert_eq!(d.ppf(1.5), 3.0);
        assert_eq!(d.take_ppf_error(), Some(InverseCdfError::Domain));
    }

    #[test]
    fn test_ppf_inverts_cdf() {
        for (mean, spread) in [(0i64, 1i64), (3, 2)] {
            let mut d = gaussian(mean, spread, 1);
            let (mean, spread) = (mean as f64, spread as f64);
            let mut x = mean - 5.0 * spread;
            while x <= mean + 5.0 * spread {
                let p = d.cdf(x);
                let back = d.ppf(p);
                assert!(
                    (back - x).abs() < 1e-3,
                    "roundtrip drift at {x}: {back}"
                );
                x += 0.25 * spread;
            }
        }
    }

    #[test]
    fn test_sampling_is_deterministic_under_seed() {
        let am = RationalManager::new();
        let mut w1 = am.from_int(0);
        let mut w2 = am.from_int(0);
        let mut d1 = gaussian(0, 1, 42);
        let mut d2 = gaussian(0, 1, 42);
        for _ in 0..8 {
            d1.sample(&am, &mut w1);
            d2.sample(&am, &mut w2);
            assert_eq!(w1, w2);
        }
    }

    #[test]
    fn test_sample_between_stays_inside() {
        let am = RationalManager::new();
        let lo = am.from_int(-1);
        let hi = am.from_int(1);
        let mut w = am.from_int(5);
        let mut d = gaussian(0, 1, 7);
        for _ in 0..32 {
            d.sample_between(&am, &mut w, &lo, &hi);
            assert!(am.lt(&lo, &w) && am.lt(&w, &hi), "escaped the band");
        }
        let mut d = uniform(0, 1, 7);
        for _ in 0..32 {
            d.sample_between(&am, &mut w, &lo, &hi);
            assert!(am.lt(&lo, &w) && am.lt(&w, &hi), "escaped the band");
        }
    }

    #[test]
    fn test_sample_ray_respects_bound() {
        let am = RationalManager::new();
        let bound = am.from_int(2);
        let mut w = am.from_int(0);
        let mut d = gaussian(0, 1, 3);
        for _ in 0..16 {
            d.sample_ray(&am, &mut w, true, &bound);
            assert!(am.lt(&bound, &w), "sample below a lower bound");
        }
        for _ in 0..16 {
            d.sample_ray(&am, &mut w, false, &bound);
            assert!(am.lt(&w, &bound), "sample above an upper bound");
        }
    }

    #[test]
    fn test_uniform_masses() {
        let am = RationalManager::new();
        let d = uniform(0, 4, 1);
        assert_eq!(
            d.prob_point(&am, &am.from_int(123)),
            1.0 / f64::from(RANDOM_PRECISION)
        );
        assert_eq!(d.prob_band(&am, &am.from_int(1), &am.from_int(3)), 2.0);
        assert_eq!(d.prob_ray(&am, true, &am.from_int(0)), 4.0);
        assert_eq!(d.prob_ray(&am, false, &am.from_int(0)), 4.0);
    }

    #[test]
    fn test_uniform_draw_bounded_by_spread() {
        let am = RationalManager::new();
        let mut w = am.from_int(0);
        let mut d = uniform(10, 2, 5);
        let lo = am.from_int(8);
        let hi = am.from_int(12);
        for _ in 0..32 {
            d.sample(&am, &mut w);
            assert!(!am.lt(&w, &lo) && !am.lt(&hi, &w), "outside mean ± spread");
        }
    }
}
