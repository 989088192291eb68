//! Rational model of the numeric-domain contract
//!
//! Backed by arbitrary-precision `BigRational`. Every value is rational,
//! so `is_rational` is constantly true; the engine's irrational-seam
//! fallbacks are exercised only under a genuine algebraic-number manager.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::num::NumManager;

/// Fractional digits emitted by `to_decimal_string`.
const DISPLAY_PRECISION: usize = 12;

/// Exact rational arithmetic behind the [`NumManager`] contract.
#[derive(Debug, Default, Clone)]
pub struct RationalManager;

impl RationalManager {
    /// Create a manager.
    pub fn new() -> Self {
        RationalManager
    }
}

impl NumManager for RationalManager {
    type Num = BigRational;

    fn compare(&self, a: &BigRational, b: &BigRational) -> Ordering {
        a.cmp(b)
    }

    fn is_rational(&self, _x: &BigRational) -> bool {
        true
    }

    fn int_lt(&self, x: &BigRational) -> BigRational {
        BigRational::from_integer(x.ceil().to_integer() - BigInt::one())
    }

    fn int_gt(&self, x: &BigRational) -> BigRational {
        BigRational::from_integer(x.floor().to_integer() + BigInt::one())
    }

    fn select(&self, a: &BigRational, b: &BigRational) -> BigRational {
        debug_assert!(a < b);
        (a + b) / BigRational::from_integer(BigInt::from(2))
    }

    fn from_int(&self, i: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(i))
    }

    fn from_ratio(&self, num: i64, den: u64) -> BigRational {
        debug_assert!(den != 0);
        BigRational::new(BigInt::from(num), BigInt::from(den))
    }

    fn from_decimal_str(&self, s: &str) -> Option<BigRational> {
        let (sign, body) = match s.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let mut numer: BigInt = if int_part.is_empty() {
            BigInt::zero()
        } else {
            int_part.parse().ok()?
        };
        let mut denom = BigInt::one();
        for b in frac_part.bytes() {
            numer = numer * 10 + BigInt::from(b - b'0');
            denom *= 10;
        }
        Some(BigRational::new(numer * sign, denom))
    }

    fn to_decimal_string(&self, x: &BigRational) -> String {
        let mut out = String::new();
        if x.is_negative() {
            out.push('-');
        }
        let ax = x.abs();
        out.push_str(&ax.trunc().to_integer().to_string());
        let mut frac = ax.fract();
        if frac.is_zero() {
            return out;
        }
        out.push('.');
        let ten = BigRational::from_integer(BigInt::from(10));
        for _ in 0..DISPLAY_PRECISION {
            frac *= &ten;
            let digit = frac.trunc().to_integer();
            out.push_str(&digit.to_string());
            frac = frac.fract();
            if frac.is_zero() {
                break;
            }
        }
        out
    }
}
