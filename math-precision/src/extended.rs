//! Extended tier: double-double arithmetic
//!
//! Values are unevaluated sums `hi + lo` of two doubles (about 106 significand
//! bits), provided by [`twofloat::TwoFloat`]. Products of two machine doubles
//! are exact in this tier, which is what makes it a good residual tier for
//! `f64` systems.

use crate::decimal::Decimal;
use crate::traits::{Scalar, Tier};
use bigdecimal::BigDecimal;
use num_traits::{FromPrimitive, Zero};
use twofloat::TwoFloat;

/// Double-double scalar
pub type Extended = TwoFloat;

/// 2^-104, spacing of double-double values just above one
const EXTENDED_EPSILON: f64 = f64::EPSILON * f64::EPSILON;

/// Split into the leading double and the (exact) remainder
#[inline]
pub fn split(value: &Extended) -> (f64, f64) {
    let hi = f64::from(*value);
    let lo = f64::from(*value - TwoFloat::from(hi));
    (hi, lo)
}

impl Scalar for Extended {
    type Wider = Decimal;

    const TIER: Tier = Tier::Extended;

    #[inline]
    fn zero() -> Self {
        TwoFloat::from(0.0)
    }

    #[inline]
    fn one() -> Self {
        TwoFloat::from(1.0)
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        TwoFloat::from(value)
    }

    #[inline]
    fn to_f64(&self) -> f64 {
        f64::from(*self)
    }

    #[inline]
    fn abs(&self) -> Self {
        if *self < <Self as Scalar>::zero() { -*self } else { *self }
    }

    /// One Newton step from the machine-precision root doubles the number of
    /// correct bits, which covers the double-double significand.
    fn sqrt(&self) -> Self {
        let (hi, _) = split(self);
        if !(hi > 0.0) {
            return TwoFloat::from(hi.sqrt());
        }
        let y = TwoFloat::from(hi.sqrt());
        y + (*self - y * y) / (y * TwoFloat::from(2.0))
    }

    #[inline]
    fn is_finite(&self) -> bool {
        let (hi, lo) = split(self);
        hi.is_finite() && lo.is_finite()
    }

    #[inline]
    fn epsilon() -> Self {
        TwoFloat::from(EXTENDED_EPSILON)
    }

    #[inline]
    fn mul_add(&self, a: &Self, b: &Self) -> Self {
        *self * *a + *b
    }

    /// `hi + lo` is summed exactly and rounded once to [`Decimal::DIGITS`].
    fn promote(&self) -> Decimal {
        let (hi, lo) = split(self);
        let exact = |v: f64| BigDecimal::from_f64(v).unwrap_or_else(BigDecimal::zero);
        Decimal::new(exact(hi) + exact(lo))
    }

    fn demote(wide: &Decimal) -> Self {
        wide.to_extended()
    }

    #[inline]
    fn to_extended(&self) -> Extended {
        *self
    }

    fn to_decimal(&self) -> Decimal {
        self.promote()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_extended_exact_product() {
        let b = TwoFloat::from(0.99999999_f64);
        let d = TwoFloat::from(0.99999998_f64);
        let diff = d - b * b;
        assert_relative_eq!(diff.to_f64(), 1.1022301457563796e-17, max_relative = 1e-12);
    }

    #[test]
    fn test_extended_sqrt() {
        let two = <Extended as Scalar>::from_f64(2.0);
        let root = Scalar::sqrt(&two);
        let err = (root * root - two).abs();
        assert!(err.to_f64() < 1e-30, "sqrt(2)^2 - 2 = {:e}", err.to_f64());
        assert!(Scalar::is_zero(&Scalar::sqrt(&<Extended as Scalar>::zero())));
    }

    #[test]
    fn test_extended_split_and_abs() {
        let third = TwoFloat::from(1.0) / TwoFloat::from(3.0);
        let (hi, lo) = split(&third);
        assert_relative_eq!(hi, 1.0 / 3.0);
        assert!(lo != 0.0 && lo.abs() < 1e-16);
        assert_eq!(Scalar::abs(&-third), third);
    }

    #[test]
    fn test_extended_promote_rounds_once() {
        let hi = 1.0_f64 / 3.0;
        let lo = 2.0_f64.powi(-60);
        let value = TwoFloat::from(hi) + TwoFloat::from(lo);
        let (split_hi, split_lo) = split(&value);
        assert_eq!((split_hi, split_lo), (hi, lo));

        // Formatting with a fixed precision prints the exact binary value
        let digits = |v: f64| format!("{v:.80}").parse::<BigDecimal>().expect("decimal literal");
        let expected = Decimal::new(digits(hi) + digits(lo));
        assert_eq!(value.promote(), expected);
    }

    #[test]
    fn test_extended_decimal_round_trip() {
        let third = TwoFloat::from(1.0) / TwoFloat::from(3.0);
        let dec = third.promote();
        let back = <Extended as Scalar>::demote(&dec);
        let err = Scalar::abs(&(back - third)).to_f64();
        assert!(err < 1e-31, "round trip error {err:e}");
    }
}
