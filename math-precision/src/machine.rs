//! Machine tier: IEEE-754 double precision

use crate::decimal::Decimal;
use crate::extended::Extended;
use crate::traits::{Scalar, Tier};

impl Scalar for f64 {
    type Wider = Extended;

    const TIER: Tier = Tier::Machine;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(&self) -> f64 {
        *self
    }

    #[inline]
    fn abs(&self) -> Self {
        f64::abs(*self)
    }

    #[inline]
    fn sqrt(&self) -> Self {
        f64::sqrt(*self)
    }

    #[inline]
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }

    #[inline]
    fn epsilon() -> Self {
        f64::EPSILON
    }

    #[inline]
    fn mul_add(&self, a: &Self, b: &Self) -> Self {
        f64::mul_add(*self, *a, *b)
    }

    #[inline]
    fn promote(&self) -> Extended {
        Extended::from(*self)
    }

    #[inline]
    fn demote(wide: &Extended) -> Self {
        f64::from(*wide)
    }

    #[inline]
    fn to_extended(&self) -> Extended {
        Extended::from(*self)
    }

    fn to_decimal(&self) -> Decimal {
        Decimal::from_f64(*self)
    }
}
