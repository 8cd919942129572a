//! Decimal tiers: arbitrary-precision decimal arithmetic
//!
//! Both tiers wrap [`bigdecimal::BigDecimal`] and round every result to a
//! fixed number of significant digits, so that elimination on a decimal matrix
//! does not grow its operands without bound. [`Decimal`] is the working
//! decimal tier; [`WideDecimal`] carries twice the digits and exists so that
//! decimal systems also have a wider tier for their residuals.

use crate::extended::Extended;
use crate::traits::{Scalar, Tier};
use bigdecimal::{BigDecimal, ParseBigDecimalError};
use num_traits::{FromPrimitive, One, ToPrimitive, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;
use twofloat::TwoFloat;

/// Split a decimal into a double-double (leading double plus remainder)
fn decimal_to_extended(value: &BigDecimal) -> Extended {
    let hi = value.to_f64().unwrap_or(f64::NAN);
    if !hi.is_finite() {
        return TwoFloat::from(hi);
    }
    let rest = match BigDecimal::from_f64(hi) {
        Some(hi_dec) => value.clone() - hi_dec,
        None => BigDecimal::zero(),
    };
    let lo = rest.to_f64().unwrap_or(0.0);
    TwoFloat::from(hi) + TwoFloat::from(lo)
}

macro_rules! decimal_tier {
    (
        $(#[$meta:meta])*
        $name:ident, digits = $digits:expr, wider = $wider:ident, tier = $tier:expr
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(BigDecimal);

        impl $name {
            /// Significant digits kept after every operation
            pub const DIGITS: u64 = $digits;

            /// Round a decimal to this tier
            pub fn new(value: BigDecimal) -> Self {
                Self(value.with_prec(Self::DIGITS))
            }

            /// Borrow the underlying decimal
            pub fn as_big_decimal(&self) -> &BigDecimal {
                &self.0
            }

            /// Unwrap the underlying decimal
            pub fn into_inner(self) -> BigDecimal {
                self.0
            }
        }

        impl From<BigDecimal> for $name {
            fn from(value: BigDecimal) -> Self {
                Self::new(value)
            }
        }

        impl FromStr for $name {
            type Err = ParseBigDecimalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                BigDecimal::from_str(s).map(Self::new)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.normalized(), f)
            }
        }

        impl Add for $name {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self::new(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self::new(self.0 - rhs.0)
            }
        }

        impl Mul for $name {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: Self) -> Self {
                Self::new(self.0 * rhs.0)
            }
        }

        /// # Panics
        ///
        /// Panics when dividing by an exact zero, as [`BigDecimal`] does.
        impl Div for $name {
            type Output = Self;

            #[inline]
            fn div(self, rhs: Self) -> Self {
                Self::new(self.0 / rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl Scalar for $name {
            type Wider = $wider;

            const TIER: Tier = $tier;

            fn zero() -> Self {
                Self(BigDecimal::zero())
            }

            fn one() -> Self {
                Self(BigDecimal::one())
            }

            /// Non-finite doubles have no decimal value and map to zero;
            /// the solvers validate their inputs before converting.
            fn from_f64(value: f64) -> Self {
                BigDecimal::from_f64(value)
                    .map(Self::new)
                    .unwrap_or_else(Self::zero)
            }

            fn to_f64(&self) -> f64 {
                self.0.to_f64().unwrap_or(f64::NAN)
            }

            fn abs(&self) -> Self {
                Self(self.0.abs())
            }

            /// Negative input yields zero.
            fn sqrt(&self) -> Self {
                self.0.sqrt().map(Self::new).unwrap_or_else(Self::zero)
            }

            fn is_finite(&self) -> bool {
                true
            }

            fn is_zero(&self) -> bool {
                self.0.is_zero()
            }

            fn epsilon() -> Self {
                Self(BigDecimal::new(1.into(), Self::DIGITS as i64 - 1))
            }

            fn mul_add(&self, a: &Self, b: &Self) -> Self {
                Self::new(&self.0 * &a.0 + &b.0)
            }

            fn promote(&self) -> $wider {
                $wider::new(self.0.clone())
            }

            fn demote(wide: &$wider) -> Self {
                Self::new(wide.0.clone())
            }

            fn to_extended(&self) -> Extended {
                decimal_to_extended(&self.0)
            }

            fn to_decimal(&self) -> Decimal {
                Decimal::new(self.0.clone())
            }
        }
    };
}

decimal_tier!(
    /// Working decimal tier (40 significant digits)
    Decimal,
    digits = 40,
    wider = WideDecimal,
    tier = Tier::Decimal
);

decimal_tier!(
    /// Residual tier for decimal systems (80 significant digits)
    WideDecimal,
    digits = 80,
    wider = WideDecimal,
    tier = Tier::WideDecimal
);
