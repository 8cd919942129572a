//! Core traits for multi-precision linear algebra
//!
//! This module defines the capability set every precision tier provides to the
//! dense solvers:
//! - [`Scalar`]: arithmetic, magnitude, conversions and promotion to a wider tier
//! - [`Tier`]: the identity of a precision tier, ordered from narrowest to widest

use crate::decimal::Decimal;
use crate::extended::Extended;
use std::fmt::{self, Debug};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Precision tiers, ordered from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// IEEE-754 double (53-bit significand)
    Machine,
    /// Emulated double-double (~106-bit significand)
    Extended,
    /// Arbitrary-precision decimal rounded to [`Decimal::DIGITS`] digits
    Decimal,
    /// Decimal rounded to [`crate::WideDecimal::DIGITS`] digits, used for residuals
    WideDecimal,
}

impl Tier {
    /// Short lower-case name, used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Tier::Machine => "machine",
            Tier::Extended => "extended",
            Tier::Decimal => "decimal",
            Tier::WideDecimal => "wide-decimal",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for scalar types that can be used by the dense solvers.
///
/// The decomposition, substitution and refinement algorithms are written once
/// against this trait. Each precision tier implements it, and names the tier
/// directly above it through [`Scalar::Wider`] so that residuals can be
/// evaluated with more precision than the decomposition itself.
///
/// Arithmetic is by value; types that are not `Copy` (the decimal tiers) are
/// cloned by the caller.
///
/// # Implementations
///
/// Provided for:
/// - `f64` (machine tier, widens to [`Extended`])
/// - [`Extended`] (double-double, widens to [`Decimal`])
/// - [`Decimal`] (widens to [`crate::WideDecimal`])
/// - [`crate::WideDecimal`] (widest tier, widens to itself)
pub trait Scalar:
    Clone
    + Debug
    + PartialOrd
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// The next wider tier (the widest tier names itself)
    type Wider: Scalar;

    /// Which tier this type implements
    const TIER: Tier;

    /// Additive identity
    fn zero() -> Self;

    /// Multiplicative identity
    fn one() -> Self;

    /// Convert from a machine double
    fn from_f64(value: f64) -> Self;

    /// Convert to the nearest machine double
    fn to_f64(&self) -> f64;

    /// Magnitude |x|
    fn abs(&self) -> Self;

    /// Square root (callers only pass non-negative values)
    fn sqrt(&self) -> Self;

    /// Whether the value is neither NaN nor infinite
    fn is_finite(&self) -> bool;

    /// Exact comparison with zero
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Machine epsilon of the tier: the gap between 1 and the next value
    fn epsilon() -> Self;

    /// Fused `self * a + b` with a single rounding
    fn mul_add(&self, a: &Self, b: &Self) -> Self;

    /// Conversion to the wider tier
    ///
    /// Exact from `f64` to [`Extended`] and between the decimal tiers; an
    /// [`Extended`] value is rounded once to [`Decimal::DIGITS`].
    fn promote(&self) -> Self::Wider;

    /// Round a wider-tier value back to this tier
    fn demote(wide: &Self::Wider) -> Self;

    /// Convert to the extended tier
    fn to_extended(&self) -> Extended;

    /// Convert to the decimal tier
    fn to_decimal(&self) -> Decimal;
}

/// Largest magnitude in a sequence, or zero when empty
pub fn max_magnitude<'a, T: Scalar>(values: impl IntoIterator<Item = &'a T>) -> T {
    values.into_iter().fold(T::zero(), |acc, v| {
        let m = v.abs();
        if m > acc { m } else { acc }
    })
}
