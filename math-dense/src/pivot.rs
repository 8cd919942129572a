//! Pivot usability policy
//!
//! LU decides whether a column still has a usable pivot through
//! [`PivotPolicy::is_usable_pivot`] instead of comparing against exact zero.
//! Two tests apply to every candidate:
//!
//! - the policy threshold, relative to the largest magnitude of the pivot's row
//!   in the matrix being factored (see [`row_scales`]). The default only rejects
//!   pivots that are zero or below the squared epsilon of the working tier;
//! - the rounding test: a pivot whose magnitude is within [`ROUNDING_MARGIN`]
//!   times the rounding error accumulated in that entry during elimination is
//!   indistinguishable from zero. A pivot produced by exact arithmetic carries
//!   no rounding and is always usable, however small.
//!
//! The second test is what makes the factorization rank-revealing: a matrix
//! whose rows are linearly dependent reports [`crate::DenseError::Singular`]
//! instead of a determinant of roundoff size.

use math_audio_precision::{Scalar, max_magnitude};
use ndarray::Array2;

/// How many rounding standard deviations a pivot must clear to be usable
pub const ROUNDING_MARGIN: f64 = 8.0;

/// Threshold policy for singularity detection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PivotPolicy {
    /// Usable iff `|pivot| > scale * eps^2`, with `eps` the working tier's epsilon
    #[default]
    TierEpsilonSquared,
    /// Usable iff `|pivot| > scale * tol`
    Relative(f64),
    /// Usable iff `|pivot| > floor`, regardless of scale
    Absolute(f64),
}

impl PivotPolicy {
    /// Whether a pivot of the given magnitude may be divided by.
    ///
    /// `reference_scale` is the largest magnitude of the pivot's row in the
    /// matrix being factored. `rounding` is the rounding error carried by the
    /// pivot entry, zero when it was computed exactly. Non-finite magnitudes are
    /// never usable.
    pub fn is_usable_pivot<T: Scalar>(
        &self,
        magnitude: &T,
        reference_scale: &T,
        rounding: f64,
    ) -> bool {
        if !magnitude.is_finite() {
            return false;
        }
        let threshold = match *self {
            PivotPolicy::TierEpsilonSquared => {
                let eps = T::epsilon();
                reference_scale.clone() * eps.clone() * eps
            }
            PivotPolicy::Relative(tol) => reference_scale.clone() * T::from_f64(tol),
            PivotPolicy::Absolute(floor) => T::from_f64(floor),
        };
        if *magnitude <= threshold {
            return false;
        }
        rounding == 0.0 || magnitude.to_f64() > ROUNDING_MARGIN * rounding
    }
}

/// Unit roundoff of the working tier, half its epsilon
pub fn unit_roundoff<T: Scalar>() -> f64 {
    T::epsilon().to_f64() / 2.0
}

/// Largest magnitude of each row of `a`
pub fn row_scales<T: Scalar>(a: &Array2<T>) -> Vec<T> {
    a.rows().into_iter().map(|row| max_magnitude(row.iter())).collect()
}
