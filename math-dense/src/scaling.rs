//! Row equilibration
//!
//! Each row i is multiplied by `1 / max_j |a_ij|` before decomposition. Rows
//! that are entirely zero, and rows whose reciprocal maximum overflows (a
//! subnormal maximum), keep factor 1. Applying the same factors to the
//! right-hand side leaves the solution unchanged; only the determinant has to
//! be corrected by the product of the factors.

use math_audio_precision::{Scalar, max_magnitude};
use ndarray::{Array1, Array2};

/// Compute one positive scaling factor per row
pub fn compute_scaling<T: Scalar>(a: &Array2<T>) -> Array1<T> {
    a.rows()
        .into_iter()
        .map(|row| {
            let max = max_magnitude(row.iter());
            if max.is_zero() {
                return T::one();
            }
            let factor = T::one() / max;
            if factor.is_finite() { factor } else { T::one() }
        })
        .collect()
}

/// Multiply each row of `a` by its factor, in place
pub fn apply_scaling<T: Scalar>(a: &mut Array2<T>, factors: &Array1<T>) {
    for (mut row, factor) in a.rows_mut().into_iter().zip(factors.iter()) {
        row.mapv_inplace(|v| v * factor.clone());
    }
}

/// Row-scale a right-hand side vector
pub fn scale_rhs<T: Scalar>(b: &Array1<T>, factors: &Array1<T>) -> Array1<T> {
    b.iter()
        .zip(factors.iter())
        .map(|(bi, fi)| bi.clone() * fi.clone())
        .collect()
}

/// Row-scale every column of a right-hand side matrix
pub fn scale_rhs_columns<T: Scalar>(b: &Array2<T>, factors: &Array1<T>) -> Array2<T> {
    let mut scaled = b.clone();
    apply_scaling(&mut scaled, factors);
    scaled
}

/// Product of all factors, i.e. det(D) for D = diag(factors)
pub fn scaling_product<T: Scalar>(factors: &Array1<T>) -> T {
    factors
        .iter()
        .fold(T::one(), |acc, f| acc * f.clone())
}
