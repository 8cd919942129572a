//! Quantities derived from a factorization
//!
//! Determinant, inverse, norm and condition number. Singularity is an answer
//! here rather than a failure: the determinant of a singular matrix is zero
//! and its condition number is `+inf`.

use crate::direct::{
    Factorization, LuFactorization, lu_factorize, lu_factorize_scaled, solve_columns,
};
use crate::error::Result;
use crate::pivot::PivotPolicy;
use crate::scaling::{compute_scaling, scaling_product};
use math_audio_precision::Scalar;
use ndarray::{Array1, Array2};

/// Determinant of the original matrix from the LU of its row-scaled copy.
///
/// Row scaling multiplies the determinant by the product of the factors, so
/// that product is divided back out.
pub fn determinant_from_lu<T: Scalar>(lu: &LuFactorization<T>, scaling: Option<&Array1<T>>) -> T {
    let det = lu.determinant();
    match scaling {
        Some(factors) => det / scaling_product(factors),
        None => det,
    }
}

/// Determinant of `a`, or exactly zero when LU finds no usable pivot
pub fn determinant<T: Scalar>(a: &Array2<T>, policy: &PivotPolicy, scaled: bool) -> T {
    let factors = scaled.then(|| compute_scaling(a));
    let result = match &factors {
        Some(f) => lu_factorize_scaled(a, f, policy),
        None => lu_factorize(a, policy),
    };
    match result {
        Ok(lu) => determinant_from_lu(&lu, factors.as_ref()),
        Err(_) => T::zero(),
    }
}

/// Identity of order `n`
pub fn identity<T: Scalar>(n: usize) -> Array2<T> {
    Array2::from_shape_fn((n, n), |(i, j)| if i == j { T::one() } else { T::zero() })
}

/// Right-hand side for inversion: `D * I`, or `I` without scaling
pub fn inverse_rhs<T: Scalar>(n: usize, scaling: Option<&Array1<T>>) -> Array2<T> {
    match scaling {
        Some(factors) => Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j { factors[i].clone() } else { T::zero() }
        }),
        None => identity(n),
    }
}

/// Inverse from any factorization by solving against the identity
pub fn inverse_from<T, F>(factors: &F, scaling: Option<&Array1<T>>) -> Array2<T>
where
    T: Scalar,
    F: Factorization<T>,
{
    solve_columns(factors, &inverse_rhs(factors.dim(), scaling))
}

/// Infinity norm: largest absolute row sum
pub fn norm_inf<T: Scalar>(a: &Array2<T>) -> T {
    a.rows()
        .into_iter()
        .map(|row| row.iter().fold(T::zero(), |acc, v| acc + v.abs()))
        .fold(T::zero(), |max, s| if s > max { s } else { max })
}

/// `||A|| * ||A^-1||` in the infinity norm, `+inf` if the inverse failed
pub fn cond<T: Scalar>(a: &Array2<T>, inverse: Result<&Array2<T>>) -> f64 {
    match inverse {
        Ok(inv) => {
            let value = norm_inf(a).to_f64() * norm_inf(inv).to_f64();
            if value.is_finite() { value } else { f64::INFINITY }
        }
        Err(_) => f64::INFINITY,
    }
}
