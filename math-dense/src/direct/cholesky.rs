//! Cholesky decomposition
//!
//! Factorizes a symmetric positive-definite matrix as `A = R * R^T` with `R`
//! lower triangular. No pivoting is done. Symmetry is a precondition: only the
//! lower triangle of `A` is read. Positive-definiteness is verified as a side
//! effect, since a non-SPD matrix produces a non-positive pivot.

use crate::error::{DenseError, Result};
use math_audio_precision::Scalar;
use ndarray::Array2;

/// Cholesky factorization result
#[derive(Debug, Clone)]
pub struct CholeskyFactorization<T: Scalar> {
    /// Lower triangular factor (entries above the diagonal are zero)
    pub r: Array2<T>,
    /// Matrix dimension
    pub n: usize,
}

impl<T: Scalar> CholeskyFactorization<T> {
    /// det(A) = prod(r_ii)^2
    pub fn determinant(&self) -> T {
        let product = self
            .r
            .diag()
            .iter()
            .fold(T::one(), |acc, d| acc * d.clone());
        product.clone() * product
    }

    /// Lower triangular factor
    pub fn l(&self) -> &Array2<T> {
        &self.r
    }
}

/// Compute the Cholesky factor of a symmetric positive-definite matrix
///
/// Fails with [`DenseError::NotPositiveDefinite`] at the first column whose
/// pivot, after subtracting the accumulated outer products, is not strictly
/// positive.
pub fn cholesky_factorize<T: Scalar>(a: &Array2<T>) -> Result<CholeskyFactorization<T>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(DenseError::NonSquare {
            rows: n,
            cols: a.ncols(),
        });
    }

    let mut r = Array2::from_elem((n, n), T::zero());

    for j in 0..n {
        let mut pivot = a[[j, j]].clone();
        for k in 0..j {
            pivot = (-r[[j, k]].clone()).mul_add(&r[[j, k]], &pivot);
        }

        if !(pivot > T::zero()) {
            log::debug!(
                "Cholesky ({} tier, n = {}): pivot {} is not positive ({:e})",
                T::TIER,
                n,
                j,
                pivot.to_f64()
            );
            return Err(DenseError::NotPositiveDefinite { column: j });
        }

        let rjj = pivot.sqrt();
        for i in (j + 1)..n {
            let mut sum = a[[i, j]].clone();
            for k in 0..j {
                sum = (-r[[i, k]].clone()).mul_add(&r[[j, k]], &sum);
            }
            r[[i, j]] = sum / rjj.clone();
        }
        r[[j, j]] = rjj;
    }

    log::debug!("Cholesky ({} tier, n = {}): factorized", T::TIER, n);
    Ok(CholeskyFactorization { r, n })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use math_audio_precision::Decimal;
    use ndarray::array;

    #[test]
    fn test_cholesky_reconstructs() {
        let a = array![[4.0_f64, 12.0, -16.0], [12.0, 37.0, -43.0], [-16.0, -43.0, 98.0]];
        let f = cholesky_factorize(&a).expect("SPD");

        // Known factor
        let expected = array![[2.0_f64, 0.0, 0.0], [6.0, 1.0, 0.0], [-8.0, 5.0, 3.0]];
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(f.r[[i, j]], expected[[i, j]], epsilon = 1e-12);
            }
        }

        let rrt = f.r.dot(&f.r.t());
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(rrt[[i, j]], a[[i, j]], epsilon = 1e-10);
            }
        }
        assert_relative_eq!(f.determinant(), 36.0, epsilon = 1e-10);
    }

    #[test]
    fn test_cholesky_not_positive_definite() {
        let a = array![[1.0_f64, 2.0], [2.0, 1.0]];
        assert_eq!(
            cholesky_factorize(&a).unwrap_err(),
            DenseError::NotPositiveDefinite { column: 1 }
        );

        let negative = array![[-1.0_f64, 0.0], [0.0, 1.0]];
        assert_eq!(
            cholesky_factorize(&negative).unwrap_err(),
            DenseError::NotPositiveDefinite { column: 0 }
        );
    }

    #[test]
    fn test_cholesky_semidefinite_fails() {
        // Zero pivot is not strictly positive
        let a = array![[1.0_f64, 1.0], [1.0, 1.0]];
        assert_eq!(
            cholesky_factorize(&a).unwrap_err(),
            DenseError::NotPositiveDefinite { column: 1 }
        );
    }

    #[test]
    fn test_cholesky_decimal() {
        let d = |s: &str| s.parse::<Decimal>().expect("literal");
        let a = array![[d("4"), d("2")], [d("2"), d("5")]];
        let f = cholesky_factorize(&a).expect("SPD");
        assert_eq!(f.r[[0, 0]], d("2"));
        assert_eq!(f.r[[1, 0]], d("1"));
        assert_eq!(f.r[[1, 1]], d("2"));
        assert_eq!(f.determinant(), d("16"));
    }
}
