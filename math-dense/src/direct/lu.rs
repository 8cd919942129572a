//! LU decomposition
//!
//! LU factorization with partial pivoting for dense square matrices, generic
//! over the precision tier. Singularity is decided by a [`PivotPolicy`]
//! rather than by comparing pivots against exact zero.

use crate::direct::substitution::Factorization;
use crate::error::{DenseError, Result};
use crate::pivot::{PivotPolicy, row_scales, unit_roundoff};
use math_audio_precision::Scalar;
use ndarray::{Array1, Array2};

/// LU factorization result
///
/// Stores L and U factors along with pivot information such that
/// `P * A = L * U`, where row `i` of `P * A` is row `permutation[i]` of `A`.
#[derive(Debug, Clone)]
pub struct LuFactorization<T: Scalar> {
    /// Combined L and U matrices (L is unit lower triangular, stored below diagonal)
    pub lu: Array2<T>,
    /// Original row index placed at each position
    pub permutation: Vec<usize>,
    /// +1 or -1, flipped on every row swap
    pub sign: i8,
    /// Matrix dimension
    pub n: usize,
}

impl<T: Scalar> LuFactorization<T> {
    /// Solve Ax = b using the pre-computed LU factorization
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>> {
        if b.len() != self.n {
            return Err(DenseError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }
        Ok(self.solve_vector(b))
    }

    /// det(P * A) * sign = product of the U diagonal times the pivot sign
    pub fn determinant(&self) -> T {
        let product = self
            .lu
            .diag()
            .iter()
            .fold(T::one(), |acc, u| acc * u.clone());
        if self.sign < 0 { -product } else { product }
    }

    /// Unit lower triangular factor
    pub fn l(&self) -> Array2<T> {
        Array2::from_shape_fn((self.n, self.n), |(i, j)| match i.cmp(&j) {
            std::cmp::Ordering::Greater => self.lu[[i, j]].clone(),
            std::cmp::Ordering::Equal => T::one(),
            std::cmp::Ordering::Less => T::zero(),
        })
    }

    /// Upper triangular factor
    pub fn u(&self) -> Array2<T> {
        Array2::from_shape_fn((self.n, self.n), |(i, j)| {
            if i <= j {
                self.lu[[i, j]].clone()
            } else {
                T::zero()
            }
        })
    }

    /// Apply the row permutation to a matrix: returns `P * a`
    pub fn permute_rows(&self, a: &Array2<T>) -> Array2<T> {
        Array2::from_shape_fn(a.dim(), |(i, j)| a[[self.permutation[i], j]].clone())
    }
}

/// Compute LU factorization with partial pivoting
///
/// At column `k` the row with the largest magnitude among rows `k..n` becomes
/// the pivot row. The factorization fails with [`DenseError::Singular`] when
/// that largest magnitude is not a usable pivot: it must pass `policy`,
/// relative to the largest entry of its row in `a`, and it must stand clear of
/// the rounding error that elimination has accumulated in it.
///
/// Elimination updates use a fused multiply-add, so an update such as
/// `d - b * c` that cancels to well below the working precision keeps its
/// low-order bits instead of collapsing to zero. When that cancellation is
/// exact the result is a genuine pivot; when it only leaves rounding noise,
/// the column is singular.
pub fn lu_factorize<T: Scalar>(a: &Array2<T>, policy: &PivotPolicy) -> Result<LuFactorization<T>> {
    check_square(a)?;
    let n = a.nrows();
    factorize(a.clone(), Array2::zeros((n, n)), policy)
}

/// LU factorization of `diag(factors) * a`.
///
/// The scaled entries are formed here so that the rounding of each product
/// is known to the pivot test. A product that is exact (for instance a
/// power-of-two factor) contributes no rounding.
pub fn lu_factorize_scaled<T: Scalar>(
    a: &Array2<T>,
    factors: &Array1<T>,
    policy: &PivotPolicy,
) -> Result<LuFactorization<T>> {
    check_square(a)?;
    let n = a.nrows();
    if factors.len() != n {
        return Err(DenseError::DimensionMismatch {
            expected: n,
            got: factors.len(),
        });
    }

    let unit = unit_roundoff::<T>();
    let mut scaled = a.clone();
    let mut rounding = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            let product = a[[i, j]].clone() * factors[i].clone();
            if !a[[i, j]].mul_add(&factors[i], &-product.clone()).is_zero() {
                rounding[[i, j]] = unit * product.abs().to_f64();
            }
            scaled[[i, j]] = product;
        }
    }
    factorize(scaled, rounding, policy)
}

fn check_square<T: Scalar>(a: &Array2<T>) -> Result<()> {
    if a.nrows() != a.ncols() {
        return Err(DenseError::NonSquare {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }
    Ok(())
}

/// Elimination on `lu` in place.
///
/// `rounding[[i, j]]` tracks the standard deviation of the rounding error in
/// `lu[[i, j]]` as an absolute magnitude. Independent contributions are
/// combined in quadrature.
fn factorize<T: Scalar>(
    mut lu: Array2<T>,
    mut rounding: Array2<f64>,
    policy: &PivotPolicy,
) -> Result<LuFactorization<T>> {
    let n = lu.nrows();
    let unit = unit_roundoff::<T>();
    let mut scales = row_scales(&lu);
    let mut permutation: Vec<usize> = (0..n).collect();
    let mut sign: i8 = 1;
    let mut swaps = 0usize;

    for k in 0..n {
        // Find pivot
        let mut max_val = lu[[k, k]].abs();
        let mut max_row = k;

        for i in (k + 1)..n {
            let val = lu[[i, k]].abs();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        let pivot_rounding = rounding[[max_row, k]];
        if !policy.is_usable_pivot(&max_val, &scales[max_row], pivot_rounding) {
            log::debug!(
                "LU ({} tier, n = {}): no usable pivot in column {} (|pivot| = {:e}, rounding = {:e})",
                T::TIER,
                n,
                k,
                max_val.to_f64(),
                pivot_rounding
            );
            return Err(DenseError::Singular { column: k });
        }

        // Swap rows if needed
        if max_row != k {
            for j in 0..n {
                lu.swap([k, j], [max_row, j]);
                rounding.swap([k, j], [max_row, j]);
            }
            scales.swap(k, max_row);
            permutation.swap(k, max_row);
            sign = -sign;
            swaps += 1;
        }

        // Compute multipliers and eliminate
        let pivot = lu[[k, k]].clone();
        let pivot_abs = max_val.to_f64();
        for i in (k + 1)..n {
            if lu[[i, k]].is_zero() && rounding[[i, k]] == 0.0 {
                continue;
            }
            let mult = lu[[i, k]].clone() / pivot.clone();
            let mult_abs = mult.abs().to_f64();
            let mut mult_rounding =
                rounding[[i, k]].hypot(mult_abs * pivot_rounding) / pivot_abs;
            if !mult.mul_add(&pivot, &-lu[[i, k]].clone()).is_zero() {
                mult_rounding = mult_rounding.hypot(unit * mult_abs);
            }

            let neg_mult = -mult.clone();
            for j in (k + 1)..n {
                let updated = neg_mult.mul_add(&lu[[k, j]], &lu[[i, j]]);
                let carried = rounding[[i, j]].hypot(mult_abs * rounding[[k, j]]);
                let fresh = (mult_rounding * lu[[k, j]].abs().to_f64())
                    .hypot(unit * updated.abs().to_f64());
                rounding[[i, j]] = carried.hypot(fresh);
                lu[[i, j]] = updated;
            }
            lu[[i, k]] = mult;
        }
    }

    log::debug!(
        "LU ({} tier, n = {}): factorized with {} row swaps",
        T::TIER,
        n,
        swaps
    );
    Ok(LuFactorization {
        lu,
        permutation,
        sign,
        n,
    })
}

/// Solve Ax = b using LU decomposition
///
/// This is a convenience function that combines factorization and solve.
pub fn lu_solve<T: Scalar>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>> {
    let factorization = lu_factorize(a, &PivotPolicy::default())?;
    factorization.solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use math_audio_precision::{Decimal, Extended};
    use ndarray::array;

    #[test]
    fn test_lu_solve_real() {
        let a = array![[4.0_f64, 1.0], [1.0, 3.0],];

        let b = array![1.0_f64, 2.0];

        let x = lu_solve(&a, &b).expect("LU solve should succeed");

        // Verify: Ax = b
        let ax = a.dot(&x);
        for i in 0..2 {
            assert_relative_eq!(ax[i], b[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lu_identity() {
        let n = 5;
        let a = Array2::from_diag(&Array1::from_elem(n, 1.0_f64));
        let b = Array1::from_iter((1..=n).map(|i| i as f64));

        let x = lu_solve(&a, &b).expect("LU solve should succeed");

        for i in 0..n {
            assert_eq!(x[i], b[i]);
        }
    }

    #[test]
    fn test_lu_singular() {
        let a = array![[1.0_f64, 2.0], [2.0, 4.0],]; // Singular matrix

        let b = array![1.0_f64, 2.0];

        let result = lu_solve(&a, &b);
        assert_eq!(result.unwrap_err(), DenseError::Singular { column: 1 });
    }

    #[test]
    fn test_lu_zero_column_is_singular() {
        let a = array![[0.0_f64, 1.0], [0.0, 2.0]];
        let result = lu_factorize(&a, &PivotPolicy::default());
        assert_eq!(result.unwrap_err(), DenseError::Singular { column: 0 });
    }

    #[test]
    fn test_lu_non_square() {
        let a = Array2::<f64>::zeros((2, 3));
        let result = lu_factorize(&a, &PivotPolicy::default());
        assert_eq!(
            result.unwrap_err(),
            DenseError::NonSquare { rows: 2, cols: 3 }
        );
    }

    #[test]
    fn test_lu_reconstructs_permuted_matrix() {
        let a = array![[1.0_f64, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 10.0]];
        let f = lu_factorize(&a, &PivotPolicy::default()).expect("nonsingular");

        // First pivot is the largest entry of column 0
        assert_eq!(f.permutation[0], 2);

        let pa = f.permute_rows(&a);
        let lu = f.l().dot(&f.u());
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(lu[[i, j]], pa[[i, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_lu_determinant_sign() {
        let a = array![[1.0_f64, 2.0], [3.0, 4.0]];
        let f = lu_factorize(&a, &PivotPolicy::default()).expect("nonsingular");
        assert_eq!(f.sign, -1);
        assert_eq!(f.permutation, vec![1, 0]);
        assert_relative_eq!(f.determinant(), -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lu_tiny_pivot_policy() {
        // The second pivot is d - b*c ~ 1.1e-17, which plain multiply-subtract
        // rounds to zero
        let a = array![[1.0_f64, 0.99999999], [0.99999999, 0.99999998]];

        let f = lu_factorize(&a, &PivotPolicy::default()).expect("tiny pivot is usable");
        assert!(f.lu[[1, 1]] > 0.0 && f.lu[[1, 1]] < 1e-16);

        let strict = lu_factorize(&a, &PivotPolicy::Relative(1e-12));
        assert_eq!(strict.unwrap_err(), DenseError::Singular { column: 1 });
    }

    #[test]
    fn test_lu_dependent_rows_are_singular() {
        // Third row is 2 * row2 - row1; elimination leaves only rounding noise
        let a = array![[1.0_f64, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let result = lu_factorize(&a, &PivotPolicy::default());
        assert_eq!(result.unwrap_err(), DenseError::Singular { column: 2 });

        let tenths = array![[0.1_f64, 0.2, 0.3], [0.4, 0.5, 0.6], [0.7, 0.8, 0.9]];
        let result = lu_factorize(&tenths, &PivotPolicy::default());
        assert!(matches!(result, Err(DenseError::Singular { .. })));

        let factors = crate::scaling::compute_scaling(&tenths);
        let result = lu_factorize_scaled(&tenths, &factors, &PivotPolicy::default());
        assert!(matches!(result, Err(DenseError::Singular { .. })));
    }

    #[test]
    fn test_lu_factorize_scaled() {
        let a = array![[4.0_f64, 7.0], [2.0, 600.0]];
        let factors = crate::scaling::compute_scaling(&a);
        let f = lu_factorize_scaled(&a, &factors, &PivotPolicy::default()).expect("nonsingular");

        let mut scaled = a.clone();
        crate::scaling::apply_scaling(&mut scaled, &factors);
        let g = lu_factorize(&scaled, &PivotPolicy::default()).expect("nonsingular");
        assert_eq!(f.lu, g.lu);
        assert_eq!(f.permutation, g.permutation);

        let short = array![1.0_f64];
        assert!(matches!(
            lu_factorize_scaled(&a, &short, &PivotPolicy::default()),
            Err(DenseError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_lu_solve_multiple_rhs() {
        let a = array![[4.0_f64, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0],];

        let factorization =
            lu_factorize(&a, &PivotPolicy::default()).expect("Factorization should succeed");

        let b1 = array![1.0_f64, 2.0, 3.0];
        let x1 = factorization.solve(&b1).expect("Solve should succeed");
        let ax1 = a.dot(&x1);
        for i in 0..3 {
            assert_relative_eq!(ax1[i], b1[i], epsilon = 1e-12);
        }

        let b2 = array![4.0_f64, 5.0];
        assert!(matches!(
            factorization.solve(&b2),
            Err(DenseError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn test_lu_extended_tier() {
        let a = array![[4.0_f64, 1.0], [1.0, 3.0]].mapv(Extended::from);
        let b = array![1.0_f64, 2.0].mapv(Extended::from);

        let x = lu_solve(&a, &b).expect("LU solve should succeed");

        // x = [1/11, 7/11]
        let expected = Extended::from(1.0) / Extended::from(11.0);
        let err = (x[0] - expected).abs().to_f64();
        assert!(err < 1e-31, "error {err:e}");
    }

    #[test]
    fn test_lu_decimal_tier() {
        let d = |s: &str| s.parse::<Decimal>().expect("literal");
        let a = array![[d("2"), d("1")], [d("1"), d("3")]];
        let b = array![d("3"), d("4")];

        let x = lu_solve(&a, &b).expect("LU solve should succeed");

        assert_eq!(x[0], d("1"));
        assert_eq!(x[1], d("1"));
    }
}
