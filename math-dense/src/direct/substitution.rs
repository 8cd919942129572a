//! Forward and back substitution against a computed factorization
//!
//! Substitution is a pure function of the factors; right-hand-side matrices
//! are solved column by column (in parallel with the `rayon` feature).

use crate::direct::{CholeskyFactorization, LuFactorization};
use crate::parallel::parallel_map_indexed;
use math_audio_precision::Scalar;
use ndarray::{Array1, Array2};

/// A factorization that can solve `A x = b` by substitution.
///
/// Callers are responsible for passing a right-hand side of length [`dim`];
/// the checked entry points live on the factorization types and on
/// [`crate::Matrix`].
///
/// [`dim`]: Factorization::dim
pub trait Factorization<T: Scalar>: Send + Sync {
    /// Order of the factored matrix
    fn dim(&self) -> usize;

    /// Solve for a single right-hand side
    fn solve_vector(&self, b: &Array1<T>) -> Array1<T>;
}

impl<T: Scalar> Factorization<T> for LuFactorization<T> {
    fn dim(&self) -> usize {
        self.n
    }

    fn solve_vector(&self, b: &Array1<T>) -> Array1<T> {
        let n = self.n;

        // Apply row permutation: y = P b
        let mut x: Array1<T> = self.permutation.iter().map(|&p| b[p].clone()).collect();

        // Forward substitution: L y = P b
        for i in 0..n {
            for j in 0..i {
                x[i] = (-self.lu[[i, j]].clone()).mul_add(&x[j], &x[i]);
            }
        }

        // Backward substitution: U x = y
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                x[i] = (-self.lu[[i, j]].clone()).mul_add(&x[j], &x[i]);
            }
            x[i] = x[i].clone() / self.lu[[i, i]].clone();
        }

        x
    }
}

impl<T: Scalar> Factorization<T> for CholeskyFactorization<T> {
    fn dim(&self) -> usize {
        self.n
    }

    fn solve_vector(&self, b: &Array1<T>) -> Array1<T> {
        let n = self.n;
        let r = &self.r;
        let mut x = b.clone();

        // Forward substitution: R y = b
        for i in 0..n {
            for j in 0..i {
                x[i] = (-r[[i, j]].clone()).mul_add(&x[j], &x[i]);
            }
            x[i] = x[i].clone() / r[[i, i]].clone();
        }

        // Backward substitution: R^T x = y
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                x[i] = (-r[[j, i]].clone()).mul_add(&x[j], &x[i]);
            }
            x[i] = x[i].clone() / r[[i, i]].clone();
        }

        x
    }
}

/// Solve for every column of `b`
pub fn solve_columns<T, F>(factors: &F, b: &Array2<T>) -> Array2<T>
where
    T: Scalar,
    F: Factorization<T>,
{
    let columns = parallel_map_indexed(b.ncols(), |j| {
        factors.solve_vector(&b.column(j).to_owned())
    });
    assemble_columns(b.nrows(), &columns)
}

/// Stack solved columns back into a matrix
pub(crate) fn assemble_columns<T: Scalar>(rows: usize, columns: &[Array1<T>]) -> Array2<T> {
    Array2::from_shape_fn((rows, columns.len()), |(i, j)| columns[j][i].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direct::{cholesky_factorize, lu_factorize};
    use crate::pivot::PivotPolicy;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_lu_substitution_with_permutation() {
        let a = array![[0.0_f64, 2.0, 1.0], [1.0, 1.0, 1.0], [3.0, 0.0, 1.0]];
        let b = array![7.0_f64, 6.0, 6.0]; // x = [1, 2, 3]
        let f = lu_factorize(&a, &PivotPolicy::default()).expect("nonsingular");
        let x = f.solve_vector(&b);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cholesky_substitution() {
        let a = array![[4.0_f64, 2.0], [2.0, 3.0]];
        let b = array![6.0_f64, 5.0]; // x = [1, 1]
        let f = cholesky_factorize(&a).expect("SPD");
        let x = f.solve_vector(&b);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_columns_matches_vector_solves() {
        let a = array![[4.0_f64, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let b = array![[1.0_f64, 4.0], [2.0, 5.0], [3.0, 6.0]];
        let f = lu_factorize(&a, &PivotPolicy::default()).expect("nonsingular");

        let x = solve_columns(&f, &b);
        assert_eq!(x.dim(), (3, 2));
        for j in 0..2 {
            let xj = f.solve_vector(&b.column(j).to_owned());
            for i in 0..3 {
                assert_eq!(x[[i, j]], xj[i]);
            }
        }

        let ax = a.dot(&x);
        for i in 0..3 {
            for j in 0..2 {
                assert_relative_eq!(ax[[i, j]], b[[i, j]], epsilon = 1e-12);
            }
        }
    }
}
