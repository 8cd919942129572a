//! Input validation at the API boundary
//!
//! Every check runs before any computation, so a rejected call leaves the
//! matrix and its cache untouched.

use crate::error::{DenseError, Result};
use math_audio_precision::Scalar;
use ndarray::{Array1, Array2};

/// Square, non-empty and finite
pub fn check_matrix<T: Scalar>(argument: &'static str, a: &Array2<T>) -> Result<()> {
    if a.is_empty() {
        return Err(DenseError::NullArgument { argument });
    }
    if a.nrows() != a.ncols() {
        return Err(DenseError::NonSquare {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }
    check_finite_matrix(argument, a)
}

/// First non-finite entry, in row-major order
pub fn check_finite_matrix<T: Scalar>(argument: &'static str, a: &Array2<T>) -> Result<()> {
    match a.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), _)) => Err(DenseError::NonFinite { argument, row, col }),
        None => Ok(()),
    }
}

/// A right-hand side vector for a system of order `n`
pub fn check_rhs_vector<T: Scalar>(n: usize, b: &Array1<T>) -> Result<()> {
    check_vector("rhs", n, b)
}

/// A vector of length `n` with finite entries
pub fn check_vector<T: Scalar>(argument: &'static str, n: usize, b: &Array1<T>) -> Result<()> {
    if b.is_empty() {
        return Err(DenseError::NullArgument { argument });
    }
    if b.len() != n {
        return Err(DenseError::DimensionMismatch {
            expected: n,
            got: b.len(),
        });
    }
    match b.iter().position(|v| !v.is_finite()) {
        Some(row) => Err(DenseError::NonFinite {
            argument,
            row,
            col: 0,
        }),
        None => Ok(()),
    }
}

/// A right-hand side matrix with `n` rows and at least one column
pub fn check_rhs_matrix<T: Scalar>(n: usize, b: &Array2<T>) -> Result<()> {
    if b.is_empty() {
        return Err(DenseError::NullArgument { argument: "rhs" });
    }
    if b.nrows() != n {
        return Err(DenseError::DimensionMismatch {
            expected: n,
            got: b.nrows(),
        });
    }
    check_finite_matrix("rhs", b)
}

/// Row-major `f64` input, checked before conversion to a tier
pub fn check_rows(rows: &[Vec<f64>]) -> Result<()> {
    let n = rows.len();
    if n == 0 {
        return Err(DenseError::NullArgument { argument: "matrix" });
    }
    for (row, values) in rows.iter().enumerate() {
        if values.len() != n {
            return Err(DenseError::NonSquare {
                rows: n,
                cols: values.len(),
            });
        }
        if let Some(col) = values.iter().position(|v| !v.is_finite()) {
            return Err(DenseError::NonFinite {
                argument: "matrix",
                row,
                col,
            });
        }
    }
    Ok(())
}

/// A finite scalar operand
pub fn check_scalar<T: Scalar>(argument: &'static str, value: &T) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DenseError::NonFinite {
            argument,
            row: 0,
            col: 0,
        })
    }
}
