//! Error types for dense decompositions and solves.
//!
//! Validation failures are raised at the API boundary before any computation
//! starts. Numerical failures (`Singular`, `NotPositiveDefinite`) come out of
//! the decompositions and are cached alongside them.

use thiserror::Error;

/// Errors that can occur in dense decompositions and solves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenseError {
    /// A required input is empty.
    #[error("missing input: {argument} is empty")]
    NullArgument {
        /// Name of the missing input
        argument: &'static str,
    },

    /// An input holds NaN or an infinity.
    #[error("non-finite value in {argument} at ({row}, {col})")]
    NonFinite {
        /// Name of the offending input
        argument: &'static str,
        /// Row of the first non-finite entry
        row: usize,
        /// Column of the first non-finite entry (0 for vectors)
        col: usize,
    },

    /// Operand size does not match the matrix size.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected size
        expected: usize,
        /// Actual size provided
        got: usize,
    },

    /// A rectangular array was given where a square one is required.
    #[error("matrix is not square: {rows}x{cols}")]
    NonSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// LU found no usable pivot in a column.
    #[error("matrix is singular: no usable pivot in column {column}")]
    Singular {
        /// Column where elimination stopped
        column: usize,
    },

    /// Cholesky met a diagonal pivot that is not strictly positive.
    #[error("matrix is not positive definite: pivot {column} is not strictly positive")]
    NotPositiveDefinite {
        /// Column of the failing pivot
        column: usize,
    },
}

/// A specialized `Result` type for dense solver operations.
pub type Result<T> = std::result::Result<T, DenseError>;

impl DenseError {
    /// Returns `true` if this error was raised by input validation.
    ///
    /// This includes `NullArgument`, `NonFinite`, `DimensionMismatch`
    /// and `NonSquare`.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            DenseError::NullArgument { .. }
                | DenseError::NonFinite { .. }
                | DenseError::DimensionMismatch { .. }
                | DenseError::NonSquare { .. }
        )
    }

    /// Returns `true` if this error was raised by a decomposition.
    pub fn is_numerical_error(&self) -> bool {
        matches!(
            self,
            DenseError::Singular { .. } | DenseError::NotPositiveDefinite { .. }
        )
    }

    /// Returns `true` if this is a shape error (`DimensionMismatch` or `NonSquare`).
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            DenseError::DimensionMismatch { .. } | DenseError::NonSquare { .. }
        )
    }
}
