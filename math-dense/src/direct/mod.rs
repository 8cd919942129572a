//! Direct solvers for dense linear systems
//!
//! This module provides direct (non-iterative) solvers:
//! - [`lu_factorize`]: LU decomposition with partial pivoting
//! - [`lu_factorize_scaled`]: the same on a row-scaled matrix
//! - [`cholesky_factorize`]: Cholesky for symmetric positive-definite systems
//! - [`Factorization`] / [`solve_columns`]: substitution against either factor

mod cholesky;
mod lu;
mod substitution;

pub use cholesky::{CholeskyFactorization, cholesky_factorize};
pub use lu::{LuFactorization, lu_factorize, lu_factorize_scaled, lu_solve};
pub use substitution::{Factorization, solve_columns};
pub(crate) use substitution::assemble_columns;
