//! Dense linear solvers with mixed-precision iterative refinement
//!
//! This crate solves square dense systems at several precision tiers and
//! improves solutions by refining them against residuals computed one tier up.
//!
//! # Features
//!
//! - **Direct Solvers**: LU with partial pivoting and optional row scaling,
//!   Cholesky for symmetric positive-definite systems
//! - **Iterative Refinement**: residuals in the wider tier, corrections from the
//!   existing factors
//! - **Derived Quantities**: determinant, inverse, infinity norm, condition number
//! - **Precision Tiers**: `f64`, double-double [`Extended`], 40-digit [`Decimal`]
//! - **Cached Facade**: [`Matrix`] factors lazily and keeps the results per instance
//!
//! Singularity is decided by a [`PivotPolicy`] instead of an exact comparison
//! with zero, together with a running bound on the rounding error of every
//! entry: a pivot that is only rounding noise means the rows are dependent.
//! The default policy otherwise accepts pivots down to the squared machine
//! epsilon, so ill-conditioned systems are still solved and can then be
//! refined.
//!
//! # Example
//!
//! ```
//! use math_audio_dense::{Matrix, Decimal};
//! use ndarray::array;
//!
//! let a = Matrix::new(array![[1.0, 0.99999999], [0.99999999, 0.99999998]]).unwrap();
//! let b = array![1.99999999, 1.99999997];
//!
//! let x = a.solve(&b).unwrap();
//! let refined = a.solve_accurately(&b).unwrap();
//! assert!(a.residual_norm(&b, &refined).unwrap() <= a.residual_norm(&b, &x).unwrap());
//!
//! // The same system in decimal arithmetic is solved exactly
//! let d = |s: &str| s.parse::<Decimal>().unwrap();
//! let exact = Matrix::new(array![[d("1"), d("0.99999999")], [d("0.99999999"), d("0.99999998")]])
//!     .unwrap();
//! let x = exact.solve(&array![d("1.99999999"), d("1.99999997")]).unwrap();
//! assert_eq!(x, array![d("1"), d("1")]);
//! ```

pub mod config;
pub mod derived;
pub mod direct;
pub mod error;
pub mod matrix;
pub mod parallel;
pub mod pivot;
pub mod refinement;
pub mod scaling;
pub mod validate;

// Re-export main types
pub use config::{RefinementConfig, SolverConfig, default_scaling, set_default_scaling};
pub use error::{DenseError, Result};
pub use matrix::{CacheState, Matrix};
pub use pivot::PivotPolicy;
pub use refinement::{RefinedSolution, RefinementStop, refine, residual_norm};

// Re-export direct solvers
pub use direct::{
    CholeskyFactorization, Factorization, LuFactorization, cholesky_factorize, lu_factorize,
    lu_factorize_scaled, lu_solve, solve_columns,
};

// Re-export precision tiers
pub use math_audio_precision::{Decimal, Extended, Scalar, Tier, WideDecimal};
