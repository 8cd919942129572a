//! Square matrix with cached decompositions
//!
//! A [`Matrix`] owns its value and a cache of everything computed from it:
//! row-scaling factors, the LU and Cholesky factors, the inverse, the
//! determinant and the most recent vector and matrix solutions. The value
//! never changes after construction. Operations that produce a different
//! value (transpose, sums, products, scalar multiples) return a new matrix
//! with an empty cache; the source keeps its own.
//!
//! The cache lives in [`OnceCell`] and [`RefCell`], so a `Matrix` can be moved
//! across threads but not shared between them.

mod arithmetic;
mod system;

use crate::config::SolverConfig;
use crate::derived;
use crate::direct::{
    CholeskyFactorization, LuFactorization, cholesky_factorize, lu_factorize, lu_factorize_scaled,
};
use crate::error::{DenseError, Result};
use crate::refinement::{self, RefinedSolution};
use crate::scaling::compute_scaling;
use crate::validate;
use math_audio_precision::{Decimal, Extended, Scalar};
use ndarray::{Array1, Array2};
use std::cell::{OnceCell, RefCell};
use std::fmt;
use system::FactoredSystem;

/// How much of a matrix's cache has been filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing has been computed yet
    Uninitialized,
    /// A decomposition was attempted (it may have failed)
    Decomposed,
    /// A vector or matrix solution is cached
    Solved,
}

struct Cache<T: Scalar> {
    scaling_factors: OnceCell<Option<Array1<T>>>,
    lu: OnceCell<Result<LuFactorization<T>>>,
    cholesky: OnceCell<Result<CholeskyFactorization<T>>>,
    inverse: OnceCell<Result<Array2<T>>>,
    determinant: OnceCell<T>,
    last_vector_solution: RefCell<Option<Array1<T>>>,
    last_matrix_solution: RefCell<Option<Array2<T>>>,
}

impl<T: Scalar> Cache<T> {
    fn new() -> Self {
        Self {
            scaling_factors: OnceCell::new(),
            lu: OnceCell::new(),
            cholesky: OnceCell::new(),
            inverse: OnceCell::new(),
            determinant: OnceCell::new(),
            last_vector_solution: RefCell::new(None),
            last_matrix_solution: RefCell::new(None),
        }
    }
}

/// Dense square matrix over a precision tier
///
/// # Example
///
/// ```
/// use math_audio_dense::Matrix;
/// use ndarray::array;
///
/// let a = Matrix::new(array![[4.0, 1.0], [1.0, 3.0]]).unwrap();
/// let x = a.solve(&array![1.0, 2.0]).unwrap();
/// assert!((4.0 * x[0] + x[1] - 1.0).abs() < 1e-12);
/// assert!((a.determinant() - 11.0).abs() < 1e-12);
/// ```
pub struct Matrix<T: Scalar = f64> {
    data: Array2<T>,
    config: SolverConfig,
    cache: Cache<T>,
}

impl<T: Scalar> Matrix<T> {
    /// Build a matrix with the process-wide default configuration
    pub fn new(data: Array2<T>) -> Result<Self> {
        Self::with_config(data, SolverConfig::default())
    }

    /// Build a matrix with row scaling explicitly on or off
    pub fn with_scaling(data: Array2<T>, scaling: bool) -> Result<Self> {
        Self::with_config(data, SolverConfig::default().with_scaling(scaling))
    }

    /// Build a matrix with an explicit configuration
    ///
    /// Fails if `data` is empty, not square, or holds a non-finite entry.
    pub fn with_config(data: Array2<T>, config: SolverConfig) -> Result<Self> {
        validate::check_matrix("matrix", &data)?;
        Ok(Self::from_validated(data, config))
    }

    /// Build a matrix from row-major machine doubles
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        validate::check_rows(rows)?;
        let n = rows.len();
        Self::new(Array2::from_shape_fn((n, n), |(i, j)| T::from_f64(rows[i][j])))
    }

    /// Identity matrix of order `n`
    pub fn identity(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(DenseError::NullArgument { argument: "matrix" });
        }
        Ok(Self::from_validated(derived::identity(n), SolverConfig::default()))
    }

    pub(crate) fn from_validated(data: Array2<T>, config: SolverConfig) -> Self {
        Self {
            data,
            config,
            cache: Cache::new(),
        }
    }

    /// Order of the matrix
    pub fn size(&self) -> usize {
        self.data.nrows()
    }

    /// Copy of the entries
    pub fn data(&self) -> Array2<T> {
        self.data.clone()
    }

    /// Entry at `(row, col)`, or `None` out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.data.get((row, col)).cloned()
    }

    /// Whether rows are equilibrated before LU
    pub fn scaling(&self) -> bool {
        self.config.scaling
    }

    /// Configuration fixed at construction
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Row-scaling factors, or `None` when scaling is off
    pub fn scaling_factors(&self) -> Option<Array1<T>> {
        self.factors().cloned()
    }

    /// Most recent vector solution from any solve on this instance
    pub fn last_vector_solution(&self) -> Option<Array1<T>> {
        self.cache.last_vector_solution.borrow().clone()
    }

    /// Most recent matrix solution from any solve on this instance
    pub fn last_matrix_solution(&self) -> Option<Array2<T>> {
        self.cache.last_matrix_solution.borrow().clone()
    }

    /// Which results are currently cached.
    ///
    /// Any stored solution reports [`CacheState::Solved`], even when the
    /// factors alone would say [`CacheState::Decomposed`].
    pub fn cache_state(&self) -> CacheState {
        if self.cache.last_vector_solution.borrow().is_some()
            || self.cache.last_matrix_solution.borrow().is_some()
        {
            CacheState::Solved
        } else if self.cache.lu.get().is_some() || self.cache.cholesky.get().is_some() {
            CacheState::Decomposed
        } else {
            CacheState::Uninitialized
        }
    }

    fn factors(&self) -> Option<&Array1<T>> {
        self.cache
            .scaling_factors
            .get_or_init(|| self.config.scaling.then(|| compute_scaling(&self.data)))
            .as_ref()
    }

    /// LU factors of the (row-scaled) matrix, computed once
    ///
    /// A failure is cached as well and returned on every later call.
    pub fn lu(&self) -> Result<&LuFactorization<T>> {
        self.cache
            .lu
            .get_or_init(|| {
                let result = match self.factors() {
                    Some(factors) => {
                        lu_factorize_scaled(&self.data, factors, &self.config.pivot_policy)
                    }
                    None => lu_factorize(&self.data, &self.config.pivot_policy),
                };
                match &result {
                    Ok(_) => log::debug!(
                        "Matrix: LU of {}x{} {} matrix (scaling {})",
                        self.size(),
                        self.size(),
                        T::TIER,
                        self.config.scaling
                    ),
                    Err(e) => log::debug!("Matrix: LU failed: {}", e),
                }
                result
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Cholesky factor, computed once. Row scaling does not apply.
    ///
    /// The matrix is assumed symmetric; only its lower triangle is read.
    pub fn cholesky(&self) -> Result<&CholeskyFactorization<T>> {
        self.cache
            .cholesky
            .get_or_init(|| cholesky_factorize(&self.data))
            .as_ref()
            .map_err(Clone::clone)
    }

    fn lu_system(&self) -> Result<FactoredSystem<'_, T, LuFactorization<T>>> {
        Ok(FactoredSystem {
            a: &self.data,
            factors: self.lu()?,
            scaling: self.factors(),
        })
    }

    fn cholesky_system(&self) -> Result<FactoredSystem<'_, T, CholeskyFactorization<T>>> {
        Ok(FactoredSystem {
            a: &self.data,
            factors: self.cholesky()?,
            scaling: None,
        })
    }

    fn remember_vector(&self, x: &Array1<T>) {
        *self.cache.last_vector_solution.borrow_mut() = Some(x.clone());
    }

    fn remember_matrix(&self, x: &Array2<T>) {
        *self.cache.last_matrix_solution.borrow_mut() = Some(x.clone());
    }

    /// Solve `A x = b` with one pass of LU substitution
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>> {
        validate::check_rhs_vector(self.size(), b)?;
        let x = self.lu_system()?.solve(b);
        self.remember_vector(&x);
        Ok(x)
    }

    /// Solve `A x = b` and refine the solution in the wider tier
    pub fn solve_accurately(&self, b: &Array1<T>) -> Result<Array1<T>> {
        self.refine(b).map(|refined| refined.x)
    }

    /// Like [`Matrix::solve_accurately`], returning the full refinement report
    pub fn refine(&self, b: &Array1<T>) -> Result<RefinedSolution<T>> {
        validate::check_rhs_vector(self.size(), b)?;
        let system = self.lu_system()?;
        let x0 = system.solve(b);
        let refined = system.refine(b, x0, &self.config.refinement);
        log::debug!(
            "Matrix: refined in {} passes ({:?}), residual {:e} -> {:e}",
            refined.passes,
            refined.stop,
            refined.initial_residual_norm,
            refined.residual_norm
        );
        self.remember_vector(&refined.x);
        Ok(refined)
    }

    /// Solve `A X = B` column by column
    pub fn solve_matrix(&self, b: &Array2<T>) -> Result<Array2<T>> {
        validate::check_rhs_matrix(self.size(), b)?;
        let x = self.lu_system()?.solve_columns(b);
        self.remember_matrix(&x);
        Ok(x)
    }

    /// Solve `A X = B` column by column, refining every column
    pub fn solve_matrix_accurately(&self, b: &Array2<T>) -> Result<Array2<T>> {
        validate::check_rhs_matrix(self.size(), b)?;
        let system = self.lu_system()?;
        let x0 = system.solve_columns(b);
        let x = system.refine_columns(b, &x0, &self.config.refinement);
        self.remember_matrix(&x);
        Ok(x)
    }

    /// Solve `A x = b` through the Cholesky factor
    pub fn solve_spd(&self, b: &Array1<T>) -> Result<Array1<T>> {
        validate::check_rhs_vector(self.size(), b)?;
        let x = self.cholesky_system()?.solve(b);
        self.remember_vector(&x);
        Ok(x)
    }

    /// Solve `A x = b` through the Cholesky factor and refine
    pub fn solve_spd_accurately(&self, b: &Array1<T>) -> Result<Array1<T>> {
        validate::check_rhs_vector(self.size(), b)?;
        let system = self.cholesky_system()?;
        let x0 = system.solve(b);
        let x = system.refine(b, x0, &self.config.refinement).x;
        self.remember_vector(&x);
        Ok(x)
    }

    /// Wide-tier residual norm `||b - A x||_2` of a candidate solution
    pub fn residual_norm(&self, b: &Array1<T>, x: &Array1<T>) -> Result<f64> {
        validate::check_rhs_vector(self.size(), b)?;
        validate::check_vector("solution", self.size(), x)?;
        Ok(refinement::residual_norm(&self.data, b, x))
    }

    fn inverse_array(&self) -> Result<&Array2<T>> {
        self.cache
            .inverse
            .get_or_init(|| {
                let system = self.lu_system()?;
                let inverse = derived::inverse_from(system.factors, system.scaling);
                validate::check_finite_matrix("inverse", &inverse)?;
                Ok(inverse)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Inverse, computed once by solving against the identity
    ///
    /// Leaves the cached solutions of this matrix untouched.
    pub fn inverse(&self) -> Result<Matrix<T>> {
        let inverse = self.inverse_array()?;
        Ok(Matrix::from_validated(inverse.clone(), self.config))
    }

    /// Inverse with every column refined in the wider tier
    pub fn inverse_accurately(&self) -> Result<Matrix<T>> {
        let x0 = self.inverse_array()?;
        let system = self.lu_system()?;
        let inverse = system.refine_columns(&derived::identity(self.size()), x0, &self.config.refinement);
        validate::check_finite_matrix("inverse", &inverse)?;
        Ok(Matrix::from_validated(inverse, self.config))
    }

    /// Determinant, or exactly zero when LU finds no usable pivot
    pub fn determinant(&self) -> T {
        self.cache
            .determinant
            .get_or_init(|| match self.lu() {
                Ok(lu) => derived::determinant_from_lu(lu, self.factors()),
                Err(_) => T::zero(),
            })
            .clone()
    }

    /// Determinant from an LU computed in the wider tier, rounded back
    pub fn determinant_accurately(&self) -> T {
        let wide = self.data.map(|v| v.promote());
        let det = derived::determinant(&wide, &self.config.pivot_policy, self.config.scaling);
        T::demote(&det)
    }

    /// [`Matrix::determinant`] rounded to a machine double
    pub fn determinant_as_f64(&self) -> f64 {
        self.determinant().to_f64()
    }

    /// [`Matrix::determinant`] converted to the extended tier
    pub fn determinant_as_extended(&self) -> Extended {
        self.determinant().to_extended()
    }

    /// [`Matrix::determinant`] converted to the decimal tier.
    ///
    /// The conversion cannot recover digits the working tier did not carry.
    pub fn determinant_as_decimal(&self) -> Decimal {
        self.determinant().to_decimal()
    }

    /// Infinity norm of the unscaled value
    pub fn norm(&self) -> T {
        derived::norm_inf(&self.data)
    }

    /// Condition number in the infinity norm; `+inf` when singular
    pub fn cond(&self) -> f64 {
        derived::cond(&self.data, self.inverse_array())
    }

    /// Same value in the next wider tier, with an empty cache
    pub fn promote(&self) -> Matrix<T::Wider> {
        Matrix::from_validated(self.data.map(|v| v.promote()), self.config)
    }
}

/// Copies the value and configuration; the clone starts with an empty cache.
impl<T: Scalar> Clone for Matrix<T> {
    fn clone(&self) -> Self {
        Self::from_validated(self.data.clone(), self.config)
    }
}

/// Equality of values; configuration and cache are ignored.
impl<T: Scalar> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T: Scalar> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("tier", &T::TIER)
            .field("size", &self.size())
            .field("scaling", &self.config.scaling)
            .field("cache", &self.cache_state())
            .field("data", &self.data)
            .finish()
    }
}
