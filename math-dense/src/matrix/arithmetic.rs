//! Value-changing operations
//!
//! Each returns a new [`Matrix`] with the configuration of `self` and an empty
//! cache. Results are checked for overflow, since the value invariant allows
//! only finite entries.

use super::Matrix;
use crate::error::{DenseError, Result};
use crate::validate;
use math_audio_precision::Scalar;
use ndarray::Array2;

impl<T: Scalar> Matrix<T> {
    fn derive(&self, data: Array2<T>) -> Result<Self> {
        validate::check_finite_matrix("result", &data)?;
        Ok(Self::from_validated(data, self.config))
    }

    fn check_same_size(&self, other: &Matrix<T>) -> Result<()> {
        if other.size() != self.size() {
            return Err(DenseError::DimensionMismatch {
                expected: self.size(),
                got: other.size(),
            });
        }
        Ok(())
    }

    /// Transpose; a pure rearrangement of entries
    pub fn transpose(&self) -> Self {
        Self::from_validated(self.data.t().to_owned(), self.config)
    }

    /// Entrywise sum
    pub fn add(&self, other: &Matrix<T>) -> Result<Self> {
        self.check_same_size(other)?;
        let n = self.size();
        self.derive(Array2::from_shape_fn((n, n), |(i, j)| {
            self.data[[i, j]].clone() + other.data[[i, j]].clone()
        }))
    }

    /// Entrywise difference `self - other`
    pub fn subtract(&self, other: &Matrix<T>) -> Result<Self> {
        self.check_same_size(other)?;
        let n = self.size();
        self.derive(Array2::from_shape_fn((n, n), |(i, j)| {
            self.data[[i, j]].clone() - other.data[[i, j]].clone()
        }))
    }

    /// Matrix product `self * other`
    pub fn multiply(&self, other: &Matrix<T>) -> Result<Self> {
        self.check_same_size(other)?;
        let n = self.size();
        self.derive(Array2::from_shape_fn((n, n), |(i, j)| {
            (0..n).fold(T::zero(), |acc, k| {
                self.data[[i, k]].mul_add(&other.data[[k, j]], &acc)
            })
        }))
    }

    /// Scalar multiple
    pub fn scale(&self, factor: T) -> Result<Self> {
        validate::check_scalar("factor", &factor)?;
        self.derive(self.data.map(|v| v.clone() * factor.clone()))
    }
}
