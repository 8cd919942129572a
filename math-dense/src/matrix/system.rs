//! A factored system: the original matrix, its factors and the row scaling
//! the factors were computed with.
//!
//! Holds only shared references to immutable data, so it can be handed to the
//! column-parallel helpers while the owning [`super::Matrix`] keeps its cache
//! cells to itself.

use crate::config::RefinementConfig;
use crate::direct::{Factorization, assemble_columns};
use crate::parallel::parallel_map_indexed;
use crate::refinement::{RefinedSolution, refine};
use crate::scaling::{scale_rhs, scale_rhs_columns};
use math_audio_precision::Scalar;
use ndarray::{Array1, Array2};

pub(crate) struct FactoredSystem<'a, T: Scalar, F: Factorization<T>> {
    pub a: &'a Array2<T>,
    pub factors: &'a F,
    pub scaling: Option<&'a Array1<T>>,
}

impl<T: Scalar, F: Factorization<T>> FactoredSystem<'_, T, F> {
    pub fn solve(&self, b: &Array1<T>) -> Array1<T> {
        match self.scaling {
            Some(s) => self.factors.solve_vector(&scale_rhs(b, s)),
            None => self.factors.solve_vector(b),
        }
    }

    pub fn solve_columns(&self, b: &Array2<T>) -> Array2<T> {
        match self.scaling {
            Some(s) => crate::direct::solve_columns(self.factors, &scale_rhs_columns(b, s)),
            None => crate::direct::solve_columns(self.factors, b),
        }
    }

    pub fn refine(&self, b: &Array1<T>, x0: Array1<T>, config: &RefinementConfig) -> RefinedSolution<T> {
        refine(self.a, b, x0, |r| self.solve(r), config)
    }

    /// Refine every column of `x0` against the matching column of `b`
    pub fn refine_columns(&self, b: &Array2<T>, x0: &Array2<T>, config: &RefinementConfig) -> Array2<T> {
        let columns = parallel_map_indexed(b.ncols(), |j| {
            self.refine(&b.column(j).to_owned(), x0.column(j).to_owned(), config)
                .x
        });
        assemble_columns(b.nrows(), &columns)
    }
}
