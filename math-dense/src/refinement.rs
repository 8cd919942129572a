//! Mixed-precision iterative refinement
//!
//! The residual `r = b - A x` is evaluated in [`Scalar::Wider`], with the
//! matrix entries and the candidate solution promoted before the multiply.
//! The correction `A d = r` is solved with the existing factorization at the
//! working precision, added to `x` in the wider tier and rounded back.
//!
//! A candidate is only accepted if its wide residual norm is strictly smaller
//! than the current one, so refinement can stop early but never makes the
//! returned solution worse than the starting point.

use crate::config::RefinementConfig;
use math_audio_precision::Scalar;
use ndarray::{Array1, Array2};

/// Why the refinement loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementStop {
    /// `max_passes` corrections were applied
    PassBudget,
    /// `||d|| / ||x||` reached the tolerance, or the residual is exactly zero
    Converged,
    /// `||d|| / ||x||` did not shrink compared to the previous pass
    Stalled,
    /// The last candidate did not reduce the residual and was discarded
    ResidualIncreased,
}

/// Result of [`refine`]
#[derive(Debug, Clone)]
pub struct RefinedSolution<T: Scalar> {
    /// Refined solution
    pub x: Array1<T>,
    /// Number of accepted corrections
    pub passes: usize,
    /// Residual norm of `x`, see [`residual_norm`]
    pub residual_norm: f64,
    /// Residual norm of the starting point
    pub initial_residual_norm: f64,
    /// Stopping reason
    pub stop: RefinementStop,
}

/// Residual `b - A x` evaluated in the wider tier
pub fn residual<T: Scalar>(a: &Array2<T>, b: &Array1<T>, x: &Array1<T>) -> Array1<T::Wider> {
    let wide_x: Vec<T::Wider> = x.iter().map(|v| v.promote()).collect();
    a.rows()
        .into_iter()
        .zip(b.iter())
        .map(|(row, bi)| {
            row.iter()
                .zip(wide_x.iter())
                .fold(bi.promote(), |acc, (aij, xj)| (-aij.promote()).mul_add(xj, &acc))
        })
        .collect()
}

/// Euclidean norm of `b - A x`, evaluated in the wider tier and reported as `f64`
pub fn residual_norm<T: Scalar>(a: &Array2<T>, b: &Array1<T>, x: &Array1<T>) -> f64 {
    norm_from_squares(&sum_of_squares(&residual(a, b, x)))
}

fn sum_of_squares<W: Scalar>(v: &Array1<W>) -> W {
    v.iter().fold(W::zero(), |acc, r| r.mul_add(r, &acc))
}

fn norm_from_squares<W: Scalar>(sum: &W) -> f64 {
    sum.to_f64().sqrt()
}

fn norm_f64<T: Scalar>(v: &Array1<T>) -> f64 {
    v.iter()
        .map(|x| {
            let x = x.to_f64();
            x * x
        })
        .sum::<f64>()
        .sqrt()
}

/// Refine `x0` as a solution of `A x = b`.
///
/// `solve` applies the already computed factorization of `A` to a working
/// precision right-hand side; it is called once per pass and never
/// refactors. The loop runs at most `config.max_passes` times and stops
/// early when:
/// - the residual is exactly zero, or `||d|| / ||x|| <= config.tolerance`
///   ([`RefinementStop::Converged`])
/// - `||d|| / ||x||` fails to shrink ([`RefinementStop::Stalled`])
/// - the corrected candidate does not strictly reduce the wide residual norm
///   ([`RefinementStop::ResidualIncreased`]); the candidate is discarded
pub fn refine<T, S>(
    a: &Array2<T>,
    b: &Array1<T>,
    x0: Array1<T>,
    solve: S,
    config: &RefinementConfig,
) -> RefinedSolution<T>
where
    T: Scalar,
    S: Fn(&Array1<T>) -> Array1<T>,
{
    let mut x = x0;
    let mut r = residual(a, b, &x);
    let mut r_sq = sum_of_squares(&r);
    let initial_residual_norm = norm_from_squares(&r_sq);

    let mut passes = 0;
    let mut previous_ratio = f64::INFINITY;
    let mut stop = RefinementStop::PassBudget;

    for pass in 1..=config.max_passes {
        if r_sq.is_zero() {
            stop = RefinementStop::Converged;
            break;
        }

        let r_work: Array1<T> = r.iter().map(T::demote).collect();
        let delta = solve(&r_work);

        let candidate: Array1<T> = x
            .iter()
            .zip(delta.iter())
            .map(|(xi, di)| T::demote(&(xi.promote() + di.promote())))
            .collect();
        let candidate_r = residual(a, b, &candidate);
        let candidate_sq = sum_of_squares(&candidate_r);

        if !(candidate_sq < r_sq) {
            log::trace!(
                "refinement pass {}: residual {:e} -> {:e}, candidate discarded",
                pass,
                norm_from_squares(&r_sq),
                norm_from_squares(&candidate_sq)
            );
            stop = RefinementStop::ResidualIncreased;
            break;
        }

        x = candidate;
        r = candidate_r;
        r_sq = candidate_sq;
        passes = pass;

        let x_norm = norm_f64(&x);
        let delta_norm = norm_f64(&delta);
        let ratio = if x_norm > 0.0 {
            delta_norm / x_norm
        } else {
            delta_norm
        };

        log::trace!(
            "refinement pass {}: residual {:e}, |d|/|x| = {:e}",
            pass,
            norm_from_squares(&r_sq),
            ratio
        );
        if config.print_interval > 0 && pass % config.print_interval == 0 {
            log::info!(
                "Refinement pass {}: residual = {:.6e}, |d|/|x| = {:.6e}",
                pass,
                norm_from_squares(&r_sq),
                ratio
            );
        }

        if ratio <= config.tolerance {
            stop = RefinementStop::Converged;
            break;
        }
        if ratio >= previous_ratio {
            stop = RefinementStop::Stalled;
            break;
        }
        previous_ratio = ratio;
    }

    RefinedSolution {
        x,
        passes,
        residual_norm: norm_from_squares(&r_sq),
        initial_residual_norm,
        stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direct::{Factorization, lu_factorize};
    use crate::pivot::PivotPolicy;
    use math_audio_precision::{Decimal, Extended};
    use ndarray::array;

    #[test]
    fn test_residual_is_exact_for_f64_products() {
        // 0.1 * 3 is not representable, but the product of the two doubles is
        // exact in the extended tier
        let a = array![[0.1_f64]];
        let b = array![0.3_f64];
        let x = array![3.0_f64];
        let r = residual(&a, &b, &x);
        assert_eq!(f64::from(r[0]), -(2.0_f64).powi(-55));

        let machine = 0.3_f64 - 0.1 * 3.0;
        assert!(machine != f64::from(r[0]));
        assert!(r[0] != Extended::from(machine));
    }

    #[test]
    fn test_residual_norm_zero_for_exact_solution() {
        let a = array![[2.0_f64, 0.0], [0.0, 4.0]];
        let b = array![2.0_f64, 8.0];
        let x = array![1.0_f64, 2.0];
        assert_eq!(residual_norm(&a, &b, &x), 0.0);
    }

    #[test]
    fn test_refine_recovers_from_perturbed_start() {
        let a = array![[4.0_f64, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let b = array![5.0_f64, 5.0, 3.0]; // x = [1, 1, 1]
        let lu = lu_factorize(&a, &PivotPolicy::default()).expect("nonsingular");
        let x0 = array![1.001_f64, 0.999, 1.002];

        let refined = refine(&a, &b, x0, |r| lu.solve_vector(r), &RefinementConfig::default());
        assert_eq!(refined.passes, 1);
        assert_eq!(refined.stop, RefinementStop::PassBudget);
        assert!(refined.residual_norm < refined.initial_residual_norm * 1e-6);
        for xi in refined.x.iter() {
            assert!((xi - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_refine_until_converged() {
        let a = array![[4.0_f64, 1.0], [1.0, 3.0]];
        let b = array![1.0_f64, 2.0];
        let lu = lu_factorize(&a, &PivotPolicy::default()).expect("nonsingular");
        let x0 = array![0.5_f64, 0.5];

        let config = RefinementConfig::until_converged(50, 1e-12);
        let refined = refine(&a, &b, x0, |r| lu.solve_vector(r), &config);
        assert!(refined.passes >= 1);
        assert!(refined.passes < 50);
        assert_ne!(refined.stop, RefinementStop::PassBudget);
        assert!(refined.residual_norm <= refined.initial_residual_norm);
    }

    #[test]
    fn test_refine_rejects_worse_candidate() {
        let a = array![[1.0_f64, 0.0], [0.0, 1.0]];
        let b = array![1.0_f64, 1.0];
        let x0 = array![1.0_f64, 0.5];

        // A correction that overshoots makes the residual larger
        let refined = refine(
            &a,
            &b,
            x0.clone(),
            |r| r.mapv(|v| v * 3.0),
            &RefinementConfig::until_converged(5, 0.0),
        );
        assert_eq!(refined.stop, RefinementStop::ResidualIncreased);
        assert_eq!(refined.passes, 0);
        assert_eq!(refined.x, x0);
        assert_eq!(refined.residual_norm, refined.initial_residual_norm);
    }

    #[test]
    fn test_refine_exact_start_converges_immediately() {
        let d = |s: &str| s.parse::<Decimal>().expect("literal");
        let a = array![[d("2"), d("1")], [d("1"), d("3")]];
        let b = array![d("3"), d("4")];
        let x0 = array![d("1"), d("1")];

        let refined = refine(&a, &b, x0, |r| r.clone(), &RefinementConfig::default());
        assert_eq!(refined.stop, RefinementStop::Converged);
        assert_eq!(refined.passes, 0);
        assert_eq!(refined.residual_norm, 0.0);
    }

    #[test]
    fn test_zero_pass_budget_returns_start() {
        let a = array![[2.0_f64]];
        let b = array![1.0_f64];
        let config = RefinementConfig::until_converged(0, 0.0);
        let refined = refine(&a, &b, array![0.4_f64], |r| r / 2.0, &config);
        assert_eq!(refined.passes, 0);
        assert_eq!(refined.stop, RefinementStop::PassBudget);
        assert_eq!(refined.x[0], 0.4);
    }
}
