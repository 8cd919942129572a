//! Solver configuration
//!
//! Row scaling is decided once per matrix, at construction time. Unless a
//! matrix is built with an explicit [`SolverConfig`], it takes the
//! process-wide default set through [`set_default_scaling`].

use crate::pivot::PivotPolicy;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide default for row scaling
static DEFAULT_SCALING: AtomicBool = AtomicBool::new(false);

/// Set the row-scaling default read by matrices constructed from now on.
///
/// Existing matrices keep the setting they were built with.
pub fn set_default_scaling(enabled: bool) {
    DEFAULT_SCALING.store(enabled, Ordering::Relaxed);
}

/// Current process-wide row-scaling default (initially `false`)
pub fn default_scaling() -> bool {
    DEFAULT_SCALING.load(Ordering::Relaxed)
}

/// Iterative refinement configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefinementConfig {
    /// Maximum number of correction passes
    pub max_passes: usize,
    /// Stop once ||delta|| / ||x|| falls to this value (0 = only on stall or budget)
    pub tolerance: f64,
    /// Log progress every N passes (0 = no output)
    pub print_interval: usize,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_passes: 1,
            tolerance: 0.0,
            print_interval: 0,
        }
    }
}

impl RefinementConfig {
    /// Exactly one correction pass
    pub fn single_pass() -> Self {
        Self::default()
    }

    /// Iterate until the relative correction drops to `tolerance`, stalls,
    /// or `max_passes` is reached
    pub fn until_converged(max_passes: usize, tolerance: f64) -> Self {
        Self {
            max_passes,
            tolerance,
            print_interval: 0,
        }
    }
}

/// Per-matrix solver configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Equilibrate rows before decomposition
    pub scaling: bool,
    /// Singularity threshold used by LU
    #[cfg_attr(feature = "serde", serde(default))]
    pub pivot_policy: PivotPolicy,
    /// Refinement used by the `*_accurately` operations
    #[cfg_attr(feature = "serde", serde(default))]
    pub refinement: RefinementConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            scaling: default_scaling(),
            pivot_policy: PivotPolicy::default(),
            refinement: RefinementConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Override row scaling
    pub fn with_scaling(mut self, scaling: bool) -> Self {
        self.scaling = scaling;
        self
    }

    /// Override the pivot policy
    pub fn with_pivot_policy(mut self, pivot_policy: PivotPolicy) -> Self {
        self.pivot_policy = pivot_policy;
        self
    }

    /// Override the refinement settings
    pub fn with_refinement(mut self, refinement: RefinementConfig) -> Self {
        self.refinement = refinement;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refinement_defaults() {
        let config = RefinementConfig::default();
        assert_eq!(config.max_passes, 1);
        assert_eq!(config.tolerance, 0.0);
        assert_eq!(config, RefinementConfig::single_pass());

        let iterative = RefinementConfig::until_converged(10, 1e-14);
        assert_eq!(iterative.max_passes, 10);
    }

    #[test]
    fn test_builder_overrides() {
        let config = SolverConfig::default()
            .with_scaling(true)
            .with_pivot_policy(PivotPolicy::Relative(1e-12))
            .with_refinement(RefinementConfig::until_converged(4, 0.0));
        assert!(config.scaling);
        assert_eq!(config.pivot_policy, PivotPolicy::Relative(1e-12));
        assert_eq!(config.refinement.max_passes, 4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_json() {
        let json = r#"{ "scaling": true, "pivot_policy": { "Relative": 1e-10 } }"#;
        let config: SolverConfig = serde_json::from_str(json).expect("valid config");
        assert!(config.scaling);
        assert_eq!(config.pivot_policy, PivotPolicy::Relative(1e-10));
        assert_eq!(config.refinement, RefinementConfig::default());

        let back = serde_json::to_string(&config).expect("serializable");
        let again: SolverConfig = serde_json::from_str(&back).expect("round trip");
        assert_eq!(again, config);
    }
}
