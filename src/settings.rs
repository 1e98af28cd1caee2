//! Top-level analysis configuration, handed to [`crate::engine::Engine`] at
//! construction.

use crate::preprocess::PreprocessorConfig;
use crate::probability::ProbabilityMethod;

/// All tunable knobs for one analysis run.
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(default)]
pub struct Settings {
    /// Mission time (end of the sweep) in the model's time unit.
    pub mission_time: f64,
    /// Number of intermediate samples for a time-dependent sweep (0 means
    /// a single point evaluation at `mission_time`).
    pub mission_time_steps: usize,
    /// Strategy used for top-event probability.
    pub probability_method: ProbabilityMethod,
    /// Drop cut sets above this order. `None` disables the size cutoff.
    pub cutoff_product_size: Option<usize>,
    /// Drop cut sets below this probability. `None` disables the
    /// probability cutoff.
    pub cutoff_probability: Option<f64>,
    /// Number of Monte Carlo trials for uncertainty propagation; `0`
    /// disables it.
    pub monte_carlo_trials: u64,
    /// Seed for Monte Carlo sampling, for reproducible runs.
    pub monte_carlo_seed: u64,
    /// Number of equal-width buckets the mission window `[0, mission_time]`
    /// is partitioned into for the SIL histogram; `0` disables it.
    pub sil_buckets: usize,
    /// Preprocessor pass configuration.
    pub preprocessor: PreprocessorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mission_time: 1.0,
            mission_time_steps: 0,
            probability_method: ProbabilityMethod::Exact,
            cutoff_product_size: None,
            cutoff_probability: Some(1e-12),
            monte_carlo_trials: 0,
            monte_carlo_seed: 0,
            sil_buckets: 10,
            preprocessor: PreprocessorConfig::default(),
        }
    }
}
