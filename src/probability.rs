//! Top-event probability calculation strategies and the time-dependent
//! mission-time iterator.

use crate::bdd::{BddEdge, BddManager};
use crate::error::{EngineError, LogicError, Result};
use crate::model::EventId;
use crate::zbdd::{self, ZNodeId, ZbddManager};
use rustc_hash::FxHashMap;

/// Which approximation (if any) to use for top-event probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbabilityMethod {
    /// Exact probability via the BDD's post-order evaluation.
    Exact,
    /// Sum of cut-set probabilities (rare-event approximation); can exceed 1.
    RareEvent,
    /// Minimal cut set upper bound.
    Mcub,
}

impl Default for ProbabilityMethod {
    fn default() -> Self {
        ProbabilityMethod::Exact
    }
}

fn missing_diagram(method: ProbabilityMethod) -> EngineError {
    LogicError::InvariantViolated {
        description: format!("{method:?} probability requires a diagram that was not built"),
    }
    .into()
}

/// Compute top-event probability with the chosen method. `bdd` is required
/// for [`ProbabilityMethod::Exact`]; `zbdd` for the two approximations.
pub fn calculate(
    method: ProbabilityMethod,
    bdd: Option<(&BddManager, BddEdge)>,
    zbdd_family: Option<(&ZbddManager, ZNodeId)>,
    probabilities: &FxHashMap<EventId, f64>,
) -> Result<f64> {
    match method {
        ProbabilityMethod::Exact => {
            let (mgr, root) = bdd.ok_or_else(|| missing_diagram(method))?;
            Ok(mgr.probability(root, probabilities))
        }
        ProbabilityMethod::RareEvent => {
            let (mgr, root) = zbdd_family.ok_or_else(|| missing_diagram(method))?;
            Ok(zbdd::rare_event_probability(mgr, root, probabilities))
        }
        ProbabilityMethod::Mcub => {
            let (mgr, root) = zbdd_family.ok_or_else(|| missing_diagram(method))?;
            Ok(zbdd::mcub_probability(mgr, root, probabilities))
        }
    }
}

/// A uniformly-spaced mission-time sweep: `steps + 1` samples from `start`
/// to `end` inclusive.
#[derive(Debug, Clone, Copy)]
pub struct MissionProfile {
    pub start: f64,
    pub end: f64,
    pub steps: usize,
}

impl MissionProfile {
    /// The time at sample index `i` (`0..=steps`).
    pub fn sample_time(&self, i: usize) -> f64 {
        if self.steps == 0 {
            return self.start;
        }
        self.start + (self.end - self.start) * (i as f64 / self.steps as f64)
    }
}

/// Evaluate `probability_at` once per sample in `profile`, returning the
/// `(time, probability)` series. `probability_at` is expected to rebuild
/// each basic event's probability at `t` (via its
/// [`crate::model::ProbabilityExpression`]) and recompute the diagram-level
/// probability for that snapshot — this function only owns the sweep.
pub fn time_dependent_series(
    profile: &MissionProfile,
    mut probability_at: impl FnMut(f64) -> Result<f64>,
) -> Result<Vec<(f64, f64)>> {
    let mut series = Vec::with_capacity(profile.steps + 1);
    for i in 0..=profile.steps {
        let t = profile.sample_time(i);
        series.push((t, probability_at(t)?));
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mission_profile_samples_are_evenly_spaced() {
        let profile = MissionProfile { start: 0.0, end: 10.0, steps: 4 };
        assert_eq!(profile.sample_time(0), 0.0);
        assert_eq!(profile.sample_time(4), 10.0);
        assert!((profile.sample_time(2) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn time_dependent_series_has_steps_plus_one_samples() {
        let profile = MissionProfile { start: 0.0, end: 1.0, steps: 3 };
        let series = time_dependent_series(&profile, |t| Ok(t * 2.0)).unwrap();
        assert_eq!(series.len(), 4);
        assert!((series[3].1 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn missing_diagram_is_reported_as_logic_error() {
        let probs = FxHashMap::default();
        let result = calculate(ProbabilityMethod::Exact, None, None, &probs);
        assert!(matches!(result, Err(EngineError::Logic(_))));
    }
}
