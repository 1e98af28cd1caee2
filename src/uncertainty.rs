//! Monte Carlo uncertainty propagation: sample each basic event's
//! probability distribution, evaluate the top event for each trial, and
//! report the resulting mean/variance/confidence interval.
//!
//! Trials are batched and evaluated in parallel with `rayon`. Each batch
//! accumulates its own mean/variance via Welford's online algorithm, then
//! batches are combined with Chan et al.'s parallel merge formula so the
//! result is identical regardless of how trials were partitioned.

use crate::bdd::{BddEdge, BddManager};
use crate::cancellation::Checkpoint;
use crate::error::Result;
use crate::model::{BasicEvent, ProbabilityExpression};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// A running mean/variance accumulator (Welford's algorithm), mergeable
/// across independently-accumulated batches.
#[derive(Debug, Clone, Copy, Default)]
struct MomentAccumulator {
    count: u64,
    mean: f64,
    m2: f64,
}

impl MomentAccumulator {
    fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    /// Chan, Golub & LeVeque's parallel combination of two moment
    /// accumulators into the moments of their concatenation.
    fn merge(self, other: Self) -> Self {
        if self.count == 0 {
            return other;
        }
        if other.count == 0 {
            return self;
        }
        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let mean = self.mean + delta * other.count as f64 / count as f64;
        let m2 = self.m2
            + other.m2
            + delta * delta * (self.count as f64) * (other.count as f64) / count as f64;
        MomentAccumulator { count, mean, m2 }
    }

    fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }
}

/// Summary statistics over the sampled top-event probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyResult {
    pub mean: f64,
    pub std_dev: f64,
    /// 95% confidence interval (normal approximation around the mean).
    pub confidence_interval: (f64, f64),
    pub trials: u64,
}

const BATCH_SIZE: u64 = 1_000;

/// Run `trials` Monte Carlo samples of the top-event probability. For each
/// trial, every basic event's [`ProbabilityExpression`] is sampled at
/// mission time `t`, and `evaluate` computes the top-event probability (or
/// indicator) for that sample's fixed probabilities.
///
/// `seed` makes the run reproducible: each batch derives its own
/// sub-sequence from it, so results do not depend on how many threads ran
/// the batches.
///
/// `checkpoint` is checked once per batch (not once per trial, to keep the
/// per-check overhead negligible against `BATCH_SIZE` trials' worth of
/// work), so a long Monte Carlo run can still be cancelled or time out
/// between batches regardless of how `rayon` schedules them.
pub fn propagate(
    basic_events: &[BasicEvent],
    t: f64,
    trials: u64,
    seed: u64,
    checkpoint: &Checkpoint,
    evaluate: impl Fn(&FxHashMap<String, f64>) -> f64 + Sync,
) -> Result<UncertaintyResult> {
    let batches = trials.div_ceil(BATCH_SIZE);
    let accumulator: MomentAccumulator = (0..batches)
        .into_par_iter()
        .map(|batch_index| {
            checkpoint.check()?;
            let mut rng = ChaCha8Rng::seed_from_u64(seed ^ batch_index);
            let start = batch_index * BATCH_SIZE;
            let end = (start + BATCH_SIZE).min(trials);
            let mut local = MomentAccumulator::default();
            for _ in start..end {
                let mut sample = FxHashMap::default();
                for event in basic_events {
                    sample.insert(event.id.clone(), event.probability.sample(t, &mut rng));
                }
                local.push(evaluate(&sample));
            }
            Ok(local)
        })
        .try_reduce(MomentAccumulator::default, |a, b| Ok(a.merge(b)))?;

    let std_dev = accumulator.variance().sqrt();
    let half_width = 1.96 * std_dev / (accumulator.count.max(1) as f64).sqrt();
    Ok(UncertaintyResult {
        mean: accumulator.mean,
        std_dev,
        confidence_interval: (accumulator.mean - half_width, accumulator.mean + half_width),
        trials: accumulator.count,
    })
}

/// Evaluate a probability against a compiled BDD: the common `evaluate`
/// closure for [`propagate`] when mission-time sampling is disabled
/// (`t = 0` cases collapse each [`ProbabilityExpression`] to its constant).
pub fn bdd_evaluator<'a>(
    mgr: &'a BddManager,
    root: BddEdge,
) -> impl Fn(&FxHashMap<String, f64>) -> f64 + 'a {
    move |sample| mgr.probability(root, sample)
}
