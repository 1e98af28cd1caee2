//! Probability expressions: pure functions of mission time and an optional sample draw.
//!
//! Every basic event carries one of these. `evaluate` is the deterministic
//! reading used by the exact/rare-event/MCUB probability calculators;
//! `sample` is the stochastic reading used by the uncertainty engine
//! (`crate::uncertainty`) when the expression itself carries parameter
//! uncertainty rather than (or in addition to) mission-time dependence.

use rand::Rng;
use rand_distr::{Distribution, LogNormal, Normal, Uniform as UniformDist};

/// A probability expression carried by a basic event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbabilityExpression {
    /// A fixed probability, independent of mission time.
    Constant(f64),
    /// Exponential failure law: `1 - exp(-lambda * t)`.
    Exponential {
        /// Failure rate.
        lambda: f64,
    },
    /// Four-parameter exponential with a dormant (undetected) failure fraction,
    /// following the periodically-tested standby component model: `lambda` is
    /// the failure rate, `mu` the repair rate, `tau` the test interval and
    /// `gamma` the dormant fraction of failures that go undetected until test.
    FourParameterExponential {
        /// Failure rate.
        lambda: f64,
        /// Repair rate.
        mu: f64,
        /// Test interval.
        tau: f64,
        /// Dormant (undetected) failure fraction, in `[0, 1]`.
        gamma: f64,
    },
    /// Uniform distribution over `[min, max]`; `evaluate` returns the mean.
    Uniform {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Normal distribution; `evaluate` returns the mean.
    Normal {
        /// Mean.
        mean: f64,
        /// Standard deviation.
        std_dev: f64,
    },
    /// Log-normal distribution parameterised by the underlying normal's mean
    /// and standard deviation; `evaluate` returns the distribution's mean.
    LogNormal {
        /// Location parameter (mean of the underlying normal).
        mu: f64,
        /// Scale parameter (std dev of the underlying normal).
        sigma: f64,
    },
    /// Weibull time-to-failure distribution; `evaluate(t)` is the CDF at `t`.
    Weibull {
        /// Scale parameter.
        scale: f64,
        /// Shape parameter.
        shape: f64,
    },
    /// Piecewise-constant probability over mission time, as `(upper_bound, value)`
    /// pairs sorted by `upper_bound`. The last bin's `upper_bound` covers
    /// `[previous, +inf)`.
    Histogram {
        /// Sorted `(upper_bound, value)` bins.
        bins: Vec<(f64, f64)>,
    },
}

impl ProbabilityExpression {
    /// Evaluate this expression deterministically at mission time `t`.
    ///
    /// The result is guaranteed to be clamped into `[0, 1]` at every
    /// evaluation point.
    pub fn evaluate(&self, t: f64) -> f64 {
        let raw = match self {
            ProbabilityExpression::Constant(p) => *p,
            ProbabilityExpression::Exponential { lambda } => 1.0 - (-lambda * t).exp(),
            ProbabilityExpression::FourParameterExponential {
                lambda,
                mu,
                tau: _,
                gamma,
            } => {
                // Mean unavailability of a periodically tested standby component:
                // steady-state average of the detected failure mode plus the
                // dormant-fraction contribution evaluated at the current mission time.
                let detected = (lambda * (1.0 - gamma)) / (lambda * (1.0 - gamma) + mu).max(1e-300)
                    * (1.0 - (-(lambda * (1.0 - gamma) + mu) * t).exp());
                let dormant = 1.0 - (-(lambda * gamma) * t).exp();
                detected + dormant - detected * dormant
            }
            ProbabilityExpression::Uniform { min, max } => (min + max) / 2.0,
            ProbabilityExpression::Normal { mean, .. } => *mean,
            ProbabilityExpression::LogNormal { mu, sigma } => (mu + sigma * sigma / 2.0).exp(),
            ProbabilityExpression::Weibull { scale, shape } => {
                1.0 - (-((t / scale).powf(*shape))).exp()
            }
            ProbabilityExpression::Histogram { bins } => histogram_value(bins, t),
        };
        raw.clamp(0.0, 1.0)
    }

    /// Draw a stochastic sample of this expression at mission time `t`, for
    /// use by the Monte Carlo uncertainty engine. Expressions with no
    /// intrinsic parameter uncertainty (the time-dependent failure laws) fall
    /// back to `evaluate(t)`.
    pub fn sample<R: Rng + ?Sized>(&self, t: f64, rng: &mut R) -> f64 {
        let raw = match self {
            ProbabilityExpression::Uniform { min, max } => {
                let dist = UniformDist::new_inclusive(*min, *max);
                dist.sample(rng)
            }
            ProbabilityExpression::Normal { mean, std_dev } => {
                let dist = Normal::new(*mean, *std_dev)
                    .expect("normal distribution parameters must be finite with std_dev > 0");
                dist.sample(rng)
            }
            ProbabilityExpression::LogNormal { mu, sigma } => {
                let dist = LogNormal::new(*mu, *sigma)
                    .expect("log-normal distribution parameters must be finite with sigma > 0");
                dist.sample(rng)
            }
            _ => return self.evaluate(t),
        };
        raw.clamp(0.0, 1.0)
    }
}

fn histogram_value(bins: &[(f64, f64)], t: f64) -> f64 {
    for (upper, value) in bins {
        if t <= *upper {
            return *value;
        }
    }
    bins.last().map(|(_, v)| *v).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_is_time_invariant() {
        let e = ProbabilityExpression::Constant(0.3);
        assert_eq!(e.evaluate(0.0), 0.3);
        assert_eq!(e.evaluate(1000.0), 0.3);
    }

    #[test]
    fn exponential_approaches_one() {
        let e = ProbabilityExpression::Exponential { lambda: 1.0 };
        assert!(e.evaluate(0.0) < 1e-9);
        assert!(e.evaluate(50.0) > 0.999_999);
    }

    #[test]
    fn weibull_cdf_is_monotonic() {
        let e = ProbabilityExpression::Weibull {
            scale: 10.0,
            shape: 2.0,
        };
        assert!(e.evaluate(1.0) < e.evaluate(5.0));
        assert!(e.evaluate(5.0) < e.evaluate(20.0));
    }

    #[test]
    fn histogram_picks_correct_bin() {
        let e = ProbabilityExpression::Histogram {
            bins: vec![(1.0, 0.1), (5.0, 0.2), (10.0, 0.3)],
        };
        assert_eq!(e.evaluate(0.5), 0.1);
        assert_eq!(e.evaluate(3.0), 0.2);
        assert_eq!(e.evaluate(7.0), 0.3);
        assert_eq!(e.evaluate(50.0), 0.3);
    }

    #[test]
    fn sample_stays_in_unit_interval() {
        let mut rng = rand::thread_rng();
        let e = ProbabilityExpression::Normal {
            mean: 0.5,
            std_dev: 0.8,
        };
        for _ in 0..100 {
            let v = e.sample(0.0, &mut rng);
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
