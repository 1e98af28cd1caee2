//! The plain result aggregate an external serializer walks to produce a
//! report document. This crate only assembles the struct; XML (or any other
//! format) serialization is an external collaborator's job.

use crate::importance::ImportanceRecord;
use crate::products::ProductCollection;
use crate::sil::{Sil, SilHistogram};
use crate::uncertainty::UncertaintyResult;
use crate::error::Warning;

/// Top-event probability at one or more mission-time samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityPoint {
    pub time: f64,
    pub probability: f64,
}

/// Everything one analysis run produced, ready for an external writer to
/// serialize.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Top-event probability, one point per mission-time sample.
    pub probability_series: Vec<ProbabilityPoint>,
    /// Minimal cut sets, if MOCUS ran (empty for a non-coherent tree).
    pub products: Option<ProductCollection>,
    /// Per-event importance measures, if requested.
    pub importance: Vec<ImportanceRecord>,
    /// Monte Carlo uncertainty propagation result, if `monte_carlo_trials > 0`.
    pub uncertainty: Option<UncertaintyResult>,
    /// SIL classification of the final-sample top-event probability.
    pub sil: Option<Sil>,
    /// SIL histogram across gates/events analyzed, if computed.
    pub sil_histogram: Option<SilHistogram>,
    /// Non-fatal conditions accumulated during the run.
    pub warnings: Vec<Warning>,
}

impl Report {
    pub fn new() -> Self {
        Report::default()
    }

    /// The top-event probability at the final mission-time sample, if any
    /// samples were computed.
    pub fn final_probability(&self) -> Option<f64> {
        self.probability_series.last().map(|p| p.probability)
    }

    pub fn push_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_probability_is_the_last_sample() {
        let mut report = Report::new();
        report.probability_series.push(ProbabilityPoint { time: 0.0, probability: 0.1 });
        report.probability_series.push(ProbabilityPoint { time: 1.0, probability: 0.2 });
        assert_eq!(report.final_probability(), Some(0.2));
    }

    #[test]
    fn empty_report_has_no_final_probability() {
        assert_eq!(Report::new().final_probability(), None);
    }

    #[test]
    fn warnings_accumulate_in_order() {
        let mut report = Report::new();
        report.push_warning(Warning::SimplifiedPfh { pfh: 1e-7 });
        report.push_warning(Warning::ApproximationClamped { raw_value: 1.4 });
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0], Warning::SimplifiedPfh { pfh: 1e-7 });
    }
}
