//! IEC 61508 Safety Integrity Level (SIL) classification: bucket a PFD
//! (low-demand) or PFH (high-demand/continuous) figure into its SIL band.

/// A Safety Integrity Level, 1 (least stringent) through 4 (most).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Sil {
    Sil1,
    Sil2,
    Sil3,
    Sil4,
}

/// Average probability of failure on demand band, IEC 61508-1 table 2.
const PFD_BANDS: [(f64, f64, Sil); 4] = [
    (1e-2, 1e-1, Sil::Sil1),
    (1e-3, 1e-2, Sil::Sil2),
    (1e-4, 1e-3, Sil::Sil3),
    (1e-5, 1e-4, Sil::Sil4),
];

/// Probability of failure per hour band, IEC 61508-1 table 3.
const PFH_BANDS: [(f64, f64, Sil); 4] = [
    (1e-6, 1e-5, Sil::Sil1),
    (1e-7, 1e-6, Sil::Sil2),
    (1e-8, 1e-7, Sil::Sil3),
    (1e-9, 1e-8, Sil::Sil4),
];

/// Classify a low-demand-mode PFD into its SIL band. Returns `None` if
/// `pfd` falls outside every band (too high for SIL1, or better than SIL4).
pub fn classify_pfd(pfd: f64) -> Option<Sil> {
    classify(pfd, &PFD_BANDS)
}

/// Classify a high-demand/continuous-mode PFH into its SIL band.
pub fn classify_pfh(pfh: f64) -> Option<Sil> {
    classify(pfh, &PFH_BANDS)
}

fn classify(value: f64, bands: &[(f64, f64, Sil); 4]) -> Option<Sil> {
    bands
        .iter()
        .find(|(low, high, _)| value >= *low && value < *high)
        .map(|(_, _, sil)| *sil)
}

/// A histogram of how many analyzed gates/events fall in each SIL band,
/// plus those that fall outside any band entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SilHistogram {
    pub sil1: usize,
    pub sil2: usize,
    pub sil3: usize,
    pub sil4: usize,
    pub unclassified: usize,
}

impl SilHistogram {
    /// Build a histogram from a set of classification results (`None` for
    /// unclassified values).
    pub fn from_classifications(classifications: impl IntoIterator<Item = Option<Sil>>) -> Self {
        let mut histogram = SilHistogram::default();
        for sil in classifications {
            match sil {
                Some(Sil::Sil1) => histogram.sil1 += 1,
                Some(Sil::Sil2) => histogram.sil2 += 1,
                Some(Sil::Sil3) => histogram.sil3 += 1,
                Some(Sil::Sil4) => histogram.sil4 += 1,
                None => histogram.unclassified += 1,
            }
        }
        histogram
    }

    pub fn total(&self) -> usize {
        self.sil1 + self.sil2 + self.sil3 + self.sil4 + self.unclassified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pfd_just_below_one_in_a_thousand_is_sil2() {
        assert_eq!(classify_pfd(1.3e-3), Some(Sil::Sil2));
    }

    #[test]
    fn pfd_below_sil4_band_is_unclassified() {
        assert_eq!(classify_pfd(1e-6), None);
    }

    #[test]
    fn pfd_above_sil1_band_is_unclassified() {
        assert_eq!(classify_pfd(0.5), None);
    }

    #[test]
    fn histogram_counts_each_band() {
        let histogram = SilHistogram::from_classifications(vec![
            Some(Sil::Sil1),
            Some(Sil::Sil1),
            Some(Sil::Sil4),
            None,
        ]);
        assert_eq!(histogram.sil1, 2);
        assert_eq!(histogram.sil4, 1);
        assert_eq!(histogram.unclassified, 1);
        assert_eq!(histogram.total(), 4);
    }
}
