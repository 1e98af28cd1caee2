//! Common-cause failure (CCF) group expansion.
//!
//! A CCF group names a set of basic events that share a dependent failure
//! mode. Expansion is a pure model-to-model transform, run before the PDAG
//! is built: it synthesizes new basic events representing independent and
//! shared-cause failure, and tells the caller how to rewrite every gate
//! argument that referenced an original member.

use super::{BasicEvent, EventId, ProbabilityExpression};
use std::collections::BTreeMap;

/// The common-cause model governing how a group's total failure probability
/// is distributed across failure multiplicities (how many members fail
/// together).
#[derive(Debug, Clone, PartialEq)]
pub enum CcfModel {
    /// Classic two-parameter model: with probability `beta` the whole group
    /// fails together; the rest of each member's probability is independent.
    BetaFactor {
        /// Fraction of failure probability attributed to the whole-group event.
        beta: f64,
    },
    /// Multiple Greek Letters: `rho[i]` is the conditional probability that a
    /// failure shared by `i+1` members also involves the `(i+2)`th, for
    /// `i = 0..n-2` (i.e. `rho.len() == n - 1`, entries are rho_2..rho_n).
    Mgl {
        /// rho_2, rho_3, ..., rho_n.
        rho: Vec<f64>,
    },
    /// Alpha-factor model: `alpha[k-1]` is the fraction of failure events
    /// that involve exactly `k` members, for `k = 1..=n`.
    AlphaFactor {
        /// alpha_1, alpha_2, ..., alpha_n (need not be pre-normalized).
        alpha: Vec<f64>,
    },
    /// Phi-factor model: `phi[k-1]` is the fraction of total group failure
    /// probability directly attributed to multiplicity `k`, for `k = 1..=n`.
    PhiFactor {
        /// phi_1, phi_2, ..., phi_n (should sum to 1).
        phi: Vec<f64>,
    },
}

/// A common-cause failure group over a set of basic events.
#[derive(Debug, Clone, PartialEq)]
pub struct CcfGroup {
    /// Stable identifier of the group (used to name synthesized basic events).
    pub id: EventId,
    /// Member basic-event identifiers, in a fixed order.
    pub members: Vec<EventId>,
    /// The shared-cause model.
    pub model: CcfModel,
}

/// The result of expanding one [`CcfGroup`]: new basic events to add to the
/// model, and the OR-combination of event identifiers that should replace
/// every gate argument referencing a given original member.
#[derive(Debug, Clone, Default)]
pub struct CcfExpansion {
    /// Synthesized basic events (independent-failure and shared-cause events).
    pub new_basic_events: Vec<BasicEvent>,
    /// original member id -> event ids whose logical OR replaces it.
    pub replacements: BTreeMap<EventId, Vec<EventId>>,
}

fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut result = 1.0_f64;
    for i in 0..k {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result
}

/// All `k`-element subsets (by index) of `0..n`, in lexicographic order.
pub(crate) fn k_subsets(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 || k > n {
        return Vec::new();
    }
    let mut result = Vec::new();
    let mut combo: Vec<usize> = (0..k).collect();
    loop {
        result.push(combo.clone());
        // advance to next combination
        let mut i = k;
        loop {
            if i == 0 {
                return result;
            }
            i -= 1;
            if combo[i] != i + n - k {
                break;
            }
            if i == 0 {
                return result;
            }
        }
        combo[i] += 1;
        for j in (i + 1)..k {
            combo[j] = combo[j - 1] + 1;
        }
    }
}

impl CcfGroup {
    /// Mean probability shared by every member, used as the group's common
    /// base rate. Homogeneous groups (identical per-member probabilities)
    /// are the common case; heterogeneous groups fall back to the
    /// arithmetic mean.
    fn base_probability(&self, basic_events: &[BasicEvent]) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for member in &self.members {
            if let Some(be) = basic_events.iter().find(|b| &b.id == member) {
                sum += be.probability.evaluate(0.0);
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Probability that a *specific* subset of `k` members fails together,
    /// for `k = 1..=n`, derived from this group's model.
    fn level_probabilities(&self, n: usize, q: f64) -> Vec<f64> {
        match &self.model {
            CcfModel::BetaFactor { beta } => {
                // Only levels 1 (independent) and n (whole group) are non-zero.
                let mut levels = vec![0.0; n];
                levels[0] = q * (1.0 - beta);
                levels[n - 1] = q * beta;
                levels
            }
            CcfModel::Mgl { rho } => {
                // Qk = q / C(n-1, k-1) * prod(rho_2..rho_k) * (1 - rho_{k+1})
                // Q1 = q * (1 - rho_2); Qn = q * prod(rho_2..rho_n).
                let mut levels = vec![0.0; n];
                let rho_at = |level: usize| -> f64 {
                    // rho index for "rho_{level}" with rho[0] == rho_2
                    if level < 2 || level - 2 >= rho.len() {
                        0.0
                    } else {
                        rho[level - 2]
                    }
                };
                for k in 1..=n {
                    let prod: f64 = (2..=k).map(rho_at).product();
                    let tail = if k < n { 1.0 - rho_at(k + 1) } else { 1.0 };
                    let combo = binomial(n - 1, k - 1).max(1.0);
                    levels[k - 1] = q / combo * prod * tail;
                }
                levels
            }
            CcfModel::AlphaFactor { alpha } => {
                let weighted_sum: f64 = alpha
                    .iter()
                    .enumerate()
                    .map(|(i, a)| (i + 1) as f64 * a)
                    .sum();
                let mut levels = vec![0.0; n];
                if weighted_sum > 0.0 {
                    for k in 1..=n {
                        let a_k = alpha.get(k - 1).copied().unwrap_or(0.0);
                        let combo = binomial(n - 1, k - 1).max(1.0);
                        levels[k - 1] = (k as f64 * a_k) / (weighted_sum * combo) * q * n as f64;
                    }
                }
                levels
            }
            CcfModel::PhiFactor { phi } => {
                let mut levels = vec![0.0; n];
                for k in 1..=n {
                    let phi_k = phi.get(k - 1).copied().unwrap_or(0.0);
                    let combo = binomial(n, k).max(1.0);
                    levels[k - 1] = phi_k * q / combo;
                }
                levels
            }
        }
    }

    /// Expand this group against the model's current basic events.
    pub fn expand(&self, basic_events: &[BasicEvent]) -> CcfExpansion {
        let n = self.members.len();
        let mut expansion = CcfExpansion::default();
        if n < 2 {
            return expansion;
        }

        let q = self.base_probability(basic_events);
        let levels = self.level_probabilities(n, q);

        let mut replacement_lists: BTreeMap<EventId, Vec<EventId>> = self
            .members
            .iter()
            .map(|m| (m.clone(), Vec::new()))
            .collect();

        for (level_idx, probability) in levels.iter().enumerate() {
            let k = level_idx + 1;
            if *probability <= 0.0 {
                continue;
            }
            for subset in k_subsets(n, k) {
                let label = subset
                    .iter()
                    .map(|&i| self.members[i].as_str())
                    .collect::<Vec<_>>()
                    .join("_");
                let event_id = format!("CCF_{}_{}", self.id, label);
                expansion.new_basic_events.push(BasicEvent {
                    id: event_id.clone(),
                    probability: ProbabilityExpression::Constant(*probability),
                });
                for &member_idx in &subset {
                    replacement_lists
                        .get_mut(&self.members[member_idx])
                        .expect("replacement list pre-populated for every member")
                        .push(event_id.clone());
                }
            }
        }

        expansion.replacements = replacement_lists;
        expansion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beta_factor_expands_to_independent_plus_shared_event() {
        let basic_events = vec![
            BasicEvent {
                id: "a".into(),
                probability: ProbabilityExpression::Constant(0.01),
            },
            BasicEvent {
                id: "b".into(),
                probability: ProbabilityExpression::Constant(0.01),
            },
            BasicEvent {
                id: "c".into(),
                probability: ProbabilityExpression::Constant(0.01),
            },
        ];
        let group = CcfGroup {
            id: "abc".into(),
            members: vec!["a".into(), "b".into(), "c".into()],
            model: CcfModel::BetaFactor { beta: 0.1 },
        };
        let expansion = group.expand(&basic_events);
        // One independent event per member (level 1) + one shared event (level 3).
        assert_eq!(expansion.new_basic_events.len(), 3 + 1);
        for member in &group.members {
            assert_eq!(expansion.replacements[member].len(), 2);
        }
        let shared = expansion
            .new_basic_events
            .iter()
            .find(|b| b.id.contains("a_b_c"))
            .unwrap();
        assert!((shared.probability.evaluate(0.0) - 0.001).abs() < 1e-12);
    }

    #[test]
    fn k_subsets_counts_match_binomial() {
        assert_eq!(k_subsets(5, 2).len(), 10);
        assert_eq!(k_subsets(4, 4).len(), 1);
        assert_eq!(k_subsets(4, 0).len(), 0);
    }
}
