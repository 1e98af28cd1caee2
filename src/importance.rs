//! Importance measures, each derived from the Birnbaum cofactors
//! `P(event forced true)` and `P(event forced false)` computed against the
//! BDD.

use crate::bdd::{BddEdge, BddManager};
use crate::model::EventId;
use rustc_hash::FxHashMap;

/// One event's importance measures relative to the current top-event
/// probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportanceRecord {
    pub event: EventId,
    /// Birnbaum (marginal importance factor): `P(1_i) - P(0_i)`.
    pub mif: f64,
    /// Criticality importance factor: `mif * q_i / P(system)`.
    pub cif: f64,
    /// Fussell-Vesely: `(P(system) - P(0_i)) / P(system)`.
    pub fv_dif: f64,
    /// Risk achievement worth: `P(1_i) / P(system)`.
    pub raw: f64,
    /// Risk reduction worth: `P(system) / P(0_i)`.
    pub rrw: f64,
}

/// Compute every basic event's importance measures against `root`.
pub fn compute(
    mgr: &mut BddManager,
    root: BddEdge,
    probabilities: &FxHashMap<EventId, f64>,
) -> Vec<ImportanceRecord> {
    let system_p = mgr.probability(root, probabilities);
    let events: Vec<EventId> = mgr.var_order().to_vec();
    events
        .into_iter()
        .map(|event| {
            let q = probabilities.get(&event).copied().unwrap_or(0.0);
            let forced_on = mgr.cofactor(root, &event, true);
            let forced_off = mgr.cofactor(root, &event, false);
            let p_on = mgr.probability(forced_on, probabilities);
            let p_off = mgr.probability(forced_off, probabilities);
            let mif = p_on - p_off;
            ImportanceRecord {
                mif,
                cif: if system_p > 0.0 { mif * q / system_p } else { 0.0 },
                fv_dif: if system_p > 0.0 {
                    (system_p - p_off) / system_p
                } else {
                    0.0
                },
                raw: if system_p > 0.0 { p_on / system_p } else { 0.0 },
                rrw: if p_off > 0.0 {
                    system_p / p_off
                } else {
                    f64::INFINITY
                },
                event,
            }
        })
        .collect()
}
