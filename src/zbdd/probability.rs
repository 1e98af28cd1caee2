//! Cut-set-family probability approximations: rare-event (sum of cut-set
//! probabilities) and minimal-cut-set upper bound (MCUB).
//! Exact probability is the BDD engine's job; these approximations operate
//! directly on a (typically cutoff-truncated) cut-set family and so scale
//! to families too large to rebuild as a BDD.

use super::{ZNodeId, ZbddManager, BOTTOM, UNIT};
use crate::model::EventId;
use rustc_hash::FxHashMap;

/// Rare-event approximation: `sum over cut sets of (product of member
/// probabilities)`. Exact when cut sets are disjoint events; an
/// overestimate otherwise, and can exceed 1 for large or highly
/// overlapping families; callers clamp the result to 1 before reporting it.
pub fn rare_event_probability(
    mgr: &ZbddManager,
    node: ZNodeId,
    probabilities: &FxHashMap<EventId, f64>,
) -> f64 {
    let var_probs: Vec<f64> = mgr
        .var_order()
        .iter()
        .map(|id| probabilities.get(id).copied().unwrap_or(0.0))
        .collect();
    let mut memo = FxHashMap::default();
    sum_probability(mgr, node, &var_probs, &mut memo)
}

fn sum_probability(
    mgr: &ZbddManager,
    node: ZNodeId,
    var_probs: &[f64],
    memo: &mut FxHashMap<ZNodeId, f64>,
) -> f64 {
    if node == BOTTOM {
        return 0.0;
    }
    if node == UNIT {
        return 1.0;
    }
    if let Some(&cached) = memo.get(&node) {
        return cached;
    }
    let (var, low, high) = mgr.decision_parts(node);
    let result = sum_probability(mgr, low, var_probs, memo)
        + var_probs[var as usize] * sum_probability(mgr, high, var_probs, memo);
    memo.insert(node, result);
    result
}

/// Minimal cut set upper bound: `1 - product over cut sets of (1 -
/// product of member probabilities)`. Requires enumerating cut sets, so
/// it is only practical after a size/probability cutoff has bounded the
/// family.
pub fn mcub_probability(
    mgr: &ZbddManager,
    node: ZNodeId,
    probabilities: &FxHashMap<EventId, f64>,
) -> f64 {
    let complement_product: f64 = mgr
        .enumerate(node)
        .into_iter()
        .map(|cut_set| {
            let p: f64 = cut_set
                .iter()
                .map(|id| probabilities.get(id).copied().unwrap_or(0.0))
                .product();
            1.0 - p
        })
        .product();
    1.0 - complement_product
}
