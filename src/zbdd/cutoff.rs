//! Cut-set family truncation: drop cut sets above a size limit, or below a
//! probability threshold, before they reach reporting.

use super::{ZNodeId, ZbddManager, BOTTOM, UNIT};
use crate::model::EventId;
use rustc_hash::FxHashMap;

/// Remove every cut set with more than `max_size` members.
pub fn truncate_by_size(mgr: &mut ZbddManager, node: ZNodeId, max_size: usize) -> ZNodeId {
    let mut memo = FxHashMap::default();
    truncate_size(mgr, node, max_size, &mut memo)
}

fn truncate_size(
    mgr: &mut ZbddManager,
    node: ZNodeId,
    remaining: usize,
    memo: &mut FxHashMap<(ZNodeId, usize), ZNodeId>,
) -> ZNodeId {
    if node == BOTTOM {
        return BOTTOM;
    }
    if node == UNIT {
        return UNIT;
    }
    if let Some(&cached) = memo.get(&(node, remaining)) {
        return cached;
    }
    let (var, low, high) = mgr.decision_parts(node);
    let new_low = truncate_size(mgr, low, remaining, memo);
    let new_high = if remaining == 0 {
        BOTTOM
    } else {
        truncate_size(mgr, high, remaining - 1, memo)
    };
    let result = mgr.make_node(var, new_low, new_high);
    memo.insert((node, remaining), result);
    result
}

/// Remove every cut set whose member-probability product falls below
/// `min_probability`. Not memoized across calls: the running product
/// differs per path, so a plain `(node, product)` cache key would not
/// improve sharing across different ancestor paths; this pass only ever
/// runs once on a cutoff-bounded family, so the cost is acceptable.
pub fn truncate_by_probability(
    mgr: &mut ZbddManager,
    node: ZNodeId,
    probabilities: &FxHashMap<EventId, f64>,
    min_probability: f64,
) -> ZNodeId {
    let var_probs: Vec<f64> = mgr
        .var_order()
        .iter()
        .map(|id| probabilities.get(id).copied().unwrap_or(0.0))
        .collect();
    truncate_probability(mgr, node, 1.0, &var_probs, min_probability)
}

fn truncate_probability(
    mgr: &mut ZbddManager,
    node: ZNodeId,
    running: f64,
    var_probs: &[f64],
    min_probability: f64,
) -> ZNodeId {
    if node == BOTTOM || running < min_probability {
        return BOTTOM;
    }
    if node == UNIT {
        return UNIT;
    }
    let (var, low, high) = mgr.decision_parts(node);
    let new_low = truncate_probability(mgr, low, running, var_probs, min_probability);
    let new_high = truncate_probability(
        mgr,
        high,
        running * var_probs[var as usize],
        var_probs,
        min_probability,
    );
    mgr.make_node(var, new_low, new_high)
}
