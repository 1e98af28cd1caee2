//! Exact top-event probability by post-order evaluation over the BDD:
//! `P(f) = p(x) * P(high) + (1 - p(x)) * P(low)`, memoized per node so
//! shared subgraphs are evaluated once.

use super::{BddEdge, BddManager, BddNodeData, TRUE_NODE, VarId};
use crate::model::EventId;
use rustc_hash::FxHashMap;

impl BddManager {
    /// Evaluate the probability of `edge` given each variable's probability
    /// of being true, keyed by event id. Missing events are treated as
    /// probability zero (a house event fixed false, or a variable outside
    /// `edge`'s support).
    pub fn probability(&self, edge: BddEdge, probabilities: &FxHashMap<EventId, f64>) -> f64 {
        let var_probability: Vec<f64> = self
            .var_order()
            .iter()
            .map(|id| probabilities.get(id).copied().unwrap_or(0.0))
            .collect();
        let mut memo = FxHashMap::default();
        let p = self.probability_of_node(edge.node, &var_probability, &mut memo);
        if edge.complement {
            1.0 - p
        } else {
            p
        }
    }

    fn probability_of_node(
        &self,
        node: super::NodeId,
        var_probability: &[f64],
        memo: &mut FxHashMap<super::NodeId, f64>,
    ) -> f64 {
        if node == TRUE_NODE {
            return 1.0;
        }
        if let Some(&cached) = memo.get(&node) {
            return cached;
        }
        let (var, low, high) = match &self.nodes[node.0 as usize] {
            BddNodeData::Terminal => unreachable!("only TRUE_NODE is a terminal"),
            BddNodeData::Decision { var, low, high } => (*var, *low, *high),
        };
        let low_p = self.edge_probability(low, var_probability, memo);
        let high_p = self.edge_probability(high, var_probability, memo);
        let q = var_probability[var as usize];
        let p = q * high_p + (1.0 - q) * low_p;
        memo.insert(node, p);
        p
    }

    fn edge_probability(
        &self,
        edge: BddEdge,
        var_probability: &[f64],
        memo: &mut FxHashMap<super::NodeId, f64>,
    ) -> f64 {
        let p = self.probability_of_node(edge.node, var_probability, memo);
        if edge.complement {
            1.0 - p
        } else {
            p
        }
    }

    /// Cofactor `edge` by fixing `var`'s id to `value`: the Shannon cofactor
    /// used by importance measures (MIF sets the event true, CIF/RRW reuse
    /// the same primitive with different substitutions).
    pub fn cofactor(&mut self, edge: BddEdge, var_id: &str, value: bool) -> BddEdge {
        let var = self.var_id_public(var_id);
        self.cofactor_by_var(edge, var, value, &mut FxHashMap::default())
    }

    fn var_id_public(&self, id: &str) -> VarId {
        self.var_order()
            .iter()
            .position(|v| v == id)
            .map(|i| i as VarId)
            .unwrap_or_else(|| panic!("variable '{id}' is not in this manager's order"))
    }

    fn cofactor_by_var(
        &mut self,
        edge: BddEdge,
        var: VarId,
        value: bool,
        memo: &mut FxHashMap<BddEdge, BddEdge>,
    ) -> BddEdge {
        if edge.is_constant() {
            return edge;
        }
        if let Some(&cached) = memo.get(&edge) {
            return cached;
        }
        let node_var = self.node_var(edge);
        let result = if node_var > var {
            // `var` doesn't appear on this path; the function is unaffected.
            edge
        } else {
            let (low, high) = self.cofactor_edges(edge, node_var);
            if node_var == var {
                if value {
                    high
                } else {
                    low
                }
            } else {
                let new_low = self.cofactor_by_var(low, var, value, memo);
                let new_high = self.cofactor_by_var(high, var, value, memo);
                self.make_node(node_var, new_low, new_high)
            }
        };
        memo.insert(edge, result);
        result
    }
}
