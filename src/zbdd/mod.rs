//! Zero-suppressed Binary Decision Diagram (ZBDD) engine for representing
//! and manipulating cut-set families.
//!
//! A ZBDD represents a family of sets (here: a family of cut sets, each a
//! set of basic-event ids). Shaped after the same two-terminal
//! `BddManager`/`BddNode` arena as `src/bdd/mod.rs` (`nodes: Vec`, unique
//! table, hash consing) rather than the complement-edge BDD above: ZBDDs
//! conventionally use two distinct terminals and no edge complementation,
//! since "complement of a set family" isn't the operation this diagram
//! needs — set union, intersection and the zero-suppression rule are.
//!
//! Zero-suppression: a decision node is elided whenever its `high` child is
//! the empty family (`BOTTOM`), since including that variable could never
//! produce a surviving set. This is the ZBDD-specific counterpart to the
//! ROBDD's "low == high" reduction and is what keeps sparse cut-set families
//! compact.

mod cutoff;
mod probability;

pub use cutoff::{truncate_by_probability, truncate_by_size};
pub use probability::{mcub_probability, rare_event_probability};

use crate::model::EventId;
use rustc_hash::FxHashMap;

/// Index into [`ZbddManager`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZNodeId(pub u32);

/// The empty family (no cut sets at all): the ZBDD analogue of FALSE.
pub const BOTTOM: ZNodeId = ZNodeId(0);
/// The family containing exactly the empty set: the ZBDD analogue of TRUE
/// restricted to "no further variables".
pub const UNIT: ZNodeId = ZNodeId(1);

pub type VarId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ZNode {
    Terminal,
    Decision {
        var: VarId,
        low: ZNodeId,
        high: ZNodeId,
    },
}

/// Owns the node arena and unique table for one cut-set family computation.
#[derive(Debug)]
pub struct ZbddManager {
    nodes: Vec<ZNode>,
    unique_table: FxHashMap<(VarId, ZNodeId, ZNodeId), ZNodeId>,
    union_cache: FxHashMap<(ZNodeId, ZNodeId), ZNodeId>,
    intersection_cache: FxHashMap<(ZNodeId, ZNodeId), ZNodeId>,
    difference_cache: FxHashMap<(ZNodeId, ZNodeId), ZNodeId>,
    subsume_cache: FxHashMap<(ZNodeId, ZNodeId), ZNodeId>,
    minimize_cache: FxHashMap<ZNodeId, ZNodeId>,
    var_order: Vec<EventId>,
    var_index: FxHashMap<EventId, VarId>,
}

impl ZbddManager {
    /// Create a manager with a fixed variable order (shared with the BDD's
    /// order, so module boundaries line up between the two engines).
    pub fn new(order: Vec<EventId>) -> Self {
        let var_index = order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i as VarId))
            .collect();
        ZbddManager {
            nodes: vec![ZNode::Terminal, ZNode::Terminal],
            unique_table: FxHashMap::default(),
            union_cache: FxHashMap::default(),
            intersection_cache: FxHashMap::default(),
            difference_cache: FxHashMap::default(),
            subsume_cache: FxHashMap::default(),
            minimize_cache: FxHashMap::default(),
            var_order: order,
            var_index,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn var_order(&self) -> &[EventId] {
        &self.var_order
    }

    fn var_id(&self, id: &str) -> VarId {
        *self
            .var_index
            .get(id)
            .unwrap_or_else(|| panic!("variable '{id}' is not in this manager's order"))
    }

    fn node_var(&self, node: ZNodeId) -> VarId {
        match &self.nodes[node.0 as usize] {
            ZNode::Terminal => VarId::MAX,
            ZNode::Decision { var, .. } => *var,
        }
    }

    /// Hash-consed constructor with the zero-suppression rule: a node whose
    /// `high` child is `BOTTOM` contributes nothing and is elided.
    fn make_node(&mut self, var: VarId, low: ZNodeId, high: ZNodeId) -> ZNodeId {
        if high == BOTTOM {
            return low;
        }
        let key = (var, low, high);
        if let Some(&existing) = self.unique_table.get(&key) {
            return existing;
        }
        let id = ZNodeId(self.nodes.len() as u32);
        self.nodes.push(ZNode::Decision { var, low, high });
        self.unique_table.insert(key, id);
        id
    }

    /// The family containing exactly the one-element set `{id}`.
    pub fn single(&mut self, id: &str) -> ZNodeId {
        let var = self.var_id(id);
        self.make_node(var, BOTTOM, UNIT)
    }

    /// Decompose a non-terminal node into `(var, low, high)`. Panics on a
    /// terminal; callers are expected to have already matched `BOTTOM`/`UNIT`.
    fn decision_parts(&self, node: ZNodeId) -> (VarId, ZNodeId, ZNodeId) {
        match &self.nodes[node.0 as usize] {
            ZNode::Decision { var, low, high } => (*var, *low, *high),
            ZNode::Terminal => unreachable!("caller must handle BOTTOM/UNIT before decomposing"),
        }
    }

    fn cofactors(&self, node: ZNodeId, var: VarId) -> (ZNodeId, ZNodeId) {
        if node == BOTTOM || node == UNIT || self.node_var(node) != var {
            (node, BOTTOM)
        } else {
            match &self.nodes[node.0 as usize] {
                ZNode::Decision { low, high, .. } => (*low, *high),
                ZNode::Terminal => unreachable!(),
            }
        }
    }

    /// Union of two cut-set families (used to combine OR-gate branches and
    /// to accumulate a cut-set family incrementally during MOCUS expansion).
    pub fn union(&mut self, a: ZNodeId, b: ZNodeId) -> ZNodeId {
        if a == BOTTOM {
            return b;
        }
        if b == BOTTOM {
            return a;
        }
        if a == b {
            return a;
        }
        let key = if a.0 <= b.0 { (a, b) } else { (b, a) };
        if let Some(&cached) = self.union_cache.get(&key) {
            return cached;
        }
        let top = self.node_var(a).min(self.node_var(b));
        let (a_low, a_high) = self.cofactors(a, top);
        let (b_low, b_high) = self.cofactors(b, top);
        let low = self.union(a_low, b_low);
        let high = self.union(a_high, b_high);
        let result = self.make_node(top, low, high);
        self.union_cache.insert(key, result);
        result
    }

    /// Cartesian product of two families with each pair's sets unioned
    /// together: `{s ∪ t : s ∈ a, t ∈ b}`. Used to build cut sets across an
    /// AND gate's children.
    pub fn product(&mut self, a: ZNodeId, b: ZNodeId) -> ZNodeId {
        if a == BOTTOM || b == BOTTOM {
            return BOTTOM;
        }
        if a == UNIT {
            return b;
        }
        if b == UNIT {
            return a;
        }
        let top = self.node_var(a).min(self.node_var(b));
        let (a_low, a_high) = self.cofactors(a, top);
        let (b_low, b_high) = self.cofactors(b, top);
        // (a_low + x*a_high) * (b_low + x*b_high)
        //   = a_low*b_low + x*(a_low*b_high + a_high*b_low + a_high*b_high)
        let low = self.product(a_low, b_low);
        let cross1 = self.product(a_low, b_high);
        let cross2 = self.product(a_high, b_low);
        let cross3 = self.product(a_high, b_high);
        let cross12 = self.union(cross1, cross2);
        let high = self.union(cross12, cross3);
        self.make_node(top, low, high)
    }

    /// Whether the empty set (the "always true with nothing left to decide"
    /// product) is a member of the family rooted at `node`. The empty set
    /// can only ever be reached through `low` edges, since any `high` edge
    /// taken adds that level's variable to the set.
    fn contains_empty(&self, node: ZNodeId) -> bool {
        match node {
            BOTTOM => false,
            UNIT => true,
            _ => {
                let (_, low, _) = self.decision_parts(node);
                self.contains_empty(low)
            }
        }
    }

    /// Sets present in both `a` and `b`.
    pub fn intersection(&mut self, a: ZNodeId, b: ZNodeId) -> ZNodeId {
        if a == b {
            return a;
        }
        if a == BOTTOM || b == BOTTOM {
            return BOTTOM;
        }
        if a == UNIT {
            return if self.contains_empty(b) { UNIT } else { BOTTOM };
        }
        if b == UNIT {
            return if self.contains_empty(a) { UNIT } else { BOTTOM };
        }
        let key = if a.0 <= b.0 { (a, b) } else { (b, a) };
        if let Some(&cached) = self.intersection_cache.get(&key) {
            return cached;
        }
        let top = self.node_var(a).min(self.node_var(b));
        let (a_low, a_high) = self.cofactors(a, top);
        let (b_low, b_high) = self.cofactors(b, top);
        let low = self.intersection(a_low, b_low);
        let high = self.intersection(a_high, b_high);
        let result = self.make_node(top, low, high);
        self.intersection_cache.insert(key, result);
        result
    }

    /// Sets present in `a` but not in `b` (exact set-membership removal, as
    /// opposed to [`ZbddManager::subtract_supersets`]'s superset removal).
    pub fn difference(&mut self, a: ZNodeId, b: ZNodeId) -> ZNodeId {
        if a == BOTTOM || a == b {
            return BOTTOM;
        }
        if b == BOTTOM {
            return a;
        }
        if let Some(&cached) = self.difference_cache.get(&(a, b)) {
            return cached;
        }
        let result = if a == UNIT {
            if self.contains_empty(b) {
                BOTTOM
            } else {
                UNIT
            }
        } else if b == UNIT {
            let (var, low, high) = self.decision_parts(a);
            let new_low = self.difference(low, b);
            self.make_node(var, new_low, high)
        } else {
            let top = self.node_var(a).min(self.node_var(b));
            let (a_low, a_high) = self.cofactors(a, top);
            let (b_low, b_high) = self.cofactors(b, top);
            let low = self.difference(a_low, b_low);
            let high = self.difference(a_high, b_high);
            self.make_node(top, low, high)
        };
        self.difference_cache.insert((a, b), result);
        result
    }

    /// Sets of `a` that are not a superset of any set in `b`. The recursion
    /// [`ZbddManager::minimize`] uses to discard non-minimal products: unlike
    /// [`ZbddManager::difference`], a set is removed even if it only
    /// *contains* (rather than exactly equals) some set already kept.
    fn subtract_supersets(&mut self, a: ZNodeId, b: ZNodeId) -> ZNodeId {
        if a == BOTTOM {
            return BOTTOM;
        }
        if b == BOTTOM {
            return a;
        }
        if b == UNIT {
            // The empty set is a subset of every set, including itself.
            return BOTTOM;
        }
        if a == UNIT {
            // `a` is just {{}}; `b` here holds only non-empty sets (the
            // `b == UNIT` case above is already handled), so {} is a
            // superset of none of them.
            return UNIT;
        }
        if a == b {
            return BOTTOM;
        }
        let key = (a, b);
        if let Some(&cached) = self.subsume_cache.get(&key) {
            return cached;
        }
        let top = self.node_var(a).min(self.node_var(b));
        let (a_low, a_high) = self.cofactors(a, top);
        let (b_low, b_high) = self.cofactors(b, top);
        let low = self.subtract_supersets(a_low, b_low);
        let high_without_b0 = self.subtract_supersets(a_high, b_low);
        let high = self.subtract_supersets(high_without_b0, b_high);
        let result = self.make_node(top, low, high);
        self.subsume_cache.insert(key, result);
        result
    }

    /// Remove every non-minimal product: the classical ZBDD subset-
    /// elimination recursion (Minato). After this call, no product in the
    /// family rooted at the result is a subset of another.
    pub fn minimize(&mut self, node: ZNodeId) -> ZNodeId {
        if node == BOTTOM || node == UNIT {
            return node;
        }
        if let Some(&cached) = self.minimize_cache.get(&node) {
            return cached;
        }
        let (var, low, high) = self.decision_parts(node);
        let low_min = self.minimize(low);
        let high_min = self.minimize(high);
        // A set that takes the `high` branch already contains `var`, so it
        // is non-minimal whenever some set reachable via `low` (which never
        // contains `var`) is one of its subsets.
        let high_final = self.subtract_supersets(high_min, low_min);
        let result = self.make_node(var, low_min, high_final);
        self.minimize_cache.insert(node, result);
        result
    }

    /// Number of nodes reachable from `node`, including shared terminals —
    /// the ZBDD analogue of [`crate::bdd::BddManager::reachable_node_count`].
    pub fn size(&self, node: ZNodeId) -> usize {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if !seen.insert(n) {
                continue;
            }
            if let ZNode::Decision { low, high, .. } = &self.nodes[n.0 as usize] {
                stack.push(*low);
                stack.push(*high);
            }
        }
        seen.len()
    }

    /// Number of cut sets (paths to `UNIT`) in the family rooted at `node`.
    pub fn count(&self, node: ZNodeId) -> u64 {
        let mut memo = FxHashMap::default();
        self.count_memo(node, &mut memo)
    }

    fn count_memo(&self, node: ZNodeId, memo: &mut FxHashMap<ZNodeId, u64>) -> u64 {
        if node == BOTTOM {
            return 0;
        }
        if node == UNIT {
            return 1;
        }
        if let Some(&cached) = memo.get(&node) {
            return cached;
        }
        let (_, low, high) = self.decision_parts(node);
        let result = self.count_memo(low, memo) + self.count_memo(high, memo);
        memo.insert(node, result);
        result
    }

    /// Enumerate every cut set in the family as a sorted `Vec<EventId>`.
    /// Intended for reporting small/cutoff-truncated families; not a
    /// substitute for probability calculations over the diagram itself.
    pub fn enumerate(&self, node: ZNodeId) -> Vec<Vec<EventId>> {
        let mut results = Vec::new();
        let mut path = Vec::new();
        self.enumerate_rec(node, &mut path, &mut results);
        results
    }

    fn enumerate_rec(&self, node: ZNodeId, path: &mut Vec<EventId>, out: &mut Vec<Vec<EventId>>) {
        if node == BOTTOM {
            return;
        }
        if node == UNIT {
            out.push(path.clone());
            return;
        }
        let (var, low, high) = self.decision_parts(node);
        self.enumerate_rec(low, path, out);
        path.push(self.var_order[var as usize].clone());
        self.enumerate_rec(high, path, out);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_variable_family_has_one_cut_set() {
        let mut mgr = ZbddManager::new(vec!["a".into()]);
        let a = mgr.single("a");
        assert_eq!(mgr.count(a), 1);
        assert_eq!(mgr.enumerate(a), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn union_of_disjoint_singletons_has_two_cut_sets() {
        let mut mgr = ZbddManager::new(vec!["a".into(), "b".into()]);
        let a = mgr.single("a");
        let b = mgr.single("b");
        let family = mgr.union(a, b);
        assert_eq!(mgr.count(family), 2);
    }

    #[test]
    fn product_of_singletons_is_the_pair_cut_set() {
        let mut mgr = ZbddManager::new(vec!["a".into(), "b".into()]);
        let a = mgr.single("a");
        let b = mgr.single("b");
        let family = mgr.product(a, b);
        assert_eq!(mgr.count(family), 1);
        assert_eq!(
            mgr.enumerate(family),
            vec![vec!["a".to_string(), "b".to_string()]]
        );
    }

    #[test]
    fn zero_suppression_elides_a_never_contributing_variable() {
        // make_node(var, low=UNIT, high=BOTTOM) should collapse to `low`
        // (including `var` never survives since its high branch is empty).
        let mut mgr = ZbddManager::new(vec!["a".into()]);
        let node = mgr.make_node(0, UNIT, BOTTOM);
        assert_eq!(node, UNIT);
    }

    #[test]
    fn union_is_idempotent() {
        let mut mgr = ZbddManager::new(vec!["a".into(), "b".into()]);
        let a = mgr.single("a");
        let b = mgr.single("b");
        let family = mgr.union(a, b);
        let again = mgr.union(family, family);
        assert_eq!(again, family);
    }

    #[test]
    fn minimize_drops_a_product_that_is_a_superset_of_another() {
        let mut mgr = ZbddManager::new(vec!["a".into(), "b".into()]);
        let a = mgr.single("a");
        let a2 = mgr.single("a");
        let b = mgr.single("b");
        let a_b = mgr.product(a2, b);
        let family = mgr.union(a, a_b);
        assert_eq!(mgr.count(family), 2, "both {{a}} and {{a,b}} present before minimizing");
        let minimal = mgr.minimize(family);
        assert_eq!(mgr.count(minimal), 1);
        assert_eq!(mgr.enumerate(minimal), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn minimize_is_a_fixpoint_on_an_already_minimal_family() {
        let mut mgr = ZbddManager::new(vec!["a".into(), "b".into()]);
        let a = mgr.single("a");
        let b = mgr.single("b");
        let family = mgr.union(a, b);
        assert_eq!(mgr.minimize(family), family);
    }

    #[test]
    fn intersection_keeps_only_shared_products() {
        let mut mgr = ZbddManager::new(vec!["a".into(), "b".into(), "c".into()]);
        let a = mgr.single("a");
        let b = mgr.single("b");
        let c = mgr.single("c");
        let left = mgr.union(a, b);
        let right = mgr.union(b, c);
        let shared = mgr.intersection(left, right);
        assert_eq!(mgr.enumerate(shared), vec![vec!["b".to_string()]]);
    }

    #[test]
    fn difference_removes_exact_members_only() {
        let mut mgr = ZbddManager::new(vec!["a".into(), "b".into()]);
        let a = mgr.single("a");
        let a2 = mgr.single("a");
        let b = mgr.single("b");
        let a_b = mgr.product(a2, b);
        let family = mgr.union(a, a_b);
        // {a,b} is a superset of {a}, but difference only drops exact matches.
        let remainder = mgr.difference(family, a);
        assert_eq!(mgr.enumerate(remainder), vec![vec!["a".to_string(), "b".to_string()]]);
    }
}
