//! Reduced ordered Binary Decision Diagram (BDD) engine with complement
//! edges, used to compute exact top-event probability and to support
//! importance-measure cofactoring.
//!
//! Shaped after a `Vec`-backed node arena with a unique table for hash
//! consing and an ITE operation cache, generalized in three ways:
//!
//! - **Complement edges.** Every edge (not just the public root handle)
//!   carries a `complement` bit, so `NOT` is a pointer flip instead of a
//!   node. This halves node count on average relative to a plain
//!   two-terminal design, at the cost of not enforcing a canonical "regular
//!   high edge" convention — two structurally distinct node sequences can
//!   represent complementary functions. That is a known, intentional
//!   simplification relative to production packages (documented in
//!   `DESIGN.md`): correctness of `ite`/`probability` doesn't depend on it,
//!   only on hash-consing hit rate.
//! - **Externally fixed variable order** (`order` module) rather than
//!   alphabetical or insertion order, since cut-set and BDD size are
//!   order-sensitive.
//! - **No global singleton.** One manager per analysis, owned by the
//!   engine for the lifetime of a `Compiled` model, since this crate's
//!   lifecycle is per-model rather than process-global.

mod build;
mod order;
pub(crate) mod probability;

pub use build::compile;
pub use order::depth_first_order;

use crate::model::EventId;
use rustc_hash::FxHashMap;

/// Index into [`BddManager`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Index into the fixed variable order.
pub type VarId = u32;

/// The arena slot shared by both BDD terminals; `BddEdge::complement`
/// distinguishes TRUE from FALSE.
pub const TRUE_NODE: NodeId = NodeId(0);

/// A possibly-complemented reference to a node: the unit of sharing in this
/// representation. Two `BddEdge`s are semantically equal functions iff they
/// are equal as values (up to the hash-consing caveat above).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BddEdge {
    /// Whether this edge negates the function rooted at `node`.
    pub complement: bool,
    /// The referenced node.
    pub node: NodeId,
}

impl BddEdge {
    /// The constant TRUE edge.
    pub const fn tru() -> Self {
        BddEdge {
            complement: false,
            node: TRUE_NODE,
        }
    }

    /// The constant FALSE edge.
    pub const fn fals() -> Self {
        BddEdge {
            complement: true,
            node: TRUE_NODE,
        }
    }

    /// Negate this edge (O(1): flips the complement bit).
    pub const fn negate(self) -> Self {
        BddEdge {
            complement: !self.complement,
            node: self.node,
        }
    }

    /// Whether this edge denotes a Boolean constant.
    pub fn is_constant(&self) -> bool {
        self.node == TRUE_NODE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BddNodeData {
    /// The single terminal; only ever at `TRUE_NODE`.
    Terminal,
    /// A decision over `var`: `low` when false, `high` when true.
    Decision {
        var: VarId,
        low: BddEdge,
        high: BddEdge,
    },
}

/// Owns the node arena, unique table and ITE cache for one analysis.
#[derive(Debug)]
pub struct BddManager {
    nodes: Vec<BddNodeData>,
    unique_table: FxHashMap<(VarId, BddEdge, BddEdge), NodeId>,
    ite_cache: FxHashMap<(BddEdge, BddEdge, BddEdge), BddEdge>,
    var_order: Vec<EventId>,
    var_index: FxHashMap<EventId, VarId>,
}

impl BddManager {
    /// Create a manager with a fixed variable order. Variables are assigned
    /// `VarId`s by their position in `order`; the BDD's Shannon expansion
    /// always splits on the smallest `VarId` among its arguments, so `order`
    /// directly determines the diagram's shape and size.
    pub fn new(order: Vec<EventId>) -> Self {
        let var_index = order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i as VarId))
            .collect();
        BddManager {
            nodes: vec![BddNodeData::Terminal],
            unique_table: FxHashMap::default(),
            ite_cache: FxHashMap::default(),
            var_order: order,
            var_index,
        }
    }

    /// Number of live nodes in the arena (including the shared terminal).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The fixed variable order this manager was built with.
    pub fn var_order(&self) -> &[EventId] {
        &self.var_order
    }

    fn var_id(&self, id: &str) -> VarId {
        *self
            .var_index
            .get(id)
            .unwrap_or_else(|| panic!("variable '{id}' is not in this manager's order"))
    }

    /// The edge representing a single variable: `ite(var, TRUE, FALSE)`.
    pub fn variable(&mut self, id: &str) -> BddEdge {
        let var = self.var_id(id);
        self.make_node(var, BddEdge::fals(), BddEdge::tru())
    }

    fn node_var(&self, edge: BddEdge) -> VarId {
        match &self.nodes[edge.node.0 as usize] {
            BddNodeData::Terminal => VarId::MAX,
            BddNodeData::Decision { var, .. } => *var,
        }
    }

    /// Hash-consed constructor: applies the redundant-test reduction
    /// (`low == high` collapses to that edge) before interning.
    fn make_node(&mut self, var: VarId, low: BddEdge, high: BddEdge) -> BddEdge {
        if low == high {
            return low;
        }
        let key = (var, low, high);
        if let Some(&existing) = self.unique_table.get(&key) {
            return BddEdge {
                complement: false,
                node: existing,
            };
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(BddNodeData::Decision { var, low, high });
        self.unique_table.insert(key, id);
        BddEdge {
            complement: false,
            node: id,
        }
    }

    fn cofactor_edges(&self, edge: BddEdge, var: VarId) -> (BddEdge, BddEdge) {
        if edge.is_constant() || self.node_var(edge) != var {
            return (edge, edge);
        }
        match &self.nodes[edge.node.0 as usize] {
            BddNodeData::Decision { low, high, .. } => {
                if edge.complement {
                    (low.negate(), high.negate())
                } else {
                    (*low, *high)
                }
            }
            BddNodeData::Terminal => unreachable!(),
        }
    }

    /// If-Then-Else: `f ? g : h`. The fundamental operation every Boolean
    /// connective reduces to.
    pub fn ite(&mut self, f: BddEdge, g: BddEdge, h: BddEdge) -> BddEdge {
        if f == BddEdge::tru() {
            return g;
        }
        if f == BddEdge::fals() {
            return h;
        }
        if g == BddEdge::tru() && h == BddEdge::fals() {
            return f;
        }
        if g == h {
            return g;
        }
        // Canonicalize the cache key so `ite(f,g,h)` and its complement-flip
        // equivalents share one entry: `ite(!f,g,h) == ite(f,h,g)`.
        let (f, g, h) = if f.complement { (f.negate(), h, g) } else { (f, g, h) };
        let key = (f, g, h);
        if let Some(&cached) = self.ite_cache.get(&key) {
            return cached;
        }

        let top = self
            .node_var(f)
            .min(self.node_var(g))
            .min(self.node_var(h));
        let (f_low, f_high) = self.cofactor_edges(f, top);
        let (g_low, g_high) = self.cofactor_edges(g, top);
        let (h_low, h_high) = self.cofactor_edges(h, top);

        let low = self.ite(f_low, g_low, h_low);
        let high = self.ite(f_high, g_high, h_high);
        let result = self.make_node(top, low, high);
        self.ite_cache.insert(key, result);
        result
    }

    /// Conjunction: `ite(f, g, FALSE)`.
    pub fn and(&mut self, f: BddEdge, g: BddEdge) -> BddEdge {
        self.ite(f, g, BddEdge::fals())
    }

    /// Disjunction: `ite(f, TRUE, g)`.
    pub fn or(&mut self, f: BddEdge, g: BddEdge) -> BddEdge {
        self.ite(f, BddEdge::tru(), g)
    }

    /// Negation: a pointer flip, no node allocation.
    pub fn not(&self, f: BddEdge) -> BddEdge {
        f.negate()
    }

    /// Exclusive or: `ite(f, !g, g)`.
    pub fn xor(&mut self, f: BddEdge, g: BddEdge) -> BddEdge {
        let not_g = g.negate();
        self.ite(f, not_g, g)
    }

    /// `k`-out-of-`n` threshold over already-built edges, via the standard
    /// recursive definition `atleast(k, [x, ..rest]) = ite(x, atleast(k-1,
    /// rest), atleast(k, rest))`. Bounded to small `n`/`k` in practice (fault
    /// tree voting gates); not memoized beyond the shared ITE/unique tables.
    pub fn at_least(&mut self, k: usize, args: &[BddEdge]) -> BddEdge {
        if k == 0 {
            return BddEdge::tru();
        }
        if k > args.len() {
            return BddEdge::fals();
        }
        let (first, rest) = args.split_first().expect("k <= args.len() and k > 0");
        let without = self.at_least(k, rest);
        let with = self.at_least(k - 1, rest);
        self.ite(*first, with, without)
    }

    /// Number of nodes reachable from `edge`, including the shared terminal.
    pub fn reachable_node_count(&self, edge: BddEdge) -> usize {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut stack = vec![edge.node];
        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            if let BddNodeData::Decision { low, high, .. } = &self.nodes[node.0 as usize] {
                stack.push(low.node);
                stack.push(high.node);
            }
        }
        seen.len()
    }
}

#[cfg(test)]
mod tests;
