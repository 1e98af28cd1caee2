//! Variable ordering heuristic.
//!
//! A depth-first, first-seen traversal from the PDAG root. Modules detected
//! by the preprocessor are subDAGs visited in one contiguous descent, so
//! this already groups a module's variables together in the order without
//! any special-casing — the classic cheap heuristic for keeping related
//! variables close, which keeps the resulting BDD small.

use crate::pdag::{NodeKind, Pdag};
use crate::model::EventId;
use rustc_hash::FxHashSet;

/// Compute a variable order by preorder depth-first traversal from the root.
pub fn depth_first_order(pdag: &Pdag) -> Vec<EventId> {
    let mut order = Vec::new();
    let mut seen_vars = FxHashSet::default();
    let mut visited_nodes = FxHashSet::default();
    let mut stack = vec![pdag.root().node];
    while let Some(index) = stack.pop() {
        if !visited_nodes.insert(index) {
            continue;
        }
        match &pdag.node(index).kind {
            NodeKind::Variable(id) => {
                if seen_vars.insert(id.clone()) {
                    order.push(id.clone());
                }
            }
            NodeKind::Gate(_, args) => {
                for lit in args.iter().rev() {
                    stack.push(lit.node);
                }
            }
        }
    }
    order
}
