//! Post-order PDAG → BDD compilation.

use super::{BddEdge, BddManager};
use crate::model::EventId;
use crate::pdag::{Connective, Literal, NodeIndex, NodeKind, Pdag};
use rustc_hash::FxHashMap;

/// Compile `pdag` into a BDD using the given variable `order`. Returns the
/// manager (owning every node built) and the edge representing the PDAG's
/// root.
pub fn compile(pdag: &Pdag, order: Vec<EventId>) -> (BddManager, BddEdge) {
    let mut manager = BddManager::new(order);
    let mut memo: FxHashMap<NodeIndex, BddEdge> = FxHashMap::default();
    for index in pdag.topological_order() {
        let edge = match &pdag.node(index).kind {
            NodeKind::Variable(id) => manager.variable(id),
            NodeKind::Gate(connective, args) => {
                let operands: Vec<BddEdge> = args
                    .iter()
                    .map(|lit| resolve(&memo, *lit))
                    .collect();
                build_gate(&mut manager, *connective, &operands)
            }
        };
        memo.insert(index, edge);
    }
    let root = resolve(&memo, pdag.root());
    (manager, root)
}

fn resolve(memo: &FxHashMap<NodeIndex, BddEdge>, lit: Literal) -> BddEdge {
    let edge = *memo
        .get(&lit.node)
        .expect("topological_order visits every node before its parents reference it");
    if lit.complement {
        edge.negate()
    } else {
        edge
    }
}

fn build_gate(manager: &mut BddManager, connective: Connective, operands: &[BddEdge]) -> BddEdge {
    match connective {
        Connective::And => operands
            .iter()
            .copied()
            .reduce(|acc, e| manager.and(acc, e))
            .unwrap_or_else(BddEdge::tru),
        Connective::Or => operands
            .iter()
            .copied()
            .reduce(|acc, e| manager.or(acc, e))
            .unwrap_or_else(BddEdge::fals),
        Connective::Xor => operands
            .iter()
            .copied()
            .reduce(|acc, e| manager.xor(acc, e))
            .unwrap_or_else(BddEdge::fals),
        Connective::AtLeast(k) => manager.at_least(k, operands),
    }
}
