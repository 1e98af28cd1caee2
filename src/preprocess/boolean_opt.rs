//! Pass 5: Boolean optimization — absorption and module extraction.

use super::normalize::rebuild_with;
use super::variable_support;
use crate::pdag::{Connective, Literal, NodeIndex, NodeKind, Pdag, TRUE_NODE};
use rustc_hash::{FxHashMap, FxHashSet};

/// `A ∨ (A ∧ X) = A` and its dual `A ∧ (A ∨ X) = A`. Implemented as a
/// node-local rewrite inside the same full-graph rebuild `normalize::rebuild`
/// uses, so a rewritten gate's new definition is visible to every caller
/// rather than leaving stale references behind.
pub(super) fn absorb(pdag: &mut Pdag) -> bool {
    rebuild_with(pdag, absorb_args)
}

fn absorb_args(pdag: &mut Pdag, connective: Connective, args: Vec<Literal>) -> Vec<Literal> {
    let opposite = match connective {
        Connective::And => Connective::Or,
        Connective::Or => Connective::And,
        _ => return args,
    };
    let present: FxHashSet<Literal> = args.iter().copied().collect();
    args.into_iter()
        .filter(|lit| {
            if lit.complement {
                return true;
            }
            match &pdag.node(lit.node).kind {
                NodeKind::Gate(inner_connective, inner_args) if *inner_connective == opposite => {
                    !inner_args.iter().any(|inner_lit| present.contains(inner_lit))
                }
                _ => true,
            }
        })
        .collect()
}

/// Identify single-parent subDAGs whose variable support is disjoint from
/// every sibling argument at their one parent gate. These are treated as
/// atomic blocks by variable ordering and MOCUS.
pub(super) fn detect_modules(pdag: &Pdag) -> Vec<NodeIndex> {
    let order = pdag.topological_order();

    let mut parent_count: FxHashMap<NodeIndex, usize> = FxHashMap::default();
    let mut parent_of: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
    for &index in &order {
        if let NodeKind::Gate(_, args) = &pdag.node(index).kind {
            for lit in args {
                *parent_count.entry(lit.node).or_insert(0) += 1;
                parent_of.insert(lit.node, index);
            }
        }
    }
    *parent_count.entry(pdag.root().node).or_insert(0) += 1;

    let mut modules = Vec::new();
    for &index in &order {
        if index == TRUE_NODE {
            continue;
        }
        if !matches!(pdag.node(index).kind, NodeKind::Gate(..)) {
            continue;
        }
        if parent_count.get(&index).copied().unwrap_or(0) != 1 {
            continue;
        }
        let Some(&parent_index) = parent_of.get(&index) else {
            continue;
        };
        let NodeKind::Gate(_, parent_args) = &pdag.node(parent_index).kind else {
            continue;
        };
        let own_support = variable_support(pdag, index);
        let disjoint = parent_args
            .iter()
            .filter(|lit| lit.node != index)
            .all(|lit| own_support.is_disjoint(&variable_support(pdag, lit.node)));
        if disjoint {
            modules.push(index);
        }
    }
    modules
}
