//! Pass 1/2/4/6: connective normalization, constant propagation, coalescing
//! and structural hashing — realized as a single full-graph rebuild through
//! the hash-consing interner (`Pdag::new_gate` already performs all four
//! identities as nodes are re-interned).

use crate::pdag::{Connective, Literal, NodeIndex, NodeKind, Pdag};
use rustc_hash::FxHashMap;

/// A node-local rewrite applied to a gate's already-remapped argument list
/// before it is re-interned. `normalize::rebuild` uses the identity
/// transform; `boolean_opt`/`decompose` plug in their own.
pub(super) type Transform = fn(&mut Pdag, Connective, Vec<Literal>) -> Vec<Literal>;

fn identity(_pdag: &mut Pdag, _connective: Connective, args: Vec<Literal>) -> Vec<Literal> {
    args
}

/// Rebuild every node reachable from the root through `Pdag::new_gate`,
/// applying `transform` to each gate's remapped argument list. Returns
/// whether the root or any reachable node's identity changed.
pub(super) fn rebuild_with(pdag: &mut Pdag, transform: Transform) -> bool {
    let order = pdag.topological_order();
    let mut map: FxHashMap<NodeIndex, Literal> = FxHashMap::default();
    let mut changed = false;

    let remap = |map: &FxHashMap<NodeIndex, Literal>, lit: Literal| -> Literal {
        let mapped = map.get(&lit.node).copied().unwrap_or(Literal {
            complement: false,
            node: lit.node,
        });
        if lit.complement {
            mapped.negate()
        } else {
            mapped
        }
    };

    for index in order {
        let kind = pdag.node(index).kind.clone();
        let new_lit = match kind {
            NodeKind::Variable(id) => pdag.get_or_create_variable(&id),
            NodeKind::Gate(connective, args) => {
                let remapped: Vec<Literal> = args.iter().map(|&lit| remap(&map, lit)).collect();
                let transformed = transform(pdag, connective, remapped);
                pdag.new_gate(connective, transformed)
            }
        };
        if new_lit.node != index || new_lit.complement {
            changed = true;
        }
        map.insert(index, new_lit);
    }

    let root = pdag.root();
    let new_root = remap(&map, root);
    if new_root != root {
        changed = true;
        pdag.set_root(new_root);
    }
    changed
}

/// Run the identity rebuild: constant propagation, coalescing and structural
/// hashing with no additional rewriting.
pub(super) fn rebuild(pdag: &mut Pdag) -> bool {
    rebuild_with(pdag, identity)
}
