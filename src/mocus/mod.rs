//! MOCUS: top-down minimal-cut-set extraction from a [`Pdag`], backed by
//! the ZBDD engine.
//!
//! MOCUS is, by its traditional definition, a coherent-tree algorithm: a
//! gate's minimal cut sets are built purely from its children's minimal cut
//! sets through union (OR) and cross product (AND), which is only valid
//! when negation is confined to basic-event leaves. This implementation
//! keeps that restriction rather than generalizing to full non-coherent
//! support: a negated leaf becomes a distinct pseudo-event (`"¬id"`), but a
//! negated *gate* reference — which would require complementing an entire
//! cut-set family, not a representable ZBDD operation in general — is
//! rejected with [`LogicError::InvariantViolated`].

use crate::cancellation::Checkpoint;
use crate::error::{LogicError, Result};
use crate::model::ccf::k_subsets;
use crate::model::EventId;
use crate::pdag::{Connective, Literal, NodeIndex, NodeKind, Pdag};
use crate::zbdd::{ZNodeId, ZbddManager};
use rustc_hash::FxHashMap;

fn negated_id(id: &str) -> EventId {
    format!("¬{id}")
}

/// Build the minimal-cut-set family of `pdag`'s root, returning the ZBDD
/// manager that owns it alongside the root family's node.
///
/// `checkpoint` is checked once per expansion step (one gate's family built
/// from its already-built children), the same granularity as the top-down
/// expansion the spec describes.
pub fn build(pdag: &Pdag, var_order: Vec<EventId>, checkpoint: &Checkpoint) -> Result<(ZbddManager, ZNodeId)> {
    let mut mgr = ZbddManager::new(var_order);
    let mut memo: FxHashMap<NodeIndex, ZNodeId> = FxHashMap::default();
    for index in pdag.topological_order() {
        checkpoint.check()?;
        let family = match &pdag.node(index).kind {
            NodeKind::Variable(_) => {
                // Built lazily per literal below, since the sign lives on the
                // edge, not the node; nothing to precompute for a bare variable.
                continue;
            }
            NodeKind::Gate(connective, args) => build_gate(&mut mgr, &memo, pdag, *connective, args)?,
        };
        memo.insert(index, family);
    }
    let root = resolve(&mut mgr, &memo, pdag, pdag.root())?;
    Ok((mgr, root))
}

fn resolve(
    mgr: &mut ZbddManager,
    memo: &FxHashMap<NodeIndex, ZNodeId>,
    pdag: &Pdag,
    lit: Literal,
) -> Result<ZNodeId> {
    if lit.node == crate::pdag::TRUE_NODE {
        // The universal terminal marker, not an ordinary gate: negating it
        // is the trivial true/false flip, not the general "complement a
        // cut-set family" problem.
        return Ok(if lit.complement {
            crate::zbdd::BOTTOM
        } else {
            crate::zbdd::UNIT
        });
    }
    match &pdag.node(lit.node).kind {
        NodeKind::Variable(id) => {
            let name = if lit.complement { negated_id(id) } else { id.clone() };
            Ok(mgr.single(&name))
        }
        NodeKind::Gate(..) => {
            if lit.complement {
                return Err(LogicError::InvariantViolated {
                    description: format!(
                        "MOCUS requires a coherent tree: gate node {:?} is referenced negated",
                        lit.node
                    ),
                }
                .into());
            }
            Ok(*memo
                .get(&lit.node)
                .expect("topological_order visits every node before its parents reference it"))
        }
    }
}

fn build_gate(
    mgr: &mut ZbddManager,
    memo: &FxHashMap<NodeIndex, ZNodeId>,
    pdag: &Pdag,
    connective: Connective,
    args: &[Literal],
) -> Result<ZNodeId> {
    let families: Vec<ZNodeId> = args
        .iter()
        .map(|lit| resolve(mgr, memo, pdag, *lit))
        .collect::<Result<_>>()?;

    // Every composition step below is immediately minimized: a union or
    // product of already-minimal sub-families is not itself guaranteed
    // minimal (e.g. `{a}` unioned with `{a,b}` keeps the non-minimal
    // `{a,b}`), so each gate's own result is re-minimized before it becomes
    // an argument to its parent. This is the "periodic minimization" that
    // keeps every intermediate family minimal during the top-down expansion.
    match connective {
        Connective::Or => Ok(families
            .into_iter()
            .reduce(|acc, f| {
                let unioned = mgr.union(acc, f);
                mgr.minimize(unioned)
            })
            .unwrap_or(crate::zbdd::BOTTOM)),
        Connective::And => Ok(families
            .into_iter()
            .reduce(|acc, f| {
                let combined = mgr.product(acc, f);
                mgr.minimize(combined)
            })
            .unwrap_or(crate::zbdd::UNIT)),
        Connective::AtLeast(k) => {
            let subsets = k_subsets(families.len(), k);
            let mut result = crate::zbdd::BOTTOM;
            for subset in subsets {
                let combo = subset
                    .into_iter()
                    .map(|i| families[i])
                    .reduce(|acc, f| mgr.product(acc, f))
                    .expect("k_subsets only yields non-empty subsets for k >= 1");
                result = mgr.union(result, combo);
            }
            Ok(mgr.minimize(result))
        }
        Connective::Xor => {
            // Only representable when both operands are bare (possibly
            // negated) leaves: XOR over sub-expressions would require
            // complementing a cut-set family, which is out of scope for a
            // coherent-tree algorithm.
            if args.len() != 2 {
                return Err(LogicError::InvariantViolated {
                    description: "XOR gate must have exactly two arguments by construction".into(),
                }
                .into());
            }
            for lit in args {
                if matches!(pdag.node(lit.node).kind, NodeKind::Gate(..)) {
                    return Err(LogicError::InvariantViolated {
                        description: "MOCUS cannot expand XOR over a sub-gate expression".into(),
                    }
                    .into());
                }
            }
            let a = families[0];
            let b = families[1];
            let not_a = negate_leaf(mgr, pdag, args[0]);
            let not_b = negate_leaf(mgr, pdag, args[1]);
            let a_and_not_b = mgr.product(a, not_b);
            let not_a_and_b = mgr.product(not_a, b);
            Ok(mgr.union(a_and_not_b, not_a_and_b))
        }
    }
}

fn negate_leaf(mgr: &mut ZbddManager, pdag: &Pdag, lit: Literal) -> ZNodeId {
    let NodeKind::Variable(id) = &pdag.node(lit.node).kind else {
        unreachable!("caller has already checked this literal is a bare leaf");
    };
    let name = if lit.complement { id.clone() } else { negated_id(id) };
    mgr.single(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arg, ArgRef, BasicEvent, Connective as ModelConnective, Gate, Model, ProbabilityExpression};

    fn and_or_model() -> Model {
        Model {
            basic_events: vec!["a", "b", "c"]
                .into_iter()
                .map(|id| BasicEvent {
                    id: id.into(),
                    probability: ProbabilityExpression::Constant(0.1),
                })
                .collect(),
            house_events: vec![],
            gates: vec![
                Gate {
                    id: "and1".into(),
                    connective: ModelConnective::And,
                    args: vec![
                        Arg::positive(ArgRef::BasicEvent("a".into())),
                        Arg::positive(ArgRef::BasicEvent("b".into())),
                    ],
                },
                Gate {
                    id: "top".into(),
                    connective: ModelConnective::Or,
                    args: vec![
                        Arg::positive(ArgRef::Gate("and1".into())),
                        Arg::positive(ArgRef::BasicEvent("c".into())),
                    ],
                },
            ],
            ccf_groups: vec![],
            root: "top".into(),
        }
    }

    #[test]
    fn or_of_and_and_leaf_yields_two_minimal_cut_sets() {
        let model = and_or_model();
        let pdag = Pdag::from_model(&model).unwrap();
        let order = crate::bdd::depth_first_order(&pdag);
        let (mgr, root) = build(&pdag, order, &Checkpoint::none()).unwrap();
        assert_eq!(mgr.count(root), 2);
        let mut cut_sets = mgr.enumerate(root);
        cut_sets.sort();
        assert_eq!(
            cut_sets,
            vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]]
        );
    }

    #[test]
    fn at_least_two_of_three_yields_three_pair_cut_sets() {
        let model = Model {
            basic_events: vec!["a", "b", "c"]
                .into_iter()
                .map(|id| BasicEvent {
                    id: id.into(),
                    probability: ProbabilityExpression::Constant(0.1),
                })
                .collect(),
            house_events: vec![],
            gates: vec![Gate {
                id: "top".into(),
                connective: ModelConnective::AtLeast(2),
                args: vec![
                    Arg::positive(ArgRef::BasicEvent("a".into())),
                    Arg::positive(ArgRef::BasicEvent("b".into())),
                    Arg::positive(ArgRef::BasicEvent("c".into())),
                ],
            }],
            ccf_groups: vec![],
            root: "top".into(),
        };
        let pdag = Pdag::from_model(&model).unwrap();
        let order = crate::bdd::depth_first_order(&pdag);
        let (mgr, root) = build(&pdag, order, &Checkpoint::none()).unwrap();
        assert_eq!(mgr.count(root), 3);
    }

    #[test]
    fn and_of_two_ors_sharing_a_variable_stays_minimal() {
        // AND(OR(a,b), OR(a,c)) expands, without minimization, to
        // {a,a}={a}, {a,c}, {b,a}, {b,c} — {a} is a subset of {a,c} and
        // {a,b}, so those two must be dropped by the periodic minimization
        // inside `build_gate`, leaving only {a} and {b,c}.
        let model = Model {
            basic_events: vec!["a", "b", "c"]
                .into_iter()
                .map(|id| BasicEvent {
                    id: id.into(),
                    probability: ProbabilityExpression::Constant(0.1),
                })
                .collect(),
            house_events: vec![],
            gates: vec![
                Gate {
                    id: "or1".into(),
                    connective: ModelConnective::Or,
                    args: vec![
                        Arg::positive(ArgRef::BasicEvent("a".into())),
                        Arg::positive(ArgRef::BasicEvent("b".into())),
                    ],
                },
                Gate {
                    id: "or2".into(),
                    connective: ModelConnective::Or,
                    args: vec![
                        Arg::positive(ArgRef::BasicEvent("a".into())),
                        Arg::positive(ArgRef::BasicEvent("c".into())),
                    ],
                },
                Gate {
                    id: "top".into(),
                    connective: ModelConnective::And,
                    args: vec![
                        Arg::positive(ArgRef::Gate("or1".into())),
                        Arg::positive(ArgRef::Gate("or2".into())),
                    ],
                },
            ],
            ccf_groups: vec![],
            root: "top".into(),
        };
        let pdag = Pdag::from_model(&model).unwrap();
        let order = crate::bdd::depth_first_order(&pdag);
        let (mgr, root) = build(&pdag, order, &Checkpoint::none()).unwrap();
        let mut cut_sets = mgr.enumerate(root);
        cut_sets.sort();
        assert_eq!(
            cut_sets,
            vec![vec!["a".to_string()], vec!["b".to_string(), "c".to_string()]]
        );
    }
}
