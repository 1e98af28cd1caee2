use super::*;
use crate::model::{Arg, ArgRef, BasicEvent, Connective as ModelConnective, Gate, Model, ProbabilityExpression};
use crate::pdag::Pdag;
use std::collections::HashMap as StdHashMap;

fn and_ab_model() -> Model {
    Model {
        basic_events: vec![
            BasicEvent {
                id: "a".into(),
                probability: ProbabilityExpression::Constant(0.1),
            },
            BasicEvent {
                id: "b".into(),
                probability: ProbabilityExpression::Constant(0.1),
            },
        ],
        house_events: vec![],
        gates: vec![Gate {
            id: "top".into(),
            connective: ModelConnective::And,
            args: vec![
                Arg::positive(ArgRef::BasicEvent("a".into())),
                Arg::positive(ArgRef::BasicEvent("b".into())),
            ],
        }],
        ccf_groups: vec![],
        root: "top".into(),
    }
}

#[test]
fn make_node_collapses_redundant_test() {
    let mut mgr = BddManager::new(vec!["a".into()]);
    let low = BddEdge::fals();
    let node = mgr.make_node(0, low, low);
    assert_eq!(node, low, "identical low/high must collapse, not allocate");
}

#[test]
fn and_of_two_variables_matches_truth_table() {
    let mut mgr = BddManager::new(vec!["a".into(), "b".into()]);
    let a = mgr.variable("a");
    let b = mgr.variable("b");
    let and_ab = mgr.and(a, b);

    let mut probs = StdHashMap::new();
    probs.insert("a".to_string(), 0.1);
    probs.insert("b".to_string(), 0.1);
    let probs: rustc_hash::FxHashMap<_, _> = probs.into_iter().collect();
    let p = mgr.probability(and_ab, &probs);
    assert!((p - 0.01).abs() < 1e-9);
}

#[test]
fn not_is_a_pointer_flip_with_no_new_node() {
    let mut mgr = BddManager::new(vec!["a".into()]);
    let a = mgr.variable("a");
    let before = mgr.len();
    let not_a = mgr.not(a);
    assert_eq!(mgr.len(), before, "negation must not allocate a node");
    assert_eq!(not_a, a.negate());
}

#[test]
fn xor_of_identical_variables_is_false() {
    let mut mgr = BddManager::new(vec!["a".into()]);
    let a = mgr.variable("a");
    let result = mgr.xor(a, a);
    assert_eq!(result, BddEdge::fals());
}

#[test]
fn at_least_one_of_two_equals_or() {
    let mut mgr = BddManager::new(vec!["a".into(), "b".into()]);
    let a = mgr.variable("a");
    let b = mgr.variable("b");
    let or_ab = mgr.or(a, b);
    let at_least_1 = mgr.at_least(1, &[a, b]);
    assert_eq!(or_ab, at_least_1);
}

#[test]
fn at_least_n_of_n_equals_and() {
    let mut mgr = BddManager::new(vec!["a".into(), "b".into()]);
    let a = mgr.variable("a");
    let b = mgr.variable("b");
    let and_ab = mgr.and(a, b);
    let at_least_2 = mgr.at_least(2, &[a, b]);
    assert_eq!(and_ab, at_least_2);
}

#[test]
fn compile_from_pdag_computes_exact_and_probability() {
    let model = and_ab_model();
    let pdag = Pdag::from_model(&model).unwrap();
    let order = super::depth_first_order(&pdag);
    let (mgr, root) = super::compile(&pdag, order);

    let mut probs = rustc_hash::FxHashMap::default();
    probs.insert("a".to_string(), 0.1);
    probs.insert("b".to_string(), 0.1);
    let p = mgr.probability(root, &probs);
    assert!((p - 0.01).abs() < 1e-9);
}

#[test]
fn cofactor_at_true_forces_event_on() {
    let mut mgr = BddManager::new(vec!["a".into(), "b".into()]);
    let a = mgr.variable("a");
    let b = mgr.variable("b");
    let and_ab = mgr.and(a, b);
    let cofactored = mgr.cofactor(and_ab, "a", true);
    assert_eq!(cofactored, b, "AND(a,b) with a forced true reduces to b");
}

#[test]
fn cofactor_at_false_forces_event_off() {
    let mut mgr = BddManager::new(vec!["a".into(), "b".into()]);
    let a = mgr.variable("a");
    let b = mgr.variable("b");
    let or_ab = mgr.or(a, b);
    let cofactored = mgr.cofactor(or_ab, "a", false);
    assert_eq!(cofactored, b, "OR(a,b) with a forced false reduces to b");
}
