//! Pass 7: bounded common-factor extraction, e.g.
//! `OR(AND(a,x), AND(a,y)) = AND(a, OR(x,y))`.
//!
//! Only a single literal shared by two or more AND-gate arguments of an OR
//! is factored per rewrite; the fixpoint loop in [`super::Preprocessor::run`]
//! applies it repeatedly, so nested common factors are still found, one
//! layer at a time.

use super::normalize::rebuild_with;
use crate::pdag::{Connective, Literal, NodeKind, Pdag};

pub(super) fn factor_common_literals(pdag: &mut Pdag) -> bool {
    rebuild_with(pdag, factor_args)
}

fn factor_args(pdag: &mut Pdag, connective: Connective, args: Vec<Literal>) -> Vec<Literal> {
    if connective != Connective::Or {
        return args;
    }

    let and_children: Vec<(usize, Vec<Literal>)> = args
        .iter()
        .enumerate()
        .filter_map(|(i, lit)| {
            if lit.complement {
                return None;
            }
            match &pdag.node(lit.node).kind {
                NodeKind::Gate(Connective::And, inner) => Some((i, inner.clone())),
                _ => None,
            }
        })
        .collect();
    if and_children.len() < 2 {
        return args;
    }

    let common = and_children.iter().find_map(|(_, inner)| {
        inner.iter().copied().find(|&candidate| {
            and_children
                .iter()
                .filter(|(_, other)| other.contains(&candidate))
                .count()
                >= 2
        })
    });
    let Some(common) = common else {
        return args;
    };

    let matching: Vec<usize> = and_children
        .iter()
        .filter(|(_, inner)| inner.contains(&common))
        .map(|(i, _)| *i)
        .collect();

    let mut rest_or_args = Vec::new();
    let mut new_args = Vec::new();
    for (i, lit) in args.into_iter().enumerate() {
        if !matching.contains(&i) {
            new_args.push(lit);
            continue;
        }
        let NodeKind::Gate(Connective::And, inner) = &pdag.node(lit.node).kind else {
            unreachable!("matching index was filtered to AND-gate args above");
        };
        let remaining: Vec<Literal> = inner.iter().copied().filter(|&l| l != common).collect();
        let sub = match remaining.len() {
            0 => Literal::tru(),
            1 => remaining[0],
            _ => pdag.new_gate(Connective::And, remaining),
        };
        rest_or_args.push(sub);
    }
    let or_rest = pdag.new_gate(Connective::Or, rest_or_args);
    let factored = pdag.new_gate(Connective::And, vec![common, or_rest]);
    new_args.push(factored);
    new_args
}
