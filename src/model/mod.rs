//! The in-memory model an external loader hands to this kernel.
//!
//! An XML (Open-PSA MEF) loader is an external collaborator; what it
//! produces is the plain data described here. This module also owns CCF
//! group expansion, since that is a pure model-to-model transform that
//! must run before `Pdag::from_model`.

pub mod ccf;
pub mod expression;

pub use ccf::{CcfExpansion, CcfGroup, CcfModel};
pub use expression::ProbabilityExpression;

use crate::error::ValidityError;
use std::collections::{HashMap, HashSet};

/// A stable model identifier (gate, basic event, or house event name).
pub type EventId = String;

/// A leaf with an assigned probability or distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicEvent {
    /// Stable identifier.
    pub id: EventId,
    /// Probability expression evaluated against mission time.
    pub probability: ProbabilityExpression,
}

/// A leaf with a fixed boolean state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseEvent {
    /// Stable identifier.
    pub id: EventId,
    /// Fixed boolean state.
    pub state: bool,
}

/// The Boolean connective of a [`Gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
    /// `k`-out-of-`n` voting gate.
    AtLeast(usize),
    /// Exclusive or.
    Xor,
    /// Negation (arity 1).
    Not,
    /// NAND (arity 2+, negated AND).
    Nand,
    /// NOR (arity 2+, negated OR).
    Nor,
    /// Forwards its single argument unchanged.
    Null,
    /// Material implication (arity 2).
    Imply,
    /// Logical biconditional (arity 2).
    Iff,
    /// A fixed boolean constant, arity 0.
    Constant(bool),
}

/// What a gate argument refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgRef {
    /// Another gate, by id.
    Gate(EventId),
    /// A basic event, by id.
    BasicEvent(EventId),
    /// A house event, by id.
    HouseEvent(EventId),
}

impl ArgRef {
    fn id(&self) -> &str {
        match self {
            ArgRef::Gate(id) | ArgRef::BasicEvent(id) | ArgRef::HouseEvent(id) => id,
        }
    }
}

/// A signed reference to a gate or basic/house event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Whether this argument is negated.
    pub complement: bool,
    /// What it refers to.
    pub reference: ArgRef,
}

impl Arg {
    /// Construct a non-negated argument.
    pub fn positive(reference: ArgRef) -> Self {
        Arg {
            complement: false,
            reference,
        }
    }

    /// Construct a negated argument.
    pub fn negated(reference: ArgRef) -> Self {
        Arg {
            complement: true,
            reference,
        }
    }
}

/// A gate: connective over an ordered list of signed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    /// Stable identifier.
    pub id: EventId,
    /// The connective.
    pub connective: Connective,
    /// Ordered arguments.
    pub args: Vec<Arg>,
}

/// A fault-tree model: gates over basic/house events, plus CCF groups.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// All basic events, by id.
    pub basic_events: Vec<BasicEvent>,
    /// All house events, by id.
    pub house_events: Vec<HouseEvent>,
    /// All gates, by id.
    pub gates: Vec<Gate>,
    /// Common-cause failure groups.
    pub ccf_groups: Vec<CcfGroup>,
    /// Identifier of the root gate.
    pub root: EventId,
}

impl Model {
    /// Validate structural and semantic invariants: no undefined
    /// references, no cycles, probabilities in `[0, 1]`, and `ATLEAST`
    /// thresholds within range.
    ///
    /// This crate's primary validator is the external loader; this method
    /// exists so the kernel can defensively re-check a model it did not load
    /// itself (e.g. one assembled by a test or by CCF expansion).
    pub fn validate(&self) -> Result<(), ValidityError> {
        let mut known: HashSet<&str> = HashSet::new();
        for be in &self.basic_events {
            known.insert(be.id.as_str());
        }
        for he in &self.house_events {
            known.insert(he.id.as_str());
        }
        for g in &self.gates {
            known.insert(g.id.as_str());
        }

        for be in &self.basic_events {
            let p = be.probability.evaluate(0.0);
            if !(0.0..=1.0).contains(&p) {
                return Err(ValidityError::ProbabilityOutOfRange {
                    event: be.id.clone(),
                    value: p,
                });
            }
        }

        let gate_index: HashMap<&str, &Gate> =
            self.gates.iter().map(|g| (g.id.as_str(), g)).collect();

        for g in &self.gates {
            if let Connective::AtLeast(k) = g.connective {
                if k < 1 || k > g.args.len() {
                    return Err(ValidityError::InvalidAtLeast {
                        gate: g.id.clone(),
                        k,
                        num_args: g.args.len(),
                    });
                }
            }
            for arg in &g.args {
                if !known.contains(arg.reference.id()) {
                    return Err(ValidityError::UndefinedReference {
                        reference: arg.reference.id().to_string(),
                    });
                }
            }
        }

        self.check_acyclic(&gate_index)?;
        Ok(())
    }

    fn check_acyclic(&self, gate_index: &HashMap<&str, &Gate>) -> Result<(), ValidityError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }
        let mut marks: HashMap<&str, Mark> = HashMap::new();

        fn visit<'a>(
            gate: &'a Gate,
            gate_index: &HashMap<&'a str, &'a Gate>,
            marks: &mut HashMap<&'a str, Mark>,
        ) -> Result<(), ValidityError> {
            match marks.get(gate.id.as_str()) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::InProgress) => {
                    return Err(ValidityError::Cycle {
                        gate: gate.id.clone(),
                    })
                }
                None => {}
            }
            marks.insert(gate.id.as_str(), Mark::InProgress);
            for arg in &gate.args {
                if let ArgRef::Gate(id) = &arg.reference {
                    if let Some(child) = gate_index.get(id.as_str()) {
                        visit(child, gate_index, marks)?;
                    }
                }
            }
            marks.insert(gate.id.as_str(), Mark::Done);
            Ok(())
        }

        for g in &self.gates {
            visit(g, gate_index, &mut marks)?;
        }
        Ok(())
    }

    /// Expand every CCF group in place: synthesize the new basic events and
    /// rewrite every gate argument that referenced an original group member
    /// to instead point at a fresh OR-gate over the expansion's replacement
    /// events, preserving the original argument's complement bit.
    pub fn expand_ccf_groups(&mut self) {
        if self.ccf_groups.is_empty() {
            return;
        }
        let groups = std::mem::take(&mut self.ccf_groups);
        let mut synthetic_gate_counter = 0usize;
        for group in &groups {
            let expansion = group.expand(&self.basic_events);
            self.basic_events.extend(expansion.new_basic_events);

            for (member, replacement_ids) in &expansion.replacements {
                if replacement_ids.is_empty() {
                    continue;
                }
                let or_gate_id = format!("__ccf_or_{}_{}", group.id, synthetic_gate_counter);
                synthetic_gate_counter += 1;
                let or_gate = Gate {
                    id: or_gate_id.clone(),
                    connective: Connective::Or,
                    args: replacement_ids
                        .iter()
                        .map(|id| Arg::positive(ArgRef::BasicEvent(id.clone())))
                        .collect(),
                };
                self.gates.push(or_gate);

                for gate in &mut self.gates {
                    if gate.id == or_gate_id {
                        continue;
                    }
                    for arg in &mut gate.args {
                        if arg.reference == ArgRef::BasicEvent(member.clone()) {
                            arg.reference = ArgRef::Gate(or_gate_id.clone());
                        }
                    }
                }
                if self.root == *member {
                    self.root = or_gate_id.clone();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_and_model() -> Model {
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
                connective: Connective::And,
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
    fn valid_model_passes_validation() {
        assert!(simple_and_model().validate().is_ok());
    }

    #[test]
    fn undefined_reference_is_rejected() {
        let mut model = simple_and_model();
        model.gates[0]
            .args
            .push(Arg::positive(ArgRef::BasicEvent("ghost".into())));
        assert_eq!(
            model.validate(),
            Err(ValidityError::UndefinedReference {
                reference: "ghost".into()
            })
        );
    }

    #[test]
    fn self_referencing_gate_is_a_cycle() {
        let mut model = simple_and_model();
        model.gates[0]
            .args
            .push(Arg::positive(ArgRef::Gate("top".into())));
        assert!(matches!(
            model.validate(),
            Err(ValidityError::Cycle { .. })
        ));
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let mut model = simple_and_model();
        model.basic_events[0].probability = ProbabilityExpression::Constant(1.5);
        assert!(matches!(
            model.validate(),
            Err(ValidityError::ProbabilityOutOfRange { .. })
        ));
    }

    #[test]
    fn ccf_expansion_rewrites_references() {
        let mut model = simple_and_model();
        model.ccf_groups.push(CcfGroup {
            id: "g".into(),
            members: vec!["a".into(), "b".into()],
            model: CcfModel::BetaFactor { beta: 0.2 },
        });
        model.expand_ccf_groups();
        assert!(model.ccf_groups.is_empty());
        // "a" and "b" no longer appear directly as an argument of "top".
        let top = model.gates.iter().find(|g| g.id == "top").unwrap();
        for arg in &top.args {
            assert!(!matches!(&arg.reference, ArgRef::BasicEvent(id) if id == "a" || id == "b"));
        }
        assert!(model.validate().is_ok());
    }
}
