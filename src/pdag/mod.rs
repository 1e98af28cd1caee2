//! The Boolean DAG (PDAG): a normalized, in-memory representation of the
//! fault tree as a rooted DAG of typed gates and literal-referenced
//! variables.
//!
//! Shaped after the same arena-of-nodes-plus-unique-table design as
//! `src/bdd/mod.rs`'s `BddManager`: nodes live in a single growing `Vec`
//! addressed by a stable integer handle, and a hash-cons table folds
//! structurally identical subgraphs into one node as they are created.

use crate::error::{LogicError, ValidityError};
use crate::model::{ArgRef, Connective as ModelConnective, EventId, Gate, Model};
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Stable handle to a [`Node`] in a [`Pdag`]'s arena. Indices only grow; a
/// `NodeIndex` is valid for the lifetime of the `Pdag` that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

/// The constant-TRUE terminal. FALSE is this node's complement.
pub const TRUE_NODE: NodeIndex = NodeIndex(0);

/// A signed reference to a node: the fundamental edge type of the PDAG.
/// Negation is carried here, never by a dedicated NOT gate, once the PDAG
/// has been constructed from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    /// Whether this edge complements the referenced node.
    pub complement: bool,
    /// The referenced node.
    pub node: NodeIndex,
}

impl Literal {
    /// The constant TRUE literal.
    pub const fn tru() -> Self {
        Literal {
            complement: false,
            node: TRUE_NODE,
        }
    }

    /// The constant FALSE literal.
    pub const fn fals() -> Self {
        Literal {
            complement: true,
            node: TRUE_NODE,
        }
    }

    /// This literal with its complement bit flipped.
    pub fn negate(self) -> Self {
        Literal {
            complement: !self.complement,
            node: self.node,
        }
    }

    /// Whether this literal is one of the two constants.
    pub fn is_constant(self) -> bool {
        self.node == TRUE_NODE
    }

    /// The boolean value of this literal, if it is constant.
    pub fn constant_value(self) -> Option<bool> {
        self.is_constant().then_some(!self.complement)
    }
}

/// The restricted connective set that survives into the PDAG: negation is an
/// edge attribute, so NOT/NAND/NOR/IMPLY/IFF never appear as node kinds here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
    /// `k`-out-of-`n` voting gate.
    AtLeast(usize),
    /// Exclusive or (even-parity negated), arity exactly 2.
    Xor,
}

/// What a PDAG node represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A basic-event leaf, by model identifier.
    Variable(EventId),
    /// An internal gate over an ordered list of argument edges.
    Gate(Connective, Vec<Literal>),
}

/// A node in the PDAG arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Monotonically increasing creation index (also this node's `NodeIndex.0`).
    pub index: NodeIndex,
    /// The node's kind.
    pub kind: NodeKind,
}

/// Hash-cons key: a node's structural identity, used to fold duplicate
/// subgraphs into one node: no two structurally equivalent subgraphs
/// survive the merging pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConsKey {
    Variable(EventId),
    Gate(Connective, Vec<Literal>),
}

/// A rooted Boolean DAG. Built once per analysis via [`Pdag::from_model`],
/// mutated only by the preprocessor, then [`Pdag::freeze`]-ed.
#[derive(Debug, Clone)]
pub struct Pdag {
    nodes: Vec<Node>,
    hash_cons: FxHashMap<ConsKey, NodeIndex>,
    root: Literal,
    frozen: bool,
}

impl Pdag {
    /// A fresh PDAG containing only the TRUE/FALSE singleton and rooted at FALSE.
    pub fn new() -> Self {
        Pdag {
            nodes: vec![Node {
                index: TRUE_NODE,
                kind: NodeKind::Gate(Connective::And, Vec::new()),
            }],
            hash_cons: FxHashMap::default(),
            root: Literal::fals(),
            frozen: false,
        }
    }

    /// The node the given index refers to.
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.0 as usize]
    }

    /// Number of nodes in the arena, including the TRUE terminal.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena contains only the terminal.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// The root literal of the tree this PDAG represents.
    pub fn root(&self) -> Literal {
        self.root
    }

    /// Set the root literal. Used by the preprocessor when a pass replaces
    /// the top node (e.g. constant propagation proving the whole tree constant).
    pub fn set_root(&mut self, root: Literal) {
        self.root = root;
    }

    /// Whether [`Pdag::freeze`] has been called.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Get-or-create a variable leaf for the given basic-event id.
    pub fn get_or_create_variable(&mut self, id: &str) -> Literal {
        let key = ConsKey::Variable(id.to_string());
        if let Some(&existing) = self.hash_cons.get(&key) {
            return Literal {
                complement: false,
                node: existing,
            };
        }
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            index,
            kind: NodeKind::Variable(id.to_string()),
        });
        self.hash_cons.insert(key, index);
        Literal {
            complement: false,
            node: index,
        }
    }

    /// Get-or-create a gate node, applying the Boolean identities that make
    /// hash-consing meaningful: duplicate-argument absorption, constant
    /// folding, complementary-argument short-circuiting, and the 0-/1-argument
    /// identity folds. Returns the resulting literal, which may be a
    /// pre-existing node, a freshly hash-consed one, or a constant.
    pub fn new_gate(&mut self, connective: Connective, args: Vec<Literal>) -> Literal {
        match connective {
            Connective::And => self.new_and_or(true, args),
            Connective::Or => self.new_and_or(false, args),
            Connective::Xor => self.new_xor(args),
            Connective::AtLeast(k) => self.new_at_least(k, args),
        }
    }

    fn new_and_or(&mut self, is_and: bool, mut args: Vec<Literal>) -> Literal {
        let identity = if is_and { Literal::tru() } else { Literal::fals() };
        let annihilator = identity.negate();

        args.retain(|&lit| lit != identity);
        args.sort_by_key(|lit| (lit.node, lit.complement));
        args.dedup();

        for &lit in &args {
            if lit == annihilator {
                return annihilator;
            }
        }
        // A AND ~A (or A OR ~A) present among args: check for complementary pairs.
        for window in args.windows(2) {
            if window[0].node == window[1].node && window[0].complement != window[1].complement {
                return annihilator;
            }
        }

        match args.len() {
            0 => identity,
            1 => args[0],
            _ => {
                let connective = if is_and { Connective::And } else { Connective::Or };
                self.intern_gate(connective, args)
            }
        }
    }

    fn new_xor(&mut self, args: Vec<Literal>) -> Literal {
        assert_eq!(args.len(), 2, "Xor is restricted to arity 2 in this PDAG");
        let (a, b) = (args[0], args[1]);
        if let (Some(av), Some(bv)) = (a.constant_value(), b.constant_value()) {
            return if av ^ bv { Literal::tru() } else { Literal::fals() };
        }
        if a.node == b.node {
            return if a.complement == b.complement {
                Literal::fals()
            } else {
                Literal::tru()
            };
        }
        self.intern_gate(Connective::Xor, vec![a, b])
    }

    fn new_at_least(&mut self, k: usize, mut args: Vec<Literal>) -> Literal {
        args.sort_by_key(|lit| (lit.node, lit.complement));
        args.dedup();
        if k == 0 {
            return Literal::tru();
        }
        if k > args.len() {
            return Literal::fals();
        }
        if k == args.len() {
            return self.new_and_or(true, args);
        }
        if k == 1 {
            return self.new_and_or(false, args);
        }
        self.intern_gate(Connective::AtLeast(k), args)
    }

    fn intern_gate(&mut self, connective: Connective, args: Vec<Literal>) -> Literal {
        let key = ConsKey::Gate(connective, args.clone());
        if let Some(&existing) = self.hash_cons.get(&key) {
            return Literal {
                complement: false,
                node: existing,
            };
        }
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            index,
            kind: NodeKind::Gate(connective, args),
        });
        self.hash_cons.insert(key, index);
        Literal {
            complement: false,
            node: index,
        }
    }

    /// Build a PDAG from a validated [`Model`], translating NAND/NOR/IMPLY/IFF
    /// into AND/OR plus edge complements and forwarding NULL/NOT gates as
    /// literal negation, matching the connective-normalization pass.
    pub fn from_model(model: &Model) -> Result<Self, ValidityError> {
        model.validate()?;
        let mut pdag = Pdag::new();
        let mut built: HashMap<&str, Literal> = HashMap::new();

        for he in &model.house_events {
            built.insert(he.id.as_str(), if he.state { Literal::tru() } else { Literal::fals() });
        }
        for be in &model.basic_events {
            let lit = pdag.get_or_create_variable(&be.id);
            built.insert(be.id.as_str(), lit);
        }

        let gate_index: HashMap<&str, &Gate> =
            model.gates.iter().map(|g| (g.id.as_str(), g)).collect();

        fn build<'a>(
            id: &'a str,
            gate_index: &HashMap<&'a str, &'a Gate>,
            built: &mut HashMap<&'a str, Literal>,
            pdag: &mut Pdag,
        ) -> Literal {
            if let Some(&lit) = built.get(id) {
                return lit;
            }
            let gate = gate_index[id];
            let arg_lits: Vec<Literal> = gate
                .args
                .iter()
                .map(|arg| {
                    let base = match &arg.reference {
                        ArgRef::Gate(gid) => build(gid.as_str(), gate_index, built, pdag),
                        ArgRef::BasicEvent(bid) => built[bid.as_str()],
                        ArgRef::HouseEvent(hid) => built[hid.as_str()],
                    };
                    if arg.complement {
                        base.negate()
                    } else {
                        base
                    }
                })
                .collect();

            let result = match gate.connective {
                ModelConnective::And => pdag.new_gate(Connective::And, arg_lits),
                ModelConnective::Or => pdag.new_gate(Connective::Or, arg_lits),
                ModelConnective::AtLeast(k) => pdag.new_gate(Connective::AtLeast(k), arg_lits),
                ModelConnective::Xor => {
                    arg_lits
                        .into_iter()
                        .reduce(|acc, lit| pdag.new_gate(Connective::Xor, vec![acc, lit]))
                        .unwrap_or(Literal::fals())
                }
                ModelConnective::Not | ModelConnective::Null => {
                    let lit = arg_lits[0];
                    if matches!(gate.connective, ModelConnective::Not) {
                        lit.negate()
                    } else {
                        lit
                    }
                }
                ModelConnective::Nand => {
                    pdag.new_gate(Connective::And, arg_lits).negate()
                }
                ModelConnective::Nor => pdag.new_gate(Connective::Or, arg_lits).negate(),
                ModelConnective::Imply => {
                    let a = arg_lits[0].negate();
                    let b = arg_lits[1];
                    pdag.new_gate(Connective::Or, vec![a, b])
                }
                ModelConnective::Iff => pdag.new_gate(Connective::Xor, arg_lits).negate(),
                ModelConnective::Constant(value) => {
                    if value {
                        Literal::tru()
                    } else {
                        Literal::fals()
                    }
                }
            };
            built.insert(id, result);
            result
        }

        let root = build(model.root.as_str(), &gate_index, &mut built, &mut pdag);
        pdag.set_root(root);
        Ok(pdag)
    }

    /// Freeze the PDAG: verify post-construction invariants and prevent
    /// further mutation.
    ///
    /// Checked invariants: every non-terminal gate is reachable from the
    /// root (unreachable nodes are simply not visited by downstream engines,
    /// but a dangling root is a [`LogicError`]); every `AtLeast(k, args)` has
    /// `1 <= k <= args.len()`; every AND/OR/XOR has at least one argument.
    pub fn freeze(&mut self) -> Result<(), LogicError> {
        if self.root.node.0 as usize >= self.nodes.len() {
            return Err(LogicError::DanglingHandle {
                index: self.root.node.0 as usize,
            });
        }
        for node in &self.nodes {
            if let NodeKind::Gate(connective, args) = &node.kind {
                if node.index == TRUE_NODE {
                    continue;
                }
                match connective {
                    Connective::AtLeast(k) => {
                        if *k < 1 || *k > args.len() {
                            return Err(LogicError::InvariantViolated {
                                description: format!(
                                    "ATLEAST({k}) node {:?} has {} args",
                                    node.index,
                                    args.len()
                                ),
                            });
                        }
                    }
                    Connective::Xor => {
                        if args.len() != 2 {
                            return Err(LogicError::InvariantViolated {
                                description: format!("XOR node {:?} is not arity 2", node.index),
                            });
                        }
                    }
                    Connective::And | Connective::Or => {
                        if args.is_empty() {
                            return Err(LogicError::InvariantViolated {
                                description: format!(
                                    "AND/OR node {:?} has zero arguments post-freeze",
                                    node.index
                                ),
                            });
                        }
                    }
                }
            }
        }
        self.frozen = true;
        Ok(())
    }

    /// Post-order traversal of all nodes reachable from the root, each
    /// appearing once, children before parents — the order every downstream
    /// engine (BDD/ZBDD/MOCUS builders) processes nodes in.
    pub fn topological_order(&self) -> Vec<NodeIndex> {
        let mut order = Vec::new();
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![(self.root.node, false)];
        while let Some((index, expanded)) = stack.pop() {
            if visited[index.0 as usize] {
                continue;
            }
            if expanded {
                visited[index.0 as usize] = true;
                order.push(index);
                continue;
            }
            stack.push((index, true));
            if let NodeKind::Gate(_, args) = &self.node(index).kind {
                for lit in args {
                    if !visited[lit.node.0 as usize] {
                        stack.push((lit.node, false));
                    }
                }
            }
        }
        order
    }

    /// Render this PDAG as a DOT graph for external visualization.
    ///
    /// This is a pure in-memory formatting operation: it returns a `String`
    /// and performs no file I/O, so it stays in scope even though rendering
    /// the DOT file to an image is an external collaborator.
    pub fn dot_export(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph PDAG {{");
        for node in &self.nodes {
            if node.index == TRUE_NODE {
                let _ = writeln!(out, "  n{} [label=\"TRUE\", shape=box];", node.index.0);
                continue;
            }
            match &node.kind {
                NodeKind::Variable(id) => {
                    let _ = writeln!(out, "  n{} [label=\"{}\", shape=ellipse];", node.index.0, id);
                }
                NodeKind::Gate(connective, args) => {
                    let label = match connective {
                        Connective::And => "AND".to_string(),
                        Connective::Or => "OR".to_string(),
                        Connective::Xor => "XOR".to_string(),
                        Connective::AtLeast(k) => format!("ATLEAST({k})"),
                    };
                    let _ = writeln!(out, "  n{} [label=\"{}\", shape=box];", node.index.0, label);
                    for lit in args {
                        let style = if lit.complement { " [style=dashed]" } else { "" };
                        let _ = writeln!(out, "  n{} -> n{}{};", node.index.0, lit.node.0, style);
                    }
                }
            }
        }
        let _ = writeln!(
            out,
            "  root -> n{}{};",
            self.root.node.0,
            if self.root.complement { " [style=dashed]" } else { "" }
        );
        let _ = writeln!(out, "}}");
        out
    }
}

impl Default for Pdag {
    fn default() -> Self {
        Self::new()
    }
}
