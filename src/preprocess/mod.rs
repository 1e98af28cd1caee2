//! Semantics-preserving rewrite passes that reduce a [`Pdag`] into a form
//! digestible by the BDD/ZBDD/MOCUS engines.
//!
//! Each pass is a small, independently testable function from `&mut Pdag` to
//! whether it changed anything, run to a fixpoint by [`Preprocessor::run`].
//! Small composable transforms, rather than one monolithic rewrite, keep
//! each identity separately testable.

mod boolean_opt;
mod decompose;
mod normalize;

use crate::cancellation::Checkpoint;
use crate::error::Result;
use crate::pdag::{NodeIndex, Pdag};
use rustc_hash::FxHashSet;

/// Tunable knobs for the preprocessor. Defaults favor predictable behavior
/// on small-to-medium trees over maximum compression on any particular
/// benchmark; module detection has no size threshold of its own (see
/// `DESIGN.md`).
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(default)]
pub struct PreprocessorConfig {
    /// Maximum number of fixpoint iterations before giving up (a safety
    /// valve; passes are each individually terminating, but a misbehaving
    /// combination should not hang the caller forever).
    pub max_passes: usize,
    /// Whether to run module extraction (single-parent, disjoint-support
    /// subDAGs treated as atomic blocks for downstream variable ordering).
    pub enable_module_detection: bool,
    /// Whether to run the bounded gate-decomposition/distribution pass.
    pub enable_distribution: bool,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        PreprocessorConfig {
            max_passes: 20,
            enable_module_detection: true,
            enable_distribution: true,
        }
    }
}

/// Runs the normalization, Boolean-optimization and decomposition passes to
/// a fixpoint.
pub struct Preprocessor {
    config: PreprocessorConfig,
    /// Node indices identified as modules: single-parent subDAGs whose
    /// variable support is disjoint from the rest of the tree.
    modules: Vec<NodeIndex>,
}

impl Preprocessor {
    /// Construct a preprocessor with the given configuration.
    pub fn new(config: PreprocessorConfig) -> Self {
        Preprocessor {
            config,
            modules: Vec::new(),
        }
    }

    /// The modules detected by the most recent [`Preprocessor::run`] call, if
    /// module detection was enabled.
    pub fn modules(&self) -> &[NodeIndex] {
        &self.modules
    }

    /// Run every enabled pass repeatedly until none of them change the PDAG,
    /// or `max_passes` is reached. Returns the number of iterations taken.
    ///
    /// Order: normalize/fold (pass 1+2+4+6, realized here
    /// as a single hash-consing rebuild, since `Pdag::new_gate` already
    /// performs constant propagation, coalescing and structural hashing as
    /// nodes are interned) and literal sinking (pass 3, realized at
    /// `Pdag::from_model` time since edges always carry complements), then
    /// Boolean optimization (pass 5) including absorption and module
    /// extraction, then bounded gate decomposition (pass 7).
    ///
    /// `checkpoint` is checked between passes (a pass itself is not
    /// interruptible), so a long-running fixpoint loop can still be
    /// cancelled or time out between iterations.
    pub fn run(&mut self, pdag: &mut Pdag, checkpoint: &Checkpoint) -> Result<usize> {
        let mut iterations = 0;
        loop {
            checkpoint.check()?;
            iterations += 1;
            let mut changed = normalize::rebuild(pdag);
            checkpoint.check()?;
            changed |= boolean_opt::absorb(pdag);
            if self.config.enable_distribution {
                checkpoint.check()?;
                changed |= decompose::factor_common_literals(pdag);
            }
            if !changed || iterations >= self.config.max_passes {
                break;
            }
        }
        if self.config.enable_module_detection {
            checkpoint.check()?;
            self.modules = boolean_opt::detect_modules(pdag);
        }
        tracing::debug!(
            iterations,
            nodes = pdag.len(),
            modules = self.modules.len(),
            "preprocessor reached fixpoint"
        );
        Ok(iterations)
    }
}

/// Compute the set of basic-event variable names reachable from `root`,
/// memoizing per node. Shared by module detection and variable ordering.
pub(crate) fn variable_support(pdag: &Pdag, root: NodeIndex) -> FxHashSet<String> {
    use crate::pdag::NodeKind;
    let mut support = FxHashSet::default();
    let mut stack = vec![root];
    let mut seen = FxHashSet::default();
    while let Some(index) = stack.pop() {
        if !seen.insert(index) {
            continue;
        }
        match &pdag.node(index).kind {
            NodeKind::Variable(id) => {
                support.insert(id.clone());
            }
            NodeKind::Gate(_, args) => {
                for lit in args {
                    stack.push(lit.node);
                }
            }
        }
    }
    support
}
