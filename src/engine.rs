//! The analysis lifecycle: `Built → Preprocessed → Compiled → Analyzed →
//! Reported`, one-way transitions enforced by
//! [`crate::error::LogicError::InvalidTransition`].

use crate::bdd::{self, BddEdge, BddManager};
use crate::cancellation::{CancellationToken, Checkpoint};
use crate::error::{EngineError, LogicError, Result, Warning};
use crate::mocus;
use crate::model::{BasicEvent, Model};
use crate::pdag::Pdag;
use crate::preprocess::Preprocessor;
use crate::probability::{self, MissionProfile, ProbabilityMethod};
use crate::products::{Product, ProductCollection};
use crate::report::{ProbabilityPoint, Report};
use crate::settings::Settings;
use crate::sil::{self, SilHistogram};
use crate::uncertainty::{self, UncertaintyResult};
use crate::zbdd::{ZNodeId, ZbddManager};
use rustc_hash::FxHashMap;
use std::time::Instant;

/// The engine's current stage. Transitions only move forward; attempting
/// to skip a stage or go backward is a [`LogicError::InvalidTransition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Built,
    Preprocessed,
    Compiled,
    Analyzed,
    Reported,
}

impl EngineState {
    fn next(self) -> Option<Self> {
        match self {
            EngineState::Built => Some(EngineState::Preprocessed),
            EngineState::Preprocessed => Some(EngineState::Compiled),
            EngineState::Compiled => Some(EngineState::Analyzed),
            EngineState::Analyzed => Some(EngineState::Reported),
            EngineState::Reported => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            EngineState::Built => "Built",
            EngineState::Preprocessed => "Preprocessed",
            EngineState::Compiled => "Compiled",
            EngineState::Analyzed => "Analyzed",
            EngineState::Reported => "Reported",
        }
    }
}

/// Drives one model through its analysis lifecycle, owning the PDAG, the
/// compiled diagrams, and the settings for the run.
pub struct Engine {
    state: EngineState,
    settings: Settings,
    pdag: Pdag,
    modules: Vec<crate::pdag::NodeIndex>,
    bdd: Option<(BddManager, BddEdge)>,
    zbdd: Option<(ZbddManager, ZNodeId)>,
    basic_events: Vec<BasicEvent>,
    probabilities: FxHashMap<String, f64>,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl Engine {
    /// Expand CCF groups in `model`, then build and validate its PDAG
    /// (`Built` stage).
    pub fn new(mut model: Model, settings: Settings) -> Result<Self> {
        model.expand_ccf_groups();
        let pdag = Pdag::from_model(&model)?;
        let probabilities = probabilities_at(&model.basic_events, 0.0);
        Ok(Engine {
            state: EngineState::Built,
            settings,
            pdag,
            modules: Vec::new(),
            bdd: None,
            zbdd: None,
            basic_events: model.basic_events,
            probabilities,
            cancellation: CancellationToken::new(),
            deadline: None,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Set a wall-clock deadline; cooperative checkpoints fail with
    /// [`EngineError::Cancelled`] once it has passed.
    pub fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    /// Bundle this engine's cancellation token and deadline into the
    /// [`Checkpoint`] handed down to the preprocessor, MOCUS, and Monte
    /// Carlo, so each can check at its own finer granularity instead of
    /// only once per coarse stage.
    fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.cancellation.clone(), self.deadline)
    }

    /// Move from `from` to its successor stage, or fail if the engine isn't
    /// currently in `from`.
    fn advance_from(&mut self, from: EngineState) -> Result<()> {
        if self.state != from {
            return Err(LogicError::InvalidTransition {
                from: self.state.name(),
                attempted: from.next().map(EngineState::name).unwrap_or("none"),
            }
            .into());
        }
        self.state = from
            .next()
            .expect("caller only advances from a non-terminal state");
        Ok(())
    }

    /// Run the preprocessor to a fixpoint, recording detected modules.
    pub fn preprocess(&mut self) -> Result<usize> {
        let checkpoint = self.checkpoint();
        checkpoint.check()?;
        let mut pp = Preprocessor::new(self.settings.preprocessor.clone());
        let iterations = pp.run(&mut self.pdag, &checkpoint)?;
        self.modules = pp.modules().to_vec();
        self.pdag.freeze()?;
        self.advance_from(EngineState::Built)?;
        Ok(iterations)
    }

    /// Compile the frozen PDAG into a BDD (for exact probability and
    /// importance) and, unless the tree is non-coherent, a ZBDD cut-set
    /// family (for rare-event/MCUB and MOCUS reporting).
    pub fn compile(&mut self) -> Result<()> {
        let checkpoint = self.checkpoint();
        checkpoint.check()?;
        let order = bdd::depth_first_order(&self.pdag);
        let (mgr, root) = bdd::compile(&self.pdag, order.clone());
        self.bdd = Some((mgr, root));

        match mocus::build(&self.pdag, order, &checkpoint) {
            Ok((mut zmgr, zroot)) => {
                let zroot = match self.settings.cutoff_product_size {
                    Some(max_size) => crate::zbdd::truncate_by_size(&mut zmgr, zroot, max_size),
                    None => zroot,
                };
                let zroot = match self.settings.cutoff_probability {
                    Some(min_probability) => crate::zbdd::truncate_by_probability(
                        &mut zmgr,
                        zroot,
                        &self.probabilities,
                        min_probability,
                    ),
                    None => zroot,
                };
                self.zbdd = Some((zmgr, zroot));
            }
            // A cancellation mid-expansion is a real abort, not "this tree
            // has no cut-set family" — propagate it instead of falling
            // through to the non-coherent-tree branch below.
            Err(EngineError::Cancelled(e)) => return Err(e.into()),
            Err(_) => {
                // Non-coherent tree: cut-set extraction doesn't apply here,
                // but exact probability via the BDD still works.
                self.zbdd = None;
            }
        }
        self.advance_from(EngineState::Preprocessed)?;
        Ok(())
    }

    /// Compute top-event probability with the configured method.
    pub fn top_event_probability(&self) -> Result<f64> {
        self.checkpoint().check()?;
        probability::calculate(
            self.settings.probability_method,
            self.bdd.as_ref().map(|(mgr, root)| (mgr, *root)),
            self.zbdd.as_ref().map(|(mgr, root)| (mgr, *root)),
            &self.probabilities,
        )
    }

    /// Compute every basic event's importance measures against the BDD.
    pub fn importance(&mut self) -> Result<Vec<crate::importance::ImportanceRecord>> {
        self.checkpoint().check()?;
        let (mgr, root) = self
            .bdd
            .as_mut()
            .ok_or_else(|| EngineError::from(LogicError::InvariantViolated {
                description: "importance requires a compiled BDD".into(),
            }))?;
        Ok(crate::importance::compute(mgr, *root, &self.probabilities))
    }

    pub fn modules(&self) -> &[crate::pdag::NodeIndex] {
        &self.modules
    }

    pub fn probability_method(&self) -> ProbabilityMethod {
        self.settings.probability_method
    }

    /// The minimal cut sets MOCUS produced, each annotated with its own
    /// probability, or `None` for a non-coherent tree (no ZBDD family).
    pub fn products(&self) -> Option<ProductCollection> {
        let (mgr, root) = self.zbdd.as_ref()?;
        let products = mgr
            .enumerate(*root)
            .into_iter()
            .map(|members| {
                let probability = members
                    .iter()
                    .map(|id| {
                        if let Some(base) = id.strip_prefix('¬') {
                            1.0 - self.probabilities.get(base).copied().unwrap_or(0.0)
                        } else {
                            self.probabilities.get(id).copied().unwrap_or(0.0)
                        }
                    })
                    .product();
                Product { members, probability: Some(probability) }
            })
            .collect();
        Some(ProductCollection { products })
    }

    /// Monte Carlo uncertainty propagation over `settings.monte_carlo_trials`
    /// trials, or `None` when trials are disabled (`0`).
    pub fn uncertainty(&self) -> Result<Option<UncertaintyResult>> {
        let checkpoint = self.checkpoint();
        checkpoint.check()?;
        if self.settings.monte_carlo_trials == 0 {
            return Ok(None);
        }
        let (mgr, root) = self
            .bdd
            .as_ref()
            .ok_or_else(|| EngineError::from(LogicError::InvariantViolated {
                description: "uncertainty propagation requires a compiled BDD".into(),
            }))?;
        let evaluator = uncertainty::bdd_evaluator(mgr, *root);
        Ok(Some(uncertainty::propagate(
            &self.basic_events,
            self.settings.mission_time,
            self.settings.monte_carlo_trials,
            self.settings.monte_carlo_seed,
            &checkpoint,
            evaluator,
        )?))
    }

    /// Run the full mission-time sweep, assemble products/importance/
    /// uncertainty/SIL, and advance the engine to its terminal `Reported`
    /// stage.
    pub fn report(&mut self) -> Result<Report> {
        self.checkpoint().check()?;
        let mut report = Report::new();

        // `mission_time_steps == 0` means a single evaluation at `mission_time`
        // (see `Settings::mission_time_steps`); a positive step count instead
        // sweeps from 0 up to `mission_time`.
        let profile = MissionProfile {
            start: if self.settings.mission_time_steps == 0 { self.settings.mission_time } else { 0.0 },
            end: self.settings.mission_time,
            steps: self.settings.mission_time_steps,
        };
        let method = self.settings.probability_method;
        let bdd = self.bdd.as_ref();
        let zbdd = self.zbdd.as_ref();
        let basic_events = &self.basic_events;
        let series = probability::time_dependent_series(&profile, |t| {
            let probs = probabilities_at(basic_events, t);
            probability::calculate(
                method,
                bdd.map(|(mgr, root)| (mgr, *root)),
                zbdd.map(|(mgr, root)| (mgr, *root)),
                &probs,
            )
        })?;
        for (time, probability) in series {
            if probability > 1.0 {
                report.push_warning(Warning::ApproximationClamped { raw_value: probability });
            }
            report.probability_series.push(ProbabilityPoint { time, probability: probability.min(1.0) });
        }

        report.products = self.products();
        report.importance = self.importance()?;
        report.uncertainty = self.uncertainty()?;
        // Top-event probability classifies as a PFD figure (low-demand mode).
        report.sil = report.final_probability().and_then(sil::classify_pfd);

        if self.settings.sil_buckets > 0 {
            let method = self.settings.probability_method;
            let bdd = self.bdd.as_ref();
            let zbdd = self.zbdd.as_ref();
            let bucket_width = self.settings.mission_time / self.settings.sil_buckets as f64;
            let mut bucket_pfds = Vec::with_capacity(self.settings.sil_buckets);
            for bucket in 0..self.settings.sil_buckets {
                let t = bucket_width * (bucket as f64 + 0.5);
                let probs = probabilities_at(&self.basic_events, t);
                let pfd = probability::calculate(
                    method,
                    bdd.map(|(mgr, root)| (mgr, *root)),
                    zbdd.map(|(mgr, root)| (mgr, *root)),
                    &probs,
                )?;
                bucket_pfds.push(pfd.min(1.0));
            }
            report.sil_histogram = Some(SilHistogram::from_classifications(
                bucket_pfds.iter().map(|&pfd| sil::classify_pfd(pfd)),
            ));

            // Simplified average failure frequency: mean instantaneous PFD
            // across the buckets, spread over the mission time. Magnitude-
            // accurate only, per `Warning::SimplifiedPfh`.
            if self.settings.mission_time > 0.0 {
                let mean_pfd = bucket_pfds.iter().sum::<f64>() / bucket_pfds.len() as f64;
                let pfh = mean_pfd / self.settings.mission_time;
                tracing::debug!(pfh, sil = ?sil::classify_pfh(pfh), "simplified PFH figure computed");
                report.push_warning(Warning::SimplifiedPfh { pfh });
            }
        }

        self.mark_analyzed()?;
        self.mark_reported()?;
        Ok(report)
    }

    /// Finalize the lifecycle after an analysis stage has produced its
    /// results.
    pub fn mark_analyzed(&mut self) -> Result<()> {
        self.advance_from(EngineState::Compiled)
    }

    pub fn mark_reported(&mut self) -> Result<()> {
        self.advance_from(EngineState::Analyzed)
    }
}

fn probabilities_at(basic_events: &[BasicEvent], t: f64) -> FxHashMap<String, f64> {
    basic_events
        .iter()
        .map(|be| (be.id.clone(), be.probability.evaluate(t)))
        .collect()
}
