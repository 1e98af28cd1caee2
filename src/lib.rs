//! # SCRAM analysis kernel
//!
//! Qualitative and quantitative analysis of fault trees: a Boolean-DAG
//! representation, a semantics-preserving preprocessor, BDD/ZBDD-backed
//! exact and approximate probability calculation, MOCUS minimal-cut-set
//! extraction, importance measures, Monte Carlo uncertainty propagation, and
//! IEC 61508 SIL classification.
//!
//! ## Scope
//!
//! This crate is the analysis kernel only. It does not parse Open-PSA MEF
//! XML, does not serialize reports, and does not provide a CLI — those are
//! external collaborators built against the types in [`model`] and
//! [`report`]. An external loader constructs a [`model::Model`], hands it to
//! [`engine::Engine::new`], and drives the engine's lifecycle
//! (`Built → Preprocessed → Compiled → Analyzed → Reported`); an external
//! writer walks the resulting [`report::Report`].
//!
//! ## Layout
//!
//! - [`model`]: the plain data an external loader constructs (basic/house
//!   events, gates, CCF groups, probability expressions), plus CCF
//!   expansion.
//! - [`pdag`]: the normalized Boolean DAG built from a model.
//! - [`preprocess`]: fixpoint rewrite passes over a PDAG (absorption, common
//!   literal factoring, module detection).
//! - [`bdd`]: binary decision diagrams for exact probability, cofactoring,
//!   and importance.
//! - [`zbdd`]: zero-suppressed BDDs representing cut-set families, plus
//!   cutoffs and rare-event/MCUB probability.
//! - [`mocus`]: minimal-cut-set extraction for coherent trees, backed by
//!   [`zbdd`].
//! - [`products`]: minimal cut set / product data returned by [`mocus`].
//! - [`probability`]: top-event probability strategies and the
//!   mission-time sweep.
//! - [`importance`]: Birnbaum/CIF/Fussell-Vesely/RAW/RRW measures.
//! - [`uncertainty`]: Monte Carlo uncertainty propagation.
//! - [`sil`]: IEC 61508 SIL band classification.
//! - [`settings`]: analysis configuration, built with [`settings::SettingsBuilder`].
//! - [`engine`]: the analysis lifecycle tying every module above together.
//! - [`report`]: the plain result aggregate an external writer serializes.
//! - [`error`]: error and warning types returned throughout this crate.
//! - [`cancellation`]: cooperative cancellation/deadline checkpoints shared
//!   by the preprocessor, MOCUS and Monte Carlo.

pub mod bdd;
pub mod cancellation;
pub mod engine;
pub mod error;
pub mod importance;
pub mod mocus;
pub mod model;
pub mod pdag;
pub mod preprocess;
pub mod probability;
pub mod products;
pub mod report;
pub mod settings;
pub mod sil;
pub mod uncertainty;
pub mod zbdd;

pub use cancellation::CancellationToken;
pub use engine::{Engine, EngineState};
pub use error::{EngineError, Result};
pub use model::Model;
pub use report::Report;
pub use settings::{Settings, SettingsBuilder};
