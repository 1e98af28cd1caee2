//! Error types for the analysis kernel
//!
//! This module provides error types organized by source and operation, in the
//! same two-layer shape the rest of this crate's error handling follows:
//! small source-level enums for a single failure family, and operation-level
//! wrapper enums that combine only the errors a given entry point can
//! actually produce. Warnings are not errors — see [`Warning`].

use std::fmt;

// ============================================================================
// Source-level error enums
// ============================================================================

/// Violation of an internal invariant: a bug in this crate, never a user error.
///
/// A `LogicError` means a defensive check caught state that earlier stages
/// (in particular the external model loader) should have already ruled out.
/// It always aborts the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicError {
    /// An identifier was empty where a non-empty identifier is required.
    EmptyIdentifier,
    /// A PDAG node was reached that violates a post-freeze invariant.
    InvariantViolated {
        /// Human-readable description of the violated invariant.
        description: String,
    },
    /// An engine lifecycle transition was attempted out of order.
    InvalidTransition {
        /// The state the engine was in.
        from: &'static str,
        /// The transition that was attempted.
        attempted: &'static str,
    },
    /// A decision-diagram manager was asked to dereference a handle it never issued.
    DanglingHandle {
        /// The raw index carried by the handle.
        index: usize,
    },
}

impl fmt::Display for LogicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicError::EmptyIdentifier => write!(f, "empty identifier"),
            LogicError::InvariantViolated { description } => {
                write!(f, "internal invariant violated: {description}")
            }
            LogicError::InvalidTransition { from, attempted } => write!(
                f,
                "invalid engine transition '{attempted}' from state '{from}'"
            ),
            LogicError::DanglingHandle { index } => {
                write!(f, "dangling node handle at index {index}")
            }
        }
    }
}

impl std::error::Error for LogicError {}

/// The model failed syntactic or semantic validation.
///
/// Produced only defensively by this crate (the external loader is the
/// primary producer and is expected to reject malformed models before they
/// ever reach the kernel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidityError {
    /// The gate graph contains a cycle.
    Cycle {
        /// A gate identifier participating in the cycle.
        gate: String,
    },
    /// A gate argument refers to an identifier that does not exist in the model.
    UndefinedReference {
        /// The dangling identifier.
        reference: String,
    },
    /// A basic event's probability fell outside `[0, 1]`.
    ProbabilityOutOfRange {
        /// The identifier of the offending basic event.
        event: String,
        /// The out-of-range value.
        value: f64,
    },
    /// An `ATLEAST(k, args)` gate had `k` outside `1..=args.len()`.
    InvalidAtLeast {
        /// The gate identifier.
        gate: String,
        /// The offending threshold.
        k: usize,
        /// The number of arguments the gate had.
        num_args: usize,
    },
}

impl fmt::Display for ValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityError::Cycle { gate } => {
                write!(f, "cycle detected through gate '{gate}'")
            }
            ValidityError::UndefinedReference { reference } => {
                write!(f, "undefined reference '{reference}'")
            }
            ValidityError::ProbabilityOutOfRange { event, value } => write!(
                f,
                "probability {value} for basic event '{event}' is outside [0, 1]"
            ),
            ValidityError::InvalidAtLeast { gate, k, num_args } => write!(
                f,
                "ATLEAST gate '{gate}' has k={k} outside 1..={num_args}"
            ),
        }
    }
}

impl std::error::Error for ValidityError {}

/// Exhaustion of a cutoff where the result would be unsound, or a numerical
/// failure while sampling a distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A cutoff was exhausted in a context where truncation would be unsound
    /// (e.g. an exact-mode request that cannot tolerate MOCUS truncation).
    CutoffExhausted {
        /// Which cutoff triggered the failure.
        kind: CutoffKind,
    },
    /// A probability distribution produced a value outside `[0, 1]` when sampled.
    NumericalFailure {
        /// Description of what went wrong.
        description: String,
    },
    /// No basic events / products were available to analyze.
    EmptyModel,
}

/// Which cutoff exhausted during an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffKind {
    /// The product-size limit (`Settings::product_size_limit`).
    ProductSize,
    /// The probability cutoff (`Settings::probability_cutoff`).
    Probability,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::CutoffExhausted { kind } => {
                write!(f, "cutoff exhausted: {kind:?}")
            }
            AnalysisError::NumericalFailure { description } => {
                write!(f, "numerical failure: {description}")
            }
            AnalysisError::EmptyModel => write!(f, "model has no analyzable content"),
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Cooperative cancellation was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "analysis cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// A non-fatal condition surfaced to the caller alongside otherwise-successful
/// results. Warnings accumulate in a list attached to engine output rather
/// than aborting the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A rare-event approximation exceeded 1 and was clamped.
    ApproximationClamped {
        /// The raw value before clamping.
        raw_value: f64,
    },
    /// A cutoff truncated the result set (safe, but incomplete).
    CutoffTruncated {
        /// Which cutoff truncated the result.
        kind: CutoffKind,
        /// Number of products/paths dropped, if known.
        dropped: Option<usize>,
    },
    /// The PFH figure is a simplified, magnitude-accurate-only approximation.
    SimplifiedPfh {
        /// The computed average failure-per-hour figure.
        pfh: f64,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ApproximationClamped { raw_value } => {
                write!(f, "approximation {raw_value} clamped to 1.0")
            }
            Warning::CutoffTruncated { kind, dropped } => match dropped {
                Some(n) => write!(f, "{kind:?} cutoff truncated results ({n} dropped)"),
                None => write!(f, "{kind:?} cutoff truncated results"),
            },
            Warning::SimplifiedPfh { pfh } => write!(
                f,
                "PFH {pfh:e} is a simplified average failure frequency; magnitude-accurate only"
            ),
        }
    }
}

// ============================================================================
// Operation-level error enum
// ============================================================================

/// The error type returned by every fallible kernel entry point.
///
/// This aggregates the source-level enums above into one `From` conversion
/// per source, one `Display`/`Error` impl at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// See [`LogicError`].
    Logic(LogicError),
    /// See [`ValidityError`].
    Validity(ValidityError),
    /// See [`AnalysisError`].
    Analysis(AnalysisError),
    /// See [`Cancelled`].
    Cancelled(Cancelled),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Logic(e) => write!(f, "logic error: {e}"),
            EngineError::Validity(e) => write!(f, "validity error: {e}"),
            EngineError::Analysis(e) => write!(f, "analysis error: {e}"),
            EngineError::Cancelled(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Logic(e) => Some(e),
            EngineError::Validity(e) => Some(e),
            EngineError::Analysis(e) => Some(e),
            EngineError::Cancelled(e) => Some(e),
        }
    }
}

impl From<LogicError> for EngineError {
    fn from(err: LogicError) -> Self {
        EngineError::Logic(err)
    }
}

impl From<ValidityError> for EngineError {
    fn from(err: ValidityError) -> Self {
        EngineError::Validity(err)
    }
}

impl From<AnalysisError> for EngineError {
    fn from(err: AnalysisError) -> Self {
        EngineError::Analysis(err)
    }
}

impl From<Cancelled> for EngineError {
    fn from(err: Cancelled) -> Self {
        EngineError::Cancelled(err)
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_displays_source_message() {
        let err: EngineError = LogicError::EmptyIdentifier.into();
        assert_eq!(err.to_string(), "logic error: empty identifier");
    }

    #[test]
    fn cutoff_exhausted_converts_through_from() {
        let err: EngineError = AnalysisError::CutoffExhausted {
            kind: CutoffKind::ProductSize,
        }
        .into();
        assert!(matches!(err, EngineError::Analysis(_)));
    }
}
