//! Cooperative cancellation and deadlines, shared by every long-running
//! engine stage.
//!
//! A single analysis is synchronous and single-threaded outside Monte Carlo
//! (`spec.md` §5), so cancellation cannot preempt a running computation; it
//! is checked at well-defined points instead: between preprocessor passes,
//! between MOCUS expansion steps, and between Monte Carlo trial batches.

use crate::error::{Cancelled, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A shared flag an external caller can set to abort a long-running
/// analysis between cooperative checkpoints.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Return an error if the token has been tripped.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Cancelled.into())
        } else {
            Ok(())
        }
    }
}

/// A [`CancellationToken`] plus an optional wall-clock deadline, bundled
/// together as the one value every cooperative checkpoint needs. `Sync` so
/// it can be shared by reference into `rayon`'s Monte Carlo batch closures.
#[derive(Debug, Clone, Default)]
pub struct Checkpoint {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Checkpoint {
    pub fn new(token: CancellationToken, deadline: Option<Instant>) -> Self {
        Checkpoint { token, deadline }
    }

    /// A checkpoint that never cancels and never expires, for call sites
    /// (tests, direct engine-less use of the diagram engines) that have no
    /// token of their own.
    pub fn none() -> Self {
        Checkpoint::default()
    }

    /// Return [`Cancelled`] if the token has been tripped or the deadline
    /// has passed.
    pub fn check(&self) -> Result<()> {
        self.token.check()?;
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Cancelled.into());
            }
        }
        Ok(())
    }
}
