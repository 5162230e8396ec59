//! Constraint propagation logic and traits.
use crate::grid::{Grid, Position};
use std::fmt::Debug;
use thiserror::Error;

mod cpu;
pub use cpu::{CpuConstraintPropagator, PropagationOrder};

/// Errors that can occur during the constraint propagation phase.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropagationError {
    /// A cell's candidate set would have become empty, meaning no tile can
    /// satisfy the constraints at this location.
    #[error("Contradiction detected during propagation at {0}")]
    Contradiction(Position),
    /// The propagator processed more cells than the shrink-only bound allows.
    /// Only reachable if the catalog or grid breaks the shrink-only invariant.
    #[error("Propagation exceeded its step budget of {0}")]
    StepLimitExceeded(usize),
    /// An internal error within the propagation logic.
    #[error("Internal propagation error: {0}")]
    InternalError(String),
}

/// Trait defining the interface for a constraint propagation algorithm.
///
/// Implementors shrink the candidate sets of cells around `origin` (and
/// transitively around every cell they change) until a fixed point is
/// reached. Cells that already hold a single candidate are never revisited.
pub trait ConstraintPropagator: Debug {
    /// Propagates the current candidates of `origin` outward.
    ///
    /// # Returns
    ///
    /// * `Ok(n)` with the number of cells whose candidate set shrank.
    /// * `Err(PropagationError)` if a contradiction is found or the step budget runs out.
    fn propagate_from(
        &mut self,
        grid: &mut Grid,
        origin: Position,
    ) -> Result<usize, PropagationError>;
}
