//! Core library for the 2D tile constraint engine.
//! Defines the cell and grid state, constraint propagation, weighted tile
//! selection and the collapse driver.

use std::time::Duration;
use thiserror::Error;
use wfc_rules::{CatalogError, TileId};

/// Single-cell candidate container.
pub mod cell;
/// Entropy calculation logic and traits.
pub mod entropy;
/// The 2D grid of cells and the collapse operation.
pub mod grid;
/// Constraint propagation logic and traits.
pub mod propagator;
/// The collapse driver.
pub mod runner;
/// Weighted tile selection.
pub mod selection;

pub use crate::cell::{Cell, CellError};
pub use crate::entropy::{CpuEntropyCalculator, EntropyCalculator, EntropyError, EntropyHeuristic};
pub use crate::grid::{Grid, Position, ResolvedTile, NEIGHBOR_OFFSETS};
pub use crate::propagator::{
    ConstraintPropagator, CpuConstraintPropagator, PropagationError, PropagationOrder,
};
pub use crate::runner::{run, RunReport, WfcConfig};
pub use crate::selection::{pick_weighted, weighted_pool, SelectionError};

/// Errors that can occur while collapsing cells or running the driver.
#[derive(Error, Debug)]
pub enum WfcError {
    /// The requested tile is not (or no longer) a candidate of the cell.
    /// The grid is unchanged and the caller may retry with another tile.
    #[error("Cannot collapse {position} to {tile}: not a remaining candidate")]
    InvalidCollapseRequest {
        /// Cell the request targeted.
        position: Position,
        /// The rejected tile.
        tile: TileId,
    },
    /// Propagation left a cell without any candidate. The grid is left as it was
    /// at the point of contradiction.
    #[error("Propagation failed: Contradiction found at {0}")]
    Contradiction(Position),
    /// A position outside the grid was addressed.
    #[error("Position {0} is outside the grid")]
    OutOfBounds(Position),
    /// An error related to grid dimensions or accessing grid data.
    #[error("Grid error: {0}")]
    GridError(String),
    /// An error occurred validating or querying the tile catalog.
    #[error("Tile catalog error: {0}")]
    TileSet(#[from] CatalogError),
    /// An error occurred during the constraint propagation phase.
    #[error("Propagation error: {0}")]
    Propagation(#[from] PropagationError),
    /// Error occurred during weighted random selection.
    #[error("Weighted selection error: {0}")]
    Selection(#[from] SelectionError),
    /// An error occurred during entropy calculation.
    #[error("Entropy calculation error: {0}")]
    Entropy(#[from] EntropyError),
    /// The driver exceeded the configured maximum number of iterations.
    #[error("Maximum iterations ({0}) reached")]
    MaxIterationsReached(u64),
    /// The run was interrupted by the external shutdown signal.
    #[error("WFC run interrupted by signal")]
    Interrupted,
    /// An unexpected internal error occurred.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl WfcError {
    /// Whether this error means the chosen path has no solution, as opposed to
    /// a bad request or a configuration problem.
    pub fn is_contradiction(&self) -> bool {
        matches!(
            self,
            Self::Contradiction(_) | Self::Propagation(PropagationError::Contradiction(_))
        )
    }
}

/// Information about the current state of a driver run.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Cells explicitly placed so far.
    pub placed_cells: usize,
    /// Cells with a single candidate, placed or not.
    pub collapsed_cells: usize,
    /// The total number of cells in the grid.
    pub total_cells: usize,
    /// The number of iterations completed so far.
    pub iterations: u64,
    /// Time elapsed since the run started.
    pub elapsed_time: Duration,
    /// The tile placed by the latest iteration.
    pub last_resolved: ResolvedTile,
}
