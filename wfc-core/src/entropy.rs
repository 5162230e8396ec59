//! Entropy heuristics used to choose the next cell to collapse.
use crate::grid::{Grid, Position};
use thiserror::Error;
use wfc_rules::CatalogError;

mod cpu;
pub use cpu::CpuEntropyCalculator;

/// Errors that can occur during entropy calculation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntropyError {
    /// A candidate's weight could not be looked up.
    #[error("Entropy calculation failed: {0}")]
    Catalog(#[from] CatalogError),
}

/// How "uncertain" a cell is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntropyHeuristic {
    /// Number of remaining candidates.
    #[default]
    Count,
    /// Shannon entropy of the candidates' weight distribution.
    Shannon,
}

/// Per-cell entropy in row-major order. `None` marks placed cells, which are
/// never selected again.
pub type EntropyMap = Vec<Option<f32>>;

/// Trait defining the interface for entropy calculation strategies.
pub trait EntropyCalculator {
    /// Computes the entropy of every cell of `grid`.
    ///
    /// Unplaced cells with a single candidate get `0.0`, so they are picked
    /// before any cell still in superposition.
    ///
    /// # Errors
    ///
    /// Returns `EntropyError::Catalog` if a candidate is missing from the catalog.
    fn calculate_entropy(&self, grid: &Grid) -> Result<EntropyMap, EntropyError>;

    /// Position of the lowest-entropy unplaced cell; ties go to the first cell in
    /// row-major order. `None` once every cell is placed.
    #[must_use]
    fn find_lowest_entropy(&self, grid: &Grid, entropy: &EntropyMap) -> Option<Position>;
}
