use crate::{
    entropy::{CpuEntropyCalculator, EntropyCalculator, EntropyHeuristic},
    grid::{Grid, Position, ResolvedTile},
    propagator::{CpuConstraintPropagator, PropagationOrder},
    selection::pick_weighted,
    ProgressInfo, WfcError,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Alias for the progress callback function type.
pub type ProgressCallback = Box<dyn Fn(&ProgressInfo) -> Result<(), WfcError> + Send + Sync>;

/// Configuration options for the WFC runner.
pub struct WfcConfig {
    /// Work-list order used by the propagator.
    pub propagation_order: PropagationOrder,
    /// Heuristic used to pick the next cell.
    pub entropy_heuristic: EntropyHeuristic,
    /// Called after every collapse.
    pub progress_callback: Option<ProgressCallback>,
    /// Checked before every iteration; set it to stop the run.
    pub shutdown_signal: Arc<AtomicBool>,
    /// Upper bound on collapses. Defaults to the number of cells.
    pub max_iterations: Option<u64>,
    /// Seed for tile selection. A random seed is drawn (and reported) when unset.
    pub seed: Option<u64>,
}

impl WfcConfig {
    /// Creates a new builder for `WfcConfig`.
    pub fn builder() -> WfcConfigBuilder {
        WfcConfigBuilder::default()
    }
}

impl Default for WfcConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for WfcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WfcConfig")
            .field("propagation_order", &self.propagation_order)
            .field("entropy_heuristic", &self.entropy_heuristic)
            .field("progress_callback", &self.progress_callback.is_some())
            .field("max_iterations", &self.max_iterations)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

/// Builder for `WfcConfig`.
#[derive(Default)]
pub struct WfcConfigBuilder {
    propagation_order: PropagationOrder,
    entropy_heuristic: EntropyHeuristic,
    progress_callback: Option<ProgressCallback>,
    shutdown_signal: Option<Arc<AtomicBool>>,
    max_iterations: Option<u64>,
    seed: Option<u64>,
}

impl WfcConfigBuilder {
    /// Sets the propagation work-list order.
    pub fn propagation_order(mut self, order: PropagationOrder) -> Self {
        self.propagation_order = order;
        self
    }

    /// Sets the entropy heuristic.
    pub fn entropy_heuristic(mut self, heuristic: EntropyHeuristic) -> Self {
        self.entropy_heuristic = heuristic;
        self
    }

    /// Sets the progress callback function.
    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Provides an external shutdown signal.
    /// If not provided, a new signal will be created.
    pub fn shutdown_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Sets the maximum number of iterations allowed.
    pub fn max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Sets the seed for the random number generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the `WfcConfig` instance.
    pub fn build(self) -> WfcConfig {
        WfcConfig {
            propagation_order: self.propagation_order,
            entropy_heuristic: self.entropy_heuristic,
            progress_callback: self.progress_callback,
            shutdown_signal: self
                .shutdown_signal
                .unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
            max_iterations: self.max_iterations,
            seed: self.seed,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Tiles in the order they were placed.
    pub tiles: Vec<ResolvedTile>,
    /// Number of collapses performed.
    pub iterations: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Seed actually used for tile selection.
    pub seed: u64,
}

/// Drives the grid to a fully placed state.
///
/// Each iteration observes the lowest-entropy unplaced cell, picks one of its
/// candidates with [`pick_weighted`] and collapses it, which propagates the
/// consequences. The run ends once every cell is placed.
///
/// # Errors
///
/// * `WfcError::Contradiction` when a collapse empties a cell. The grid is left
///   partially resolved; callers wanting another try should start from a clone.
/// * `WfcError::MaxIterationsReached` if the iteration limit is hit first.
/// * `WfcError::Interrupted` if the shutdown signal is raised.
/// * Any error returned by the progress callback.
pub fn run(grid: &mut Grid, config: &WfcConfig) -> Result<RunReport, WfcError> {
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        "Starting WFC run on {}x{} grid (seed {}, {:?}, {:?})",
        grid.width(),
        grid.height(),
        seed,
        config.propagation_order,
        config.entropy_heuristic
    );

    let start_time = Instant::now();
    let total_cells = grid.len();
    let iteration_limit = config.max_iterations.unwrap_or(total_cells as u64);
    let entropy_calculator = CpuEntropyCalculator::new(config.entropy_heuristic);
    let mut propagator = CpuConstraintPropagator::new(config.propagation_order);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tiles = Vec::with_capacity(total_cells);
    let mut iterations = 0_u64;

    loop {
        if config.shutdown_signal.load(Ordering::Relaxed) {
            warn!("Shutdown signal received, stopping WFC run prematurely.");
            return Err(WfcError::Interrupted);
        }

        let entropy = entropy_calculator.calculate_entropy(grid)?;
        let Some(pos) = entropy_calculator.find_lowest_entropy(grid, &entropy) else {
            info!("All cells placed.");
            break;
        };

        if iterations >= iteration_limit {
            warn!(
                "Maximum iterations ({}) reached with {} cells unplaced",
                iteration_limit,
                total_cells - grid.placed_count()
            );
            return Err(WfcError::MaxIterationsReached(iteration_limit));
        }
        iterations += 1;

        let resolved = perform_iteration(grid, pos, &mut propagator, &mut rng, iterations)?;
        tiles.push(resolved);

        if let Some(ref callback) = config.progress_callback {
            let progress_info = ProgressInfo {
                placed_cells: tiles.len(),
                collapsed_cells: grid.collapsed_count(),
                total_cells,
                iterations,
                elapsed_time: start_time.elapsed(),
                last_resolved: resolved,
            };
            callback(&progress_info)?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        "WFC run finished in {:?} after {} iterations.",
        elapsed, iterations
    );
    Ok(RunReport {
        tiles,
        iterations,
        elapsed,
        seed,
    })
}

/// Performs a single observe-select-collapse step on `pos`.
fn perform_iteration(
    grid: &mut Grid,
    pos: Position,
    propagator: &mut CpuConstraintPropagator,
    rng: &mut StdRng,
    iteration: u64,
) -> Result<ResolvedTile, WfcError> {
    let candidates = grid.candidates_of(pos)?;
    let tile = pick_weighted(&candidates, grid.catalog(), rng)?;
    debug!(
        "Iter {}: collapsing {} to {} out of {} candidates",
        iteration,
        pos,
        tile,
        candidates.len()
    );
    grid.collapse_with(pos, tile, propagator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wfc_rules::{Color, TileCatalog, TileDefinition};

    fn open_grid(width: usize, height: usize) -> Grid {
        let catalog = TileCatalog::new(vec![
            TileDefinition::new("a", 2, Color::new(1, 2, 3), &["a", "b"]),
            TileDefinition::new("b", 1, Color::new(4, 5, 6), &["a", "b"]),
        ])
        .unwrap();
        Grid::new(width, height, Arc::new(catalog)).unwrap()
    }

    #[test]
    fn test_run_places_every_cell() {
        let mut grid = open_grid(5, 4);
        let report = run(&mut grid, &WfcConfig::builder().seed(3).build()).unwrap();
        assert_eq!(report.tiles.len(), 20);
        assert_eq!(report.iterations, 20);
        assert_eq!(report.seed, 3);
        assert!(grid.is_fully_placed());
        // Ties break in row-major order.
        assert_eq!(report.tiles[0].position, Position::new(0, 0));
        assert_eq!(report.tiles[1].position, Position::new(1, 0));
    }

    #[test]
    fn test_same_seed_same_result() {
        let mut first = open_grid(6, 6);
        let mut second = open_grid(6, 6);
        let a = run(&mut first, &WfcConfig::builder().seed(99).build()).unwrap();
        let b = run(&mut second, &WfcConfig::builder().seed(99).build()).unwrap();
        assert_eq!(a.tiles, b.tiles);
    }

    #[test]
    fn test_iteration_limit() {
        let mut grid = open_grid(3, 3);
        let config = WfcConfig::builder().seed(1).max_iterations(4).build();
        assert!(matches!(
            run(&mut grid, &config),
            Err(WfcError::MaxIterationsReached(4))
        ));
        assert_eq!(grid.placed_count(), 4);
    }

    #[test]
    fn test_shutdown_signal() {
        let signal = Arc::new(AtomicBool::new(true));
        let mut grid = open_grid(2, 2);
        let config = WfcConfig::builder().shutdown_signal(signal).build();
        assert!(matches!(run(&mut grid, &config), Err(WfcError::Interrupted)));
        assert_eq!(grid.placed_count(), 0);
    }

    #[test]
    fn test_progress_callback_sees_every_collapse() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = WfcConfig::builder()
            .seed(5)
            .progress_callback(Box::new(move |info: &ProgressInfo| -> Result<(), WfcError> {
                sink.lock()
                    .map_err(|e| WfcError::InternalError(e.to_string()))?
                    .push(info.placed_cells);
                Ok(())
            }))
            .build();
        let mut grid = open_grid(3, 2);
        run(&mut grid, &config).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_progress_callback_error_aborts() {
        let config = WfcConfig::builder()
            .progress_callback(Box::new(|_info: &ProgressInfo| -> Result<(), WfcError> {
                Err(WfcError::Interrupted)
            }))
            .build();
        let mut grid = open_grid(2, 2);
        assert!(matches!(run(&mut grid, &config), Err(WfcError::Interrupted)));
        assert_eq!(grid.placed_count(), 1);
    }
}
