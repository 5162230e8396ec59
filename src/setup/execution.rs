//! Runs the collapse driver with the restart policy and writes the results.

use crate::{
    catalog::resolve_catalog,
    config::{Settings, VisualizationMode},
    error::AppError,
    output,
    progress::{progress_callback, ConsoleProgressReporter, ProgressReporter},
    visualization::{TerminalVisualizer, Visualizer},
};
use log::{error, info, warn};
use std::sync::{atomic::AtomicBool, Arc, Mutex};
use wfc_core::{run, Grid, RunReport, WfcConfig, WfcError};
use wfc_rules::TileCatalog;

/// A successful attempt.
#[derive(Debug)]
pub struct Outcome {
    /// The fully placed grid.
    pub grid: Grid,
    /// Driver report of the successful attempt.
    pub report: RunReport,
    /// 1-based number of the successful attempt.
    pub attempt: u32,
}

/// Seed used by the given 0-based attempt.
pub fn attempt_seed(base_seed: u64, attempt: u32) -> u64 {
    base_seed.wrapping_add(u64::from(attempt))
}

fn attempt_config(
    settings: &Settings,
    seed: u64,
    shutdown_signal: &Arc<AtomicBool>,
    reporter: Option<&Arc<Mutex<ConsoleProgressReporter>>>,
) -> WfcConfig {
    let mut builder = WfcConfig::builder()
        .seed(seed)
        .propagation_order(settings.propagation_order.into())
        .entropy_heuristic(settings.entropy_heuristic.into())
        .shutdown_signal(Arc::clone(shutdown_signal));
    if let Some(max) = settings.max_iterations {
        builder = builder.max_iterations(max);
    }
    if let Some(reporter) = reporter {
        builder = builder.progress_callback(progress_callback(Arc::clone(reporter)));
    }
    builder.build()
}

fn notify<F>(reporter: Option<&Arc<Mutex<ConsoleProgressReporter>>>, f: F)
where
    F: FnOnce(&mut ConsoleProgressReporter) -> anyhow::Result<()>,
{
    if let Some(reporter) = reporter {
        match reporter.lock() {
            Ok(mut guard) => {
                if let Err(e) = f(&mut *guard) {
                    error!("Progress reporter failed: {}", e);
                }
            }
            Err(_) => error!("Progress reporter mutex poisoned"),
        }
    }
}

/// Fills a fresh grid, restarting with the next seed whenever an attempt ends
/// in a contradiction.
///
/// Errors other than contradictions (iteration limit, interruption, internal
/// failures) end the run immediately.
pub fn run_with_restarts(
    catalog: Arc<TileCatalog>,
    settings: &Settings,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<Outcome, AppError> {
    let base_seed = settings.seed.unwrap_or_else(rand::random);
    let reporter = settings
        .progress_interval()?
        .map(|interval| Arc::new(Mutex::new(ConsoleProgressReporter::new(interval))));
    let mut last_error = None;

    for attempt in 0..settings.attempts {
        let seed = attempt_seed(base_seed, attempt);
        info!(
            "Attempt {}/{} with seed {}",
            attempt + 1,
            settings.attempts,
            seed
        );

        let mut grid = Grid::new(settings.width, settings.height, Arc::clone(&catalog))?;
        let config = attempt_config(settings, seed, shutdown_signal, reporter.as_ref());

        match run(&mut grid, &config) {
            Ok(report) => {
                notify(reporter.as_ref(), |r| r.finish(&report));
                return Ok(Outcome {
                    grid,
                    report,
                    attempt: attempt + 1,
                });
            }
            Err(e) if e.is_contradiction() => {
                notify(reporter.as_ref(), |r| r.fail(&e));
                warn!(
                    "Attempt {} hit a contradiction after {} placements: {}",
                    attempt + 1,
                    grid.placed_count(),
                    e
                );
                last_error = Some(e);
            }
            Err(e) => {
                notify(reporter.as_ref(), |r| r.fail(&e));
                return Err(e.into());
            }
        }
    }

    Err(AppError::AttemptsExhausted {
        attempts: settings.attempts,
        last: last_error.unwrap_or_else(|| {
            WfcError::InternalError("no attempt was made".to_string())
        }),
    })
}

/// Loads the catalog, fills the grid and writes every configured output.
pub fn run_standard_mode(
    settings: &Settings,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<Outcome, AppError> {
    let catalog = Arc::new(resolve_catalog(settings.rule_file.as_deref())?);
    info!(
        "Filling {}x{} grid with {} tile types",
        settings.width,
        settings.height,
        catalog.num_tiles()
    );

    let outcome = run_with_restarts(catalog, settings, shutdown_signal)?;
    info!(
        "Grid resolved on attempt {} (seed {}, {} iterations)",
        outcome.attempt, outcome.report.seed, outcome.report.iterations
    );

    if settings.visualization_mode == VisualizationMode::Terminal {
        TerminalVisualizer::new()
            .display_state(&outcome.grid)
            .map_err(|e| AppError::Visualization(e.to_string()))?;
    }

    if let Some(path) = &settings.output_path {
        output::save_grid_to_file(&outcome.grid, path).map_err(AppError::Save)?;
    }
    if let Some(path) = &settings.csv_output {
        output::save_tiles_csv(&outcome.grid, path).map_err(AppError::Save)?;
    }

    Ok(outcome)
}
