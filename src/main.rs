use anyhow::{Context, Result};
use clap::Parser;
use std::sync::{atomic::AtomicBool, Arc};
use tile_forge::{logging, setup::execution::run_standard_mode, Cli, Settings};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli).context("Failed to load settings")?;
    logging::init_logger(&settings);

    log::info!("Tile Forge starting");
    log::debug!("Resolved settings: {:?}", settings);

    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let outcome = run_standard_mode(&settings, &shutdown_signal)?;

    log::info!(
        "Tile Forge finished: {} tiles in {:?}",
        outcome.report.tiles.len(),
        outcome.report.elapsed
    );
    Ok(())
}
