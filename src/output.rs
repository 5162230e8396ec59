//! Export of resolved grids.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use wfc_core::{Grid, Position, ResolvedTile};

/// One CSV row per resolved cell.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct TileRecord<'a> {
    x: usize,
    y: usize,
    tile: usize,
    name: &'a str,
    r: u8,
    g: u8,
    b: u8,
}

fn resolved_at(grid: &Grid, x: usize, y: usize) -> Result<ResolvedTile> {
    let pos = Position::new(x, y);
    grid.resolved_tile(pos).ok_or_else(|| {
        anyhow!(
            "Grid cell {} is not resolved ({} candidates), cannot save.",
            pos,
            grid.get(pos).map_or(0, |cell| cell.candidate_count())
        )
    })
}

/// Writes the tile ids of a fully collapsed grid, one row per line, ids separated by spaces.
pub fn write_grid<W: Write>(grid: &Grid, writer: &mut W) -> Result<()> {
    for y in 0..grid.height() {
        let mut line = String::new();
        for x in 0..grid.width() {
            if x > 0 {
                line.push(' ');
            }
            line.push_str(&resolved_at(grid, x, y)?.tile.0.to_string());
        }
        writeln!(writer, "{line}").with_context(|| format!("Failed to write row {y}"))?;
    }
    Ok(())
}

/// Saves the final collapsed grid to a file in the text format of [`write_grid`].
pub fn save_grid_to_file(grid: &Grid, output_path: &Path) -> Result<()> {
    log::info!("Attempting to save grid to {:?}...", output_path);

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {output_path:?}"))?;
    let mut writer = io::BufWriter::new(file);
    write_grid(grid, &mut writer)?;
    writer
        .flush()
        .context("Failed to flush writer for output file")?;

    log::info!("Successfully saved grid to {:?}", output_path);
    Ok(())
}

/// Writes `x,y,tile,name,r,g,b` rows for every cell in raster order.
pub fn write_tiles_csv<W: Write>(grid: &Grid, writer: W) -> Result<()> {
    let catalog = grid.catalog();
    let mut csv_writer = csv::Writer::from_writer(writer);
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let resolved = resolved_at(grid, x, y)?;
            let tile = catalog.rule_for(resolved.tile)?;
            csv_writer.serialize(TileRecord {
                x,
                y,
                tile: resolved.tile.0,
                name: &tile.name,
                r: resolved.color.r,
                g: resolved.color.g,
                b: resolved.color.b,
            })?;
        }
    }
    csv_writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// Saves the resolved tiles as CSV.
pub fn save_tiles_csv(grid: &Grid, csv_path: &Path) -> Result<()> {
    log::info!("Writing tile CSV to {:?}...", csv_path);
    let file = File::create(csv_path)
        .with_context(|| format!("Failed to create CSV file: {csv_path:?}"))?;
    write_tiles_csv(grid, io::BufWriter::new(file))?;
    log::info!("Successfully saved tile CSV to {:?}", csv_path);
    Ok(())
}
