//! Terminal rendering of a grid.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, Write};
use wfc_core::{Grid, Position};

/// Types that can present the state of a [`Grid`].
pub trait Visualizer {
    /// Displays the current state of `grid`.
    fn display_state(&mut self, grid: &Grid) -> Result<()>;
}

/// Prints the grid as colored blocks, two characters per cell.
///
/// Placed cells use their tile color. Unplaced cells show their candidate
/// count (or `+` above nine), so a partially resolved grid stays readable.
pub struct TerminalVisualizer<W: Write = io::Stdout> {
    out: W,
}

impl TerminalVisualizer {
    /// Visualizer writing to stdout.
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for TerminalVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalVisualizer<W> {
    /// Visualizer writing to an arbitrary sink.
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    /// Consumes the visualizer, returning its sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn cell_glyph(grid: &Grid, pos: Position) -> String {
        if let Some(resolved) = grid.resolved_tile(pos) {
            let color = resolved.color;
            return "██".truecolor(color.r, color.g, color.b).to_string();
        }
        let count = grid.get(pos).map_or(0, |cell| cell.candidate_count());
        let label = match count {
            0..=9 => format!("{count:>2}"),
            _ => " +".to_string(),
        };
        label.as_str().dimmed().to_string()
    }
}

impl<W: Write> Visualizer for TerminalVisualizer<W> {
    fn display_state(&mut self, grid: &Grid) -> Result<()> {
        let mut frame = String::with_capacity(grid.len() * 4 + grid.height());
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                frame.push_str(&Self::cell_glyph(grid, Position::new(x, y)));
            }
            frame.push('\n');
        }
        self.out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush())
            .context("Failed to write terminal frame")
    }
}
