use crate::cell::Cell;
use crate::propagator::{ConstraintPropagator, CpuConstraintPropagator, PropagationError};
use crate::WfcError;
use bitvec::prelude::*;
use std::fmt;
use std::sync::Arc;
use wfc_rules::{Color, TileCatalog, TileId};

/// Relative offsets of the 8 surrounding cells, in propagation order.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
];

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Column, in `[0, width)`.
    pub x: usize,
    /// Row, in `[0, height)`.
    pub y: usize,
}

impl Position {
    /// Creates a position.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Renderer-facing descriptor of a placed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTile {
    /// Where the tile sits.
    pub position: Position,
    /// The tile type the cell resolved to.
    pub tile: TileId,
    /// The tile's rendering hint.
    pub color: Color,
}

/// A fixed-size 2D field of cells plus the catalog that constrains them.
///
/// Cells are stored row-major and addressed by coordinate; neighbors are found
/// by index arithmetic, so no cell ever references another.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    catalog: Arc<TileCatalog>,
    /// Cells whose candidate set changed, or that were placed, since the last
    /// [`Grid::take_dirty`].
    dirty: BitVec,
}

impl Grid {
    /// Creates a grid where every cell may hold any tile of `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::GridError` if either dimension is zero.
    pub fn new(width: usize, height: usize, catalog: Arc<TileCatalog>) -> Result<Self, WfcError> {
        if width == 0 || height == 0 {
            return Err(WfcError::GridError(format!(
                "Grid dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let num_tiles = catalog.num_tiles();
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
            .map(|position| Cell::new(position, num_tiles))
            .collect();
        log::debug!(
            "Initialized {}x{} grid with {} tile types",
            width,
            height,
            num_tiles
        );
        Ok(Self {
            width,
            height,
            cells,
            catalog,
            dirty: bitvec![0; width * height],
        })
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; grids have at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The catalog constraining this grid.
    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Whether `pos` lies inside the grid.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Row-major index of `pos`, or `None` when out of bounds.
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.y * self.width + pos.x)
    }

    /// Returns the cell at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.index_of(pos).and_then(|idx| self.cells.get(idx))
    }

    pub(crate) fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.index_of(pos).and_then(move |idx| self.cells.get_mut(idx))
    }

    fn cell(&self, pos: Position) -> Result<&Cell, WfcError> {
        self.get(pos).ok_or(WfcError::OutOfBounds(pos))
    }

    /// In-bounds neighbors of `pos` in [`NEIGHBOR_OFFSETS`] order.
    ///
    /// A corner has 3 neighbors, a non-corner edge cell 5, an interior cell 8.
    pub fn neighbors_of(&self, pos: Position) -> Vec<Position> {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| {
                let x = pos.x.checked_add_signed(dx)?;
                let y = pos.y.checked_add_signed(dy)?;
                let neighbor = Position::new(x, y);
                self.contains(neighbor).then_some(neighbor)
            })
            .collect()
    }

    /// Remaining candidates of the cell at `pos`.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::OutOfBounds` for positions outside the grid.
    pub fn candidates_of(&self, pos: Position) -> Result<Vec<TileId>, WfcError> {
        Ok(self.cell(pos)?.candidate_types())
    }

    /// Whether the cell at `pos` has exactly one candidate left.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::OutOfBounds` for positions outside the grid.
    pub fn is_collapsed(&self, pos: Position) -> Result<bool, WfcError> {
        Ok(self.cell(pos)?.is_collapsed())
    }

    /// Whether the cell at `pos` was explicitly collapsed.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::OutOfBounds` for positions outside the grid.
    pub fn is_placed(&self, pos: Position) -> Result<bool, WfcError> {
        Ok(self.cell(pos)?.is_placed())
    }

    /// Number of cells with exactly one candidate.
    pub fn collapsed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_collapsed()).count()
    }

    /// Number of explicitly placed cells.
    pub fn placed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_placed()).count()
    }

    /// Whether every cell has been explicitly placed.
    pub fn is_fully_placed(&self) -> bool {
        self.cells.iter().all(Cell::is_placed)
    }

    /// Descriptor for a placed cell; `None` if out of bounds or not yet placed.
    pub fn resolved_tile(&self, pos: Position) -> Option<ResolvedTile> {
        let cell = self.get(pos)?;
        if !cell.is_placed() {
            return None;
        }
        let tile = cell.collapsed_tile()?;
        let color = self.catalog.rule_for(tile).ok()?.color;
        Some(ResolvedTile {
            position: pos,
            tile,
            color,
        })
    }

    /// Drains the set of cells whose candidates changed or that became placed
    /// since the previous call, in row-major order.
    pub fn take_dirty(&mut self) -> Vec<Position> {
        let width = self.width;
        let changed = self
            .dirty
            .iter_ones()
            .map(|idx| Position::new(idx % width, idx / width))
            .collect();
        self.dirty.fill(false);
        changed
    }

    pub(crate) fn mark_dirty(&mut self, pos: Position) {
        if let Some(idx) = self.index_of(pos) {
            self.dirty.set(idx, true);
        }
    }

    /// Collapses the cell at `pos` to `tile` and propagates with the default
    /// depth-first propagator.
    ///
    /// # Errors
    ///
    /// See [`Grid::collapse_with`].
    pub fn collapse(&mut self, pos: Position, tile: TileId) -> Result<ResolvedTile, WfcError> {
        let mut propagator = CpuConstraintPropagator::default();
        self.collapse_with(pos, tile, &mut propagator)
    }

    /// Collapses the cell at `pos` to `tile`, marks it placed and propagates the
    /// consequences with `propagator`.
    ///
    /// # Errors
    ///
    /// * `WfcError::OutOfBounds` if `pos` is outside the grid.
    /// * `WfcError::TileSet` if `tile` is not in the catalog.
    /// * `WfcError::InvalidCollapseRequest` if `tile` is no longer a candidate of the cell.
    ///
    /// The grid is unchanged after any of the above.
    ///
    /// * `WfcError::Contradiction` if propagation empties a cell. The grid is left as
    ///   it was at the point of contradiction; clone it beforehand to retry.
    pub fn collapse_with(
        &mut self,
        pos: Position,
        tile: TileId,
        propagator: &mut dyn ConstraintPropagator,
    ) -> Result<ResolvedTile, WfcError> {
        if !self.contains(pos) {
            return Err(WfcError::OutOfBounds(pos));
        }
        let color = self.catalog.rule_for(tile)?.color;
        let cell = self.get_mut(pos).ok_or(WfcError::OutOfBounds(pos))?;
        if !cell.has_candidate(tile) {
            return Err(WfcError::InvalidCollapseRequest {
                position: pos,
                tile,
            });
        }
        // A cell already narrowed to `tile` still becomes renderable here.
        let newly_placed = !cell.is_placed();
        cell.place(tile);
        if newly_placed {
            self.mark_dirty(pos);
        }
        log::debug!("Collapsed cell {} to tile {}", pos, tile);

        match propagator.propagate_from(self, pos) {
            Ok(changed) => {
                log::trace!("Propagation from {} changed {} cells", pos, changed);
                Ok(ResolvedTile {
                    position: pos,
                    tile,
                    color,
                })
            }
            Err(PropagationError::Contradiction(at)) => {
                log::warn!("Contradiction at {} after collapsing {}", at, pos);
                Err(WfcError::Contradiction(at))
            }
            Err(other) => Err(WfcError::from(other)),
        }
    }
}
