use crate::grid::Position;
use bitvec::prelude::*;
use thiserror::Error;
use wfc_rules::TileId;

/// Errors raised by [`Cell`] mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CellError {
    /// The requested candidate set was empty; the cell was left untouched.
    #[error("Cell at {0} cannot be left without candidates")]
    EmptyCandidates(Position),
}

/// One grid position and the tile types it may still hold.
///
/// A cell is a plain container: deciding *which* candidates survive is the
/// grid's job. The only rule enforced here is that the candidate set never
/// becomes empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    position: Position,
    /// Bit `i` set means `TileId(i)` is still possible.
    candidates: BitVec,
    placed: bool,
}

impl Cell {
    /// Creates a cell in full superposition over `num_tiles` tile types.
    pub fn new(position: Position, num_tiles: usize) -> Self {
        Self {
            position,
            candidates: bitvec![1; num_tiles],
            placed: false,
        }
    }

    /// The cell's fixed grid coordinate.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Raw candidate bitset.
    pub fn candidates(&self) -> &BitSlice {
        &self.candidates
    }

    /// Snapshot of the remaining candidates in catalog order.
    pub fn candidate_types(&self) -> Vec<TileId> {
        self.candidates.iter_ones().map(TileId).collect()
    }

    /// Number of remaining candidates.
    pub fn candidate_count(&self) -> usize {
        self.candidates.count_ones()
    }

    /// Whether `tile` is still a candidate.
    pub fn has_candidate(&self, tile: TileId) -> bool {
        self.candidates.get(tile.0).map_or(false, |bit| *bit)
    }

    /// Exactly one candidate remains.
    pub fn is_collapsed(&self) -> bool {
        self.candidate_count() == 1
    }

    /// An explicit collapse locked this cell.
    pub fn is_placed(&self) -> bool {
        self.placed
    }

    /// The single remaining tile, if collapsed.
    pub fn collapsed_tile(&self) -> Option<TileId> {
        if self.is_collapsed() {
            self.candidates.first_one().map(TileId)
        } else {
            None
        }
    }

    /// Replaces the candidate set. Returns whether anything changed.
    ///
    /// The caller is responsible for passing a subset of the current candidates.
    ///
    /// # Errors
    ///
    /// Returns `CellError::EmptyCandidates` if `new_set` has no bits set; the
    /// cell keeps its previous candidates in that case.
    pub fn restrict_to(&mut self, new_set: BitVec) -> Result<bool, CellError> {
        if new_set.not_any() {
            return Err(CellError::EmptyCandidates(self.position));
        }
        debug_assert_eq!(new_set.len(), self.candidates.len());
        debug_assert!(
            new_set.iter_ones().all(|i| self.candidates[i]),
            "candidate sets may only shrink"
        );
        if new_set == self.candidates {
            return Ok(false);
        }
        self.candidates = new_set;
        Ok(true)
    }

    /// Locks the cell to `tile` and marks it placed.
    pub(crate) fn place(&mut self, tile: TileId) {
        self.candidates.fill(false);
        self.candidates.set(tile.0, true);
        self.placed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_is_in_superposition() {
        let cell = Cell::new(Position::new(2, 3), 4);
        assert_eq!(cell.position(), Position::new(2, 3));
        assert_eq!(cell.candidate_types(), vec![TileId(0), TileId(1), TileId(2), TileId(3)]);
        assert!(!cell.is_collapsed());
        assert!(!cell.is_placed());
        assert_eq!(cell.collapsed_tile(), None);
    }

    #[test]
    fn test_restrict_to_reports_change() {
        let mut cell = Cell::new(Position::new(0, 0), 3);
        assert_eq!(cell.restrict_to(bitvec![1, 0, 1]), Ok(true));
        assert_eq!(cell.restrict_to(bitvec![1, 0, 1]), Ok(false));
        assert_eq!(cell.restrict_to(bitvec![0, 0, 1]), Ok(true));
        assert!(cell.is_collapsed());
        assert!(!cell.is_placed());
        assert_eq!(cell.collapsed_tile(), Some(TileId(2)));
    }

    #[test]
    fn test_restrict_to_rejects_empty() {
        let mut cell = Cell::new(Position::new(1, 1), 2);
        assert_eq!(
            cell.restrict_to(bitvec![0, 0]),
            Err(CellError::EmptyCandidates(Position::new(1, 1)))
        );
        assert_eq!(cell.candidate_count(), 2);
    }

    #[test]
    fn test_place_locks_cell() {
        let mut cell = Cell::new(Position::new(0, 0), 3);
        cell.place(TileId(1));
        assert!(cell.is_placed());
        assert!(cell.has_candidate(TileId(1)));
        assert!(!cell.has_candidate(TileId(0)));
        assert!(!cell.has_candidate(TileId(9)));
        assert_eq!(cell.collapsed_tile(), Some(TileId(1)));
    }
}
