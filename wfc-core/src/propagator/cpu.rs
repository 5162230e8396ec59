use crate::{
    cell::CellError,
    grid::{Grid, Position},
    propagator::{ConstraintPropagator, PropagationError},
};
use bitvec::prelude::*;
use std::collections::VecDeque;
use wfc_rules::TileId;

/// Order in which changed cells are taken from the work list.
///
/// Both orders reach the same fixed point on a consistent grid; the choice
/// only affects which cells are touched first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropagationOrder {
    /// Last changed cell first (stack).
    #[default]
    DepthFirst,
    /// First changed cell first (queue).
    BreadthFirst,
}

/// CPU constraint propagator driven by an explicit work list.
///
/// For every neighbor `n` of a changed cell `p`, a candidate `t` of `n`
/// survives only if some remaining candidate `t'` of `p` lists `t` among its
/// allowed neighbors. Neighbors that shrink are queued in turn.
#[derive(Debug, Clone, Default)]
pub struct CpuConstraintPropagator {
    order: PropagationOrder,
    max_steps: Option<usize>,
}

impl CpuConstraintPropagator {
    /// Creates a propagator using the given work-list order.
    pub fn new(order: PropagationOrder) -> Self {
        Self {
            order,
            max_steps: None,
        }
    }

    /// Overrides the step budget. By default it is derived from the grid as
    /// `1 + Σ(|candidates| - 1)`, the most cells a shrink-only pass can touch.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    fn step_budget(&self, grid: &Grid) -> usize {
        self.max_steps.unwrap_or_else(|| {
            grid.cells()
                .iter()
                .map(|cell| cell.candidate_count().saturating_sub(1))
                .sum::<usize>()
                + 1
        })
    }

    /// Union of the neighbor masks of every candidate in `candidates`.
    fn supported_neighbors(
        grid: &Grid,
        candidates: &BitSlice,
    ) -> Result<BitVec, PropagationError> {
        let catalog = grid.catalog();
        let mut supported = bitvec![0; catalog.num_tiles()];
        for tile in candidates.iter_ones() {
            let mask = catalog
                .neighbor_mask(TileId(tile))
                .map_err(|e| PropagationError::InternalError(e.to_string()))?;
            for allowed in mask.iter_ones() {
                supported.set(allowed, true);
            }
        }
        Ok(supported)
    }
}

impl ConstraintPropagator for CpuConstraintPropagator {
    fn propagate_from(
        &mut self,
        grid: &mut Grid,
        origin: Position,
    ) -> Result<usize, PropagationError> {
        if !grid.contains(origin) {
            return Err(PropagationError::InternalError(format!(
                "Propagation origin {origin} is outside the grid"
            )));
        }

        let budget = self.step_budget(grid);
        let mut work_list = VecDeque::from([origin]);
        let mut steps = 0;
        let mut changed_cells = 0;

        while let Some(pos) = match self.order {
            PropagationOrder::DepthFirst => work_list.pop_back(),
            PropagationOrder::BreadthFirst => work_list.pop_front(),
        } {
            steps += 1;
            if steps > budget {
                log::error!("Propagation from {} exceeded {} steps", origin, budget);
                return Err(PropagationError::StepLimitExceeded(budget));
            }

            let supported = match grid.get(pos) {
                Some(cell) => Self::supported_neighbors(grid, cell.candidates())?,
                None => continue,
            };

            for neighbor in grid.neighbors_of(pos) {
                let Some(cell) = grid.get_mut(neighbor) else {
                    continue;
                };
                // Collapsed cells are final.
                if cell.is_collapsed() {
                    continue;
                }

                let mut survivors = cell.candidates().to_bitvec();
                for tile in cell.candidates().iter_ones() {
                    if !supported[tile] {
                        survivors.set(tile, false);
                    }
                }

                match cell.restrict_to(survivors) {
                    Ok(true) => {
                        log::trace!(
                            "Cell {} narrowed to {} candidates by {}",
                            neighbor,
                            cell.candidate_count(),
                            pos
                        );
                        grid.mark_dirty(neighbor);
                        changed_cells += 1;
                        work_list.push_back(neighbor);
                    }
                    Ok(false) => {}
                    Err(CellError::EmptyCandidates(at)) => {
                        return Err(PropagationError::Contradiction(at));
                    }
                }
            }
        }

        log::trace!(
            "Propagation from {} settled after {} steps, {} cells changed",
            origin,
            steps,
            changed_cells
        );
        Ok(changed_cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wfc_rules::{Color, TileCatalog, TileDefinition};

    // a-b-c chain: each tile accepts itself and its direct neighbors in the chain.
    fn chain_grid(width: usize, height: usize) -> Grid {
        let catalog = TileCatalog::new(vec![
            TileDefinition::new("a", 1, Color::default(), &["a", "b"]),
            TileDefinition::new("b", 1, Color::default(), &["a", "b", "c"]),
            TileDefinition::new("c", 1, Color::default(), &["b", "c"]),
        ])
        .unwrap();
        Grid::new(width, height, Arc::new(catalog)).unwrap()
    }

    #[test]
    fn test_propagate_simple_strip() {
        let mut grid = chain_grid(4, 1);
        grid.get_mut(Position::new(0, 0)).unwrap().place(TileId(0));

        let mut propagator = CpuConstraintPropagator::default();
        let changed = propagator
            .propagate_from(&mut grid, Position::new(0, 0))
            .unwrap();

        // Only the direct neighbor shrinks; `b` supports every tile further out.
        assert_eq!(changed, 1);
        assert_eq!(
            grid.candidates_of(Position::new(1, 0)).unwrap(),
            vec![TileId(0), TileId(1)]
        );
        assert_eq!(
            grid.candidates_of(Position::new(2, 0)).unwrap(),
            vec![TileId(0), TileId(1), TileId(2)]
        );
    }

    #[test]
    fn test_collapsed_neighbors_are_skipped() {
        let mut grid = chain_grid(2, 1);
        grid.get_mut(Position::new(1, 0)).unwrap().place(TileId(2));
        grid.get_mut(Position::new(0, 0)).unwrap().place(TileId(0));

        // `a` never accepts `c`, but the placed neighbor is not revisited.
        let mut propagator = CpuConstraintPropagator::default();
        let changed = propagator
            .propagate_from(&mut grid, Position::new(0, 0))
            .unwrap();
        assert_eq!(changed, 0);
        assert_eq!(grid.candidates_of(Position::new(1, 0)).unwrap(), vec![TileId(2)]);
    }

    #[test]
    fn test_no_propagation_needed() {
        let mut grid = chain_grid(3, 3);
        let before = grid.cells().to_vec();
        let mut propagator = CpuConstraintPropagator::new(PropagationOrder::BreadthFirst);
        let changed = propagator
            .propagate_from(&mut grid, Position::new(1, 1))
            .unwrap();
        assert_eq!(changed, 0);
        assert_eq!(grid.cells(), before.as_slice());
    }

    #[test]
    fn test_origin_out_of_bounds() {
        let mut grid = chain_grid(2, 2);
        let mut propagator = CpuConstraintPropagator::default();
        assert!(matches!(
            propagator.propagate_from(&mut grid, Position::new(5, 5)),
            Err(PropagationError::InternalError(_))
        ));
    }

    #[test]
    fn test_step_budget_is_enforced() {
        let mut grid = chain_grid(5, 1);
        grid.get_mut(Position::new(0, 0)).unwrap().place(TileId(0));
        let mut propagator = CpuConstraintPropagator::default().with_max_steps(1);
        assert_eq!(
            propagator.propagate_from(&mut grid, Position::new(0, 0)),
            Err(PropagationError::StepLimitExceeded(1))
        );
    }
}
