use crate::entropy::{EntropyCalculator, EntropyError, EntropyHeuristic, EntropyMap};
use crate::grid::{Grid, Position};
use float_ord::FloatOrd;
use rayon::prelude::*;
use wfc_rules::TileId;

/// CPU entropy calculator. Cells are scored in parallel with rayon; the grid is
/// only read.
#[derive(Debug, Clone, Default)]
pub struct CpuEntropyCalculator {
    heuristic: EntropyHeuristic,
}

impl CpuEntropyCalculator {
    /// Creates a calculator using `heuristic`.
    pub fn new(heuristic: EntropyHeuristic) -> Self {
        Self { heuristic }
    }

    fn shannon(grid: &Grid, candidates: &[TileId]) -> Result<f32, EntropyError> {
        let catalog = grid.catalog();
        let mut sum_weights = 0.0_f64;
        let mut sum_weight_log_weight = 0.0_f64;
        for &tile in candidates {
            let weight = f64::from(catalog.rule_for(tile)?.weight);
            sum_weights += weight;
            sum_weight_log_weight += weight * weight.ln();
        }
        Ok((sum_weights.ln() - sum_weight_log_weight / sum_weights) as f32)
    }
}

impl EntropyCalculator for CpuEntropyCalculator {
    fn calculate_entropy(&self, grid: &Grid) -> Result<EntropyMap, EntropyError> {
        grid.cells()
            .par_iter()
            .map(|cell| {
                if cell.is_placed() {
                    return Ok(None);
                }
                let count = cell.candidate_count();
                if count <= 1 {
                    return Ok(Some(0.0));
                }
                let entropy = match self.heuristic {
                    EntropyHeuristic::Count => count as f32,
                    EntropyHeuristic::Shannon => Self::shannon(grid, &cell.candidate_types())?,
                };
                Ok(Some(entropy))
            })
            .collect()
    }

    fn find_lowest_entropy(&self, grid: &Grid, entropy: &EntropyMap) -> Option<Position> {
        let width = grid.width();
        entropy
            .par_iter()
            .enumerate()
            .filter_map(|(index, value)| value.map(|e| (index, FloatOrd(e))))
            // Index in the key keeps ties deterministic regardless of thread split.
            .min_by_key(|&(index, e)| (e, index))
            .map(|(index, _)| Position::new(index % width, index / width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wfc_rules::{Color, TileCatalog, TileDefinition};

    fn grid(width: usize, height: usize, weights: &[i64]) -> Grid {
        let names: Vec<String> = (0..weights.len()).map(|i| format!("t{i}")).collect();
        let all: Vec<&str> = names.iter().map(String::as_str).collect();
        let definitions = names
            .iter()
            .zip(weights)
            .map(|(name, &w)| TileDefinition::new(name, w, Color::default(), &all))
            .collect();
        Grid::new(width, height, Arc::new(TileCatalog::new(definitions).unwrap())).unwrap()
    }

    #[test]
    fn test_initial_entropy_is_candidate_count() {
        let grid = grid(2, 2, &[1, 1, 1, 1]);
        let calculator = CpuEntropyCalculator::default();
        let entropy = calculator.calculate_entropy(&grid).unwrap();
        assert_eq!(entropy, vec![Some(4.0); 4]);
        assert_eq!(
            calculator.find_lowest_entropy(&grid, &entropy),
            Some(Position::new(0, 0))
        );
    }

    #[test]
    fn test_placed_cells_are_excluded() {
        let mut grid = grid(2, 1, &[1, 1]);
        grid.collapse(Position::new(0, 0), TileId(1)).unwrap();
        let calculator = CpuEntropyCalculator::default();
        let entropy = calculator.calculate_entropy(&grid).unwrap();
        assert_eq!(entropy, vec![None, Some(2.0)]);
        assert_eq!(
            calculator.find_lowest_entropy(&grid, &entropy),
            Some(Position::new(1, 0))
        );

        grid.collapse(Position::new(1, 0), TileId(0)).unwrap();
        let entropy = calculator.calculate_entropy(&grid).unwrap();
        assert_eq!(calculator.find_lowest_entropy(&grid, &entropy), None);
    }

    #[test]
    fn test_shannon_prefers_skewed_weights() {
        let uniform = grid(1, 1, &[1, 1]);
        let skewed = grid(1, 1, &[9, 1]);
        let calculator = CpuEntropyCalculator::new(EntropyHeuristic::Shannon);
        let uniform_entropy = calculator.calculate_entropy(&uniform).unwrap()[0].unwrap();
        let skewed_entropy = calculator.calculate_entropy(&skewed).unwrap()[0].unwrap();
        assert!((uniform_entropy - std::f32::consts::LN_2).abs() < 1e-5);
        assert!(skewed_entropy < uniform_entropy);
    }
}
