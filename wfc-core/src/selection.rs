//! Weighted choice of a concrete tile among a cell's candidates.
use rand::Rng;
use thiserror::Error;
use wfc_rules::{CatalogError, TileCatalog, TileId};

/// Errors that can occur during weighted selection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// There was nothing to choose from.
    #[error("Cannot select a tile from an empty candidate set")]
    EmptyCandidates,
    /// A candidate is not registered in the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Expands `candidates` into a flat pool where each tile appears `weight` times.
///
/// Only the given candidates contribute, so a tile that was pruned away can
/// never be drawn regardless of its weight. The pool holds `Σ weight` entries;
/// [`pick_weighted`] draws from it implicitly and never builds it.
///
/// # Errors
///
/// Returns `SelectionError::Catalog` if a candidate is not in `catalog`.
pub fn weighted_pool(
    candidates: &[TileId],
    catalog: &TileCatalog,
) -> Result<Vec<TileId>, SelectionError> {
    let mut pool = Vec::new();
    for &tile in candidates {
        let weight = catalog.rule_for(tile)?.weight as usize;
        pool.extend(std::iter::repeat(tile).take(weight));
    }
    Ok(pool)
}

/// Picks one tile from `candidates`, proportionally to catalog weights.
///
/// Draws an index into the implicit [`weighted_pool`] and walks the cumulative
/// weights to find its tile, so memory stays proportional to the candidate
/// count. A singleton set is returned as-is without touching `rng`.
///
/// # Errors
///
/// Returns `SelectionError::EmptyCandidates` for an empty set and
/// `SelectionError::Catalog` for unregistered candidates.
pub fn pick_weighted<R: Rng + ?Sized>(
    candidates: &[TileId],
    catalog: &TileCatalog,
    rng: &mut R,
) -> Result<TileId, SelectionError> {
    match candidates {
        [] => Err(SelectionError::EmptyCandidates),
        [only] => {
            catalog.rule_for(*only)?;
            Ok(*only)
        }
        [.., last] => {
            let weights = candidates
                .iter()
                .map(|&tile| Ok(u64::from(catalog.rule_for(tile)?.weight)))
                .collect::<Result<Vec<u64>, SelectionError>>()?;
            let total: u64 = weights.iter().sum();
            let mut index = rng.gen_range(0..total);
            for (&tile, &weight) in candidates.iter().zip(&weights) {
                if index < weight {
                    return Ok(tile);
                }
                index -= weight;
            }
            // index < total, so the walk always returns above.
            Ok(*last)
        }
    }
}
