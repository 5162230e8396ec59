//! Built-in terrain tiles and catalog selection.

use crate::error::AppError;
use std::path::Path;
use wfc_rules::{loader::load_from_file, Color, TileCatalog, TileDefinition};

/// Definitions of the built-in terrain set.
///
/// Tiles form a chain from deep water to mountain tops; each accepts itself and
/// its direct neighbors in the chain, so every grid size has a solution.
pub fn terrain_definitions() -> Vec<TileDefinition> {
    vec![
        TileDefinition::new("water", 4, Color::new(38, 92, 196), &["water", "sand"]),
        TileDefinition::new("sand", 2, Color::new(222, 204, 132), &["water", "sand", "grass"]),
        TileDefinition::new("grass", 5, Color::new(84, 168, 62), &["sand", "grass", "forest"]),
        TileDefinition::new("forest", 3, Color::new(28, 98, 44), &["grass", "forest", "mountain"]),
        TileDefinition::new("mountain", 2, Color::new(136, 128, 120), &["forest", "mountain"]),
    ]
}

/// The built-in terrain catalog.
pub fn terrain_catalog() -> Result<TileCatalog, AppError> {
    TileCatalog::new(terrain_definitions())
        .map_err(|e| AppError::Config(format!("Built-in terrain catalog is invalid: {e}")))
}

/// Loads `rule_file` if given, otherwise returns the terrain catalog.
pub fn resolve_catalog(rule_file: Option<&Path>) -> Result<TileCatalog, AppError> {
    match rule_file {
        Some(path) => {
            log::info!("Loading rules from: {:?}", path);
            let catalog = load_from_file(path)?;
            log::info!("Rules loaded: {} tiles", catalog.num_tiles());
            Ok(catalog)
        }
        None => {
            log::info!("No rule file given, using the built-in terrain tiles");
            terrain_catalog()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfc_rules::TileId;

    #[test]
    fn test_terrain_catalog_is_valid() {
        let catalog = terrain_catalog().unwrap();
        assert_eq!(catalog.num_tiles(), 5);
        let water = catalog.find_by_name("water").unwrap().id;
        let sand = catalog.find_by_name("sand").unwrap().id;
        let mountain = catalog.find_by_name("mountain").unwrap().id;
        assert!(catalog.accepts(water, sand));
        assert!(catalog.accepts(sand, water));
        assert!(!catalog.accepts(water, mountain));
    }

    #[test]
    fn test_terrain_rules_are_symmetric() {
        let catalog = terrain_catalog().unwrap();
        for a in 0..catalog.num_tiles() {
            for b in 0..catalog.num_tiles() {
                assert_eq!(
                    catalog.accepts(TileId(a), TileId(b)),
                    catalog.accepts(TileId(b), TileId(a))
                );
            }
        }
    }

    #[test]
    fn test_resolve_catalog_reports_missing_file() {
        let result = resolve_catalog(Some(Path::new("/no/such/rules.ron")));
        assert!(matches!(result, Err(AppError::Rules(_))));
    }
}
