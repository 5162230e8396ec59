use bitvec::prelude::*;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Represents a unique identifier for a tile.
///
/// The wrapped value is the tile's index in its [`TileCatalog`], so it doubles
/// as a bit index into candidate bitsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque rendering hint attached to a tile. Never consulted by constraint logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Creates a color from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Errors that can occur during catalog creation or lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog must declare at least one tile.
    #[error("Tile catalog cannot be empty.")]
    EmptyCatalog,
    /// Two tiles were declared with the same name.
    #[error("Duplicate tile name: {0}")]
    DuplicateName(String),
    /// Weights must be >= 1.
    #[error("Tile weights must be positive. Found weight {weight} for tile '{tile}'")]
    NonPositiveWeight {
        /// Name of the offending tile.
        tile: String,
        /// The rejected weight.
        weight: i64,
    },
    /// An adjacency entry references a tile name that was never declared.
    #[error("Tile '{tile}' lists unknown neighbor '{neighbor}'")]
    UnknownNeighbor {
        /// Name of the tile carrying the rule.
        tile: String,
        /// The unresolved neighbor name.
        neighbor: String,
    },
    /// A lookup was made with an id the catalog never issued.
    #[error("Unknown tile type {0}")]
    UnknownTileType(TileId),
}

/// Declarative description of a tile, resolved into a [`TileType`] by
/// [`TileCatalog::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDefinition {
    /// Unique name, used to reference the tile from neighbor lists.
    pub name: String,
    /// Selection weight, must be >= 1.
    pub weight: i64,
    /// Rendering hint.
    pub color: Color,
    /// Names of tiles allowed in any of the 8 surrounding cells.
    pub allowed_neighbors: Vec<String>,
}

impl TileDefinition {
    /// Convenience constructor taking borrowed neighbor names.
    pub fn new(name: &str, weight: i64, color: Color, allowed_neighbors: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            weight,
            color,
            allowed_neighbors: allowed_neighbors.iter().map(|&n| n.to_owned()).collect(),
        }
    }
}

/// A registered tile type. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileType {
    /// Stable identifier, equal to the tile's position in the catalog.
    pub id: TileId,
    /// Unique name.
    pub name: String,
    /// Tiles that may sit next to this one, in declaration order.
    pub allowed_neighbors: Vec<TileId>,
    /// Selection weight (>= 1).
    pub weight: u32,
    /// Rendering hint passed through to the renderer.
    pub color: Color,
}

/// Static registry of tile types and their adjacency rules.
///
/// Adjacency is direction-agnostic: a rule `a -> b` means `b` may occupy any of
/// the 8 cells surrounding `a`. Rules need not be symmetric.
#[derive(Debug, Clone)]
pub struct TileCatalog {
    tiles: Vec<TileType>,
    /// One bitmask per tile, bit `b` set when the tile accepts `b` as a neighbor.
    neighbor_masks: Vec<BitVec>,
}

impl TileCatalog {
    /// Builds a catalog from tile definitions, assigning ids in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyCatalog` if `definitions` is empty,
    /// `CatalogError::DuplicateName` if a name repeats,
    /// `CatalogError::NonPositiveWeight` if a weight is `<= 0` and
    /// `CatalogError::UnknownNeighbor` if a neighbor list names an undeclared tile.
    pub fn new(definitions: Vec<TileDefinition>) -> Result<Self, CatalogError> {
        if definitions.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut name_to_id = HashMap::with_capacity(definitions.len());
        for (index, definition) in definitions.iter().enumerate() {
            if name_to_id
                .insert(definition.name.as_str(), TileId(index))
                .is_some()
            {
                return Err(CatalogError::DuplicateName(definition.name.clone()));
            }
        }

        let num_tiles = definitions.len();
        let mut tiles = Vec::with_capacity(num_tiles);
        let mut neighbor_masks = Vec::with_capacity(num_tiles);

        for (index, definition) in definitions.iter().enumerate() {
            let weight = u32::try_from(definition.weight)
                .ok()
                .filter(|&w| w > 0)
                .ok_or_else(|| CatalogError::NonPositiveWeight {
                    tile: definition.name.clone(),
                    weight: definition.weight,
                })?;

            let mut mask = bitvec![0; num_tiles];
            let mut neighbors = Vec::with_capacity(definition.allowed_neighbors.len());
            for neighbor_name in &definition.allowed_neighbors {
                let neighbor = *name_to_id.get(neighbor_name.as_str()).ok_or_else(|| {
                    CatalogError::UnknownNeighbor {
                        tile: definition.name.clone(),
                        neighbor: neighbor_name.clone(),
                    }
                })?;
                // Repeated entries are harmless, keep the first.
                if mask[neighbor.0] {
                    continue;
                }
                mask.set(neighbor.0, true);
                neighbors.push(neighbor);
            }

            tiles.push(TileType {
                id: TileId(index),
                name: definition.name.clone(),
                allowed_neighbors: neighbors,
                weight,
                color: definition.color,
            });
            neighbor_masks.push(mask);
        }

        log::debug!("Built tile catalog with {} tiles", num_tiles);
        Ok(Self {
            tiles,
            neighbor_masks,
        })
    }

    /// All tile types in declaration order. This is the initial candidate set of every cell.
    pub fn all_tile_types(&self) -> &[TileType] {
        &self.tiles
    }

    /// Number of registered tile types.
    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// Looks up a tile type by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTileType` if the id was not issued by this catalog.
    pub fn rule_for(&self, id: TileId) -> Result<&TileType, CatalogError> {
        self.tiles
            .get(id.0)
            .ok_or(CatalogError::UnknownTileType(id))
    }

    /// Looks up a tile type by name.
    pub fn find_by_name(&self, name: &str) -> Option<&TileType> {
        self.tiles.iter().find(|tile| tile.name == name)
    }

    /// Bitmask of the tiles `id` accepts as neighbors.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTileType` for an unregistered id.
    pub fn neighbor_mask(&self, id: TileId) -> Result<&BitSlice, CatalogError> {
        self.neighbor_masks
            .get(id.0)
            .map(BitVec::as_bitslice)
            .ok_or(CatalogError::UnknownTileType(id))
    }

    /// Checks whether `neighbor` may sit next to `tile`.
    ///
    /// Out-of-range ids are treated as disallowed.
    #[inline]
    pub fn accepts(&self, tile: TileId, neighbor: TileId) -> bool {
        self.neighbor_masks
            .get(tile.0)
            .and_then(|mask| mask.get(neighbor.0).map(|bit| *bit))
            .unwrap_or(false)
    }
}
