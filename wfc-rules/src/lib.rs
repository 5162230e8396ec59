//! Tile catalog definitions and rule-file loading for the tile constraint engine.

use thiserror::Error;

pub mod formats;
pub mod loader;
pub mod types;

pub use types::{CatalogError, Color, TileCatalog, TileDefinition, TileId, TileType};

/// Errors raised while reading or interpreting a rule file.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The rule file could not be read.
    #[error("I/O error reading file: {0}")]
    Io(#[from] std::io::Error),
    /// The file content is not valid for its format.
    #[error("Failed to parse rules format: {0}")]
    ParseError(String),
    /// The file parsed but describes an invalid catalog.
    #[error("Invalid rule data: {0}")]
    InvalidData(String),
    /// No parser is registered for the file's extension.
    #[error("Unsupported rule file format: {0}")]
    UnsupportedFormat(String),
    /// The parser needs a crate feature that was compiled out.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

impl From<CatalogError> for LoadError {
    fn from(error: CatalogError) -> Self {
        Self::InvalidData(format!("Catalog error: {error}"))
    }
}
