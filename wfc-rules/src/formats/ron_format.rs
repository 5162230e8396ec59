use crate::formats::FormatParser;
#[cfg(feature = "serde")]
use crate::types::{Color, TileDefinition};
use crate::{LoadError, TileCatalog};
#[cfg(feature = "serde")]
use serde::Deserialize;

/// A parser implementation for RON (Rusty Object Notation) rule files.
///
/// ```ron
/// (
///     tiles: [
///         (name: "water", weight: 2, color: (r: 30, g: 90, b: 200), neighbors: ["water", "sand"]),
///         (name: "sand", neighbors: ["water", "sand"]),
///     ],
/// )
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct RonFormatParser;

impl RonFormatParser {
    /// Creates a new RON format parser.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "serde")]
fn default_weight() -> i64 {
    1
}

#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
struct RonTileData {
    name: String,
    #[serde(default = "default_weight")]
    weight: i64,
    #[serde(default)]
    color: Color,
    #[serde(default)]
    neighbors: Vec<String>,
}

#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
struct RonRuleFile {
    tiles: Vec<RonTileData>,
}

impl FormatParser for RonFormatParser {
    fn format_name(&self) -> &'static str {
        "Rusty Object Notation (RON)"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ron"]
    }

    #[cfg(feature = "serde")]
    fn parse(&self, ron_content: &str) -> Result<TileCatalog, LoadError> {
        let rule_file: RonRuleFile = ron::from_str(ron_content)
            .map_err(|e| LoadError::ParseError(format!("RON deserialization failed: {e}")))?;

        if rule_file.tiles.is_empty() {
            return Err(LoadError::InvalidData("No tiles defined.".to_owned()));
        }

        let definitions = rule_file
            .tiles
            .into_iter()
            .map(|tile| TileDefinition {
                name: tile.name,
                weight: tile.weight,
                color: tile.color,
                allowed_neighbors: tile.neighbors,
            })
            .collect();

        Ok(TileCatalog::new(definitions)?)
    }

    #[cfg(not(feature = "serde"))]
    fn parse(&self, _ron_content: &str) -> Result<TileCatalog, LoadError> {
        Err(LoadError::FeatureNotEnabled(
            "serde (required for RON parsing)".to_string(),
        ))
    }
}

/// Parses a tile catalog from a RON string.
///
/// # Errors
///
/// See [`FormatParser::parse`].
pub fn parse_ron_rules(ron_content: &str) -> Result<TileCatalog, LoadError> {
    RonFormatParser::new().parse(ron_content)
}
