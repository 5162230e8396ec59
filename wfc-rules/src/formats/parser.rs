use crate::{LoadError, TileCatalog};

/// Trait defining the interface for format-specific rule parsers.
pub trait FormatParser {
    /// Parses rule content into a [`TileCatalog`].
    ///
    /// # Errors
    ///
    /// Returns `LoadError::ParseError` when the content is malformed and
    /// `LoadError::InvalidData` when it describes an invalid catalog.
    fn parse(&self, content: &str) -> Result<TileCatalog, LoadError>;

    /// Human-readable name of the format, used in logs and error messages.
    fn format_name(&self) -> &'static str;

    /// File extensions (lowercase, without the dot) handled by this parser.
    fn extensions(&self) -> &'static [&'static str];
}
