use crate::formats::{FormatParser, RonFormatParser};
use crate::{LoadError, TileCatalog};
use std::path::Path;

/// Returns the parser registered for a file extension (case-insensitive).
pub fn parser_for_extension(extension: &str) -> Option<Box<dyn FormatParser>> {
    let extension = extension.to_ascii_lowercase();
    let parsers: [Box<dyn FormatParser>; 1] = [Box::new(RonFormatParser::new())];
    parsers
        .into_iter()
        .find(|parser| parser.extensions().contains(&extension.as_str()))
}

/// Loads a tile catalog from a rule file, choosing the parser by extension.
///
/// # Errors
///
/// Returns `LoadError::UnsupportedFormat` for unknown extensions,
/// `LoadError::Io` if the file cannot be read, and any parse or validation
/// error produced by the format parser.
pub fn load_from_file(path: &Path) -> Result<TileCatalog, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let parser = parser_for_extension(extension)
        .ok_or_else(|| LoadError::UnsupportedFormat(path.display().to_string()))?;

    log::info!(
        "Loading tile rules from {:?} as {}",
        path,
        parser.format_name()
    );
    let content = std::fs::read_to_string(path)?;
    let catalog = parser.parse(&content)?;
    log::debug!("Loaded {} tile types from {:?}", catalog.num_tiles(), path);
    Ok(catalog)
}
