//! Grammar parsing for one file.

use std::path::Path;

use crate::error::StructureError;
use crate::profile::LanguageProfile;

use super::ParsedFile;

/// Parse `source` with the profile grammar selected by the path's extension.
///
/// tree-sitter recovers from malformed input, so a tree with ERROR nodes is
/// still returned here; use [`ParsedFile::syntax_error`] to reject it.
/// `tree_sitter::Parser` is not `Sync`, so a parser is created per call.
pub fn parse_file(
    profile: &LanguageProfile,
    path: &Path,
    source: Vec<u8>,
) -> Result<ParsedFile, StructureError> {
    let display = path.to_string_lossy().to_string();
    let grammar = profile.grammar_for_path(path);

    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&grammar.language)
        .map_err(|e| StructureError::Parse {
            path: display.clone(),
            message: format!("grammar {} is incompatible: {}", grammar.id, e),
            location: None,
        })?;

    let tree = parser
        .parse(&source, None)
        .ok_or_else(|| StructureError::Parse {
            path: display.clone(),
            message: "parser produced no tree".to_string(),
            location: None,
        })?;

    Ok(ParsedFile {
        tree,
        source,
        path: display,
        language: profile.id(),
        grammar: grammar.id,
    })
}

/// Parse and reject trees that contain syntax errors.
pub fn parse_valid(
    profile: &LanguageProfile,
    path: &Path,
    source: Vec<u8>,
) -> Result<ParsedFile, StructureError> {
    let parsed = parse_file(profile, path, source)?;
    if let Some((location, message)) = parsed.syntax_error() {
        return Err(StructureError::Parse {
            path: parsed.path,
            message,
            location: Some(location),
        });
    }
    Ok(parsed)
}
