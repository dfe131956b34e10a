//! Core types and traits for structuring.

use std::fmt;

use crate::error::{SourceLocation, StructureError};
use crate::profile::{GrammarId, LanguageProfile};

use super::Entity;

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Owned by the processing of one file and dropped once the file's result
/// has been built.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
    /// Language id of the profile that parsed the file.
    pub language: &'static str,
    /// Grammar the tree was produced with.
    pub grammar: GrammarId,
}

impl ParsedFile {
    /// Get the source code as a string slice.
    pub fn source_str(&self) -> &str {
        std::str::from_utf8(&self.source).unwrap_or("")
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Location of the first ERROR or MISSING node, if the tree has any.
    pub fn syntax_error(&self) -> Option<(SourceLocation, String)> {
        let root = self.root();
        if !root.has_error() {
            return None;
        }
        let node = first_error_node(root).unwrap_or(root);
        let start = node.start_position();
        let location = SourceLocation {
            offset: node.start_byte(),
            line: start.row + 1,
            column: start.column + 1,
        };
        let message = if node.is_missing() {
            format!("missing `{}` at {}", node.kind(), location)
        } else {
            format!("syntax error at {}", location)
        };
        Some((location, message))
    }
}

impl fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedFile")
            .field("path", &self.path)
            .field("language", &self.language)
            .field("grammar", &self.grammar)
            .finish()
    }
}

/// Depth-first search for the first ERROR or MISSING node.
fn first_error_node(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_node)
}

/// Turns a parsed file into canonical entities.
///
/// Implementations must be stateless with respect to individual files so one
/// structurer can serve many worker threads.
pub trait Structurer: Send + Sync {
    /// Extract the entity forest of one file.
    ///
    /// A query that is invalid for the file's grammar fails the whole file.
    /// Query alternatives that never match are not errors.
    fn structure(
        &self,
        profile: &LanguageProfile,
        parsed: &ParsedFile,
    ) -> Result<Vec<Entity>, StructureError>;
}
