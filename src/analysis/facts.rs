//! Canonical per-file structure: entities and file results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FileError;
use crate::profile::EntityKind;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    /// Check if `other` lies within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    /// Check if a byte offset lies within this span (end exclusive).
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start_byte <= offset && offset < self.end_byte
    }

    pub fn len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Index of an entity within its file, assigned in preorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A canonical program entity.
///
/// Children are owned. The enclosing entity is referenced by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Textual reference to another entity: implemented trait, base class,
    /// receiver type or import source. Never resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Entity>,
}

impl Entity {
    /// Children of a given kind.
    pub fn children_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// This entity and all its descendants, in preorder.
    pub fn walk(&self) -> EntityWalk<'_> {
        EntityWalk { stack: vec![self] }
    }
}

/// Preorder iterator over an entity forest.
pub struct EntityWalk<'a> {
    stack: Vec<&'a Entity>,
}

impl<'a> EntityWalk<'a> {
    pub fn new(roots: &'a [Entity]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for EntityWalk<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<Self::Item> {
        let entity = self.stack.pop()?;
        self.stack.extend(entity.children.iter().rev());
        Some(entity)
    }
}

/// Processing state of one file.
///
/// Files move `Pending -> Parsed -> Structured -> Done`, or to `Failed` from
/// any step. A failed file is not retried within a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    Pending,
    Parsed,
    Structured,
    Done,
    Failed,
}

impl FileState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FileState::Done | FileState::Failed)
    }
}

/// Structure extracted from a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStructureResult {
    /// Path relative to the scan root, `/`-separated.
    pub path: String,
    /// Language id, or None when no profile matched.
    pub language: Option<String>,
    #[serde(default)]
    pub is_test: bool,
    pub state: FileState,
    pub entities: Vec<Entity>,
    pub errors: Vec<FileError>,
}

impl FileStructureResult {
    pub fn new(path: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            path: path.into(),
            language: language.map(str::to_string),
            is_test: false,
            state: FileState::Pending,
            entities: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record a failure. Entities collected so far are discarded.
    pub fn fail(&mut self, error: FileError) {
        self.entities.clear();
        self.errors.push(error);
        self.state = FileState::Failed;
    }

    pub fn is_failed(&self) -> bool {
        self.state == FileState::Failed
    }

    /// All entities in preorder.
    pub fn walk(&self) -> EntityWalk<'_> {
        EntityWalk::new(&self.entities)
    }

    pub fn entity_count(&self) -> usize {
        self.walk().count()
    }

    /// Find the first entity (in preorder) with the given kind and name.
    pub fn find(&self, kind: EntityKind, name: &str) -> Option<&Entity> {
        self.walk().find(|e| e.kind == kind && e.name == name)
    }

    pub fn find_by_id(&self, id: EntityId) -> Option<&Entity> {
        self.walk().find(|e| e.id == id)
    }
}
