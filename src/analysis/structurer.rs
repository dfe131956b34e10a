//! Query-driven structurer.
//!
//! The profile's structure query tags nodes with capture labels:
//!
//! - `@<kind>` marks the node that becomes an entity of that canonical kind
//! - `@<kind>.name`, `@<kind>.type`, `@<kind>.return` and `@<kind>.ref`
//!   attach text to that entity
//! - labels starting with `_` are helpers for predicates and are ignored
//!
//! Each match yields at most one candidate entity. Candidates are ordered by
//! start offset, longer spans first, then by pattern declaration order.
//! Candidates covering the same span collapse to the first one, so an
//! earlier pattern overrides a more general later one (methods before plain
//! functions, for example). Nesting follows span containment, not the
//! pattern that produced the match.

use std::sync::Arc;

use streaming_iterator::StreamingIterator;
use tracing::debug;
use tree_sitter::{Query, QueryCursor};

use crate::error::StructureError;
use crate::profile::{EntityKind, LanguageProfile, QueryName};
use crate::query::QueryCache;

use super::{Entity, EntityId, ParsedFile, Span, Structurer};

/// Role of a secondary capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Name,
    Type,
    Return,
    Ref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CaptureLabel {
    kind: EntityKind,
    role: Option<Role>,
}

impl CaptureLabel {
    /// Parse a capture name. `Ok(None)` means the capture is ignored.
    fn parse(name: &str) -> Result<Option<Self>, String> {
        if name.starts_with('_') {
            return Ok(None);
        }
        let (kind, role) = match name.split_once('.') {
            Some((kind, role)) => (kind, Some(role)),
            None => (name, None),
        };
        let kind = kind
            .parse::<EntityKind>()
            .map_err(|_| format!("capture @{name} names unknown kind `{kind}`"))?;
        let role = match role {
            None => None,
            Some("name") => Some(Role::Name),
            Some("type") => Some(Role::Type),
            Some("return") => Some(Role::Return),
            Some("ref") => Some(Role::Ref),
            Some(other) => return Err(format!("capture @{name} has unknown role `{other}`")),
        };
        Ok(Some(Self { kind, role }))
    }
}

/// A not-yet-nested entity.
#[derive(Debug)]
struct Candidate {
    kind: EntityKind,
    pattern_index: usize,
    span: Span,
    name: Option<String>,
    declared_type: Option<String>,
    return_type: Option<String>,
    refs: Vec<String>,
}

impl Candidate {
    fn into_entity(self, id: EntityId, parent: Option<EntityId>, children: Vec<Entity>) -> Entity {
        Entity {
            id,
            kind: self.kind,
            name: self.name.unwrap_or_default(),
            declared_type: self.declared_type,
            return_type: self.return_type,
            reference: if self.refs.is_empty() {
                None
            } else {
                Some(self.refs.join(", "))
            },
            parent,
            span: self.span,
            children,
        }
    }
}

struct Slot {
    candidate: Candidate,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Collapse runs of whitespace into single spaces.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Type text without its annotation punctuation (`: T`, `-> T`).
fn normalize_type(text: &str) -> Option<String> {
    let text = collapse_whitespace(text);
    let trimmed = text
        .trim_start_matches("->")
        .trim_start_matches(':')
        .trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Keywords that introduce or qualify a base in a heritage clause.
const HERITAGE_KEYWORDS: [&str; 6] = ["extends", "implements", "public", "protected", "private", "virtual"];

/// Reference text as a bare base list: `(Base, Mixin)`, `: public Base` and
/// `extends Base implements Shape` become `Base, Mixin`, `Base` and
/// `Base, Shape`.
fn normalize_ref(text: &str) -> Option<String> {
    let text = collapse_whitespace(text);
    let mut trimmed = text.trim_start_matches(':').trim();
    if let Some(inner) = trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        trimmed = inner.trim();
    }
    let listed = trimmed.replace(" implements ", ", ");
    let bases: Vec<String> = listed
        .split(',')
        .map(|item| {
            item.split(' ')
                .filter(|word| !HERITAGE_KEYWORDS.contains(word))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .map(|item| item.trim().to_string())
        .collect();
    let joined = bases.join(", ");
    (!joined.trim().is_empty()).then_some(joined)
}

/// Structurer backed by each profile's `structure` query.
pub struct QueryStructurer {
    cache: Arc<QueryCache>,
}

impl QueryStructurer {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Map every capture of the query to a label, checking kinds against the
    /// profile taxonomy.
    fn labels(
        &self,
        query: &Query,
        profile: &LanguageProfile,
        grammar: &str,
    ) -> Result<Vec<Option<CaptureLabel>>, StructureError> {
        query
            .capture_names()
            .iter()
            .map(|name| {
                let label = CaptureLabel::parse(name).map_err(|message| {
                    StructureError::QueryCompilation {
                        grammar: grammar.to_string(),
                        pattern: format!("@{name}"),
                        message,
                    }
                })?;
                if let Some(label) = label {
                    if !profile.taxonomy().contains(label.kind) {
                        return Err(StructureError::QueryCompilation {
                            grammar: grammar.to_string(),
                            pattern: format!("@{name}"),
                            message: format!(
                                "kind `{}` is not in the {} taxonomy",
                                label.kind,
                                profile.id()
                            ),
                        });
                    }
                }
                Ok(label)
            })
            .collect()
    }

    fn collect_candidates(
        &self,
        query: &Query,
        labels: &[Option<CaptureLabel>],
        parsed: &ParsedFile,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, parsed.root(), parsed.source.as_slice());

        while let Some(m) = matches.next() {
            let label_of = |index: u32| labels.get(index as usize).copied().flatten();

            let Some((kind, node)) = m.captures.iter().find_map(|c| {
                label_of(c.index)
                    .filter(|l| l.role.is_none())
                    .map(|l| (l.kind, c.node))
            }) else {
                continue;
            };

            let span = Span::from_node(node);
            if span.is_empty() {
                continue;
            }

            let mut candidate = Candidate {
                kind,
                pattern_index: m.pattern_index,
                span,
                name: None,
                declared_type: None,
                return_type: None,
                refs: Vec::new(),
            };

            for capture in m.captures {
                let Some(CaptureLabel { kind: label_kind, role: Some(role) }) = label_of(capture.index) else {
                    continue;
                };
                if label_kind != kind {
                    continue;
                }
                let text = parsed.node_text(capture.node);
                match role {
                    Role::Name => {
                        if candidate.name.is_none() {
                            candidate.name = Some(collapse_whitespace(text));
                        }
                    }
                    Role::Type => candidate.declared_type = normalize_type(text),
                    Role::Return => candidate.return_type = normalize_type(text),
                    Role::Ref => candidate.refs.extend(normalize_ref(text)),
                }
            }

            candidates.push(candidate);
        }

        candidates
    }
}

/// Order, deduplicate and nest candidates into an entity forest.
fn assemble(mut candidates: Vec<Candidate>) -> Vec<Entity> {
    candidates.sort_by(|a, b| {
        a.span
            .start_byte
            .cmp(&b.span.start_byte)
            .then(b.span.end_byte.cmp(&a.span.end_byte))
            .then(a.pattern_index.cmp(&b.pattern_index))
    });
    candidates.dedup_by(|later, kept| {
        later.span.start_byte == kept.span.start_byte && later.span.end_byte == kept.span.end_byte
    });

    let mut slots: Vec<Slot> = Vec::with_capacity(candidates.len());
    let mut stack: Vec<usize> = Vec::new();
    for candidate in candidates {
        while let Some(&top) = stack.last() {
            if slots[top].candidate.span.contains(&candidate.span) {
                break;
            }
            stack.pop();
        }
        let index = slots.len();
        let parent = stack.last().copied();
        if let Some(parent) = parent {
            slots[parent].children.push(index);
        }
        slots.push(Slot {
            candidate,
            parent,
            children: Vec::new(),
        });
        stack.push(index);
    }

    let roots: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.parent.is_none())
        .map(|(index, _)| index)
        .collect();

    // Children always come after their parent, so building back to front
    // has every child ready when its parent is assembled.
    let mut built: Vec<Option<Entity>> = (0..slots.len()).map(|_| None).collect();
    for (index, slot) in slots.into_iter().enumerate().rev() {
        let children = slot
            .children
            .iter()
            .filter_map(|child| built[*child].take())
            .collect();
        built[index] = Some(slot.candidate.into_entity(
            EntityId(index as u32),
            slot.parent.map(|p| EntityId(p as u32)),
            children,
        ));
    }

    roots
        .into_iter()
        .filter_map(|index| built[index].take())
        .collect()
}

impl Structurer for QueryStructurer {
    fn structure(
        &self,
        profile: &LanguageProfile,
        parsed: &ParsedFile,
    ) -> Result<Vec<Entity>, StructureError> {
        let grammar = profile.grammar(parsed.grammar.as_str()).ok_or_else(|| {
            StructureError::QueryCompilation {
                grammar: parsed.grammar.to_string(),
                pattern: QueryName::Structure.to_string(),
                message: format!("grammar is not part of the {} profile", profile.id()),
            }
        })?;

        let asset = profile.query(QueryName::Structure);
        let query = self.cache.get(asset.source(), grammar)?;
        let labels = self.labels(&query, profile, grammar.id.as_str())?;
        let candidates = self.collect_candidates(&query, &labels, parsed);
        let entities = assemble(candidates);

        debug!(
            path = %parsed.path,
            language = profile.id(),
            top_level = entities.len(),
            "structured file"
        );
        Ok(entities)
    }
}
