//! Read-only navigation over a parsed file using the advisory queries.
//!
//! None of these lookups change entity identity; they serve editor-style
//! consumers (hover, scope breadcrumbs, doc linking, selection widening).

use serde::Serialize;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, QueryCursor};

use crate::analysis::{collapse_whitespace, ParsedFile, Span};
use crate::error::StructureError;
use crate::profile::{LanguageProfile, QueryName};
use crate::query::QueryCache;

/// The innermost hoverable node at an offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverTarget {
    pub text: String,
    pub node_kind: String,
    pub span: Span,
    /// Whether `text` names a built-in type of the language.
    pub is_builtin: bool,
}

/// A named construct found by the `class` or `method` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedSpan {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub params: String,
    pub return_type: Option<String>,
    pub span: Span,
}

/// Documentation comments attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocComment {
    /// Comment text, one source comment per line.
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionTarget {
    pub node_kind: String,
    pub span: Span,
    /// Set when the node at the offset was widened to an ancestor.
    pub widened: bool,
}

type Captures<'a> = Vec<(String, Node<'a>)>;

/// Navigation helpers bound to one parsed file.
pub struct Navigator<'a> {
    profile: &'a LanguageProfile,
    parsed: &'a ParsedFile,
    cache: &'a QueryCache,
}

impl<'a> Navigator<'a> {
    pub fn new(profile: &'a LanguageProfile, parsed: &'a ParsedFile, cache: &'a QueryCache) -> Self {
        Self {
            profile,
            parsed,
            cache,
        }
    }

    /// Run one of the profile's queries and return the captures of each match.
    fn run(&self, name: QueryName) -> Result<Vec<Captures<'a>>, StructureError> {
        let grammar = self
            .profile
            .grammar(self.parsed.grammar.as_str())
            .ok_or_else(|| StructureError::QueryCompilation {
                grammar: self.parsed.grammar.to_string(),
                pattern: name.to_string(),
                message: format!("grammar is not part of the {} profile", self.profile.id()),
            })?;
        let query = self.cache.get(self.profile.query(name).source(), grammar)?;
        let names = query.capture_names();

        let mut out = Vec::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, self.parsed.root(), self.parsed.source.as_slice());
        while let Some(m) = matches.next() {
            let captures = m
                .captures
                .iter()
                .filter_map(|c| names.get(c.index as usize).map(|n| (n.to_string(), c.node)))
                .collect();
            out.push(captures);
        }
        Ok(out)
    }

    /// Nodes captured under `label` by the named query, in match order.
    fn captured(&self, name: QueryName, label: &str) -> Result<Vec<Node<'a>>, StructureError> {
        Ok(self
            .run(name)?
            .into_iter()
            .flatten()
            .filter(|(l, _)| l == label)
            .map(|(_, node)| node)
            .collect())
    }

    fn text(&self, node: Node<'a>) -> String {
        collapse_whitespace(self.parsed.node_text(node))
    }

    /// Scopes containing `offset`, innermost first.
    pub fn enclosing_scopes(&self, offset: usize) -> Result<Vec<Span>, StructureError> {
        let mut spans: Vec<Span> = self
            .captured(QueryName::Scope, "scope")?
            .into_iter()
            .map(Span::from_node)
            .filter(|s| s.contains_offset(offset))
            .collect();
        spans.sort_by_key(|s| (s.len(), std::cmp::Reverse(s.start_byte)));
        spans.dedup();
        Ok(spans)
    }

    /// The innermost hoverable node at `offset`.
    pub fn hover_target(&self, offset: usize) -> Result<Option<HoverTarget>, StructureError> {
        let node = self
            .captured(QueryName::Hoverable, "hover")?
            .into_iter()
            .filter(|n| Span::from_node(*n).contains_offset(offset))
            .min_by_key(|n| n.byte_range().len());

        Ok(node.map(|node| {
            let text = self.text(node);
            HoverTarget {
                is_builtin: self.profile.is_builtin_type(&text),
                node_kind: node.kind().to_string(),
                span: Span::from_node(node),
                text,
            }
        }))
    }

    /// Doc comments directly above `span`.
    ///
    /// Comments may be separated from each other and from the declaration by
    /// whitespace and attribute or decorator lines only.
    pub fn doc_comment_for(&self, span: &Span) -> Result<Option<DocComment>, StructureError> {
        let mut docs = self.captured(QueryName::DocComment, "doc")?;
        docs.sort_by_key(|n| n.start_byte());
        docs.dedup_by_key(|n| n.start_byte());

        let source = self.parsed.source.as_slice();
        let mut boundary = span.start_byte;
        let mut attached: Vec<Node<'a>> = Vec::new();
        for node in docs.iter().rev() {
            if node.end_byte() > boundary {
                continue;
            }
            let Some(gap) = source.get(node.end_byte()..boundary) else {
                break;
            };
            if !is_attachable_gap(&String::from_utf8_lossy(gap)) {
                break;
            }
            attached.push(*node);
            boundary = node.start_byte();
        }

        let (Some(first), Some(last)) = (attached.last(), attached.first()) else {
            return Ok(None);
        };
        let text = attached
            .iter()
            .rev()
            .map(|n| String::from_utf8_lossy(&source[n.byte_range()]).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let first = Span::from_node(*first);
        let last = Span::from_node(*last);
        Ok(Some(DocComment {
            text,
            span: Span {
                start_byte: first.start_byte,
                start_line: first.start_line,
                start_col: first.start_col,
                end_byte: last.end_byte,
                end_line: last.end_line,
                end_col: last.end_col,
            },
        }))
    }

    fn named(&self, name: QueryName, label: &str) -> Result<Vec<NamedSpan>, StructureError> {
        let mut out = Vec::new();
        for captures in self.run(name)? {
            let node = captures.iter().find(|(l, _)| l == label).map(|(_, n)| *n);
            let title = captures.iter().find(|(l, _)| l == "name").map(|(_, n)| *n);
            if let (Some(node), Some(title)) = (node, title) {
                out.push(NamedSpan {
                    name: self.text(title),
                    span: Span::from_node(node),
                });
            }
        }
        out.sort_by_key(|n| n.span.start_byte);
        out.dedup_by_key(|n| n.span.start_byte);
        Ok(out)
    }

    pub fn classes(&self) -> Result<Vec<NamedSpan>, StructureError> {
        self.named(QueryName::Class, "class")
    }

    pub fn methods(&self) -> Result<Vec<NamedSpan>, StructureError> {
        self.named(QueryName::Method, "method")
    }

    pub fn method_signatures(&self) -> Result<Vec<MethodSignature>, StructureError> {
        let mut out = Vec::new();
        for captures in self.run(QueryName::MethodSignature)? {
            let find = |label: &str| captures.iter().find(|(l, _)| l == label).map(|(_, n)| *n);
            let (Some(node), Some(name)) = (find("signature"), find("name")) else {
                continue;
            };
            out.push(MethodSignature {
                name: self.text(name),
                params: find("params").map(|n| self.text(n)).unwrap_or_default(),
                return_type: find("return").map(|n| {
                    self.text(n)
                        .trim_start_matches("->")
                        .trim_start_matches(':')
                        .trim()
                        .to_string()
                }),
                span: Span::from_node(node),
            });
        }
        out.sort_by_key(|s| s.span.start_byte);
        out.dedup_by_key(|s| s.span.start_byte);
        Ok(out)
    }

    /// The named node at `offset`, widened through auto-select kinds.
    pub fn selection_target(&self, offset: usize) -> Option<SelectionTarget> {
        let mut node = self
            .parsed
            .root()
            .named_descendant_for_byte_range(offset, offset)?;
        let mut widened = false;
        while self.profile.auto_selects_parent(node.kind()) {
            match node.parent() {
                Some(parent) => {
                    node = parent;
                    widened = true;
                }
                None => break,
            }
        }
        Some(SelectionTarget {
            node_kind: node.kind().to_string(),
            span: Span::from_node(node),
            widened,
        })
    }
}

/// Whitespace, plus attribute (`#[..]`) or decorator (`@..`) lines.
fn is_attachable_gap(gap: &str) -> bool {
    gap.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with("#[") || line.starts_with('@')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parse_valid;
    use crate::profile::languages::rust_lang;
    use std::path::Path;

    const SOURCE: &str = r#"/// A point in the plane.
#[derive(Debug)]
struct Point {
    x: f64,
    y: f64,
}

trait Shape {
    fn area(&self) -> f64;
}

impl Shape for Point {
    fn area(&self) -> f64 {
        self.x * self.y
    }
}
"#;

    fn fixture() -> (LanguageProfile, ParsedFile, QueryCache) {
        let profile = LanguageProfile::from_def(&rust_lang::PROFILE).unwrap();
        let parsed = parse_valid(&profile, Path::new("point.rs"), SOURCE.as_bytes().to_vec()).unwrap();
        (profile, parsed, QueryCache::new())
    }

    #[test]
    fn test_gap_rules() {
        assert!(is_attachable_gap("\n"));
        assert!(is_attachable_gap("\n#[derive(Debug)]\n"));
        assert!(is_attachable_gap("\n  @Override\n  "));
        assert!(!is_attachable_gap("\nlet x = 1;\n"));
    }

    #[test]
    fn test_scopes_innermost_first() {
        let (profile, parsed, cache) = fixture();
        let nav = Navigator::new(&profile, &parsed, &cache);
        let offset = SOURCE.find("self.x").unwrap();
        let scopes = nav.enclosing_scopes(offset).unwrap();
        assert!(scopes.len() >= 3);
        assert!(scopes.windows(2).all(|w| w[1].contains(&w[0])));
    }

    #[test]
    fn test_hover_flags_builtin_types() {
        let (profile, parsed, cache) = fixture();
        let nav = Navigator::new(&profile, &parsed, &cache);
        let hover = nav.hover_target(SOURCE.find("f64").unwrap()).unwrap().unwrap();
        assert_eq!(hover.text, "f64");
        assert!(hover.is_builtin);

        let hover = nav.hover_target(SOURCE.find("Point").unwrap()).unwrap().unwrap();
        assert_eq!(hover.text, "Point");
        assert!(!hover.is_builtin);
    }

    #[test]
    fn test_doc_comment_skips_attributes() {
        let (profile, parsed, cache) = fixture();
        let nav = Navigator::new(&profile, &parsed, &cache);
        let start = SOURCE.find("struct Point").unwrap();
        let span = Span {
            start_byte: start,
            end_byte: start + 12,
            start_line: 3,
            start_col: 1,
            end_line: 3,
            end_col: 13,
        };
        let doc = nav.doc_comment_for(&span).unwrap().unwrap();
        assert!(doc.text.contains("A point in the plane."));
        assert_eq!(doc.span.start_line, 1);
    }

    #[test]
    fn test_doc_comment_in_non_utf8_source() {
        let mut source = b"/// Caf".to_vec();
        source.push(0xe9);
        source.extend_from_slice(b" menu.\nstruct Menu;\n// \xff\n");
        let profile = LanguageProfile::from_def(&rust_lang::PROFILE).unwrap();
        let parsed = parse_valid(&profile, Path::new("menu.rs"), source).unwrap();
        assert_eq!(parsed.source_str(), "");

        let cache = QueryCache::new();
        let nav = Navigator::new(&profile, &parsed, &cache);
        let start = parsed.source.windows(6).position(|w| w == b"struct").unwrap();
        let span = Span {
            start_byte: start,
            end_byte: start + 12,
            start_line: 2,
            start_col: 1,
            end_line: 2,
            end_col: 13,
        };
        let doc = nav.doc_comment_for(&span).unwrap().unwrap();
        assert!(doc.text.starts_with("/// Caf"));
        assert!(doc.text.ends_with("menu."));
        assert_eq!(doc.span.start_line, 1);
    }

    #[test]
    fn test_classes_methods_and_signatures() {
        let (profile, parsed, cache) = fixture();
        let nav = Navigator::new(&profile, &parsed, &cache);

        let classes: Vec<_> = nav.classes().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(classes, vec!["Point", "Shape"]);

        let methods = nav.methods().unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "area");

        let signatures = nav.method_signatures().unwrap();
        assert_eq!(signatures.len(), 2);
        assert!(signatures.iter().all(|s| s.return_type.as_deref() == Some("f64")));
        assert_eq!(signatures[0].params, "(&self)");
    }

    #[test]
    fn test_selection_widens_identifier() {
        let (profile, parsed, cache) = fixture();
        let nav = Navigator::new(&profile, &parsed, &cache);
        let target = nav.selection_target(SOURCE.find("Shape {").unwrap() + 1).unwrap();
        assert!(target.widened);
        assert_eq!(target.node_kind, "trait_item");
    }
}
