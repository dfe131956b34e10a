//! Language profiles: declarative per-language descriptors.
//!
//! A profile bundles everything the structuring engine needs to know about
//! one language:
//! - identity (language ids and file extensions)
//! - grammar handles, selectable by grammar id or extension
//! - a test-file predicate
//! - the seven named query assets
//! - the kind taxonomy and built-in type names
//! - node kinds whose selection widens to the enclosing parent
//!
//! Profiles are immutable once built and shared through the
//! [`ProfileRegistry`].
//!
//! # Adding a New Language
//!
//! Add a module under `src/profile/languages/` exposing a `ProfileDef`, put
//! its queries under `queries/<id>/`, and list it in `languages::BUILTIN`.

pub mod assets;
pub mod languages;
pub mod registry;
mod taxonomy;

use std::fmt;
use std::path::Path;

pub use assets::{QueryAsset, QueryName, QuerySet};
pub use registry::{global, ProfileRegistry, ProfileResolver};
pub use taxonomy::{EntityKind, KindGroup, Taxonomy, FUNCTIONS, MODULES};

use crate::error::ProfileError;

/// Identity of a grammar handle.
///
/// Built-in grammar ids are unique across profiles. The query cache keys
/// compiled queries by this id together with the handle itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrammarId(pub &'static str);

impl GrammarId {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for GrammarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A tree-sitter grammar together with its id.
#[derive(Clone)]
pub struct Grammar {
    pub id: GrammarId,
    pub language: tree_sitter::Language,
}

impl Grammar {
    pub fn new(id: GrammarId, language: tree_sitter::Language) -> Self {
        Self { id, language }
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar").field("id", &self.id).finish()
    }
}

/// Decides whether a path is a test file.
pub type TestFilePredicate = fn(&Path) -> bool;

/// Static description of a profile, turned into a [`LanguageProfile`] by
/// [`LanguageProfile::from_def`].
pub struct ProfileDef {
    pub id: &'static str,
    pub aliases: &'static [&'static str],
    pub extensions: &'static [&'static str],
    /// Grammar handles. The first one is the default.
    pub grammars: fn() -> Vec<Grammar>,
    /// Extensions that select a non-default grammar.
    pub extension_grammars: &'static [(&'static str, GrammarId)],
    pub is_test_file: TestFilePredicate,
    pub queries: &'static [(QueryName, &'static str)],
    pub taxonomy: Taxonomy,
    pub builtin_types: &'static phf::Set<&'static str>,
    pub auto_select_kinds: &'static [&'static str],
}

/// A fully built, validated language profile.
pub struct LanguageProfile {
    id: &'static str,
    aliases: &'static [&'static str],
    extensions: &'static [&'static str],
    grammars: Vec<Grammar>,
    extension_grammars: &'static [(&'static str, GrammarId)],
    is_test_file: TestFilePredicate,
    queries: QuerySet,
    taxonomy: Taxonomy,
    builtin_types: &'static phf::Set<&'static str>,
    auto_select_kinds: &'static [&'static str],
}

impl LanguageProfile {
    /// Build a profile, loading and checking its query assets.
    pub fn from_def(def: &ProfileDef) -> Result<Self, ProfileError> {
        let empty = |what: &'static str| ProfileError::Empty {
            language: def.id.to_string(),
            what,
        };

        if def.extensions.is_empty() {
            return Err(empty("extensions"));
        }
        if def.taxonomy.is_empty() {
            return Err(empty("taxonomy"));
        }

        let grammars = (def.grammars)();
        if grammars.is_empty() {
            return Err(empty("grammars"));
        }
        for (ext, grammar) in def.extension_grammars {
            if !grammars.iter().any(|g| g.id == *grammar) {
                return Err(ProfileError::Asset {
                    language: def.id.to_string(),
                    query: "grammar".to_string(),
                    message: format!("extension {ext} names unknown grammar {grammar}"),
                });
            }
        }

        let queries = QuerySet::from_sources(def.id, def.queries)?;

        Ok(Self {
            id: def.id,
            aliases: def.aliases,
            extensions: def.extensions,
            grammars,
            extension_grammars: def.extension_grammars,
            is_test_file: def.is_test_file,
            queries,
            taxonomy: def.taxonomy.clone(),
            builtin_types: def.builtin_types,
            auto_select_kinds: def.auto_select_kinds,
        })
    }

    /// The primary language id (e.g., "rust").
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Secondary ids that also resolve to this profile.
    pub fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    /// File extensions (without dot).
    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    pub fn grammars(&self) -> &[Grammar] {
        &self.grammars
    }

    /// The default grammar.
    pub fn default_grammar(&self) -> &Grammar {
        // from_def rejects profiles without grammars
        &self.grammars[0]
    }

    /// Look up a grammar by grammar id, extension, or language id.
    pub fn grammar(&self, key: &str) -> Option<&Grammar> {
        let key = key.trim_start_matches('.');
        if let Some(g) = self.grammars.iter().find(|g| g.id.as_str() == key) {
            return Some(g);
        }
        if let Some((_, id)) = self
            .extension_grammars
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(key))
        {
            return self.grammars.iter().find(|g| g.id == *id);
        }
        if self.extensions.iter().any(|e| e.eq_ignore_ascii_case(key))
            || self.id == key
            || self.aliases.iter().any(|a| *a == key)
        {
            return Some(self.default_grammar());
        }
        None
    }

    /// The grammar used for a file, chosen by its extension.
    pub fn grammar_for_path(&self, path: &Path) -> &Grammar {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.grammar(ext))
            .unwrap_or_else(|| self.default_grammar())
    }

    pub fn is_test_file(&self, path: &Path) -> bool {
        (self.is_test_file)(path)
    }

    pub fn queries(&self) -> &QuerySet {
        &self.queries
    }

    pub fn query(&self, name: QueryName) -> &QueryAsset {
        self.queries.get(name)
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Check if a name is one of the language's built-in types.
    pub fn is_builtin_type(&self, name: &str) -> bool {
        self.builtin_types.contains(name)
    }

    pub fn builtin_types(&self) -> impl Iterator<Item = &'static str> {
        self.builtin_types.iter().copied()
    }

    /// Check if selecting a node of this kind should widen to its parent.
    pub fn auto_selects_parent(&self, node_kind: &str) -> bool {
        self.auto_select_kinds.iter().any(|k| *k == node_kind)
    }
}

impl fmt::Debug for LanguageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageProfile")
            .field("id", &self.id)
            .field("extensions", &self.extensions)
            .field("grammars", &self.grammars)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_typescript_selects_tsx_grammar_by_extension() {
        let profile = LanguageProfile::from_def(&languages::typescript::PROFILE).unwrap();
        assert_eq!(profile.grammar("ts").map(|g| g.id), Some(GrammarId("typescript")));
        assert_eq!(profile.grammar("tsx").map(|g| g.id), Some(GrammarId("tsx")));
        assert_eq!(
            profile.grammar_for_path(&PathBuf::from("src/App.tsx")).id,
            GrammarId("tsx")
        );
        assert_eq!(profile.grammar("java").map(|g| g.id), None);
    }

    #[test]
    fn test_builtin_and_auto_select() {
        let profile = LanguageProfile::from_def(&languages::rust_lang::PROFILE).unwrap();
        assert!(profile.is_builtin_type("u32"));
        assert!(!profile.is_builtin_type("Point"));
        assert!(profile.auto_selects_parent("field_identifier"));
        assert!(!profile.auto_selects_parent("struct_item"));
    }
}
