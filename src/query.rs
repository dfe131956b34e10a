//! Compiled query cache.
//!
//! Compiling a tree-sitter query is expensive, and every file of a language
//! evaluates the same small set of queries. The cache compiles each
//! (grammar, pattern) pair lazily on first request and hands out the shared
//! compiled form afterwards. Entries are keyed by grammar id and handle, so
//! the same pattern text compiled for two grammars yields two distinct
//! objects, even when an override profile reuses a grammar id.
//!
//! The key space is bounded by the profiles' fixed query sets, so entries
//! are never evicted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{debug, warn};
use tree_sitter::{Language, Query};

use crate::error::StructureError;
use crate::profile::{Grammar, GrammarId};

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Successful compilations, including ones discarded after losing a race.
    pub compiles: u64,
}

/// Grammar identity: a compiled query is only valid for the handle it was
/// compiled against.
type GrammarKey = (GrammarId, Language);

/// Process-wide cache of compiled queries.
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<GrammarKey, HashMap<String, Arc<Query>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    compiles: AtomicU64,
}

static GLOBAL: Lazy<Arc<QueryCache>> = Lazy::new(|| Arc::new(QueryCache::new()));

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared cache used by the default analyzer.
    pub fn global() -> Arc<QueryCache> {
        Arc::clone(&GLOBAL)
    }

    /// Get the compiled form of `pattern` for `grammar`, compiling on a miss.
    ///
    /// Compilation runs outside the lock. When two threads miss on the same
    /// key, the first insertion is kept and the other result is dropped.
    pub fn get(&self, pattern: &str, grammar: &Grammar) -> Result<Arc<Query>, StructureError> {
        let key = (grammar.id, grammar.language.clone());
        if let Some(query) = self.lookup(pattern, &key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(query);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let compiled = Query::new(&grammar.language, pattern).map_err(|e| {
            warn!(grammar = %grammar.id, error = %e, "query failed to compile");
            StructureError::QueryCompilation {
                grammar: grammar.id.to_string(),
                pattern: pattern.to_string(),
                message: e.to_string(),
            }
        })?;
        self.compiles.fetch_add(1, Ordering::Relaxed);
        debug!(
            grammar = %grammar.id,
            patterns = compiled.pattern_count(),
            "compiled query"
        );

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let stored = entries
            .entry(key)
            .or_default()
            .entry(pattern.to_string())
            .or_insert_with(|| Arc::new(compiled));
        Ok(Arc::clone(stored))
    }

    fn lookup(&self, pattern: &str, key: &GrammarKey) -> Option<Arc<Query>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key)?.get(pattern).cloned()
    }

    /// Number of compiled queries held.
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            compiles: self.compiles.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn rust() -> Grammar {
        Grammar::new(GrammarId("rust"), tree_sitter_rust::LANGUAGE.into())
    }

    fn go() -> Grammar {
        Grammar::new(GrammarId("go"), tree_sitter_go::LANGUAGE.into())
    }

    #[test]
    fn test_compiles_lazily_once() {
        let cache = QueryCache::new();
        assert!(cache.is_empty());

        let first = cache.get("(identifier) @id", &rust()).unwrap();
        let second = cache.get("(identifier) @id", &rust()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.compiles, 1);
    }

    #[test]
    fn test_same_pattern_different_grammar_is_distinct() {
        let cache = QueryCache::new();
        let in_rust = cache.get("(identifier) @id", &rust()).unwrap();
        let in_go = cache.get("(identifier) @id", &go()).unwrap();

        assert!(!Arc::ptr_eq(&in_rust, &in_go));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_reused_grammar_id_with_other_handle_is_distinct() {
        let cache = QueryCache::new();
        let original = cache.get("(identifier) @id", &rust()).unwrap();
        let replaced = Grammar::new(GrammarId("rust"), tree_sitter_go::LANGUAGE.into());
        let overridden = cache.get("(identifier) @id", &replaced).unwrap();

        assert!(!Arc::ptr_eq(&original, &overridden));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().compiles, 2);

        let again = cache.get("(identifier) @id", &rust()).unwrap();
        assert!(Arc::ptr_eq(&original, &again));
    }

    #[test]
    fn test_malformed_pattern_reports_grammar() {
        let cache = QueryCache::new();
        let err = cache.get("(struct_item) @s", &go()).unwrap_err();
        match err {
            StructureError::QueryCompilation { grammar, pattern, .. } => {
                assert_eq!(grammar, "go");
                assert_eq!(pattern, "(struct_item) @s");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_misses_store_one_entry() {
        let cache = Arc::new(QueryCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get("(function_item) @f", &rust()).unwrap())
            })
            .collect();
        let queries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(cache.len(), 1);
        let stored = cache.get("(function_item) @f", &rust()).unwrap();
        assert!(queries.iter().all(|q| Arc::ptr_eq(q, &stored)));
    }
}
