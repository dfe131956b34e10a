//! Whole-tree analysis result.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

use super::FileStructureResult;

/// Aggregate counters for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCounters {
    /// Files attempted (every file with a result entry).
    pub files_scanned: usize,
    /// Files whose source was accepted by the grammar.
    pub files_parsed: usize,
    /// Files that failed to read, parse or structure.
    pub files_failed: usize,
    /// Files with no matching language profile.
    pub files_unsupported: usize,
    pub test_files: usize,
    /// Entities across all files, nested ones included.
    pub entities: usize,
    /// Files per language id.
    pub per_language: BTreeMap<String, usize>,
}

impl ScanCounters {
    /// Fold one file result into the counters.
    pub fn record(&mut self, file: &FileStructureResult, parsed: bool) {
        self.files_scanned += 1;
        if parsed {
            self.files_parsed += 1;
        }
        if file.is_failed() {
            let unsupported = file
                .errors
                .iter()
                .any(|e| e.kind == ErrorKind::UnsupportedLanguage);
            if unsupported {
                self.files_unsupported += 1;
            } else {
                self.files_failed += 1;
            }
        }
        if file.is_test {
            self.test_files += 1;
        }
        self.entities += file.entity_count();
        if let Some(language) = &file.language {
            *self.per_language.entry(language.clone()).or_insert(0) += 1;
        }
    }
}

/// Result of analyzing one directory tree.
///
/// `files` is sorted by root-relative path, so two scans of an unchanged tree
/// compare equal apart from `elapsed_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAnalysisResult {
    pub root: String,
    pub files: Vec<FileStructureResult>,
    pub counters: ScanCounters,
    pub elapsed_ms: u64,
    /// Set when the scan was cancelled; `files` then holds only the files
    /// that were attempted.
    #[serde(default)]
    pub cancelled: bool,
}

impl CodeAnalysisResult {
    pub fn file(&self, path: &str) -> Option<&FileStructureResult> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn failed_files(&self) -> impl Iterator<Item = &FileStructureResult> {
        self.files.iter().filter(|f| f.is_failed())
    }

    /// Files grouped by language id; unsupported files are left out.
    pub fn files_by_language(&self) -> BTreeMap<&str, Vec<&FileStructureResult>> {
        let mut grouped: BTreeMap<&str, Vec<&FileStructureResult>> = BTreeMap::new();
        for file in &self.files {
            if let Some(language) = file.language.as_deref() {
                grouped.entry(language).or_default().push(file);
            }
        }
        grouped
    }
}

/// Cooperative cancellation flag shared with a running scan.
///
/// Once cancelled, the analyzer starts no new files; files already in
/// progress run to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
