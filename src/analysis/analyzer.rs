//! Whole-tree orchestration: traversal, per-file structuring and aggregation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use globset::GlobSet;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ScanConfig};
use crate::error::{FileError, ProfileError, StructureError};
use crate::export;
use crate::learning;
use crate::profile::{self, ProfileResolver};
use crate::query::{CacheStats, QueryCache};
use crate::upload::{UploadReceipt, Uploader};

use super::parse::parse_valid;
use super::scan::{self, SourceFile};
use super::{
    CancelToken, CodeAnalysisResult, FileState, FileStructureResult, QueryStructurer,
    ScanCounters, Structurer,
};

/// Errors that abort a scan or prevent it from starting.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("cannot access scan root {path}: {reason}")]
    RootAccess { path: PathBuf, reason: String },

    #[error("language profiles are invalid: {0}")]
    Profiles(#[from] ProfileError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Scans directory trees and builds [`CodeAnalysisResult`]s.
///
/// Profiles and compiled queries are shared and survive config changes.
pub struct CodeAnalyzer {
    profiles: Arc<dyn ProfileResolver>,
    cache: Arc<QueryCache>,
    structurer: Arc<dyn Structurer>,
    config: ScanConfig,
    ignore: GlobSet,
}

impl CodeAnalyzer {
    /// Create an analyzer over the built-in profiles and the shared query cache.
    pub fn new(config: ScanConfig) -> Result<Self, AnalyzeError> {
        let profiles: Arc<dyn ProfileResolver> = profile::global()?;
        let cache = QueryCache::global();
        let structurer = Arc::new(QueryStructurer::new(Arc::clone(&cache)));
        Self::with_components(profiles, cache, structurer, config)
    }

    /// Create an analyzer with explicit collaborators.
    pub fn with_components(
        profiles: Arc<dyn ProfileResolver>,
        cache: Arc<QueryCache>,
        structurer: Arc<dyn Structurer>,
        config: ScanConfig,
    ) -> Result<Self, AnalyzeError> {
        let ignore = config.validate()?;
        Ok(Self {
            profiles,
            cache,
            structurer,
            config,
            ignore,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn profiles(&self) -> &Arc<dyn ProfileResolver> {
        &self.profiles
    }

    /// Replace scan options for later runs. The current options are kept if
    /// the new ones are invalid.
    pub fn update_config(&mut self, config: ScanConfig) -> Result<(), ConfigError> {
        let ignore = config.validate()?;
        self.config = config;
        self.ignore = ignore;
        debug!("scan configuration updated");
        Ok(())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Analyze every supported file under `root`.
    pub fn analyze_directory(&self, root: &Path) -> Result<CodeAnalysisResult, AnalyzeError> {
        self.analyze_directory_with_cancel(root, &CancelToken::new())
    }

    /// Analyze `root`, starting no new files once `cancel` is set.
    pub fn analyze_directory_with_cancel(
        &self,
        root: &Path,
        cancel: &CancelToken,
    ) -> Result<CodeAnalysisResult, AnalyzeError> {
        let start = Instant::now();
        let files = scan::collect_files(root, &self.config, &self.ignore)?;
        info!(root = %root.display(), files = files.len(), "starting scan");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .build()?;

        let outcomes: Vec<(FileStructureResult, bool)> = pool.install(|| {
            files
                .par_iter()
                .filter_map(|file| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    Some(self.process(file))
                })
                .collect()
        });

        let mut counters = ScanCounters::default();
        let mut results = Vec::with_capacity(outcomes.len());
        for (result, parsed) in outcomes {
            counters.record(&result, parsed);
            results.push(result);
        }
        results.sort_by(|a, b| a.path.cmp(&b.path));

        let cancelled = cancel.is_cancelled();
        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            files = counters.files_scanned,
            failed = counters.files_failed,
            unsupported = counters.files_unsupported,
            entities = counters.entities,
            elapsed_ms,
            cancelled,
            "scan finished"
        );

        Ok(CodeAnalysisResult {
            root: root.to_string_lossy().to_string(),
            files: results,
            counters,
            elapsed_ms,
            cancelled,
        })
    }

    /// Structure a single file. The path is reported as given, so
    /// directory-based test-file rules still apply.
    pub fn structure_file(&self, path: &Path) -> FileStructureResult {
        let relative = path
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");
        let file = SourceFile {
            path: path.to_path_buf(),
            relative,
        };
        self.process(&file).0
    }

    /// Run one file through resolve, read, parse and structure.
    ///
    /// Returns the result and whether the grammar accepted the source.
    fn process(&self, file: &SourceFile) -> (FileStructureResult, bool) {
        let rel_path = Path::new(&file.relative);
        let extension = rel_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();

        let Some(profile) = (!extension.is_empty())
            .then(|| self.profiles.resolve(&extension))
            .flatten()
        else {
            let mut result = FileStructureResult::new(file.relative.clone(), None);
            result.fail(FileError::from(StructureError::UnsupportedLanguage {
                path: file.relative.clone(),
                extension,
            }));
            debug!(path = %file.relative, "no profile for file");
            return (result, false);
        };

        let mut result = FileStructureResult::new(file.relative.clone(), Some(profile.id()));
        result.is_test = profile.is_test_file(rel_path);

        let source = match fs::read(&file.path) {
            Ok(source) => source,
            Err(source) => {
                let err = StructureError::Io {
                    path: file.relative.clone(),
                    source,
                };
                warn!(path = %file.relative, error = %err, "failed to read file");
                result.fail(FileError::from(err));
                return (result, false);
            }
        };

        let parsed = match parse_valid(&profile, rel_path, source) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(path = %file.relative, error = %err, "file rejected by grammar");
                result.fail(FileError::from(err));
                return (result, false);
            }
        };
        result.state = FileState::Parsed;

        match self.structurer.structure(&profile, &parsed) {
            Ok(entities) => {
                result.entities = entities;
                result.state = FileState::Structured;
            }
            Err(err) => {
                warn!(
                    path = %file.relative,
                    language = profile.id(),
                    error = %err,
                    "structuring failed"
                );
                result.fail(FileError::from(err));
                return (result, true);
            }
        }

        result.state = FileState::Done;
        (result, true)
    }

    /// Write the result as JSON to the configured output path.
    pub fn export_result(&self, result: &CodeAnalysisResult) -> anyhow::Result<PathBuf> {
        export::write_json(result, &self.config.output_path)?;
        Ok(self.config.output_path.clone())
    }

    /// Upload the flattened result when uploading is enabled.
    ///
    /// Failures are logged and reported as `None`; they never fail the scan.
    pub fn upload_result(&self, result: &CodeAnalysisResult) -> Option<UploadReceipt> {
        if !self.config.upload {
            return None;
        }
        let url = self.config.upload_url.as_deref()?;
        let outcome = Uploader::new(url, self.config.upload_timeout_ms)
            .and_then(|uploader| uploader.upload_blocking(result));
        match outcome {
            Ok(receipt) => {
                info!(url, id = receipt.id.as_deref().unwrap_or(""), "uploaded analysis");
                Some(receipt)
            }
            Err(err) => {
                warn!(url, error = %err, "upload failed");
                None
            }
        }
    }

    /// Write Markdown outlines of the result into `out_dir`.
    pub fn generate_learning_materials(
        &self,
        result: &CodeAnalysisResult,
        out_dir: &Path,
    ) -> anyhow::Result<Vec<PathBuf>> {
        learning::generate_learning_materials(result, out_dir)
    }
}
