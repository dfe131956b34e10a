//! Directory traversal for a scan.

use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanConfig;

use super::AnalyzeError;

/// A file selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (or root-joined) path used for reading.
    pub path: PathBuf,
    /// Path relative to the scan root, `/`-separated.
    pub relative: String,
}

/// Root-relative path with `/` separators.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Check that the root can be traversed at all.
pub fn check_root(root: &Path) -> Result<(), AnalyzeError> {
    let metadata = fs::metadata(root).map_err(|e| AnalyzeError::RootAccess {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(AnalyzeError::RootAccess {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    fs::read_dir(root).map_err(|e| AnalyzeError::RootAccess {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Collect candidate files under `root`, sorted by relative path.
///
/// Excluded and hidden directories are pruned, ignore globs are matched
/// against root-relative paths, and files over `max_file_size` are left out.
/// Unreadable entries below the root are logged and skipped.
pub fn collect_files(
    root: &Path,
    config: &ScanConfig,
    ignore: &GlobSet,
) -> Result<Vec<SourceFile>, AnalyzeError> {
    check_root(root)?;

    let walker = WalkDir::new(root)
        .follow_links(config.follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            if !config.include_hidden && is_hidden(e) {
                return false;
            }
            if e.file_type().is_dir() {
                let name = e.file_name().to_string_lossy();
                if config.is_excluded_dir(&name) {
                    return false;
                }
            }
            !ignore.is_match(relative_path(root, e.path()))
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if size > config.max_file_size {
            debug!(path = %entry.path().display(), size, "skipping oversized file");
            continue;
        }

        files.push(SourceFile {
            relative: relative_path(root, entry.path()),
            path: entry.into_path(),
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}
