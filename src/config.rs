//! Scan configuration.
//!
//! A flat set of named options read from YAML. Every option has a default
//! and unknown keys are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Config file names looked up in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["codestruct.yaml", ".codestruct.yaml"];

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid ignore glob {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("upload is enabled but no upload_url is configured")]
    MissingUploadUrl,
}

/// Options for one scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Glob patterns (root-relative) for paths to skip, e.g. `**/generated/**`.
    #[serde(default)]
    pub ignore_globs: Vec<String>,
    /// Where the JSON result is written.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Whether to POST the flattened result to `upload_url`.
    #[serde(default)]
    pub upload: bool,
    #[serde(default)]
    pub upload_url: Option<String>,
    /// Directory names pruned anywhere in the tree.
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
    /// Worker threads; 0 uses the rayon default.
    #[serde(default)]
    pub max_workers: usize,
    /// Files larger than this many bytes are skipped.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default)]
    pub follow_links: bool,
    #[serde(default = "default_upload_timeout_ms")]
    pub upload_timeout_ms: u64,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("codestruct-analysis.json")
}

fn default_excluded_dirs() -> Vec<String> {
    [
        ".git",
        "node_modules",
        "target",
        "vendor",
        "dist",
        "build",
        "__pycache__",
        ".venv",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_file_size() -> u64 {
    1024 * 1024
}

fn default_upload_timeout_ms() -> u64 {
    30_000
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore_globs: Vec::new(),
            output_path: default_output_path(),
            upload: false,
            upload_url: None,
            excluded_dirs: default_excluded_dirs(),
            max_workers: 0,
            max_file_size: default_max_file_size(),
            include_hidden: false,
            follow_links: false,
            upload_timeout_ms: default_upload_timeout_ms(),
        }
    }
}

impl ScanConfig {
    /// Parse a config from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a config from YAML text. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load configuration with discovery.
    ///
    /// Order: `explicit`, then [`DEFAULT_CONFIG_NAMES`] in `cwd`, then
    /// `config.yaml` in the user config directory, then defaults. Returns the
    /// file that was used, if any.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        let candidates = DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| cwd.join(name))
            .chain(user_config_path());
        for path in candidates {
            if path.is_file() {
                debug!(path = %path.display(), "using discovered config");
                return Ok((Self::from_file(&path)?, Some(path)));
            }
        }

        Ok((Self::default(), None))
    }

    /// Check option consistency and compile the ignore globs.
    pub fn validate(&self) -> Result<GlobSet, ConfigError> {
        if self.upload && self.upload_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(ConfigError::MissingUploadUrl);
        }
        self.ignore_set()
    }

    /// Compile `ignore_globs` into a matcher.
    pub fn ignore_set(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.ignore_globs {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| ConfigError::InvalidGlob {
            pattern: self.ignore_globs.join(", "),
            source,
        })
    }

    /// Check if a directory name is excluded by default rules.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }
}

/// `<user config dir>/config.yaml` for this tool, when a home is known.
fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "codestruct").map(|dirs| dirs.config_dir().join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.output_path, PathBuf::from("codestruct-analysis.json"));
        assert!(!config.upload);
        assert!(config.is_excluded_dir("node_modules"));
        assert!(config.is_excluded_dir(".git"));
        assert_eq!(config.max_file_size, 1024 * 1024);
        assert_eq!(config.upload_timeout_ms, 30_000);
    }

    #[test]
    fn test_parse_partial_yaml_ignores_unknown_keys() {
        let yaml = r#"
ignore_globs:
  - "**/generated/**"
upload: true
upload_url: "https://example.test/api/analysis"
telemetry: off
"#;
        let config = ScanConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.ignore_globs, vec!["**/generated/**"]);
        assert!(config.upload);
        assert_eq!(config.excluded_dirs, default_excluded_dirs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ScanConfig::from_yaml("  \n").unwrap(), ScanConfig::default());
    }

    #[test]
    fn test_upload_requires_url() {
        let config = ScanConfig {
            upload: true,
            ..ScanConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingUploadUrl)));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let config = ScanConfig {
            ignore_globs: vec!["src/[".to_string()],
            ..ScanConfig::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidGlob { pattern, .. }) => assert_eq!(pattern, "src/["),
            other => panic!("expected InvalidGlob, got {other:?}"),
        }
    }

    #[test]
    fn test_discover_prefers_working_directory_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("codestruct.yaml"), "max_workers: 3\n").unwrap();

        let (config, used) = ScanConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.max_workers, 3);
        assert_eq!(used, Some(dir.path().join("codestruct.yaml")));
    }

    #[test]
    fn test_explicit_missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = ScanConfig::discover(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
