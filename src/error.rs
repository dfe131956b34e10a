//! Error types shared by the profile, query and structuring layers.
//!
//! Errors that happen while processing a single file never escape that
//! file's boundary: the analyzer converts them into [`FileError`] records
//! stored on the file's result.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A position inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Byte offset (0-indexed).
    pub offset: usize,
    /// Line (1-indexed).
    pub line: usize,
    /// Column (1-indexed).
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (byte {})", self.line, self.column, self.offset)
    }
}

/// Errors raised while resolving, parsing or structuring one file.
#[derive(Error, Debug)]
pub enum StructureError {
    #[error("no language profile registered for {path} (extension {extension:?})")]
    UnsupportedLanguage { path: String, extension: String },

    #[error("failed to parse {path}: {message}")]
    Parse {
        path: String,
        message: String,
        location: Option<SourceLocation>,
    },

    #[error("query failed to compile for grammar {grammar}: {message}")]
    QueryCompilation {
        grammar: String,
        pattern: String,
        message: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StructureError {
    /// The serializable category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StructureError::UnsupportedLanguage { .. } => ErrorKind::UnsupportedLanguage,
            StructureError::Parse { .. } => ErrorKind::ParseError,
            StructureError::QueryCompilation { .. } => ErrorKind::QueryCompilationError,
            StructureError::Io { .. } => ErrorKind::IoError,
        }
    }
}

/// Category of a per-file error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedLanguage,
    ParseError,
    QueryCompilationError,
    IoError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedLanguage => "unsupported_language",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::QueryCompilationError => "query_compilation_error",
            ErrorKind::IoError => "io_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-file error as recorded in the analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl From<&StructureError> for FileError {
    fn from(err: &StructureError) -> Self {
        let location = match err {
            StructureError::Parse { location, .. } => *location,
            _ => None,
        };
        Self {
            kind: err.kind(),
            message: err.to_string(),
            location,
        }
    }
}

impl From<StructureError> for FileError {
    fn from(err: StructureError) -> Self {
        FileError::from(&err)
    }
}

/// Defects in a language profile definition.
///
/// These are configuration bugs, surfaced when a profile is built and
/// caught by the profile validation tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile {language}: query asset {query}: {message}")]
    Asset {
        language: String,
        query: String,
        message: String,
    },

    #[error("profile {language}: missing {query} query")]
    MissingQuery { language: String, query: String },

    #[error("profile {language}: {what} must not be empty")]
    Empty { language: String, what: &'static str },
}
