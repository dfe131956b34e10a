//! codestruct - multi-language source structuring.
//!
//! Parses a tree of heterogeneous source files with tree-sitter and extracts
//! one canonical entity inventory (modules, imports, types, fields,
//! interfaces, impls, functions, parameters) per file, using declarative
//! queries shipped with each language profile.
//!
//! # Architecture
//!
//! - `profile`: language profiles, their query assets and kind taxonomy
//! - `query`: process-wide cache of compiled queries
//! - `analysis`: parsing, the query structurer and the directory analyzer
//! - `navigation`: scope, hover, doc-comment and selection lookups
//! - `config`: YAML scan options
//! - `export`, `upload`, `learning`: consumers of a finished result
//!
//! # Adding a New Language
//!
//! Add `queries/<lang>/*.scm`, a profile module in
//! `src/profile/languages/`, and list it in `BUILTIN`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod learning;
pub mod navigation;
pub mod profile;
pub mod query;
pub mod upload;

pub use analysis::{
    AnalyzeError, CancelToken, CodeAnalysisResult, CodeAnalyzer, Entity, EntityId,
    FileStructureResult, QueryStructurer, Structurer,
};
pub use config::ScanConfig;
pub use error::{ErrorKind, FileError, ProfileError, StructureError};
pub use profile::{EntityKind, LanguageProfile, ProfileRegistry, ProfileResolver};
pub use query::QueryCache;
