//! Source structuring and whole-tree analysis.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌─────────────┐    ┌───────────────────┐
//! │ scan (walk)  │───▶│ parse (tree) │───▶│ Structurer  │───▶│ FileStructureResult│
//! └──────────────┘    └──────────────┘    │ (queries)   │    └───────────────────┘
//!        ▲                   ▲            └─────────────┘              │
//!        │                   │                   ▲                     ▼
//!   ScanConfig        LanguageProfile       QueryCache        ┌───────────────────┐
//!                                                             │ CodeAnalysisResult│
//!                                                             └───────────────────┘
//! ```
//!
//! [`CodeAnalyzer`] drives the pipeline. Each file is processed on its own
//! and failures are recorded on that file's result.

mod analyzer;
mod facts;
mod parse;
mod result;
pub mod scan;
mod structurer;
mod traits;

pub use analyzer::{AnalyzeError, CodeAnalyzer};
pub use facts::{Entity, EntityId, EntityWalk, FileState, FileStructureResult, Span};
pub use parse::{parse_file, parse_valid};
pub use result::{CancelToken, CodeAnalysisResult, ScanCounters};
pub use structurer::QueryStructurer;
pub(crate) use structurer::collapse_whitespace;
pub use traits::{ParsedFile, Structurer};
