//! Versioned, language-tagged query assets.
//!
//! Query sources live under `queries/<language>/<name>.scm` and are embedded
//! at build time. Each asset starts with a comment header:
//!
//! ```text
//! ; language: rust
//! ; version: 1
//! ```
//!
//! The header is checked when a profile is built, so a query filed under the
//! wrong language directory is rejected before it can be compiled.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ProfileError;

lazy_static! {
    static ref LANGUAGE_HEADER: Regex = Regex::new(r"^;+\s*language:\s*([A-Za-z0-9_+\-]+)\s*$").unwrap();
    static ref VERSION_HEADER: Regex = Regex::new(r"^;+\s*version:\s*(\d+)\s*$").unwrap();
}

/// The fixed set of named queries every profile carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryName {
    Structure,
    Scope,
    Hoverable,
    Class,
    Method,
    DocComment,
    MethodSignature,
}

impl QueryName {
    pub const ALL: [QueryName; 7] = [
        QueryName::Structure,
        QueryName::Scope,
        QueryName::Hoverable,
        QueryName::Class,
        QueryName::Method,
        QueryName::DocComment,
        QueryName::MethodSignature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryName::Structure => "structure",
            QueryName::Scope => "scope",
            QueryName::Hoverable => "hoverable",
            QueryName::Class => "class",
            QueryName::Method => "method",
            QueryName::DocComment => "doc_comment",
            QueryName::MethodSignature => "method_signature",
        }
    }
}

impl fmt::Display for QueryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One embedded query source with its parsed header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAsset {
    name: QueryName,
    language: String,
    version: u32,
    source: &'static str,
}

impl QueryAsset {
    /// Parse an asset's header and check it is tagged for `language`.
    pub fn parse(
        language: &str,
        name: QueryName,
        source: &'static str,
    ) -> Result<Self, ProfileError> {
        let asset_error = |message: String| ProfileError::Asset {
            language: language.to_string(),
            query: name.as_str().to_string(),
            message,
        };

        let mut header = source.lines().map(str::trim).filter(|l| !l.is_empty());

        let tagged = header
            .next()
            .and_then(|line| LANGUAGE_HEADER.captures(line))
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| asset_error("missing `; language:` header".to_string()))?;

        let version = header
            .next()
            .and_then(|line| VERSION_HEADER.captures(line))
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .ok_or_else(|| asset_error("missing `; version:` header".to_string()))?;

        if tagged != language {
            return Err(asset_error(format!(
                "asset is tagged for language {:?}",
                tagged
            )));
        }

        Ok(Self {
            name,
            language: tagged,
            version,
            source,
        })
    }

    pub fn name(&self) -> QueryName {
        self.name
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// The full query text, header comments included.
    pub fn source(&self) -> &'static str {
        self.source
    }
}

/// The seven named queries of a profile.
#[derive(Debug, Clone)]
pub struct QuerySet {
    structure: QueryAsset,
    scope: QueryAsset,
    hoverable: QueryAsset,
    class: QueryAsset,
    method: QueryAsset,
    doc_comment: QueryAsset,
    method_signature: QueryAsset,
}

impl QuerySet {
    /// Build a query set from embedded sources. Every name must be present.
    pub fn from_sources(
        language: &str,
        sources: &[(QueryName, &'static str)],
    ) -> Result<Self, ProfileError> {
        let load = |name: QueryName| -> Result<QueryAsset, ProfileError> {
            let source = sources
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, src)| *src)
                .ok_or_else(|| ProfileError::MissingQuery {
                    language: language.to_string(),
                    query: name.as_str().to_string(),
                })?;
            QueryAsset::parse(language, name, source)
        };

        Ok(Self {
            structure: load(QueryName::Structure)?,
            scope: load(QueryName::Scope)?,
            hoverable: load(QueryName::Hoverable)?,
            class: load(QueryName::Class)?,
            method: load(QueryName::Method)?,
            doc_comment: load(QueryName::DocComment)?,
            method_signature: load(QueryName::MethodSignature)?,
        })
    }

    pub fn get(&self, name: QueryName) -> &QueryAsset {
        match name {
            QueryName::Structure => &self.structure,
            QueryName::Scope => &self.scope,
            QueryName::Hoverable => &self.hoverable,
            QueryName::Class => &self.class,
            QueryName::Method => &self.method,
            QueryName::DocComment => &self.doc_comment,
            QueryName::MethodSignature => &self.method_signature,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryAsset> + '_ {
        QueryName::ALL.into_iter().map(move |name| self.get(name))
    }
}
