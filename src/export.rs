//! Result serialization.
//!
//! - JSON: the full [`CodeAnalysisResult`], pretty-printed
//! - Flat records: one row per entity, used as the upload payload

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{CodeAnalysisResult, Entity, EntityId};
use crate::profile::EntityKind;

/// Separator between names in [`FlatRecord::qualified_name`].
pub const QUALIFIED_SEPARATOR: &str = "::";

/// One entity, denormalized with its file and ancestry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub file: String,
    pub language: String,
    pub kind: EntityKind,
    pub name: String,
    /// Names of enclosing entities and this one, joined with `::`.
    pub qualified_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,
}

/// Serialize the result as pretty JSON.
pub fn to_json(result: &CodeAnalysisResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Write the result as pretty JSON, creating parent directories.
pub fn write_json(result: &CodeAnalysisResult, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, to_json(result)?)?;
    Ok(())
}

/// Read a result previously written by [`write_json`].
pub fn read_json(path: &Path) -> anyhow::Result<CodeAnalysisResult> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Flatten every entity of every structured file, in file then preorder order.
pub fn flatten(result: &CodeAnalysisResult) -> Vec<FlatRecord> {
    let mut records = Vec::new();
    for file in &result.files {
        let Some(language) = file.language.as_deref() else {
            continue;
        };
        for entity in &file.entities {
            push_records(&mut records, &file.path, language, entity, None);
        }
    }
    records
}

fn push_records(
    out: &mut Vec<FlatRecord>,
    file: &str,
    language: &str,
    entity: &Entity,
    prefix: Option<&str>,
) {
    let qualified_name = match prefix {
        Some(prefix) if !entity.name.is_empty() => {
            format!("{prefix}{QUALIFIED_SEPARATOR}{}", entity.name)
        }
        Some(prefix) => prefix.to_string(),
        None => entity.name.clone(),
    };
    out.push(FlatRecord {
        file: file.to_string(),
        language: language.to_string(),
        kind: entity.kind,
        name: entity.name.clone(),
        qualified_name: qualified_name.clone(),
        declared_type: entity.declared_type.clone(),
        return_type: entity.return_type.clone(),
        reference: entity.reference.clone(),
        line: entity.span.start_line,
        parent: entity.parent,
    });
    for child in &entity.children {
        push_records(out, file, language, child, Some(&qualified_name));
    }
}
