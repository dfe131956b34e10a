//! Markdown study outlines generated from an analysis result.
//!
//! Writes `index.md` plus one `<language>.md` per language, each listing the
//! files of that language with their entity tree.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::analysis::{CodeAnalysisResult, Entity, FileStructureResult};

/// Write the outlines into `out_dir` and return the files written.
pub fn generate_learning_materials(
    result: &CodeAnalysisResult,
    out_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    let by_language = result.files_by_language();
    for (language, files) in &by_language {
        let path = out_dir.join(format!("{language}.md"));
        fs::write(&path, render_language(language, files))?;
        written.push(path);
    }

    let index = out_dir.join("index.md");
    fs::write(&index, render_index(result))?;
    written.push(index);

    info!(dir = %out_dir.display(), files = written.len(), "wrote learning materials");
    Ok(written)
}

/// Overview page with counters and links to each language page.
pub fn render_index(result: &CodeAnalysisResult) -> String {
    let counters = &result.counters;
    let mut out = String::new();
    let _ = writeln!(out, "# Code structure of `{}`\n", result.root);
    let _ = writeln!(out, "- Files scanned: {}", counters.files_scanned);
    let _ = writeln!(out, "- Files parsed: {}", counters.files_parsed);
    let _ = writeln!(out, "- Files failed: {}", counters.files_failed);
    let _ = writeln!(out, "- Entities: {}", counters.entities);

    if !counters.per_language.is_empty() {
        let _ = writeln!(out, "\n## Languages\n");
        for (language, count) in &counters.per_language {
            let _ = writeln!(out, "- [{language}]({language}.md): {count} files");
        }
    }

    let failed: Vec<_> = result.failed_files().collect();
    if !failed.is_empty() {
        let _ = writeln!(out, "\n## Files that could not be structured\n");
        for file in failed {
            let reason = file.errors.first().map(|e| e.kind.as_str()).unwrap_or("unknown");
            let _ = writeln!(out, "- `{}` ({})", file.path, reason);
        }
    }
    out
}

/// Outline of every structured file of one language.
pub fn render_language(language: &str, files: &[&FileStructureResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {language}\n");
    for file in files.iter().filter(|f| !f.is_failed()) {
        let marker = if file.is_test { " (test)" } else { "" };
        let _ = writeln!(out, "## `{}`{marker}\n", file.path);
        if file.entities.is_empty() {
            let _ = writeln!(out, "_No declarations._\n");
            continue;
        }
        for entity in &file.entities {
            render_entity(&mut out, entity, 0);
        }
        out.push('\n');
    }
    out
}

fn render_entity(out: &mut String, entity: &Entity, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = if entity.name.is_empty() { "_" } else { &entity.name };
    let _ = write!(out, "{indent}- **{}** `{}`", entity.kind, name);
    if let Some(ty) = &entity.declared_type {
        let _ = write!(out, ": `{ty}`");
    }
    if let Some(ret) = &entity.return_type {
        let _ = write!(out, " -> `{ret}`");
    }
    if let Some(reference) = &entity.reference {
        let _ = write!(out, " (refs `{reference}`)");
    }
    let _ = writeln!(out, " (line {})", entity.span.start_line);
    for child in &entity.children {
        render_entity(out, child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{EntityId, FileState, ScanCounters, Span};
    use crate::error::{ErrorKind, FileError};
    use crate::profile::EntityKind;
    use tempfile::TempDir;

    fn result() -> CodeAnalysisResult {
        let mut ok = FileStructureResult::new("geo.go", Some("go"));
        ok.state = FileState::Done;
        ok.entities = vec![Entity {
            id: EntityId(0),
            kind: EntityKind::Function,
            name: "Area".to_string(),
            declared_type: None,
            return_type: Some("float64".to_string()),
            reference: None,
            parent: None,
            span: Span {
                start_byte: 0,
                end_byte: 10,
                start_line: 3,
                start_col: 1,
                end_line: 5,
                end_col: 2,
            },
            children: Vec::new(),
        }];
        let mut bad = FileStructureResult::new("bad.go", Some("go"));
        bad.fail(FileError {
            kind: ErrorKind::ParseError,
            message: "syntax error".to_string(),
            location: None,
        });
        let mut counters = ScanCounters::default();
        counters.record(&ok, true);
        counters.record(&bad, false);
        CodeAnalysisResult {
            root: "proj".to_string(),
            files: vec![bad, ok],
            counters,
            elapsed_ms: 0,
            cancelled: false,
        }
    }

    #[test]
    fn test_writes_index_and_language_pages() {
        let dir = TempDir::new().unwrap();
        let written = generate_learning_materials(&result(), dir.path()).unwrap();
        assert_eq!(written.len(), 2);

        let go = fs::read_to_string(dir.path().join("go.md")).unwrap();
        assert!(go.contains("**function** `Area` -> `float64` (line 3)"));
        assert!(!go.contains("bad.go"));

        let index = fs::read_to_string(dir.path().join("index.md")).unwrap();
        assert!(index.contains("[go](go.md): 2 files"));
        assert!(index.contains("`bad.go` (parse_error)"));
    }
}
