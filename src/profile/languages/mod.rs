//! Built-in language profiles.

use std::path::Path;

/// Embed the seven query assets of one language from `queries/<lang>/`.
macro_rules! query_assets {
    ($lang:literal) => {
        &[
            (
                $crate::profile::QueryName::Structure,
                include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/queries/", $lang, "/structure.scm")),
            ),
            (
                $crate::profile::QueryName::Scope,
                include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/queries/", $lang, "/scope.scm")),
            ),
            (
                $crate::profile::QueryName::Hoverable,
                include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/queries/", $lang, "/hoverable.scm")),
            ),
            (
                $crate::profile::QueryName::Class,
                include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/queries/", $lang, "/class.scm")),
            ),
            (
                $crate::profile::QueryName::Method,
                include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/queries/", $lang, "/method.scm")),
            ),
            (
                $crate::profile::QueryName::DocComment,
                include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/queries/", $lang, "/doc_comment.scm")),
            ),
            (
                $crate::profile::QueryName::MethodSignature,
                include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/queries/", $lang, "/method_signature.scm")),
            ),
        ]
    };
}

pub mod c;
pub mod cpp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod python;
pub mod rust_lang;
pub mod typescript;

use super::ProfileDef;

/// Every profile shipped with the crate, in registration order.
pub static BUILTIN: &[&ProfileDef] = &[
    &c::PROFILE,
    &cpp::PROFILE,
    &go::PROFILE,
    &java::PROFILE,
    &javascript::PROFILE,
    &python::PROFILE,
    &rust_lang::PROFILE,
    &typescript::PROFILE,
];

/// File name of a path, or "" when it has none.
fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

/// Check if any directory component of `path` equals `dir`.
fn in_dir(path: &Path, dir: &str) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    parent
        .components()
        .any(|c| c.as_os_str().to_str() == Some(dir))
}

/// Check if the path contains the consecutive directories `dirs`.
fn in_dirs(path: &Path, dirs: &[&str]) -> bool {
    let components: Vec<&str> = path
        .parent()
        .map(|p| p.components().filter_map(|c| c.as_os_str().to_str()).collect())
        .unwrap_or_default();
    components.windows(dirs.len()).any(|w| w == dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::LanguageProfile;
    use std::collections::HashSet;
    use std::path::PathBuf;

    #[test]
    fn test_every_builtin_profile_builds() {
        for def in BUILTIN {
            let profile = LanguageProfile::from_def(def)
                .unwrap_or_else(|e| panic!("profile {} failed to build: {e}", def.id));
            for asset in profile.queries().iter() {
                assert_eq!(asset.language(), def.id);
                assert!(asset.version() >= 1);
            }
        }
    }

    #[test]
    fn test_grammar_ids_are_unique() {
        let mut seen = HashSet::new();
        for def in BUILTIN {
            for grammar in (def.grammars)() {
                assert!(seen.insert(grammar.id), "duplicate grammar id {}", grammar.id);
            }
        }
    }

    #[test]
    fn test_path_helpers() {
        let path = PathBuf::from("project/src/test/java/FooTest.java");
        assert_eq!(file_name(&path), "FooTest.java");
        assert!(in_dir(&path, "test"));
        assert!(!in_dir(&path, "FooTest.java"));
        assert!(in_dirs(&path, &["src", "test"]));
        assert!(!in_dirs(&path, &["test", "src"]));
    }
}
