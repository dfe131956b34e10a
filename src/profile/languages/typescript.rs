//! TypeScript language profile, covering `.ts` and `.tsx`.

use std::path::Path;

use phf::phf_set;

use super::{file_name, in_dir};
use crate::profile::{EntityKind, Grammar, GrammarId, KindGroup, ProfileDef, Taxonomy, FUNCTIONS, MODULES};

pub const GRAMMAR: GrammarId = GrammarId("typescript");
pub const TSX_GRAMMAR: GrammarId = GrammarId("tsx");

static BUILTIN_TYPES: phf::Set<&'static str> = phf_set! {
    "string", "number", "boolean", "bigint", "symbol", "object",
    "any", "unknown", "never", "void", "null", "undefined",
    "Array", "Promise", "Record", "Partial", "Readonly", "Map", "Set", "Date",
};

static GROUPS: &[KindGroup] = &[
    MODULES,
    KindGroup {
        name: "types",
        kinds: &[
            EntityKind::Class,
            EntityKind::Interface,
            EntityKind::Enum,
            EntityKind::Typedef,
        ],
    },
    FUNCTIONS,
    KindGroup {
        name: "variables",
        kinds: &[EntityKind::Variable, EntityKind::Parameter],
    },
    KindGroup {
        name: "fields",
        kinds: &[EntityKind::Field, EntityKind::Enumerator],
    },
];

fn grammars() -> Vec<Grammar> {
    vec![
        Grammar::new(GRAMMAR, tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        Grammar::new(TSX_GRAMMAR, tree_sitter_typescript::LANGUAGE_TSX.into()),
    ]
}

/// Jest/Vitest conventions: `*.test.ts`, `*.spec.ts` and `__tests__/`.
fn is_test_file(path: &Path) -> bool {
    let name = file_name(path);
    [".test.ts", ".test.tsx", ".spec.ts", ".spec.tsx"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
        || in_dir(path, "__tests__")
}

pub static PROFILE: ProfileDef = ProfileDef {
    id: "typescript",
    aliases: &["ts"],
    extensions: &["ts", "tsx", "mts", "cts"],
    grammars,
    extension_grammars: &[("tsx", TSX_GRAMMAR)],
    is_test_file,
    queries: query_assets!("typescript"),
    taxonomy: Taxonomy::new(GROUPS),
    builtin_types: &BUILTIN_TYPES,
    auto_select_kinds: &[
        "identifier",
        "property_identifier",
        "shorthand_property_identifier",
        "type_identifier",
        "predefined_type",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file(&PathBuf::from("src/api.test.ts")));
        assert!(is_test_file(&PathBuf::from("src/App.spec.tsx")));
        assert!(is_test_file(&PathBuf::from("src/__tests__/api.ts")));
        assert!(!is_test_file(&PathBuf::from("src/api.ts")));
    }
}
