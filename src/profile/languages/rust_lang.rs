//! Rust language profile.

use std::path::Path;

use phf::phf_set;

use super::{file_name, in_dir};
use crate::profile::{EntityKind, Grammar, GrammarId, KindGroup, ProfileDef, Taxonomy, FUNCTIONS, MODULES};

pub const GRAMMAR: GrammarId = GrammarId("rust");

static BUILTIN_TYPES: phf::Set<&'static str> = phf_set! {
    "bool", "char", "str", "String",
    "i8", "i16", "i32", "i64", "i128", "isize",
    "u8", "u16", "u32", "u64", "u128", "usize",
    "f32", "f64",
    "Self", "Option", "Result", "Vec", "Box", "Rc", "Arc",
};

static GROUPS: &[KindGroup] = &[
    MODULES,
    KindGroup {
        name: "types",
        kinds: &[
            EntityKind::Struct,
            EntityKind::Enum,
            EntityKind::Union,
            EntityKind::Typedef,
            EntityKind::Interface,
            EntityKind::Impl,
        ],
    },
    FUNCTIONS,
    KindGroup {
        name: "variables",
        kinds: &[EntityKind::Const, EntityKind::Variable, EntityKind::Parameter],
    },
    KindGroup {
        name: "fields",
        kinds: &[EntityKind::Field, EntityKind::Enumerator],
    },
    // No counterpart in the other shipped languages.
    KindGroup {
        name: "rust",
        kinds: &[EntityKind::Label, EntityKind::Lifetime],
    },
];

fn grammars() -> Vec<Grammar> {
    vec![Grammar::new(GRAMMAR, tree_sitter_rust::LANGUAGE.into())]
}

/// Integration tests under `tests/` and `*_test.rs` / `*_tests.rs` modules.
fn is_test_file(path: &Path) -> bool {
    let name = file_name(path);
    in_dir(path, "tests") || name.ends_with("_test.rs") || name.ends_with("_tests.rs")
}

pub static PROFILE: ProfileDef = ProfileDef {
    id: "rust",
    aliases: &["rs"],
    extensions: &["rs"],
    grammars,
    extension_grammars: &[],
    is_test_file,
    queries: query_assets!("rust"),
    taxonomy: Taxonomy::new(GROUPS),
    builtin_types: &BUILTIN_TYPES,
    auto_select_kinds: &[
        "identifier",
        "field_identifier",
        "type_identifier",
        "primitive_type",
        "visibility_modifier",
    ],
};
