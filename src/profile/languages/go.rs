//! Go language profile.

use std::path::Path;

use phf::phf_set;

use super::file_name;
use crate::profile::{EntityKind, Grammar, GrammarId, KindGroup, ProfileDef, Taxonomy, FUNCTIONS, MODULES};

pub const GRAMMAR: GrammarId = GrammarId("go");

static BUILTIN_TYPES: phf::Set<&'static str> = phf_set! {
    "bool", "string", "byte", "rune", "error", "any",
    "int", "int8", "int16", "int32", "int64",
    "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
    "float32", "float64", "complex64", "complex128",
};

static GROUPS: &[KindGroup] = &[
    MODULES,
    KindGroup {
        name: "types",
        kinds: &[EntityKind::Struct, EntityKind::Interface, EntityKind::Typedef],
    },
    FUNCTIONS,
    KindGroup {
        name: "variables",
        kinds: &[EntityKind::Const, EntityKind::Variable, EntityKind::Parameter],
    },
    KindGroup {
        name: "fields",
        kinds: &[EntityKind::Field],
    },
];

fn grammars() -> Vec<Grammar> {
    vec![Grammar::new(GRAMMAR, tree_sitter_go::LANGUAGE.into())]
}

fn is_test_file(path: &Path) -> bool {
    file_name(path).ends_with("_test.go")
}

pub static PROFILE: ProfileDef = ProfileDef {
    id: "go",
    aliases: &["golang"],
    extensions: &["go"],
    grammars,
    extension_grammars: &[],
    is_test_file,
    queries: query_assets!("go"),
    taxonomy: Taxonomy::new(GROUPS),
    builtin_types: &BUILTIN_TYPES,
    auto_select_kinds: &[
        "identifier",
        "field_identifier",
        "type_identifier",
        "package_identifier",
    ],
};
