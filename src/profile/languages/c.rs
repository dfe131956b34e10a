//! C language profile.

use std::path::Path;

use phf::phf_set;

use super::{file_name, in_dir};
use crate::profile::{EntityKind, Grammar, GrammarId, KindGroup, ProfileDef, Taxonomy, FUNCTIONS, MODULES};

pub const GRAMMAR: GrammarId = GrammarId("c");

static BUILTIN_TYPES: phf::Set<&'static str> = phf_set! {
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned",
    "_Bool", "bool", "size_t", "ssize_t", "ptrdiff_t",
    "int8_t", "int16_t", "int32_t", "int64_t",
    "uint8_t", "uint16_t", "uint32_t", "uint64_t",
};

static GROUPS: &[KindGroup] = &[
    MODULES,
    KindGroup {
        name: "types",
        kinds: &[
            EntityKind::Struct,
            EntityKind::Union,
            EntityKind::Enum,
            EntityKind::Typedef,
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
];

fn grammars() -> Vec<Grammar> {
    vec![Grammar::new(GRAMMAR, tree_sitter_c::LANGUAGE.into())]
}

fn is_test_file(path: &Path) -> bool {
    let name = file_name(path);
    (name.starts_with("test_") && name.ends_with(".c")) || name.ends_with("_test.c") || in_dir(path, "tests")
}

pub static PROFILE: ProfileDef = ProfileDef {
    id: "c",
    aliases: &[],
    extensions: &["c", "h"],
    grammars,
    extension_grammars: &[],
    is_test_file,
    queries: query_assets!("c"),
    taxonomy: Taxonomy::new(GROUPS),
    builtin_types: &BUILTIN_TYPES,
    auto_select_kinds: &["identifier", "field_identifier", "type_identifier", "primitive_type"],
};
