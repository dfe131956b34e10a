//! JavaScript language profile.

use std::path::Path;

use phf::phf_set;

use super::{file_name, in_dir};
use crate::profile::{EntityKind, Grammar, GrammarId, KindGroup, ProfileDef, Taxonomy, FUNCTIONS, MODULES};

pub const GRAMMAR: GrammarId = GrammarId("javascript");

static BUILTIN_TYPES: phf::Set<&'static str> = phf_set! {
    "Object", "Array", "String", "Number", "Boolean", "BigInt", "Symbol",
    "Function", "Map", "Set", "WeakMap", "WeakSet", "Promise", "Date",
    "RegExp", "Error", "JSON", "Math", "undefined", "null",
};

static GROUPS: &[KindGroup] = &[
    MODULES,
    KindGroup {
        name: "types",
        kinds: &[EntityKind::Class],
    },
    FUNCTIONS,
    KindGroup {
        name: "variables",
        kinds: &[EntityKind::Variable, EntityKind::Parameter],
    },
    KindGroup {
        name: "fields",
        kinds: &[EntityKind::Field],
    },
];

fn grammars() -> Vec<Grammar> {
    vec![Grammar::new(GRAMMAR, tree_sitter_javascript::LANGUAGE.into())]
}

fn is_test_file(path: &Path) -> bool {
    let name = file_name(path);
    [".test.js", ".test.jsx", ".spec.js", ".spec.jsx", ".test.mjs"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
        || in_dir(path, "__tests__")
}

pub static PROFILE: ProfileDef = ProfileDef {
    id: "javascript",
    aliases: &["js", "jsx"],
    extensions: &["js", "jsx", "mjs", "cjs"],
    grammars,
    extension_grammars: &[],
    is_test_file,
    queries: query_assets!("javascript"),
    taxonomy: Taxonomy::new(GROUPS),
    builtin_types: &BUILTIN_TYPES,
    auto_select_kinds: &["identifier", "property_identifier", "shorthand_property_identifier"],
};
