//! Java language profile.

use std::path::Path;

use phf::phf_set;

use super::{file_name, in_dirs};
use crate::profile::{EntityKind, Grammar, GrammarId, KindGroup, ProfileDef, Taxonomy, FUNCTIONS, MODULES};

pub const GRAMMAR: GrammarId = GrammarId("java");

static BUILTIN_TYPES: phf::Set<&'static str> = phf_set! {
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
    "String", "Object", "Integer", "Long", "Short", "Byte", "Character",
    "Boolean", "Float", "Double", "List", "Map", "Set", "Optional",
};

static GROUPS: &[KindGroup] = &[
    MODULES,
    KindGroup {
        name: "types",
        kinds: &[EntityKind::Class, EntityKind::Interface, EntityKind::Enum],
    },
    FUNCTIONS,
    KindGroup {
        name: "variables",
        kinds: &[EntityKind::Const, EntityKind::Parameter],
    },
    KindGroup {
        name: "fields",
        kinds: &[EntityKind::Field, EntityKind::Enumerator],
    },
];

fn grammars() -> Vec<Grammar> {
    vec![Grammar::new(GRAMMAR, tree_sitter_java::LANGUAGE.into())]
}

/// JUnit naming (`*Test.java`, `*Tests.java`) and the Maven `src/test/` tree.
fn is_test_file(path: &Path) -> bool {
    let name = file_name(path);
    name.ends_with("Test.java") || name.ends_with("Tests.java") || in_dirs(path, &["src", "test"])
}

pub static PROFILE: ProfileDef = ProfileDef {
    id: "java",
    aliases: &[],
    extensions: &["java"],
    grammars,
    extension_grammars: &[],
    is_test_file,
    queries: query_assets!("java"),
    taxonomy: Taxonomy::new(GROUPS),
    builtin_types: &BUILTIN_TYPES,
    auto_select_kinds: &["identifier", "type_identifier", "integral_type", "floating_point_type"],
};
