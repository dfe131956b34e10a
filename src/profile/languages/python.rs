//! Python language profile.

use std::path::Path;

use phf::phf_set;

use super::{file_name, in_dir};
use crate::profile::{EntityKind, Grammar, GrammarId, KindGroup, ProfileDef, Taxonomy, FUNCTIONS, MODULES};

pub const GRAMMAR: GrammarId = GrammarId("python");

static BUILTIN_TYPES: phf::Set<&'static str> = phf_set! {
    "int", "float", "complex", "str", "bytes", "bytearray", "bool",
    "list", "dict", "set", "frozenset", "tuple", "object", "type", "None",
    "Any", "Optional", "Union", "List", "Dict", "Set", "Tuple", "Callable",
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
    vec![Grammar::new(GRAMMAR, tree_sitter_python::LANGUAGE.into())]
}

/// pytest conventions: `test_*.py`, `*_test.py`, `tests/` and `conftest.py`.
fn is_test_file(path: &Path) -> bool {
    let name = file_name(path);
    name == "conftest.py"
        || (name.starts_with("test_") && name.ends_with(".py"))
        || name.ends_with("_test.py")
        || in_dir(path, "tests")
}

pub static PROFILE: ProfileDef = ProfileDef {
    id: "python",
    aliases: &["py"],
    extensions: &["py", "pyi"],
    grammars,
    extension_grammars: &[],
    is_test_file,
    queries: query_assets!("python"),
    taxonomy: Taxonomy::new(GROUPS),
    builtin_types: &BUILTIN_TYPES,
    auto_select_kinds: &["identifier", "dotted_name"],
};
