//! C++ language profile.

use std::path::Path;

use phf::phf_set;

use super::{file_name, in_dir};
use crate::profile::{EntityKind, Grammar, GrammarId, KindGroup, ProfileDef, Taxonomy, FUNCTIONS, MODULES};

pub const GRAMMAR: GrammarId = GrammarId("cpp");

static BUILTIN_TYPES: phf::Set<&'static str> = phf_set! {
    "void", "bool", "char", "wchar_t", "char8_t", "char16_t", "char32_t",
    "short", "int", "long", "float", "double", "signed", "unsigned", "auto",
    "size_t", "int8_t", "int16_t", "int32_t", "int64_t",
    "uint8_t", "uint16_t", "uint32_t", "uint64_t",
    "std::string", "std::vector", "std::map", "std::unique_ptr", "std::shared_ptr",
};

static GROUPS: &[KindGroup] = &[
    MODULES,
    KindGroup {
        name: "types",
        kinds: &[
            EntityKind::Class,
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
    vec![Grammar::new(GRAMMAR, tree_sitter_cpp::LANGUAGE.into())]
}

fn is_test_file(path: &Path) -> bool {
    let name = file_name(path);
    name.ends_with("_test.cpp") || name.ends_with("_test.cc") || in_dir(path, "tests")
}

pub static PROFILE: ProfileDef = ProfileDef {
    id: "cpp",
    aliases: &["c++", "cxx"],
    extensions: &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
    grammars,
    extension_grammars: &[],
    is_test_file,
    queries: query_assets!("cpp"),
    taxonomy: Taxonomy::new(GROUPS),
    builtin_types: &BUILTIN_TYPES,
    auto_select_kinds: &[
        "identifier",
        "field_identifier",
        "type_identifier",
        "namespace_identifier",
        "primitive_type",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file(&PathBuf::from("src/parser_test.cc")));
        assert!(is_test_file(&PathBuf::from("tests/main.cpp")));
        assert!(!is_test_file(&PathBuf::from("src/parser.cpp")));
    }
}
