//! Integration tests for profiles, query assets and the query structurer.
//!
//! Every shipped profile is checked against its grammars and a sample file
//! from `testdata/samples`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use codestruct::analysis::{parse_valid, FileStructureResult, QueryStructurer, Structurer};
use codestruct::profile::{EntityKind, LanguageProfile, ProfileRegistry, QueryName};
use codestruct::query::QueryCache;
use codestruct::Entity;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn registry() -> ProfileRegistry {
    ProfileRegistry::with_builtin_profiles().expect("built-in profiles should build")
}

/// Parse and structure one sample into a file result.
fn structure_sample(name: &str) -> (Arc<LanguageProfile>, FileStructureResult) {
    let path = testdata_path().join("samples").join(name);
    let ext = path.extension().and_then(|e| e.to_str()).unwrap();
    let profile = registry().resolve(ext).expect("sample extension should resolve");
    let source = fs::read(&path).expect("should read sample");

    let parsed = parse_valid(&profile, Path::new(name), source).expect("sample should parse cleanly");
    let structurer = QueryStructurer::new(Arc::new(QueryCache::new()));
    let entities = structurer
        .structure(&profile, &parsed)
        .expect("sample should structure");

    let mut result = FileStructureResult::new(name, Some(profile.id()));
    result.entities = entities;
    (profile, result)
}

fn child_names(entity: &Entity, kind: EntityKind) -> Vec<&str> {
    entity.children_of_kind(kind).map(|c| c.name.as_str()).collect()
}

// =============================================================================
// Profile validation
// =============================================================================

#[test]
fn test_every_query_compiles_for_every_grammar() {
    let cache = QueryCache::new();
    for profile in registry().profiles() {
        for grammar in profile.grammars() {
            for name in QueryName::ALL {
                let asset = profile.query(name);
                assert_eq!(asset.language(), profile.id());
                if let Err(e) = cache.get(asset.source(), grammar) {
                    panic!("{} {} query invalid for grammar {}: {}", profile.id(), name, grammar.id, e);
                }
            }
        }
    }
    let expected: usize = registry()
        .profiles()
        .iter()
        .map(|p| p.grammars().len() * QueryName::ALL.len())
        .sum();
    assert_eq!(cache.stats().compiles as usize, expected);
}

#[test]
fn test_every_language_yields_taxonomy_entities() {
    let samples = [
        "point.rs",
        "shapes.go",
        "shapes.py",
        "Shapes.java",
        "shapes.c",
        "shapes.cpp",
        "shapes.ts",
        "badge.tsx",
        "shapes.js",
    ];
    for sample in samples {
        let (profile, result) = structure_sample(sample);
        assert!(!result.entities.is_empty(), "{sample} produced no entities");
        for entity in result.walk() {
            assert!(
                profile.taxonomy().contains(entity.kind),
                "{sample}: kind {} not in {} taxonomy",
                entity.kind,
                profile.id()
            );
        }
    }
}

#[test]
fn test_parent_ids_match_nesting() {
    let (_, result) = structure_sample("point.rs");
    let ids: Vec<u32> = result.walk().map(|e| e.id.0).collect();
    let expected: Vec<u32> = (0..ids.len() as u32).collect();
    assert_eq!(ids, expected, "ids should be preorder indices");

    for entity in result.walk() {
        for child in &entity.children {
            assert_eq!(child.parent, Some(entity.id));
            assert!(entity.span.contains(&child.span));
        }
    }
    assert!(result.entities.iter().all(|e| e.parent.is_none()));
}

// =============================================================================
// Per-language structure
// =============================================================================

#[test]
fn test_rust_structure() {
    let (_, result) = structure_sample("point.rs");

    let import = result.find(EntityKind::Import, "std::fmt").expect("use std::fmt");
    assert!(import.parent.is_none());

    let point = result.find(EntityKind::Struct, "Point").expect("struct Point");
    assert_eq!(child_names(point, EntityKind::Field), vec!["x", "y"]);
    assert!(point
        .children
        .iter()
        .all(|f| f.declared_type.as_deref() == Some("i32")));

    let shape = result.find(EntityKind::Interface, "Shape").expect("trait Shape");
    let area = shape.children_of_kind(EntityKind::Method).next().expect("area signature");
    assert_eq!(area.name, "area");
    assert_eq!(area.return_type.as_deref(), Some("f64"));

    let display = result.find(EntityKind::Impl, "Point").expect("impl Display for Point");
    assert_eq!(display.reference.as_deref(), Some("fmt::Display"));
    assert_eq!(child_names(display, EntityKind::Method), vec!["fmt"]);

    let direction = result.find(EntityKind::Enum, "Direction").expect("enum Direction");
    assert_eq!(child_names(direction, EntityKind::Enumerator), vec!["North", "South"]);

    let origin = result.find(EntityKind::Const, "ORIGIN").expect("const ORIGIN");
    assert_eq!(origin.declared_type.as_deref(), Some("Point"));

    let distance = result.find(EntityKind::Function, "distance").expect("fn distance");
    assert_eq!(distance.return_type.as_deref(), Some("f64"));
    assert_eq!(child_names(distance, EntityKind::Parameter), vec!["a", "b"]);
}

#[test]
fn test_go_structure() {
    let (_, result) = structure_sample("shapes.go");

    assert!(result.find(EntityKind::Module, "shapes").is_some());

    let circle = result.find(EntityKind::Struct, "Circle").expect("type Circle struct");
    let radius = circle.walk().find(|e| e.kind == EntityKind::Field).expect("Radius field");
    assert_eq!(radius.name, "Radius");
    assert_eq!(radius.declared_type.as_deref(), Some("float64"));

    let area = result
        .walk()
        .find(|e| e.kind == EntityKind::Method && e.reference.is_some())
        .expect("Circle.Area");
    assert_eq!(area.name, "Area");
    assert_eq!(area.reference.as_deref(), Some("Circle"));
    assert_eq!(area.return_type.as_deref(), Some("float64"));

    let shape = result.find(EntityKind::Interface, "Shape").expect("type Shape interface");
    assert!(shape.walk().any(|e| e.kind == EntityKind::Method && e.name == "Area"));

    assert!(result.find(EntityKind::Typedef, "Shape").is_none());
    assert!(result.find(EntityKind::Function, "Describe").is_some());
}

#[test]
fn test_python_structure() {
    let (_, result) = structure_sample("shapes.py");

    assert!(result.find(EntityKind::Import, "math").is_some());
    let list = result.find(EntityKind::Import, "List").expect("from typing import List");
    assert_eq!(list.reference.as_deref(), Some("typing"));

    let shape = result.find(EntityKind::Class, "Shape").expect("class Shape");
    assert_eq!(child_names(shape, EntityKind::Field), vec!["sides"]);

    let circle = result.find(EntityKind::Class, "Circle").expect("class Circle");
    assert_eq!(circle.reference.as_deref(), Some("Shape"));
    let methods: Vec<_> = circle.walk().filter(|e| e.kind == EntityKind::Method).map(|e| e.name.as_str()).collect();
    assert_eq!(methods, vec!["__init__", "area"]);

    let total = result.find(EntityKind::Function, "total_area").expect("def total_area");
    assert_eq!(total.return_type.as_deref(), Some("float"));
    let shapes = total.walk().find(|e| e.kind == EntityKind::Parameter).expect("shapes param");
    assert_eq!(shapes.name, "shapes");
    assert_eq!(shapes.declared_type.as_deref(), Some("List[Shape]"));

    assert!(result.find(EntityKind::Function, "area").is_none());

    let describe = result.find(EntityKind::Function, "describe").expect("def describe");
    assert_eq!(
        child_names(describe, EntityKind::Parameter),
        vec!["label", "shapes", "options"]
    );
    let options = describe.walk().find(|e| e.name == "options").expect("**options");
    assert_eq!(options.declared_type.as_deref(), Some("str"));
}

#[test]
fn test_java_structure() {
    let (_, result) = structure_sample("Shapes.java");

    assert!(result.find(EntityKind::Module, "com.example.shapes").is_some());

    let shapes = result.find(EntityKind::Class, "Shapes").expect("class Shapes");
    let methods = child_names(shapes, EntityKind::Method);
    assert_eq!(methods, vec!["Shapes", "totalArea"]);
    let circles = shapes.walk().find(|e| e.kind == EntityKind::Field).expect("circles field");
    assert_eq!(circles.name, "circles");
    assert_eq!(circles.declared_type.as_deref(), Some("List<Circle>"));

    let shape = result.find(EntityKind::Interface, "Shape").expect("interface Shape");
    assert!(shape.walk().any(|e| e.kind == EntityKind::Method && e.name == "area"));

    let circle = result.find(EntityKind::Class, "Circle").expect("class Circle");
    assert_eq!(circle.reference.as_deref(), Some("Shape"));

    let color = result.find(EntityKind::Enum, "Color").expect("enum Color");
    assert_eq!(color.walk().filter(|e| e.kind == EntityKind::Enumerator).count(), 2);
}

#[test]
fn test_c_structure() {
    let (_, result) = structure_sample("shapes.c");

    let imports: Vec<_> = result
        .walk()
        .filter(|e| e.kind == EntityKind::Import)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(imports, vec!["<stdio.h>", "\"shapes.h\""]);
    assert!(result.find(EntityKind::Const, "PI").is_some());

    let point = result.find(EntityKind::Struct, "point").expect("struct point");
    assert_eq!(point.walk().filter(|e| e.kind == EntityKind::Field).count(), 2);

    let color = result.find(EntityKind::Enum, "color").expect("enum color");
    assert_eq!(color.walk().filter(|e| e.kind == EntityKind::Enumerator).count(), 2);

    let area = result.find(EntityKind::Function, "circle_area").expect("circle_area");
    assert_eq!(area.return_type.as_deref(), Some("double"));
    assert!(result.find(EntityKind::Function, "main").is_some());
}

#[test]
fn test_cpp_structure() {
    let (_, result) = structure_sample("shapes.cpp");

    let geo = result.find(EntityKind::Module, "geo").expect("namespace geo");
    assert!(geo.parent.is_none());

    let point = result.find(EntityKind::Struct, "Point").expect("struct Point");
    assert_eq!(point.parent, Some(geo.id));

    let circle = result.find(EntityKind::Class, "Circle").expect("class Circle");
    assert_eq!(circle.reference.as_deref(), Some("Shape"));
    assert!(circle.walk().any(|e| e.kind == EntityKind::Method && e.name == "area"));

    let shape = result.find(EntityKind::Class, "Shape").expect("class Shape");
    assert!(shape.walk().any(|e| e.kind == EntityKind::Method && e.name == "area"));

    assert!(result.find(EntityKind::Function, "total").is_some());
}

#[test]
fn test_typescript_structure() {
    let (_, result) = structure_sample("shapes.ts");

    let shape = result.find(EntityKind::Interface, "Shape").expect("interface Shape");
    assert!(shape.walk().any(|e| e.kind == EntityKind::Method && e.name == "area"));

    let color = result.find(EntityKind::Enum, "Color").expect("enum Color");
    let members: Vec<_> = color
        .walk()
        .filter(|e| e.kind == EntityKind::Enumerator)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(members, vec!["Red", "Green"]);

    assert!(result.find(EntityKind::Typedef, "Pair").is_some());

    let circle = result.find(EntityKind::Class, "Circle").expect("class Circle");
    assert_eq!(circle.reference.as_deref(), Some("Shape"));
    let area = circle.walk().find(|e| e.kind == EntityKind::Method && e.name == "area").expect("area()");
    assert_eq!(area.return_type.as_deref(), Some("number"));
    let radius = circle.walk().find(|e| e.kind == EntityKind::Field).expect("radius field");
    assert_eq!(radius.declared_type.as_deref(), Some("number"));

    let load = result.find(EntityKind::Function, "load").expect("function load");
    assert_eq!(load.return_type.as_deref(), Some("string"));
}

#[test]
fn test_tsx_uses_tsx_grammar() {
    let (profile, result) = structure_sample("badge.tsx");
    assert_eq!(profile.id(), "typescript");
    assert_eq!(profile.grammar_for_path(Path::new("badge.tsx")).id.as_str(), "tsx");

    let props = result.find(EntityKind::Interface, "BadgeProps").expect("interface BadgeProps");
    assert!(props.walk().any(|e| e.kind == EntityKind::Field && e.name == "label"));
    assert!(result.find(EntityKind::Function, "Badge").is_some());
}

#[test]
fn test_javascript_structure() {
    let (_, result) = structure_sample("shapes.js");

    let circle = result.find(EntityKind::Class, "Circle").expect("class Circle");
    let methods: Vec<_> = circle
        .walk()
        .filter(|e| e.kind == EntityKind::Method)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(methods, vec!["constructor", "area"]);
    assert!(circle.walk().any(|e| e.kind == EntityKind::Field && e.name == "radius"));

    assert!(result.find(EntityKind::Function, "describe").is_some());
    assert!(result.find(EntityKind::Function, "double").is_some());
    assert!(result.find(EntityKind::Variable, "double").is_none());
}
