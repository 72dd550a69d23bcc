//! Integration tests for name resolution over Java fixtures

use std::fs;
use std::path::Path;

use insta::assert_json_snapshot;
use jresolve_core::config::{self, ImplicitSupertypes};
use jresolve_core::parser::ParsedFile;
use jresolve_core::semantic::{Resolution, SemanticModel};
use jresolve_core::{Config, analyze_sources};
use tempfile::TempDir;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures/java");

fn read_fixture(relative_path: &str) -> String {
    let path = Path::new(FIXTURES_DIR).join(relative_path);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

fn build_semantic_model(paths: &[&str]) -> SemanticModel {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let units: Vec<_> = paths
        .iter()
        .map(|path| {
            let parsed = ParsedFile::from_source(*path, &read_fixture(path));
            assert!(parsed.errors().is_empty(), "syntax errors in {path}");
            parsed.into_unit()
        })
        .collect();
    SemanticModel::build_all(&units, &Config::default()).expect("model should build")
}

/// Qualified name of whatever the identifier at `line:column` of `unit`
/// binds to.
fn target(model: &SemanticModel, unit: usize, line: u32, column: u32) -> String {
    match model.resolve_reference(unit, line, column) {
        Some(Resolution::Resolved(id)) => model.qualified_name(id),
        other => panic!("{line}:{column} did not resolve: {other:?}"),
    }
}

fn binding_listing(model: &SemanticModel, unit: usize) -> Vec<String> {
    model
        .unit(unit)
        .unwrap()
        .bindings()
        .map(|(position, id)| format!("{} {}", position, model.qualified_name(id)))
        .collect()
}

#[test]
fn labels() {
    let model = build_semantic_model(&["references/Labels.java"]);

    let label_at = |line| model.find_symbol_at("label", line);
    let bound = |line, column| {
        model
            .resolve_reference(0, line, column)
            .and_then(Resolution::symbol)
    };
    assert_eq!(bound(8, 13), label_at(6));
    assert_eq!(bound(13, 16), label_at(11));
    assert_eq!(bound(18, 24), label_at(16));

    assert_json_snapshot!(binding_listing(&model, 0), @r#"
    [
      "7:12 Labels.method.i",
      "8:13 Labels.method.label",
      "13:16 Labels.method.label",
      "18:11 Labels.method.i",
      "18:24 Labels.method.label"
    ]
    "#);
}

#[test]
fn field_access() {
    let model = build_semantic_model(&["references/FieldAccess.java"]);
    let t = |line, column| target(&model, 0, line, column);

    assert_eq!(t(3, 27), "references.Superclass");
    assert_eq!(t(9, 5), "references.FieldAccess.field");
    assert_eq!(t(10, 5), "references.FieldAccess");
    assert_eq!(t(10, 22), "references.FieldAccess.field");
    assert_eq!(t(11, 5), "references");
    assert_eq!(t(11, 16), "references.FieldAccess");
    assert_eq!(t(11, 33), "references.FieldAccess.field");
    assert_eq!(t(13, 5), "references.FieldAccess.FirstStaticNestedClass");
    assert_eq!(
        t(13, 28),
        "references.FieldAccess.FirstStaticNestedClass.field_in_FirstStaticNestedClass"
    );
    assert_eq!(
        t(14, 28),
        "references.FieldAccess.FirstStaticNestedClass.SecondStaticNestedClass"
    );
    assert_eq!(
        t(14, 52),
        "references.FieldAccess.FirstStaticNestedClass.SecondStaticNestedClass.field_in_SecondStaticNestedClass"
    );
    assert_eq!(
        t(15, 11),
        "references.FieldAccess.FirstStaticNestedClass.field_in_FirstStaticNestedClass"
    );
    assert_eq!(t(16, 11), "references.Superclass.field_in_Superclass");
}

#[test]
fn references_match_anywhere_inside_the_identifier() {
    let model = build_semantic_model(&["references/FieldAccess.java"]);

    assert_eq!(target(&model, 0, 9, 9), "references.FieldAccess.field");
    assert_eq!(model.resolve_reference(0, 9, 10), None);
}

#[test]
fn method_parameter_access() {
    let model = build_semantic_model(&["references/MethodParameterAccess.java"]);

    assert_eq!(target(&model, 0, 7, 5), "MethodParameterAccess.method.param");
    assert_eq!(target(&model, 0, 8, 5), "MethodParameterAccess.method.param");
    assert_eq!(target(&model, 0, 8, 11), "MethodParameterAccess.field");

    let param = model.find_symbol("param").unwrap();
    assert_eq!(model.usages(param).len(), 2);
}

#[test]
fn expression_in_annotation() {
    let model = build_semantic_model(&["references/ExpressionInAnnotation.java"]);

    assert_eq!(model.resolve_reference(0, 3, 4), Some(Resolution::Absent));
    assert_eq!(target(&model, 0, 3, 21), "ExpressionInAnnotation");
    assert_eq!(target(&model, 0, 3, 44), "ExpressionInAnnotation.VALUE");
    assert_eq!(target(&model, 0, 10, 4), "ExpressionInAnnotation.Marker");
    assert_eq!(target(&model, 0, 10, 11), "ExpressionInAnnotation.Marker.value");

    // java.lang is imported implicitly but not part of the analysed units
    let unresolved: Vec<&str> = model
        .unit(0)
        .unwrap()
        .unresolved()
        .iter()
        .map(|u| u.name.as_str())
        .collect();
    assert!(unresolved.contains(&"SuppressWarnings"));
    assert!(unresolved.contains(&"String"));
}

#[test]
fn method_call_reaches_enclosing_type() {
    let model = build_semantic_model(&["references/MethodCall.java"]);

    assert_eq!(target(&model, 0, 11, 7), "MethodCall.target");
    assert_eq!(target(&model, 0, 12, 7), "MethodCall.Nested.other");
    assert_eq!(target(&model, 0, 13, 12), "MethodCall.Nested.other");
}

#[test]
fn anonymous_class_sees_instantiated_type_members() {
    let model = build_semantic_model(&["declarations/AnonymousClassDeclaration.java"]);

    assert_eq!(
        target(&model, 0, 6, 9),
        "AnonymousClassDeclaration.Superclass.helper"
    );
}

#[test]
fn imports_across_units() {
    let model = build_semantic_model(&["multi/lib/Base.java", "multi/app/Main.java"]);
    let t = |line, column| target(&model, 1, line, column);

    assert_eq!(t(3, 8), "lib");
    assert_eq!(t(3, 12), "lib.Base");
    assert_eq!(t(4, 15), "lib");
    assert_eq!(t(4, 19), "lib.Base");
    assert_eq!(t(4, 24), "lib.Base.twice");
    assert_eq!(t(9, 3), "lib.Base");
    assert_eq!(t(9, 19), "lib.Base");
    assert_eq!(t(12, 5), "app.Main.base");
    assert_eq!(t(12, 10), "lib.Base.counter");
    assert_eq!(t(12, 20), "lib.Base.twice");
    assert_eq!(t(12, 26), "lib.Base.LIMIT");
    assert_eq!(t(13, 12), "app.Main.base");
    assert_eq!(t(13, 17), "lib.Base.counter");

    let counter = model.find_symbol("counter").unwrap();
    assert!(model.usages(counter).iter().all(|usage| usage.unit == 1));
    assert_eq!(model.usages(counter).len(), 2);
}

#[test]
fn config_file_enables_language_defaults() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("src");
    fs::create_dir(&nested).unwrap();
    fs::write(
        dir.path().join(config::CONFIG_FILENAME),
        "[hierarchy]\nimplicit_supertypes = \"language-defaults\"\n\n[resolution]\nparallel = false\n",
    )
    .unwrap();

    let path = config::find_config_file(&nested).expect("config should be found upwards");
    let config = config::load_config(&path).unwrap();
    assert_eq!(
        config.hierarchy.implicit_supertypes,
        ImplicitSupertypes::LanguageDefaults
    );
    assert!(!config.resolution.parallel);

    let object = "package java.lang;\n\npublic class Object {\n  public int hashCode() {\n    return 0;\n  }\n}\n";
    let plain = "class Plain {\n  int run() {\n    return hashCode();\n  }\n}\n";
    let model = analyze_sources(
        [("java/lang/Object.java", object), ("Plain.java", plain)],
        &config,
    )
    .unwrap();

    let plain_type = model.find_symbol("Plain").unwrap();
    let object_type = model.find_symbol("Object").unwrap();
    assert_eq!(model.symbol(plain_type).superclass(), Some(object_type));
    assert_eq!(model.symbol(object_type).superclass(), None);
    assert_eq!(target(&model, 1, 3, 12), "java.lang.Object.hashCode");
}

#[test]
fn absent_policy_leaves_object_members_unreachable() {
    let object = "package java.lang;\n\npublic class Object {\n  public int hashCode() {\n    return 0;\n  }\n}\n";
    let plain = "class Plain {\n  int run() {\n    return hashCode();\n  }\n}\n";
    let model = analyze_sources(
        [("java/lang/Object.java", object), ("Plain.java", plain)],
        &Config::default(),
    )
    .unwrap();

    assert_eq!(model.resolve_reference(1, 3, 12), Some(Resolution::Absent));
}

#[test]
fn inherited_members_shadow_enclosing_scopes() {
    let model = build_semantic_model(&["references/InheritedShadowing.java"]);
    let outer_field = model.find_symbol_at("x", 2).unwrap();
    let local = model.find_symbol_at("x", 15).unwrap();

    assert_eq!(target(&model, 0, 10, 7), "InheritedShadowing.Base.x");
    assert_eq!(target(&model, 0, 18, 9), "InheritedShadowing.Base.x");
    assert!(model.usages(outer_field).is_empty());
    assert!(model.usages(local).is_empty());
}

#[test]
fn private_member_types_are_not_inherited() {
    let model = build_semantic_model(&["references/Accessibility.java"]);
    let outer_member = model.find_symbol_at("Member", 3).unwrap();
    let other_member = model.find_symbol_at("Member", 17).unwrap();
    let first_target = model.find_symbol_at("Target", 12).unwrap();
    let second_target = model.find_symbol_at("Target", 22).unwrap();

    assert_eq!(model.symbol(first_target).superclass(), Some(outer_member));
    assert_eq!(model.symbol(second_target).superclass(), Some(other_member));
    assert_eq!(target(&model, 0, 12, 26), "Accessibility.Member");
    assert_eq!(target(&model, 0, 22, 26), "Accessibility.OtherSuperclass.Member");
}

#[test]
fn usages_resolve_back_to_their_symbol() {
    let model = build_semantic_model(&["smoke/ScopesAndSymbols.java"]);
    let total = model.find_symbol("total").unwrap();

    assert_eq!(model.usages(total).len(), 5);
    for usage in model.usages(total) {
        let first = model.resolve_reference(usage.unit, usage.position.line, usage.position.column);
        let again = model.resolve_reference(usage.unit, usage.position.line, usage.position.column);
        assert_eq!(first, Some(Resolution::Resolved(total)));
        assert_eq!(first, again);
    }
}

#[test]
fn statement_scopes_and_records() {
    let model = build_semantic_model(&["smoke/ScopesAndSymbols.java"]);
    let t = |line, column| target(&model, 0, line, column);
    let bound = |line, column| {
        model
            .resolve_reference(0, line, column)
            .and_then(Resolution::symbol)
    };

    // record components
    assert_eq!(t(5, 12), "smoke.Point.x");
    assert_eq!(t(5, 16), "smoke.Point.y");
    assert_eq!(t(33, 24), "smoke.Point.x");
    assert_eq!(t(30, 24), "smoke.Point.sum");

    // for loops
    assert_eq!(bound(23, 16), model.find_symbol_at("i", 22));
    assert_eq!(bound(26, 16), model.find_symbol_at("item", 25));

    // switch on an enum
    assert_eq!(t(28, 13), "smoke.ScopesAndSymbols.color");
    assert_eq!(t(29, 12), "smoke.Color.RED");

    // try-with-resources and catch
    assert_eq!(t(35, 31), "smoke.ScopesAndSymbols.run.resource");
    assert_eq!(bound(36, 21), model.find_symbol_at("held", 35));
    assert_eq!(bound(38, 7), model.find_symbol_at("failure", 37));

    // lambdas
    let lambda_param = model.find_symbol_at("value", 40);
    assert_ne!(lambda_param, model.find_symbol_at("value", 14));
    assert_eq!(bound(40, 29), lambda_param);
    assert_eq!(t(41, 18), "smoke.Action.apply");

    let unresolved: Vec<&str> = model
        .unit(0)
        .unwrap()
        .unresolved()
        .iter()
        .map(|u| u.name.as_str())
        .collect();
    assert!(unresolved.contains(&"AutoCloseable"));
    assert!(unresolved.contains(&"Exception"));
}
