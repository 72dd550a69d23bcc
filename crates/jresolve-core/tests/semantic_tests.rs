//! Integration tests for declarations and the type hierarchy
//!
//! Each test builds a model from a Java fixture and checks owners, flags
//! and completed supertypes of the declared symbols.

use std::fs;
use std::path::Path;

use insta::assert_json_snapshot;
use jresolve_core::config::{Config, ImplicitSupertypes};
use jresolve_core::parser::ParsedFile;
use jresolve_core::semantic::{Flags, SemanticModel, SymbolId};
use tracing_subscriber::EnvFilter;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures/java");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn read_fixture(relative_path: &str) -> String {
    let path = Path::new(FIXTURES_DIR).join(relative_path);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

struct Fixture {
    model: SemanticModel,
}

impl Fixture {
    fn load(relative_path: &str) -> Self {
        Self::load_with(relative_path, &Config::default())
    }

    fn load_with(relative_path: &str, config: &Config) -> Self {
        init_tracing();
        let parsed = ParsedFile::from_source(relative_path, &read_fixture(relative_path));
        assert!(parsed.errors().is_empty(), "syntax errors: {:?}", parsed.errors());
        let model = SemanticModel::build_all(std::slice::from_ref(parsed.unit()), config)
            .expect("model should build");
        Self { model }
    }

    fn symbol(&self, name: &str) -> SymbolId {
        self.model
            .find_symbol(name)
            .unwrap_or_else(|| panic!("no symbol named {name}"))
    }

    fn symbol_at(&self, name: &str, line: u32) -> SymbolId {
        self.model
            .find_symbol_at(name, line)
            .unwrap_or_else(|| panic!("no symbol named {name} at line {line}"))
    }

    fn flags(&self, name: &str) -> Flags {
        self.model.symbol(self.symbol(name)).flags()
    }

    /// `qualified.name [flag|flag]` for every symbol below the package.
    fn flag_listing(&self) -> Vec<String> {
        self.model
            .symbols()
            .all_symbols()
            .filter(|s| s.owner.is_some())
            .map(|s| {
                let flags: Vec<String> = s
                    .flags
                    .iter_names()
                    .map(|(name, _)| name.to_ascii_lowercase())
                    .collect();
                format!("{} [{}]", self.model.qualified_name(s.id), flags.join("|"))
            })
            .collect()
    }
}

#[test]
fn class_declaration() {
    let f = Fixture::load("declarations/ClassDeclaration.java");
    let declaration = f.model.symbol(f.symbol("Declaration"));

    assert_eq!(declaration.owner(), Some(f.symbol("ClassDeclaration")));
    assert_eq!(declaration.flags(), Flags::PRIVATE);
    assert_eq!(declaration.superclass(), Some(f.symbol("Superclass")));
    assert_eq!(
        declaration.interfaces(),
        vec![f.symbol("FirstInterface"), f.symbol("SecondInterface")]
    );
    assert_eq!(
        f.model.qualified_name(declaration.id),
        "declarations.ClassDeclaration.Declaration"
    );

    let superclass = f.model.symbol(f.symbol("Superclass"));
    assert_eq!(superclass.superclass(), None);
    assert!(superclass.interfaces().is_empty());
}

#[test]
fn anonymous_class_declaration() {
    let f = Fixture::load("declarations/AnonymousClassDeclaration.java");
    let anonymous = f
        .model
        .symbol(f.symbol("methodInAnonymousClass"))
        .owner()
        .expect("method should be owned by the anonymous class");
    let anonymous = f.model.symbol(anonymous);

    assert_eq!(anonymous.owner(), Some(f.symbol("method")));
    assert_eq!(anonymous.flags(), Flags::empty());
    assert_eq!(anonymous.name(), "");
    assert_eq!(anonymous.superclass(), None);
    assert!(anonymous.interfaces().is_empty());
    assert_eq!(anonymous.instantiated_type(), Some(f.symbol("Superclass")));
}

#[test]
fn anonymous_class_extends_instantiated_type_with_language_defaults() {
    let mut config = Config::default();
    config.hierarchy.implicit_supertypes = ImplicitSupertypes::LanguageDefaults;
    let f = Fixture::load_with("declarations/AnonymousClassDeclaration.java", &config);

    let anonymous = f
        .model
        .symbol(f.symbol("methodInAnonymousClass"))
        .owner()
        .unwrap();
    assert_eq!(
        f.model.symbol(anonymous).superclass(),
        Some(f.symbol("Superclass"))
    );
}

#[test]
fn local_class_declaration() {
    let f = Fixture::load("declarations/LocalClassDeclaration.java");
    let superclass_of = |line| f.model.symbol(f.symbol_at("Declaration", line)).superclass();

    // a local class declared later in the block is not visible yet
    assert_eq!(superclass_of(4), Some(f.symbol_at("Superclass", 9)));
    assert_eq!(superclass_of(13), Some(f.symbol_at("Superclass", 9)));
    assert_eq!(superclass_of(22), Some(f.symbol_at("Superclass", 20)));
    assert_eq!(superclass_of(25), Some(f.symbol_at("Superclass", 9)));
}

#[test]
fn local_classes_are_owned_by_their_method() {
    let f = Fixture::load("declarations/LocalClassDeclaration.java");
    let declaration = f.model.symbol(f.symbol_at("Declaration", 22));

    assert_eq!(declaration.owner(), Some(f.symbol("method3")));
    assert_eq!(
        f.model.qualified_name(declaration.id),
        "LocalClassDeclaration.method3.Declaration"
    );
}

#[test]
fn interface_declaration() {
    let f = Fixture::load("declarations/InterfaceDeclaration.java");
    let declaration = f.model.symbol(f.symbol("Declaration"));

    assert_eq!(declaration.owner(), Some(f.symbol("InterfaceDeclaration")));
    assert_eq!(declaration.flags(), Flags::PRIVATE | Flags::INTERFACE);
    assert_eq!(declaration.superclass(), None);
    assert_eq!(
        declaration.interfaces(),
        vec![f.symbol("FirstInterface"), f.symbol("SecondInterface")]
    );
    assert_eq!(f.flags("method").access(), Flags::PUBLIC);
}

#[test]
fn interface_member_flags() {
    let f = Fixture::load("declarations/InterfaceDeclaration.java");

    assert_json_snapshot!(f.flag_listing(), @r#"
    [
      "InterfaceDeclaration []",
      "InterfaceDeclaration.Declaration [private|interface]",
      "InterfaceDeclaration.Declaration.FIRST_CONSTANT [public]",
      "InterfaceDeclaration.Declaration.SECOND_CONSTANT [public]",
      "InterfaceDeclaration.Declaration.method [public]",
      "InterfaceDeclaration.Declaration.NestedClass [public]",
      "InterfaceDeclaration.Declaration.NestedInterface [public|interface]",
      "InterfaceDeclaration.Declaration.NestedEnum [public|enum]",
      "InterfaceDeclaration.FirstInterface [private|interface]",
      "InterfaceDeclaration.SecondInterface [private|interface]"
    ]
    "#);
}

#[test]
fn enum_declaration() {
    let f = Fixture::load("declarations/EnumDeclaration.java");
    let declaration = f.model.symbol(f.symbol("Declaration"));

    assert_eq!(declaration.owner(), Some(f.symbol("EnumDeclaration")));
    assert_eq!(declaration.flags(), Flags::PRIVATE | Flags::ENUM);
    assert_eq!(declaration.superclass(), None);
    assert_eq!(
        declaration.interfaces(),
        vec![f.symbol("FirstInterface"), f.symbol("SecondInterface")]
    );
    assert_eq!(f.flags("FIRST_CONSTANT"), Flags::PUBLIC | Flags::ENUM);
    assert_eq!(f.flags("SECOND_CONSTANT"), Flags::PUBLIC | Flags::ENUM);

    let constant = f.model.symbol(f.symbol("FIRST_CONSTANT"));
    assert_eq!(constant.declared_type(), Some(declaration.id));
}

#[test]
fn enum_constant_body_is_owned_by_the_constant() {
    let f = Fixture::load("declarations/EnumDeclaration.java");
    let body = f
        .model
        .symbol(f.symbol("specialized"))
        .owner()
        .expect("method should be owned by the constant body");
    let body = f.model.symbol(body);

    assert_eq!(body.owner(), Some(f.symbol("SECOND_CONSTANT")));
    assert_eq!(body.instantiated_type(), Some(f.symbol("Declaration")));
}

#[test]
fn annotation_type_declaration() {
    let f = Fixture::load("declarations/AnnotationTypeDeclaration.java");
    let declaration = f.model.symbol(f.symbol("Declaration"));

    assert_eq!(declaration.owner(), Some(f.symbol("AnnotationTypeDeclaration")));
    assert_eq!(
        declaration.flags(),
        Flags::PRIVATE | Flags::INTERFACE | Flags::ANNOTATION
    );
    assert_eq!(declaration.superclass(), None);
    assert!(declaration.interfaces().is_empty());

    assert_eq!(f.flags("FIRST_CONSTANT"), Flags::PUBLIC);
    assert_eq!(f.flags("SECOND_CONSTANT"), Flags::PUBLIC);
    assert_eq!(f.flags("value"), Flags::PUBLIC);
    assert_eq!(f.flags("NestedClass"), Flags::PUBLIC);
    assert_eq!(f.flags("NestedInterface"), Flags::PUBLIC | Flags::INTERFACE);
    assert_eq!(f.flags("NestedEnum"), Flags::PUBLIC | Flags::ENUM);
    assert_eq!(
        f.flags("NestedAnnotationType"),
        Flags::PUBLIC | Flags::INTERFACE | Flags::ANNOTATION
    );
}

#[test]
fn complete_hierarchy_of_types() {
    let f = Fixture::load("CompleteHierarchyOfTypes.java");
    let foo = f.model.symbol(f.symbol("Foo"));

    assert_eq!(foo.superclass(), Some(f.symbol("Baz")));
}

#[test]
fn scope_tree_mirrors_nesting() {
    let f = Fixture::load("declarations/LocalClassDeclaration.java");
    let unit = f.model.unit(0).unwrap();
    let snapshot = f.model.snapshot();

    assert_eq!(snapshot.units.len(), 1);
    assert_eq!(snapshot.units[0].file, unit.filename);
    let class_scope = &snapshot.units[0].scopes.children[0];
    assert_eq!(
        class_scope.symbols,
        ["method1", "Superclass", "method2", "method3"]
    );
}

#[test]
fn multiple_units_share_packages() {
    init_tracing();
    let units: Vec<_> = ["multi/lib/Base.java", "multi/app/Main.java"]
        .into_iter()
        .map(|path| ParsedFile::from_source(path, &read_fixture(path)).into_unit())
        .collect();
    let model = SemanticModel::build_all(&units, &Config::default()).unwrap();

    let base = model.find_symbol("Base").unwrap();
    let main = model.unit(1).unwrap();
    assert_eq!(model.qualified_name(main.package), "app");
    assert_eq!(main.imports[0].target, Some(base));
    assert_eq!(main.imports[1].target, Some(base));
    assert_eq!(main.imports[2].target, Some(base));

    let field = model.find_symbol("base").unwrap();
    assert_eq!(model.symbol(field).declared_type(), Some(base));
}
