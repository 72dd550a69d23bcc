//! Name lookup over the symbol graph
//!
//! Read-only search shared by the hierarchy and name-resolution passes:
//! lexical scope chain, inherited members, imports and packages.

use std::collections::HashSet;

use super::flags::Flags;
use super::model::UnitModel;
use super::scope::{ScopeId, ScopeKind, ScopeTree};
use super::symbols::{MethodKind, Symbol, SymbolId, SymbolKind, SymbolTable, TypeKind};
use crate::syntax::Position;

/// The kind of declaration a name occurrence may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Variable,
    Type,
    Method,
    Label,
    Package,
}

impl NameKind {
    pub fn accepts(self, symbol: &Symbol) -> bool {
        match (self, &symbol.kind) {
            (NameKind::Variable, SymbolKind::Variable { .. }) => true,
            (NameKind::Type, SymbolKind::Type { .. }) => !symbol.name.is_empty(),
            (NameKind::Method, SymbolKind::Method { kind, .. }) => {
                matches!(kind, MethodKind::Method | MethodKind::AnnotationElement)
            }
            (NameKind::Label, SymbolKind::Label) => true,
            (NameKind::Package, SymbolKind::Package { .. }) => true,
            _ => false,
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Lookup<'a> {
    pub scopes: &'a ScopeTree,
    pub symbols: &'a SymbolTable,
    pub units: &'a [UnitModel],
    pub root_package: SymbolId,
    pub implicit_imports: &'a [SymbolId],
}

impl<'a> Lookup<'a> {
    /// Declaration of `name` entered directly in `scope` and visible at
    /// `position`. In ordered scopes the closest preceding declaration wins.
    pub fn in_scope(
        &self,
        scope: ScopeId,
        name: &str,
        kind: NameKind,
        position: Position,
    ) -> Option<SymbolId> {
        let mut candidates = self
            .symbols
            .named(scope, name)
            .iter()
            .copied()
            .filter(|&id| kind.accepts(self.symbols.get(id)));

        if self.scopes.get(scope).kind.is_ordered() {
            candidates
                .filter(|&id| self.symbols.get(id).position <= position)
                .last()
        } else {
            candidates.next()
        }
    }

    /// Walks the scope chain from `start` outward. At each type scope the
    /// members the type inherits are searched before the enclosing scopes.
    pub fn lexical(
        &self,
        start: ScopeId,
        name: &str,
        kind: NameKind,
        position: Position,
    ) -> Option<SymbolId> {
        self.scopes.ancestors(start).find_map(|scope| {
            self.in_scope(scope.id, name, kind, position)
                .or_else(|| match (scope.kind, scope.owner) {
                    (ScopeKind::Type, Some(owner)) if kind != NameKind::Label => {
                        self.member(owner, name, kind)
                    }
                    _ => None,
                })
        })
    }

    /// Type symbols whose member scope encloses `start`, innermost first.
    pub fn enclosing_types(&self, start: ScopeId) -> impl Iterator<Item = SymbolId> + 'a {
        self.scopes
            .ancestors(start)
            .filter(|scope| scope.kind == ScopeKind::Type)
            .filter_map(|scope| scope.owner)
    }

    /// Direct supertypes: the superclass (or the instantiated type of an
    /// anonymous class) followed by the interfaces in declaration order.
    pub fn supertypes(&self, ty: SymbolId) -> Vec<SymbolId> {
        let symbol = self.symbols.get(ty);
        let mut out = Vec::new();
        if let Some(parent) = symbol.superclass().or_else(|| symbol.instantiated_type()) {
            out.push(parent);
        }
        out.extend(symbol.interfaces());
        out
    }

    /// Member of `ty` named `name`: own members, then the superclass chain,
    /// then the interfaces, depth first. Private members of supertypes are
    /// not inherited.
    pub fn member(&self, ty: SymbolId, name: &str, kind: NameKind) -> Option<SymbolId> {
        let mut visited = HashSet::new();
        self.member_in(ty, name, kind, false, &mut visited)
    }

    fn member_in(
        &self,
        ty: SymbolId,
        name: &str,
        kind: NameKind,
        inherited: bool,
        visited: &mut HashSet<SymbolId>,
    ) -> Option<SymbolId> {
        if !visited.insert(ty) {
            return None;
        }

        let symbol = self.symbols.get(ty);
        let SymbolKind::Type { members, .. } = symbol.kind else {
            return None;
        };

        let own = self
            .symbols
            .named(members, name)
            .iter()
            .copied()
            .find(|&id| {
                let member = self.symbols.get(id);
                kind.accepts(member)
                    && member.type_kind() != Some(TypeKind::TypeParameter)
                    && !(inherited && member.flags.contains(Flags::PRIVATE))
            });
        if own.is_some() {
            return own;
        }

        self.supertypes(ty)
            .into_iter()
            .find_map(|parent| self.member_in(parent, name, kind, true, visited))
    }

    pub fn package_member(&self, package: SymbolId, name: &str, kind: NameKind) -> Option<SymbolId> {
        let SymbolKind::Package { members } = self.symbols.get(package).kind else {
            return None;
        };
        self.symbols
            .named(members, name)
            .iter()
            .copied()
            .find(|&id| kind.accepts(self.symbols.get(id)))
    }

    /// Resolves a bare name at `position`: the scope chain including the
    /// members each enclosing type inherits, then imports.
    pub fn simple_name(
        &self,
        unit: usize,
        start: ScopeId,
        name: &str,
        kind: NameKind,
        position: Position,
    ) -> Option<SymbolId> {
        if kind == NameKind::Package {
            return self.package_member(self.root_package, name, NameKind::Package);
        }

        if let Some(found) = self.lexical(start, name, kind, position) {
            return Some(found);
        }
        if kind == NameKind::Label {
            return None;
        }

        self.imported(unit, name, kind)
    }

    fn imported(&self, unit: usize, name: &str, kind: NameKind) -> Option<SymbolId> {
        let unit = self.units.get(unit)?;

        let static_single = unit
            .imports
            .iter()
            .filter(|import| import.is_static && !import.on_demand)
            .filter(|import| import.name.last().is_some_and(|last| last.name == name))
            .filter_map(|import| import.target)
            .find_map(|ty| self.member(ty, name, kind));
        if static_single.is_some() {
            return static_single;
        }

        let static_on_demand = unit
            .imports
            .iter()
            .filter(|import| import.is_static && import.on_demand)
            .filter_map(|import| import.target)
            .find_map(|ty| self.member(ty, name, kind));
        if static_on_demand.is_some() || kind != NameKind::Type {
            return static_on_demand;
        }

        unit.imports
            .iter()
            .filter(|import| !import.is_static && import.on_demand)
            .filter_map(|import| import.target)
            .chain(self.implicit_imports.iter().copied())
            .find_map(|target| self.qualified_member(target, name, NameKind::Type))
    }

    /// Member named `name` of a package or a type.
    pub fn qualified_member(&self, container: SymbolId, name: &str, kind: NameKind) -> Option<SymbolId> {
        match self.symbols.get(container).kind {
            SymbolKind::Package { .. } => self.package_member(container, name, kind),
            SymbolKind::Type { .. } => self.member(container, name, kind),
            _ => None,
        }
    }

    /// First segment of a type name: a type visible from `start`, else a
    /// top-level package.
    pub fn type_name_head(
        &self,
        unit: usize,
        start: ScopeId,
        name: &str,
        position: Position,
    ) -> Option<SymbolId> {
        self.simple_name(unit, start, name, NameKind::Type, position)
            .or_else(|| self.package_member(self.root_package, name, NameKind::Package))
    }

    /// Next segment of a type name after `previous`: a member type, a type
    /// in the package, or a sub-package.
    pub fn type_name_step(&self, previous: SymbolId, name: &str) -> Option<SymbolId> {
        self.qualified_member(previous, name, NameKind::Type).or_else(|| {
            self.symbols
                .get(previous)
                .is_package()
                .then(|| self.package_member(previous, name, NameKind::Package))
                .flatten()
        })
    }

    /// Fully qualified name starting at the root package.
    pub fn absolute<'n>(&self, segments: impl IntoIterator<Item = &'n str>) -> Option<SymbolId> {
        segments
            .into_iter()
            .try_fold(self.root_package, |previous, segment| {
                self.type_name_step(previous, segment)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::parser::ParsedFile;
    use crate::semantic::model::SemanticModel;

    fn build(sources: &[&str]) -> SemanticModel {
        let units: Vec<_> = sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                ParsedFile::from_source(&format!("Unit{}.java", i), source)
                    .unit()
                    .clone()
            })
            .collect();
        SemanticModel::build_all(&units, &Config::default()).unwrap()
    }

    fn lookup(model: &SemanticModel) -> Lookup<'_> {
        Lookup {
            scopes: model.scopes(),
            symbols: model.symbols(),
            units: model.units(),
            root_package: model.root_package(),
            implicit_imports: &[],
        }
    }

    #[test]
    fn accepts_only_matching_kinds() {
        let model = build(&["class A { int f; void m() {} A() {} }"]);
        let f = model.find_symbol("f").unwrap();
        let m = model.find_symbol("m").unwrap();
        let ctor = model.find_symbol("<init>").unwrap();

        assert!(NameKind::Variable.accepts(model.symbol(f)));
        assert!(!NameKind::Method.accepts(model.symbol(f)));
        assert!(NameKind::Method.accepts(model.symbol(m)));
        assert!(!NameKind::Method.accepts(model.symbol(ctor)));
    }

    #[test]
    fn member_prefers_superclass_before_interfaces() {
        let model = build(&[r#"
interface I { int x = 1; }
class S { int x; }
class C extends S implements I {}
"#]);
        let lookup = lookup(&model);
        let c = model.find_symbol("C").unwrap();
        let s = model.find_symbol("S").unwrap();

        let x = lookup.member(c, "x", NameKind::Variable).unwrap();
        assert_eq!(model.symbol(x).owner(), Some(s));
    }

    #[test]
    fn member_lookup_survives_cycles() {
        let model = build(&["class A extends B {} class B extends A {}"]);
        let lookup = lookup(&model);
        let a = model.find_symbol("A").unwrap();

        assert_eq!(lookup.member(a, "missing", NameKind::Variable), None);
    }

    #[test]
    fn absolute_names_walk_packages_and_types() {
        let model = build(&["package p.q; class Outer { class Inner {} }"]);
        let lookup = lookup(&model);
        let inner = model.find_symbol("Inner").unwrap();

        assert_eq!(lookup.absolute(["p", "q", "Outer", "Inner"]), Some(inner));
        assert_eq!(lookup.absolute(["p", "missing"]), None);
    }
}
