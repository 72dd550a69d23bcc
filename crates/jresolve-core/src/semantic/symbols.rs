//! Symbol graph for declarations and their ownership
//!
//! Symbols are stored in an arena. Each symbol records the symbol owning it
//! and the scope it is declared in; per-scope indexes keep declaration
//! order and support lookup by name.

use std::collections::HashMap;

use id_arena::{Arena, Id};
use serde::Serialize;

use super::BuildError;
use super::flags::Flags;
use super::scope::{ScopeId, ScopeTree};
use crate::syntax::{Position, Span};

pub type SymbolId = Id<Symbol>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
    TypeParameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MethodKind {
    Method,
    Constructor,
    StaticInitializer,
    InstanceInitializer,
    AnnotationElement,
}

impl MethodKind {
    pub const CONSTRUCTOR_NAME: &'static str = "<init>";
    pub const STATIC_INITIALIZER_NAME: &'static str = "<clinit>";
    pub const INSTANCE_INITIALIZER_NAME: &'static str = "<instinit>";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VariableKind {
    Field,
    EnumConstant,
    Parameter,
    Local,
    Resource,
    CatchParameter,
    PatternBinding,
}

/// Outcome of resolving a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Pending,
    Resolved(SymbolId),
    Absent,
}

impl Resolution {
    pub fn symbol(self) -> Option<SymbolId> {
        match self {
            Resolution::Resolved(id) => Some(id),
            Resolution::Pending | Resolution::Absent => None,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Resolution::Pending)
    }
}

/// A type as written at a declaration site, with what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Dotted name without type arguments; empty for primitives, arrays and
    /// inferred types, which never resolve.
    pub name: String,
    pub position: Position,
    pub resolution: Resolution,
}

impl TypeRef {
    pub fn pending(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
            resolution: Resolution::Pending,
        }
    }

    pub fn absent(position: Position) -> Self {
        Self {
            name: String::new(),
            position,
            resolution: Resolution::Absent,
        }
    }

    pub fn resolved(name: impl Into<String>, position: Position, id: SymbolId) -> Self {
        Self {
            name: name.into(),
            position,
            resolution: Resolution::Resolved(id),
        }
    }

    pub fn symbol(&self) -> Option<SymbolId> {
        self.resolution.symbol()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Incomplete,
    InProgress,
    Complete,
}

#[derive(Debug, Clone)]
pub enum SymbolKind {
    Package {
        members: ScopeId,
    },
    Type {
        kind: TypeKind,
        members: ScopeId,
        superclass: Option<TypeRef>,
        interfaces: Vec<TypeRef>,
        /// Type named in the `new` expression of an anonymous class.
        instantiated: Option<TypeRef>,
        completion: Completion,
    },
    Method {
        kind: MethodKind,
        return_type: Option<TypeRef>,
        params: ScopeId,
    },
    Variable {
        kind: VariableKind,
        declared_type: TypeRef,
    },
    Label,
}

/// A resolved occurrence of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Usage {
    pub unit: usize,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub owner: Option<SymbolId>,
    pub flags: Flags,
    pub position: Position,
    pub span: Span,
    /// Scope the symbol is declared in; `None` for the root package.
    pub scope: Option<ScopeId>,
    /// Compilation unit of the declaration; `None` for packages.
    pub unit: Option<usize>,
    pub kind: SymbolKind,
    pub references: Vec<Usage>,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<SymbolId> {
        self.owner
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }

    pub fn is_package(&self) -> bool {
        matches!(self.kind, SymbolKind::Package { .. })
    }

    pub fn is_type(&self) -> bool {
        matches!(self.kind, SymbolKind::Type { .. })
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, SymbolKind::Method { .. })
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable { .. })
    }

    pub fn is_label(&self) -> bool {
        matches!(self.kind, SymbolKind::Label)
    }

    pub fn type_kind(&self) -> Option<TypeKind> {
        match self.kind {
            SymbolKind::Type { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(
            self.type_kind(),
            Some(TypeKind::Interface | TypeKind::Annotation)
        )
    }

    /// Scope holding the members of a package or type, or the parameters
    /// of a method.
    pub fn members_scope(&self) -> Option<ScopeId> {
        match self.kind {
            SymbolKind::Package { members } | SymbolKind::Type { members, .. } => Some(members),
            SymbolKind::Method { params, .. } => Some(params),
            SymbolKind::Variable { .. } | SymbolKind::Label => None,
        }
    }

    pub fn superclass(&self) -> Option<SymbolId> {
        match &self.kind {
            SymbolKind::Type { superclass, .. } => superclass.as_ref().and_then(TypeRef::symbol),
            _ => None,
        }
    }

    pub fn interfaces(&self) -> Vec<SymbolId> {
        match &self.kind {
            SymbolKind::Type { interfaces, .. } => {
                interfaces.iter().filter_map(TypeRef::symbol).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn instantiated_type(&self) -> Option<SymbolId> {
        match &self.kind {
            SymbolKind::Type { instantiated, .. } => {
                instantiated.as_ref().and_then(TypeRef::symbol)
            }
            _ => None,
        }
    }

    pub fn declared_type(&self) -> Option<SymbolId> {
        match &self.kind {
            SymbolKind::Variable { declared_type, .. } => declared_type.symbol(),
            _ => None,
        }
    }

    pub fn return_type(&self) -> Option<SymbolId> {
        match &self.kind {
            SymbolKind::Method { return_type, .. } => return_type.as_ref().and_then(TypeRef::symbol),
            _ => None,
        }
    }

    /// Type an expression naming this symbol evaluates to.
    pub fn static_type(&self) -> Option<SymbolId> {
        match &self.kind {
            SymbolKind::Variable { .. } => self.declared_type(),
            SymbolKind::Method { .. } => self.return_type(),
            SymbolKind::Type { .. } => Some(self.id),
            SymbolKind::Package { .. } | SymbolKind::Label => None,
        }
    }

    pub fn usages(&self) -> &[Usage] {
        &self.references
    }
}

/// Everything needed to add a symbol to the table.
#[derive(Debug, Clone)]
pub struct Declaration<'a> {
    pub name: &'a str,
    pub kind: SymbolKind,
    pub owner: Option<SymbolId>,
    pub flags: Flags,
    pub scope: Option<ScopeId>,
    pub unit: Option<usize>,
    pub position: Position,
    pub span: Span,
}

#[derive(Debug, Default)]
struct ScopeEntries {
    ordered: Vec<SymbolId>,
    by_name: HashMap<String, Vec<SymbolId>>,
}

#[derive(Debug, Clone)]
pub struct UnresolvedReference {
    pub name: String,
    pub position: Position,
    pub scope: ScopeId,
}

pub struct SymbolTable {
    arena: Arena<Symbol>,
    by_scope: HashMap<ScopeId, ScopeEntries>,
    by_position: HashMap<(usize, Position), SymbolId>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            by_scope: HashMap::new(),
            by_position: HashMap::new(),
        }
    }

    pub fn declare(&mut self, decl: Declaration<'_>) -> SymbolId {
        let id = self.arena.alloc_with_id(|id| Symbol {
            id,
            name: decl.name.to_string(),
            owner: decl.owner,
            flags: decl.flags,
            position: decl.position,
            span: decl.span,
            scope: decl.scope,
            unit: decl.unit,
            kind: decl.kind,
            references: Vec::new(),
        });

        // anonymous types are never looked up by name
        if let Some(scope) = decl.scope.filter(|_| !decl.name.is_empty()) {
            self.enter(scope, decl.name, id);
        }
        if let Some(unit) = decl.unit {
            self.by_position.insert((unit, decl.position), id);
        }

        id
    }

    /// Makes `id` visible under `name` in `scope` without changing where it
    /// is declared. Used for single-type imports.
    pub fn enter(&mut self, scope: ScopeId, name: &str, id: SymbolId) {
        let entries = self.by_scope.entry(scope).or_default();
        entries.ordered.push(id);
        entries
            .by_name
            .entry(name.to_string())
            .or_default()
            .push(id);
    }

    /// First symbol named `name` found walking from `scope` outward,
    /// regardless of kind or declaration order.
    pub fn lookup(&self, name: &str, scope: ScopeId, scope_tree: &ScopeTree) -> Option<SymbolId> {
        if let Some(&id) = self.named(scope, name).first() {
            return Some(id);
        }

        if let Some(parent) = scope_tree.get(scope).parent {
            return self.lookup(name, parent, scope_tree);
        }

        None
    }

    /// Symbols named `name` entered in `scope`, in declaration order.
    pub fn named(&self, scope: ScopeId, name: &str) -> &[SymbolId] {
        self.by_scope
            .get(&scope)
            .and_then(|entries| entries.by_name.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn at_position(&self, unit: usize, position: Position) -> Option<SymbolId> {
        self.by_position.get(&(unit, position)).copied()
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.arena[id]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.arena[id]
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    pub fn add_reference(&mut self, symbol_id: SymbolId, usage: Usage) {
        self.arena[symbol_id].references.push(usage);
    }

    pub fn symbols_in_scope(&self, scope: ScopeId) -> impl Iterator<Item = &Symbol> {
        self.by_scope
            .get(&scope)
            .into_iter()
            .flat_map(|entries| entries.ordered.iter().map(|&id| &self.arena[id]))
    }

    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.arena.iter().map(|(_, s)| s)
    }

    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.arena.iter().map(|(id, _)| id)
    }

    /// Checks that owner edges form a tree rooted at the single ownerless
    /// symbol.
    pub fn check_owner_tree(&self) -> Result<(), BuildError> {
        let limit = self.arena.len();
        let mut root: Option<SymbolId> = None;

        for symbol in self.all_symbols() {
            match symbol.owner {
                None if root.is_none() => root = Some(symbol.id),
                None => {
                    return Err(BuildError::OrphanSymbol {
                        name: symbol.name.clone(),
                        position: symbol.position,
                    });
                }
                Some(_) => {
                    let mut steps = 0;
                    let mut current = symbol.owner;
                    while let Some(owner) = current {
                        steps += 1;
                        if owner == symbol.id || steps > limit {
                            return Err(BuildError::OwnerCycle {
                                name: symbol.name.clone(),
                                position: symbol.position,
                            });
                        }
                        current = self.arena[owner].owner;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::scope::{ScopeKind, ScopeTree};

    fn dummy_span() -> Span {
        Span::default()
    }

    fn at(line: u32, column: u32) -> Position {
        Position::new(line, column)
    }

    fn label(name: &str, owner: Option<SymbolId>, scope: ScopeId, position: Position) -> Declaration<'_> {
        Declaration {
            name,
            kind: SymbolKind::Label,
            owner,
            flags: Flags::empty(),
            scope: Some(scope),
            unit: Some(0),
            position,
            span: dummy_span(),
        }
    }

    fn root_package(tree: &mut ScopeTree, symbols: &mut SymbolTable) -> (SymbolId, ScopeId) {
        let scope = tree.create_scope(ScopeKind::Package, None, dummy_span());
        let id = symbols.declare(Declaration {
            name: "",
            kind: SymbolKind::Package { members: scope },
            owner: None,
            flags: Flags::empty(),
            scope: None,
            unit: None,
            position: Position::default(),
            span: dummy_span(),
        });
        (id, scope)
    }

    #[test]
    fn register_symbol() {
        let mut tree = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, scope) = root_package(&mut tree, &mut symbols);

        let id = symbols.declare(label("outer", Some(root), scope, at(3, 5)));

        let symbol = symbols.get(id);
        assert_eq!(symbol.name(), "outer");
        assert!(symbol.is_label());
        assert_eq!(symbol.owner(), Some(root));
        assert_eq!(symbol.scope, Some(scope));
        assert!(symbol.references.is_empty());
        assert_eq!(symbols.at_position(0, at(3, 5)), Some(id));
    }

    #[test]
    fn lookup_in_parent_scope() {
        let mut tree = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, package) = root_package(&mut tree, &mut symbols);
        let unit = tree.create_unit_scope(0, ScopeKind::CompilationUnit, Some(package), dummy_span());
        let block = tree.create_unit_scope(0, ScopeKind::Block, Some(unit), dummy_span());

        let declared = symbols.declare(label("x", Some(root), unit, at(1, 1)));

        assert_eq!(symbols.lookup("x", block, &tree), Some(declared));
        assert_eq!(symbols.lookup("y", block, &tree), None);
    }

    #[test]
    fn same_name_keeps_declaration_order() {
        let mut tree = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, package) = root_package(&mut tree, &mut symbols);

        let first = symbols.declare(label("dup", Some(root), package, at(1, 1)));
        let second = symbols.declare(label("dup", Some(root), package, at(2, 1)));

        assert_eq!(symbols.named(package, "dup"), &[first, second]);
        let names: Vec<_> = symbols.symbols_in_scope(package).map(|s| s.id).collect();
        assert_eq!(names, vec![first, second]);
    }

    #[test]
    fn entered_alias_is_visible_in_other_scope() {
        let mut tree = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, package) = root_package(&mut tree, &mut symbols);
        let unit = tree.create_unit_scope(0, ScopeKind::CompilationUnit, None, dummy_span());

        let id = symbols.declare(label("Imported", Some(root), package, at(1, 1)));
        symbols.enter(unit, "Imported", id);

        assert_eq!(symbols.named(unit, "Imported"), &[id]);
        assert_eq!(symbols.get(id).scope, Some(package));
    }

    #[test]
    fn add_reference_records_usage() {
        let mut tree = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, package) = root_package(&mut tree, &mut symbols);
        let id = symbols.declare(label("x", Some(root), package, at(1, 1)));

        symbols.add_reference(id, Usage { unit: 0, position: at(4, 9) });

        assert_eq!(symbols.get(id).usages(), &[Usage { unit: 0, position: at(4, 9) }]);
    }

    #[test]
    fn owner_tree_accepts_single_root() {
        let mut tree = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, package) = root_package(&mut tree, &mut symbols);
        let a = symbols.declare(label("a", Some(root), package, at(1, 1)));
        symbols.declare(label("b", Some(a), package, at(2, 1)));

        assert!(symbols.check_owner_tree().is_ok());
    }

    #[test]
    fn owner_tree_rejects_cycle() {
        let mut tree = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, package) = root_package(&mut tree, &mut symbols);
        let a = symbols.declare(label("a", Some(root), package, at(1, 1)));
        let b = symbols.declare(label("b", Some(a), package, at(2, 1)));
        symbols.get_mut(a).owner = Some(b);

        assert!(matches!(
            symbols.check_owner_tree(),
            Err(BuildError::OwnerCycle { .. })
        ));
    }

    #[test]
    fn owner_tree_rejects_second_root() {
        let mut tree = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (_, package) = root_package(&mut tree, &mut symbols);
        symbols.declare(label("stray", None, package, at(1, 1)));

        assert!(matches!(
            symbols.check_owner_tree(),
            Err(BuildError::OrphanSymbol { .. })
        ));
    }

    #[test]
    fn static_type_follows_declared_type() {
        let mut tree = ScopeTree::new();
        let mut symbols = SymbolTable::new();
        let (root, package) = root_package(&mut tree, &mut symbols);
        let members = tree.create_unit_scope(0, ScopeKind::Type, Some(package), dummy_span());
        let ty = symbols.declare(Declaration {
            name: "Foo",
            kind: SymbolKind::Type {
                kind: TypeKind::Class,
                members,
                superclass: None,
                interfaces: Vec::new(),
                instantiated: None,
                completion: Completion::Incomplete,
            },
            owner: Some(root),
            flags: Flags::empty(),
            scope: Some(package),
            unit: Some(0),
            position: at(1, 7),
            span: dummy_span(),
        });
        let field = symbols.declare(Declaration {
            name: "foo",
            kind: SymbolKind::Variable {
                kind: VariableKind::Field,
                declared_type: TypeRef::resolved("Foo", at(2, 3), ty),
            },
            owner: Some(ty),
            flags: Flags::empty(),
            scope: Some(members),
            unit: Some(0),
            position: at(2, 7),
            span: dummy_span(),
        });

        assert_eq!(symbols.get(field).static_type(), Some(ty));
        assert_eq!(symbols.get(ty).static_type(), Some(ty));
        assert_eq!(symbols.get(ty).superclass(), None);
    }
}
