//! Semantic model and query surface
//!
//! [`SemanticModel::build_all`] runs the three passes over a set of
//! compilation units: declaration, hierarchy completion and name
//! resolution. The resulting model is immutable and answers queries about
//! symbols, scopes and references.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

use super::BuildError;
use super::builder::{self, ScopeBuilder};
use super::flags::Flags;
use super::hierarchy::HierarchyResolver;
use super::lookup::Lookup;
use super::resolver::{NameResolver, ResolvedUnit};
use super::scope::{Scope, ScopeId, ScopeKind, ScopeTree};
use super::symbols::{
    Resolution, Symbol, SymbolId, SymbolKind, SymbolTable, UnresolvedReference, Usage,
};
use crate::config::Config;
use crate::syntax::{CompilationUnit, Position, QualifiedName, Span};

/// An import declaration and the package or type it names.
#[derive(Debug, Clone)]
pub struct Import {
    pub name: QualifiedName,
    pub is_static: bool,
    pub on_demand: bool,
    /// Package or type holding the imported names; for a single-type import
    /// the type itself, for a static single import the declaring type.
    pub target: Option<SymbolId>,
}

/// Per-compilation-unit part of the model.
#[derive(Debug, Clone)]
pub struct UnitModel {
    pub index: usize,
    pub filename: String,
    pub scope: ScopeId,
    pub package: SymbolId,
    pub imports: Vec<Import>,
    bindings: BTreeMap<Position, SymbolId>,
    unresolved: Vec<UnresolvedReference>,
}

impl UnitModel {
    pub(crate) fn new(
        index: usize,
        filename: String,
        scope: ScopeId,
        package: SymbolId,
        imports: Vec<Import>,
    ) -> Self {
        Self {
            index,
            filename,
            scope,
            package,
            imports,
            bindings: BTreeMap::new(),
            unresolved: Vec::new(),
        }
    }

    /// Resolution of the identifier covering `line:column`, or `None` when
    /// no resolvable name occurs there. Declarations are not references.
    pub fn reference(&self, line: u32, column: u32, symbols: &SymbolTable) -> Option<Resolution> {
        let position = Position::new(line, column);
        let covers = |start: Position, len: usize| {
            start.line == line && column < start.column.saturating_add(len as u32)
        };

        if let Some((&start, &id)) = self.bindings.range(..=position).next_back() {
            if covers(start, symbols.get(id).name.chars().count().max(1)) {
                return Some(Resolution::Resolved(id));
            }
        }

        self.unresolved
            .iter()
            .any(|u| u.position <= position && covers(u.position, u.name.chars().count().max(1)))
            .then_some(Resolution::Absent)
    }

    /// Resolved name occurrences in source order.
    pub fn bindings(&self) -> impl Iterator<Item = (Position, SymbolId)> + '_ {
        self.bindings.iter().map(|(&position, &id)| (position, id))
    }

    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }
}

pub struct SemanticModel {
    pub scope_tree: ScopeTree,
    pub symbol_table: SymbolTable,
    units: Vec<UnitModel>,
    root_package: SymbolId,
}

impl SemanticModel {
    /// Builds the model for a single compilation unit with default settings.
    pub fn build(unit: &CompilationUnit) -> Result<Self, BuildError> {
        Self::build_all(std::slice::from_ref(unit), &Config::default())
    }

    /// Builds one model over all `units`, which may refer to each other.
    #[instrument(skip_all, fields(units = units.len()))]
    pub fn build_all(units: &[CompilationUnit], config: &Config) -> Result<Self, BuildError> {
        let mut scope_tree = ScopeTree::new();
        let mut symbol_table = SymbolTable::new();
        let (root_package, root_scope) =
            builder::create_root_package(&mut scope_tree, &mut symbol_table);

        let mut unit_models: Vec<UnitModel> = units
            .iter()
            .enumerate()
            .map(|(index, unit)| {
                ScopeBuilder::new(
                    &mut scope_tree,
                    &mut symbol_table,
                    root_package,
                    root_scope,
                    index,
                )
                .build(unit)
            })
            .collect();

        symbol_table.check_owner_tree()?;

        let implicit_imports = HierarchyResolver::new(
            &scope_tree,
            &mut symbol_table,
            &mut unit_models,
            root_package,
            config,
        )
        .run(config);

        let resolved: Vec<ResolvedUnit> = {
            let lookup = Lookup {
                scopes: &scope_tree,
                symbols: &symbol_table,
                units: &unit_models,
                root_package,
                implicit_imports: &implicit_imports,
            };
            let resolve = |(index, unit): (usize, &CompilationUnit)| {
                NameResolver::new(lookup, index, unit_models[index].scope).resolve(unit)
            };
            if config.resolution.parallel {
                units
                    .par_iter()
                    .enumerate()
                    .map(resolve)
                    .collect::<Result<_, _>>()?
            } else {
                units
                    .iter()
                    .enumerate()
                    .map(resolve)
                    .collect::<Result<_, _>>()?
            }
        };

        for (index, output) in resolved.into_iter().enumerate() {
            for (&position, &id) in &output.bindings {
                symbol_table.add_reference(id, Usage { unit: index, position });
            }
            let unit = &mut unit_models[index];
            unit.bindings = output.bindings;
            unit.unresolved = output.unresolved;
        }

        debug!(
            symbols = symbol_table.len(),
            scopes = scope_tree.len(),
            "built semantic model"
        );

        Ok(Self {
            scope_tree,
            symbol_table,
            units: unit_models,
            root_package,
        })
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbol_table
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scope_tree
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.symbol_table.get(id)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        self.scope_tree.get(id)
    }

    pub fn units(&self) -> &[UnitModel] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> Option<&UnitModel> {
        self.units.get(index)
    }

    pub fn root_package(&self) -> SymbolId {
        self.root_package
    }

    /// First symbol named `name` walking outward from `scope`.
    pub fn lookup_symbol(&self, name: &str, scope: ScopeId) -> Option<SymbolId> {
        self.symbol_table.lookup(name, scope, &self.scope_tree)
    }

    /// Symbol named `name` declared in `scope` or any scope nested in it,
    /// preferring one declared on `line` and otherwise the innermost one
    /// whose extent covers `line`.
    pub fn lookup_symbol_at(&self, name: &str, scope: ScopeId, line: u32) -> Option<SymbolId> {
        let root = self.scope_tree.get(scope);
        let within: HashSet<ScopeId> = self.scope_tree.descendants(scope).into_iter().collect();
        // top-level types are declared in the package but belong to the unit
        let unit = (root.kind == ScopeKind::CompilationUnit)
            .then_some(root.unit)
            .flatten();

        let candidates = self.symbol_table.all_symbols().filter(|s| {
            s.name == name
                && (s.scope.is_some_and(|declared| within.contains(&declared))
                    || (unit.is_some() && s.unit == unit))
        });
        pick_at_line(candidates, line)
    }

    /// First symbol named `name` in declaration order.
    pub fn find_symbol(&self, name: &str) -> Option<SymbolId> {
        self.symbol_table
            .all_symbols()
            .find(|s| s.name == name)
            .map(|s| s.id)
    }

    /// Symbol named `name` anywhere in the model, disambiguated by `line`.
    pub fn find_symbol_at(&self, name: &str, line: u32) -> Option<SymbolId> {
        pick_at_line(
            self.symbol_table.all_symbols().filter(|s| s.name == name),
            line,
        )
    }

    /// What the identifier at `line:column` of `unit` refers to.
    pub fn resolve_reference(&self, unit: usize, line: u32, column: u32) -> Option<Resolution> {
        self.units.get(unit)?.reference(line, column, &self.symbol_table)
    }

    /// Innermost scope of `unit` containing `line:column`.
    pub fn scope_at(&self, unit: usize, line: u32, column: u32) -> Option<ScopeId> {
        let unit = self.units.get(unit)?;
        Some(
            self.scope_tree
                .innermost_at(unit.scope, Position::new(line, column)),
        )
    }

    /// Name of `id` qualified by its owners, e.g. `p.Outer.Inner.method.x`.
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(symbol_id) = current {
            let symbol = self.symbol(symbol_id);
            if symbol.owner.is_none() {
                break;
            }
            parts.push(self.display_name(symbol_id));
            current = symbol.owner;
        }
        parts.reverse();
        parts.join(".")
    }

    fn display_name(&self, id: SymbolId) -> String {
        let symbol = self.symbol(id);
        if symbol.name.is_empty() && symbol.is_type() {
            format!("<anonymous@{}>", symbol.position)
        } else {
            symbol.name.clone()
        }
    }

    /// Symbols declared directly in the member (or parameter) scope of `id`.
    pub fn members(&self, id: SymbolId) -> Vec<SymbolId> {
        let scope = match self.symbol(id).kind {
            SymbolKind::Package { members } | SymbolKind::Type { members, .. } => members,
            SymbolKind::Method { params, .. } => params,
            SymbolKind::Variable { .. } | SymbolKind::Label => return Vec::new(),
        };
        self.symbol_table
            .symbols_in_scope(scope)
            .map(|s| s.id)
            .collect()
    }

    pub fn usages(&self, id: SymbolId) -> &[Usage] {
        self.symbol(id).usages()
    }

    /// Serializable view of the whole model with symbols named by their
    /// qualified names.
    pub fn snapshot(&self) -> ModelSnapshot {
        let symbols = self
            .symbol_table
            .all_symbols()
            .filter(|s| s.owner.is_some())
            .map(|s| self.symbol_snapshot(s))
            .collect();

        let units = self
            .units
            .iter()
            .map(|unit| UnitSnapshot {
                file: unit.filename.clone(),
                package: self.qualified_name(unit.package),
                imports: unit
                    .imports
                    .iter()
                    .map(|import| ImportSnapshot {
                        name: import.name.to_dotted(),
                        is_static: import.is_static,
                        on_demand: import.on_demand,
                        target: import.target.map(|t| self.qualified_name(t)),
                    })
                    .collect(),
                scopes: self.scope_snapshot(unit.scope),
                references: unit
                    .bindings()
                    .map(|(position, id)| ReferenceSnapshot {
                        position,
                        target: self.qualified_name(id),
                    })
                    .collect(),
                unresolved: unit
                    .unresolved
                    .iter()
                    .map(|u| UnresolvedSnapshot {
                        name: u.name.clone(),
                        position: u.position,
                    })
                    .collect(),
            })
            .collect();

        ModelSnapshot { units, symbols }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    fn symbol_snapshot(&self, symbol: &Symbol) -> SymbolSnapshot {
        let name = |id: SymbolId| self.qualified_name(id);
        let (kind, detail) = match &symbol.kind {
            SymbolKind::Package { .. } => ("package", None),
            SymbolKind::Type { kind, .. } => ("type", Some(format!("{kind:?}"))),
            SymbolKind::Method { kind, .. } => ("method", Some(format!("{kind:?}"))),
            SymbolKind::Variable { kind, .. } => ("variable", Some(format!("{kind:?}"))),
            SymbolKind::Label => ("label", None),
        };

        SymbolSnapshot {
            name: name(symbol.id),
            kind,
            detail,
            flags: symbol.flags,
            position: symbol.position,
            owner: symbol.owner.map(name),
            superclass: symbol.superclass().map(name),
            interfaces: symbol.interfaces().into_iter().map(name).collect(),
            static_type: symbol.static_type().map(name),
            usages: symbol.usages().len(),
        }
    }

    fn scope_snapshot(&self, id: ScopeId) -> ScopeSnapshot {
        let scope = self.scope_tree.get(id);
        ScopeSnapshot {
            kind: scope.kind,
            span: scope.span,
            owner: scope.owner.map(|o| self.qualified_name(o)),
            symbols: self
                .symbol_table
                .symbols_in_scope(id)
                .map(|s| self.display_name(s.id))
                .collect(),
            children: scope
                .children
                .iter()
                .map(|&child| self.scope_snapshot(child))
                .collect(),
        }
    }
}

/// Picks the candidate declared on `line`, else the one with the tightest
/// extent covering `line`.
fn pick_at_line<'s>(candidates: impl Iterator<Item = &'s Symbol>, line: u32) -> Option<SymbolId> {
    let candidates: Vec<&Symbol> = candidates.collect();

    if let Some(symbol) = candidates.iter().find(|s| s.position.line == line) {
        return Some(symbol.id);
    }

    candidates
        .iter()
        .filter(|s| s.span.contains_line(line))
        .min_by_key(|s| (s.span.line_extent(), std::cmp::Reverse(s.span.start)))
        .map(|s| s.id)
}

#[derive(Debug, Serialize)]
pub struct ModelSnapshot {
    pub units: Vec<UnitSnapshot>,
    pub symbols: Vec<SymbolSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct UnitSnapshot {
    pub file: String,
    pub package: String,
    pub imports: Vec<ImportSnapshot>,
    pub scopes: ScopeSnapshot,
    pub references: Vec<ReferenceSnapshot>,
    pub unresolved: Vec<UnresolvedSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct ImportSnapshot {
    pub name: String,
    pub is_static: bool,
    pub on_demand: bool,
    pub target: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScopeSnapshot {
    pub kind: ScopeKind,
    pub span: Span,
    pub owner: Option<String>,
    pub symbols: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ScopeSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct ReferenceSnapshot {
    pub position: Position,
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct UnresolvedSnapshot {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Serialize)]
pub struct SymbolSnapshot {
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub flags: Flags,
    pub position: Position,
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_type: Option<String>,
    pub usages: usize,
}
