//! Scope tree for lexical name visibility
//!
//! Scopes live in an arena and are linked to their lexically enclosing
//! scope. Scopes created for a compilation unit are indexed by
//! `(unit, kind, span)` so later passes walking the same syntax tree can
//! re-enter them.

use std::collections::HashMap;

use id_arena::{Arena, Id};
use serde::Serialize;

use super::symbols::SymbolId;
use crate::syntax::{Position, Span};

pub type ScopeId = Id<Scope>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScopeKind {
    Package,
    CompilationUnit,
    Type,
    Method,
    Block,
    For,
    Catch,
    Resource,
    Lambda,
    Label,
}

impl ScopeKind {
    /// Names declared in an ordered scope are visible only from their
    /// declaration onward.
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            ScopeKind::Block
                | ScopeKind::For
                | ScopeKind::Catch
                | ScopeKind::Resource
                | ScopeKind::Lambda
        )
    }
}

#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// Symbol the scope belongs to: the package, type, method or
    /// executable member enclosing it.
    pub owner: Option<SymbolId>,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub span: Span,
    /// Index of the compilation unit; `None` for package scopes.
    pub unit: Option<usize>,
}

pub struct ScopeTree {
    arena: Arena<Scope>,
    root: Option<ScopeId>,
    index: HashMap<(usize, ScopeKind, Span), ScopeId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            index: HashMap::new(),
        }
    }

    pub fn create_scope(
        &mut self,
        kind: ScopeKind,
        parent: Option<ScopeId>,
        span: Span,
    ) -> ScopeId {
        let id = self.arena.alloc_with_id(|id| Scope {
            id,
            kind,
            owner: None,
            parent,
            children: Vec::new(),
            span,
            unit: None,
        });

        if let Some(parent_id) = parent {
            self.arena[parent_id].children.push(id);
        }

        if self.root.is_none() {
            self.root = Some(id);
        }

        id
    }

    /// Creates a scope belonging to compilation unit `unit` and indexes it.
    pub fn create_unit_scope(
        &mut self,
        unit: usize,
        kind: ScopeKind,
        parent: Option<ScopeId>,
        span: Span,
    ) -> ScopeId {
        let id = self.create_scope(kind, parent, span);
        self.arena[id].unit = Some(unit);
        self.index.insert((unit, kind, span), id);
        id
    }

    pub fn find(&self, unit: usize, kind: ScopeKind, span: Span) -> Option<ScopeId> {
        self.index.get(&(unit, kind, span)).copied()
    }

    pub fn set_owner(&mut self, id: ScopeId, owner: SymbolId) {
        self.arena[id].owner = Some(owner);
    }

    pub fn root(&self) -> Option<ScopeId> {
        self.root
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.arena[id]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.arena[id]
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.arena.iter().map(|(_, s)| s)
    }

    pub fn parent(&self, id: ScopeId) -> Option<&Scope> {
        self.arena[id].parent.map(|p| &self.arena[p])
    }

    pub fn children(&self, id: ScopeId) -> impl Iterator<Item = &Scope> {
        self.arena[id].children.iter().map(|&c| &self.arena[c])
    }

    pub fn ancestors(&self, id: ScopeId) -> AncestorIter<'_> {
        AncestorIter {
            tree: self,
            current: Some(id),
        }
    }

    /// `id` followed by every scope nested under it, depth first.
    pub fn descendants(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.arena[current].children.iter().rev().copied());
        }
        out
    }

    /// Innermost scope of the same unit under `start` whose span contains
    /// `position`.
    pub fn innermost_at(&self, start: ScopeId, position: Position) -> ScopeId {
        let mut current = start;
        'descend: loop {
            for child in self.children(current) {
                if child.unit == self.arena[start].unit && child.span.contains(position) {
                    current = child.id;
                    continue 'descend;
                }
            }
            return current;
        }
    }
}

pub struct AncestorIter<'a> {
    tree: &'a ScopeTree,
    current: Option<ScopeId>,
}

impl<'a> Iterator for AncestorIter<'a> {
    type Item = &'a Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let current_id = self.current?;
        let scope = &self.tree.arena[current_id];
        self.current = scope.parent;
        Some(scope)
    }
}
