//! Semantic analysis module
//!
//! Builds the symbol graph and scope tree for a set of compilation units
//! and resolves every name occurrence against them.

pub mod builder;
pub mod flags;
pub mod hierarchy;
pub mod lookup;
pub mod model;
pub mod resolver;
pub mod scope;
pub mod symbols;

pub use flags::Flags;
pub use model::{Import, ModelSnapshot, SemanticModel, UnitModel};
pub use scope::{AncestorIter, Scope, ScopeId, ScopeKind, ScopeTree};
pub use symbols::{
    Completion, Declaration, MethodKind, Resolution, Symbol, SymbolId, SymbolKind, SymbolTable,
    TypeKind, TypeRef, UnresolvedReference, Usage, VariableKind,
};

use crate::syntax::{Position, Span};

/// Internal-consistency faults detected while building a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("owner chain of '{name}' at {position} forms a cycle")]
    OwnerCycle { name: String, position: Position },
    #[error("symbol '{name}' at {position} has no owner")]
    OrphanSymbol { name: String, position: Position },
    #[error("no {kind:?} scope recorded at {} in unit {unit}", .span.start)]
    MissingScope {
        unit: usize,
        kind: ScopeKind,
        span: Span,
    },
    #[error("no declaration recorded at {position} in unit {unit}")]
    MissingDeclaration { unit: usize, position: Position },
}
