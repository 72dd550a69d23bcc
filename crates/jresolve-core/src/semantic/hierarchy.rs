//! Hierarchy resolution: imports, supertypes and declared types
//!
//! Runs once every unit has been declared. Types are completed lazily: a
//! type's enclosing types and supertypes are completed before any lookup
//! that could reach their inherited members, and a type already being
//! completed is skipped so cyclic hierarchies terminate.

use tracing::{debug, instrument, trace};

use super::lookup::Lookup;
use super::model::UnitModel;
use super::scope::{ScopeId, ScopeTree};
use super::symbols::{
    Completion, Resolution, SymbolId, SymbolKind, SymbolTable, TypeKind, TypeRef,
};
use crate::config::{Config, ImplicitSupertypes};
use crate::syntax::Position;

const OBJECT: &str = "java.lang.Object";
const ENUM: &str = "java.lang.Enum";
const RECORD: &str = "java.lang.Record";
const ANNOTATION: &str = "java.lang.annotation.Annotation";

pub(crate) struct HierarchyResolver<'a> {
    scopes: &'a ScopeTree,
    symbols: &'a mut SymbolTable,
    units: &'a mut [UnitModel],
    root_package: SymbolId,
    implicit_imports: Vec<SymbolId>,
    policy: ImplicitSupertypes,
}

impl<'a> HierarchyResolver<'a> {
    pub(crate) fn new(
        scopes: &'a ScopeTree,
        symbols: &'a mut SymbolTable,
        units: &'a mut [UnitModel],
        root_package: SymbolId,
        config: &Config,
    ) -> Self {
        Self {
            scopes,
            symbols,
            units,
            root_package,
            implicit_imports: Vec::new(),
            policy: config.hierarchy.implicit_supertypes,
        }
    }

    fn lookup(&self) -> Lookup<'_> {
        Lookup {
            scopes: self.scopes,
            symbols: &*self.symbols,
            units: &*self.units,
            root_package: self.root_package,
            implicit_imports: &self.implicit_imports,
        }
    }

    /// Resolves everything and returns the packages imported into every unit.
    #[instrument(skip_all, fields(units = self.units.len()))]
    pub(crate) fn run(mut self, config: &Config) -> Vec<SymbolId> {
        let implicit: Vec<SymbolId> = config
            .resolution
            .implicit_imports
            .iter()
            .filter_map(|name| self.lookup().absolute(name.split('.')))
            .collect();
        self.implicit_imports = implicit;

        for unit in 0..self.units.len() {
            self.resolve_imports(unit);
        }

        let types: Vec<SymbolId> = self
            .symbols
            .all_symbols()
            .filter(|s| s.is_type())
            .map(|s| s.id)
            .collect();
        for &ty in &types {
            self.complete(ty);
        }

        let typed: Vec<SymbolId> = self
            .symbols
            .all_symbols()
            .filter(|s| match &s.kind {
                SymbolKind::Variable { declared_type, .. } => declared_type.resolution.is_pending(),
                SymbolKind::Method {
                    return_type: Some(return_type),
                    ..
                } => return_type.resolution.is_pending(),
                _ => false,
            })
            .map(|s| s.id)
            .collect();
        for &id in &typed {
            self.resolve_declared_type(id);
        }

        let unresolved_supertypes = types
            .iter()
            .filter(|&&ty| match &self.symbols.get(ty).kind {
                SymbolKind::Type {
                    superclass,
                    interfaces,
                    ..
                } => superclass
                    .iter()
                    .chain(interfaces)
                    .any(|r| r.resolution == Resolution::Absent),
                _ => false,
            })
            .count();
        debug!(
            types = types.len(),
            typed = typed.len(),
            unresolved_supertypes,
            "resolved type hierarchy"
        );

        self.implicit_imports
    }

    fn resolve_imports(&mut self, unit: usize) {
        let imports = self.units[unit].imports.clone();

        for (index, import) in imports.iter().enumerate() {
            let segments: Vec<&str> = import
                .name
                .segments
                .iter()
                .map(|s| s.name.as_str())
                .collect();
            // `import static a.B.member` targets the type `a.B`
            let path = if import.is_static && !import.on_demand {
                &segments[..segments.len().saturating_sub(1)]
            } else {
                &segments[..]
            };

            let target = self.resolve_absolute(path);
            self.units[unit].imports[index].target = target;
            trace!(unit, import = %import.name.to_dotted(), resolved = target.is_some(), "import");

            if import.is_static || import.on_demand {
                continue;
            }
            if let (Some(id), Some(last)) = (target, import.name.last()) {
                if self.symbols.get(id).is_type() {
                    let scope = self.units[unit].scope;
                    self.symbols.enter(scope, &last.name, id);
                }
            }
        }
    }

    fn resolve_absolute(&mut self, segments: &[&str]) -> Option<SymbolId> {
        if segments.is_empty() {
            return None;
        }
        let mut current = self.root_package;
        for segment in segments {
            if self.symbols.get(current).is_type() {
                self.complete(current);
            }
            current = self.lookup().type_name_step(current, segment)?;
        }
        Some(current)
    }

    fn resolve_type_name(
        &mut self,
        unit: usize,
        start: ScopeId,
        segments: &[&str],
        position: Position,
    ) -> Option<SymbolId> {
        let (head, rest) = segments.split_first()?;
        let mut current = self.lookup().type_name_head(unit, start, head, position)?;
        for segment in rest {
            if self.symbols.get(current).is_type() {
                self.complete(current);
            }
            current = self.lookup().type_name_step(current, segment)?;
        }
        self.symbols.get(current).is_type().then_some(current)
    }

    fn resolve_ref(&mut self, unit: usize, start: ScopeId, reference: TypeRef) -> TypeRef {
        if !reference.resolution.is_pending() {
            return reference;
        }
        let segments: Vec<&str> = reference.name.split('.').collect();
        let resolution = match self.resolve_type_name(unit, start, &segments, reference.position) {
            Some(id) => Resolution::Resolved(id),
            None => Resolution::Absent,
        };
        TypeRef {
            resolution,
            ..reference
        }
    }

    /// Completes every type whose members are visible from `start`.
    fn complete_enclosing(&mut self, start: ScopeId) {
        let enclosing: Vec<SymbolId> = self.lookup().enclosing_types(start).collect();
        for ty in enclosing {
            self.complete(ty);
        }
    }

    fn complete(&mut self, ty: SymbolId) {
        let symbol = self.symbols.get(ty);
        let SymbolKind::Type {
            kind,
            members,
            superclass,
            interfaces,
            instantiated,
            completion: Completion::Incomplete,
        } = &symbol.kind
        else {
            return;
        };

        let kind = *kind;
        let superclass = superclass.clone();
        let interfaces = interfaces.clone();
        let instantiated = instantiated.clone();
        let position = symbol.position;
        let unit = symbol.unit;
        let start = self.scopes.get(*members).parent;
        self.set_completion(ty, Completion::InProgress);

        let (Some(unit), Some(start)) = (unit, start) else {
            self.set_completion(ty, Completion::Complete);
            return;
        };

        self.complete_enclosing(start);

        let superclass = superclass.map(|r| self.resolve_ref(unit, start, r));
        let interfaces: Vec<TypeRef> = interfaces
            .into_iter()
            .map(|r| self.resolve_ref(unit, start, r))
            .collect();
        let instantiated = instantiated.map(|r| self.resolve_ref(unit, start, r));

        let (superclass, interfaces) =
            self.implicit_supertypes(ty, kind, position, superclass, interfaces, instantiated.as_ref());

        if let SymbolKind::Type {
            superclass: slot_superclass,
            interfaces: slot_interfaces,
            instantiated: slot_instantiated,
            completion,
            ..
        } = &mut self.symbols.get_mut(ty).kind
        {
            *slot_superclass = superclass;
            *slot_interfaces = interfaces;
            *slot_instantiated = instantiated;
            *completion = Completion::Complete;
        }

        let parents = self.lookup().supertypes(ty);
        for parent in parents {
            self.complete(parent);
        }
    }

    fn set_completion(&mut self, ty: SymbolId, state: Completion) {
        if let SymbolKind::Type { completion, .. } = &mut self.symbols.get_mut(ty).kind {
            *completion = state;
        }
    }

    fn implicit_supertypes(
        &mut self,
        ty: SymbolId,
        kind: TypeKind,
        position: Position,
        mut superclass: Option<TypeRef>,
        mut interfaces: Vec<TypeRef>,
        instantiated: Option<&TypeRef>,
    ) -> (Option<TypeRef>, Vec<TypeRef>) {
        if self.policy == ImplicitSupertypes::Absent {
            return (superclass, interfaces);
        }

        if let Some(base) = instantiated {
            if let Some(id) = base.symbol() {
                if self.symbols.get(id).is_interface() {
                    interfaces.push(base.clone());
                } else {
                    superclass = Some(base.clone());
                }
            }
            return (superclass, interfaces);
        }

        match kind {
            TypeKind::Class if superclass.is_none() => {
                superclass = self.implicit(OBJECT, position).filter(|r| r.symbol() != Some(ty));
            }
            TypeKind::Enum => superclass = self.implicit(ENUM, position),
            TypeKind::Record => superclass = self.implicit(RECORD, position),
            TypeKind::Annotation => interfaces.extend(self.implicit(ANNOTATION, position)),
            TypeKind::Class | TypeKind::Interface | TypeKind::TypeParameter => {}
        }
        (superclass, interfaces)
    }

    fn implicit(&mut self, name: &str, position: Position) -> Option<TypeRef> {
        let segments: Vec<&str> = name.split('.').collect();
        self.resolve_absolute(&segments)
            .filter(|&id| self.symbols.get(id).is_type())
            .map(|id| TypeRef::resolved(name, position, id))
    }

    fn resolve_declared_type(&mut self, id: SymbolId) {
        let symbol = self.symbols.get(id);
        // return types see the method's own type parameters
        let scope = match symbol.kind {
            SymbolKind::Method { params, .. } => Some(params),
            _ => symbol.scope,
        };
        let (Some(unit), Some(start)) = (symbol.unit, scope) else {
            return;
        };
        let pending = match &symbol.kind {
            SymbolKind::Variable { declared_type, .. } => declared_type.clone(),
            SymbolKind::Method {
                return_type: Some(return_type),
                ..
            } => return_type.clone(),
            _ => return,
        };

        self.complete_enclosing(start);
        let resolved = self.resolve_ref(unit, start, pending);

        match &mut self.symbols.get_mut(id).kind {
            SymbolKind::Variable { declared_type, .. } => *declared_type = resolved,
            SymbolKind::Method { return_type, .. } => *return_type = Some(resolved),
            _ => {}
        }
    }
}
