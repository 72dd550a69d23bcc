//! Name resolution
//!
//! Walks a compilation unit a second time, re-entering the scopes the
//! builder created, and binds every identifier occurrence to the symbol it
//! denotes. The symbol graph is read-only here, so units can be resolved
//! in parallel.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use super::BuildError;
use super::lookup::{Lookup, NameKind};
use super::scope::{ScopeId, ScopeKind};
use super::symbols::{SymbolId, SymbolKind, TypeKind, UnresolvedReference};
use crate::syntax::{
    Annotation, Block, ClassBody, CompilationUnit, Expr, ForInit, Ident, LambdaBody,
    LambdaParameter, LiteralKind, LocalVariableDecl, Member, MethodDecl, Modifiers, Parameter,
    Position, QualifiedName, Resource, Span, Stmt, SwitchBlock, TypeDecl, TypeNode, TypeParameter,
};

const STRING: [&str; 3] = ["java", "lang", "String"];

/// Bindings produced for one compilation unit.
#[derive(Debug, Default)]
pub(crate) struct ResolvedUnit {
    pub bindings: BTreeMap<Position, SymbolId>,
    pub unresolved: Vec<UnresolvedReference>,
}

/// What an expression denotes when used as the target of a member access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// A value, with its static type when known.
    Value(Option<SymbolId>),
    Type(SymbolId),
    Package(SymbolId),
    Unknown,
}

impl Target {
    fn value_type(self) -> Option<SymbolId> {
        match self {
            Target::Value(ty) => ty,
            Target::Type(ty) => Some(ty),
            Target::Package(_) | Target::Unknown => None,
        }
    }
}

pub(crate) struct NameResolver<'a> {
    lookup: Lookup<'a>,
    unit: usize,
    current_scope: ScopeId,
    bindings: BTreeMap<Position, SymbolId>,
    unresolved: Vec<UnresolvedReference>,
}

impl<'a> NameResolver<'a> {
    pub(crate) fn new(lookup: Lookup<'a>, unit: usize, unit_scope: ScopeId) -> Self {
        Self {
            lookup,
            unit,
            current_scope: unit_scope,
            bindings: BTreeMap::new(),
            unresolved: Vec::new(),
        }
    }

    #[instrument(skip_all, fields(unit = self.unit, file = %unit.filename))]
    pub(crate) fn resolve(mut self, unit: &CompilationUnit) -> Result<ResolvedUnit, BuildError> {
        if let Some(package) = &unit.package {
            for annotation in &package.annotations {
                self.visit_annotation(annotation)?;
            }
            let mut current = Some(self.lookup.root_package);
            for segment in &package.name.segments {
                let found = current
                    .and_then(|p| self.lookup.package_member(p, &segment.name, NameKind::Package));
                current = self.bind(segment, found);
            }
        }

        for import in &unit.imports {
            self.visit_import(import);
        }

        for ty in &unit.types {
            self.visit_type(ty)?;
        }

        debug!(
            bindings = self.bindings.len(),
            unresolved = self.unresolved.len(),
            "resolved compilation unit"
        );

        Ok(ResolvedUnit {
            bindings: self.bindings,
            unresolved: self.unresolved,
        })
    }

    fn bind(&mut self, ident: &Ident, found: Option<SymbolId>) -> Option<SymbolId> {
        match found {
            Some(id) => {
                self.bindings.insert(ident.position, id);
            }
            None => self.unresolved.push(UnresolvedReference {
                name: ident.name.clone(),
                position: ident.position,
                scope: self.current_scope,
            }),
        }
        found
    }

    fn within<F>(&mut self, kind: ScopeKind, span: Span, f: F) -> Result<(), BuildError>
    where
        F: FnOnce(&mut Self) -> Result<(), BuildError>,
    {
        let scope = self
            .lookup
            .scopes
            .find(self.unit, kind, span)
            .ok_or(BuildError::MissingScope {
                unit: self.unit,
                kind,
                span,
            })?;
        let saved = std::mem::replace(&mut self.current_scope, scope);
        let result = f(self);
        self.current_scope = saved;
        result
    }

    fn simple(&self, ident: &Ident, kind: NameKind) -> Option<SymbolId> {
        self.lookup
            .simple_name(self.unit, self.current_scope, &ident.name, kind, ident.position)
    }

    fn current_type(&self) -> Option<SymbolId> {
        self.lookup.enclosing_types(self.current_scope).next()
    }

    fn direct_supertype(&self, ty: SymbolId) -> Option<SymbolId> {
        let symbol = self.lookup.symbols.get(ty);
        symbol.superclass().or_else(|| symbol.instantiated_type())
    }

    fn visit_import(&mut self, import: &crate::syntax::ImportDecl) {
        let lookup = self.lookup;
        let count = import.name.segments.len();
        let mut current = Some(lookup.root_package);

        for (index, segment) in import.name.segments.iter().enumerate() {
            let static_member = import.is_static && !import.on_demand && index + 1 == count;
            let found = current.and_then(|previous| {
                if static_member {
                    [NameKind::Variable, NameKind::Method, NameKind::Type]
                        .into_iter()
                        .find_map(|kind| lookup.member(previous, &segment.name, kind))
                } else {
                    lookup.type_name_step(previous, &segment.name)
                }
            });
            current = self.bind(segment, found);
        }
    }

    fn visit_modifiers(&mut self, modifiers: &Modifiers) -> Result<(), BuildError> {
        for annotation in &modifiers.annotations {
            self.visit_annotation(annotation)?;
        }
        Ok(())
    }

    fn visit_annotation(&mut self, annotation: &Annotation) -> Result<(), BuildError> {
        let ty = self.visit_type_name(&annotation.name);
        for argument in &annotation.arguments {
            if let Some(key) = &argument.key {
                let found = ty.and_then(|t| self.lookup.member(t, &key.name, NameKind::Method));
                self.bind(key, found);
            }
            self.visit_expr(&argument.value)?;
        }
        Ok(())
    }

    /// Binds each segment of a type name; returns the type it denotes.
    fn visit_type_name(&mut self, name: &QualifiedName) -> Option<SymbolId> {
        let lookup = self.lookup;
        let (head, rest) = name.segments.split_first()?;

        let found = lookup.type_name_head(self.unit, self.current_scope, &head.name, head.position);
        let mut current = self.bind(head, found);
        for segment in rest {
            let found = current.and_then(|previous| lookup.type_name_step(previous, &segment.name));
            current = self.bind(segment, found);
        }

        current.filter(|&id| lookup.symbols.get(id).is_type())
    }

    fn visit_type_node(&mut self, ty: &TypeNode) -> Option<SymbolId> {
        match ty {
            TypeNode::Named {
                name, arguments, ..
            } => {
                let found = self.visit_type_name(name);
                for argument in arguments {
                    self.visit_type_node(argument);
                }
                found
            }
            TypeNode::Array { element, .. } => {
                self.visit_type_node(element);
                None
            }
            TypeNode::Wildcard { bound, .. } => {
                if let Some(bound) = bound {
                    self.visit_type_node(bound);
                }
                None
            }
            TypeNode::Primitive { .. } | TypeNode::Inferred { .. } => None,
        }
    }

    fn visit_type(&mut self, decl: &TypeDecl) -> Result<(), BuildError> {
        self.visit_modifiers(&decl.modifiers)?;
        if let Some(superclass) = &decl.superclass {
            self.visit_supertype(superclass, decl.span)?;
        }
        for interface in &decl.interfaces {
            self.visit_supertype(interface, decl.span)?;
        }

        self.within(ScopeKind::Type, decl.span, |r| {
            r.visit_type_parameters(&decl.type_parameters);
            for component in &decl.record_components {
                r.visit_parameter(component)?;
            }
            for constant in &decl.enum_constants {
                r.visit_modifiers(&constant.modifiers)?;
                for argument in &constant.arguments {
                    r.visit_expr(argument)?;
                }
                if let Some(body) = &constant.body {
                    r.visit_class_body(body)?;
                }
            }
            r.visit_members(&decl.body.members)
        })
    }

    /// Supertype names are bound outside the type; their type arguments
    /// see the type's own parameters.
    fn visit_supertype(&mut self, ty: &TypeNode, span: Span) -> Result<(), BuildError> {
        match ty {
            TypeNode::Named {
                name, arguments, ..
            } => {
                self.visit_type_name(name);
                self.within(ScopeKind::Type, span, |r| {
                    for argument in arguments {
                        r.visit_type_node(argument);
                    }
                    Ok(())
                })
            }
            other => {
                self.visit_type_node(other);
                Ok(())
            }
        }
    }

    fn visit_type_parameters(&mut self, params: &[TypeParameter]) {
        for bound in params.iter().flat_map(|param| &param.bounds) {
            self.visit_type_node(bound);
        }
    }

    fn visit_class_body(&mut self, body: &ClassBody) -> Result<(), BuildError> {
        self.within(ScopeKind::Type, body.span, |r| r.visit_members(&body.members))
    }

    fn visit_members(&mut self, members: &[Member]) -> Result<(), BuildError> {
        for member in members {
            match member {
                Member::Field(field) => {
                    self.visit_modifiers(&field.modifiers)?;
                    self.visit_type_node(&field.ty);
                    for declarator in &field.declarators {
                        if let Some(init) = &declarator.initializer {
                            self.visit_expr(init)?;
                        }
                    }
                }
                Member::Method(method) => self.visit_method(method)?,
                Member::Type(ty) => self.visit_type(ty)?,
                Member::Initializer(init) => {
                    self.within(ScopeKind::Method, init.span, |r| r.visit_block(&init.body))?
                }
            }
        }
        Ok(())
    }

    fn visit_method(&mut self, method: &MethodDecl) -> Result<(), BuildError> {
        self.visit_modifiers(&method.modifiers)?;

        self.within(ScopeKind::Method, method.span, |r| {
            r.visit_type_parameters(&method.type_parameters);
            if let Some(return_type) = &method.return_type {
                r.visit_type_node(return_type);
            }
            for thrown in &method.throws {
                r.visit_type_node(thrown);
            }
            for param in &method.parameters {
                r.visit_parameter(param)?;
            }
            if let Some(body) = &method.body {
                r.visit_block(body)?;
            }
            if let Some(value) = &method.default_value {
                r.visit_expr(value)?;
            }
            Ok(())
        })
    }

    fn visit_parameter(&mut self, param: &Parameter) -> Result<(), BuildError> {
        self.visit_modifiers(&param.modifiers)?;
        self.visit_type_node(&param.ty);
        Ok(())
    }

    fn visit_locals(&mut self, decl: &LocalVariableDecl) -> Result<(), BuildError> {
        self.visit_modifiers(&decl.modifiers)?;
        self.visit_type_node(&decl.ty);
        for declarator in &decl.declarators {
            if let Some(init) = &declarator.initializer {
                self.visit_expr(init)?;
            }
        }
        Ok(())
    }

    fn visit_block(&mut self, block: &Block) -> Result<(), BuildError> {
        self.within(ScopeKind::Block, block.span, |r| {
            for stmt in &block.statements {
                r.visit_stmt(stmt)?;
            }
            Ok(())
        })
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<(), BuildError> {
        match stmt {
            Stmt::Block(block) => self.visit_block(block),
            Stmt::LocalVariable(decl) => self.visit_locals(decl),
            Stmt::LocalClass(decl) => self.visit_type(decl),
            Stmt::Expression(expr) => self.visit_expr(expr),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.visit_expr(condition)?;
                self.visit_stmt(then_branch)?;
                match else_branch {
                    Some(else_branch) => self.visit_stmt(else_branch),
                    None => Ok(()),
                }
            }
            Stmt::While {
                condition, body, ..
            }
            | Stmt::DoWhile {
                condition, body, ..
            } => {
                self.visit_expr(condition)?;
                self.visit_stmt(body)
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
                span,
            } => self.within(ScopeKind::For, *span, |r| {
                for item in init {
                    match item {
                        ForInit::Variable(decl) => r.visit_locals(decl)?,
                        ForInit::Expression(expr) => r.visit_expr(expr)?,
                    }
                }
                if let Some(condition) = condition {
                    r.visit_expr(condition)?;
                }
                for expr in update {
                    r.visit_expr(expr)?;
                }
                r.visit_stmt(body)
            }),
            Stmt::ForEach {
                variable,
                iterable,
                body,
                span,
            } => self.within(ScopeKind::For, *span, |r| {
                r.visit_expr(iterable)?;
                r.visit_parameter(variable)?;
                r.visit_stmt(body)
            }),
            Stmt::Labeled { body, span, .. } => {
                self.within(ScopeKind::Label, *span, |r| r.visit_stmt(body))
            }
            Stmt::Break {
                label: Some(label), ..
            }
            | Stmt::Continue {
                label: Some(label), ..
            } => {
                let found = self.simple(label, NameKind::Label);
                self.bind(label, found);
                Ok(())
            }
            Stmt::Break { label: None, .. } | Stmt::Continue { label: None, .. } | Stmt::Empty => {
                Ok(())
            }
            Stmt::Return { value, .. } => match value {
                Some(value) => self.visit_expr(value),
                None => Ok(()),
            },
            Stmt::Throw { value, .. } | Stmt::Yield { value, .. } => self.visit_expr(value),
            Stmt::Assert {
                condition, detail, ..
            } => {
                self.visit_expr(condition)?;
                match detail {
                    Some(detail) => self.visit_expr(detail),
                    None => Ok(()),
                }
            }
            Stmt::Synchronized { lock, body, .. } => {
                self.visit_expr(lock)?;
                self.visit_block(body)
            }
            Stmt::Try {
                resources,
                body,
                catches,
                finally,
                span,
            } => {
                if resources.is_empty() {
                    self.visit_block(body)?;
                } else {
                    self.within(ScopeKind::Resource, *span, |r| {
                        for resource in resources {
                            match resource {
                                Resource::Variable {
                                    modifiers,
                                    ty,
                                    value,
                                    ..
                                } => {
                                    r.visit_modifiers(modifiers)?;
                                    r.visit_type_node(ty);
                                    r.visit_expr(value)?;
                                }
                                Resource::Expression(expr) => r.visit_expr(expr)?,
                            }
                        }
                        r.visit_block(body)
                    })?;
                }
                for clause in catches {
                    self.within(ScopeKind::Catch, clause.span, |r| {
                        r.visit_modifiers(&clause.modifiers)?;
                        for ty in &clause.types {
                            r.visit_type_node(ty);
                        }
                        r.visit_block(&clause.body)
                    })?;
                }
                match finally {
                    Some(finally) => self.visit_block(finally),
                    None => Ok(()),
                }
            }
            Stmt::ConstructorCall {
                qualifier,
                arguments,
                ..
            } => {
                if let Some(qualifier) = qualifier {
                    self.visit_expr(qualifier)?;
                }
                for arg in arguments {
                    self.visit_expr(arg)?;
                }
                Ok(())
            }
        }
    }

    fn visit_switch(&mut self, selector: &Expr, block: &SwitchBlock) -> Result<(), BuildError> {
        let selector_type = self.resolve_target(selector)?.value_type();
        let enum_type = selector_type
            .filter(|&ty| self.lookup.symbols.get(ty).type_kind() == Some(TypeKind::Enum));

        self.within(ScopeKind::Block, block.span, |r| {
            for group in &block.groups {
                for label in &group.labels {
                    // unqualified enum constants in case labels
                    let constant = match (enum_type, label) {
                        (Some(ty), Expr::Name(ident)) => r
                            .lookup
                            .member(ty, &ident.name, NameKind::Variable)
                            .map(|found| (ident, found)),
                        _ => None,
                    };
                    match constant {
                        Some((ident, found)) => {
                            r.bind(ident, Some(found));
                        }
                        None => r.visit_expr(label)?,
                    }
                }
                for stmt in &group.statements {
                    r.visit_stmt(stmt)?;
                }
            }
            Ok(())
        })
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<(), BuildError> {
        self.resolve_target(expr).map(|_| ())
    }

    fn target_of(&self, id: SymbolId) -> Target {
        match self.lookup.symbols.get(id).kind {
            SymbolKind::Variable { .. } | SymbolKind::Method { .. } => {
                Target::Value(self.lookup.symbols.get(id).static_type())
            }
            SymbolKind::Type { .. } => Target::Type(id),
            SymbolKind::Package { .. } => Target::Package(id),
            SymbolKind::Label => Target::Unknown,
        }
    }

    /// Leading name of an expression: a variable, else a type, else a
    /// package.
    fn resolve_name(&mut self, ident: &Ident) -> Target {
        let found = [NameKind::Variable, NameKind::Type, NameKind::Package]
            .into_iter()
            .find_map(|kind| self.simple(ident, kind));
        match self.bind(ident, found) {
            Some(id) => self.target_of(id),
            None => Target::Unknown,
        }
    }

    /// Member segment of an access chain; no lexical fallback.
    fn resolve_member(&mut self, base: Target, field: &Ident) -> Target {
        let lookup = self.lookup;
        let found = match base {
            Target::Value(Some(ty)) | Target::Type(ty) => lookup
                .member(ty, &field.name, NameKind::Variable)
                .or_else(|| lookup.member(ty, &field.name, NameKind::Type)),
            Target::Package(package) => lookup
                .package_member(package, &field.name, NameKind::Type)
                .or_else(|| lookup.package_member(package, &field.name, NameKind::Package)),
            Target::Value(None) | Target::Unknown => None,
        };
        match self.bind(field, found) {
            Some(id) => self.target_of(id),
            None => Target::Unknown,
        }
    }

    fn resolve_target(&mut self, expr: &Expr) -> Result<Target, BuildError> {
        let lookup = self.lookup;

        let target = match expr {
            Expr::Name(ident) => self.resolve_name(ident),
            Expr::FieldAccess { target, field, .. } => {
                let base = self.resolve_target(target)?;
                self.resolve_member(base, field)
            }
            Expr::MethodCall {
                target,
                name,
                arguments,
                ..
            } => {
                let found = match target {
                    None => self.simple(name, NameKind::Method),
                    Some(target) => self
                        .resolve_target(target)?
                        .value_type()
                        .and_then(|ty| lookup.member(ty, &name.name, NameKind::Method)),
                };
                let found = self.bind(name, found);
                for arg in arguments {
                    self.visit_expr(arg)?;
                }
                Target::Value(found.and_then(|m| lookup.symbols.get(m).return_type()))
            }
            Expr::New {
                qualifier,
                ty,
                arguments,
                body,
                ..
            } => {
                let instantiated = match (qualifier, ty) {
                    // `outer.new Inner()` names a member type of the outer value
                    (Some(qualifier), TypeNode::Named { name, .. }) if name.segments.len() == 1 => {
                        let outer = self.resolve_target(qualifier)?.value_type();
                        let found = outer.and_then(|o| lookup.member(o, &name.segments[0].name, NameKind::Type));
                        self.bind(&name.segments[0], found)
                    }
                    (Some(qualifier), _) => {
                        self.visit_expr(qualifier)?;
                        self.visit_type_node(ty)
                    }
                    (None, _) => self.visit_type_node(ty),
                };
                for arg in arguments {
                    self.visit_expr(arg)?;
                }
                match body {
                    Some(body) => {
                        self.visit_class_body(body)?;
                        let anonymous = lookup
                            .symbols
                            .at_position(self.unit, body.span.start)
                            .ok_or(BuildError::MissingDeclaration {
                                unit: self.unit,
                                position: body.span.start,
                            })?;
                        Target::Value(Some(anonymous))
                    }
                    None => Target::Value(instantiated),
                }
            }
            Expr::NewArray {
                ty,
                dimensions,
                initializer,
                ..
            } => {
                self.visit_type_node(ty);
                for dim in dimensions {
                    self.visit_expr(dim)?;
                }
                if let Some(initializer) = initializer {
                    self.visit_expr(initializer)?;
                }
                Target::Value(None)
            }
            Expr::ArrayInitializer { elements, .. } => {
                for element in elements {
                    self.visit_expr(element)?;
                }
                Target::Value(None)
            }
            Expr::This { qualifier, .. } => match qualifier {
                None => Target::Value(self.current_type()),
                Some(qualifier) => Target::Value(self.resolve_target(qualifier)?.value_type()),
            },
            Expr::Super { qualifier, .. } => match qualifier {
                None => Target::Value(self.current_type().and_then(|ty| self.direct_supertype(ty))),
                Some(qualifier) => {
                    let named = self.resolve_target(qualifier)?.value_type();
                    // `Iface.super.m()` targets the interface itself
                    Target::Value(named.and_then(|ty| {
                        if lookup.symbols.get(ty).is_interface() {
                            Some(ty)
                        } else {
                            self.direct_supertype(ty)
                        }
                    }))
                }
            },
            Expr::Literal { kind, .. } => match kind {
                LiteralKind::String => Target::Value(
                    lookup
                        .absolute(STRING)
                        .filter(|&id| lookup.symbols.get(id).is_type()),
                ),
                _ => Target::Value(None),
            },
            Expr::ClassLiteral { ty, .. } => {
                self.visit_type_node(ty);
                Target::Value(None)
            }
            Expr::Type(ty) => match self.visit_type_node(ty) {
                Some(found) => Target::Type(found),
                None => Target::Unknown,
            },
            Expr::Assign { target, value, .. } => {
                let assigned = self.resolve_target(target)?;
                self.visit_expr(value)?;
                Target::Value(assigned.value_type())
            }
            Expr::Binary { left, right, .. } => {
                self.visit_expr(left)?;
                self.visit_expr(right)?;
                Target::Value(None)
            }
            Expr::Unary { operand, .. } => {
                self.visit_expr(operand)?;
                Target::Value(None)
            }
            Expr::Cast { types, value, .. } => {
                let cast: Vec<Option<SymbolId>> =
                    types.iter().map(|ty| self.visit_type_node(ty)).collect();
                self.visit_expr(value)?;
                Target::Value(cast.into_iter().next().flatten())
            }
            Expr::InstanceOf { value, ty, .. } => {
                self.visit_expr(value)?;
                if let Some(ty) = ty {
                    self.visit_type_node(ty);
                }
                Target::Value(None)
            }
            Expr::Conditional {
                condition,
                then_value,
                else_value,
                ..
            } => {
                self.visit_expr(condition)?;
                let then_type = self.resolve_target(then_value)?.value_type();
                self.visit_expr(else_value)?;
                Target::Value(then_type)
            }
            Expr::Lambda {
                parameters,
                body,
                span,
            } => {
                self.within(ScopeKind::Lambda, *span, |r| {
                    for param in parameters {
                        if let LambdaParameter::Typed(param) = param {
                            r.visit_parameter(param)?;
                        }
                    }
                    match body {
                        LambdaBody::Expr(expr) => r.visit_expr(expr),
                        LambdaBody::Block(block) => r.visit_block(block),
                    }
                })?;
                Target::Value(None)
            }
            Expr::MethodReference { target, name, .. } => {
                let base = self.resolve_target(target)?;
                if let Some(name) = name {
                    let found = base
                        .value_type()
                        .and_then(|ty| lookup.member(ty, &name.name, NameKind::Method));
                    self.bind(name, found);
                }
                Target::Value(None)
            }
            Expr::ArrayAccess { array, index, .. } => {
                self.visit_expr(array)?;
                self.visit_expr(index)?;
                Target::Value(None)
            }
            Expr::Switch {
                selector, block, ..
            } => {
                self.visit_switch(selector, block)?;
                Target::Value(None)
            }
            Expr::Parenthesized { inner, .. } => self.resolve_target(inner)?,
            Expr::Opaque { children, .. } => {
                for child in children {
                    self.visit_expr(child)?;
                }
                Target::Value(None)
            }
        };

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::parser::ParsedFile;
    use crate::semantic::model::SemanticModel;
    use crate::semantic::symbols::Resolution;

    fn build(source: &str) -> SemanticModel {
        let parsed = ParsedFile::from_source("Test.java", source);
        SemanticModel::build_all(std::slice::from_ref(parsed.unit()), &Config::default()).unwrap()
    }

    fn target(model: &SemanticModel, line: u32, column: u32) -> Option<crate::semantic::SymbolId> {
        model
            .resolve_reference(0, line, column)
            .and_then(Resolution::symbol)
    }

    #[test]
    fn local_shadows_field() {
        let model = build(
            "class A {\n  int x;\n  void m() {\n    int x = 1;\n    x++;\n  }\n}\n",
        );
        let local = model.find_symbol_at("x", 4).unwrap();

        assert_eq!(target(&model, 5, 5), Some(local));
    }

    #[test]
    fn field_visible_before_declaration() {
        let model = build("class A {\n  int get() { return value; }\n  int value;\n}\n");
        let field = model.find_symbol("value").unwrap();

        assert_eq!(target(&model, 2, 22), Some(field));
    }

    #[test]
    fn local_not_visible_before_declaration() {
        let model = build(
            "class A {\n  int y;\n  void m() {\n    y = 1;\n    int y = 2;\n  }\n}\n",
        );
        let field = model.find_symbol_at("y", 2).unwrap();

        assert_eq!(target(&model, 4, 5), Some(field));
    }

    #[test]
    fn inherited_field_from_superclass() {
        let model = build(
            "class Base { int shared; }\nclass Sub extends Base {\n  void m() { shared = 1; }\n}\n",
        );
        let shared = model.find_symbol("shared").unwrap();

        assert_eq!(target(&model, 3, 14), Some(shared));
    }

    #[test]
    fn method_call_by_name() {
        let model = build("class A {\n  void run() {}\n  void m() { run(); }\n}\n");
        let run = model.find_symbol("run").unwrap();

        assert_eq!(target(&model, 3, 14), Some(run));
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let model = build("class A {\n  void m() { missing = 1; }\n}\n");

        assert_eq!(
            model.resolve_reference(0, 2, 14),
            Some(Resolution::Absent)
        );
        let unit = model.unit(0).unwrap();
        assert!(unit.unresolved().iter().any(|u| u.name == "missing"));
    }

    #[test]
    fn method_type_parameters_are_visible_in_signature() {
        let model = build("class T {}\nclass Box<T> {\n  <U> U pick(T t, U u) { return u; }\n}\n");
        let method_parameter = model.find_symbol_at("U", 3);
        let class_parameter = model.find_symbol_at("T", 2);

        assert_eq!(target(&model, 3, 7), method_parameter);
        assert_eq!(target(&model, 3, 14), class_parameter);
        assert_eq!(target(&model, 3, 19), method_parameter);
    }

    #[test]
    fn supertype_arguments_see_type_parameters() {
        let model = build("class Base<E> {}\nclass Box<T> extends Base<T> {}\n");

        assert_eq!(target(&model, 2, 22), model.find_symbol("Base"));
        assert_eq!(target(&model, 2, 27), model.find_symbol("T"));
    }

    #[test]
    fn enum_case_labels_resolve_to_constants() {
        let model = build(
            "enum Color { RED, GREEN }\nclass A {\n  int m(Color c) {\n    switch (c) {\n      case RED: return 1;\n      default: return 0;\n    }\n  }\n}\n",
        );
        let red = model.find_symbol("RED").unwrap();

        assert_eq!(target(&model, 5, 12), Some(red));
    }

    #[test]
    fn lambda_parameter_shadows_field() {
        let model = build(
            "class A {\n  int v;\n  Object f = (Integer v) -> v;\n}\n",
        );
        let param = model.find_symbol_at("v", 3).unwrap();

        assert_eq!(target(&model, 3, 29), Some(param));
        assert_ne!(Some(param), model.find_symbol_at("v", 2));
    }

    #[test]
    fn catch_parameter_in_scope() {
        let model = build(
            "class A {\n  void m() {\n    try { } catch (RuntimeException e) { e.toString(); }\n  }\n}\n",
        );
        let e = model.find_symbol("e").unwrap();

        assert_eq!(target(&model, 3, 42), Some(e));
    }
}
