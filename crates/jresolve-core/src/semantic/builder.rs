//! Scope builder: symbol and scope construction
//!
//! One traversal of a compilation unit declares every package, type,
//! method, variable and label, computes flags (including the implicit
//! ones) and creates the scope tree. Declarations are not resolved here.

use tracing::{debug, trace};

use super::flags::Flags;
use super::model::{Import, UnitModel};
use super::scope::{ScopeId, ScopeKind, ScopeTree};
use super::symbols::{
    Completion, Declaration, MethodKind, SymbolId, SymbolKind, SymbolTable, TypeKind, TypeRef,
    VariableKind,
};
use crate::syntax::{
    Block, ClassBody, CompilationUnit, EnumConstant, Expr, FieldDecl, ForInit, Ident, Initializer,
    LambdaBody, LambdaParameter, LocalVariableDecl, Member, MethodDecl, MethodDeclKind, Modifiers,
    Parameter, Position, QualifiedName, Resource, Span, Stmt, SwitchBlock, TypeDecl, TypeDeclKind,
    TypeNode, TypeParameter,
};

/// Creates the unnamed root package every other symbol hangs off, along
/// with its member scope.
pub(crate) fn create_root_package(
    scopes: &mut ScopeTree,
    symbols: &mut SymbolTable,
) -> (SymbolId, ScopeId) {
    let members = scopes.create_scope(ScopeKind::Package, None, Span::default());
    let id = symbols.declare(Declaration {
        name: "",
        kind: SymbolKind::Package { members },
        owner: None,
        flags: Flags::empty(),
        scope: None,
        unit: None,
        position: Position::default(),
        span: Span::default(),
    });
    scopes.set_owner(members, id);
    (id, members)
}

pub(crate) fn package_scope(symbols: &SymbolTable, id: SymbolId) -> Option<ScopeId> {
    match symbols.get(id).kind {
        SymbolKind::Package { members } => Some(members),
        _ => None,
    }
}

pub(crate) fn type_kind(kind: TypeDeclKind) -> TypeKind {
    match kind {
        TypeDeclKind::Class => TypeKind::Class,
        TypeDeclKind::Interface => TypeKind::Interface,
        TypeDeclKind::Enum => TypeKind::Enum,
        TypeDeclKind::Annotation => TypeKind::Annotation,
        TypeDeclKind::Record => TypeKind::Record,
    }
}

fn kind_flags(kind: TypeKind) -> Flags {
    match kind {
        TypeKind::Interface => Flags::INTERFACE,
        TypeKind::Annotation => Flags::INTERFACE | Flags::ANNOTATION,
        TypeKind::Enum => Flags::ENUM,
        TypeKind::Class | TypeKind::Record | TypeKind::TypeParameter => Flags::empty(),
    }
}

/// Reference to a declared type, left pending for the hierarchy pass.
/// Primitive, array and inferred types never resolve.
pub(crate) fn type_ref(ty: &TypeNode, dimensions: u32) -> TypeRef {
    match ty {
        TypeNode::Named { name, .. } if dimensions == 0 => {
            TypeRef::pending(name.to_dotted(), name.position())
        }
        other => TypeRef::absent(other.span().start),
    }
}

/// Where a type declaration lands in the graph.
#[derive(Debug, Clone, Copy)]
struct TypeSite {
    /// Scope the type's name is entered into.
    declare_in: ScopeId,
    /// Scope the type's member scope is chained to.
    lexical_parent: ScopeId,
    owner: SymbolId,
    enclosing: Option<TypeKind>,
}

pub(crate) struct ScopeBuilder<'a> {
    scopes: &'a mut ScopeTree,
    symbols: &'a mut SymbolTable,
    root_package: SymbolId,
    root_scope: ScopeId,
    unit: usize,
    current_scope: ScopeId,
    current_owner: SymbolId,
}

impl<'a> ScopeBuilder<'a> {
    pub(crate) fn new(
        scopes: &'a mut ScopeTree,
        symbols: &'a mut SymbolTable,
        root_package: SymbolId,
        root_scope: ScopeId,
        unit: usize,
    ) -> Self {
        Self {
            scopes,
            symbols,
            root_package,
            root_scope,
            unit,
            current_scope: root_scope,
            current_owner: root_package,
        }
    }

    pub(crate) fn build(mut self, unit: &CompilationUnit) -> UnitModel {
        let (package, package_members) = match &unit.package {
            Some(decl) => self.ensure_package(&decl.name),
            None => (self.root_package, self.root_scope),
        };

        let unit_scope = self.scopes.create_unit_scope(
            self.unit,
            ScopeKind::CompilationUnit,
            Some(package_members),
            unit.span,
        );
        self.scopes.set_owner(unit_scope, package);
        self.current_scope = unit_scope;
        self.current_owner = package;

        let imports = unit
            .imports
            .iter()
            .map(|import| Import {
                name: import.name.clone(),
                is_static: import.is_static,
                on_demand: import.on_demand,
                target: None,
            })
            .collect();

        let before = self.symbols.len();
        for ty in &unit.types {
            self.declare_type(
                ty,
                TypeSite {
                    declare_in: package_members,
                    lexical_parent: unit_scope,
                    owner: package,
                    enclosing: None,
                },
            );
        }

        debug!(
            unit = self.unit,
            file = %unit.filename,
            symbols = self.symbols.len() - before,
            "declared compilation unit"
        );

        UnitModel::new(self.unit, unit.filename.clone(), unit_scope, package, imports)
    }

    /// Finds or creates the package chain for `name`, one symbol per
    /// segment, shared between units.
    fn ensure_package(&mut self, name: &QualifiedName) -> (SymbolId, ScopeId) {
        let mut current = (self.root_package, self.root_scope);

        for segment in &name.segments {
            let existing = self
                .symbols
                .named(current.1, &segment.name)
                .iter()
                .find_map(|&id| package_scope(self.symbols, id).map(|scope| (id, scope)));

            current = match existing {
                Some(found) => found,
                None => {
                    let members = self.scopes.create_scope(ScopeKind::Package, None, Span::default());
                    let id = self.symbols.declare(Declaration {
                        name: &segment.name,
                        kind: SymbolKind::Package { members },
                        owner: Some(current.0),
                        flags: Flags::empty(),
                        scope: Some(current.1),
                        unit: None,
                        position: segment.position,
                        span: Span::new(segment.position, segment.position),
                    });
                    self.scopes.set_owner(members, id);
                    trace!(package = %segment.name, "declared package");
                    (id, members)
                }
            };
        }

        current
    }

    fn with_scope<F: FnOnce(&mut Self)>(&mut self, scope: ScopeId, owner: SymbolId, f: F) {
        let saved = (self.current_scope, self.current_owner);
        self.current_scope = scope;
        self.current_owner = owner;
        f(self);
        (self.current_scope, self.current_owner) = saved;
    }

    fn with_owner<F: FnOnce(&mut Self)>(&mut self, owner: SymbolId, f: F) {
        let scope = self.current_scope;
        self.with_scope(scope, owner, f);
    }

    /// Runs `f` inside a new scope nested in the current one.
    fn nested<F: FnOnce(&mut Self)>(&mut self, kind: ScopeKind, span: Span, f: F) {
        let scope = self
            .scopes
            .create_unit_scope(self.unit, kind, Some(self.current_scope), span);
        self.scopes.set_owner(scope, self.current_owner);
        let owner = self.current_owner;
        self.with_scope(scope, owner, f);
    }

    fn declare_type(&mut self, decl: &TypeDecl, site: TypeSite) -> SymbolId {
        let kind = type_kind(decl.kind);
        let mut flags = Flags::from_modifiers(&decl.modifiers) | kind_flags(kind);
        if matches!(site.enclosing, Some(TypeKind::Interface | TypeKind::Annotation)) {
            flags = flags.with_implicit_public();
        }

        let members = self.scopes.create_unit_scope(
            self.unit,
            ScopeKind::Type,
            Some(site.lexical_parent),
            decl.span,
        );
        let superclass = decl.superclass.as_ref().map(|ty| type_ref(ty, 0));
        let interfaces = decl.interfaces.iter().map(|ty| type_ref(ty, 0)).collect();

        let id = self.symbols.declare(Declaration {
            name: &decl.name.name,
            kind: SymbolKind::Type {
                kind,
                members,
                superclass,
                interfaces,
                instantiated: None,
                completion: Completion::Incomplete,
            },
            owner: Some(site.owner),
            flags,
            scope: Some(site.declare_in),
            unit: Some(self.unit),
            position: decl.name.position,
            span: decl.span,
        });
        self.scopes.set_owner(members, id);
        trace!(name = %decl.name.name, ?kind, "declared type");

        self.with_scope(members, id, |b| {
            b.declare_type_parameters(&decl.type_parameters);
            for component in &decl.record_components {
                b.declare_variable(
                    VariableKind::Field,
                    &component.name,
                    type_ref(&component.ty, 0),
                    Flags::PRIVATE | Flags::FINAL,
                    component.span,
                );
            }
            for constant in &decl.enum_constants {
                b.declare_enum_constant(constant, &decl.name, id);
            }
            b.declare_members(&decl.body.members, kind);
        });

        id
    }

    fn declare_enum_constant(&mut self, constant: &EnumConstant, enum_name: &Ident, enum_id: SymbolId) {
        let declared_type = TypeRef::resolved(enum_name.name.clone(), constant.name.position, enum_id);
        let id = self.declare_variable(
            VariableKind::EnumConstant,
            &constant.name,
            declared_type.clone(),
            Flags::PUBLIC | Flags::ENUM,
            constant.span,
        );

        self.with_owner(id, |b| {
            for arg in &constant.arguments {
                b.visit_expr(arg);
            }
            if let Some(body) = &constant.body {
                b.declare_anonymous(body, declared_type);
            }
        });
    }

    /// Declares type parameters in the current scope. Each one is a type
    /// whose supertypes are its bounds; its member scope is left out of the
    /// unit's scope index.
    fn declare_type_parameters(&mut self, params: &[TypeParameter]) {
        for param in params {
            let end = param
                .bounds
                .last()
                .map_or(param.name.position, |bound| bound.span().end);
            let span = Span::new(param.name.position, end);
            let members = self
                .scopes
                .create_scope(ScopeKind::Type, Some(self.current_scope), span);
            let id = self.symbols.declare(Declaration {
                name: &param.name.name,
                kind: SymbolKind::Type {
                    kind: TypeKind::TypeParameter,
                    members,
                    superclass: None,
                    interfaces: param.bounds.iter().map(|bound| type_ref(bound, 0)).collect(),
                    instantiated: None,
                    completion: Completion::Incomplete,
                },
                owner: Some(self.current_owner),
                flags: Flags::empty(),
                scope: Some(self.current_scope),
                unit: Some(self.unit),
                position: param.name.position,
                span,
            });
            self.scopes.set_owner(members, id);
            trace!(name = %param.name.name, "declared type parameter");
        }
    }

    /// Anonymous class body owned by the current executable member.
    fn declare_anonymous(&mut self, body: &ClassBody, instantiated: TypeRef) -> SymbolId {
        let members =
            self.scopes
                .create_unit_scope(self.unit, ScopeKind::Type, Some(self.current_scope), body.span);
        let id = self.symbols.declare(Declaration {
            name: "",
            kind: SymbolKind::Type {
                kind: TypeKind::Class,
                members,
                superclass: None,
                interfaces: Vec::new(),
                instantiated: Some(instantiated),
                completion: Completion::Incomplete,
            },
            owner: Some(self.current_owner),
            flags: Flags::empty(),
            scope: Some(self.current_scope),
            unit: Some(self.unit),
            position: body.span.start,
            span: body.span,
        });
        self.scopes.set_owner(members, id);
        trace!(position = %body.span.start, "declared anonymous class");

        self.with_scope(members, id, |b| b.declare_members(&body.members, TypeKind::Class));
        id
    }

    fn declare_members(&mut self, members: &[Member], enclosing: TypeKind) {
        for member in members {
            match member {
                Member::Field(field) => self.declare_field(field, enclosing),
                Member::Method(method) => self.declare_method(method, enclosing),
                Member::Type(ty) => {
                    let site = TypeSite {
                        declare_in: self.current_scope,
                        lexical_parent: self.current_scope,
                        owner: self.current_owner,
                        enclosing: Some(enclosing),
                    };
                    self.declare_type(ty, site);
                }
                Member::Initializer(init) => self.declare_initializer(init),
            }
        }
    }

    fn member_flags(modifiers: &Modifiers, enclosing: TypeKind) -> Flags {
        let flags = Flags::from_modifiers(modifiers);
        match enclosing {
            TypeKind::Interface | TypeKind::Annotation => flags.with_implicit_public(),
            _ => flags,
        }
    }

    fn declare_field(&mut self, field: &FieldDecl, enclosing: TypeKind) {
        let flags = Self::member_flags(&field.modifiers, enclosing);
        for declarator in &field.declarators {
            let id = self.declare_variable(
                VariableKind::Field,
                &declarator.name,
                type_ref(&field.ty, declarator.dimensions),
                flags,
                declarator.span,
            );
            if let Some(init) = &declarator.initializer {
                self.with_owner(id, |b| b.visit_expr(init));
            }
        }
    }

    fn declare_method(&mut self, method: &MethodDecl, enclosing: TypeKind) {
        let (name, kind) = match method.kind {
            MethodDeclKind::Constructor => (MethodKind::CONSTRUCTOR_NAME, MethodKind::Constructor),
            MethodDeclKind::AnnotationElement => {
                (method.name.name.as_str(), MethodKind::AnnotationElement)
            }
            MethodDeclKind::Method => (method.name.name.as_str(), MethodKind::Method),
        };

        let params = self.scopes.create_unit_scope(
            self.unit,
            ScopeKind::Method,
            Some(self.current_scope),
            method.span,
        );
        let id = self.symbols.declare(Declaration {
            name,
            kind: SymbolKind::Method {
                kind,
                return_type: method.return_type.as_ref().map(|ty| type_ref(ty, 0)),
                params,
            },
            owner: Some(self.current_owner),
            flags: Self::member_flags(&method.modifiers, enclosing),
            scope: Some(self.current_scope),
            unit: Some(self.unit),
            position: method.name.position,
            span: method.span,
        });
        self.scopes.set_owner(params, id);

        self.with_scope(params, id, |b| {
            b.declare_type_parameters(&method.type_parameters);
            for param in &method.parameters {
                b.declare_parameter(param, VariableKind::Parameter);
            }
            if let Some(body) = &method.body {
                b.visit_block(body);
            }
            if let Some(value) = &method.default_value {
                b.visit_expr(value);
            }
        });
    }

    fn declare_initializer(&mut self, init: &Initializer) {
        let (name, kind, flags) = if init.is_static {
            (
                MethodKind::STATIC_INITIALIZER_NAME,
                MethodKind::StaticInitializer,
                Flags::STATIC,
            )
        } else {
            (
                MethodKind::INSTANCE_INITIALIZER_NAME,
                MethodKind::InstanceInitializer,
                Flags::empty(),
            )
        };

        let params = self.scopes.create_unit_scope(
            self.unit,
            ScopeKind::Method,
            Some(self.current_scope),
            init.span,
        );
        let id = self.symbols.declare(Declaration {
            name,
            kind: SymbolKind::Method {
                kind,
                return_type: None,
                params,
            },
            owner: Some(self.current_owner),
            flags,
            scope: Some(self.current_scope),
            unit: Some(self.unit),
            position: init.span.start,
            span: init.span,
        });
        self.scopes.set_owner(params, id);

        self.with_scope(params, id, |b| b.visit_block(&init.body));
    }

    fn declare_variable(
        &mut self,
        kind: VariableKind,
        name: &Ident,
        declared_type: TypeRef,
        flags: Flags,
        span: Span,
    ) -> SymbolId {
        self.symbols.declare(Declaration {
            name: &name.name,
            kind: SymbolKind::Variable {
                kind,
                declared_type,
            },
            owner: Some(self.current_owner),
            flags,
            scope: Some(self.current_scope),
            unit: Some(self.unit),
            position: name.position,
            span,
        })
    }

    fn declare_parameter(&mut self, param: &Parameter, kind: VariableKind) -> SymbolId {
        let declared_type = if param.varargs {
            TypeRef::absent(param.ty.span().start)
        } else {
            type_ref(&param.ty, 0)
        };
        self.declare_variable(
            kind,
            &param.name,
            declared_type,
            Flags::from_modifiers(&param.modifiers),
            param.span,
        )
    }

    fn declare_locals(&mut self, decl: &LocalVariableDecl, kind: VariableKind) {
        let flags = Flags::from_modifiers(&decl.modifiers);
        for declarator in &decl.declarators {
            self.declare_variable(
                kind,
                &declarator.name,
                type_ref(&decl.ty, declarator.dimensions),
                flags,
                declarator.span,
            );
            if let Some(init) = &declarator.initializer {
                self.visit_expr(init);
            }
        }
    }

    fn visit_block(&mut self, block: &Block) {
        self.nested(ScopeKind::Block, block.span, |b| {
            for stmt in &block.statements {
                b.visit_stmt(stmt);
            }
        });
    }

    fn visit_switch_block(&mut self, block: &SwitchBlock) {
        self.nested(ScopeKind::Block, block.span, |b| {
            for group in &block.groups {
                for label in &group.labels {
                    b.visit_expr(label);
                }
                for stmt in &group.statements {
                    b.visit_stmt(stmt);
                }
            }
        });
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.visit_block(block),
            Stmt::LocalVariable(decl) => self.declare_locals(decl, VariableKind::Local),
            Stmt::LocalClass(decl) => {
                let site = TypeSite {
                    declare_in: self.current_scope,
                    lexical_parent: self.current_scope,
                    owner: self.current_owner,
                    enclosing: None,
                };
                self.declare_type(decl, site);
            }
            Stmt::Expression(expr) => self.visit_expr(expr),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.visit_expr(condition);
                self.visit_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.visit_stmt(else_branch);
                }
            }
            Stmt::While {
                condition, body, ..
            }
            | Stmt::DoWhile {
                condition, body, ..
            } => {
                self.visit_expr(condition);
                self.visit_stmt(body);
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
                span,
            } => self.nested(ScopeKind::For, *span, |b| {
                for item in init {
                    match item {
                        ForInit::Variable(decl) => b.declare_locals(decl, VariableKind::Local),
                        ForInit::Expression(expr) => b.visit_expr(expr),
                    }
                }
                if let Some(condition) = condition {
                    b.visit_expr(condition);
                }
                for expr in update {
                    b.visit_expr(expr);
                }
                b.visit_stmt(body);
            }),
            Stmt::ForEach {
                variable,
                iterable,
                body,
                span,
            } => self.nested(ScopeKind::For, *span, |b| {
                b.visit_expr(iterable);
                b.declare_parameter(variable, VariableKind::Local);
                b.visit_stmt(body);
            }),
            Stmt::Labeled { label, body, span } => self.nested(ScopeKind::Label, *span, |b| {
                b.symbols.declare(Declaration {
                    name: &label.name,
                    kind: SymbolKind::Label,
                    owner: Some(b.current_owner),
                    flags: Flags::empty(),
                    scope: Some(b.current_scope),
                    unit: Some(b.unit),
                    position: label.position,
                    span: *span,
                });
                b.visit_stmt(body);
            }),
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            Stmt::Throw { value, .. } | Stmt::Yield { value, .. } => self.visit_expr(value),
            Stmt::Assert {
                condition, detail, ..
            } => {
                self.visit_expr(condition);
                if let Some(detail) = detail {
                    self.visit_expr(detail);
                }
            }
            Stmt::Synchronized { lock, body, .. } => {
                self.visit_expr(lock);
                self.visit_block(body);
            }
            Stmt::Try {
                resources,
                body,
                catches,
                finally,
                span,
            } => {
                if resources.is_empty() {
                    self.visit_block(body);
                } else {
                    self.nested(ScopeKind::Resource, *span, |b| {
                        for resource in resources {
                            match resource {
                                Resource::Variable {
                                    modifiers,
                                    ty,
                                    name,
                                    value,
                                    span,
                                } => {
                                    b.declare_variable(
                                        VariableKind::Resource,
                                        name,
                                        type_ref(ty, 0),
                                        Flags::from_modifiers(modifiers),
                                        *span,
                                    );
                                    b.visit_expr(value);
                                }
                                Resource::Expression(expr) => b.visit_expr(expr),
                            }
                        }
                        b.visit_block(body);
                    });
                }
                for clause in catches {
                    self.nested(ScopeKind::Catch, clause.span, |b| {
                        let declared_type = match clause.types.as_slice() {
                            [single] => type_ref(single, 0),
                            _ => TypeRef::absent(clause.name.position),
                        };
                        b.declare_variable(
                            VariableKind::CatchParameter,
                            &clause.name,
                            declared_type,
                            Flags::from_modifiers(&clause.modifiers),
                            clause.span,
                        );
                        b.visit_block(&clause.body);
                    });
                }
                if let Some(finally) = finally {
                    self.visit_block(finally);
                }
            }
            Stmt::ConstructorCall {
                qualifier,
                arguments,
                ..
            } => {
                if let Some(qualifier) = qualifier {
                    self.visit_expr(qualifier);
                }
                for arg in arguments {
                    self.visit_expr(arg);
                }
            }
            Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Empty => {}
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(_)
            | Expr::Literal { .. }
            | Expr::ClassLiteral { .. }
            | Expr::Type(_) => {}
            Expr::FieldAccess { target, .. } => self.visit_expr(target),
            Expr::MethodCall {
                target, arguments, ..
            } => {
                if let Some(target) = target {
                    self.visit_expr(target);
                }
                for arg in arguments {
                    self.visit_expr(arg);
                }
            }
            Expr::New {
                qualifier,
                ty,
                arguments,
                body,
                ..
            } => {
                if let Some(qualifier) = qualifier {
                    self.visit_expr(qualifier);
                }
                for arg in arguments {
                    self.visit_expr(arg);
                }
                if let Some(body) = body {
                    self.declare_anonymous(body, type_ref(ty, 0));
                }
            }
            Expr::NewArray {
                dimensions,
                initializer,
                ..
            } => {
                for dim in dimensions {
                    self.visit_expr(dim);
                }
                if let Some(initializer) = initializer {
                    self.visit_expr(initializer);
                }
            }
            Expr::ArrayInitializer { elements, .. } => {
                for element in elements {
                    self.visit_expr(element);
                }
            }
            Expr::This { qualifier, .. } | Expr::Super { qualifier, .. } => {
                if let Some(qualifier) = qualifier {
                    self.visit_expr(qualifier);
                }
            }
            Expr::Assign { target, value, .. } => {
                self.visit_expr(target);
                self.visit_expr(value);
            }
            Expr::Binary { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            Expr::Unary { operand, .. } => self.visit_expr(operand),
            Expr::Cast { value, .. } => self.visit_expr(value),
            Expr::InstanceOf {
                value, ty, binding, ..
            } => {
                self.visit_expr(value);
                if let Some(binding) = binding {
                    let declared_type = match ty {
                        Some(ty) => type_ref(ty, 0),
                        None => TypeRef::absent(binding.position),
                    };
                    self.declare_pattern_binding(binding, declared_type);
                }
            }
            Expr::Conditional {
                condition,
                then_value,
                else_value,
                ..
            } => {
                self.visit_expr(condition);
                self.visit_expr(then_value);
                self.visit_expr(else_value);
            }
            Expr::Lambda {
                parameters,
                body,
                span,
            } => self.nested(ScopeKind::Lambda, *span, |b| {
                for param in parameters {
                    match param {
                        LambdaParameter::Inferred(name) => {
                            b.declare_variable(
                                VariableKind::Parameter,
                                name,
                                TypeRef::absent(name.position),
                                Flags::empty(),
                                Span::new(name.position, name.position),
                            );
                        }
                        LambdaParameter::Typed(param) => {
                            b.declare_parameter(param, VariableKind::Parameter);
                        }
                    }
                }
                match body {
                    LambdaBody::Expr(expr) => b.visit_expr(expr),
                    LambdaBody::Block(block) => b.visit_block(block),
                }
            }),
            Expr::MethodReference { target, .. } => self.visit_expr(target),
            Expr::ArrayAccess { array, index, .. } => {
                self.visit_expr(array);
                self.visit_expr(index);
            }
            Expr::Switch {
                selector, block, ..
            } => {
                self.visit_expr(selector);
                self.visit_switch_block(block);
            }
            Expr::Parenthesized { inner, .. } => self.visit_expr(inner),
            Expr::Opaque { children, .. } => {
                for child in children {
                    self.visit_expr(child);
                }
            }
        }
    }

    /// Pattern variables only live in executable scopes.
    fn declare_pattern_binding(&mut self, binding: &Ident, declared_type: TypeRef) {
        let kind = self.scopes.get(self.current_scope).kind;
        if matches!(
            kind,
            ScopeKind::Type | ScopeKind::Package | ScopeKind::CompilationUnit
        ) {
            return;
        }
        self.declare_variable(
            VariableKind::PatternBinding,
            binding,
            declared_type,
            Flags::empty(),
            Span::new(binding.position, binding.position),
        );
    }
}
