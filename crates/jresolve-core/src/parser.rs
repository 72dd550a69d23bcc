//! Parser module for Java source code
//!
//! Parses source files with tree-sitter and lowers the concrete syntax tree
//! into the [`crate::syntax`] model. Parsing is error tolerant: malformed
//! regions are reported as [`ParseError`]s and left out of the tree.

use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use tracing::trace;
use tree_sitter::{Node, Point};

use crate::syntax::{
    Annotation, AnnotationArgument, Block, CatchClause, ClassBody, CompilationUnit, EnumConstant,
    Expr, FieldDecl, ForInit, Ident, ImportDecl, Initializer, LambdaBody, LambdaParameter,
    LiteralKind, LocalVariableDecl, Member, MethodDecl, MethodDeclKind, Modifier, Modifiers,
    PackageDecl, Parameter, Position, QualifiedName, Resource, Span, Stmt, SwitchBlock,
    SwitchGroup, TypeDecl, TypeDeclKind, TypeNode, TypeParameter, VariableDeclarator,
};

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug)]
pub struct ParseResult {
    pub unit: CompilationUnit,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub filename: String,
    pub line_count: usize,
    pub has_errors: bool,
}

pub struct ParsedFile {
    source: String,
    metadata: FileMetadata,
    unit: CompilationUnit,
    errors: Vec<ParseError>,
    line_ranges: OnceLock<Vec<Range<usize>>>,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("metadata", &self.metadata)
            .field("types", &self.unit.types.len())
            .field("error_count", &self.errors.len())
            .finish()
    }
}

impl ParsedFile {
    pub fn from_source(filename: &str, source: &str) -> Self {
        let result = Parser::new().parse(filename, source);

        let line_count = if source.is_empty() {
            0
        } else {
            source.lines().count()
        };

        let metadata = FileMetadata {
            filename: filename.to_string(),
            line_count,
            has_errors: result.has_errors(),
        };

        Self {
            source: source.to_string(),
            metadata,
            unit: result.unit,
            errors: result.errors,
            line_ranges: OnceLock::new(),
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::from_source(&path.display().to_string(), &source))
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    pub fn unit(&self) -> &CompilationUnit {
        &self.unit
    }

    pub fn into_unit(self) -> CompilationUnit {
        self.unit
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn get_line(&self, line_number: usize) -> Option<&str> {
        if line_number == 0 {
            return None;
        }

        let ranges = self.line_ranges.get_or_init(|| self.build_line_ranges());
        let index = line_number - 1;

        ranges.get(index).map(|range| &self.source[range.clone()])
    }

    fn build_line_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;

        for (i, c) in self.source.char_indices() {
            if c == '\n' {
                ranges.push(start..i);
                start = i + 1;
            }
        }

        if start < self.source.len() || (start == 0 && !self.source.is_empty()) {
            ranges.push(start..self.source.len());
        }

        ranges
    }
}

#[derive(Debug, Clone, Default)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Parses `source`, always producing a compilation unit. Syntax errors
    /// are collected instead of aborting.
    pub fn parse(&self, filename: &str, source: &str) -> ParseResult {
        let empty = |message: String| ParseResult {
            unit: CompilationUnit {
                filename: filename.to_string(),
                package: None,
                imports: Vec::new(),
                types: Vec::new(),
                span: Span::default(),
            },
            errors: vec![ParseError {
                line: 1,
                column: 1,
                message,
            }],
        };

        let mut parser = tree_sitter::Parser::new();
        if let Err(err) = parser.set_language(&tree_sitter_java::LANGUAGE.into()) {
            return empty(format!("failed to load Java grammar: {err}"));
        }
        let Some(tree) = parser.parse(source, None) else {
            return empty("parser produced no syntax tree".to_string());
        };

        let root = tree.root_node();
        let columns = Columns::new(source);
        let mut errors = Vec::new();
        collect_errors(root, &columns, &mut errors);
        trace!(file = filename, errors = errors.len(), "parsed source");

        let lower = Lower {
            source: source.as_bytes(),
            columns,
        };
        ParseResult {
            unit: lower.compilation_unit(filename, root),
            errors,
        }
    }
}

fn collect_errors(node: Node<'_>, columns: &Columns<'_>, errors: &mut Vec<ParseError>) {
    if node.is_error() || node.is_missing() {
        let start = columns.position(node.start_position());
        let message = if node.is_missing() {
            format!("missing '{}'", node.kind())
        } else {
            "syntax error".to_string()
        };
        errors.push(ParseError {
            line: start.line as usize,
            column: start.column as usize,
            message,
        });
        return;
    }

    if node.has_error() {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            collect_errors(child, columns, errors);
        }
    }
}

/// Maps tree-sitter points, whose columns count bytes, to positions whose
/// columns count characters.
struct Columns<'s> {
    source: &'s str,
    line_starts: Vec<usize>,
}

impl<'s> Columns<'s> {
    fn new(source: &'s str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    fn position(&self, p: Point) -> Position {
        let column = self
            .line_starts
            .get(p.row)
            .and_then(|&start| self.source.get(start..start + p.column))
            .map_or(p.column, |prefix| prefix.chars().count());
        Position::new(p.row as u32 + 1, column as u32 + 1)
    }
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn fields<'t>(node: Node<'t>, name: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(name, &mut cursor).collect()
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    named_children(node).into_iter().find(|c| c.kind() == kind)
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == token);
    found
}

fn count_dimensions(node: Option<Node<'_>>) -> u32 {
    node.map(|dims| {
        let mut cursor = dims.walk();
        let count = dims.children(&mut cursor).filter(|c| c.kind() == "[").count();
        count as u32
    })
    .unwrap_or(0)
}

fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "annotation_type_declaration"
            | "record_declaration"
    )
}

fn is_annotation(kind: &str) -> bool {
    matches!(kind, "marker_annotation" | "annotation")
}

fn is_type(kind: &str) -> bool {
    matches!(
        kind,
        "void_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
            | "type_identifier"
            | "scoped_type_identifier"
            | "generic_type"
            | "array_type"
            | "annotated_type"
    )
}

fn with_dimensions(ty: TypeNode, extra: u32) -> TypeNode {
    if extra == 0 {
        return ty;
    }
    match ty {
        TypeNode::Array {
            element,
            dimensions,
            span,
        } => TypeNode::Array {
            element,
            dimensions: dimensions + extra,
            span,
        },
        other => {
            let span = other.span();
            TypeNode::Array {
                element: Box::new(other),
                dimensions: extra,
                span,
            }
        }
    }
}

/// Lowers tree-sitter-java nodes into the syntax model.
struct Lower<'s> {
    source: &'s [u8],
    columns: Columns<'s>,
}

impl<'s> Lower<'s> {
    fn point(&self, p: Point) -> Position {
        self.columns.position(p)
    }

    fn span(&self, node: Node<'_>) -> Span {
        Span::new(self.point(node.start_position()), self.point(node.end_position()))
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn ident(&self, node: Node<'_>) -> Ident {
        Ident::new(self.text(node), self.point(node.start_position()))
    }

    fn ident_field(&self, node: Node<'_>, field: &str) -> Ident {
        match node.child_by_field_name(field) {
            Some(name) => self.ident(name),
            None => Ident::new("", self.point(node.start_position())),
        }
    }

    fn compilation_unit(&self, filename: &str, root: Node<'_>) -> CompilationUnit {
        let mut package = None;
        let mut imports = Vec::new();
        let mut types = Vec::new();

        for child in named_children(root) {
            match child.kind() {
                "package_declaration" => package = Some(self.package(child)),
                "import_declaration" => imports.push(self.import(child)),
                kind if is_type_declaration(kind) => types.push(self.type_decl(child)),
                _ => {}
            }
        }

        CompilationUnit {
            filename: filename.to_string(),
            package,
            imports,
            types,
            span: self.span(root),
        }
    }

    fn package(&self, node: Node<'_>) -> PackageDecl {
        let mut annotations = Vec::new();
        let mut name = QualifiedName::default();
        for child in named_children(node) {
            match child.kind() {
                kind if is_annotation(kind) => annotations.push(self.annotation(child)),
                "identifier" | "scoped_identifier" => name = self.qualified(child),
                _ => {}
            }
        }
        PackageDecl {
            annotations,
            name,
            span: self.span(node),
        }
    }

    fn import(&self, node: Node<'_>) -> ImportDecl {
        let children = named_children(node);
        let name = children
            .iter()
            .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
            .map(|c| self.qualified(*c))
            .unwrap_or_default();

        ImportDecl {
            name,
            is_static: has_token(node, "static"),
            on_demand: children.iter().any(|c| c.kind() == "asterisk"),
            span: self.span(node),
        }
    }

    fn qualified(&self, node: Node<'_>) -> QualifiedName {
        let mut segments = Vec::new();
        let mut arguments = Vec::new();
        self.name_segments(node, &mut segments, &mut arguments);
        QualifiedName::new(segments)
    }

    /// Flattens a (possibly scoped or generic) name into its segments,
    /// collecting the type arguments found along the way.
    fn name_segments(&self, node: Node<'_>, segments: &mut Vec<Ident>, arguments: &mut Vec<TypeNode>) {
        match node.kind() {
            "identifier" | "type_identifier" => segments.push(self.ident(node)),
            "scoped_identifier" | "scoped_type_identifier" | "generic_type" => {
                for child in named_children(node) {
                    match child.kind() {
                        "type_arguments" => {
                            arguments.extend(named_children(child).into_iter().filter_map(|arg| {
                                (!is_annotation(arg.kind())).then(|| self.type_node(arg))
                            }))
                        }
                        kind if is_annotation(kind) => {}
                        _ => self.name_segments(child, segments, arguments),
                    }
                }
            }
            _ => {}
        }
    }

    fn modifiers_of(&self, node: Node<'_>) -> Modifiers {
        let mut modifiers = Modifiers::default();
        let Some(list) = child_of_kind(node, "modifiers") else {
            return modifiers;
        };

        let mut cursor = list.walk();
        for child in list.children(&mut cursor) {
            if is_annotation(child.kind()) {
                modifiers.annotations.push(self.annotation(child));
            } else if let Some(keyword) = Modifier::from_keyword(child.kind()) {
                modifiers.keywords.push(keyword);
            }
        }
        modifiers
    }

    fn annotation(&self, node: Node<'_>) -> Annotation {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.qualified(n))
            .unwrap_or_default();

        let arguments = node
            .child_by_field_name("arguments")
            .map(|list| {
                named_children(list)
                    .into_iter()
                    .map(|arg| match arg.kind() {
                        "element_value_pair" => AnnotationArgument {
                            key: arg.child_by_field_name("key").map(|k| self.ident(k)),
                            value: self.element_value(arg.child_by_field_name("value"), arg),
                        },
                        _ => AnnotationArgument {
                            key: None,
                            value: self.element_value(Some(arg), arg),
                        },
                    })
                    .collect()
            })
            .unwrap_or_default();

        Annotation {
            name,
            arguments,
            span: self.span(node),
        }
    }

    fn element_value(&self, node: Option<Node<'_>>, parent: Node<'_>) -> Expr {
        let Some(node) = node else {
            return Expr::Opaque {
                children: Vec::new(),
                span: self.span(parent),
            };
        };

        match node.kind() {
            "element_value_array_initializer" => Expr::ArrayInitializer {
                elements: named_children(node)
                    .into_iter()
                    .map(|c| self.element_value(Some(c), node))
                    .collect(),
                span: self.span(node),
            },
            // nested annotation: keep its type name and argument values
            kind if is_annotation(kind) => {
                let nested = self.annotation(node);
                let mut children = vec![Expr::Type(TypeNode::Named {
                    name: nested.name,
                    arguments: Vec::new(),
                    span: nested.span,
                })];
                children.extend(nested.arguments.into_iter().map(|a| a.value));
                Expr::Opaque {
                    children,
                    span: nested.span,
                }
            }
            _ => self.expr(node),
        }
    }

    fn type_parameters(&self, node: Option<Node<'_>>) -> Vec<TypeParameter> {
        let Some(node) = node else {
            return Vec::new();
        };

        named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "type_parameter")
            .map(|param| {
                let children = named_children(param);
                let name = children
                    .iter()
                    .find(|c| matches!(c.kind(), "type_identifier" | "identifier"))
                    .map(|c| self.ident(*c))
                    .unwrap_or_else(|| Ident::new("", self.point(param.start_position())));
                let bounds = children
                    .iter()
                    .find(|c| c.kind() == "type_bound")
                    .map(|bound| self.types_in(*bound))
                    .unwrap_or_default();
                TypeParameter { name, bounds }
            })
            .collect()
    }

    /// Type children of a list-like node such as `type_list` or `throws`.
    fn types_in(&self, node: Node<'_>) -> Vec<TypeNode> {
        named_children(node)
            .into_iter()
            .filter(|c| is_type(c.kind()))
            .map(|c| self.type_node(c))
            .collect()
    }

    fn type_list_in(&self, node: Option<Node<'_>>) -> Vec<TypeNode> {
        node.and_then(|n| child_of_kind(n, "type_list"))
            .map(|list| self.types_in(list))
            .unwrap_or_default()
    }

    fn type_node(&self, node: Node<'_>) -> TypeNode {
        match node.kind() {
            "void_type" | "integral_type" | "floating_point_type" | "boolean_type" => {
                TypeNode::Primitive {
                    name: self.text(node).to_string(),
                    span: self.span(node),
                }
            }
            "type_identifier" if self.text(node) == "var" => TypeNode::Inferred { span: self.span(node) },
            "type_identifier" | "identifier" | "scoped_type_identifier" | "scoped_identifier"
            | "generic_type" => {
                let mut segments = Vec::new();
                let mut arguments = Vec::new();
                self.name_segments(node, &mut segments, &mut arguments);
                TypeNode::Named {
                    name: QualifiedName::new(segments),
                    arguments,
                    span: self.span(node),
                }
            }
            "array_type" => {
                let element = match node.child_by_field_name("element") {
                    Some(element) => self.type_node(element),
                    None => TypeNode::Inferred { span: self.span(node) },
                };
                with_dimensions(element, count_dimensions(node.child_by_field_name("dimensions")))
            }
            "annotated_type" => match named_children(node)
                .into_iter()
                .rfind(|c| !is_annotation(c.kind()))
            {
                Some(inner) => self.type_node(inner),
                None => TypeNode::Inferred { span: self.span(node) },
            },
            "wildcard" => TypeNode::Wildcard {
                bound: named_children(node)
                    .into_iter()
                    .find(|c| is_type(c.kind()))
                    .map(|bound| Box::new(self.type_node(bound))),
                span: self.span(node),
            },
            kind => {
                trace!(kind, "unsupported type node");
                TypeNode::Inferred { span: self.span(node) }
            }
        }
    }

    fn type_field(&self, node: Node<'_>) -> TypeNode {
        match node.child_by_field_name("type") {
            Some(ty) => self.type_node(ty),
            None => TypeNode::Inferred { span: self.span(node) },
        }
    }

    fn type_decl(&self, node: Node<'_>) -> TypeDecl {
        let kind = match node.kind() {
            "interface_declaration" => TypeDeclKind::Interface,
            "enum_declaration" => TypeDeclKind::Enum,
            "annotation_type_declaration" => TypeDeclKind::Annotation,
            "record_declaration" => TypeDeclKind::Record,
            _ => TypeDeclKind::Class,
        };

        let superclass = node
            .child_by_field_name("superclass")
            .and_then(|sup| named_children(sup).into_iter().find(|c| is_type(c.kind())))
            .map(|sup| self.type_node(sup));

        let interfaces = match kind {
            TypeDeclKind::Interface => self.type_list_in(child_of_kind(node, "extends_interfaces")),
            _ => self.type_list_in(node.child_by_field_name("interfaces")),
        };

        let record_components = match kind {
            TypeDeclKind::Record => self.formal_parameters(node.child_by_field_name("parameters")),
            _ => Vec::new(),
        };

        let mut enum_constants = Vec::new();
        let body = match node.child_by_field_name("body") {
            Some(body) if body.kind() == "enum_body" => {
                let mut members = Vec::new();
                for child in named_children(body) {
                    match child.kind() {
                        "enum_constant" => enum_constants.push(self.enum_constant(child)),
                        "enum_body_declarations" => members.extend(
                            named_children(child)
                                .into_iter()
                                .filter_map(|m| self.member(m)),
                        ),
                        _ => {}
                    }
                }
                ClassBody {
                    members,
                    span: self.span(body),
                }
            }
            Some(body) => self.class_body(body),
            None => ClassBody::default(),
        };

        TypeDecl {
            kind,
            modifiers: self.modifiers_of(node),
            name: self.ident_field(node, "name"),
            type_parameters: self.type_parameters(node.child_by_field_name("type_parameters")),
            superclass,
            interfaces,
            record_components,
            enum_constants,
            body,
            span: self.span(node),
        }
    }

    fn enum_constant(&self, node: Node<'_>) -> EnumConstant {
        EnumConstant {
            modifiers: self.modifiers_of(node),
            name: self.ident_field(node, "name"),
            arguments: self.arguments(node.child_by_field_name("arguments")),
            body: node
                .child_by_field_name("body")
                .map(|body| self.class_body(body)),
            span: self.span(node),
        }
    }

    fn class_body(&self, node: Node<'_>) -> ClassBody {
        ClassBody {
            members: named_children(node)
                .into_iter()
                .filter_map(|child| self.member(child))
                .collect(),
            span: self.span(node),
        }
    }

    fn member(&self, node: Node<'_>) -> Option<Member> {
        let member = match node.kind() {
            "field_declaration" | "constant_declaration" => Member::Field(FieldDecl {
                modifiers: self.modifiers_of(node),
                ty: self.type_field(node),
                declarators: self.declarators(node),
                span: self.span(node),
            }),
            "method_declaration" => Member::Method(self.method(node, MethodDeclKind::Method)),
            "constructor_declaration" | "compact_constructor_declaration" => {
                Member::Method(self.method(node, MethodDeclKind::Constructor))
            }
            "annotation_type_element_declaration" => {
                Member::Method(self.method(node, MethodDeclKind::AnnotationElement))
            }
            kind if is_type_declaration(kind) => Member::Type(self.type_decl(node)),
            "block" => Member::Initializer(Initializer {
                is_static: false,
                body: self.block(node),
                span: self.span(node),
            }),
            "static_initializer" => Member::Initializer(Initializer {
                is_static: true,
                body: child_of_kind(node, "block")
                    .map(|b| self.block(b))
                    .unwrap_or_default(),
                span: self.span(node),
            }),
            _ => return None,
        };
        Some(member)
    }

    fn method(&self, node: Node<'_>, kind: MethodDeclKind) -> MethodDecl {
        let return_type = match kind {
            MethodDeclKind::Constructor => None,
            _ => Some(with_dimensions(
                self.type_field(node),
                count_dimensions(node.child_by_field_name("dimensions")),
            )),
        };

        let default_value = match kind {
            MethodDeclKind::AnnotationElement => node
                .child_by_field_name("value")
                .map(|value| self.element_value(Some(value), node)),
            _ => None,
        };

        MethodDecl {
            kind,
            modifiers: self.modifiers_of(node),
            type_parameters: self.type_parameters(node.child_by_field_name("type_parameters")),
            return_type,
            name: self.ident_field(node, "name"),
            parameters: self.formal_parameters(node.child_by_field_name("parameters")),
            throws: child_of_kind(node, "throws")
                .map(|throws| self.types_in(throws))
                .unwrap_or_default(),
            body: node.child_by_field_name("body").map(|body| self.block(body)),
            default_value,
            span: self.span(node),
        }
    }

    fn formal_parameters(&self, node: Option<Node<'_>>) -> Vec<Parameter> {
        let Some(node) = node else {
            return Vec::new();
        };

        named_children(node)
            .into_iter()
            .filter_map(|param| match param.kind() {
                "formal_parameter" => Some(self.parameter(param)),
                "spread_parameter" => {
                    let ty = named_children(param)
                        .into_iter()
                        .find(|c| is_type(c.kind()))
                        .map(|ty| self.type_node(ty))
                        .unwrap_or(TypeNode::Inferred { span: self.span(param) });
                    let name = child_of_kind(param, "variable_declarator")
                        .map(|d| self.ident_field(d, "name"))
                        .unwrap_or_else(|| Ident::new("", self.point(param.start_position())));
                    Some(Parameter {
                        modifiers: self.modifiers_of(param),
                        ty,
                        name,
                        varargs: true,
                        span: self.span(param),
                    })
                }
                _ => None,
            })
            .collect()
    }

    /// A declarator-like node with `type`, `name` and `dimensions` fields.
    fn parameter(&self, node: Node<'_>) -> Parameter {
        Parameter {
            modifiers: self.modifiers_of(node),
            ty: with_dimensions(
                self.type_field(node),
                count_dimensions(node.child_by_field_name("dimensions")),
            ),
            name: self.ident_field(node, "name"),
            varargs: false,
            span: self.span(node),
        }
    }

    fn declarators(&self, node: Node<'_>) -> Vec<VariableDeclarator> {
        fields(node, "declarator")
            .into_iter()
            .map(|declarator| VariableDeclarator {
                name: self.ident_field(declarator, "name"),
                dimensions: count_dimensions(declarator.child_by_field_name("dimensions")),
                initializer: declarator
                    .child_by_field_name("value")
                    .map(|value| self.initializer(value)),
                span: self.span(declarator),
            })
            .collect()
    }

    fn initializer(&self, node: Node<'_>) -> Expr {
        match node.kind() {
            "array_initializer" => Expr::ArrayInitializer {
                elements: named_children(node)
                    .into_iter()
                    .map(|c| self.initializer(c))
                    .collect(),
                span: self.span(node),
            },
            _ => self.expr(node),
        }
    }

    fn local_variable(&self, node: Node<'_>) -> LocalVariableDecl {
        LocalVariableDecl {
            modifiers: self.modifiers_of(node),
            ty: self.type_field(node),
            declarators: self.declarators(node),
            span: self.span(node),
        }
    }

    fn block(&self, node: Node<'_>) -> Block {
        Block {
            statements: named_children(node)
                .into_iter()
                .filter_map(|child| self.stmt(child))
                .collect(),
            span: self.span(node),
        }
    }

    fn boxed_stmt(&self, node: Option<Node<'_>>) -> Box<Stmt> {
        Box::new(node.and_then(|n| self.stmt(n)).unwrap_or(Stmt::Empty))
    }

    fn block_field(&self, node: Node<'_>, field: &str) -> Block {
        node.child_by_field_name(field)
            .map(|b| self.block(b))
            .unwrap_or_default()
    }

    fn expr_field(&self, node: Node<'_>, field: &str) -> Expr {
        match node.child_by_field_name(field) {
            Some(child) => self.expr(child),
            None => Expr::Opaque {
                children: Vec::new(),
                span: self.span(node),
            },
        }
    }

    fn stmt(&self, node: Node<'_>) -> Option<Stmt> {
        let stmt = match node.kind() {
            "block" => Stmt::Block(self.block(node)),
            "local_variable_declaration" => Stmt::LocalVariable(self.local_variable(node)),
            kind if is_type_declaration(kind) => Stmt::LocalClass(Box::new(self.type_decl(node))),
            "expression_statement" => match named_children(node).first() {
                Some(expr) => Stmt::Expression(self.expr(*expr)),
                None => Stmt::Empty,
            },
            "switch_expression" => Stmt::Expression(self.expr(node)),
            "labeled_statement" => {
                let children = named_children(node);
                Stmt::Labeled {
                    label: children
                        .first()
                        .map(|l| self.ident(*l))
                        .unwrap_or_else(|| Ident::new("", self.point(node.start_position()))),
                    body: self.boxed_stmt(children.get(1).copied()),
                    span: self.span(node),
                }
            }
            "if_statement" => Stmt::If {
                condition: self.expr_field(node, "condition"),
                then_branch: self.boxed_stmt(node.child_by_field_name("consequence")),
                else_branch: node
                    .child_by_field_name("alternative")
                    .map(|alt| self.boxed_stmt(Some(alt))),
                span: self.span(node),
            },
            "while_statement" => Stmt::While {
                condition: self.expr_field(node, "condition"),
                body: self.boxed_stmt(node.child_by_field_name("body")),
                span: self.span(node),
            },
            "do_statement" => Stmt::DoWhile {
                body: self.boxed_stmt(node.child_by_field_name("body")),
                condition: self.expr_field(node, "condition"),
                span: self.span(node),
            },
            "for_statement" => Stmt::For {
                init: fields(node, "init")
                    .into_iter()
                    .map(|init| match init.kind() {
                        "local_variable_declaration" => {
                            ForInit::Variable(self.local_variable(init))
                        }
                        _ => ForInit::Expression(self.expr(init)),
                    })
                    .collect(),
                condition: node
                    .child_by_field_name("condition")
                    .map(|c| self.expr(c)),
                update: fields(node, "update")
                    .into_iter()
                    .map(|u| self.expr(u))
                    .collect(),
                body: self.boxed_stmt(node.child_by_field_name("body")),
                span: self.span(node),
            },
            "enhanced_for_statement" => Stmt::ForEach {
                variable: self.parameter(node),
                iterable: self.expr_field(node, "value"),
                body: self.boxed_stmt(node.child_by_field_name("body")),
                span: self.span(node),
            },
            "break_statement" => Stmt::Break {
                label: child_of_kind(node, "identifier").map(|l| self.ident(l)),
                span: self.span(node),
            },
            "continue_statement" => Stmt::Continue {
                label: child_of_kind(node, "identifier").map(|l| self.ident(l)),
                span: self.span(node),
            },
            "return_statement" => Stmt::Return {
                value: named_children(node).first().map(|v| self.expr(*v)),
                span: self.span(node),
            },
            "throw_statement" | "yield_statement" => {
                let value = match named_children(node).first() {
                    Some(value) => self.expr(*value),
                    None => Expr::Opaque {
                        children: Vec::new(),
                        span: self.span(node),
                    },
                };
                if node.kind() == "throw_statement" {
                    Stmt::Throw {
                        value,
                        span: self.span(node),
                    }
                } else {
                    Stmt::Yield {
                        value,
                        span: self.span(node),
                    }
                }
            }
            "assert_statement" => {
                let mut parts = named_children(node).into_iter().map(|c| self.expr(c));
                Stmt::Assert {
                    condition: parts.next().unwrap_or(Expr::Opaque {
                        children: Vec::new(),
                        span: self.span(node),
                    }),
                    detail: parts.next(),
                    span: self.span(node),
                }
            }
            "synchronized_statement" => Stmt::Synchronized {
                lock: match child_of_kind(node, "parenthesized_expression") {
                    Some(lock) => self.expr(lock),
                    None => Expr::Opaque {
                        children: Vec::new(),
                        span: self.span(node),
                    },
                },
                body: self.block_field(node, "body"),
                span: self.span(node),
            },
            "try_statement" | "try_with_resources_statement" => {
                let children = named_children(node);
                Stmt::Try {
                    resources: node
                        .child_by_field_name("resources")
                        .map(|spec| {
                            named_children(spec)
                                .into_iter()
                                .filter(|r| r.kind() == "resource")
                                .map(|r| self.resource(r))
                                .collect()
                        })
                        .unwrap_or_default(),
                    body: self.block_field(node, "body"),
                    catches: children
                        .iter()
                        .filter(|c| c.kind() == "catch_clause")
                        .map(|c| self.catch_clause(*c))
                        .collect(),
                    finally: children
                        .iter()
                        .find(|c| c.kind() == "finally_clause")
                        .and_then(|f| child_of_kind(*f, "block"))
                        .map(|b| self.block(b)),
                    span: self.span(node),
                }
            }
            "explicit_constructor_invocation" => Stmt::ConstructorCall {
                qualifier: node.child_by_field_name("object").map(|o| self.expr(o)),
                arguments: self.arguments(node.child_by_field_name("arguments")),
                span: self.span(node),
            },
            kind => {
                trace!(kind, "skipped statement");
                return None;
            }
        };
        Some(stmt)
    }

    fn resource(&self, node: Node<'_>) -> Resource {
        if node.child_by_field_name("type").is_some() {
            let param = self.parameter(node);
            return Resource::Variable {
                modifiers: param.modifiers,
                ty: param.ty,
                name: param.name,
                value: self.expr_field(node, "value"),
                span: self.span(node),
            };
        }

        match named_children(node).first() {
            Some(expr) => Resource::Expression(self.expr(*expr)),
            None => Resource::Expression(Expr::Opaque {
                children: Vec::new(),
                span: self.span(node),
            }),
        }
    }

    fn catch_clause(&self, node: Node<'_>) -> CatchClause {
        let param = child_of_kind(node, "catch_formal_parameter");
        CatchClause {
            modifiers: param.map(|p| self.modifiers_of(p)).unwrap_or_default(),
            types: param
                .and_then(|p| child_of_kind(p, "catch_type"))
                .map(|types| self.types_in(types))
                .unwrap_or_default(),
            name: match param {
                Some(p) => self.ident_field(p, "name"),
                None => Ident::new("", self.point(node.start_position())),
            },
            body: self.block_field(node, "body"),
            span: self.span(node),
        }
    }

    fn arguments(&self, node: Option<Node<'_>>) -> Vec<Expr> {
        node.map(|list| {
            named_children(list)
                .into_iter()
                .map(|arg| self.expr(arg))
                .collect()
        })
        .unwrap_or_default()
    }

    fn switch_block(&self, node: Option<Node<'_>>) -> SwitchBlock {
        let Some(node) = node else {
            return SwitchBlock::default();
        };

        let groups = named_children(node)
            .into_iter()
            .filter(|g| matches!(g.kind(), "switch_block_statement_group" | "switch_rule"))
            .map(|group| {
                let mut labels = Vec::new();
                let mut statements = Vec::new();
                for child in named_children(group) {
                    if child.kind() == "switch_label" {
                        labels.extend(self.case_labels(child));
                    } else if let Some(stmt) = self.stmt(child) {
                        statements.push(stmt);
                    }
                }
                SwitchGroup {
                    labels,
                    statements,
                    span: self.span(group),
                }
            })
            .collect();

        SwitchBlock {
            groups,
            span: self.span(node),
        }
    }

    fn case_labels(&self, node: Node<'_>) -> Vec<Expr> {
        named_children(node)
            .into_iter()
            .map(|label| match label.kind() {
                "pattern" | "type_pattern" | "record_pattern" => self.pattern(label),
                "guard" => Expr::Opaque {
                    children: named_children(label)
                        .into_iter()
                        .map(|c| self.expr(c))
                        .collect(),
                    span: self.span(label),
                },
                _ => self.expr(label),
            })
            .collect()
    }

    /// A case pattern lowers to a type test on an unnamed value so its
    /// binding is declared like an `instanceof` binding.
    fn pattern(&self, node: Node<'_>) -> Expr {
        if node.kind() == "pattern" {
            if let Some(inner) = named_children(node).first() {
                return self.pattern(*inner);
            }
        }

        let children = named_children(node);
        let ty = children
            .iter()
            .find(|c| is_type(c.kind()))
            .map(|ty| self.type_node(*ty));
        let binding = match node.kind() {
            "type_pattern" => children
                .iter()
                .rfind(|c| c.kind() == "identifier")
                .map(|c| self.ident(*c)),
            _ => None,
        };

        Expr::InstanceOf {
            value: Box::new(Expr::Opaque {
                children: Vec::new(),
                span: self.span(node),
            }),
            ty,
            binding,
            span: self.span(node),
        }
    }

    fn lambda_parameters(&self, node: Option<Node<'_>>) -> Vec<LambdaParameter> {
        let Some(node) = node else {
            return Vec::new();
        };

        match node.kind() {
            "identifier" => vec![LambdaParameter::Inferred(self.ident(node))],
            "inferred_parameters" => named_children(node)
                .into_iter()
                .map(|p| LambdaParameter::Inferred(self.ident(p)))
                .collect(),
            _ => self
                .formal_parameters(Some(node))
                .into_iter()
                .map(LambdaParameter::Typed)
                .collect(),
        }
    }

    fn literal(kind: &str) -> Option<LiteralKind> {
        let literal = match kind {
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal" => LiteralKind::Integer,
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                LiteralKind::Floating
            }
            "true" | "false" => LiteralKind::Boolean,
            "character_literal" => LiteralKind::Character,
            "string_literal" | "text_block" => LiteralKind::String,
            "null_literal" => LiteralKind::Null,
            _ => return None,
        };
        Some(literal)
    }

    fn boxed_field(&self, node: Node<'_>, field: &str) -> Box<Expr> {
        Box::new(self.expr_field(node, field))
    }

    /// `X.super` inside a field access or method call: a `super` child
    /// that is not itself the object.
    fn super_qualified(&self, node: Node<'_>, object: Node<'_>) -> bool {
        named_children(node)
            .iter()
            .any(|c| c.kind() == "super" && c.id() != object.id())
    }

    fn target_of(&self, node: Node<'_>, object: Node<'_>) -> Expr {
        let target = self.expr(object);
        if self.super_qualified(node, object) {
            Expr::Super {
                qualifier: Some(Box::new(target)),
                span: self.span(node),
            }
        } else {
            target
        }
    }

    fn expr(&self, node: Node<'_>) -> Expr {
        if let Some(kind) = Self::literal(node.kind()) {
            return Expr::Literal {
                kind,
                span: self.span(node),
            };
        }

        match node.kind() {
            "identifier" => Expr::Name(self.ident(node)),
            "parenthesized_expression" => Expr::Parenthesized {
                inner: Box::new(match named_children(node).first() {
                    Some(inner) => self.expr(*inner),
                    None => Expr::Opaque {
                        children: Vec::new(),
                        span: self.span(node),
                    },
                }),
                span: self.span(node),
            },
            "field_access" => {
                let Some(object) = node.child_by_field_name("object") else {
                    return self.opaque(node);
                };
                let target = self.target_of(node, object);
                match node.child_by_field_name("field") {
                    Some(field) if field.kind() == "this" => Expr::This {
                        qualifier: Some(Box::new(target)),
                        span: self.span(node),
                    },
                    Some(field) => Expr::FieldAccess {
                        target: Box::new(target),
                        field: self.ident(field),
                        span: self.span(node),
                    },
                    None => self.opaque(node),
                }
            }
            "method_invocation" => Expr::MethodCall {
                target: node
                    .child_by_field_name("object")
                    .map(|object| Box::new(self.target_of(node, object))),
                name: self.ident_field(node, "name"),
                arguments: self.arguments(node.child_by_field_name("arguments")),
                span: self.span(node),
            },
            "object_creation_expression" => {
                let ty = node.child_by_field_name("type");
                let qualifier = named_children(node)
                    .into_iter()
                    .next()
                    .filter(|first| {
                        ty.is_none_or(|ty| ty.id() != first.id())
                            && !matches!(first.kind(), "type_arguments" | "argument_list")
                    })
                    .map(|q| Box::new(self.expr(q)));
                Expr::New {
                    qualifier,
                    ty: match ty {
                        Some(ty) => self.type_node(ty),
                        None => TypeNode::Inferred { span: self.span(node) },
                    },
                    arguments: self.arguments(node.child_by_field_name("arguments")),
                    body: child_of_kind(node, "class_body").map(|body| self.class_body(body)),
                    span: self.span(node),
                }
            }
            "array_creation_expression" => Expr::NewArray {
                ty: self.type_field(node),
                dimensions: fields(node, "dimensions")
                    .into_iter()
                    .filter(|d| d.kind() == "dimensions_expr")
                    .filter_map(|d| {
                        named_children(d)
                            .into_iter()
                            .find(|c| !is_annotation(c.kind()))
                    })
                    .map(|d| self.expr(d))
                    .collect(),
                initializer: node
                    .child_by_field_name("value")
                    .map(|value| Box::new(self.initializer(value))),
                span: self.span(node),
            },
            "array_initializer" => self.initializer(node),
            "this" => Expr::This {
                qualifier: None,
                span: self.span(node),
            },
            "super" => Expr::Super {
                qualifier: None,
                span: self.span(node),
            },
            "class_literal" => match named_children(node).first() {
                Some(ty) => Expr::ClassLiteral {
                    ty: self.type_node(*ty),
                    span: self.span(node),
                },
                None => self.opaque(node),
            },
            "assignment_expression" => Expr::Assign {
                target: self.boxed_field(node, "left"),
                value: self.boxed_field(node, "right"),
                span: self.span(node),
            },
            "binary_expression" => Expr::Binary {
                left: self.boxed_field(node, "left"),
                right: self.boxed_field(node, "right"),
                span: self.span(node),
            },
            "unary_expression" => Expr::Unary {
                operand: self.boxed_field(node, "operand"),
                span: self.span(node),
            },
            "update_expression" => match named_children(node).first() {
                Some(operand) => Expr::Unary {
                    operand: Box::new(self.expr(*operand)),
                    span: self.span(node),
                },
                None => self.opaque(node),
            },
            "cast_expression" => Expr::Cast {
                types: fields(node, "type")
                    .into_iter()
                    .map(|ty| self.type_node(ty))
                    .collect(),
                value: self.boxed_field(node, "value"),
                span: self.span(node),
            },
            "instanceof_expression" => {
                let ty = node
                    .child_by_field_name("right")
                    .or_else(|| {
                        node.child_by_field_name("pattern").and_then(|p| {
                            named_children(p)
                                .into_iter()
                                .find(|c| is_type(c.kind()) || c.kind() == "identifier")
                        })
                    })
                    .map(|ty| self.type_node(ty));
                Expr::InstanceOf {
                    value: self.boxed_field(node, "left"),
                    ty,
                    binding: node.child_by_field_name("name").map(|n| self.ident(n)),
                    span: self.span(node),
                }
            }
            "ternary_expression" => Expr::Conditional {
                condition: self.boxed_field(node, "condition"),
                then_value: self.boxed_field(node, "consequence"),
                else_value: self.boxed_field(node, "alternative"),
                span: self.span(node),
            },
            "lambda_expression" => Expr::Lambda {
                parameters: self.lambda_parameters(node.child_by_field_name("parameters")),
                body: match node.child_by_field_name("body") {
                    Some(body) if body.kind() == "block" => LambdaBody::Block(self.block(body)),
                    Some(body) => LambdaBody::Expr(Box::new(self.expr(body))),
                    None => LambdaBody::Block(Block::default()),
                },
                span: self.span(node),
            },
            "method_reference" => {
                let children = named_children(node);
                let Some(first) = children.first().copied() else {
                    return self.opaque(node);
                };
                let target = if is_type(first.kind()) {
                    Expr::Type(self.type_node(first))
                } else {
                    self.expr(first)
                };
                let name = children
                    .iter()
                    .skip(1)
                    .rfind(|c| c.kind() == "identifier")
                    .map(|n| self.ident(*n));
                Expr::MethodReference {
                    target: Box::new(target),
                    name,
                    span: self.span(node),
                }
            }
            "array_access" => Expr::ArrayAccess {
                array: self.boxed_field(node, "array"),
                index: self.boxed_field(node, "index"),
                span: self.span(node),
            },
            "switch_expression" => Expr::Switch {
                selector: self.boxed_field(node, "condition"),
                block: self.switch_block(node.child_by_field_name("body")),
                span: self.span(node),
            },
            kind if is_type(kind) => Expr::Type(self.type_node(node)),
            _ => self.opaque(node),
        }
    }

    fn opaque(&self, node: Node<'_>) -> Expr {
        Expr::Opaque {
            children: named_children(node)
                .into_iter()
                .filter(|c| !is_type(c.kind()))
                .map(|c| self.expr(c))
                .collect(),
            span: self.span(node),
        }
    }
}
