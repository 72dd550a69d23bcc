//! Syntax tree consumed by the semantic passes
//!
//! The tree is plain owned data. Identifiers carry the [`Position`] of their
//! first character, and every declaration or scoping construct carries the
//! [`Span`] it covers. Positions are 1-based in both line and column.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn contains_line(&self, line: u32) -> bool {
        self.start.line <= line && line <= self.end.line
    }

    pub fn encloses(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Number of lines covered, used to pick the innermost of several spans.
    pub fn line_extent(&self) -> u32 {
        self.end.line.saturating_sub(self.start.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub position: Position,
}

impl Ident {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// A dotted name such as `java.util.List` or `Outer.Inner`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QualifiedName {
    pub segments: Vec<Ident>,
}

impl QualifiedName {
    pub fn new(segments: Vec<Ident>) -> Self {
        Self { segments }
    }

    pub fn simple(ident: Ident) -> Self {
        Self {
            segments: vec![ident],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first(&self) -> Option<&Ident> {
        self.segments.first()
    }

    pub fn last(&self) -> Option<&Ident> {
        self.segments.last()
    }

    pub fn position(&self) -> Position {
        self.first().map(|i| i.position).unwrap_or_default()
    }

    pub fn to_dotted(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub filename: String,
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PackageDecl {
    pub annotations: Vec<Annotation>,
    pub name: QualifiedName,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub name: QualifiedName,
    pub is_static: bool,
    pub on_demand: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
    Strictfp,
    Default,
    Synchronized,
    Native,
    Transient,
    Volatile,
    Sealed,
    NonSealed,
}

impl Modifier {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let modifier = match keyword {
            "public" => Modifier::Public,
            "protected" => Modifier::Protected,
            "private" => Modifier::Private,
            "abstract" => Modifier::Abstract,
            "static" => Modifier::Static,
            "final" => Modifier::Final,
            "strictfp" => Modifier::Strictfp,
            "default" => Modifier::Default,
            "synchronized" => Modifier::Synchronized,
            "native" => Modifier::Native,
            "transient" => Modifier::Transient,
            "volatile" => Modifier::Volatile,
            "sealed" => Modifier::Sealed,
            "non-sealed" => Modifier::NonSealed,
            _ => return None,
        };
        Some(modifier)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Modifiers {
    pub keywords: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
}

impl Modifiers {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.keywords.contains(&modifier)
    }
}

#[derive(Debug, Clone)]
pub struct Annotation {
    pub name: QualifiedName,
    pub arguments: Vec<AnnotationArgument>,
    pub span: Span,
}

/// `key = value` pair of an annotation, or the single unnamed `value`.
#[derive(Debug, Clone)]
pub struct AnnotationArgument {
    pub key: Option<Ident>,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeDeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub kind: TypeDeclKind,
    pub modifiers: Modifiers,
    pub name: Ident,
    pub type_parameters: Vec<TypeParameter>,
    pub superclass: Option<TypeNode>,
    pub interfaces: Vec<TypeNode>,
    pub record_components: Vec<Parameter>,
    pub enum_constants: Vec<EnumConstant>,
    pub body: ClassBody,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeParameter {
    pub name: Ident,
    pub bounds: Vec<TypeNode>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassBody {
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Type(TypeDecl),
    Initializer(Initializer),
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: TypeNode,
    pub declarators: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    pub name: Ident,
    pub dimensions: u32,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodDeclKind {
    Method,
    Constructor,
    AnnotationElement,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub kind: MethodDeclKind,
    pub modifiers: Modifiers,
    pub type_parameters: Vec<TypeParameter>,
    /// `None` for constructors.
    pub return_type: Option<TypeNode>,
    pub name: Ident,
    pub parameters: Vec<Parameter>,
    pub throws: Vec<TypeNode>,
    pub body: Option<Block>,
    pub default_value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub modifiers: Modifiers,
    pub ty: TypeNode,
    pub name: Ident,
    pub varargs: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumConstant {
    pub modifiers: Modifiers,
    pub name: Ident,
    pub arguments: Vec<Expr>,
    pub body: Option<ClassBody>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Initializer {
    pub is_static: bool,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeNode {
    /// Primitive types and `void`.
    Primitive { name: String, span: Span },
    /// Class or interface type. Type arguments of every segment are
    /// collected in `arguments`.
    Named {
        name: QualifiedName,
        arguments: Vec<TypeNode>,
        span: Span,
    },
    Array {
        element: Box<TypeNode>,
        dimensions: u32,
        span: Span,
    },
    Wildcard {
        bound: Option<Box<TypeNode>>,
        span: Span,
    },
    /// `var` in local declarations and lambda parameters.
    Inferred { span: Span },
}

impl TypeNode {
    pub fn span(&self) -> Span {
        match self {
            TypeNode::Primitive { span, .. }
            | TypeNode::Named { span, .. }
            | TypeNode::Array { span, .. }
            | TypeNode::Wildcard { span, .. }
            | TypeNode::Inferred { span } => *span,
        }
    }

    pub fn named(&self) -> Option<&QualifiedName> {
        match self {
            TypeNode::Named { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalVariableDecl {
    pub modifiers: Modifiers,
    pub ty: TypeNode,
    pub declarators: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Block),
    LocalVariable(LocalVariableDecl),
    LocalClass(Box<TypeDecl>),
    Expression(Expr),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
        span: Span,
    },
    For {
        init: Vec<ForInit>,
        condition: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Stmt>,
        span: Span,
    },
    ForEach {
        variable: Parameter,
        iterable: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    Labeled {
        label: Ident,
        body: Box<Stmt>,
        span: Span,
    },
    Break {
        label: Option<Ident>,
        span: Span,
    },
    Continue {
        label: Option<Ident>,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    Throw {
        value: Expr,
        span: Span,
    },
    Yield {
        value: Expr,
        span: Span,
    },
    Assert {
        condition: Expr,
        detail: Option<Expr>,
        span: Span,
    },
    Synchronized {
        lock: Expr,
        body: Block,
        span: Span,
    },
    Try {
        resources: Vec<Resource>,
        body: Block,
        catches: Vec<CatchClause>,
        finally: Option<Block>,
        span: Span,
    },
    /// `this(...)` or `super(...)` as the first statement of a constructor.
    ConstructorCall {
        qualifier: Option<Expr>,
        arguments: Vec<Expr>,
        span: Span,
    },
    Empty,
}

#[derive(Debug, Clone)]
pub enum ForInit {
    Variable(LocalVariableDecl),
    Expression(Expr),
}

#[derive(Debug, Clone)]
pub enum Resource {
    Variable {
        modifiers: Modifiers,
        ty: TypeNode,
        name: Ident,
        value: Expr,
        span: Span,
    },
    Expression(Expr),
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub modifiers: Modifiers,
    pub types: Vec<TypeNode>,
    pub name: Ident,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct SwitchBlock {
    pub groups: Vec<SwitchGroup>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SwitchGroup {
    /// Case constants; empty for `default`.
    pub labels: Vec<Expr>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Floating,
    Boolean,
    Character,
    String,
    Null,
}

#[derive(Debug, Clone)]
pub enum LambdaParameter {
    Inferred(Ident),
    Typed(Parameter),
}

impl LambdaParameter {
    pub fn name(&self) -> &Ident {
        match self {
            LambdaParameter::Inferred(ident) => ident,
            LambdaParameter::Typed(param) => &param.name,
        }
    }
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Name(Ident),
    FieldAccess {
        target: Box<Expr>,
        field: Ident,
        span: Span,
    },
    MethodCall {
        target: Option<Box<Expr>>,
        name: Ident,
        arguments: Vec<Expr>,
        span: Span,
    },
    New {
        qualifier: Option<Box<Expr>>,
        ty: TypeNode,
        arguments: Vec<Expr>,
        body: Option<ClassBody>,
        span: Span,
    },
    NewArray {
        ty: TypeNode,
        dimensions: Vec<Expr>,
        initializer: Option<Box<Expr>>,
        span: Span,
    },
    ArrayInitializer {
        elements: Vec<Expr>,
        span: Span,
    },
    /// `this`, or `Outer.this` when `qualifier` is set.
    This {
        qualifier: Option<Box<Expr>>,
        span: Span,
    },
    Super {
        qualifier: Option<Box<Expr>>,
        span: Span,
    },
    Literal {
        kind: LiteralKind,
        span: Span,
    },
    ClassLiteral {
        ty: TypeNode,
        span: Span,
    },
    /// A type in expression position, e.g. the target of `List<String>::new`.
    Type(TypeNode),
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        operand: Box<Expr>,
        span: Span,
    },
    Cast {
        types: Vec<TypeNode>,
        value: Box<Expr>,
        span: Span,
    },
    InstanceOf {
        value: Box<Expr>,
        ty: Option<TypeNode>,
        binding: Option<Ident>,
        span: Span,
    },
    Conditional {
        condition: Box<Expr>,
        then_value: Box<Expr>,
        else_value: Box<Expr>,
        span: Span,
    },
    Lambda {
        parameters: Vec<LambdaParameter>,
        body: LambdaBody,
        span: Span,
    },
    MethodReference {
        target: Box<Expr>,
        /// `None` for `Type::new`.
        name: Option<Ident>,
        span: Span,
    },
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    Switch {
        selector: Box<Expr>,
        block: SwitchBlock,
        span: Span,
    },
    Parenthesized {
        inner: Box<Expr>,
        span: Span,
    },
    /// Construct the adapter does not model; only its sub-expressions are kept.
    Opaque {
        children: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Name(ident) => Span::new(ident.position, ident.position),
            Expr::Type(ty) => ty.span(),
            Expr::FieldAccess { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::New { span, .. }
            | Expr::NewArray { span, .. }
            | Expr::ArrayInitializer { span, .. }
            | Expr::This { span, .. }
            | Expr::Super { span, .. }
            | Expr::Literal { span, .. }
            | Expr::ClassLiteral { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Cast { span, .. }
            | Expr::InstanceOf { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::MethodReference { span, .. }
            | Expr::ArrayAccess { span, .. }
            | Expr::Switch { span, .. }
            | Expr::Parenthesized { span, .. }
            | Expr::Opaque { span, .. } => *span,
        }
    }

    pub fn position(&self) -> Position {
        self.span().start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, line: u32, column: u32) -> Ident {
        Ident::new(name, Position::new(line, column))
    }

    #[test]
    fn positions_order_by_line_then_column() {
        assert!(Position::new(1, 10) < Position::new(2, 1));
        assert!(Position::new(3, 2) < Position::new(3, 5));
    }

    #[test]
    fn span_contains_inclusive_bounds() {
        let span = Span::new(Position::new(2, 5), Position::new(4, 1));
        assert!(span.contains(Position::new(2, 5)));
        assert!(span.contains(Position::new(3, 80)));
        assert!(span.contains(Position::new(4, 1)));
        assert!(!span.contains(Position::new(2, 4)));
        assert!(!span.contains(Position::new(4, 2)));
    }

    #[test]
    fn span_contains_line() {
        let span = Span::new(Position::new(5, 3), Position::new(9, 1));
        assert!(span.contains_line(5));
        assert!(span.contains_line(9));
        assert!(!span.contains_line(10));
        assert_eq!(span.line_extent(), 4);
    }

    #[test]
    fn span_encloses_nested_span() {
        let outer = Span::new(Position::new(1, 1), Position::new(10, 1));
        let inner = Span::new(Position::new(2, 1), Position::new(3, 1));
        assert!(outer.encloses(inner));
        assert!(!inner.encloses(outer));
    }

    #[test]
    fn qualified_name_dotted_form() {
        let name = QualifiedName::new(vec![
            ident("java", 1, 8),
            ident("util", 1, 13),
            ident("List", 1, 18),
        ]);
        assert_eq!(name.to_dotted(), "java.util.List");
        assert_eq!(name.last().map(|i| i.name.as_str()), Some("List"));
        assert_eq!(name.position(), Position::new(1, 8));
    }

    #[test]
    fn modifier_keywords_round_trip() {
        assert_eq!(Modifier::from_keyword("public"), Some(Modifier::Public));
        assert_eq!(Modifier::from_keyword("non-sealed"), Some(Modifier::NonSealed));
        assert_eq!(Modifier::from_keyword("class"), None);
    }
}
