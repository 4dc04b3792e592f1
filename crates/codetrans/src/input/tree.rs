//! Resolved syntax tree handed over by the front-end.
//!
//! Every identifier, call and type reference in this tree has already been
//! resolved: identifiers point at a [`SymbolId`], calls point at the method
//! symbol chosen by overload resolution, and expressions that need a static
//! type carry a [`JavaType`]. The tree is a plain value so a front-end can
//! deliver it as JSON.

use serde::{Deserialize, Serialize};

/// Byte range in the unit's source text (`end` exclusive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Handle to a resolved symbol owned by the provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

/// What a symbol binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    LocalVariable,
    Parameter,
    ExceptionParameter,
    Field,
    Method,
    Type,
}

/// A resolved symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declared type of a variable, or the type itself for `Type` symbols.
    pub ty: JavaType,
    /// Qualified name of the enclosing class, when known.
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Char,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// Source keyword (`int`, `boolean`, ...).
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Qualified name of the boxed counterpart.
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Char => "java.lang.Character",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
        }
    }

    pub fn from_boxed_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.boxed_name() == name)
    }
}

/// A type as the front-end's type checker sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JavaType {
    Primitive(PrimitiveKind),
    Void,
    /// Type of the `null` literal.
    Null,
    Declared {
        name: String,
        #[serde(default)]
        args: Vec<JavaType>,
    },
    Array(Box<JavaType>),
    TypeVar(String),
}

impl JavaType {
    pub fn declared(name: impl Into<String>) -> Self {
        JavaType::Declared {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn parameterized(name: impl Into<String>, args: Vec<JavaType>) -> Self {
        JavaType::Declared {
            name: name.into(),
            args,
        }
    }

    pub fn array(component: JavaType) -> Self {
        JavaType::Array(Box::new(component))
    }

    pub fn string() -> Self {
        Self::declared("java.lang.String")
    }

    /// Qualified name of a declared type.
    pub fn qualified_name(&self) -> Option<&str> {
        match self {
            JavaType::Declared { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassDeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

/// Class metadata used to classify a type reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub kind: ClassDeclKind,
    /// Qualified names of annotations present on the declaration.
    #[serde(default)]
    pub annotations: Vec<String>,
    /// Qualified names of direct supertypes (superclass and interfaces).
    #[serde(default)]
    pub supertypes: Vec<String>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, kind: ClassDeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotations: Vec::new(),
            supertypes: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }
}

/// Method type as seen from its declaring class.
///
/// For a varargs method the last entry of `params` is the array type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodType {
    pub name: String,
    pub owner: JavaType,
    #[serde(default)]
    pub params: Vec<JavaType>,
    #[serde(default)]
    pub varargs: bool,
    pub ret: JavaType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralValue {
    Null,
    String(String),
    Boolean(bool),
    Int(String),
    Long(String),
    Char(char),
    Float(String),
    Double(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryKind {
    ConditionalAnd,
    ConditionalOr,
    EqualTo,
    NotEqualTo,
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    And,
    Or,
    Xor,
    LeftShift,
    RightShift,
    UnsignedRightShift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryKind {
    PostfixIncrement,
    PostfixDecrement,
    PrefixIncrement,
    PrefixDecrement,
    LogicalComplement,
    UnaryMinus,
    UnaryPlus,
    BitwiseComplement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefMode {
    /// `expr::method`
    Invoke,
    /// `Type::new`
    New,
}

/// How a method invocation names its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    /// `foo(..)`, implicitly on `this`.
    Unqualified { name: String },
    /// `target.foo(..)`
    Member { target: Box<Expr>, name: String },
}

/// Invocation argument with its static type (`JavaType::Null` for `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    pub expr: Expr,
    pub ty: JavaType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaParam {
    pub name: String,
    pub sym: SymbolId,
    pub ty: JavaType,
    /// Whether the type was written in source rather than inferred.
    #[serde(default)]
    pub explicit_type: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Ident {
        name: String,
        sym: SymbolId,
        #[serde(default)]
        span: Span,
    },
    Literal {
        value: LiteralValue,
        #[serde(default)]
        span: Span,
    },
    Binary {
        op: BinaryKind,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        #[serde(default)]
        span: Span,
    },
    Unary {
        op: UnaryKind,
        operand: Box<Expr>,
        #[serde(default)]
        span: Span,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        #[serde(default)]
        span: Span,
    },
    CompoundAssign {
        op: BinaryKind,
        target: Box<Expr>,
        value: Box<Expr>,
        #[serde(default)]
        span: Span,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
        #[serde(default)]
        span: Span,
    },
    Parens {
        inner: Box<Expr>,
        #[serde(default)]
        span: Span,
    },
    Select {
        target: Box<Expr>,
        name: String,
        ty: JavaType,
        #[serde(default)]
        span: Span,
    },
    Call {
        callee: Callee,
        method: SymbolId,
        #[serde(default)]
        args: Vec<Arg>,
        ty: JavaType,
        #[serde(default)]
        span: Span,
    },
    New {
        class: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        span: Span,
    },
    InstanceOf {
        expr: Box<Expr>,
        class: SymbolId,
        #[serde(default)]
        span: Span,
    },
    Lambda {
        params: Vec<LambdaParam>,
        body: LambdaBody,
        #[serde(default)]
        span: Span,
    },
    MethodRef {
        qualifier: Box<Expr>,
        name: String,
        mode: RefMode,
        method: SymbolId,
        #[serde(default)]
        span: Span,
    },
    /// `Base<Args>` in type position, e.g. the class of `new HashMap<String, Object>()`.
    TypeApply {
        base: Box<Expr>,
        #[serde(default)]
        args: Vec<JavaType>,
        #[serde(default)]
        span: Span,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>, sym: SymbolId) -> Self {
        Expr::Ident {
            name: name.into(),
            sym,
            span: Span::default(),
        }
    }

    pub fn literal(value: LiteralValue) -> Self {
        Expr::Literal {
            value,
            span: Span::default(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(LiteralValue::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Self::literal(LiteralValue::Int(value.to_string()))
    }

    pub fn binary(lhs: Expr, op: BinaryKind, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span: Span::default(),
        }
    }

    pub fn unary(op: UnaryKind, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
            span: Span::default(),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
            span: Span::default(),
        }
    }

    pub fn parens(inner: Expr) -> Self {
        Expr::Parens {
            inner: Box::new(inner),
            span: Span::default(),
        }
    }

    pub fn select(target: Expr, name: impl Into<String>, ty: JavaType) -> Self {
        Expr::Select {
            target: Box::new(target),
            name: name.into(),
            ty,
            span: Span::default(),
        }
    }

    /// `target.name(args)`
    pub fn call(target: Expr, name: impl Into<String>, method: SymbolId, args: Vec<Arg>, ty: JavaType) -> Self {
        Expr::Call {
            callee: Callee::Member {
                target: Box::new(target),
                name: name.into(),
            },
            method,
            args,
            ty,
            span: Span::default(),
        }
    }

    /// `name(args)` on the enclosing instance.
    pub fn local_call(name: impl Into<String>, method: SymbolId, args: Vec<Arg>, ty: JavaType) -> Self {
        Expr::Call {
            callee: Callee::Unqualified { name: name.into() },
            method,
            args,
            ty,
            span: Span::default(),
        }
    }

    pub fn new_instance(class: Expr, args: Vec<Expr>) -> Self {
        Expr::New {
            class: Box::new(class),
            args,
            span: Span::default(),
        }
    }

    pub fn lambda(params: Vec<LambdaParam>, body: LambdaBody) -> Self {
        Expr::Lambda {
            params,
            body,
            span: Span::default(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Ident { span, .. }
            | Expr::Literal { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Assign { span, .. }
            | Expr::CompoundAssign { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::Parens { span, .. }
            | Expr::Select { span, .. }
            | Expr::Call { span, .. }
            | Expr::New { span, .. }
            | Expr::InstanceOf { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::MethodRef { span, .. }
            | Expr::TypeApply { span, .. } => *span,
        }
    }

    /// The expression with any enclosing parentheses removed.
    pub fn strip_parens(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Parens { inner, .. } = expr {
            expr = inner;
        }
        expr
    }
}

impl Arg {
    pub fn new(expr: Expr, ty: JavaType) -> Self {
        Self { expr, ty }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    #[serde(default)]
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self {
            stmts,
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Local variable, for-each variable or catch parameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub sym: SymbolId,
    pub ty: JavaType,
    #[serde(default)]
    pub init: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, sym: SymbolId, ty: JavaType, init: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            sym,
            ty,
            init,
            span: Span::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: VarDecl,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Block(Block),
    Local(VarDecl),
    Expr {
        expr: Expr,
        #[serde(default)]
        span: Span,
    },
    If {
        cond: Expr,
        then: Box<Stmt>,
        #[serde(default)]
        otherwise: Option<Box<Stmt>>,
        #[serde(default)]
        span: Span,
    },
    For {
        #[serde(default)]
        init: Vec<Stmt>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        update: Vec<Expr>,
        body: Box<Stmt>,
        #[serde(default)]
        span: Span,
    },
    ForEach {
        var: VarDecl,
        iterable: Expr,
        body: Box<Stmt>,
        #[serde(default)]
        span: Span,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
        #[serde(default)]
        span: Span,
    },
    Try {
        body: Block,
        #[serde(default)]
        catches: Vec<CatchClause>,
        #[serde(default)]
        finally: Option<Block>,
        #[serde(default)]
        span: Span,
    },
    Throw {
        expr: Expr,
        #[serde(default)]
        span: Span,
    },
    Return {
        #[serde(default)]
        expr: Option<Expr>,
        #[serde(default)]
        span: Span,
    },
    Break {
        #[serde(default)]
        span: Span,
    },
    Continue {
        #[serde(default)]
        span: Span,
    },
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        let span = expr.span();
        Stmt::Expr { expr, span }
    }

    pub fn local(decl: VarDecl) -> Self {
        Stmt::Local(decl)
    }

    pub fn if_stmt(cond: Expr, then: Stmt, otherwise: Option<Stmt>) -> Self {
        Stmt::If {
            cond,
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
            span: Span::default(),
        }
    }

    pub fn for_loop(init: Vec<Stmt>, cond: Option<Expr>, update: Vec<Expr>, body: Stmt) -> Self {
        Stmt::For {
            init,
            cond,
            update,
            body: Box::new(body),
            span: Span::default(),
        }
    }

    pub fn return_stmt(expr: Option<Expr>) -> Self {
        Stmt::Return {
            expr,
            span: Span::default(),
        }
    }

    pub fn throw(expr: Expr) -> Self {
        Stmt::Throw {
            expr,
            span: Span::default(),
        }
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Block(Block::new(stmts))
    }

    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(block) => block.span,
            Stmt::Local(decl) => decl.span,
            Stmt::Expr { span, .. }
            | Stmt::If { span, .. }
            | Stmt::For { span, .. }
            | Stmt::ForEach { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Try { span, .. }
            | Stmt::Throw { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Break { span }
            | Stmt::Continue { span } => *span,
        }
    }

    /// Replace the source range of the statement.
    pub fn with_span(mut self, new_span: Span) -> Self {
        match &mut self {
            Stmt::Block(block) => block.span = new_span,
            Stmt::Local(decl) => decl.span = new_span,
            Stmt::Expr { span, .. }
            | Stmt::If { span, .. }
            | Stmt::For { span, .. }
            | Stmt::ForEach { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Try { span, .. }
            | Stmt::Throw { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Break { span }
            | Stmt::Continue { span } => *span = new_span,
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub sym: SymbolId,
    pub ty: JavaType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub sym: SymbolId,
    pub ty: JavaType,
    #[serde(default)]
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    pub ret: JavaType,
    pub body: Block,
}

/// One translation unit: a single class with its fields and methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Qualified name of the class.
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}
