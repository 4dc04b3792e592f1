//! Language-neutral code model.
//!
//! The model is a closed family of statement and expression nodes produced
//! by the [`ModelBuilder`](crate::builder::ModelBuilder). Nodes never emit
//! text: each one hands itself to a [`CodeWriter`](crate::output::CodeWriter)
//! callback (see [`render`]), and the writer decides the target syntax.
//!
//! Expression nodes also carry the capability operations the builder drives
//! (`on_field`, `on_method_invocation`, `as_type`, ...), see [`capability`].
//! Container literals hold their elements in persistent `im` collections so
//! "mutating" calls return a new sibling node.

pub mod capability;
pub mod render;

pub use capability::CallSite;

use crate::scope::VariableScope;
use crate::types::{ClassType, MethodSignature, TypeInfo};

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    String(String),
    Boolean(bool),
    /// Integer literals keep their source spelling.
    Int(String),
    Long(String),
    Char(char),
    Float(String),
    Double(String),
}

/// Binary operators the model supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Ne,
    Add,
    Lt,
    Le,
    Gt,
    Ge,
    Mul,
    Div,
    BitAnd,
    BitOr,
    BitXor,
    Sub,
    Rem,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 16] = [
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::Add,
        BinaryOp::Lt,
        BinaryOp::Le,
        BinaryOp::Gt,
        BinaryOp::Ge,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::BitAnd,
        BinaryOp::BitOr,
        BinaryOp::BitXor,
        BinaryOp::Sub,
        BinaryOp::Rem,
    ];

    /// Source-language spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Add => "+",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Sub => "-",
            BinaryOp::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    PostIncrement,
    PostDecrement,
    PreIncrement,
    PreDecrement,
    Not,
    Minus,
    Plus,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::PostIncrement | UnaryOp::PreIncrement => "++",
            UnaryOp::PostDecrement | UnaryOp::PreDecrement => "--",
            UnaryOp::Not => "!",
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostIncrement | UnaryOp::PostDecrement)
    }

    /// Increment or decrement.
    pub fn is_step(self) -> bool {
        matches!(
            self,
            UnaryOp::PostIncrement | UnaryOp::PostDecrement | UnaryOp::PreIncrement | UnaryOp::PreDecrement
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleStream {
    Out,
    Err,
}

/// Accessors of an async-result wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsyncResultOp {
    Succeeded,
    Failed,
    Cause,
    Result,
}

impl AsyncResultOp {
    pub fn from_method(name: &str) -> Option<Self> {
        match name {
            "succeeded" => Some(AsyncResultOp::Succeeded),
            "failed" => Some(AsyncResultOp::Failed),
            "cause" => Some(AsyncResultOp::Cause),
            "result" => Some(AsyncResultOp::Result),
            _ => None,
        }
    }
}

/// Member of an object or data-object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Single { name: String, value: Expr },
    /// Values collected through repeated adder calls.
    Sequence { name: String, values: im::Vector<Expr> },
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Single { name, .. } | Member::Sequence { name, .. } => name,
        }
    }
}

/// A classified type reference.
///
/// Classification happens once, when the builder resolves a type name; every
/// later capability call dispatches on this tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassRef {
    Console,
    Arrays,
    Throwable(ClassType),
    Api(ClassType),
    JsonObject,
    JsonArray,
    DataObject(ClassType),
    Enum(ClassType),
    Map,
    List,
    Java(ClassType),
}

/// Capability attached to a plain value by `as_type`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    JsonObject,
    JsonArray,
    DataObject(ClassType),
    Map,
    List,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    Expr(Expr),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub param_names: Vec<String>,
    pub param_types: Vec<TypeInfo>,
    pub body: LambdaBody,
}

/// Single-parameter callback over an async-result wrapper.
///
/// When the body was a lone `if (res.succeeded())` / `if (res.failed())`,
/// the two branches are available split; otherwise both are `None` and
/// `body` is rendered as a plain callback.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncHandler {
    pub name: String,
    pub param_type: TypeInfo,
    pub result_type: TypeInfo,
    pub body: LambdaBody,
    pub succeeded: Option<Stmt>,
    pub failed: Option<Stmt>,
}

impl AsyncHandler {
    pub fn is_split(&self) -> bool {
        self.succeeded.is_some() || self.failed.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub receiver: Expr,
    pub site: CallSite,
}

/// Container and data-object operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    JsonObjectGet { object: Expr, key: Expr },
    JsonObjectPut { object: Expr, key: Expr, value: Expr },
    JsonObjectEncode(Expr),
    JsonArrayGet { array: Expr, index: Expr },
    JsonArrayAdd { array: Expr, value: Expr },
    JsonArraySize(Expr),
    JsonArrayEncode(Expr),
    DataObjectGet { object: Expr, name: String },
    DataObjectSet { object: Expr, name: String, value: Expr },
    MapGet { map: Expr, key: Expr },
    MapPut { map: Expr, key: Expr, value: Expr },
    MapForEach { map: Expr, key_name: String, value_name: String, body: LambdaBody },
    ListGet { list: Expr, index: Expr },
    ListAdd { list: Expr, value: Expr },
    ListSize(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier { name: String, scope: VariableScope },
    This,
    Literal(Literal),
    /// String concatenation; literal parts are `Literal::String`.
    Concat(Vec<Expr>),
    Parenthesized(Box<Expr>),
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Conditional { cond: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
    Assign { target: Box<Expr>, value: Box<Expr> },
    Field { receiver: Box<Expr>, name: String },
    Invocation(Box<Invocation>),
    New { class: ClassType, args: Vec<Expr> },
    InstanceOf { expr: Box<Expr>, class: ClassType },
    Lambda(Box<Lambda>),
    AsyncHandler(Box<AsyncHandler>),
    MethodReference { receiver: Box<Expr>, method: MethodSignature },
    Class(ClassRef),
    JsonObjectLiteral(im::Vector<Member>),
    JsonArrayLiteral(im::Vector<Expr>),
    DataObjectLiteral { ty: ClassType, members: im::Vector<Member> },
    ListLiteral(Vec<Expr>),
    NewMap,
    NewList,
    Throwable { ty: ClassType, reason: Option<Box<Expr>> },
    EnumConstant { ty: ClassType, constant: String },
    Console(ConsoleStream),
    ConsolePrint { stream: ConsoleStream, arg: Box<Expr> },
    /// Synthesized accessor standing in for an async-result parameter.
    AsyncResult { name: String, result_type: TypeInfo },
    AsyncResultCall { name: String, result_type: TypeInfo, op: AsyncResultOp },
    Typed { value: Box<Expr>, kind: ValueKind },
    Access(Box<Access>),
}

impl Expr {
    pub fn identifier(name: impl Into<String>, scope: VariableScope) -> Self {
        Expr::Identifier {
            name: name.into(),
            scope,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Expr::Literal(Literal::Null))
    }

    /// The value without any capability wrapper.
    pub fn untyped(&self) -> &Expr {
        match self {
            Expr::Typed { value, .. } => value.untyped(),
            other => other,
        }
    }

    /// Content of a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Literal(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn access(access: Access) -> Self {
        Expr::Access(Box::new(access))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBlock {
    pub cond: Expr,
    pub body: Stmt,
}

/// Ordered statements plus the raw source text around them.
///
/// `fragments` is either empty or holds one more entry than `stmts`:
/// fragment `i` precedes statement `i` and the last one trails the block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub fragments: Vec<String>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self {
            stmts,
            fragments: Vec::new(),
        }
    }

    pub fn with_fragments(mut self, fragments: Vec<String>) -> Self {
        if fragments.len() == self.stmts.len() + 1 {
            self.fragments = fragments;
        }
        self
    }

    pub fn fragment(&self, index: usize) -> Option<&str> {
        self.fragments.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Return(Option<Expr>),
    Assign { target: Expr, value: Expr },
    VarDecl { scope: VariableScope, ty: TypeInfo, name: String, init: Option<Expr> },
    Conditionals { branches: Vec<ConditionalBlock>, otherwise: Option<Box<Stmt>> },
    TryCatch { body: Box<Stmt>, catch_param: String, catch_body: Box<Stmt> },
    Throw { ty: ClassType, reason: Option<Expr> },
    Block(Block),
    For { init: Box<Stmt>, cond: Expr, update: Expr, body: Box<Stmt> },
    /// `for (id = from; id < to; id++)`
    SequenceFor { id: String, from: Expr, to: Expr, body: Box<Stmt> },
    ForEach { element: String, element_type: TypeInfo, iterable: Expr, body: Box<Stmt> },
    Expr(Expr),
}

impl Stmt {
    /// Simple statements that a terminator-using target ends with `;`.
    pub fn needs_terminator(&self) -> bool {
        matches!(
            self,
            Stmt::Return(_) | Stmt::Assign { .. } | Stmt::VarDecl { .. } | Stmt::Throw { .. } | Stmt::Expr(_)
        )
    }
}

/// A declared method: signature, parameter names and translated body.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodModel {
    pub signature: MethodSignature,
    pub param_names: Vec<String>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldModel {
    pub name: String,
    pub ty: TypeInfo,
    pub init: Option<Expr>,
}

/// A translated unit: referenced fields and helper methods plus the entry body.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitModel {
    pub name: String,
    pub fields: Vec<FieldModel>,
    pub methods: Vec<MethodModel>,
    pub entry: Block,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_table_is_complete() {
        let spelled: Vec<_> = BinaryOp::ALL.iter().map(|op| op.symbol()).collect();
        assert_eq!(
            spelled,
            ["&&", "||", "==", "!=", "+", "<", "<=", ">", ">=", "*", "/", "&", "|", "^", "-", "%"]
        );
    }

    #[test]
    fn fragments_must_surround_statements() {
        let stmts = vec![Stmt::Return(None)];
        let kept = Block::new(stmts.clone()).with_fragments(vec![String::new(), "\n".to_string()]);
        assert_eq!(kept.fragment(1), Some("\n"));
        let dropped = Block::new(stmts).with_fragments(vec![String::new()]);
        assert!(dropped.fragments.is_empty());
    }
}
