//! Input side - the resolved tree a front-end delivers.

pub mod tree;
pub mod unit;

pub use tree::{
    Arg, BinaryKind, Block, Callee, CatchClause, ClassDeclKind, ClassInfo, CompilationUnit,
    Expr, FieldDecl, JavaType, LambdaBody, LambdaParam, LiteralValue, MethodDecl, MethodType, Param,
    PrimitiveKind, RefMode, Span, Stmt, Symbol, SymbolId, SymbolKind, UnaryKind, VarDecl,
};
pub use unit::UnitTree;
