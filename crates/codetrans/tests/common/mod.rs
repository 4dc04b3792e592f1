//! Hand-built resolved units shared by the integration tests.

#![allow(dead_code)]

use codetrans::input::{
    Arg, Block, ClassDeclKind, ClassInfo, Expr, JavaType, MethodDecl, MethodType, Param,
    PrimitiveKind, Stmt, SymbolId, SymbolKind, UnitTree,
};
use codetrans::{Target, TranslateConfig, TranslateError, Translator};

pub const UNIT: &str = "demo.Example";
pub const JSON_OBJECT: &str = "io.vertx.core.json.JsonObject";
pub const ASYNC_RESULT: &str = "io.vertx.core.AsyncResult";
pub const VERTX: &str = "io.vertx.core.Vertx";

pub fn int() -> JavaType {
    JavaType::Primitive(PrimitiveKind::Int)
}

pub fn boolean() -> JavaType {
    JavaType::Primitive(PrimitiveKind::Boolean)
}

pub fn object() -> JavaType {
    JavaType::declared("java.lang.Object")
}

/// A unit under construction plus the library symbols most examples use.
pub struct Fixture {
    pub tree: UnitTree,
    system: SymbolId,
    println: SymbolId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut tree = UnitTree::new(UNIT);
        tree.add_class(
            ClassInfo::new("java.lang.Exception", ClassDeclKind::Class).extends("java.lang.Throwable"),
        );
        let system = tree.declare_type(ClassInfo::new("java.lang.System", ClassDeclKind::Class));
        let println = tree.declare_method(MethodType {
            name: "println".to_string(),
            owner: JavaType::declared("java.io.PrintStream"),
            params: vec![object()],
            varargs: false,
            ret: JavaType::Void,
        });
        Self {
            tree,
            system,
            println,
        }
    }

    pub fn local(&mut self, name: &str, ty: JavaType) -> SymbolId {
        self.tree.declare(name, SymbolKind::LocalVariable, ty)
    }

    pub fn param(&mut self, name: &str, ty: JavaType) -> SymbolId {
        self.tree.declare(name, SymbolKind::Parameter, ty)
    }

    pub fn type_symbol(&mut self, class: ClassInfo) -> SymbolId {
        self.tree.declare_type(class)
    }

    pub fn method(&mut self, owner: &str, name: &str, params: Vec<JavaType>, ret: JavaType) -> SymbolId {
        self.tree.declare_method(MethodType {
            name: name.to_string(),
            owner: JavaType::declared(owner),
            params,
            varargs: false,
            ret,
        })
    }

    /// `System.out.println(arg)`
    pub fn println(&self, arg: Expr, ty: JavaType) -> Stmt {
        let out = Expr::select(
            Expr::ident("System", self.system),
            "out",
            JavaType::declared("java.io.PrintStream"),
        );
        Stmt::expr(Expr::call(out, "println", self.println, vec![Arg::new(arg, ty)], JavaType::Void))
    }

    pub fn add_method(&mut self, name: &str, params: Vec<Param>, ret: JavaType, body: Vec<Stmt>) {
        self.tree.unit.methods.push(MethodDecl {
            name: name.to_string(),
            params,
            ret,
            body: Block::new(body),
        });
    }

    /// Declare `void start()` with the given body.
    pub fn start(&mut self, body: Vec<Stmt>) {
        self.add_method("start", Vec::new(), JavaType::Void, body);
    }

    pub fn translate(&self, target: Target) -> Result<String, TranslateError> {
        Translator::new(TranslateConfig::for_target(target)).translate(&self.tree)
    }

    pub fn javascript(&self) -> String {
        self.translate(Target::JavaScript).expect("javascript translation")
    }
}
