//! Model builder: resolved tree to code model.
//!
//! A single depth-first pass. Statements are handled here, expressions in
//! [`expr`], lambdas and the async-result idiom in [`lambda`], and block
//! fragment slicing in [`fragments`]. Every construct outside the supported
//! subset fails with [`TranslateError::Unsupported`].

pub mod fragments;

mod expr;
mod lambda;

use crate::config::Classification;
use crate::context::TranslationContext;
use crate::input::tree::{self as ast, BinaryKind, FieldDecl, MethodDecl, Span, UnaryKind, VarDecl};
use crate::ir::{self, ConditionalBlock, FieldModel, MethodModel};
use crate::scope::{ScopeClassifier, VariableScope};
use crate::traits::{Construct, TranslateError, TreeProvider};
use crate::types::{MethodSignature, TypeResolver};
use std::collections::BTreeSet;
use tracing::{trace, warn};

type Result<T> = std::result::Result<T, TranslateError>;

/// Methods and fields reached through `this` while building.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    pub fields: BTreeSet<String>,
    pub methods: BTreeSet<String>,
}

/// Converts one unit's resolved tree into the code model.
pub struct ModelBuilder<'a, P: TreeProvider + ?Sized> {
    provider: &'a P,
    names: &'a Classification,
    types: TypeResolver<'a, P>,
    scopes: ScopeClassifier,
    references: References,
    source_warned: bool,
}

impl<'a, P: TreeProvider + ?Sized> ModelBuilder<'a, P> {
    pub fn new(provider: &'a P, names: &'a Classification) -> Self {
        Self {
            provider,
            names,
            types: TypeResolver::new(provider, names),
            scopes: ScopeClassifier::new(provider.unit()),
            references: References::default(),
            source_warned: false,
        }
    }

    pub fn references(&self) -> &References {
        &self.references
    }

    pub fn scopes(&self) -> &ScopeClassifier {
        &self.scopes
    }

    /// Method declaration: signature, parameter names and body.
    pub fn method(&mut self, decl: &MethodDecl, ctx: &TranslationContext) -> Result<MethodModel> {
        let mut params = Vec::with_capacity(decl.params.len());
        let mut param_names = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let ty = self.types.resolve(&param.ty)?;
            self.scopes.declare(param.sym, VariableScope::Parameter, ty.clone());
            params.push(ty);
            param_names.push(param.name.clone());
        }
        let ret = self.types.resolve(&decl.ret)?;
        let body = self.block(&decl.body, ctx)?;
        Ok(MethodModel {
            signature: MethodSignature::new(decl.name.clone(), params, false, ret),
            param_names,
            body,
        })
    }

    pub fn field(&mut self, decl: &FieldDecl, ctx: &TranslationContext) -> Result<FieldModel> {
        let ty = self.types.resolve(&decl.ty)?;
        self.scopes.declare(decl.sym, VariableScope::Field, ty.clone());
        let init = decl
            .init
            .as_ref()
            .map(|init| self.expression(init, ctx))
            .transpose()?;
        Ok(FieldModel {
            name: decl.name.clone(),
            ty,
            init,
        })
    }

    pub fn block(&mut self, block: &ast::Block, ctx: &TranslationContext) -> Result<ir::Block> {
        let stmts = block
            .stmts
            .iter()
            .map(|stmt| self.statement(stmt, ctx))
            .collect::<Result<Vec<_>>>()?;
        let model = ir::Block::new(stmts);
        if !ctx.factory().preserve_fragments {
            return Ok(model);
        }
        let spans: Vec<Span> = block.stmts.iter().map(ast::Stmt::span).collect();
        Ok(model.with_fragments(self.block_fragments(block.span, &spans)))
    }

    fn block_fragments(&mut self, block: Span, stmts: &[Span]) -> Vec<String> {
        if block.end <= block.start {
            return Vec::new();
        }
        match self.provider.source_text() {
            Ok(source) => fragments::slice(&source, block, stmts).unwrap_or_else(|| {
                trace!(start = block.start, end = block.end, "block spans outside source text");
                Vec::new()
            }),
            Err(err) => {
                if !self.source_warned {
                    warn!(unit = %self.provider.unit().name, error = %err, "source text unavailable, blank lines and comments dropped");
                    self.source_warned = true;
                }
                Vec::new()
            }
        }
    }

    pub fn statement(&mut self, stmt: &ast::Stmt, ctx: &TranslationContext) -> Result<ir::Stmt> {
        match stmt {
            ast::Stmt::Block(block) => Ok(ir::Stmt::Block(self.block(block, ctx)?)),
            ast::Stmt::Local(decl) => self.local(decl, ctx),
            ast::Stmt::Expr { expr, .. } => match expr {
                ast::Expr::Assign { target, value, .. } => Ok(ir::Stmt::Assign {
                    target: self.expression(target, ctx)?,
                    value: self.expression(value, ctx)?,
                }),
                other => Ok(ir::Stmt::Expr(self.expression(other, ctx)?)),
            },
            ast::Stmt::If {
                cond,
                then,
                otherwise,
                ..
            } => self.conditionals(cond, then, otherwise.as_deref(), ctx),
            ast::Stmt::For {
                init,
                cond,
                update,
                body,
                ..
            } => self.for_loop(init, cond.as_ref(), update, body, ctx),
            ast::Stmt::ForEach {
                var,
                iterable,
                body,
                ..
            } => {
                let iterable = self.expression(iterable, ctx)?;
                let element_type = self.types.resolve(&var.ty)?;
                self.scopes.declare(var.sym, VariableScope::Variable, element_type.clone());
                let body = self.statement(body, ctx)?;
                Ok(ctx.factory().for_each(&var.name, element_type, iterable, body))
            }
            ast::Stmt::While { .. } => Err(TranslateError::unsupported(
                Construct::Loop,
                "while loops",
            )),
            ast::Stmt::Try {
                body,
                catches,
                finally,
                ..
            } => {
                if finally.is_some() {
                    return Err(TranslateError::unsupported(Construct::Try, "finally blocks"));
                }
                let [catch] = catches.as_slice() else {
                    return Err(TranslateError::unsupported(
                        Construct::Try,
                        format!("expected a single catch clause, found {}", catches.len()),
                    ));
                };
                let body = ir::Stmt::Block(self.block(body, ctx)?);
                let ty = self.types.resolve(&catch.param.ty)?;
                self.scopes.declare(catch.param.sym, VariableScope::Variable, ty);
                let catch_body = ir::Stmt::Block(self.block(&catch.body, ctx)?);
                Ok(ir::Stmt::TryCatch {
                    body: Box::new(body),
                    catch_param: catch.param.name.clone(),
                    catch_body: Box::new(catch_body),
                })
            }
            ast::Stmt::Throw { expr, .. } => match self.expression(expr, ctx)? {
                ir::Expr::Throwable { ty, reason } => Ok(ir::Stmt::Throw {
                    ty,
                    reason: reason.map(|reason| *reason),
                }),
                _ => Err(TranslateError::unsupported(
                    Construct::Throw,
                    "only a newly constructed throwable can be thrown",
                )),
            },
            ast::Stmt::Return { expr, .. } => Ok(ir::Stmt::Return(
                expr.as_ref().map(|e| self.expression(e, ctx)).transpose()?,
            )),
            ast::Stmt::Break { .. } => Err(TranslateError::unsupported(Construct::Statement, "break")),
            ast::Stmt::Continue { .. } => {
                Err(TranslateError::unsupported(Construct::Statement, "continue"))
            }
        }
    }

    fn local(&mut self, decl: &VarDecl, ctx: &TranslationContext) -> Result<ir::Stmt> {
        let ty = self.types.resolve(&decl.ty)?;
        let init = decl
            .init
            .as_ref()
            .map(|init| self.expression(init, ctx))
            .transpose()?;
        self.scopes.declare(decl.sym, VariableScope::Variable, ty.clone());
        Ok(ctx
            .factory()
            .variable_decl(VariableScope::Variable, ty, &decl.name, init))
    }

    /// `if / else if / else` flattened into one chain.
    fn conditionals(
        &mut self,
        cond: &ast::Expr,
        then: &ast::Stmt,
        otherwise: Option<&ast::Stmt>,
        ctx: &TranslationContext,
    ) -> Result<ir::Stmt> {
        let mut branches = Vec::new();
        let (mut cond, mut then, mut otherwise) = (cond, then, otherwise);
        loop {
            branches.push(ConditionalBlock {
                cond: self.expression(cond, ctx)?,
                body: self.statement(then, ctx)?,
            });
            match otherwise {
                Some(ast::Stmt::If {
                    cond: next_cond,
                    then: next_then,
                    otherwise: next_otherwise,
                    ..
                }) => {
                    cond = next_cond;
                    then = next_then;
                    otherwise = next_otherwise.as_deref();
                }
                Some(last) => {
                    let last = self.statement(last, ctx)?;
                    return Ok(ctx.factory().conditionals(branches, Some(last)));
                }
                None => return Ok(ctx.factory().conditionals(branches, None)),
            }
        }
    }

    fn for_loop(
        &mut self,
        init: &[ast::Stmt],
        cond: Option<&ast::Expr>,
        update: &[ast::Expr],
        body: &ast::Stmt,
        ctx: &TranslationContext,
    ) -> Result<ir::Stmt> {
        let ([init], [update]) = (init, update) else {
            return Err(TranslateError::unsupported(
                Construct::Loop,
                format!(
                    "for loop with {} initializer(s) and {} update(s)",
                    init.len(),
                    update.len()
                ),
            ));
        };
        let Some(cond) = cond else {
            return Err(TranslateError::unsupported(
                Construct::Loop,
                "for loop without a condition",
            ));
        };
        if let Some((decl, from, to)) = ranged(init, cond, update) {
            let ty = self.types.resolve(&decl.ty)?;
            let from = self.expression(from, ctx)?;
            let to = self.expression(to, ctx)?;
            self.scopes.declare(decl.sym, VariableScope::Variable, ty);
            let body = self.statement(body, ctx)?;
            return Ok(ctx.factory().sequence_for(&decl.name, from, to, body));
        }
        let init = self.statement(init, ctx)?;
        let cond = self.expression(cond, ctx)?;
        let update = self.expression(update, ctx)?;
        let body = self.statement(body, ctx)?;
        Ok(ctx.factory().for_loop(init, cond, update, body))
    }
}

/// `for (T i = from; i < to; i++)`: the declaration, `from` and `to`.
fn ranged<'t>(
    init: &'t ast::Stmt,
    cond: &'t ast::Expr,
    update: &'t ast::Expr,
) -> Option<(&'t VarDecl, &'t ast::Expr, &'t ast::Expr)> {
    let ast::Stmt::Local(decl) = init else {
        return None;
    };
    let from = decl.init.as_ref()?;
    let ast::Expr::Binary {
        op: BinaryKind::LessThan,
        lhs,
        rhs,
        ..
    } = cond
    else {
        return None;
    };
    let ast::Expr::Unary {
        op: UnaryKind::PostfixIncrement,
        operand,
        ..
    } = update
    else {
        return None;
    };
    let is_loop_var = |expr: &ast::Expr| matches!(expr, ast::Expr::Ident { name, .. } if *name == decl.name);
    (is_loop_var(lhs) && is_loop_var(operand)).then_some((decl, from, rhs.as_ref()))
}
