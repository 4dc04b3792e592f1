//! Lambdas and the async-result callback idiom.

use super::{ModelBuilder, Result};
use crate::context::TranslationContext;
use crate::input::tree::{self as ast, LambdaParam};
use crate::ir::{AsyncHandler, AsyncResultOp, Expr, Lambda, LambdaBody, Stmt};
use crate::scope::VariableScope;
use crate::traits::TreeProvider;
use crate::types::{ClassKind, TypeInfo};
use tracing::trace;

impl<P: TreeProvider + ?Sized> ModelBuilder<'_, P> {
    pub(super) fn lambda(
        &mut self,
        params: &[LambdaParam],
        body: &ast::LambdaBody,
        ctx: &TranslationContext,
    ) -> Result<Expr> {
        if let Some((param, ty, result_type)) = self.async_result_param(params, ctx)? {
            return self.async_handler(param, ty, result_type, body, ctx);
        }
        let mut param_names = Vec::with_capacity(params.len());
        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            let ty = self.types.resolve(&param.ty)?;
            self.scopes.declare(param.sym, VariableScope::Parameter, ty.clone());
            param_names.push(param.name.clone());
            param_types.push(ty);
        }
        let body = self.lambda_body(body, ctx)?;
        Ok(Expr::Lambda(Box::new(Lambda {
            param_names,
            param_types,
            body,
        })))
    }

    /// The single, explicitly typed `AsyncResult<T>` parameter, with `T`.
    fn async_result_param<'p>(
        &self,
        params: &'p [LambdaParam],
        ctx: &TranslationContext,
    ) -> Result<Option<(&'p LambdaParam, TypeInfo, TypeInfo)>> {
        if !ctx.factory().async_result_idiom {
            return Ok(None);
        }
        let [param] = params else {
            return Ok(None);
        };
        if !param.explicit_type {
            return Ok(None);
        }
        let ty = self.types.resolve(&param.ty)?;
        if ty.kind() != ClassKind::AsyncResult {
            return Ok(None);
        }
        let [result_type] = ty.args() else {
            return Ok(None);
        };
        let result_type = result_type.clone();
        Ok(Some((param, ty, result_type)))
    }

    fn async_handler(
        &mut self,
        param: &LambdaParam,
        param_type: TypeInfo,
        result_type: TypeInfo,
        body: &ast::LambdaBody,
        ctx: &TranslationContext,
    ) -> Result<Expr> {
        let accessor = ctx.factory().async_result(&param.name, result_type.clone());
        let inner = ctx.with_alias(param.sym, accessor);
        let body = self.lambda_body(body, &inner)?;
        let (succeeded, failed) = match split(&body, &param.name) {
            Some((succeeded, failed)) => {
                trace!(param = %param.name, "splitting async result callback");
                (succeeded, failed)
            }
            None => (None, None),
        };
        Ok(Expr::AsyncHandler(Box::new(AsyncHandler {
            name: param.name.clone(),
            param_type,
            result_type,
            body,
            succeeded,
            failed,
        })))
    }

    fn lambda_body(&mut self, body: &ast::LambdaBody, ctx: &TranslationContext) -> Result<LambdaBody> {
        match body {
            ast::LambdaBody::Expr(expr) => Ok(LambdaBody::Expr(self.expression(expr, ctx)?)),
            ast::LambdaBody::Block(block) => Ok(LambdaBody::Block(self.block(block, ctx)?)),
        }
    }
}

type Branches = (Option<Stmt>, Option<Stmt>);

/// Success and failure branches of a body that is a lone
/// `if (name.succeeded())` or `if (name.failed())` statement.
fn split(body: &LambdaBody, name: &str) -> Option<Branches> {
    let LambdaBody::Block(block) = body else {
        return None;
    };
    let [Stmt::Conditionals { branches, otherwise }] = block.stmts.as_slice() else {
        return None;
    };
    let [branch] = branches.as_slice() else {
        return None;
    };
    let mut cond = &branch.cond;
    while let Expr::Parenthesized(inner) = cond {
        cond = inner;
    }
    let Expr::AsyncResultCall { name: target, op, .. } = cond.untyped() else {
        return None;
    };
    if target != name {
        return None;
    }
    let then = Some(branch.body.clone());
    let otherwise = otherwise.as_deref().cloned();
    match op {
        AsyncResultOp::Succeeded => Some((then, otherwise)),
        AsyncResultOp::Failed => Some((otherwise, then)),
        AsyncResultOp::Cause | AsyncResultOp::Result => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Block, ConditionalBlock};

    fn accessor(op: AsyncResultOp) -> Expr {
        Expr::AsyncResultCall {
            name: "ar".to_string(),
            result_type: TypeInfo::String,
            op,
        }
    }

    fn callback(cond: Expr, otherwise: Option<Stmt>) -> LambdaBody {
        LambdaBody::Block(Block::new(vec![Stmt::Conditionals {
            branches: vec![ConditionalBlock {
                cond,
                body: Stmt::Return(None),
            }],
            otherwise: otherwise.map(Box::new),
        }]))
    }

    #[test]
    fn failed_test_swaps_branches() {
        let other = Stmt::Expr(Expr::string("x"));
        let (succeeded, failed) =
            split(&callback(accessor(AsyncResultOp::Failed), Some(other.clone())), "ar").unwrap();
        assert_eq!(succeeded, Some(other));
        assert_eq!(failed, Some(Stmt::Return(None)));
    }

    #[test]
    fn succeeded_without_else_has_no_failure_branch() {
        let body = callback(Expr::Parenthesized(Box::new(accessor(AsyncResultOp::Succeeded))), None);
        let (succeeded, failed) = split(&body, "ar").unwrap();
        assert_eq!(succeeded, Some(Stmt::Return(None)));
        assert_eq!(failed, None);
    }

    #[test]
    fn other_conditions_do_not_split() {
        assert!(split(&callback(accessor(AsyncResultOp::Cause), None), "ar").is_none());
        assert!(split(&callback(accessor(AsyncResultOp::Succeeded), None), "other").is_none());
        assert!(split(&LambdaBody::Expr(Expr::This), "ar").is_none());
    }
}
