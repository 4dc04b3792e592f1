//! Expressions.

use super::{ModelBuilder, Result};
use crate::context::TranslationContext;
use crate::input::tree::{
    self as ast, Arg, BinaryKind, Callee, JavaType, LiteralValue, RefMode, SymbolId, SymbolKind,
    UnaryKind,
};
use crate::ir::{BinaryOp, CallSite, ClassRef, Expr, Literal, UnaryOp};
use crate::scope::VariableScope;
use crate::traits::{Construct, TranslateError, TreeProvider};
use crate::types::ClassKind;

fn binary_op(kind: BinaryKind) -> Result<BinaryOp> {
    Ok(match kind {
        BinaryKind::ConditionalAnd => BinaryOp::And,
        BinaryKind::ConditionalOr => BinaryOp::Or,
        BinaryKind::EqualTo => BinaryOp::Eq,
        BinaryKind::NotEqualTo => BinaryOp::Ne,
        BinaryKind::Plus => BinaryOp::Add,
        BinaryKind::Minus => BinaryOp::Sub,
        BinaryKind::Multiply => BinaryOp::Mul,
        BinaryKind::Divide => BinaryOp::Div,
        BinaryKind::Remainder => BinaryOp::Rem,
        BinaryKind::LessThan => BinaryOp::Lt,
        BinaryKind::LessThanEqual => BinaryOp::Le,
        BinaryKind::GreaterThan => BinaryOp::Gt,
        BinaryKind::GreaterThanEqual => BinaryOp::Ge,
        BinaryKind::And => BinaryOp::BitAnd,
        BinaryKind::Or => BinaryOp::BitOr,
        BinaryKind::Xor => BinaryOp::BitXor,
        BinaryKind::LeftShift | BinaryKind::RightShift | BinaryKind::UnsignedRightShift => {
            return Err(TranslateError::unsupported(
                Construct::BinaryOperator,
                format!("{kind:?}"),
            ));
        }
    })
}

fn unary_op(kind: UnaryKind) -> Result<UnaryOp> {
    Ok(match kind {
        UnaryKind::PostfixIncrement => UnaryOp::PostIncrement,
        UnaryKind::PostfixDecrement => UnaryOp::PostDecrement,
        UnaryKind::PrefixIncrement => UnaryOp::PreIncrement,
        UnaryKind::PrefixDecrement => UnaryOp::PreDecrement,
        UnaryKind::LogicalComplement => UnaryOp::Not,
        UnaryKind::UnaryMinus => UnaryOp::Minus,
        UnaryKind::UnaryPlus => UnaryOp::Plus,
        UnaryKind::BitwiseComplement => {
            return Err(TranslateError::unsupported(Construct::UnaryOperator, "~"));
        }
    })
}

fn literal(value: &LiteralValue) -> Literal {
    match value {
        LiteralValue::Null => Literal::Null,
        LiteralValue::String(s) => Literal::String(s.clone()),
        LiteralValue::Boolean(b) => Literal::Boolean(*b),
        LiteralValue::Int(v) => Literal::Int(v.clone()),
        LiteralValue::Long(v) => Literal::Long(v.clone()),
        LiteralValue::Char(c) => Literal::Char(*c),
        LiteralValue::Float(v) => Literal::Float(v.clone()),
        LiteralValue::Double(v) => Literal::Double(v.clone()),
    }
}

fn missing_symbol(sym: SymbolId) -> TranslateError {
    TranslateError::unsupported(Construct::Symbol, format!("unresolved symbol {}", sym.0))
}

impl<P: TreeProvider + ?Sized> ModelBuilder<'_, P> {
    pub fn expression(&mut self, expr: &ast::Expr, ctx: &TranslationContext) -> Result<Expr> {
        match expr {
            ast::Expr::Ident { name, sym, .. } => self.identifier(name, *sym, ctx),
            ast::Expr::Literal { value, .. } => Ok(Expr::Literal(literal(value))),
            ast::Expr::Binary { op, lhs, rhs, .. } => {
                let op = binary_op(*op)?;
                let lhs = self.expression(lhs, ctx)?;
                let rhs = self.expression(rhs, ctx)?;
                ctx.factory().combine(lhs, op, rhs)
            }
            ast::Expr::Unary { op, operand, .. } => {
                let op = unary_op(*op)?;
                self.expression(operand, ctx)?.on_unary(op)
            }
            ast::Expr::Assign { target, value, .. } => Ok(Expr::Assign {
                target: Box::new(self.expression(target, ctx)?),
                value: Box::new(self.expression(value, ctx)?),
            }),
            ast::Expr::CompoundAssign { op, .. } => Err(TranslateError::unsupported(
                Construct::Expression,
                format!("compound assignment ({op:?})"),
            )),
            ast::Expr::Conditional {
                cond,
                then,
                otherwise,
                ..
            } => Ok(Expr::Conditional {
                cond: Box::new(self.expression(cond, ctx)?),
                then: Box::new(self.expression(then, ctx)?),
                otherwise: Box::new(self.expression(otherwise, ctx)?),
            }),
            ast::Expr::Parens { inner, .. } => {
                Ok(Expr::Parenthesized(Box::new(self.expression(inner, ctx)?)))
            }
            ast::Expr::Select { target, name, ty, .. } => self.member_select(target, name, ty, ctx),
            ast::Expr::Call {
                callee,
                method,
                args,
                ty,
                ..
            } => self.invocation(callee, *method, args, ty, ctx),
            ast::Expr::New { class, args, .. } => {
                let class = self.expression(class, ctx)?;
                let args = args
                    .iter()
                    .map(|arg| self.expression(arg, ctx))
                    .collect::<Result<Vec<_>>>()?;
                class.on_new(args)
            }
            ast::Expr::InstanceOf { expr, class, .. } => {
                let provider = self.provider;
                let symbol = provider.symbol(*class).ok_or_else(|| missing_symbol(*class))?;
                let Some(name) = symbol.ty.qualified_name() else {
                    return Err(TranslateError::unsupported(
                        Construct::Expression,
                        format!("instanceof `{}`", symbol.name),
                    ));
                };
                let class = self.types.classify(name);
                self.expression(expr, ctx)?.on_instance_of(class)
            }
            ast::Expr::Lambda { params, body, .. } => self.lambda(params, body, ctx),
            ast::Expr::MethodRef {
                qualifier,
                name,
                mode,
                method,
                ..
            } => self.method_reference(qualifier, name, *mode, *method, ctx),
            ast::Expr::TypeApply { base, .. } => self.expression(base, ctx),
        }
    }

    fn identifier(&mut self, name: &str, sym: SymbolId, ctx: &TranslationContext) -> Result<Expr> {
        if name == "this" {
            return Ok(Expr::This);
        }
        if let Some(alias) = ctx.alias(sym) {
            return Ok(alias.clone());
        }
        if let Some(binding) = self.scopes.lookup(sym) {
            let (scope, ty) = (binding.scope, binding.ty.clone());
            if scope == VariableScope::Field {
                self.references.fields.insert(name.to_string());
            }
            return Expr::identifier(name, scope).as_type(&ty);
        }
        let provider = self.provider;
        let symbol = provider.symbol(sym).ok_or_else(|| missing_symbol(sym))?;
        if symbol.kind == SymbolKind::Type {
            let Some(qualified) = symbol.ty.qualified_name() else {
                return Err(TranslateError::unsupported(
                    Construct::Symbol,
                    format!("type `{}` has no qualified name", symbol.name),
                ));
            };
            return Ok(self.class_reference(qualified));
        }
        let scope = self.scopes.classify(symbol)?;
        let ty = self.types.resolve(&symbol.ty)?;
        if scope == VariableScope::Field {
            self.references.fields.insert(name.to_string());
        }
        self.scopes.declare(sym, scope, ty.clone());
        Expr::identifier(name, scope).as_type(&ty)
    }

    /// Classified reference to a type used as an expression.
    fn class_reference(&self, name: &str) -> Expr {
        if name == self.names.console_class {
            return Expr::Class(ClassRef::Console);
        }
        if name == self.names.arrays_class {
            return Expr::Class(ClassRef::Arrays);
        }
        let class = self.types.classify(name);
        let class = match class.kind {
            ClassKind::Throwable => ClassRef::Throwable(class),
            ClassKind::JsonObject => ClassRef::JsonObject,
            ClassKind::JsonArray => ClassRef::JsonArray,
            ClassKind::Map => ClassRef::Map,
            ClassKind::List => ClassRef::List,
            ClassKind::Api => ClassRef::Api(class),
            ClassKind::DataObject => ClassRef::DataObject(class),
            ClassKind::Enum => ClassRef::Enum(class),
            _ => ClassRef::Java(class),
        };
        Expr::Class(class)
    }

    fn member_select(
        &mut self,
        target: &ast::Expr,
        name: &str,
        ty: &JavaType,
        ctx: &TranslationContext,
    ) -> Result<Expr> {
        let expected = self.types.resolve(ty)?;
        let own_field = matches!(target.strip_parens(), ast::Expr::Ident { name: this, .. } if this == "this")
            && self.provider.unit().fields.iter().any(|field| field.name == name);
        if own_field {
            self.references.fields.insert(name.to_string());
            return Expr::identifier(name, VariableScope::Field).as_type(&expected);
        }
        self.expression(target, ctx)?.on_field(name)?.as_type(&expected)
    }

    fn invocation(
        &mut self,
        callee: &Callee,
        method: SymbolId,
        args: &[Arg],
        ty: &JavaType,
        ctx: &TranslationContext,
    ) -> Result<Expr> {
        let receiver = match callee {
            Callee::Unqualified { name } => {
                self.references.methods.insert(name.clone());
                Expr::This
            }
            Callee::Member { target, .. } => self.expression(target, ctx)?,
        };
        let arg_types = args
            .iter()
            .map(|arg| self.types.resolve_arg(&arg.ty))
            .collect::<Result<Vec<_>>>()?;
        let arg_models = args
            .iter()
            .map(|arg| self.expression(&arg.expr, ctx))
            .collect::<Result<Vec<_>>>()?;
        let return_type = self.types.resolve(ty)?;
        let site = CallSite {
            receiver_type: self.types.owner(method)?,
            method: self.types.signature(method)?,
            return_type: return_type.clone(),
            args: arg_models,
            arg_types,
        };
        receiver.on_method_invocation(site)?.as_type(&return_type)
    }

    fn method_reference(
        &mut self,
        qualifier: &ast::Expr,
        name: &str,
        mode: RefMode,
        method: SymbolId,
        ctx: &TranslationContext,
    ) -> Result<Expr> {
        if mode == RefMode::New {
            return Err(TranslateError::unsupported(
                Construct::MethodReference,
                "constructor reference",
            ));
        }
        let receiver = self.expression(qualifier, ctx)?;
        match &receiver {
            Expr::Class(_) => {
                return Err(TranslateError::unsupported(
                    Construct::MethodReference,
                    format!("`{name}` is not bound to an instance"),
                ));
            }
            Expr::This => {
                self.references.methods.insert(name.to_string());
            }
            _ => {}
        }
        let signature = self.types.signature(method)?;
        receiver.on_method_reference(signature)
    }
}
