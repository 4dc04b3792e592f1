//! Per-unit translation context.

use crate::config::TranslateConfig;
use crate::input::tree::SymbolId;
use crate::ir::{BinaryOp, ConditionalBlock, Expr, Stmt};
use crate::scope::VariableScope;
use crate::traits::TranslateError;
use crate::types::TypeInfo;
use tracing::trace;

/// Builds the model nodes whose shape depends on configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelFactory {
    pub async_result_idiom: bool,
    pub preserve_fragments: bool,
}

impl ModelFactory {
    pub fn from_config(config: &TranslateConfig) -> Self {
        Self {
            async_result_idiom: config.async_result_idiom,
            preserve_fragments: config.preserve_fragments,
        }
    }

    pub fn combine(&self, lhs: Expr, op: BinaryOp, rhs: Expr) -> Result<Expr, TranslateError> {
        lhs.on_binary(op, rhs)
    }

    pub fn variable_decl(&self, scope: VariableScope, ty: TypeInfo, name: &str, init: Option<Expr>) -> Stmt {
        Stmt::VarDecl {
            scope,
            ty,
            name: name.to_string(),
            init,
        }
    }

    pub fn conditionals(&self, branches: Vec<ConditionalBlock>, otherwise: Option<Stmt>) -> Stmt {
        Stmt::Conditionals {
            branches,
            otherwise: otherwise.map(Box::new),
        }
    }

    pub fn for_loop(&self, init: Stmt, cond: Expr, update: Expr, body: Stmt) -> Stmt {
        Stmt::For {
            init: Box::new(init),
            cond,
            update,
            body: Box::new(body),
        }
    }

    pub fn sequence_for(&self, id: &str, from: Expr, to: Expr, body: Stmt) -> Stmt {
        trace!(id, "ranged loop");
        Stmt::SequenceFor {
            id: id.to_string(),
            from,
            to,
            body: Box::new(body),
        }
    }

    pub fn for_each(&self, element: &str, element_type: TypeInfo, iterable: Expr, body: Stmt) -> Stmt {
        Stmt::ForEach {
            element: element.to_string(),
            element_type,
            iterable,
            body: Box::new(body),
        }
    }

    /// Accessor standing in for an async-result callback parameter.
    pub fn async_result(&self, name: &str, result_type: TypeInfo) -> Expr {
        Expr::AsyncResult {
            name: name.to_string(),
            result_type,
        }
    }
}

/// Immutable context threaded through one unit's traversal.
///
/// Entering a scope that rebinds a symbol produces a child context; the
/// parent is left untouched. The alias map is persistent, so a child costs
/// one node allocation rather than a copy.
#[derive(Debug, Clone)]
pub struct TranslationContext {
    aliases: im::HashMap<SymbolId, Expr>,
    factory: ModelFactory,
}

impl TranslationContext {
    pub fn new(factory: ModelFactory) -> Self {
        Self {
            aliases: im::HashMap::new(),
            factory,
        }
    }

    pub fn factory(&self) -> &ModelFactory {
        &self.factory
    }

    pub fn alias(&self, sym: SymbolId) -> Option<&Expr> {
        self.aliases.get(&sym)
    }

    /// Child context where `sym` resolves to `expr`.
    pub fn with_alias(&self, sym: SymbolId, expr: Expr) -> Self {
        Self {
            aliases: self.aliases.update(sym, expr),
            factory: self.factory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ModelFactory {
        ModelFactory::from_config(&TranslateConfig::default())
    }

    #[test]
    fn child_alias_does_not_leak_into_parent() {
        let parent = TranslationContext::new(factory());
        let accessor = factory().async_result("ar", TypeInfo::String);
        let child = parent.with_alias(SymbolId(7), accessor.clone());
        assert_eq!(child.alias(SymbolId(7)), Some(&accessor));
        assert_eq!(parent.alias(SymbolId(7)), None);
    }

    #[test]
    fn siblings_are_independent() {
        let parent = TranslationContext::new(factory());
        let a = parent.with_alias(SymbolId(1), Expr::string("a"));
        let b = parent.with_alias(SymbolId(1), Expr::string("b"));
        assert_eq!(a.alias(SymbolId(1)), Some(&Expr::string("a")));
        assert_eq!(b.alias(SymbolId(1)), Some(&Expr::string("b")));
    }
}
