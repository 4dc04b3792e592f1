//! Variable scope classification.

use crate::input::tree::{CompilationUnit, Symbol, SymbolId, SymbolKind};
use crate::traits::{Construct, TranslateError};
use crate::types::TypeInfo;
use std::collections::{HashMap, HashSet};

/// Where a binding lives; drives the access syntax a writer picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableScope {
    Variable,
    Parameter,
    Field,
    Global,
}

/// A classified binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub scope: VariableScope,
    pub ty: TypeInfo,
}

/// Classifies bindings and remembers them for the rest of the unit.
///
/// Declarations seen by the builder are recorded up front, so references to
/// locals and parameters never go back to the provider.
#[derive(Debug, Default)]
pub struct ScopeClassifier {
    fields: HashSet<String>,
    bindings: HashMap<SymbolId, Binding>,
}

impl ScopeClassifier {
    pub fn new(unit: &CompilationUnit) -> Self {
        Self {
            fields: unit.fields.iter().map(|f| f.name.clone()).collect(),
            bindings: HashMap::new(),
        }
    }

    pub fn declare(&mut self, sym: SymbolId, scope: VariableScope, ty: TypeInfo) {
        self.bindings.insert(sym, Binding { scope, ty });
    }

    pub fn lookup(&self, sym: SymbolId) -> Option<&Binding> {
        self.bindings.get(&sym)
    }

    /// Scope of a resolved symbol.
    ///
    /// A field is `Field` when the unit declares it and `Global` otherwise
    /// (inherited or external state).
    pub fn classify(&self, symbol: &Symbol) -> Result<VariableScope, TranslateError> {
        match symbol.kind {
            SymbolKind::LocalVariable | SymbolKind::ExceptionParameter => Ok(VariableScope::Variable),
            SymbolKind::Parameter => Ok(VariableScope::Parameter),
            SymbolKind::Field if self.fields.contains(&symbol.name) => Ok(VariableScope::Field),
            SymbolKind::Field => Ok(VariableScope::Global),
            SymbolKind::Method | SymbolKind::Type => Err(TranslateError::unsupported(
                Construct::Symbol,
                format!("`{}` is not a variable ({:?})", symbol.name, symbol.kind),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tree::{FieldDecl, JavaType};

    fn symbol(name: &str, kind: SymbolKind) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind,
            ty: JavaType::string(),
            owner: None,
        }
    }

    #[test]
    fn fields_fall_back_to_global() {
        let unit = CompilationUnit {
            name: "demo.Main".to_string(),
            fields: vec![FieldDecl {
                name: "count".to_string(),
                sym: SymbolId(0),
                ty: JavaType::string(),
                init: None,
            }],
            methods: Vec::new(),
        };
        let scopes = ScopeClassifier::new(&unit);
        assert_eq!(scopes.classify(&symbol("count", SymbolKind::Field)).unwrap(), VariableScope::Field);
        assert_eq!(scopes.classify(&symbol("vertx", SymbolKind::Field)).unwrap(), VariableScope::Global);
        assert_eq!(
            scopes.classify(&symbol("e", SymbolKind::ExceptionParameter)).unwrap(),
            VariableScope::Variable
        );
    }

    #[test]
    fn methods_are_not_variables() {
        let scopes = ScopeClassifier::default();
        let err = scopes.classify(&symbol("run", SymbolKind::Method)).unwrap_err();
        assert_eq!(err.construct(), Construct::Symbol);
    }

    #[test]
    fn declared_bindings_are_remembered() {
        let mut scopes = ScopeClassifier::default();
        scopes.declare(SymbolId(3), VariableScope::Parameter, TypeInfo::String);
        assert_eq!(scopes.lookup(SymbolId(3)).map(|b| b.scope), Some(VariableScope::Parameter));
        assert!(scopes.lookup(SymbolId(4)).is_none());
    }
}
