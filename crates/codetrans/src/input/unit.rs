//! In-memory typed-tree provider.

use crate::input::tree::{
    ClassInfo, CompilationUnit, JavaType, MethodType, Symbol, SymbolId, SymbolKind,
};
use crate::traits::TreeProvider;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;

/// A resolved unit together with its symbol, class and method tables.
///
/// This is the hand-over format between a resolving front-end and the
/// translator. It can be built programmatically (tests do) or loaded from
/// JSON with [`UnitTree::from_json`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitTree {
    pub unit: CompilationUnit,
    /// Original source text; block fragments are sliced from it.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub symbols: BTreeMap<SymbolId, Symbol>,
    #[serde(default)]
    pub classes: BTreeMap<String, ClassInfo>,
    #[serde(default)]
    pub methods: BTreeMap<SymbolId, MethodType>,
}

impl UnitTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            unit: CompilationUnit {
                name: name.into(),
                ..CompilationUnit::default()
            },
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn next_id(&self) -> SymbolId {
        let next = self
            .symbols
            .keys()
            .next_back()
            .map_or(0, |SymbolId(id)| id + 1);
        SymbolId(next)
    }

    /// Register a symbol and return its id.
    pub fn declare(&mut self, name: impl Into<String>, kind: SymbolKind, ty: JavaType) -> SymbolId {
        let id = self.next_id();
        self.symbols.insert(
            id,
            Symbol {
                name: name.into(),
                kind,
                ty,
                owner: None,
            },
        );
        id
    }

    /// Register a type symbol; the class metadata is recorded as well.
    pub fn declare_type(&mut self, class: ClassInfo) -> SymbolId {
        let name = class.name.clone();
        let simple = name.rsplit('.').next().unwrap_or(&name).to_string();
        self.classes.insert(name.clone(), class);
        self.declare(simple, SymbolKind::Type, JavaType::declared(name))
    }

    /// Register a method symbol with its declared signature.
    pub fn declare_method(&mut self, method: MethodType) -> SymbolId {
        let owner = method.owner.qualified_name().map(str::to_string);
        let id = self.next_id();
        self.symbols.insert(
            id,
            Symbol {
                name: method.name.clone(),
                kind: SymbolKind::Method,
                ty: method.ret.clone(),
                owner,
            },
        );
        self.methods.insert(id, method);
        id
    }

    pub fn add_class(&mut self, class: ClassInfo) {
        self.classes.insert(class.name.clone(), class);
    }
}

impl TreeProvider for UnitTree {
    fn unit(&self) -> &CompilationUnit {
        &self.unit
    }

    fn source_text(&self) -> io::Result<Cow<'_, str>> {
        self.source
            .as_deref()
            .map(Cow::Borrowed)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "source text not available"))
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    fn class(&self, qualified_name: &str) -> Option<&ClassInfo> {
        self.classes.get(qualified_name)
    }

    fn method(&self, id: SymbolId) -> Option<&MethodType> {
        self.methods.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tree::ClassDeclKind;

    #[test]
    fn declares_sequential_ids() {
        let mut tree = UnitTree::new("demo.Main");
        let a = tree.declare("a", SymbolKind::LocalVariable, JavaType::string());
        let b = tree.declare("b", SymbolKind::Parameter, JavaType::string());
        assert_eq!(a, SymbolId(0));
        assert_eq!(b, SymbolId(1));
        assert_eq!(tree.symbol(b).map(|s| s.kind), Some(SymbolKind::Parameter));
    }

    #[test]
    fn type_symbols_record_class_metadata() {
        let mut tree = UnitTree::new("demo.Main");
        let id = tree.declare_type(ClassInfo::new("demo.Color", ClassDeclKind::Enum));
        let symbol = tree.symbol(id).expect("symbol");
        assert_eq!(symbol.name, "Color");
        assert_eq!(symbol.kind, SymbolKind::Type);
        assert!(tree.class("demo.Color").is_some());
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let tree = UnitTree::new("demo.Main");
        let err = tree.source_text().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn json_roundtrip_keeps_tables() {
        let mut tree = UnitTree::new("demo.Main").with_source("class Main {}");
        tree.declare("x", SymbolKind::Field, JavaType::Primitive(crate::input::PrimitiveKind::Int));
        let json = tree.to_json().unwrap();
        let back = UnitTree::from_json(&json).unwrap();
        assert_eq!(back.symbols, tree.symbols);
        assert_eq!(back.source.as_deref(), Some("class Main {}"));
    }
}
