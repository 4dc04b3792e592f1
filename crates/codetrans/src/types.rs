//! Type and method descriptors.
//!
//! The resolver maps provider types onto a closed set of [`ClassKind`]s and
//! normalizes call-site signatures. Every capability decision in the model
//! builder is made on these descriptors, never on raw provider types.

use crate::config::Classification;
use crate::input::tree::{ClassDeclKind, JavaType, PrimitiveKind, SymbolId};
use crate::traits::{Construct, TranslateError, TreeProvider};
use std::collections::HashSet;

/// Semantic role of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Primitive,
    BoxedPrimitive,
    String,
    Void,
    Enum,
    /// Annotated API component.
    Api,
    /// Structured-object container.
    JsonObject,
    /// Structured-array container.
    JsonArray,
    /// Value object with bean-style accessors.
    DataObject,
    Throwable,
    AsyncResult,
    Map,
    List,
    Array,
    TypeVariable,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub name: String,
    pub kind: ClassKind,
}

impl ClassType {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Simple name for `java.lang` classes, qualified name otherwise.
    pub fn display_name(&self) -> &str {
        match self.name.strip_prefix("java.lang.") {
            Some(rest) if !rest.contains('.') => rest,
            _ => &self.name,
        }
    }

    pub fn package(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(package, _)| package)
    }
}

/// Structured type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeInfo {
    Primitive(PrimitiveKind),
    Boxed(PrimitiveKind),
    String,
    Void,
    Class(ClassType),
    Parameterized { raw: ClassType, args: Vec<TypeInfo> },
    Array(Box<TypeInfo>),
    Variable(String),
}

impl TypeInfo {
    pub fn kind(&self) -> ClassKind {
        match self {
            TypeInfo::Primitive(_) => ClassKind::Primitive,
            TypeInfo::Boxed(_) => ClassKind::BoxedPrimitive,
            TypeInfo::String => ClassKind::String,
            TypeInfo::Void => ClassKind::Void,
            TypeInfo::Class(class) | TypeInfo::Parameterized { raw: class, .. } => class.kind,
            TypeInfo::Array(_) => ClassKind::Array,
            TypeInfo::Variable(_) => ClassKind::TypeVariable,
        }
    }

    /// Qualified name, without type arguments.
    pub fn name(&self) -> String {
        match self {
            TypeInfo::Primitive(p) => p.keyword().to_string(),
            TypeInfo::Boxed(p) => p.boxed_name().to_string(),
            TypeInfo::String => "java.lang.String".to_string(),
            TypeInfo::Void => "void".to_string(),
            TypeInfo::Class(class) | TypeInfo::Parameterized { raw: class, .. } => {
                class.name.clone()
            }
            TypeInfo::Array(component) => format!("{}[]", component.name()),
            TypeInfo::Variable(name) => name.clone(),
        }
    }

    pub fn class(&self) -> Option<&ClassType> {
        match self {
            TypeInfo::Class(class) | TypeInfo::Parameterized { raw: class, .. } => Some(class),
            _ => None,
        }
    }

    pub fn args(&self) -> &[TypeInfo] {
        match self {
            TypeInfo::Parameterized { args, .. } => args,
            _ => &[],
        }
    }

    pub fn class_named(name: impl Into<String>, kind: ClassKind) -> Self {
        TypeInfo::Class(ClassType::new(name, kind))
    }
}

/// Normalized method signature, used as the dispatch key for idiom selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub name: String,
    /// Parameter types; a varargs tail is given as its element type.
    pub params: Vec<TypeInfo>,
    pub varargs: bool,
    pub ret: TypeInfo,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, params: Vec<TypeInfo>, varargs: bool, ret: TypeInfo) -> Self {
        Self {
            name: name.into(),
            params,
            varargs,
            ret,
        }
    }
}

/// Turns provider types into descriptors.
pub struct TypeResolver<'a, P: TreeProvider + ?Sized> {
    provider: &'a P,
    names: &'a Classification,
}

impl<'a, P: TreeProvider + ?Sized> TypeResolver<'a, P> {
    pub fn new(provider: &'a P, names: &'a Classification) -> Self {
        Self { provider, names }
    }

    pub fn resolve(&self, ty: &JavaType) -> Result<TypeInfo, TranslateError> {
        match ty {
            JavaType::Primitive(p) => Ok(TypeInfo::Primitive(*p)),
            JavaType::Void => Ok(TypeInfo::Void),
            JavaType::Null => Err(TranslateError::unsupported(
                Construct::Symbol,
                "the null type has no descriptor",
            )),
            JavaType::Declared { name, args } => {
                if name == "java.lang.String" {
                    return Ok(TypeInfo::String);
                }
                if name == "java.lang.Void" {
                    return Ok(TypeInfo::Void);
                }
                if let Some(p) = PrimitiveKind::from_boxed_name(name) {
                    return Ok(TypeInfo::Boxed(p));
                }
                let raw = self.classify(name);
                if args.is_empty() {
                    Ok(TypeInfo::Class(raw))
                } else {
                    let args = args
                        .iter()
                        .map(|arg| self.resolve(arg))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(TypeInfo::Parameterized { raw, args })
                }
            }
            JavaType::Array(component) => Ok(TypeInfo::Array(Box::new(self.resolve(component)?))),
            JavaType::TypeVar(name) => Ok(TypeInfo::Variable(name.clone())),
        }
    }

    /// Argument types; `null` arguments have no descriptor.
    pub fn resolve_arg(&self, ty: &JavaType) -> Result<Option<TypeInfo>, TranslateError> {
        match ty {
            JavaType::Null => Ok(None),
            other => self.resolve(other).map(Some),
        }
    }

    /// Classify a declared class by qualified name.
    pub fn classify(&self, name: &str) -> ClassType {
        ClassType::new(name, self.kind_of(name))
    }

    fn kind_of(&self, name: &str) -> ClassKind {
        let names = self.names;
        if name == names.json_object_class {
            return ClassKind::JsonObject;
        }
        if name == names.json_array_class {
            return ClassKind::JsonArray;
        }
        if name == names.async_result_class {
            return ClassKind::AsyncResult;
        }
        if names.map_classes.iter().any(|n| n == name) {
            return ClassKind::Map;
        }
        if names.list_classes.iter().any(|n| n == name) {
            return ClassKind::List;
        }
        if self.is_throwable(name) {
            return ClassKind::Throwable;
        }
        let Some(info) = self.provider.class(name) else {
            return ClassKind::Other;
        };
        if info.kind == ClassDeclKind::Enum {
            return ClassKind::Enum;
        }
        let annotated = |candidates: &[String]| {
            info.annotations
                .iter()
                .any(|a| candidates.iter().any(|c| c == a))
        };
        if annotated(&names.api_annotations) {
            ClassKind::Api
        } else if annotated(&names.data_object_annotations) {
            ClassKind::DataObject
        } else {
            ClassKind::Other
        }
    }

    /// Whether `name` is the throwable root or inherits from it.
    pub fn is_throwable(&self, name: &str) -> bool {
        let root = self.names.throwable_class.as_str();
        let mut seen = HashSet::new();
        let mut pending = vec![name];
        while let Some(current) = pending.pop() {
            if current == root {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(info) = self.provider.class(current) {
                pending.extend(info.supertypes.iter().map(String::as_str));
            }
        }
        false
    }

    /// Normalized signature of a method symbol.
    pub fn signature(&self, method: SymbolId) -> Result<MethodSignature, TranslateError> {
        let raw = self.provider.method(method).ok_or_else(|| {
            TranslateError::unsupported(
                Construct::Symbol,
                format!("no signature for method symbol {}", method.0),
            )
        })?;
        let last = raw.params.len().saturating_sub(1);
        let params = raw
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| match param {
                JavaType::Array(component) if raw.varargs && index == last => {
                    self.resolve(component)
                }
                other => self.resolve(other),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ret = self.resolve(&raw.ret)?;
        Ok(MethodSignature::new(raw.name.clone(), params, raw.varargs, ret))
    }

    /// Descriptor of the class declaring a method symbol.
    pub fn owner(&self, method: SymbolId) -> Result<TypeInfo, TranslateError> {
        let raw = self.provider.method(method).ok_or_else(|| {
            TranslateError::unsupported(
                Construct::Symbol,
                format!("no signature for method symbol {}", method.0),
            )
        })?;
        self.resolve(&raw.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tree::{ClassInfo, MethodType};
    use crate::input::UnitTree;

    fn tree() -> UnitTree {
        let mut tree = UnitTree::new("demo.Main");
        tree.add_class(
            ClassInfo::new("demo.Server", ClassDeclKind::Interface)
                .annotated("io.vertx.codegen.annotations.VertxGen"),
        );
        tree.add_class(
            ClassInfo::new("demo.Options", ClassDeclKind::Class)
                .annotated("io.vertx.codegen.annotations.DataObject"),
        );
        tree.add_class(ClassInfo::new("demo.Color", ClassDeclKind::Enum));
        tree.add_class(
            ClassInfo::new("java.lang.Exception", ClassDeclKind::Class).extends("java.lang.Throwable"),
        );
        tree.add_class(
            ClassInfo::new("demo.Oops", ClassDeclKind::Class).extends("java.lang.Exception"),
        );
        tree
    }

    #[test]
    fn classifies_every_kind() {
        let tree = tree();
        let names = Classification::default();
        let resolver = TypeResolver::new(&tree, &names);
        let kind = |name: &str| resolver.resolve(&JavaType::declared(name)).unwrap().kind();

        assert_eq!(kind("java.lang.String"), ClassKind::String);
        assert_eq!(kind("java.lang.Integer"), ClassKind::BoxedPrimitive);
        assert_eq!(kind("demo.Server"), ClassKind::Api);
        assert_eq!(kind("demo.Options"), ClassKind::DataObject);
        assert_eq!(kind("demo.Color"), ClassKind::Enum);
        assert_eq!(kind("demo.Oops"), ClassKind::Throwable);
        assert_eq!(kind("io.vertx.core.json.JsonObject"), ClassKind::JsonObject);
        assert_eq!(kind("io.vertx.core.json.JsonArray"), ClassKind::JsonArray);
        assert_eq!(kind("java.util.HashMap"), ClassKind::Map);
        assert_eq!(kind("java.util.List"), ClassKind::List);
        assert_eq!(kind("demo.Unknown"), ClassKind::Other);
    }

    #[test]
    fn parameterized_types_keep_arguments() {
        let tree = tree();
        let names = Classification::default();
        let resolver = TypeResolver::new(&tree, &names);
        let ty = resolver
            .resolve(&JavaType::parameterized(
                "io.vertx.core.AsyncResult",
                vec![JavaType::string()],
            ))
            .unwrap();
        assert_eq!(ty.kind(), ClassKind::AsyncResult);
        assert_eq!(ty.args(), &[TypeInfo::String]);
    }

    #[test]
    fn varargs_tail_is_normalized_to_element_type() {
        let mut tree = tree();
        let id = tree.declare_method(MethodType {
            name: "asList".to_string(),
            owner: JavaType::declared("java.util.Arrays"),
            params: vec![JavaType::array(JavaType::declared("java.lang.Object"))],
            varargs: true,
            ret: JavaType::declared("java.util.List"),
        });
        let names = Classification::default();
        let resolver = TypeResolver::new(&tree, &names);
        let signature = resolver.signature(id).unwrap();
        assert!(signature.varargs);
        assert_eq!(
            signature.params,
            vec![TypeInfo::class_named("java.lang.Object", ClassKind::Other)]
        );
        assert_eq!(signature.ret.kind(), ClassKind::List);
    }

    #[test]
    fn null_type_has_no_descriptor() {
        let tree = tree();
        let names = Classification::default();
        let resolver = TypeResolver::new(&tree, &names);
        assert_eq!(resolver.resolve_arg(&JavaType::Null).unwrap(), None);
        assert!(resolver.resolve(&JavaType::Null).is_err());
    }

    #[test]
    fn display_name_strips_java_lang_only() {
        assert_eq!(ClassType::new("java.lang.Exception", ClassKind::Throwable).display_name(), "Exception");
        assert_eq!(ClassType::new("java.io.IOException", ClassKind::Throwable).display_name(), "java.io.IOException");
    }
}
