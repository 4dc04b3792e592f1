//! Capability operations of expression nodes.
//!
//! The builder never inspects a receiver itself: it asks the receiver what a
//! field access, call, construction or coercion means. Each operation
//! consumes the receiver and returns the resulting node, so container
//! literals extend into new siblings while the original value stays intact
//! for anyone still holding it.

use super::{
    Access, AsyncResultOp, BinaryOp, ClassRef, ConsoleStream, Expr, Invocation, LambdaBody, Literal,
    Member, UnaryOp, ValueKind,
};
use crate::traits::{Construct, TranslateError};
use crate::types::{ClassKind, ClassType, MethodSignature, TypeInfo};
use tracing::trace;

type Result<T> = std::result::Result<T, TranslateError>;

/// A resolved call: everything about an invocation except its receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    /// Declaring type of the invoked method.
    pub receiver_type: TypeInfo,
    pub method: MethodSignature,
    /// Static type of the call expression.
    pub return_type: TypeInfo,
    pub args: Vec<Expr>,
    /// Argument types; `None` for `null` arguments.
    pub arg_types: Vec<Option<TypeInfo>>,
}

impl CallSite {
    pub fn name(&self) -> &str {
        &self.method.name
    }

    fn arity(&self) -> usize {
        self.args.len()
    }

    fn invoke(self, receiver: Expr) -> Expr {
        Expr::Invocation(Box::new(Invocation {
            receiver,
            site: self,
        }))
    }

    fn unsupported(&self, on: &str) -> TranslateError {
        TranslateError::unsupported(
            Construct::Invocation,
            format!("`{}` with {} argument(s) on {on}", self.method.name, self.args.len()),
        )
    }
}

/// Property name of a bean accessor (`getHost` -> `host`).
fn property(name: &str, prefix: &str) -> Option<String> {
    let rest = name.strip_prefix(prefix)?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    Some(first.to_lowercase().chain(chars).collect())
}

fn insert_member(members: im::Vector<Member>, member: Member) -> im::Vector<Member> {
    let mut next = members;
    match next.iter().position(|m| m.name() == member.name()) {
        Some(index) => {
            next.set(index, member);
        }
        None => next.push_back(member),
    }
    next
}

fn append_member(members: im::Vector<Member>, name: String, value: Expr) -> im::Vector<Member> {
    let existing = members.iter().position(|m| m.name() == name);
    let mut next = members;
    match existing.and_then(|index| next.get(index).cloned().map(|m| (index, m))) {
        Some((index, Member::Sequence { name, mut values })) => {
            values.push_back(value);
            next.set(index, Member::Sequence { name, values });
        }
        _ => {
            let member = Member::Sequence {
                name,
                values: im::vector![value],
            };
            next = insert_member(next, member);
        }
    }
    next
}

impl Expr {
    fn is_class(&self) -> bool {
        matches!(self, Expr::Class(_))
    }

    /// Whether the node answers calls with something other than a plain invocation.
    fn has_capabilities(&self) -> bool {
        matches!(
            self,
            Expr::Typed { .. }
                | Expr::AsyncResult { .. }
                | Expr::JsonObjectLiteral(_)
                | Expr::JsonArrayLiteral(_)
                | Expr::DataObjectLiteral { .. }
                | Expr::Console(_)
        )
    }

    /// `receiver.name`
    pub fn on_field(self, name: &str) -> Result<Expr> {
        match self {
            Expr::Class(ClassRef::Console) => match name {
                "out" => Ok(Expr::Console(ConsoleStream::Out)),
                "err" => Ok(Expr::Console(ConsoleStream::Err)),
                other => Err(TranslateError::unsupported(
                    Construct::Expression,
                    format!("console field `{other}`"),
                )),
            },
            Expr::Class(ClassRef::Enum(ty)) => Ok(Expr::EnumConstant {
                ty,
                constant: name.to_string(),
            }),
            Expr::AsyncResult { name: param, .. } => Err(TranslateError::unsupported(
                Construct::Expression,
                format!("field `{name}` on async result `{param}`"),
            )),
            receiver => Ok(Expr::Field {
                receiver: Box::new(receiver),
                name: name.to_string(),
            }),
        }
    }

    /// `receiver.method(args)`
    pub fn on_method_invocation(self, site: CallSite) -> Result<Expr> {
        match self {
            Expr::Console(stream) => console_call(stream, site),
            Expr::Class(ClassRef::Arrays) if site.name() == "asList" => Ok(Expr::ListLiteral(site.args)),
            Expr::Class(ClassRef::Arrays) => Err(site.unsupported("the array utility class")),
            Expr::Class(ClassRef::Console) => Err(site.unsupported("the console class")),
            Expr::JsonObjectLiteral(members) => json_object_literal_call(members, site),
            Expr::JsonArrayLiteral(values) => json_array_literal_call(values, site),
            Expr::DataObjectLiteral { ty, members } => data_object_literal_call(ty, members, site),
            Expr::Typed { value, kind } => typed_call(*value, kind, site),
            Expr::AsyncResult { name, result_type } => {
                match AsyncResultOp::from_method(site.name()) {
                    Some(op) if site.arity() == 0 => Ok(Expr::AsyncResultCall {
                        name,
                        result_type,
                        op,
                    }),
                    _ => Err(site.unsupported("an async result")),
                }
            }
            Expr::Parenthesized(inner) if inner.has_capabilities() => inner.on_method_invocation(site),
            receiver => Ok(site.invoke(receiver)),
        }
    }

    /// `new Receiver(args)`
    pub fn on_new(self, args: Vec<Expr>) -> Result<Expr> {
        let Expr::Class(class) = self else {
            return Err(TranslateError::unsupported(
                Construct::Construction,
                "construction on a value",
            ));
        };
        let no_args = |what: &str, args: &[Expr]| {
            if args.is_empty() {
                Ok(())
            } else {
                Err(TranslateError::unsupported(
                    Construct::Construction,
                    format!("{what} with {} argument(s)", args.len()),
                ))
            }
        };
        match class {
            ClassRef::JsonObject => {
                no_args("structured object", &args)?;
                Ok(Expr::JsonObjectLiteral(im::Vector::new()))
            }
            ClassRef::JsonArray => {
                no_args("structured array", &args)?;
                Ok(Expr::JsonArrayLiteral(im::Vector::new()))
            }
            ClassRef::Map => {
                no_args("map", &args)?;
                Ok(Expr::NewMap)
            }
            ClassRef::List => {
                no_args("list", &args)?;
                Ok(Expr::NewList)
            }
            ClassRef::DataObject(ty) if args.is_empty() => Ok(Expr::DataObjectLiteral {
                ty,
                members: im::Vector::new(),
            }),
            ClassRef::DataObject(ty) | ClassRef::Api(ty) | ClassRef::Java(ty) => {
                Ok(Expr::New { class: ty, args })
            }
            ClassRef::Throwable(ty) => {
                if args.len() > 1 {
                    return Err(TranslateError::unsupported(
                        Construct::Construction,
                        format!("`{}` with {} arguments", ty.name, args.len()),
                    ));
                }
                Ok(Expr::Throwable {
                    ty,
                    reason: args.into_iter().next().map(Box::new),
                })
            }
            ClassRef::Enum(ty) => Err(TranslateError::unsupported(
                Construct::Construction,
                format!("enum `{}`", ty.name),
            )),
            ClassRef::Console | ClassRef::Arrays => Err(TranslateError::unsupported(
                Construct::Construction,
                "utility class",
            )),
        }
    }

    /// `self instanceof class`
    pub fn on_instance_of(self, class: ClassType) -> Result<Expr> {
        if self.is_class() {
            return Err(TranslateError::unsupported(
                Construct::Expression,
                "instanceof on a type",
            ));
        }
        Ok(Expr::InstanceOf {
            expr: Box::new(self),
            class,
        })
    }

    pub fn on_unary(self, op: UnaryOp) -> Result<Expr> {
        if self.is_class() {
            return Err(TranslateError::unsupported(
                Construct::UnaryOperator,
                format!("`{}` on a type", op.symbol()),
            ));
        }
        Ok(Expr::Unary {
            op,
            operand: Box::new(self),
        })
    }

    /// `self op rhs`; `+` with a string operand folds into a concatenation.
    pub fn on_binary(self, op: BinaryOp, rhs: Expr) -> Result<Expr> {
        if self.is_class() || rhs.is_class() {
            return Err(TranslateError::unsupported(
                Construct::BinaryOperator,
                format!("`{}` on a type", op.symbol()),
            ));
        }
        if op == BinaryOp::Add {
            match (self, rhs) {
                (Expr::Concat(mut parts), rhs) => {
                    parts.push(rhs);
                    Ok(Expr::Concat(parts))
                }
                (lhs, rhs) if lhs.as_str().is_some() || rhs.as_str().is_some() => {
                    Ok(Expr::Concat(vec![lhs, rhs]))
                }
                (lhs, rhs) => Ok(binary(op, lhs, rhs)),
            }
        } else {
            Ok(binary(op, self, rhs))
        }
    }

    /// `self::method`
    pub fn on_method_reference(self, method: MethodSignature) -> Result<Expr> {
        if let Expr::AsyncResult { name, .. } = &self {
            return Err(TranslateError::unsupported(
                Construct::MethodReference,
                format!("reference to `{}` on async result `{name}`", method.name),
            ));
        }
        Ok(Expr::MethodReference {
            receiver: Box::new(self),
            method,
        })
    }

    /// Check the node against a statically expected type.
    ///
    /// Literals only coerce to their own container kind. Plain values coerced
    /// to a container, data-object, map or list type pick up that capability.
    pub fn as_type(self, expected: &TypeInfo) -> Result<Expr> {
        let kind = expected.kind();
        match self {
            value if kind == ClassKind::Void => Ok(value),
            Expr::JsonObjectLiteral(_) if kind != ClassKind::JsonObject => Err(mismatch("structured object literal", expected)),
            Expr::JsonArrayLiteral(_) if kind != ClassKind::JsonArray => Err(mismatch("structured array literal", expected)),
            Expr::DataObjectLiteral { ty, members } => match expected.class() {
                Some(class) if class.name == ty.name => Ok(Expr::DataObjectLiteral { ty, members }),
                _ => Err(mismatch(&format!("`{}` literal", ty.name), expected)),
            },
            Expr::Typed { value, .. } => Ok(value.with_kind(expected)),
            value @ (Expr::Identifier { .. }
            | Expr::Field { .. }
            | Expr::Invocation(_)
            | Expr::Parenthesized(_)
            | Expr::Conditional { .. }
            | Expr::AsyncResultCall { .. }
            | Expr::Access(_)) => Ok(value.with_kind(expected)),
            other => Ok(other),
        }
    }

    fn with_kind(self, expected: &TypeInfo) -> Expr {
        let kind = match (expected.kind(), expected.class()) {
            (ClassKind::JsonObject, _) => ValueKind::JsonObject,
            (ClassKind::JsonArray, _) => ValueKind::JsonArray,
            (ClassKind::DataObject, Some(class)) => ValueKind::DataObject(class.clone()),
            (ClassKind::Map, _) => ValueKind::Map,
            (ClassKind::List, _) => ValueKind::List,
            _ => return self,
        };
        Expr::Typed {
            value: Box::new(self),
            kind,
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn mismatch(what: &str, expected: &TypeInfo) -> TranslateError {
    TranslateError::unsupported(
        Construct::Coercion,
        format!("{what} used as `{}`", expected.name()),
    )
}

fn console_call(stream: ConsoleStream, site: CallSite) -> Result<Expr> {
    let name = site.name().to_string();
    match (name.as_str(), site.arity()) {
        ("println", 0) => Ok(Expr::ConsolePrint {
            stream,
            arg: Box::new(Expr::string("")),
        }),
        ("println" | "print", 1) => {
            let arg = site.args.into_iter().next().unwrap_or_else(|| Expr::string(""));
            Ok(Expr::ConsolePrint {
                stream,
                arg: Box::new(arg),
            })
        }
        _ => Err(site.unsupported("the console")),
    }
}

fn two_args(site: CallSite) -> Option<(Expr, Expr)> {
    let mut args = site.args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (Some(a), Some(b), None) => Some((a, b)),
        _ => None,
    }
}

fn one_arg(site: CallSite) -> Option<Expr> {
    let mut args = site.args.into_iter();
    match (args.next(), args.next()) {
        (Some(a), None) => Some(a),
        _ => None,
    }
}

fn json_object_literal_call(members: im::Vector<Member>, site: CallSite) -> Result<Expr> {
    let name = site.name().to_string();
    let key = site.args.first().and_then(Expr::as_str).map(str::to_string);
    match (name.as_str(), site.arity(), key) {
        ("put", 2, Some(key)) => {
            let Some((_, value)) = two_args(site) else {
                return Err(TranslateError::unsupported(Construct::Invocation, "put"));
            };
            trace!(key = %key, "extending structured object literal");
            Ok(Expr::JsonObjectLiteral(insert_member(
                members,
                Member::Single { name: key, value },
            )))
        }
        ("putNull", 1, Some(key)) => Ok(Expr::JsonObjectLiteral(insert_member(
            members,
            Member::Single {
                name: key,
                value: Expr::null(),
            },
        ))),
        _ => typed_call(Expr::JsonObjectLiteral(members), ValueKind::JsonObject, site),
    }
}

fn json_array_literal_call(values: im::Vector<Expr>, site: CallSite) -> Result<Expr> {
    let name = site.name().to_string();
    match (name.as_str(), site.arity()) {
        ("add", 1) => {
            let mut next = values;
            next.push_back(one_arg(site).unwrap_or_else(Expr::null));
            Ok(Expr::JsonArrayLiteral(next))
        }
        ("addNull", 0) => {
            let mut next = values;
            next.push_back(Expr::null());
            Ok(Expr::JsonArrayLiteral(next))
        }
        _ => typed_call(Expr::JsonArrayLiteral(values), ValueKind::JsonArray, site),
    }
}

fn data_object_literal_call(ty: ClassType, members: im::Vector<Member>, site: CallSite) -> Result<Expr> {
    if site.arity() == 1 {
        if let Some(name) = property(site.name(), "set") {
            let value = one_arg(site).unwrap_or_else(Expr::null);
            let members = insert_member(members, Member::Single { name, value });
            return Ok(Expr::DataObjectLiteral { ty, members });
        }
        if let Some(name) = property(site.name(), "add") {
            let value = one_arg(site).unwrap_or_else(Expr::null);
            let members = append_member(members, format!("{name}s"), value);
            return Ok(Expr::DataObjectLiteral { ty, members });
        }
    }
    let kind = ValueKind::DataObject(ty.clone());
    typed_call(Expr::DataObjectLiteral { ty, members }, kind, site)
}

/// Calls on a value whose static type carries a capability.
fn typed_call(value: Expr, kind: ValueKind, site: CallSite) -> Result<Expr> {
    let name = site.name().to_string();
    let arity = site.arity();
    let access = match (kind, name.as_str(), arity) {
        (ValueKind::JsonObject, "put", 2) => two_args(site).map(|(key, value_arg)| Access::JsonObjectPut {
            object: value,
            key,
            value: value_arg,
        }),
        (ValueKind::JsonObject, "putNull", 1) => one_arg(site).map(|key| Access::JsonObjectPut {
            object: value,
            key,
            value: Expr::null(),
        }),
        (ValueKind::JsonObject, "encode" | "encodePrettily" | "toString", 0) => {
            Some(Access::JsonObjectEncode(value))
        }
        (ValueKind::JsonObject, n, 1) if n.starts_with("get") => {
            one_arg(site).map(|key| Access::JsonObjectGet { object: value, key })
        }
        (ValueKind::JsonArray, "add", 1) => one_arg(site).map(|v| Access::JsonArrayAdd { array: value, value: v }),
        (ValueKind::JsonArray, "addNull", 0) => Some(Access::JsonArrayAdd {
            array: value,
            value: Expr::null(),
        }),
        (ValueKind::JsonArray, "size", 0) => Some(Access::JsonArraySize(value)),
        (ValueKind::JsonArray, "encode" | "encodePrettily" | "toString", 0) => {
            Some(Access::JsonArrayEncode(value))
        }
        (ValueKind::JsonArray, n, 1) if n.starts_with("get") => {
            one_arg(site).map(|index| Access::JsonArrayGet { array: value, index })
        }
        (ValueKind::DataObject(_), n, 1) if property(n, "set").is_some() => {
            let prop = property(n, "set").unwrap_or_default();
            one_arg(site).map(|v| Access::DataObjectSet {
                object: value,
                name: prop,
                value: v,
            })
        }
        (ValueKind::DataObject(_), n, 0) if property(n, "get").or_else(|| property(n, "is")).is_some() => {
            let prop = property(n, "get").or_else(|| property(n, "is")).unwrap_or_default();
            Some(Access::DataObjectGet { object: value, name: prop })
        }
        (ValueKind::Map, "get", 1) => one_arg(site).map(|key| Access::MapGet { map: value, key }),
        (ValueKind::Map, "put", 2) => two_args(site).map(|(key, v)| Access::MapPut { map: value, key, value: v }),
        (ValueKind::Map, "forEach", 1) => match one_arg(site) {
            Some(Expr::Lambda(lambda)) if lambda.param_names.len() == 2 => {
                let lambda = *lambda;
                let mut names = lambda.param_names.into_iter();
                let key_name = names.next().unwrap_or_default();
                let value_name = names.next().unwrap_or_default();
                Some(Access::MapForEach {
                    map: value,
                    key_name,
                    value_name,
                    body: lambda.body,
                })
            }
            _ => {
                return Err(TranslateError::unsupported(
                    Construct::Invocation,
                    "map forEach expects a two-parameter lambda",
                ));
            }
        },
        (ValueKind::List, "get", 1) => one_arg(site).map(|index| Access::ListGet { list: value, index }),
        (ValueKind::List, "add", 1) => one_arg(site).map(|v| Access::ListAdd { list: value, value: v }),
        (ValueKind::List, "size", 0) => Some(Access::ListSize(value)),
        (kind, _, _) => {
            let receiver = Expr::Typed {
                value: Box::new(value),
                kind,
            };
            return Ok(site.invoke(receiver));
        }
    };
    access.map(Expr::access).ok_or_else(|| {
        TranslateError::unsupported(Construct::Invocation, format!("`{name}` with {arity} argument(s)"))
    })
}

impl LambdaBody {
    pub fn is_expr(&self) -> bool {
        matches!(self, LambdaBody::Expr(_))
    }
}

impl Literal {
    pub fn is_string(&self) -> bool {
        matches!(self, Literal::String(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::VariableScope;
    use pretty_assertions::assert_eq;

    fn site(name: &str, args: Vec<Expr>) -> CallSite {
        CallSite {
            receiver_type: TypeInfo::Void,
            method: MethodSignature::new(name, Vec::new(), false, TypeInfo::Void),
            return_type: TypeInfo::Void,
            arg_types: args.iter().map(|_| None).collect(),
            args,
        }
    }

    fn ident(name: &str) -> Expr {
        Expr::identifier(name, VariableScope::Variable)
    }

    fn json_type() -> TypeInfo {
        TypeInfo::class_named("io.vertx.core.json.JsonObject", ClassKind::JsonObject)
    }

    fn array_type() -> TypeInfo {
        TypeInfo::class_named("io.vertx.core.json.JsonArray", ClassKind::JsonArray)
    }

    #[test]
    fn array_literal_extension_is_persistent() {
        let l1 = Expr::Class(ClassRef::JsonArray).on_new(Vec::new()).unwrap();
        let l2 = l1.clone().on_method_invocation(site("add", vec![ident("x")])).unwrap();
        let l3 = l1.clone().on_method_invocation(site("add", vec![ident("y")])).unwrap();
        assert_eq!(l1, Expr::JsonArrayLiteral(im::Vector::new()));
        assert_eq!(l2, Expr::JsonArrayLiteral(im::vector![ident("x")]));
        assert_eq!(l3, Expr::JsonArrayLiteral(im::vector![ident("y")]));
    }

    #[test]
    fn object_literal_put_replaces_existing_key() {
        let obj = Expr::JsonObjectLiteral(im::Vector::new())
            .on_method_invocation(site("put", vec![Expr::string("a"), ident("x")]))
            .unwrap()
            .on_method_invocation(site("putNull", vec![Expr::string("b")]))
            .unwrap()
            .on_method_invocation(site("put", vec![Expr::string("a"), ident("y")]))
            .unwrap();
        let Expr::JsonObjectLiteral(members) = obj else {
            panic!("expected literal, got {obj:?}");
        };
        let names: Vec<_> = members.iter().map(Member::name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(
            members.get(0),
            Some(&Member::Single {
                name: "a".to_string(),
                value: ident("y")
            })
        );
    }

    #[test]
    fn literal_coercion_is_strict() {
        let array = Expr::JsonArrayLiteral(im::Vector::new());
        let err = array.clone().as_type(&json_type()).unwrap_err();
        assert_eq!(err.construct(), Construct::Coercion);
        assert!(array.as_type(&array_type()).is_ok());
    }

    #[test]
    fn values_pick_up_capabilities() {
        let typed = ident("obj").as_type(&json_type()).unwrap();
        let get = typed
            .on_method_invocation(site("getString", vec![Expr::string("name")]))
            .unwrap();
        assert_eq!(
            get,
            Expr::access(Access::JsonObjectGet {
                object: ident("obj"),
                key: Expr::string("name"),
            })
        );
    }

    #[test]
    fn data_object_setters_and_adders() {
        let ty = ClassType::new("demo.Options", ClassKind::DataObject);
        let literal = Expr::Class(ClassRef::DataObject(ty.clone()))
            .on_new(Vec::new())
            .unwrap()
            .on_method_invocation(site("setPort", vec![ident("p")]))
            .unwrap()
            .on_method_invocation(site("addHost", vec![Expr::string("a")]))
            .unwrap()
            .on_method_invocation(site("addHost", vec![Expr::string("b")]))
            .unwrap();
        assert_eq!(
            literal,
            Expr::DataObjectLiteral {
                ty,
                members: im::vector![
                    Member::Single {
                        name: "port".to_string(),
                        value: ident("p")
                    },
                    Member::Sequence {
                        name: "hosts".to_string(),
                        values: im::vector![Expr::string("a"), Expr::string("b")]
                    },
                ],
            }
        );
    }

    #[test]
    fn string_plus_folds_into_concat() {
        let concat = Expr::string("a")
            .on_binary(BinaryOp::Add, ident("x"))
            .unwrap()
            .on_binary(BinaryOp::Add, Expr::string("b"))
            .unwrap();
        assert_eq!(
            concat,
            Expr::Concat(vec![Expr::string("a"), ident("x"), Expr::string("b")])
        );
        let sum = ident("x").on_binary(BinaryOp::Add, ident("y")).unwrap();
        assert!(matches!(sum, Expr::Binary { op: BinaryOp::Add, .. }));
    }

    #[test]
    fn console_println_becomes_print() {
        let print = Expr::Class(ClassRef::Console)
            .on_field("out")
            .unwrap()
            .on_method_invocation(site("println", vec![ident("x")]))
            .unwrap();
        assert_eq!(
            print,
            Expr::ConsolePrint {
                stream: ConsoleStream::Out,
                arg: Box::new(ident("x"))
            }
        );
    }

    #[test]
    fn async_result_accessors() {
        let result = Expr::AsyncResult {
            name: "ar".to_string(),
            result_type: TypeInfo::String,
        };
        let call = result.clone().on_method_invocation(site("failed", Vec::new())).unwrap();
        assert!(matches!(call, Expr::AsyncResultCall { op: AsyncResultOp::Failed, .. }));
        assert!(result.on_method_invocation(site("map", vec![ident("f")])).is_err());
    }

    #[test]
    fn throwable_takes_at_most_one_reason() {
        let ty = ClassType::new("java.lang.Exception", ClassKind::Throwable);
        let thrown = Expr::Class(ClassRef::Throwable(ty.clone()))
            .on_new(vec![Expr::string("boom")])
            .unwrap();
        assert_eq!(
            thrown,
            Expr::Throwable {
                ty: ty.clone(),
                reason: Some(Box::new(Expr::string("boom")))
            }
        );
        let err = Expr::Class(ClassRef::Throwable(ty))
            .on_new(vec![ident("a"), ident("b")])
            .unwrap_err();
        assert_eq!(err.construct(), Construct::Construction);
    }
}
