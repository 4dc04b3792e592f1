//! Double dispatch from model nodes to writer callbacks.

use super::{Access, Expr, Stmt};
use crate::output::{CodeWriter, RenderResult};

impl Expr {
    pub fn render<W: CodeWriter + ?Sized>(&self, w: &mut W) -> RenderResult {
        match self {
            Expr::Identifier { name, scope } => w.render_identifier(name, *scope),
            Expr::This => w.render_this(),
            Expr::Literal(literal) => w.render_literal(literal),
            Expr::Concat(parts) => w.render_concat(parts),
            Expr::Parenthesized(inner) => w.render_parenthesized(inner),
            Expr::Binary { op, lhs, rhs } => w.render_binary(*op, lhs, rhs),
            Expr::Unary { op, operand } => w.render_unary(*op, operand),
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => w.render_conditional_expr(cond, then, otherwise),
            Expr::Assign { target, value } => w.render_assign(target, value),
            Expr::Field { receiver, name } => w.render_field_access(receiver, name),
            Expr::Invocation(invocation) => w.render_method_invocation(invocation),
            Expr::New { class, args } => w.render_new(class, args),
            Expr::InstanceOf { expr, class } => w.render_instance_of(expr, class),
            Expr::Lambda(lambda) => {
                w.render_lambda(&lambda.param_names, &lambda.param_types, &lambda.body)
            }
            Expr::AsyncHandler(handler) => w.render_async_handler(handler),
            Expr::MethodReference { receiver, method } => w.render_method_reference(receiver, method),
            Expr::Class(class) => w.render_class_ref(class),
            Expr::JsonObjectLiteral(members) => w.render_json_object(members),
            Expr::JsonArrayLiteral(values) => w.render_json_array(values),
            Expr::DataObjectLiteral { ty, members } => w.render_data_object(ty, members),
            Expr::ListLiteral(values) => w.render_list_literal(values),
            Expr::NewMap => w.render_new_map(),
            Expr::NewList => w.render_new_list(),
            Expr::Throwable { ty, reason } => w.render_throwable(ty, reason.as_deref()),
            Expr::EnumConstant { ty, constant } => w.render_enum_constant(ty, constant),
            Expr::Console(stream) => w.render_console(*stream),
            Expr::ConsolePrint { stream, arg } => w.render_console_print(*stream, arg),
            Expr::AsyncResult { name, .. } => {
                w.render_identifier(name, crate::scope::VariableScope::Parameter)
            }
            Expr::AsyncResultCall { name, op, .. } => w.render_async_result(name, *op),
            Expr::Typed { value, .. } => value.render(w),
            Expr::Access(access) => access.render(w),
        }
    }
}

impl Access {
    pub fn render<W: CodeWriter + ?Sized>(&self, w: &mut W) -> RenderResult {
        match self {
            Access::JsonObjectGet { object, key } => w.render_json_object_get(object, key),
            Access::JsonObjectPut { object, key, value } => w.render_json_object_put(object, key, value),
            Access::JsonObjectEncode(object) => w.render_json_object_encode(object),
            Access::JsonArrayGet { array, index } => w.render_json_array_get(array, index),
            Access::JsonArrayAdd { array, value } => w.render_json_array_add(array, value),
            Access::JsonArraySize(array) => w.render_json_array_size(array),
            Access::JsonArrayEncode(array) => w.render_json_array_encode(array),
            Access::DataObjectGet { object, name } => w.render_data_object_get(object, name),
            Access::DataObjectSet { object, name, value } => {
                w.render_data_object_set(object, name, value)
            }
            Access::MapGet { map, key } => w.render_map_get(map, key),
            Access::MapPut { map, key, value } => w.render_map_put(map, key, value),
            Access::MapForEach {
                map,
                key_name,
                value_name,
                body,
            } => w.render_map_for_each(map, key_name, value_name, body),
            Access::ListGet { list, index } => w.render_list_get(list, index),
            Access::ListAdd { list, value } => w.render_list_add(list, value),
            Access::ListSize(list) => w.render_list_size(list),
        }
    }
}

impl Stmt {
    pub fn render<W: CodeWriter + ?Sized>(&self, w: &mut W) -> RenderResult {
        match self {
            Stmt::Return(value) => w.render_return(value.as_ref()),
            Stmt::Assign { target, value } => w.render_assign(target, value),
            Stmt::VarDecl {
                scope,
                ty,
                name,
                init,
            } => w.render_var_decl(*scope, ty, name, init.as_ref()),
            Stmt::Conditionals {
                branches,
                otherwise,
            } => w.render_conditionals(branches, otherwise.as_deref()),
            Stmt::TryCatch {
                body,
                catch_param,
                catch_body,
            } => w.render_try_catch(body, catch_param, catch_body),
            Stmt::Throw { ty, reason } => w.render_throw(ty, reason.as_ref()),
            Stmt::Block(block) => w.render_nested_block(block),
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => w.render_for(init, cond, update, body),
            Stmt::SequenceFor { id, from, to, body } => w.render_sequence_for(id, from, to, body),
            Stmt::ForEach {
                element,
                element_type,
                iterable,
                body,
            } => w.render_for_each(element, element_type, iterable, body),
            Stmt::Expr(expr) => w.render_expression_statement(expr),
        }
    }
}
