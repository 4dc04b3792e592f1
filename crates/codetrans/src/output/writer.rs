//! The callback surface between the code model and a target language.
//!
//! Model nodes call into a [`CodeWriter`]; the writer decides the syntax.
//! Provided methods spell things the C-family way (braces, `;`-free
//! statements, `a.b(c)` calls); each target overrides what differs and must
//! implement the callbacks that have no common spelling.

use super::emitter::CodeEmitter;
use crate::ir::{
    AsyncHandler, AsyncResultOp, BinaryOp, Block, ClassRef, ConditionalBlock, ConsoleStream, Expr,
    FieldModel, Invocation, LambdaBody, Literal, Member, MethodModel, Stmt, UnaryOp, UnitModel,
};
use crate::scope::VariableScope;
use crate::traits::{Construct, TranslateError};
use crate::types::{ClassType, MethodSignature, TypeInfo};
use std::borrow::Cow;

pub type RenderResult = Result<(), TranslateError>;

/// Escape `value` for a double-quoted string in a C-like language.
pub fn escape_c_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// `camelCase` to `snake_case`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub(crate) fn unsupported_shape(what: impl Into<String>) -> TranslateError {
    TranslateError::unsupported(Construct::Render, what)
}

/// Renders code model nodes as target source text.
pub trait CodeWriter {
    /// Target language name.
    fn language(&self) -> &'static str;

    fn emitter(&mut self) -> &mut CodeEmitter;

    fn append(&mut self, text: &str) {
        self.emitter().append(text);
    }

    fn indent(&mut self) {
        self.emitter().indent();
    }

    fn unindent(&mut self) {
        self.emitter().unindent();
    }

    /// Take the rendered text, resetting the writer.
    fn take_output(&mut self) -> String {
        self.emitter().take()
    }

    // ---- units and declarations ----

    /// Fields, then helper methods, then the entry body.
    fn render_unit(&mut self, unit: &UnitModel) -> RenderResult {
        for field in &unit.fields {
            self.render_field(field)?;
            let terminator = self.statement_terminator();
            self.append(terminator);
            self.append("\n");
        }
        for method in &unit.methods {
            if !self.emitter().is_empty() {
                self.append("\n");
            }
            self.render_method(method)?;
            self.append("\n");
        }
        if !unit.entry.stmts.is_empty() {
            if !self.emitter().is_empty() {
                self.append("\n");
            }
            self.render_block(&unit.entry)?;
        }
        Ok(())
    }

    fn render_field(&mut self, field: &FieldModel) -> RenderResult {
        self.render_var_decl(VariableScope::Field, &field.ty, &field.name, field.init.as_ref())
    }

    fn render_method(&mut self, method: &MethodModel) -> RenderResult;

    // ---- statements ----

    fn statement_terminator(&self) -> &'static str {
        ""
    }

    fn render_block(&mut self, block: &Block) -> RenderResult {
        for (index, stmt) in block.stmts.iter().enumerate() {
            if let Some(fragment) = block.fragment(index) {
                self.render_fragment(fragment)?;
            }
            self.render_statement(stmt)?;
        }
        if let Some(fragment) = block.fragment(block.stmts.len()) {
            self.render_fragment(fragment)?;
        }
        Ok(())
    }

    fn render_statement(&mut self, stmt: &Stmt) -> RenderResult {
        stmt.render(self)?;
        if stmt.needs_terminator() {
            let terminator = self.statement_terminator();
            self.append(terminator);
        }
        self.append("\n");
        Ok(())
    }

    /// Source text between statements: blank lines and `//` comments survive.
    fn render_fragment(&mut self, fragment: &str) -> RenderResult {
        for line in fragment.lines() {
            let line = line.trim();
            if line.is_empty() {
                self.append("\n");
            } else if let Some(comment) = line.strip_prefix("//") {
                self.render_line_comment(comment.trim())?;
                self.append("\n");
            }
        }
        Ok(())
    }

    fn render_line_comment(&mut self, text: &str) -> RenderResult {
        if text.is_empty() {
            self.append("//");
        } else {
            self.append("// ");
            self.append(text);
        }
        Ok(())
    }

    /// Statements of a compound statement's body.
    fn render_body(&mut self, body: &Stmt) -> RenderResult {
        match body {
            Stmt::Block(block) => self.render_block(block),
            other => self.render_statement(other),
        }
    }

    /// `{` body `}`
    fn render_braced(&mut self, body: &Stmt) -> RenderResult {
        self.append("{\n");
        self.indent();
        self.render_body(body)?;
        self.unindent();
        self.append("}");
        Ok(())
    }

    fn render_nested_block(&mut self, block: &Block) -> RenderResult {
        self.append("{\n");
        self.indent();
        self.render_block(block)?;
        self.unindent();
        self.append("}");
        Ok(())
    }

    fn render_return(&mut self, value: Option<&Expr>) -> RenderResult {
        self.append("return");
        if let Some(value) = value {
            self.append(" ");
            value.render(self)?;
        }
        Ok(())
    }

    fn render_assign(&mut self, target: &Expr, value: &Expr) -> RenderResult {
        target.render(self)?;
        self.append(" = ");
        value.render(self)
    }

    fn render_var_decl(
        &mut self,
        scope: VariableScope,
        ty: &TypeInfo,
        name: &str,
        init: Option<&Expr>,
    ) -> RenderResult;

    fn render_conditionals(&mut self, branches: &[ConditionalBlock], otherwise: Option<&Stmt>) -> RenderResult {
        for (index, branch) in branches.iter().enumerate() {
            if index > 0 {
                self.append(" else ");
            }
            self.append("if (");
            branch.cond.render(self)?;
            self.append(") ");
            self.render_braced(&branch.body)?;
        }
        if let Some(otherwise) = otherwise {
            self.append(" else ");
            self.render_braced(otherwise)?;
        }
        Ok(())
    }

    fn render_try_catch(&mut self, body: &Stmt, catch_param: &str, catch_body: &Stmt) -> RenderResult {
        self.append("try ");
        self.render_braced(body)?;
        self.append(" catch (");
        let catch_param = self.escape_identifier(catch_param).into_owned();
        self.append(&catch_param);
        self.append(") ");
        self.render_braced(catch_body)
    }

    fn render_throw(&mut self, ty: &ClassType, reason: Option<&Expr>) -> RenderResult {
        self.append("throw ");
        self.render_throwable(ty, reason)
    }

    fn render_for(&mut self, init: &Stmt, cond: &Expr, update: &Expr, body: &Stmt) -> RenderResult {
        self.append("for (");
        init.render(self)?;
        self.append("; ");
        cond.render(self)?;
        self.append("; ");
        update.render(self)?;
        self.append(") ");
        self.render_braced(body)
    }

    fn render_sequence_for(&mut self, id: &str, from: &Expr, to: &Expr, body: &Stmt) -> RenderResult;

    fn render_for_each(
        &mut self,
        element: &str,
        element_type: &TypeInfo,
        iterable: &Expr,
        body: &Stmt,
    ) -> RenderResult;

    fn render_expression_statement(&mut self, expr: &Expr) -> RenderResult {
        expr.render(self)
    }

    // ---- literals ----

    fn render_literal(&mut self, literal: &Literal) -> RenderResult {
        match literal {
            Literal::Null => self.render_null_literal(),
            Literal::String(value) => self.render_string_literal(value),
            Literal::Boolean(value) => self.render_boolean_literal(*value),
            Literal::Int(value) => self.render_int_literal(value),
            Literal::Long(value) => self.render_long_literal(value),
            Literal::Char(value) => self.render_char_literal(*value),
            Literal::Float(value) => self.render_float_literal(value),
            Literal::Double(value) => self.render_double_literal(value),
        }
        Ok(())
    }

    fn render_null_literal(&mut self) {
        self.append("null");
    }

    fn escape_string(&self, value: &str) -> String {
        escape_c_string(value)
    }

    fn render_string_literal(&mut self, value: &str) {
        let escaped = self.escape_string(value);
        self.append("\"");
        self.append(&escaped);
        self.append("\"");
    }

    fn render_boolean_literal(&mut self, value: bool) {
        self.append(if value { "true" } else { "false" });
    }

    fn render_int_literal(&mut self, value: &str) {
        self.append(value);
    }

    fn render_long_literal(&mut self, value: &str) {
        self.append(value);
    }

    fn render_char_literal(&mut self, value: char) {
        self.render_string_literal(&value.to_string());
    }

    fn render_float_literal(&mut self, value: &str) {
        self.append(value);
    }

    fn render_double_literal(&mut self, value: &str) {
        self.append(value);
    }

    /// String concatenation.
    fn render_concat(&mut self, parts: &[Expr]) -> RenderResult {
        for (index, part) in parts.iter().enumerate() {
            if index > 0 {
                self.append(" + ");
            }
            part.render(self)?;
        }
        Ok(())
    }

    /// Concatenation as an interpolated string, `open`/`close` around
    /// embedded expressions.
    fn render_template(&mut self, parts: &[Expr], open: &str, close: &str) -> RenderResult {
        self.append("\"");
        for part in parts {
            match part.as_str() {
                Some(text) => {
                    let escaped = self.escape_string(text);
                    self.append(&escaped);
                }
                None => {
                    self.append(open);
                    part.render(self)?;
                    self.append(close);
                }
            }
        }
        self.append("\"");
        Ok(())
    }

    // ---- expressions ----

    fn escape_identifier<'n>(&self, name: &'n str) -> Cow<'n, str> {
        Cow::Borrowed(name)
    }

    fn render_identifier(&mut self, name: &str, _scope: VariableScope) -> RenderResult {
        let name = self.escape_identifier(name).into_owned();
        self.append(&name);
        Ok(())
    }

    fn render_this(&mut self) -> RenderResult {
        self.append("this");
        Ok(())
    }

    fn render_parenthesized(&mut self, inner: &Expr) -> RenderResult {
        self.append("(");
        inner.render(self)?;
        self.append(")");
        Ok(())
    }

    fn binary_operator(&self, op: BinaryOp) -> &'static str {
        op.symbol()
    }

    fn render_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> RenderResult {
        lhs.render(self)?;
        let spelled = self.binary_operator(op);
        self.append(" ");
        self.append(spelled);
        self.append(" ");
        rhs.render(self)
    }

    fn render_unary(&mut self, op: UnaryOp, operand: &Expr) -> RenderResult {
        if op.is_postfix() {
            operand.render(self)?;
            self.append(op.symbol());
        } else {
            self.append(op.symbol());
            operand.render(self)?;
        }
        Ok(())
    }

    fn render_conditional_expr(&mut self, cond: &Expr, then: &Expr, otherwise: &Expr) -> RenderResult {
        cond.render(self)?;
        self.append(" ? ");
        then.render(self)?;
        self.append(" : ");
        otherwise.render(self)
    }

    fn render_field_access(&mut self, receiver: &Expr, name: &str) -> RenderResult {
        receiver.render(self)?;
        self.append(".");
        let name = self.escape_identifier(name).into_owned();
        self.append(&name);
        Ok(())
    }

    fn render_args(&mut self, args: &[Expr]) -> RenderResult {
        for (index, arg) in args.iter().enumerate() {
            if index > 0 {
                self.append(", ");
            }
            arg.render(self)?;
        }
        Ok(())
    }

    /// Spelling of a method name at a call or declaration site.
    fn method_name(&self, name: &str) -> String {
        self.escape_identifier(name).into_owned()
    }

    fn render_method_invocation(&mut self, invocation: &Invocation) -> RenderResult {
        if invocation.receiver != Expr::This {
            invocation.receiver.render(self)?;
            self.append(".");
        }
        let name = self.method_name(&invocation.site.method.name);
        self.append(&name);
        self.append("(");
        self.render_args(&invocation.site.args)?;
        self.append(")");
        Ok(())
    }

    /// Name of a class as written in the target.
    fn type_name<'t>(&self, class: &'t ClassType) -> &'t str {
        class.display_name()
    }

    fn render_new(&mut self, class: &ClassType, args: &[Expr]) -> RenderResult {
        let name = self.type_name(class).to_string();
        self.append("new ");
        self.append(&name);
        self.append("(");
        self.render_args(args)?;
        self.append(")");
        Ok(())
    }

    fn render_throwable(&mut self, ty: &ClassType, reason: Option<&Expr>) -> RenderResult {
        let args: Vec<Expr> = reason.cloned().into_iter().collect();
        self.render_new(ty, &args)
    }

    fn render_instance_of(&mut self, expr: &Expr, class: &ClassType) -> RenderResult {
        expr.render(self)?;
        self.append(" instanceof ");
        let name = self.type_name(class).to_string();
        self.append(&name);
        Ok(())
    }

    fn render_lambda(&mut self, params: &[String], types: &[TypeInfo], body: &LambdaBody) -> RenderResult;

    /// Callback over an async result. Without a dedicated spelling the split
    /// branches are re-joined into an `if`/`else` on the result accessors.
    fn render_async_handler(&mut self, handler: &AsyncHandler) -> RenderResult {
        let names = self.async_handler_params(&handler.name);
        let types = [handler.param_type.clone()];
        let accessor = |op| Expr::AsyncResultCall {
            name: handler.name.clone(),
            result_type: handler.result_type.clone(),
            op,
        };
        let branch = match (&handler.succeeded, &handler.failed) {
            (Some(succeeded), failed) => Stmt::Conditionals {
                branches: vec![ConditionalBlock {
                    cond: accessor(AsyncResultOp::Succeeded),
                    body: succeeded.clone(),
                }],
                otherwise: failed.clone().map(Box::new),
            },
            (None, Some(failed)) => Stmt::Conditionals {
                branches: vec![ConditionalBlock {
                    cond: accessor(AsyncResultOp::Failed),
                    body: failed.clone(),
                }],
                otherwise: None,
            },
            (None, None) => return self.render_lambda(&names, &types, &handler.body),
        };
        self.render_lambda(&names, &types, &LambdaBody::Block(Block::new(vec![branch])))
    }

    /// Callback parameters standing in for an async result named `name`.
    fn async_handler_params(&self, name: &str) -> Vec<String> {
        vec![name.to_string()]
    }

    fn render_async_result(&mut self, name: &str, op: AsyncResultOp) -> RenderResult {
        self.append(name);
        self.append(match op {
            AsyncResultOp::Succeeded => ".succeeded()",
            AsyncResultOp::Failed => ".failed()",
            AsyncResultOp::Cause => ".cause()",
            AsyncResultOp::Result => ".result()",
        });
        Ok(())
    }

    fn render_method_reference(&mut self, receiver: &Expr, method: &MethodSignature) -> RenderResult;

    fn render_class_ref(&mut self, class: &ClassRef) -> RenderResult {
        let name = match class {
            ClassRef::Console => "System".to_string(),
            ClassRef::Arrays => "Arrays".to_string(),
            ClassRef::JsonObject => "JsonObject".to_string(),
            ClassRef::JsonArray => "JsonArray".to_string(),
            ClassRef::Map => "HashMap".to_string(),
            ClassRef::List => "ArrayList".to_string(),
            ClassRef::Api(ty) | ClassRef::DataObject(ty) | ClassRef::Enum(ty) => {
                ty.simple_name().to_string()
            }
            ClassRef::Throwable(ty) | ClassRef::Java(ty) => self.type_name(ty).to_string(),
        };
        self.append(&name);
        Ok(())
    }

    // ---- containers ----

    fn render_json_object(&mut self, members: &im::Vector<Member>) -> RenderResult;

    fn render_json_array(&mut self, values: &im::Vector<Expr>) -> RenderResult;

    fn render_data_object(&mut self, ty: &ClassType, members: &im::Vector<Member>) -> RenderResult;

    fn render_list_literal(&mut self, values: &[Expr]) -> RenderResult;

    fn render_new_map(&mut self) -> RenderResult;

    fn render_new_list(&mut self) -> RenderResult;

    fn render_member_value(&mut self, member: &Member) -> RenderResult {
        match member {
            Member::Single { value, .. } => value.render(self),
            Member::Sequence { values, .. } => {
                let values: Vec<Expr> = values.iter().cloned().collect();
                self.render_list_literal(&values)
            }
        }
    }

    fn render_json_object_get(&mut self, object: &Expr, key: &Expr) -> RenderResult {
        object.render(self)?;
        self.append(".getValue(");
        key.render(self)?;
        self.append(")");
        Ok(())
    }

    fn render_json_object_put(&mut self, object: &Expr, key: &Expr, value: &Expr) -> RenderResult {
        object.render(self)?;
        self.append(".put(");
        key.render(self)?;
        self.append(", ");
        value.render(self)?;
        self.append(")");
        Ok(())
    }

    fn render_json_object_encode(&mut self, object: &Expr) -> RenderResult {
        object.render(self)?;
        self.append(".encode()");
        Ok(())
    }

    fn render_json_array_get(&mut self, array: &Expr, index: &Expr) -> RenderResult {
        array.render(self)?;
        self.append(".getValue(");
        index.render(self)?;
        self.append(")");
        Ok(())
    }

    fn render_json_array_add(&mut self, array: &Expr, value: &Expr) -> RenderResult {
        array.render(self)?;
        self.append(".add(");
        value.render(self)?;
        self.append(")");
        Ok(())
    }

    fn render_json_array_size(&mut self, array: &Expr) -> RenderResult {
        array.render(self)?;
        self.append(".size()");
        Ok(())
    }

    fn render_json_array_encode(&mut self, array: &Expr) -> RenderResult {
        array.render(self)?;
        self.append(".encode()");
        Ok(())
    }

    fn render_data_object_get(&mut self, object: &Expr, name: &str) -> RenderResult {
        self.render_field_access(object, name)
    }

    fn render_data_object_set(&mut self, object: &Expr, name: &str, value: &Expr) -> RenderResult {
        self.render_field_access(object, name)?;
        self.append(" = ");
        value.render(self)
    }

    fn render_map_get(&mut self, map: &Expr, key: &Expr) -> RenderResult {
        map.render(self)?;
        self.append("[");
        key.render(self)?;
        self.append("]");
        Ok(())
    }

    fn render_map_put(&mut self, map: &Expr, key: &Expr, value: &Expr) -> RenderResult {
        self.render_map_get(map, key)?;
        self.append(" = ");
        value.render(self)
    }

    fn render_map_for_each(
        &mut self,
        map: &Expr,
        key_name: &str,
        value_name: &str,
        body: &LambdaBody,
    ) -> RenderResult;

    fn render_list_get(&mut self, list: &Expr, index: &Expr) -> RenderResult {
        self.render_map_get(list, index)
    }

    fn render_list_add(&mut self, list: &Expr, value: &Expr) -> RenderResult {
        list.render(self)?;
        self.append(".add(");
        value.render(self)?;
        self.append(")");
        Ok(())
    }

    fn render_list_size(&mut self, list: &Expr) -> RenderResult {
        list.render(self)?;
        self.append(".size()");
        Ok(())
    }

    // ---- console, enums ----

    fn render_console(&mut self, stream: ConsoleStream) -> RenderResult {
        Err(unsupported_shape(format!("console stream {stream:?} used as a value")))
    }

    fn render_console_print(&mut self, stream: ConsoleStream, arg: &Expr) -> RenderResult;

    fn render_enum_constant(&mut self, ty: &ClassType, constant: &str) -> RenderResult {
        self.append(ty.simple_name());
        self.append(".");
        self.append(constant);
        Ok(())
    }

    /// Body of a lambda: an expression inline, a block on its own lines.
    fn render_lambda_body(&mut self, body: &LambdaBody) -> RenderResult {
        match body {
            LambdaBody::Expr(expr) => expr.render(self),
            LambdaBody::Block(block) => self.render_block(block),
        }
    }
}
