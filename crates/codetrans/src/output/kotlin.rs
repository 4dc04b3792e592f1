//! Kotlin script writer.
//!
//! Structured objects and arrays are built with the `json { obj(..) }` DSL.
//! The DSL block is opened once per outermost literal; `json_level` tracks
//! the nesting so inner literals reuse the enclosing block.

use super::writer::{CodeWriter, RenderResult};
use super::CodeEmitter;
use crate::input::PrimitiveKind;
use crate::ir::{BinaryOp, Block, ConsoleStream, Expr, LambdaBody, Member, MethodModel, Stmt};
use crate::scope::VariableScope;
use crate::types::{ClassKind, ClassType, MethodSignature, TypeInfo};
use std::borrow::Cow;

const RESERVED: &[&str] = &[
    "as", "class", "fun", "in", "interface", "is", "object", "typealias", "val", "var", "when",
];

/// Emits the code model as a Kotlin script.
pub struct KotlinWriter {
    emitter: CodeEmitter,
    json_level: usize,
}

impl KotlinWriter {
    pub fn new(indent: &str) -> Self {
        Self {
            emitter: CodeEmitter::new(indent),
            json_level: 0,
        }
    }

    fn json_enter(&mut self) {
        if self.json_level == 0 {
            self.append("json {\n");
            self.indent();
        }
        self.json_level += 1;
    }

    fn json_leave(&mut self) {
        self.json_level = self.json_level.saturating_sub(1);
        if self.json_level == 0 {
            self.unindent();
            self.append("\n}");
        }
    }

    /// `name(key to value, ...)`, one member per line when there are several.
    fn render_pairs(&mut self, function: &str, members: &im::Vector<Member>) -> RenderResult {
        let multiline = members.len() > 1;
        self.append(function);
        self.append("(");
        if multiline {
            self.append("\n");
        }
        self.indent();
        for (index, member) in members.iter().enumerate() {
            if index > 0 {
                self.append(",");
                if multiline {
                    self.append("\n");
                }
            }
            self.render_string_literal(member.name());
            self.append(" to ");
            self.render_member_value(member)?;
        }
        self.unindent();
        if multiline {
            self.append("\n");
        }
        self.append(")");
        Ok(())
    }

    /// Kotlin spelling of a type.
    pub fn render_type(ty: &TypeInfo) -> String {
        match ty {
            TypeInfo::Primitive(p) | TypeInfo::Boxed(p) => primitive(*p).to_string(),
            TypeInfo::String => "String".to_string(),
            TypeInfo::Void => "Unit".to_string(),
            TypeInfo::Class(class) => class_name(class).into_owned(),
            TypeInfo::Parameterized { raw, args } => {
                let args: Vec<String> = args.iter().map(Self::render_type).collect();
                format!("{}<{}>", class_name(raw), args.join(", "))
            }
            TypeInfo::Array(component) => format!("Array<{}>", Self::render_type(component)),
            TypeInfo::Variable(name) => name.clone(),
        }
    }

    fn render_block_lines(&mut self, body: &LambdaBody) -> RenderResult {
        match body {
            LambdaBody::Expr(expr) => {
                expr.render(self)?;
                self.append("\n");
            }
            LambdaBody::Block(block) => self.render_block(block)?,
        }
        Ok(())
    }
}

impl Default for KotlinWriter {
    fn default() -> Self {
        Self::new("  ")
    }
}

fn primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Boolean => "Boolean",
        PrimitiveKind::Byte => "Byte",
        PrimitiveKind::Short => "Short",
        PrimitiveKind::Int => "Int",
        PrimitiveKind::Long => "Long",
        PrimitiveKind::Char => "Char",
        PrimitiveKind::Float => "Float",
        PrimitiveKind::Double => "Double",
    }
}

fn class_name(class: &ClassType) -> Cow<'_, str> {
    match class.kind {
        ClassKind::Map => Cow::Borrowed("MutableMap"),
        ClassKind::List => Cow::Borrowed("MutableList"),
        ClassKind::Api
        | ClassKind::DataObject
        | ClassKind::Enum
        | ClassKind::JsonObject
        | ClassKind::JsonArray
        | ClassKind::AsyncResult => Cow::Borrowed(class.simple_name()),
        _ if class.name == "java.lang.Object" => Cow::Borrowed("Any"),
        _ => Cow::Borrowed(class.display_name()),
    }
}

impl CodeWriter for KotlinWriter {
    fn language(&self) -> &'static str {
        "kotlin"
    }

    fn emitter(&mut self) -> &mut CodeEmitter {
        &mut self.emitter
    }

    fn render_method(&mut self, method: &MethodModel) -> RenderResult {
        let params: Vec<String> = method
            .param_names
            .iter()
            .zip(&method.signature.params)
            .map(|(name, ty)| format!("{}: {}", self.escape_identifier(name), Self::render_type(ty)))
            .collect();
        let name = self.method_name(&method.signature.name);
        self.append(&format!("fun {name}({})", params.join(", ")));
        if method.signature.ret != TypeInfo::Void {
            self.append(": ");
            self.append(&Self::render_type(&method.signature.ret));
        }
        self.append(" {\n");
        self.indent();
        self.render_block(&method.body)?;
        self.unindent();
        self.append("}");
        Ok(())
    }

    fn render_var_decl(
        &mut self,
        _scope: VariableScope,
        ty: &TypeInfo,
        name: &str,
        init: Option<&Expr>,
    ) -> RenderResult {
        self.append("var ");
        self.render_identifier(name, VariableScope::Variable)?;
        match init {
            Some(init) => {
                self.append(" = ");
                init.render(self)
            }
            None => {
                self.append(&format!(": {}? = null", Self::render_type(ty)));
                Ok(())
            }
        }
    }

    fn render_try_catch(&mut self, body: &Stmt, catch_param: &str, catch_body: &Stmt) -> RenderResult {
        self.append("try ");
        self.render_braced(body)?;
        let catch_param = self.escape_identifier(catch_param).into_owned();
        self.append(&format!(" catch({catch_param}: Exception) "));
        self.render_braced(catch_body)
    }

    fn render_throwable(&mut self, ty: &ClassType, reason: Option<&Expr>) -> RenderResult {
        let args: Vec<Expr> = reason.cloned().into_iter().collect();
        self.render_new(ty, &args)
    }

    /// A bare `{ }` would be an uncalled lambda.
    fn render_nested_block(&mut self, block: &Block) -> RenderResult {
        self.append("run {\n");
        self.indent();
        self.render_block(block)?;
        self.unindent();
        self.append("}");
        Ok(())
    }

    /// `init`, then `while (cond)` repeating the body and the update, inside
    /// `run { }` so the loop variable stays local to the loop.
    fn render_for(&mut self, init: &Stmt, cond: &Expr, update: &Expr, body: &Stmt) -> RenderResult {
        self.append("run {\n");
        self.indent();
        init.render(self)?;
        self.append("\nwhile (");
        cond.render(self)?;
        self.append(") {\n");
        self.indent();
        self.render_body(body)?;
        update.render(self)?;
        self.append("\n");
        self.unindent();
        self.append("}\n");
        self.unindent();
        self.append("}");
        Ok(())
    }

    fn render_sequence_for(&mut self, id: &str, from: &Expr, to: &Expr, body: &Stmt) -> RenderResult {
        let id = self.escape_identifier(id).into_owned();
        self.append(&format!("for ({id} in "));
        from.render(self)?;
        self.append(" until ");
        to.render(self)?;
        self.append(") ");
        self.render_braced(body)
    }

    fn render_for_each(
        &mut self,
        element: &str,
        _element_type: &TypeInfo,
        iterable: &Expr,
        body: &Stmt,
    ) -> RenderResult {
        self.append("for (");
        self.render_identifier(element, VariableScope::Variable)?;
        self.append(" in ");
        iterable.render(self)?;
        self.append(") ");
        self.render_braced(body)
    }

    fn escape_string(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '\u{8}' => out.push_str("\\b"),
                '\u{c}' => out.push_str("\\u000C"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\r' => out.push_str("\\r"),
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '$' => out.push_str("\\$"),
                c if (c as u32) < 32 || (c as u32) > 126 => {
                    for unit in c.encode_utf16(&mut [0; 2]).iter() {
                        out.push_str(&format!("\\u{:04X}", unit));
                    }
                }
                c => out.push(c),
            }
        }
        out
    }

    fn render_long_literal(&mut self, value: &str) {
        self.append(value);
        self.append("L");
    }

    fn render_float_literal(&mut self, value: &str) {
        self.append(value);
        self.append("f");
    }

    fn render_concat(&mut self, parts: &[Expr]) -> RenderResult {
        self.render_template(parts, "${", "}")
    }

    fn escape_identifier<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if RESERVED.contains(&name) {
            Cow::Owned(format!("`{name}`"))
        } else {
            Cow::Borrowed(name)
        }
    }

    fn binary_operator(&self, op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::BitAnd => "and",
            BinaryOp::BitOr => "or",
            BinaryOp::BitXor => "xor",
            other => other.symbol(),
        }
    }

    fn render_conditional_expr(&mut self, cond: &Expr, then: &Expr, otherwise: &Expr) -> RenderResult {
        self.append("if (");
        cond.render(self)?;
        self.append(") ");
        then.render(self)?;
        self.append(" else ");
        otherwise.render(self)
    }

    fn type_name<'t>(&self, class: &'t ClassType) -> &'t str {
        match class.kind {
            ClassKind::Api | ClassKind::DataObject | ClassKind::Enum => class.simple_name(),
            _ => class.display_name(),
        }
    }

    fn render_new(&mut self, class: &ClassType, args: &[Expr]) -> RenderResult {
        let name = self.type_name(class).to_string();
        self.append(&name);
        self.append("(");
        self.render_args(args)?;
        self.append(")");
        Ok(())
    }

    fn render_instance_of(&mut self, expr: &Expr, class: &ClassType) -> RenderResult {
        expr.render(self)?;
        self.append(" is ");
        let name = self.type_name(class).to_string();
        self.append(&name);
        Ok(())
    }

    fn render_lambda(&mut self, params: &[String], _types: &[TypeInfo], body: &LambdaBody) -> RenderResult {
        self.append("{");
        if params.is_empty() {
            self.append("\n");
        } else {
            let params: Vec<String> = params
                .iter()
                .map(|p| self.escape_identifier(p).into_owned())
                .collect();
            self.append(&format!(" {} ->\n", params.join(", ")));
        }
        self.indent();
        self.render_block_lines(body)?;
        self.unindent();
        self.append("}");
        Ok(())
    }

    fn render_method_reference(&mut self, receiver: &Expr, method: &MethodSignature) -> RenderResult {
        let args: Vec<String> = match method.params.len() {
            1 => vec!["it".to_string()],
            n => (0..n).map(|i| format!("p{i}")).collect(),
        };
        self.append("{ ");
        if args.len() > 1 {
            self.append(&args.join(", "));
            self.append(" -> ");
        }
        if *receiver != Expr::This {
            receiver.render(self)?;
            self.append(".");
        }
        let name = self.method_name(&method.name);
        self.append(&format!("{name}({}) }}", args.join(", ")));
        Ok(())
    }

    fn render_json_object(&mut self, members: &im::Vector<Member>) -> RenderResult {
        self.json_enter();
        let rendered = self.render_pairs("obj", members);
        self.json_leave();
        rendered
    }

    fn render_json_array(&mut self, values: &im::Vector<Expr>) -> RenderResult {
        self.json_enter();
        self.append("array(");
        let values: Vec<Expr> = values.iter().cloned().collect();
        let rendered = self.render_args(&values);
        self.append(")");
        self.json_leave();
        rendered
    }

    fn render_data_object(&mut self, ty: &ClassType, members: &im::Vector<Member>) -> RenderResult {
        let name = self.type_name(ty).to_string();
        self.append(&name);
        if members.is_empty() {
            self.append("()");
            return Ok(());
        }
        self.append("(\n");
        self.indent();
        for (index, member) in members.iter().enumerate() {
            if index > 0 {
                self.append(",\n");
            }
            let field = self.escape_identifier(member.name()).into_owned();
            self.append(&format!("{field} = "));
            self.render_member_value(member)?;
        }
        self.unindent();
        self.append(")");
        Ok(())
    }

    fn render_list_literal(&mut self, values: &[Expr]) -> RenderResult {
        self.append("listOf(");
        self.render_args(values)?;
        self.append(")");
        Ok(())
    }

    fn render_new_map(&mut self) -> RenderResult {
        self.append("mutableMapOf<String, Any?>()");
        Ok(())
    }

    fn render_new_list(&mut self) -> RenderResult {
        self.append("mutableListOf<Any?>()");
        Ok(())
    }

    fn render_json_object_get(&mut self, object: &Expr, key: &Expr) -> RenderResult {
        object.render(self)?;
        self.append(".get<Any?>(");
        key.render(self)?;
        self.append(")");
        Ok(())
    }

    fn render_json_object_put(&mut self, object: &Expr, key: &Expr, value: &Expr) -> RenderResult {
        object.render(self)?;
        if value.is_null() {
            self.append(".putNull(");
            key.render(self)?;
        } else {
            self.append(".put(");
            key.render(self)?;
            self.append(", ");
            value.render(self)?;
        }
        self.append(")");
        Ok(())
    }

    fn render_json_object_encode(&mut self, object: &Expr) -> RenderResult {
        object.render(self)?;
        self.append(".toString()");
        Ok(())
    }

    fn render_json_array_get(&mut self, array: &Expr, index: &Expr) -> RenderResult {
        self.render_json_object_get(array, index)
    }

    fn render_json_array_add(&mut self, array: &Expr, value: &Expr) -> RenderResult {
        array.render(self)?;
        if value.is_null() {
            self.append(".addNull()");
        } else {
            self.append(".add(");
            value.render(self)?;
            self.append(")");
        }
        Ok(())
    }

    fn render_json_array_encode(&mut self, array: &Expr) -> RenderResult {
        self.render_json_object_encode(array)
    }

    fn render_map_for_each(
        &mut self,
        map: &Expr,
        key_name: &str,
        value_name: &str,
        body: &LambdaBody,
    ) -> RenderResult {
        self.append(&format!("for (({key_name}, {value_name}) in "));
        map.render(self)?;
        self.append(") {\n");
        self.indent();
        self.render_block_lines(body)?;
        self.unindent();
        self.append("}");
        Ok(())
    }

    fn render_list_size(&mut self, list: &Expr) -> RenderResult {
        list.render(self)?;
        self.append(".size");
        Ok(())
    }

    fn render_console_print(&mut self, stream: ConsoleStream, arg: &Expr) -> RenderResult {
        self.append(match stream {
            ConsoleStream::Out => "println(",
            ConsoleStream::Err => "System.err.println(",
        });
        arg.render(self)?;
        self.append(")");
        Ok(())
    }
}
