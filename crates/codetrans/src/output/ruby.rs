//! Ruby writer.
//!
//! Blocks close with `end`, methods are snake_cased, fields map to instance
//! variables and globals to `$` variables. Ruby has no increment operators:
//! `x++` is accepted as a statement (`x += 1`) and rejected anywhere else.

use super::writer::{CodeWriter, RenderResult, escape_c_string, snake_case, unsupported_shape};
use super::CodeEmitter;
use crate::ir::{
    AsyncResultOp, Block, ConditionalBlock, ConsoleStream, Expr, LambdaBody, Literal, Member,
    MethodModel, Stmt, UnaryOp,
};
use crate::scope::VariableScope;
use crate::types::{ClassType, MethodSignature, TypeInfo};
use std::borrow::Cow;

const RESERVED: &[&str] = &[
    "BEGIN", "END", "alias", "and", "begin", "break", "case", "class", "def", "defined?", "do",
    "else", "elsif", "end", "ensure", "false", "for", "if", "in", "module", "next", "nil", "not",
    "or", "redo", "rescue", "retry", "return", "self", "super", "then", "true", "undef", "unless",
    "until", "when", "while", "yield",
];

/// Emits the code model as Ruby.
pub struct RubyWriter {
    emitter: CodeEmitter,
}

impl RubyWriter {
    pub fn new(indent: &str) -> Self {
        Self {
            emitter: CodeEmitter::new(indent),
        }
    }

    /// Statements of `body` one level deeper, no delimiters.
    fn render_indented(&mut self, body: &Stmt) -> RenderResult {
        self.indent();
        self.render_body(body)?;
        self.unindent();
        Ok(())
    }

    fn render_step(&mut self, op: UnaryOp, operand: &Expr) -> RenderResult {
        operand.render(self)?;
        match op {
            UnaryOp::PostIncrement | UnaryOp::PreIncrement => self.append(" += 1"),
            _ => self.append(" -= 1"),
        }
        Ok(())
    }

    fn render_hash(&mut self, members: &im::Vector<Member>) -> RenderResult {
        if members.is_empty() {
            self.append("{}");
            return Ok(());
        }
        self.append("{\n");
        self.indent();
        for (index, member) in members.iter().enumerate() {
            if index > 0 {
                self.append(",\n");
            }
            self.render_string_literal(member.name());
            self.append(" => ");
            self.render_member_value(member)?;
        }
        self.unindent();
        self.append("\n}");
        Ok(())
    }

    /// `do |params|` ... `end` over a lambda body.
    /// Block or method parameters, escaped and comma separated.
    fn param_list(&self, params: &[String]) -> String {
        params
            .iter()
            .map(|p| self.escape_identifier(p).into_owned())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_do_block(&mut self, params: &[String], body: &LambdaBody) -> RenderResult {
        self.append(&format!(" do |{}|\n", self.param_list(params)));
        self.indent();
        match body {
            LambdaBody::Expr(expr) => {
                self.render_expression_statement(expr)?;
                self.append("\n");
            }
            LambdaBody::Block(block) => self.render_block(block)?,
        }
        self.unindent();
        self.append("end");
        Ok(())
    }
}

impl Default for RubyWriter {
    fn default() -> Self {
        Self::new("  ")
    }
}

impl CodeWriter for RubyWriter {
    fn language(&self) -> &'static str {
        "ruby"
    }

    fn emitter(&mut self) -> &mut CodeEmitter {
        &mut self.emitter
    }

    fn render_method(&mut self, method: &MethodModel) -> RenderResult {
        let name = self.method_name(&method.signature.name);
        self.append(&format!("def {name}({})\n", self.param_list(&method.param_names)));
        self.indent();
        self.render_block(&method.body)?;
        self.unindent();
        self.append("end");
        Ok(())
    }

    fn render_line_comment(&mut self, text: &str) -> RenderResult {
        if text.is_empty() {
            self.append("#");
        } else {
            self.append("# ");
            self.append(text);
        }
        Ok(())
    }

    fn render_nested_block(&mut self, block: &Block) -> RenderResult {
        self.append("begin\n");
        self.indent();
        self.render_block(block)?;
        self.unindent();
        self.append("end");
        Ok(())
    }

    fn render_var_decl(
        &mut self,
        scope: VariableScope,
        _ty: &TypeInfo,
        name: &str,
        init: Option<&Expr>,
    ) -> RenderResult {
        self.render_identifier(name, scope)?;
        self.append(" = ");
        match init {
            Some(init) => init.render(self),
            None => {
                self.render_null_literal();
                Ok(())
            }
        }
    }

    fn render_conditionals(&mut self, branches: &[ConditionalBlock], otherwise: Option<&Stmt>) -> RenderResult {
        for (index, branch) in branches.iter().enumerate() {
            self.append(if index == 0 { "if " } else { "elsif " });
            branch.cond.render(self)?;
            self.append("\n");
            self.render_indented(&branch.body)?;
        }
        if let Some(otherwise) = otherwise {
            self.append("else\n");
            self.render_indented(otherwise)?;
        }
        self.append("end");
        Ok(())
    }

    fn render_try_catch(&mut self, body: &Stmt, catch_param: &str, catch_body: &Stmt) -> RenderResult {
        self.append("begin\n");
        self.render_indented(body)?;
        let catch_param = self.escape_identifier(catch_param).into_owned();
        self.append(&format!("rescue => {catch_param}\n"));
        self.render_indented(catch_body)?;
        self.append("end");
        Ok(())
    }

    fn render_throw(&mut self, _ty: &ClassType, reason: Option<&Expr>) -> RenderResult {
        self.append("raise");
        if let Some(reason) = reason {
            self.append(" ");
            reason.render(self)?;
        }
        Ok(())
    }

    /// `init`, then `while cond` repeating the body and the update.
    fn render_for(&mut self, init: &Stmt, cond: &Expr, update: &Expr, body: &Stmt) -> RenderResult {
        init.render(self)?;
        self.append("\nwhile ");
        cond.render(self)?;
        self.append("\n");
        self.indent();
        self.render_body(body)?;
        self.render_expression_statement(update)?;
        self.append("\n");
        self.unindent();
        self.append("end");
        Ok(())
    }

    fn render_sequence_for(&mut self, id: &str, from: &Expr, to: &Expr, body: &Stmt) -> RenderResult {
        self.append("(");
        from.render(self)?;
        self.append("...");
        to.render(self)?;
        let id = self.escape_identifier(id).into_owned();
        self.append(&format!(").each do |{id}|\n"));
        self.render_indented(body)?;
        self.append("end");
        Ok(())
    }

    fn render_for_each(
        &mut self,
        element: &str,
        _element_type: &TypeInfo,
        iterable: &Expr,
        body: &Stmt,
    ) -> RenderResult {
        iterable.render(self)?;
        let element = self.escape_identifier(element).into_owned();
        self.append(&format!(".each do |{element}|\n"));
        self.render_indented(body)?;
        self.append("end");
        Ok(())
    }

    fn render_expression_statement(&mut self, expr: &Expr) -> RenderResult {
        match expr {
            Expr::Unary { op, operand } if op.is_step() => self.render_step(*op, operand),
            other => other.render(self),
        }
    }

    fn render_null_literal(&mut self) {
        self.append("nil");
    }

    fn escape_string(&self, value: &str) -> String {
        escape_c_string(value).replace('#', "\\#")
    }

    fn render_concat(&mut self, parts: &[Expr]) -> RenderResult {
        self.render_template(parts, "#{", "}")
    }

    fn escape_identifier<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if RESERVED.contains(&name) {
            Cow::Owned(format!("{name}_"))
        } else {
            Cow::Borrowed(name)
        }
    }

    fn render_identifier(&mut self, name: &str, scope: VariableScope) -> RenderResult {
        let name = self.escape_identifier(name).into_owned();
        match scope {
            VariableScope::Field => self.append("@"),
            VariableScope::Global => self.append("$"),
            VariableScope::Variable | VariableScope::Parameter => {}
        }
        self.append(&name);
        Ok(())
    }

    fn render_this(&mut self) -> RenderResult {
        self.append("self");
        Ok(())
    }

    fn render_unary(&mut self, op: UnaryOp, operand: &Expr) -> RenderResult {
        if op.is_step() {
            return Err(unsupported_shape(format!(
                "`{}` inside an expression",
                op.symbol()
            )));
        }
        self.append(op.symbol());
        operand.render(self)
    }

    fn method_name(&self, name: &str) -> String {
        let name = snake_case(name);
        self.escape_identifier(&name).into_owned()
    }

    fn render_new(&mut self, class: &ClassType, args: &[Expr]) -> RenderResult {
        self.append(class.simple_name());
        self.append(".new(");
        self.render_args(args)?;
        self.append(")");
        Ok(())
    }

    fn render_instance_of(&mut self, expr: &Expr, class: &ClassType) -> RenderResult {
        expr.render(self)?;
        self.append(".is_a?(");
        self.append(class.simple_name());
        self.append(")");
        Ok(())
    }

    fn render_lambda(&mut self, params: &[String], _types: &[TypeInfo], body: &LambdaBody) -> RenderResult {
        self.append("lambda {");
        if !params.is_empty() {
            self.append(&format!(" |{}|", self.param_list(params)));
        }
        match body {
            LambdaBody::Expr(expr) => {
                self.append(" ");
                expr.render(self)?;
                self.append(" }");
            }
            LambdaBody::Block(block) => {
                self.append("\n");
                self.indent();
                self.render_block(block)?;
                self.unindent();
                self.append("}");
            }
        }
        Ok(())
    }

    fn render_async_result(&mut self, name: &str, op: AsyncResultOp) -> RenderResult {
        self.append(name);
        self.append(match op {
            AsyncResultOp::Succeeded => ".succeeded?",
            AsyncResultOp::Failed => ".failed?",
            AsyncResultOp::Cause => ".cause",
            AsyncResultOp::Result => ".result",
        });
        Ok(())
    }

    fn render_method_reference(&mut self, receiver: &Expr, method: &MethodSignature) -> RenderResult {
        if *receiver != Expr::This {
            receiver.render(self)?;
            self.append(".");
        }
        let name = self.method_name(&method.name);
        self.append(&format!("method(:{name})"));
        Ok(())
    }

    fn render_json_object(&mut self, members: &im::Vector<Member>) -> RenderResult {
        self.render_hash(members)
    }

    fn render_json_array(&mut self, values: &im::Vector<Expr>) -> RenderResult {
        let values: Vec<Expr> = values.iter().cloned().collect();
        self.render_list_literal(&values)
    }

    fn render_data_object(&mut self, _ty: &ClassType, members: &im::Vector<Member>) -> RenderResult {
        self.render_hash(members)
    }

    fn render_list_literal(&mut self, values: &[Expr]) -> RenderResult {
        self.append("[");
        self.render_args(values)?;
        self.append("]");
        Ok(())
    }

    fn render_new_map(&mut self) -> RenderResult {
        self.append("{}");
        Ok(())
    }

    fn render_new_list(&mut self) -> RenderResult {
        self.append("[]");
        Ok(())
    }

    fn render_json_object_get(&mut self, object: &Expr, key: &Expr) -> RenderResult {
        self.render_map_get(object, key)
    }

    fn render_json_object_put(&mut self, object: &Expr, key: &Expr, value: &Expr) -> RenderResult {
        self.render_map_put(object, key, value)
    }

    fn render_json_object_encode(&mut self, object: &Expr) -> RenderResult {
        self.append("JSON.generate(");
        object.render(self)?;
        self.append(")");
        Ok(())
    }

    fn render_json_array_get(&mut self, array: &Expr, index: &Expr) -> RenderResult {
        self.render_map_get(array, index)
    }

    fn render_json_array_add(&mut self, array: &Expr, value: &Expr) -> RenderResult {
        self.render_list_add(array, value)
    }

    fn render_json_array_size(&mut self, array: &Expr) -> RenderResult {
        self.render_list_size(array)
    }

    fn render_json_array_encode(&mut self, array: &Expr) -> RenderResult {
        self.render_json_object_encode(array)
    }

    /// Data objects are hashes keyed by property name.
    fn render_data_object_get(&mut self, object: &Expr, name: &str) -> RenderResult {
        self.render_map_get(object, &Expr::Literal(Literal::String(name.to_string())))
    }

    fn render_data_object_set(&mut self, object: &Expr, name: &str, value: &Expr) -> RenderResult {
        self.render_map_put(object, &Expr::string(name), value)
    }

    fn render_map_for_each(
        &mut self,
        map: &Expr,
        key_name: &str,
        value_name: &str,
        body: &LambdaBody,
    ) -> RenderResult {
        map.render(self)?;
        self.append(".each_pair");
        self.render_do_block(&[key_name.to_string(), value_name.to_string()], body)
    }

    fn render_list_add(&mut self, list: &Expr, value: &Expr) -> RenderResult {
        list.render(self)?;
        self.append(".push(");
        value.render(self)?;
        self.append(")");
        Ok(())
    }

    fn render_list_size(&mut self, list: &Expr) -> RenderResult {
        list.render(self)?;
        self.append(".length");
        Ok(())
    }

    fn render_console_print(&mut self, stream: ConsoleStream, arg: &Expr) -> RenderResult {
        self.append(match stream {
            ConsoleStream::Out => "puts ",
            ConsoleStream::Err => "STDERR.puts ",
        });
        arg.render(self)
    }

    fn render_enum_constant(&mut self, _ty: &ClassType, constant: &str) -> RenderResult {
        self.append(":");
        self.append(constant);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::BinaryOp;

    fn emit(stmts: Vec<Stmt>) -> Result<String, crate::TranslateError> {
        let mut writer = RubyWriter::default();
        writer.render_block(&Block::new(stmts))?;
        Ok(writer.take_output())
    }

    fn var(name: &str) -> Expr {
        Expr::identifier(name, VariableScope::Variable)
    }

    fn int(value: &str) -> Expr {
        Expr::Literal(Literal::Int(value.to_string()))
    }

    #[test]
    fn increments_are_statements_only() {
        let step = Expr::Unary {
            op: UnaryOp::PostIncrement,
            operand: Box::new(var("i")),
        };
        assert_eq!(emit(vec![Stmt::Expr(step.clone())]).unwrap(), "i += 1\n");
        let err = emit(vec![Stmt::Assign {
            target: var("j"),
            value: step,
        }])
        .unwrap_err();
        assert_eq!(err.construct(), crate::Construct::Render);
    }

    #[test]
    fn elsif_chain() {
        let branch = |cond: Expr, value: &str| ConditionalBlock {
            cond,
            body: Stmt::Expr(Expr::ConsolePrint {
                stream: ConsoleStream::Out,
                arg: Box::new(Expr::string(value)),
            }),
        };
        let output = emit(vec![Stmt::Conditionals {
            branches: vec![
                branch(Expr::Binary { op: BinaryOp::Gt, lhs: Box::new(var("n")), rhs: Box::new(int("0")) }, "pos"),
                branch(Expr::Binary { op: BinaryOp::Lt, lhs: Box::new(var("n")), rhs: Box::new(int("0")) }, "neg"),
            ],
            otherwise: Some(Box::new(Stmt::Expr(Expr::ConsolePrint {
                stream: ConsoleStream::Err,
                arg: Box::new(Expr::string("zero")),
            }))),
        }])
        .unwrap();
        assert_eq!(
            output,
            "if n > 0\n  puts \"pos\"\nelsif n < 0\n  puts \"neg\"\nelse\n  STDERR.puts \"zero\"\nend\n"
        );
    }

    #[test]
    fn generic_for_becomes_while() {
        let output = emit(vec![Stmt::For {
            init: Box::new(Stmt::VarDecl {
                scope: VariableScope::Variable,
                ty: TypeInfo::Primitive(crate::input::PrimitiveKind::Int),
                name: "i".to_string(),
                init: Some(int("10")),
            }),
            cond: Expr::Binary { op: BinaryOp::Gt, lhs: Box::new(var("i")), rhs: Box::new(int("0")) },
            update: Expr::Unary { op: UnaryOp::PostDecrement, operand: Box::new(var("i")) },
            body: Box::new(Stmt::Block(Block::new(vec![Stmt::Expr(Expr::ConsolePrint {
                stream: ConsoleStream::Out,
                arg: Box::new(var("i")),
            })]))),
        }])
        .unwrap();
        assert_eq!(output, "i = 10\nwhile i > 0\n  puts i\n  i -= 1\nend\n");
    }

    #[test]
    fn scopes_pick_sigils() {
        let output = emit(vec![Stmt::Assign {
            target: Expr::identifier("count", VariableScope::Field),
            value: Expr::identifier("vertx", VariableScope::Global),
        }])
        .unwrap();
        assert_eq!(output, "@count = $vertx\n");
    }

    #[test]
    fn interpolation_escapes_hashes() {
        let output = emit(vec![Stmt::Expr(Expr::Concat(vec![
            Expr::string("#"),
            var("n"),
        ]))])
        .unwrap();
        assert_eq!(output, "\"\\##{n}\"\n");
    }

    #[test]
    fn keywords_are_suffixed_at_binding_sites() {
        let output = emit(vec![
            Stmt::VarDecl {
                scope: VariableScope::Variable,
                ty: TypeInfo::String,
                name: "in".to_string(),
                init: Some(Expr::string("a")),
            },
            Stmt::ForEach {
                element: "end".to_string(),
                element_type: TypeInfo::String,
                iterable: var("names"),
                body: Box::new(Stmt::Expr(var("end"))),
            },
        ])
        .unwrap();
        assert_eq!(output, "in_ = \"a\"\nnames.each do |end_|\n  end_\nend\n");
    }
}
