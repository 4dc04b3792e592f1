//! Groovy writer.
//!
//! Scripts use `def` bindings, closures and map/list literals; structured
//! objects and data objects both become maps.

use super::writer::{CodeWriter, RenderResult, escape_c_string};
use super::CodeEmitter;
use crate::ir::{Block, ConsoleStream, Expr, LambdaBody, Member, MethodModel, Stmt};
use crate::scope::VariableScope;
use crate::types::{ClassType, MethodSignature, TypeInfo};
use std::borrow::Cow;

/// Groovy keywords and contextual names that are valid Java identifiers.
const RESERVED: &[&str] = &["as", "def", "in", "it", "trait", "var"];

/// Emits the code model as a Groovy script.
pub struct GroovyWriter {
    emitter: CodeEmitter,
}

impl GroovyWriter {
    pub fn new(indent: &str) -> Self {
        Self {
            emitter: CodeEmitter::new(indent),
        }
    }

    fn render_map(&mut self, members: &im::Vector<Member>) -> RenderResult {
        if members.is_empty() {
            self.append("[:]");
            return Ok(());
        }
        self.append("[\n");
        self.indent();
        for (index, member) in members.iter().enumerate() {
            if index > 0 {
                self.append(",\n");
            }
            self.render_string_literal(member.name());
            self.append(":");
            self.render_member_value(member)?;
        }
        self.unindent();
        self.append("\n]");
        Ok(())
    }

    fn render_closure(&mut self, params: &[String], body: &LambdaBody) -> RenderResult {
        let params: Vec<String> = params
            .iter()
            .map(|p| self.escape_identifier(p).into_owned())
            .collect();
        self.append("{");
        if !params.is_empty() {
            self.append(" ");
            self.append(&params.join(", "));
            self.append(" ->");
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
}

impl Default for GroovyWriter {
    fn default() -> Self {
        Self::new("  ")
    }
}

impl CodeWriter for GroovyWriter {
    fn language(&self) -> &'static str {
        "groovy"
    }

    fn emitter(&mut self) -> &mut CodeEmitter {
        &mut self.emitter
    }

    fn render_method(&mut self, method: &MethodModel) -> RenderResult {
        let name = self.method_name(&method.signature.name);
        let params: Vec<String> = method
            .param_names
            .iter()
            .map(|p| self.escape_identifier(p).into_owned())
            .collect();
        self.append(&format!("def {name}({}) {{\n", params.join(", ")));
        self.indent();
        self.render_block(&method.body)?;
        self.unindent();
        self.append("}");
        Ok(())
    }

    /// Script fields live in the binding so helper methods can see them.
    fn render_var_decl(
        &mut self,
        scope: VariableScope,
        _ty: &TypeInfo,
        name: &str,
        init: Option<&Expr>,
    ) -> RenderResult {
        if scope != VariableScope::Field {
            self.append("def ");
        }
        self.render_identifier(name, scope)?;
        match init {
            Some(init) => {
                self.append(" = ");
                init.render(self)
            }
            None if scope == VariableScope::Field => {
                self.append(" = null");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// A bare `{ }` would parse as a closure.
    fn render_nested_block(&mut self, block: &Block) -> RenderResult {
        self.append("if (true) {\n");
        self.indent();
        self.render_block(block)?;
        self.unindent();
        self.append("}");
        Ok(())
    }

    fn render_sequence_for(&mut self, id: &str, from: &Expr, to: &Expr, body: &Stmt) -> RenderResult {
        let id = self.escape_identifier(id).into_owned();
        self.append(&format!("for ({id} in "));
        from.render(self)?;
        self.append("..<");
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
        let element = self.escape_identifier(element).into_owned();
        self.append(&format!("for ({element} in "));
        iterable.render(self)?;
        self.append(") ");
        self.render_braced(body)
    }

    fn escape_string(&self, value: &str) -> String {
        escape_c_string(value).replace('$', "\\$")
    }

    fn escape_identifier<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if RESERVED.contains(&name) {
            Cow::Owned(format!("{name}_"))
        } else {
            Cow::Borrowed(name)
        }
    }

    fn render_long_literal(&mut self, value: &str) {
        self.append(value);
        self.append("L");
    }

    fn render_float_literal(&mut self, value: &str) {
        self.append(value);
        self.append("f");
    }

    fn render_double_literal(&mut self, value: &str) {
        self.append(value);
        self.append("d");
    }

    fn render_concat(&mut self, parts: &[Expr]) -> RenderResult {
        self.render_template(parts, "${", "}")
    }

    fn render_lambda(&mut self, params: &[String], _types: &[TypeInfo], body: &LambdaBody) -> RenderResult {
        self.render_closure(params, body)
    }

    fn render_method_reference(&mut self, receiver: &Expr, method: &MethodSignature) -> RenderResult {
        receiver.render(self)?;
        self.append(".&");
        let name = self.method_name(&method.name);
        self.append(&name);
        Ok(())
    }

    fn render_json_object(&mut self, members: &im::Vector<Member>) -> RenderResult {
        self.render_map(members)
    }

    fn render_json_array(&mut self, values: &im::Vector<Expr>) -> RenderResult {
        let values: Vec<Expr> = values.iter().cloned().collect();
        self.render_list_literal(&values)
    }

    fn render_data_object(&mut self, _ty: &ClassType, members: &im::Vector<Member>) -> RenderResult {
        self.render_map(members)
    }

    fn render_list_literal(&mut self, values: &[Expr]) -> RenderResult {
        self.append("[");
        self.render_args(values)?;
        self.append("]");
        Ok(())
    }

    fn render_new_map(&mut self) -> RenderResult {
        self.append("[:]");
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
        self.append("groovy.json.JsonOutput.toJson(");
        object.render(self)?;
        self.append(")");
        Ok(())
    }

    fn render_json_array_get(&mut self, array: &Expr, index: &Expr) -> RenderResult {
        self.render_map_get(array, index)
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
        map.render(self)?;
        self.append(".each ");
        self.render_closure(&[key_name.to_string(), value_name.to_string()], body)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Literal;

    fn emit(stmts: Vec<Stmt>) -> String {
        let mut writer = GroovyWriter::default();
        writer.render_block(&Block::new(stmts)).unwrap();
        writer.take_output()
    }

    #[test]
    fn concatenation_becomes_a_gstring() {
        let output = emit(vec![Stmt::Expr(Expr::ConsolePrint {
            stream: ConsoleStream::Out,
            arg: Box::new(Expr::Concat(vec![
                Expr::string("cost: $"),
                Expr::identifier("price", VariableScope::Variable),
            ])),
        })]);
        assert_eq!(output, "println(\"cost: \\$${price}\")\n");
    }

    #[test]
    fn fields_are_binding_variables() {
        let mut writer = GroovyWriter::default();
        writer
            .render_var_decl(
                VariableScope::Field,
                &TypeInfo::Primitive(crate::input::PrimitiveKind::Int),
                "count",
                None,
            )
            .unwrap();
        assert_eq!(writer.take_output(), "count = null");
    }

    #[test]
    fn ranges_and_literal_suffixes() {
        let output = emit(vec![Stmt::SequenceFor {
            id: "i".to_string(),
            from: Expr::Literal(Literal::Int("0".to_string())),
            to: Expr::Literal(Literal::Long("10".to_string())),
            body: Box::new(Stmt::Block(Block::default())),
        }]);
        assert_eq!(output, "for (i in 0..<10L) {\n}\n");
    }

    #[test]
    fn empty_containers() {
        let output = emit(vec![
            Stmt::Expr(Expr::NewMap),
            Stmt::Expr(Expr::JsonObjectLiteral(im::Vector::new())),
            Stmt::Expr(Expr::NewList),
        ]);
        assert_eq!(output, "[:]\n[:]\n[]\n");
    }

    #[test]
    fn nested_blocks_are_not_closures() {
        let output = emit(vec![Stmt::Block(Block::new(vec![Stmt::Expr(Expr::identifier(
            "x",
            VariableScope::Variable,
        ))]))]);
        assert_eq!(output, "if (true) {\n  x\n}\n");
    }

    #[test]
    fn keywords_are_suffixed_at_binding_sites() {
        let output = emit(vec![
            Stmt::VarDecl {
                scope: VariableScope::Variable,
                ty: TypeInfo::Primitive(crate::input::PrimitiveKind::Int),
                name: "in".to_string(),
                init: Some(Expr::Literal(Literal::Int("2".to_string()))),
            },
            Stmt::SequenceFor {
                id: "as".to_string(),
                from: Expr::Literal(Literal::Int("0".to_string())),
                to: Expr::Literal(Literal::Int("3".to_string())),
                body: Box::new(Stmt::Block(Block::default())),
            },
        ]);
        assert_eq!(output, "def in_ = 2\nfor (as_ in 0..<3) {\n}\n");
    }
}
