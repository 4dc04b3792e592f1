//! JavaScript writer.
//!
//! Emits `let` bindings, arrow-function callbacks and plain object/array
//! literals. Async results are spread over a `(result, result_err)` pair, the
//! callback convention of the JavaScript API shims.

use super::writer::{CodeWriter, RenderResult, unsupported_shape};
use super::CodeEmitter;
use crate::ir::{
    AsyncResultOp, BinaryOp, ConsoleStream, Expr, LambdaBody, Member, MethodModel, Stmt, UnaryOp,
};
use crate::scope::VariableScope;
use crate::types::{ClassType, MethodSignature, TypeInfo};
use std::borrow::Cow;

const RESERVED: &[&str] = &[
    "arguments", "await", "delete", "eval", "export", "function", "in", "let", "typeof", "var",
    "with", "yield",
];

/// Emits the code model as JavaScript.
pub struct JavaScriptWriter {
    emitter: CodeEmitter,
}

impl JavaScriptWriter {
    pub fn new(indent: &str) -> Self {
        Self {
            emitter: CodeEmitter::new(indent),
        }
    }

    fn error_name(name: &str) -> String {
        format!("{name}_err")
    }

    /// `.key` when the key is a plain identifier, `[key]` otherwise.
    fn render_key(&mut self, key: &Expr) -> RenderResult {
        match key.as_str() {
            Some(name) if is_identifier(name) && !RESERVED.contains(&name) => {
                self.append(".");
                self.append(name);
                Ok(())
            }
            _ => {
                self.append("[");
                key.render(self)?;
                self.append("]");
                Ok(())
            }
        }
    }

    fn render_members(&mut self, members: &im::Vector<Member>) -> RenderResult {
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
            self.append(" : ");
            self.render_member_value(member)?;
        }
        self.unindent();
        self.append("\n}");
        Ok(())
    }

    fn render_arrow_body(&mut self, body: &LambdaBody) -> RenderResult {
        match body {
            LambdaBody::Expr(expr) => expr.render(self),
            LambdaBody::Block(block) => {
                self.append("{\n");
                self.indent();
                self.render_block(block)?;
                self.unindent();
                self.append("}");
                Ok(())
            }
        }
    }
}

impl Default for JavaScriptWriter {
    fn default() -> Self {
        Self::new("  ")
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// `succeeded()`/`failed()`, which render as an `_err` comparison.
fn is_async_check(expr: &Expr) -> bool {
    matches!(
        expr.untyped(),
        Expr::AsyncResultCall {
            op: AsyncResultOp::Succeeded | AsyncResultOp::Failed,
            ..
        }
    )
}

impl CodeWriter for JavaScriptWriter {
    fn language(&self) -> &'static str {
        "javascript"
    }

    fn emitter(&mut self) -> &mut CodeEmitter {
        &mut self.emitter
    }

    fn statement_terminator(&self) -> &'static str {
        ";"
    }

    fn render_method(&mut self, method: &MethodModel) -> RenderResult {
        self.append("function ");
        let name = self.method_name(&method.signature.name);
        self.append(&name);
        self.append("(");
        let params: Vec<String> = method
            .param_names
            .iter()
            .map(|p| self.escape_identifier(p).into_owned())
            .collect();
        self.append(&params.join(", "));
        self.append(") {\n");
        self.indent();
        self.render_block(&method.body)?;
        self.unindent();
        self.append("}");
        Ok(())
    }

    fn render_var_decl(
        &mut self,
        _scope: VariableScope,
        _ty: &TypeInfo,
        name: &str,
        init: Option<&Expr>,
    ) -> RenderResult {
        self.append("let ");
        self.render_identifier(name, VariableScope::Variable)?;
        if let Some(init) = init {
            self.append(" = ");
            init.render(self)?;
        }
        Ok(())
    }

    fn render_sequence_for(&mut self, id: &str, from: &Expr, to: &Expr, body: &Stmt) -> RenderResult {
        let id = self.escape_identifier(id).into_owned();
        self.append(&format!("for (let {id} = "));
        from.render(self)?;
        self.append(&format!("; {id} < "));
        to.render(self)?;
        self.append(&format!("; {id}++) "));
        self.render_braced(body)
    }

    fn render_for_each(
        &mut self,
        element: &str,
        _element_type: &TypeInfo,
        iterable: &Expr,
        body: &Stmt,
    ) -> RenderResult {
        self.append("for (let ");
        self.render_identifier(element, VariableScope::Variable)?;
        self.append(" of ");
        iterable.render(self)?;
        self.append(") ");
        self.render_braced(body)
    }

    fn escape_identifier<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if RESERVED.contains(&name) {
            Cow::Owned(format!("{name}_"))
        } else {
            Cow::Borrowed(name)
        }
    }

    fn binary_operator(&self, op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::Eq => "===",
            BinaryOp::Ne => "!==",
            other => other.symbol(),
        }
    }

    /// Prefix operators bind tighter than the `==` an async check expands to.
    fn render_unary(&mut self, op: UnaryOp, operand: &Expr) -> RenderResult {
        if op.is_postfix() {
            operand.render(self)?;
            self.append(op.symbol());
            return Ok(());
        }
        self.append(op.symbol());
        if is_async_check(operand) {
            self.render_parenthesized(operand)
        } else {
            operand.render(self)
        }
    }

    fn render_throwable(&mut self, _ty: &ClassType, reason: Option<&Expr>) -> RenderResult {
        self.append("new Error(");
        if let Some(reason) = reason {
            reason.render(self)?;
        }
        self.append(")");
        Ok(())
    }

    fn render_lambda(&mut self, params: &[String], _types: &[TypeInfo], body: &LambdaBody) -> RenderResult {
        let params: Vec<String> = params
            .iter()
            .map(|p| self.escape_identifier(p).into_owned())
            .collect();
        self.append("(");
        self.append(&params.join(", "));
        self.append(") => ");
        self.render_arrow_body(body)
    }

    fn async_handler_params(&self, name: &str) -> Vec<String> {
        vec![name.to_string(), Self::error_name(name)]
    }

    fn render_async_result(&mut self, name: &str, op: AsyncResultOp) -> RenderResult {
        let error = Self::error_name(name);
        match op {
            AsyncResultOp::Succeeded => self.append(&format!("{error} == null")),
            AsyncResultOp::Failed => self.append(&format!("{error} != null")),
            AsyncResultOp::Cause => self.append(&error),
            AsyncResultOp::Result => self.append(name),
        }
        Ok(())
    }

    fn render_method_reference(&mut self, receiver: &Expr, method: &MethodSignature) -> RenderResult {
        let params: Vec<String> = match method.params.len() {
            1 => vec!["it".to_string()],
            n => (0..n).map(|i| format!("p{i}")).collect(),
        };
        self.append("(");
        self.append(&params.join(", "));
        self.append(") => ");
        if *receiver != Expr::This {
            receiver.render(self)?;
            self.append(".");
        }
        let name = self.method_name(&method.name);
        self.append(&name);
        self.append("(");
        self.append(&params.join(", "));
        self.append(")");
        Ok(())
    }

    fn render_json_object(&mut self, members: &im::Vector<Member>) -> RenderResult {
        self.render_members(members)
    }

    fn render_json_array(&mut self, values: &im::Vector<Expr>) -> RenderResult {
        let values: Vec<Expr> = values.iter().cloned().collect();
        self.render_list_literal(&values)
    }

    fn render_data_object(&mut self, _ty: &ClassType, members: &im::Vector<Member>) -> RenderResult {
        self.render_members(members)
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
        object.render(self)?;
        self.render_key(key)
    }

    fn render_json_object_put(&mut self, object: &Expr, key: &Expr, value: &Expr) -> RenderResult {
        object.render(self)?;
        self.render_key(key)?;
        self.append(" = ");
        value.render(self)
    }

    fn render_json_object_encode(&mut self, object: &Expr) -> RenderResult {
        self.append("JSON.stringify(");
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

    fn render_map_for_each(
        &mut self,
        map: &Expr,
        key_name: &str,
        value_name: &str,
        body: &LambdaBody,
    ) -> RenderResult {
        self.append("Object.entries(");
        map.render(self)?;
        let key = self.escape_identifier(key_name).into_owned();
        let value = self.escape_identifier(value_name).into_owned();
        self.append(&format!(").forEach(([{key}, {value}]) => "));
        self.render_arrow_body(body)?;
        self.append(")");
        Ok(())
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
            ConsoleStream::Out => "console.log(",
            ConsoleStream::Err => "console.error(",
        });
        arg.render(self)?;
        self.append(")");
        Ok(())
    }

    fn render_enum_constant(&mut self, _ty: &ClassType, constant: &str) -> RenderResult {
        self.render_string_literal(constant);
        Ok(())
    }

    fn render_instance_of(&mut self, expr: &Expr, class: &ClassType) -> RenderResult {
        if class.kind == crate::types::ClassKind::Enum {
            return Err(unsupported_shape(format!("instanceof enum `{}`", class.name)));
        }
        expr.render(self)?;
        self.append(" instanceof ");
        self.append(class.simple_name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Block, ConditionalBlock, Literal, UnitModel};
    use crate::types::ClassKind;

    fn emit(stmts: Vec<Stmt>) -> String {
        let mut writer = JavaScriptWriter::default();
        writer.render_block(&Block::new(stmts)).unwrap();
        writer.take_output()
    }

    fn var(name: &str) -> Expr {
        Expr::identifier(name, VariableScope::Variable)
    }

    #[test]
    fn declarations_end_with_semicolons() {
        let output = emit(vec![Stmt::VarDecl {
            scope: VariableScope::Variable,
            ty: TypeInfo::String,
            name: "name".to_string(),
            init: Some(Expr::string("vert.x")),
        }]);
        assert_eq!(output, "let name = \"vert.x\";\n");
    }

    #[test]
    fn equality_is_strict() {
        let output = emit(vec![Stmt::Conditionals {
            branches: vec![ConditionalBlock {
                cond: Expr::Binary {
                    op: BinaryOp::Eq,
                    lhs: Box::new(var("a")),
                    rhs: Box::new(Expr::null()),
                },
                body: Stmt::Return(None),
            }],
            otherwise: None,
        }]);
        assert_eq!(output, "if (a === null) {\n  return;\n}\n");
    }

    #[test]
    fn object_literal_quotes_keys() {
        let members = im::vector![
            Member::Single {
                name: "port".to_string(),
                value: Expr::Literal(Literal::Int("8080".to_string())),
            },
            Member::Sequence {
                name: "hosts".to_string(),
                values: im::vector![Expr::string("a")],
            },
        ];
        let output = emit(vec![Stmt::Expr(Expr::JsonObjectLiteral(members))]);
        assert_eq!(output, "{\n  \"port\" : 8080,\n  \"hosts\" : [\"a\"]\n};\n");
    }

    #[test]
    fn reserved_words_are_suffixed() {
        let output = emit(vec![Stmt::Assign {
            target: var("function"),
            value: var("x"),
        }]);
        assert_eq!(output, "function_ = x;\n");
    }

    #[test]
    fn units_put_functions_before_the_entry_body() {
        let unit = UnitModel {
            name: "demo.Main".to_string(),
            fields: Vec::new(),
            methods: vec![MethodModel {
                signature: MethodSignature::new("greet", vec![TypeInfo::String], false, TypeInfo::Void),
                param_names: vec!["who".to_string()],
                body: Block::new(vec![Stmt::Expr(Expr::ConsolePrint {
                    stream: ConsoleStream::Out,
                    arg: Box::new(Expr::identifier("who", VariableScope::Parameter)),
                })]),
            }],
            entry: Block::new(vec![Stmt::Expr(Expr::Invocation(Box::new(crate::ir::Invocation {
                receiver: Expr::This,
                site: crate::ir::CallSite {
                    receiver_type: TypeInfo::class_named("demo.Main", ClassKind::Other),
                    method: MethodSignature::new("greet", vec![TypeInfo::String], false, TypeInfo::Void),
                    return_type: TypeInfo::Void,
                    args: vec![Expr::string("you")],
                    arg_types: vec![Some(TypeInfo::String)],
                },
            })))]),
        };
        let mut writer = JavaScriptWriter::default();
        writer.render_unit(&unit).unwrap();
        assert_eq!(
            writer.take_output(),
            "function greet(who) {\n  console.log(who);\n}\n\ngreet(\"you\");\n"
        );
    }

    #[test]
    fn negated_async_checks_keep_their_comparison_together() {
        let check = |op| Expr::AsyncResultCall {
            name: "ar".to_string(),
            result_type: TypeInfo::String,
            op,
        };
        let output = emit(vec![
            Stmt::Expr(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(check(AsyncResultOp::Succeeded)),
            }),
            Stmt::Expr(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(check(AsyncResultOp::Result)),
            }),
        ]);
        assert_eq!(output, "!(ar_err == null);
!ar;
");
    }
}
