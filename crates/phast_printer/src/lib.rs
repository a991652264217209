//! phast_printer: Bound tree to JavaScript text.
//!
//! Prints a lowered [`BoundFile`] as an ES module. The output starts with one
//! import of every runtime built-in the file references, followed by a `let`
//! for the file's variables and then the statements. A node kind the
//! lowering pass should have removed is an [`InternalError`], not output.

use indexmap::IndexSet;
use phast_ast::Modifiers;
use phast_binder::builtins;
use phast_binder::*;
use phast_core::InternalError;

type PrintResult = Result<(), InternalError>;

/// Options for the printer.
#[derive(Debug, Clone)]
pub struct PrinterOptions {
    /// Import specifier of the runtime module.
    pub runtime_module: String,
    /// Indentation string.
    pub indent_str: String,
    /// Newline string.
    pub new_line: String,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            runtime_module: "./php-runtime.mjs".to_string(),
            indent_str: "    ".to_string(),
            new_line: "\n".to_string(),
        }
    }
}

/// Print `file` as an ES module.
pub fn render(file: &BoundFile, options: &PrinterOptions) -> Result<String, InternalError> {
    Printer::new(options).print_file(file)
}

pub struct Printer<'o> {
    output: String,
    indent_level: u32,
    options: &'o PrinterOptions,
    /// Export names of the built-ins referenced so far, in first-use order.
    imports: IndexSet<&'static str>,
}

// JavaScript precedence tiers, loosest first.
const COMMA: u8 = 1;
const ASSIGNMENT: u8 = 2;
const COALESCE: u8 = 3;
const LOGICAL_OR: u8 = 4;
const LOGICAL_AND: u8 = 5;
const BITWISE_OR: u8 = 6;
const BITWISE_XOR: u8 = 7;
const BITWISE_AND: u8 = 8;
const EQUALITY: u8 = 9;
const RELATIONAL: u8 = 10;
const ADDITIVE: u8 = 12;
const MULTIPLICATIVE: u8 = 13;
const EXPONENT: u8 = 14;
const PREFIX: u8 = 15;
const POSTFIX: u8 = 16;
const NEW: u8 = 17;
const MEMBER: u8 = 18;
const PRIMARY: u8 = 19;

impl<'o> Printer<'o> {
    pub fn new(options: &'o PrinterOptions) -> Self {
        Self {
            output: String::with_capacity(4096),
            indent_level: 0,
            options,
            imports: IndexSet::new(),
        }
    }

    /// Print a file to a string.
    pub fn print_file(mut self, file: &BoundFile) -> Result<String, InternalError> {
        self.print_let(&file.scope, &[]);
        for statement in &file.statements {
            self.print_statement_line(statement)?;
        }

        let mut result = String::with_capacity(self.output.len() + 128);
        if !self.imports.is_empty() {
            let names: Vec<&str> = self.imports.iter().copied().collect();
            result.push_str(&format!(
                "import {{ {} }} from {};",
                names.join(", "),
                quote(&self.options.runtime_module)
            ));
            result.push_str(&self.options.new_line);
        }
        result.push_str(&self.output);
        Ok(result)
    }

    // ========================================================================
    // Statement printing
    // ========================================================================

    /// One statement on its own line. Bare semicolons are dropped.
    fn print_statement_line(&mut self, statement: &BoundStatement) -> PrintResult {
        if matches!(statement, BoundStatement::Semicolon) {
            return Ok(());
        }
        self.write_indent();
        self.print_statement(statement)?;
        self.write_newline();
        Ok(())
    }

    fn print_statement(&mut self, statement: &BoundStatement) -> PrintResult {
        match statement {
            BoundStatement::Block(n) => self.print_block(&n.statements)?,
            BoundStatement::If(n) => {
                self.write("if (");
                self.print_expression(&n.condition)?;
                self.write(") ");
                self.print_statement(&n.then_statement)?;
                if let Some(ref else_statement) = n.else_statement {
                    self.write(" else ");
                    self.print_statement(else_statement)?;
                }
            }
            BoundStatement::While(n) => {
                self.print_labels(&n.body);
                self.write("while (");
                self.print_expression(&n.condition)?;
                self.write(") ");
                self.print_statement(&n.body)?;
            }
            BoundStatement::For(n) => {
                self.print_labels(&n.body);
                self.write("for (");
                self.print_expression(&n.initializer)?;
                self.write("; ");
                self.print_expression(&n.condition)?;
                self.write("; ");
                self.print_expression(&n.incrementor)?;
                self.write(") ");
                self.print_statement(&n.body)?;
            }
            BoundStatement::Body(n) => self.print_statement(n.statement())?,
            BoundStatement::Switch(n) => self.print_switch_statement(n)?,
            BoundStatement::Break(n) => self.print_jump("break", n),
            BoundStatement::Continue(n) => {
                // `continue` aimed at a switch leaves the switch.
                let keyword = match n.label.role {
                    LabelRole::Break => "break",
                    LabelRole::Continue => "continue",
                };
                self.print_jump(keyword, n);
            }
            BoundStatement::Return(n) => {
                self.write("return");
                if let Some(ref expression) = n.expression {
                    self.write(" ");
                    self.print_expression(expression)?;
                }
                self.write(";");
            }
            BoundStatement::Expression(n) => {
                self.print_expression(&n.expression)?;
                self.write(";");
            }
            BoundStatement::Semicolon => self.write(";"),
            BoundStatement::Class(n) => self.print_class_declaration(n)?,
            BoundStatement::Function(n) => self.print_function_declaration(n)?,
            BoundStatement::Echo(_) | BoundStatement::Const(_) | BoundStatement::Namespace(_) => {
                return Err(InternalError::unlowered(statement.kind_name()));
            }
        }
        Ok(())
    }

    fn print_block(&mut self, statements: &[StmtRef]) -> PrintResult {
        self.write("{");
        self.write_newline();
        self.increase_indent();
        for statement in statements {
            self.print_statement_line(statement)?;
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
        Ok(())
    }

    /// `name: ` for each materialized label of a loop body.
    fn print_labels(&mut self, body: &BoundStatement) {
        if let BoundStatement::Body(body) = body {
            for label in [&body.break_label, &body.continue_label] {
                if label.is_materialized() {
                    self.write(&label.name);
                    self.write(": ");
                }
            }
        }
    }

    fn print_jump(&mut self, keyword: &str, node: &BoundJumpStatement) {
        self.write(keyword);
        if node.depth > 1 {
            self.write(" ");
            self.write(&node.label.name);
        }
        self.write(";");
    }

    fn print_switch_statement(&mut self, node: &BoundSwitchStatement) -> PrintResult {
        if node.break_label.is_materialized() {
            self.write(&node.break_label.name);
            self.write(": ");
        }
        self.write("switch (");
        self.print_expression(&node.expression)?;
        self.write(") {");
        self.write_newline();
        self.increase_indent();
        for case in node.cases() {
            self.write_indent();
            match case.expression {
                Some(ref expression) => {
                    self.write("case ");
                    self.print_expression(expression)?;
                    self.write(":");
                }
                None => self.write("default:"),
            }
            self.write_newline();
            self.increase_indent();
            for statement in &case.statements {
                self.print_statement_line(statement)?;
            }
            self.decrease_indent();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
        Ok(())
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// `let $a, $b;` for the writable variables declared directly in `scope`.
    fn print_let(&mut self, scope: &Scope, parameters: &[BoundParameter]) {
        let names: Vec<String> = scope
            .declared_variables()
            .into_iter()
            .filter(|symbol| {
                matches!(symbol.kind, SymbolKind::Variable)
                    && symbol.is_variable()
                    && !symbol.read_only
                    && !parameters.iter().any(|p| p.symbol.name == symbol.name)
            })
            .map(|symbol| symbol.name.clone())
            .collect();
        if names.is_empty() {
            return;
        }
        self.write_indent();
        self.write("let ");
        self.write(&names.join(", "));
        self.write(";");
        self.write_newline();
    }

    fn print_function_declaration(&mut self, node: &BoundFunctionDeclaration) -> PrintResult {
        self.write("function ");
        self.write(&node.name);
        self.print_function_rest(node)
    }

    /// Parameters and body of a function or method.
    fn print_function_rest(&mut self, node: &BoundFunctionDeclaration) -> PrintResult {
        self.write("(");
        for (i, parameter) in node.parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&parameter.symbol.name);
            if let Some(ref default_value) = parameter.default_value {
                self.write(" = ");
                self.print_expression_with(default_value, ASSIGNMENT)?;
            }
        }
        self.write(") {");
        self.write_newline();
        self.increase_indent();
        self.print_let(&node.scope, &node.parameters);
        for statement in node.body.iter().flatten() {
            self.print_statement_line(statement)?;
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
        Ok(())
    }

    fn print_class_declaration(&mut self, node: &BoundClassDeclaration) -> PrintResult {
        self.write("class ");
        self.write(&node.name);
        if let Some(ref base) = node.base {
            self.write(" extends ");
            self.print_expression_with(base, MEMBER)?;
        }
        self.write(" {");
        self.write_newline();
        self.increase_indent();
        for property in &node.properties {
            self.write_indent();
            if property.is_const || property.modifiers.contains(Modifiers::STATIC) {
                self.write("static ");
            }
            self.write(&member_name(&property.name));
            match property.initializer {
                Some(ref initializer) => {
                    self.write(" = ");
                    self.print_expression_with(initializer, ASSIGNMENT)?;
                }
                None if property.ty.is_any() => self.write(" = null"),
                None => {}
            }
            self.write(";");
            self.write_newline();
        }
        // Abstract methods have no body and nothing to print.
        for method in node.methods.iter().filter(|m| m.body.is_some()) {
            self.write_indent();
            if method.modifiers.contains(Modifiers::STATIC) {
                self.write("static ");
            }
            self.write(&member_name(&method.name));
            self.print_function_rest(method)?;
            self.write_newline();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
        Ok(())
    }

    // ========================================================================
    // Expression printing
    // ========================================================================

    fn print_expression(&mut self, expression: &BoundExpression) -> PrintResult {
        self.print_expression_with(expression, 0)
    }

    /// Print `expression`, parenthesized when it binds looser than `required`.
    fn print_expression_with(&mut self, expression: &BoundExpression, required: u8) -> PrintResult {
        if precedence(expression) < required {
            self.write("(");
            self.print_expression_inner(expression)?;
            self.write(")");
            Ok(())
        } else {
            self.print_expression_inner(expression)
        }
    }

    fn print_expression_inner(&mut self, expression: &BoundExpression) -> PrintResult {
        match expression {
            BoundExpression::Binary(n) => self.print_binary_expression(n)?,
            BoundExpression::Unary(n) => self.print_unary_expression(n)?,
            BoundExpression::Name(n) => self.print_symbol(&n.symbol),
            BoundExpression::Literal(n) => self.print_literal(&n.value),
            BoundExpression::Paren(n) => {
                self.write("(");
                self.print_expression(&n.expression)?;
                self.write(")");
            }
            BoundExpression::Comma(n) => self.print_list(&n.expressions)?,
            BoundExpression::Assignment(n) => {
                if n.append {
                    return Err(InternalError::unlowered("BoundAssignmentExpression (append)"));
                }
                self.print_symbol(&n.symbol);
                self.write(" = ");
                self.print_expression_with(&n.value, ASSIGNMENT)?;
            }
            BoundExpression::Empty => {}
            // Only reachable when binding reported a diagnostic.
            BoundExpression::Error => self.write("undefined"),
            BoundExpression::ArrayLiteral(_) => {
                return Err(InternalError::unlowered(expression.kind_name()));
            }
            BoundExpression::JsArray(n) => {
                self.write("[");
                self.print_list(&n.elements)?;
                self.write("]");
            }
            BoundExpression::Closure(n) => {
                self.write("() => ");
                self.print_block(&n.body)?;
            }
            BoundExpression::Declaration(statement) => match &**statement {
                BoundStatement::Class(class) => self.print_class_declaration(class)?,
                BoundStatement::Function(function) => self.print_function_declaration(function)?,
                other => {
                    return Err(InternalError::unreachable(
                        format!("`{}` in declaration position", other.kind_name()),
                        "printer",
                    ));
                }
            },
        }
        Ok(())
    }

    fn print_list(&mut self, expressions: &[ExprRef]) -> PrintResult {
        for (i, expression) in expressions.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_expression_with(expression, ASSIGNMENT)?;
        }
        Ok(())
    }

    fn print_binary_expression(&mut self, node: &BoundBinaryExpression) -> PrintResult {
        match node.operator.kind {
            BinaryOperatorKind::FunctionCall => {
                self.print_expression_with(&node.left, MEMBER)?;
                self.write("(");
                self.print_list(&call_arguments(&node.right))?;
                self.write(")");
            }
            BinaryOperatorKind::MemberAccess => self.print_member_access(node)?,
            BinaryOperatorKind::Concatenation
            | BinaryOperatorKind::KeyValue
            | BinaryOperatorKind::ElementAccess
            | BinaryOperatorKind::StaticMemberAccess => {
                return Err(InternalError::unlowered(binary_kind_name(node.operator.kind)));
            }
            kind => {
                let Some(text) = kind.js_text() else {
                    return Err(InternalError::unreachable(format!("operator {:?}", kind), "printer"));
                };
                let own = binary_precedence(kind);
                let (left_required, right_required) = match kind {
                    BinaryOperatorKind::Assignment => (MEMBER, ASSIGNMENT),
                    BinaryOperatorKind::Exponentiation => (POSTFIX, own),
                    _ => (own, own + 1),
                };
                self.print_operand(kind, &node.left, left_required)?;
                self.write(" ");
                self.write(text);
                self.write(" ");
                self.print_operand(kind, &node.right, right_required)?;
            }
        }
        Ok(())
    }

    /// JavaScript rejects `??` mixed with `&&` or `||` unless parenthesized.
    fn print_operand(&mut self, parent: BinaryOperatorKind, operand: &BoundExpression, required: u8) -> PrintResult {
        let mixes_coalesce = match operand {
            BoundExpression::Binary(child) => {
                let is_logical = |k: BinaryOperatorKind| matches!(k, BinaryOperatorKind::LogicalAnd | BinaryOperatorKind::LogicalOr);
                (parent == BinaryOperatorKind::Coalesce && is_logical(child.operator.kind))
                    || (is_logical(parent) && child.operator.kind == BinaryOperatorKind::Coalesce)
            }
            _ => false,
        };
        if mixes_coalesce {
            self.print_expression_with(operand, PRIMARY)
        } else {
            self.print_expression_with(operand, required)
        }
    }

    /// `a.b`, `a?.b` for a null-safe receiver, `a[b]` for a computed member,
    /// and `super` for a parent constructor.
    fn print_member_access(&mut self, node: &BoundBinaryExpression) -> PrintResult {
        let (receiver, optional) = match &*node.left {
            BoundExpression::Unary(unary) if unary.operator.kind == UnaryOperatorKind::Optional => {
                (&unary.operand, true)
            }
            _ => (&node.left, false),
        };
        match &*node.right {
            BoundExpression::Name(member) => {
                if is_super(receiver) && member.symbol.name == "__construct" {
                    self.write("super");
                    return Ok(());
                }
                self.print_expression_with(receiver, MEMBER)?;
                self.write(if optional { "?." } else { "." });
                self.write(&member_name(&member.symbol.name));
            }
            computed => {
                self.print_expression_with(receiver, MEMBER)?;
                self.write(if optional { "?.[" } else { "[" });
                self.print_expression(computed)?;
                self.write("]");
            }
        }
        Ok(())
    }

    fn print_unary_expression(&mut self, node: &BoundUnaryExpression) -> PrintResult {
        match node.operator.kind {
            UnaryOperatorKind::New => {
                self.write("new ");
                self.print_expression_with(&node.operand, NEW)?;
            }
            // A bare null-safe marker has no meaning outside member access.
            UnaryOperatorKind::Optional => self.print_expression_with(&node.operand, POSTFIX)?,
            _ if node.operator.is_postfix => {
                self.print_expression_with(&node.operand, POSTFIX)?;
                self.write(node.operator.js_text());
            }
            _ => {
                self.write(node.operator.js_text());
                // `- -x` must not print as `--x`.
                if matches!(&*node.operand, BoundExpression::Unary(inner) if !inner.operator.is_postfix) {
                    self.write(" ");
                }
                self.print_expression_with(&node.operand, PREFIX)?;
            }
        }
        Ok(())
    }

    fn print_symbol(&mut self, symbol: &VariableSymbol) {
        if let Some(export_name) = builtins::export_name(symbol) {
            self.imports.insert(export_name);
            self.write(export_name);
        } else if symbol.name == "$this" {
            self.write("this");
        } else {
            self.write(&symbol.name);
        }
    }

    fn print_literal(&mut self, value: &ConstantValue) {
        match value {
            ConstantValue::Int(value) => self.write(&value.to_string()),
            ConstantValue::Float(value) if value.is_nan() => self.write("NaN"),
            ConstantValue::Float(value) if value.is_infinite() => {
                self.write(if *value > 0.0 { "Infinity" } else { "-Infinity" })
            }
            ConstantValue::Float(value) => self.write(&value.to_string()),
            ConstantValue::String(text) => self.write(&quote(text)),
            ConstantValue::Bool(value) => self.write(if *value { "true" } else { "false" }),
            ConstantValue::Null => self.write("null"),
            ConstantValue::Absent => self.write("undefined"),
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_newline(&mut self) {
        self.output.push_str(&self.options.new_line);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.options.indent_str);
        }
    }

    fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }
}

fn precedence(expression: &BoundExpression) -> u8 {
    match expression {
        BoundExpression::Binary(n) => binary_precedence(n.operator.kind),
        BoundExpression::Unary(n) => match n.operator.kind {
            UnaryOperatorKind::New => NEW,
            UnaryOperatorKind::Optional => MEMBER,
            _ if n.operator.is_postfix => POSTFIX,
            _ => PREFIX,
        },
        BoundExpression::Assignment(_) | BoundExpression::Closure(_) => ASSIGNMENT,
        BoundExpression::Comma(_) => COMMA,
        _ => PRIMARY,
    }
}

fn binary_precedence(kind: BinaryOperatorKind) -> u8 {
    use BinaryOperatorKind as K;
    match kind {
        K::Assignment | K::KeyValue => ASSIGNMENT,
        K::Coalesce => COALESCE,
        K::LogicalOr => LOGICAL_OR,
        K::LogicalAnd => LOGICAL_AND,
        K::BitwiseOr => BITWISE_OR,
        K::BitwiseXor => BITWISE_XOR,
        K::BitwiseAnd => BITWISE_AND,
        K::Equals | K::NotEquals | K::Identical | K::NotIdentical => EQUALITY,
        K::Less | K::LessOrEquals | K::Greater | K::GreaterOrEquals => RELATIONAL,
        K::Addition | K::Subtraction | K::Concatenation => ADDITIVE,
        K::Multiplication | K::Division | K::Modulo => MULTIPLICATIVE,
        K::Exponentiation => EXPONENT,
        K::FunctionCall | K::ElementAccess | K::MemberAccess | K::StaticMemberAccess => MEMBER,
    }
}

fn binary_kind_name(kind: BinaryOperatorKind) -> &'static str {
    match kind {
        BinaryOperatorKind::Concatenation => "BoundBinaryExpression (concatenation)",
        BinaryOperatorKind::KeyValue => "BoundBinaryExpression (key => value)",
        BinaryOperatorKind::ElementAccess => "BoundBinaryExpression (element access)",
        BinaryOperatorKind::StaticMemberAccess => "BoundBinaryExpression (static access)",
        _ => "BoundBinaryExpression",
    }
}

fn is_super(expression: &BoundExpression) -> bool {
    matches!(expression, BoundExpression::Name(n) if n.symbol.name == "super")
}

/// Property and method names print without the sigil. The constructor has
/// its JavaScript name.
fn member_name(name: &str) -> String {
    let name = name.trim_start_matches('$');
    if name.eq_ignore_ascii_case("__construct") {
        "constructor".to_string()
    } else {
        name.to_string()
    }
}

/// A double-quoted JavaScript string literal.
fn quote(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    result.push('"');
    for c in text.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{2028}' => result.push_str("\\u2028"),
            '\u{2029}' => result.push_str("\\u2029"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                result.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use phast_ast::SyntaxKind;
    use std::rc::Rc;

    fn file_of(statements: Vec<StmtRef>) -> BoundFile {
        let root = Scope::root();
        BoundFile {
            file_name: "test.php".into(),
            statements,
            scope: Scope::child(&root),
            root,
        }
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
        assert_eq!(quote("\u{1b}"), "\"\\x1b\"");
    }

    #[test]
    fn test_member_name() {
        assert_eq!(member_name("$count"), "count");
        assert_eq!(member_name("__construct"), "constructor");
    }

    #[test]
    fn test_echo_is_unlowered() {
        let echo = Rc::new(BoundStatement::Echo(BoundEchoStatement {
            expression: BoundExpression::string("x"),
        }));
        let err = render(&file_of(vec![echo]), &PrinterOptions::default()).unwrap_err();
        assert_eq!(err, InternalError::unlowered("BoundEchoStatement"));
    }

    #[test]
    fn test_array_literal_is_unlowered() {
        let array = Rc::new(BoundExpression::ArrayLiteral(BoundArrayLiteralExpression {
            elements: vec![],
        }));
        let err = render(
            &file_of(vec![BoundStatement::expression(array)]),
            &PrinterOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, InternalError::UnloweredNode { .. }));
    }

    #[test]
    fn test_nested_operands_are_parenthesized() {
        let int = |v| BoundExpression::literal(ConstantValue::Int(v));
        let sum = Rc::new(BoundExpression::Binary(BoundBinaryExpression {
            left: int(1),
            operator: BinaryOperator::bind(SyntaxKind::PlusToken, &Type::int(), &Type::int()).unwrap(),
            right: int(2),
            ty: Type::int(),
        }));
        let product = Rc::new(BoundExpression::Binary(BoundBinaryExpression {
            left: sum,
            operator: BinaryOperator::bind(SyntaxKind::AsteriskToken, &Type::int(), &Type::int()).unwrap(),
            right: int(3),
            ty: Type::int(),
        }));
        let output = render(
            &file_of(vec![BoundStatement::expression(product)]),
            &PrinterOptions::default(),
        )
        .unwrap();
        assert_eq!(output, "(1 + 2) * 3;\n");
    }
}
