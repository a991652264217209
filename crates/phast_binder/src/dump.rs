//! Indented debug rendering of a bound tree.

use crate::bound::*;
use std::fmt::Write;

/// Render `file` one node per line, children indented by two spaces.
/// Expressions show their resolved type after a colon.
pub fn bound_tree_dump(file: &BoundFile) -> String {
    let mut dumper = Dumper::default();
    dumper.line(format_args!("BoundFile {}", file.file_name));
    dumper.nested(|d| {
        for statement in &file.statements {
            d.statement(statement);
        }
    });
    dumper.out
}

#[derive(Default)]
struct Dumper {
    out: String,
    indent: usize,
}

impl Dumper {
    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        let _ = self.out.write_fmt(args);
        self.out.push('\n');
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    fn statements(&mut self, statements: &[StmtRef]) {
        self.nested(|d| {
            for statement in statements {
                d.statement(statement);
            }
        });
    }

    fn statement(&mut self, statement: &BoundStatement) {
        let kind = statement.kind_name();
        match statement {
            BoundStatement::Block(n) => {
                self.line(format_args!("{}", kind));
                self.statements(&n.statements);
            }
            BoundStatement::If(n) => {
                self.line(format_args!("{}", kind));
                self.nested(|d| {
                    d.expression(&n.condition);
                    d.statement(&n.then_statement);
                    if let Some(ref else_statement) = n.else_statement {
                        d.line(format_args!("else"));
                        d.nested(|d| d.statement(else_statement));
                    }
                });
            }
            BoundStatement::While(n) => {
                self.line(format_args!("{}", kind));
                self.nested(|d| {
                    d.expression(&n.condition);
                    d.statement(&n.body);
                });
            }
            BoundStatement::For(n) => {
                self.line(format_args!("{}", kind));
                self.nested(|d| {
                    d.expression(&n.initializer);
                    d.expression(&n.condition);
                    d.expression(&n.incrementor);
                    d.statement(&n.body);
                });
            }
            BoundStatement::Body(n) => {
                self.line(format_args!(
                    "{} {}{} {}{}",
                    kind,
                    n.break_label.name,
                    if n.break_label.is_materialized() { "*" } else { "" },
                    n.continue_label.name,
                    if n.continue_label.is_materialized() { "*" } else { "" },
                ));
                self.nested(|d| d.statement(n.statement()));
            }
            BoundStatement::Switch(n) => {
                self.line(format_args!("{} {}", kind, n.break_label.name));
                self.nested(|d| {
                    d.expression(&n.expression);
                    for case in n.cases() {
                        match case.expression {
                            Some(ref expression) => {
                                d.line(format_args!("case"));
                                d.nested(|d| d.expression(expression));
                            }
                            None => d.line(format_args!("default")),
                        }
                        d.statements(&case.statements);
                    }
                });
            }
            BoundStatement::Break(n) | BoundStatement::Continue(n) => {
                self.line(format_args!("{} {} (depth {})", kind, n.label.name, n.depth));
            }
            BoundStatement::Return(n) => {
                self.line(format_args!("{}", kind));
                if let Some(ref expression) = n.expression {
                    self.nested(|d| d.expression(expression));
                }
            }
            BoundStatement::Echo(n) => {
                self.line(format_args!("{}", kind));
                self.nested(|d| d.expression(&n.expression));
            }
            BoundStatement::Expression(n) => {
                self.line(format_args!("{}", kind));
                self.nested(|d| d.expression(&n.expression));
            }
            BoundStatement::Semicolon => self.line(format_args!("{}", kind)),
            BoundStatement::Class(n) => {
                self.line(format_args!("{} {} [{:?}]", kind, n.name, n.modifiers));
                self.nested(|d| {
                    if let Some(ref base) = n.base {
                        d.line(format_args!("extends"));
                        d.nested(|d| d.expression(base));
                    }
                    for property in &n.properties {
                        d.line(format_args!(
                            "{} {}: {} [{:?}]",
                            if property.is_const { "Const" } else { "Property" },
                            property.name,
                            property.ty,
                            property.modifiers
                        ));
                        if let Some(ref initializer) = property.initializer {
                            d.nested(|d| d.expression(initializer));
                        }
                    }
                    for method in &n.methods {
                        d.function(method);
                    }
                });
            }
            BoundStatement::Function(n) => self.function(n),
            BoundStatement::Const(n) => {
                self.line(format_args!("{} {}: {}", kind, n.symbol.name, n.symbol.ty));
                self.nested(|d| d.expression(&n.value));
            }
            BoundStatement::Namespace(n) => self.line(format_args!("{} {}", kind, n.name)),
        }
    }

    fn function(&mut self, function: &BoundFunctionDeclaration) {
        let parameters: Vec<String> = function
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.symbol.name, p.symbol.ty))
            .collect();
        let return_type = function
            .symbol
            .return_type()
            .map(|ty| ty.to_string())
            .unwrap_or_default();
        self.line(format_args!(
            "BoundFunctionDeclaration {}({}): {} [{:?}]",
            function.name,
            parameters.join(", "),
            return_type,
            function.modifiers
        ));
        if let Some(ref body) = function.body {
            self.statements(body);
        }
    }

    fn expression(&mut self, expression: &BoundExpression) {
        let kind = expression.kind_name();
        let ty = expression.ty();
        match expression {
            BoundExpression::Binary(n) => {
                self.line(format_args!("{} {:?}: {}", kind, n.operator.kind, ty));
                self.nested(|d| {
                    d.expression(&n.left);
                    d.expression(&n.right);
                });
            }
            BoundExpression::Unary(n) => {
                self.line(format_args!("{} {:?}: {}", kind, n.operator.kind, ty));
                self.nested(|d| d.expression(&n.operand));
            }
            BoundExpression::Name(n) => self.line(format_args!("{} {}: {}", kind, n.symbol.name, ty)),
            BoundExpression::Literal(n) => self.line(format_args!("{} {:?}: {}", kind, n.value, ty)),
            BoundExpression::Paren(n) => {
                self.line(format_args!("{}: {}", kind, ty));
                self.nested(|d| d.expression(&n.expression));
            }
            BoundExpression::Comma(n) => {
                self.line(format_args!("{}: {}", kind, ty));
                self.nested(|d| {
                    for e in &n.expressions {
                        d.expression(e);
                    }
                });
            }
            BoundExpression::Assignment(n) => {
                let append = if n.append { "[]" } else { "" };
                self.line(format_args!("{} {}{}: {}", kind, n.symbol.name, append, ty));
                self.nested(|d| d.expression(&n.value));
            }
            BoundExpression::Empty | BoundExpression::Error => {
                self.line(format_args!("{}: {}", kind, ty))
            }
            BoundExpression::ArrayLiteral(n) => {
                self.line(format_args!("{}: {}", kind, ty));
                self.nested(|d| {
                    for e in &n.elements {
                        d.expression(e);
                    }
                });
            }
            BoundExpression::JsArray(n) => {
                self.line(format_args!("{}: {}", kind, ty));
                self.nested(|d| {
                    for e in &n.elements {
                        d.expression(e);
                    }
                });
            }
            BoundExpression::Closure(n) => {
                self.line(format_args!("{}: {}", kind, ty));
                self.statements(&n.body);
            }
            BoundExpression::Declaration(statement) => {
                self.line(format_args!("{}: {}", kind, ty));
                self.nested(|d| d.statement(statement));
            }
        }
    }
}
