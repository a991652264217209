//! Syntax tree visitor.
//!
//! `SyntaxVisitor` walks every child of a node in source order and reports
//! each token through `visit_token`. Spans are computed with it: a node's span
//! runs from its first real token to its last.

use crate::node::*;
use crate::token::Token;
use phast_core::text::TextSpan;

/// A visitor over the syntax tree. Default implementations walk into children.
pub trait SyntaxVisitor<'a> {
    fn visit_token(&mut self, _token: &Token<'a>) {}

    fn visit_source_file(&mut self, node: &SourceFile<'a>) {
        for stmt in node.statements.iter() {
            self.visit_statement(stmt);
        }
        self.visit_token(&node.end_of_file_token);
    }

    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        match stmt {
            Statement::Block(n) => self.visit_block(n),
            Statement::If(n) => self.visit_if_statement(n),
            Statement::While(n) => {
                self.visit_token(&n.while_keyword);
                self.visit_token(&n.open_paren);
                self.visit_expression(n.condition);
                self.visit_token(&n.close_paren);
                self.visit_statement(n.body);
            }
            Statement::For(n) => {
                self.visit_token(&n.for_keyword);
                self.visit_token(&n.open_paren);
                self.visit_expression(n.initializer);
                self.visit_token(&n.first_semicolon);
                self.visit_expression(n.condition);
                self.visit_token(&n.second_semicolon);
                self.visit_expression(n.incrementor);
                self.visit_token(&n.close_paren);
                self.visit_statement(n.body);
            }
            Statement::Break(n) => {
                self.visit_token(&n.break_keyword);
                if let Some(depth) = n.depth {
                    self.visit_expression(depth);
                }
                self.visit_token(&n.semicolon);
            }
            Statement::Continue(n) => {
                self.visit_token(&n.continue_keyword);
                if let Some(depth) = n.depth {
                    self.visit_expression(depth);
                }
                self.visit_token(&n.semicolon);
            }
            Statement::Return(n) => {
                self.visit_token(&n.return_keyword);
                if let Some(expr) = n.expression {
                    self.visit_expression(expr);
                }
                self.visit_token(&n.semicolon);
            }
            Statement::Echo(n) => {
                self.visit_token(&n.echo_keyword);
                self.visit_expression(n.expression);
                self.visit_optional_token(n.semicolon.as_ref());
            }
            Statement::Switch(n) => self.visit_switch_statement(n),
            Statement::Expression(n) => {
                self.visit_expression(n.expression);
                self.visit_token(&n.semicolon);
            }
            Statement::Semicolon(n) => self.visit_token(&n.semicolon),
            Statement::Class(n) => self.visit_class_declaration(n),
            Statement::Function(n) => self.visit_function_declaration(n),
            Statement::Const(n) => {
                self.visit_token(&n.const_keyword);
                self.visit_token(&n.name);
                self.visit_token(&n.equals_token);
                self.visit_expression(n.value);
                self.visit_token(&n.semicolon);
            }
            Statement::Namespace(n) => {
                self.visit_token(&n.namespace_keyword);
                self.visit_token(&n.name);
                self.visit_token(&n.semicolon);
            }
        }
    }

    fn visit_block(&mut self, node: &BlockStatement<'a>) {
        self.visit_token(&node.open_brace);
        for stmt in node.statements.iter() {
            self.visit_statement(stmt);
        }
        self.visit_token(&node.close_brace);
    }

    fn visit_if_statement(&mut self, node: &IfStatement<'a>) {
        self.visit_token(&node.if_keyword);
        self.visit_token(&node.open_paren);
        self.visit_expression(node.condition);
        self.visit_token(&node.close_paren);
        self.visit_statement(node.then_statement);
        if let Some(ref else_clause) = node.else_clause {
            self.visit_optional_token(else_clause.else_keyword.as_ref());
            self.visit_statement(else_clause.statement);
        }
    }

    fn visit_switch_statement(&mut self, node: &SwitchStatement<'a>) {
        self.visit_token(&node.switch_keyword);
        self.visit_token(&node.open_paren);
        self.visit_expression(node.expression);
        self.visit_token(&node.close_paren);
        self.visit_token(&node.open_brace);
        for case in node.cases.iter() {
            self.visit_token(&case.keyword);
            if let Some(expr) = case.expression {
                self.visit_expression(expr);
            }
            self.visit_token(&case.colon);
            for stmt in case.statements.iter() {
                self.visit_statement(stmt);
            }
        }
        self.visit_token(&node.close_brace);
    }

    fn visit_class_declaration(&mut self, node: &ClassDeclaration<'a>) {
        for modifier in node.modifiers.iter() {
            self.visit_token(modifier);
        }
        self.visit_token(&node.class_keyword);
        self.visit_token(&node.name);
        for clause in [&node.extends_clause, &node.implements_clause].into_iter().flatten() {
            self.visit_token(&clause.keyword);
            for name in clause.names.iter() {
                self.visit_token(name);
            }
        }
        self.visit_token(&node.open_brace);
        // Members are stored split by kind; walking them out of source order
        // is fine for span purposes because the braces bound the class.
        for property in node.properties.iter() {
            self.visit_property_declaration(property);
        }
        for method in node.methods.iter() {
            self.visit_function_declaration(method);
        }
        self.visit_token(&node.close_brace);
    }

    fn visit_function_declaration(&mut self, node: &FunctionDeclaration<'a>) {
        for modifier in node.modifiers.iter() {
            self.visit_token(modifier);
        }
        self.visit_token(&node.function_keyword);
        self.visit_token(&node.name);
        self.visit_token(&node.open_paren);
        for param in node.parameters.iter() {
            self.visit_parameter(param);
        }
        self.visit_token(&node.close_paren);
        if let Some(ref clause) = node.return_type {
            self.visit_type_clause(clause);
        }
        if let Some(ref body) = node.body {
            self.visit_block(body);
        }
        self.visit_optional_token(node.semicolon.as_ref());
    }

    fn visit_property_declaration(&mut self, node: &PropertyDeclaration<'a>) {
        for modifier in node.modifiers.iter() {
            self.visit_token(modifier);
        }
        self.visit_optional_token(node.const_keyword.as_ref());
        if let Some(ref clause) = node.type_clause {
            self.visit_type_clause(clause);
        }
        self.visit_token(&node.name);
        if let Some(ref init) = node.initializer {
            self.visit_token(&init.equals_token);
            self.visit_expression(init.value);
        }
        self.visit_token(&node.semicolon);
    }

    fn visit_parameter(&mut self, node: &Parameter<'a>) {
        if let Some(ref clause) = node.type_clause {
            self.visit_type_clause(clause);
        }
        self.visit_token(&node.name);
        if let Some(ref init) = node.default_value {
            self.visit_token(&init.equals_token);
            self.visit_expression(init.value);
        }
    }

    fn visit_type_clause(&mut self, node: &TypeClause<'a>) {
        self.visit_optional_token(node.colon.as_ref());
        self.visit_optional_token(node.question.as_ref());
        self.visit_token(&node.name);
    }

    fn visit_expression(&mut self, expr: &Expression<'a>) {
        match expr {
            Expression::Binary(n) => {
                self.visit_expression(n.left);
                self.visit_token(&n.operator_token);
                self.visit_expression(n.right);
                self.visit_optional_token(n.close_token.as_ref());
            }
            Expression::Unary(n) => {
                if n.is_postfix {
                    self.visit_expression(n.operand);
                    self.visit_token(&n.operator_token);
                } else {
                    self.visit_token(&n.operator_token);
                    self.visit_expression(n.operand);
                }
            }
            Expression::Name(n) => self.visit_token(&n.identifier),
            Expression::Literal(n) => self.visit_token(&n.token),
            Expression::Paren(n) => {
                self.visit_token(&n.open_paren);
                self.visit_expression(n.expression);
                self.visit_token(&n.close_paren);
            }
            Expression::Comma(n) => {
                for (i, item) in n.expressions.iter().enumerate() {
                    self.visit_expression(item);
                    if let Some(comma) = n.commas.get(i) {
                        self.visit_token(comma);
                    }
                }
            }
            Expression::Assignment(n) => {
                self.visit_token(&n.target);
                if let Some((ref open, ref close)) = n.append_brackets {
                    self.visit_token(open);
                    self.visit_token(close);
                }
                self.visit_token(&n.operator_token);
                self.visit_expression(n.value);
            }
            Expression::Empty(_) => {}
            Expression::ArrayLiteral(n) => {
                self.visit_optional_token(n.array_keyword.as_ref());
                self.visit_token(&n.open_token);
                for element in n.elements.iter() {
                    self.visit_expression(element);
                }
                self.visit_token(&n.close_token);
            }
        }
    }

    fn visit_optional_token(&mut self, token: Option<&Token<'a>>) {
        if let Some(token) = token {
            self.visit_token(token);
        }
    }
}

/// Records the first and last real (non-synthesized) token it sees.
#[derive(Default)]
struct SpanCollector {
    first: Option<TextSpan>,
    last: Option<TextSpan>,
}

impl<'a> SyntaxVisitor<'a> for SpanCollector {
    fn visit_token(&mut self, token: &Token<'a>) {
        if token.is_missing() {
            return;
        }
        let span = token.span();
        if self.first.is_none() {
            self.first = Some(span);
        }
        self.last = Some(span);
    }
}

impl SpanCollector {
    fn finish(self) -> Option<TextSpan> {
        match (self.first, self.last) {
            (Some(first), Some(last)) => Some(first.union(&last)),
            _ => None,
        }
    }
}

/// The span of an expression, or `None` when it has no real tokens
/// (an empty expression or one made entirely of synthesized tokens).
pub fn span_of_expression(expr: &Expression<'_>) -> Option<TextSpan> {
    let mut collector = SpanCollector::default();
    collector.visit_expression(expr);
    match expr {
        Expression::Empty(e) => Some(TextSpan::empty(e.pos)),
        _ => collector.finish(),
    }
}

pub fn span_of_statement(stmt: &Statement<'_>) -> Option<TextSpan> {
    let mut collector = SpanCollector::default();
    collector.visit_statement(stmt);
    collector.finish()
}

pub fn span_of_type_clause(clause: &TypeClause<'_>) -> Option<TextSpan> {
    let mut collector = SpanCollector::default();
    collector.visit_type_clause(clause);
    collector.finish()
}
