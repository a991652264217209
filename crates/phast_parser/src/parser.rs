//! The PHP parser implementation.
//!
//! A single-pass recursive descent parser over a materialized token vector.
//! Expressions use precedence climbing; assignment is recognized by a short
//! lookahead match rather than by precedence. Every syntax error is reported
//! to the diagnostics sink and the parser synthesizes the missing token, so a
//! file always produces a tree.

use bumpalo::Bump;
use phast_ast::node::*;
use phast_ast::syntax_kind::SyntaxKind;
use phast_ast::token::Token;
use phast_core::text::TextSpan;
use phast_diagnostics::{messages, DiagnosticCollection, DiagnosticMessage};

use crate::precedence::{
    binary_operator_precedence, is_postfix_operator, is_right_associative,
    unary_operator_precedence, OperatorPrecedence,
};

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
const MAX_RECURSION_DEPTH: u32 = 128;

/// Scan and parse `text` in one step.
pub fn parse_source<'a>(
    arena: &'a Bump,
    file_name: &str,
    text: &'a str,
    diagnostics: &mut DiagnosticCollection,
) -> SourceFile<'a> {
    let tokens = phast_scanner::scan(arena, text, diagnostics);
    parse(arena, file_name, tokens, diagnostics)
}

/// Parse a token vector produced by the scanner.
pub fn parse<'a>(
    arena: &'a Bump,
    file_name: &str,
    tokens: Vec<Token<'a>>,
    diagnostics: &mut DiagnosticCollection,
) -> SourceFile<'a> {
    Parser::new(arena, file_name, tokens, diagnostics).parse_source_file()
}

pub struct Parser<'a, 'd> {
    arena: &'a Bump,
    file_name: &'a str,
    tokens: Vec<Token<'a>>,
    position: usize,
    diagnostics: &'d mut DiagnosticCollection,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    recursion_depth: u32,
}

impl<'a, 'd> Parser<'a, 'd> {
    pub fn new(
        arena: &'a Bump,
        file_name: &str,
        mut tokens: Vec<Token<'a>>,
        diagnostics: &'d mut DiagnosticCollection,
    ) -> Self {
        if tokens.last().map(|t| t.kind) != Some(SyntaxKind::EndOfFileToken) {
            let end = tokens.last().map(|t| t.end()).unwrap_or(0);
            tokens.push(Token::new(SyntaxKind::EndOfFileToken, end, ""));
        }
        Self {
            arena,
            file_name: arena.alloc_str(file_name),
            tokens,
            position: 0,
            diagnostics,
            recursion_depth: 0,
        }
    }

    pub fn parse_source_file(mut self) -> SourceFile<'a> {
        let mut statements = Vec::new();
        while self.current_kind() != SyntaxKind::EndOfFileToken {
            let start = self.position;
            let statement = self.parse_statement();
            statements.push(statement);
            if self.position == start {
                let current = *self.current();
                self.error_at(&current, &messages::PARSING_STOPPED_AT_0, &[current.display_text()]);
                break;
            }
        }

        let statements = hoist_declarations(statements);
        let end_of_file_token = self.tokens[self.tokens.len() - 1];
        SourceFile {
            file_name: self.file_name,
            statements: self.alloc_slice(statements),
            end_of_file_token,
        }
    }

    // ========================================================================
    // Token management
    // ========================================================================

    fn current(&self) -> &Token<'a> {
        self.peek(0)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current().kind
    }

    /// The token `offset` positions ahead. Reads past the end see the
    /// end-of-file token.
    fn peek(&self, offset: usize) -> &Token<'a> {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + offset).min(last)]
    }

    fn next_token(&mut self) -> Token<'a> {
        let token = *self.current();
        if token.kind != SyntaxKind::EndOfFileToken {
            self.position += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind; otherwise report
    /// it and synthesize a zero-width token of that kind.
    fn match_token(&mut self, kind: SyntaxKind) -> Token<'a> {
        if self.current_kind() == kind {
            return self.next_token();
        }
        let current = *self.current();
        self.error_at(
            &current,
            &messages::_0_EXPECTED_FOUND_1,
            &[kind.text(), current.display_text()],
        );
        Token::missing(kind, current.pos)
    }

    fn optional_token(&mut self, kind: SyntaxKind) -> Option<Token<'a>> {
        if self.current_kind() == kind {
            Some(self.next_token())
        } else {
            None
        }
    }

    fn error_at(&mut self, token: &Token<'a>, message: &DiagnosticMessage, args: &[&str]) {
        let span = if token.kind == SyntaxKind::EndOfFileToken {
            TextSpan::empty(token.pos)
        } else {
            token.span()
        };
        self.diagnostics.report(span, message, args);
    }

    /// Report the current token as unexpected and step over it.
    fn skip_unexpected_token(&mut self) {
        let current = *self.current();
        self.error_at(&current, &messages::UNEXPECTED_TOKEN_0, &[current.display_text()]);
        self.next_token();
    }

    fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    fn alloc_slice<T>(&self, items: Vec<T>) -> &'a [T] {
        if items.is_empty() {
            return &[];
        }
        self.arena.alloc_slice_fill_iter(items)
    }

    fn enter_recursion(&mut self) -> bool {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            self.recursion_depth -= 1;
            let current = *self.current();
            self.error_at(&current, &messages::UNEXPECTED_TOKEN_0, &[current.display_text()]);
            return false;
        }
        true
    }

    fn leave_recursion(&mut self) {
        self.recursion_depth -= 1;
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement(&mut self) -> Statement<'a> {
        if !self.enter_recursion() {
            let semicolon = Token::missing(SyntaxKind::SemicolonToken, self.current().pos);
            self.next_token();
            return Statement::Semicolon(SemicolonStatement { semicolon });
        }
        let statement = self.parse_statement_worker();
        self.leave_recursion();
        statement
    }

    fn parse_statement_worker(&mut self) -> Statement<'a> {
        match self.current_kind() {
            SyntaxKind::OpenBraceToken => Statement::Block(self.parse_block()),
            SyntaxKind::IfKeyword => {
                let keyword = self.next_token();
                Statement::If(self.parse_if_statement(keyword))
            }
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::BreakKeyword => {
                let break_keyword = self.next_token();
                let depth = self.parse_optional_operand();
                let semicolon = self.match_token(SyntaxKind::SemicolonToken);
                Statement::Break(BreakStatement {
                    break_keyword,
                    depth,
                    semicolon,
                })
            }
            SyntaxKind::ContinueKeyword => {
                let continue_keyword = self.next_token();
                let depth = self.parse_optional_operand();
                let semicolon = self.match_token(SyntaxKind::SemicolonToken);
                Statement::Continue(ContinueStatement {
                    continue_keyword,
                    depth,
                    semicolon,
                })
            }
            SyntaxKind::ReturnKeyword => {
                let return_keyword = self.next_token();
                let expression = self.parse_optional_operand();
                let semicolon = self.match_token(SyntaxKind::SemicolonToken);
                Statement::Return(ReturnStatement {
                    return_keyword,
                    expression,
                    semicolon,
                })
            }
            SyntaxKind::EchoKeyword | SyntaxKind::PrintKeyword => {
                let echo_keyword = self.next_token();
                let expression = self.parse_expression();
                let semicolon = self.match_token(SyntaxKind::SemicolonToken);
                Statement::Echo(EchoStatement {
                    echo_keyword,
                    expression: self.alloc(expression),
                    semicolon: Some(semicolon),
                })
            }
            SyntaxKind::InlineHtml => {
                let html = self.next_token();
                Statement::Echo(EchoStatement {
                    echo_keyword: Token::missing(SyntaxKind::EchoKeyword, html.pos),
                    expression: self.alloc(Expression::Literal(LiteralExpression { token: html })),
                    semicolon: None,
                })
            }
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::FunctionKeyword => Statement::Function(self.parse_function_declaration(&[])),
            SyntaxKind::ClassKeyword => Statement::Class(self.parse_class_declaration(&[])),
            kind if kind.is_modifier() && self.modifiers_precede_class() => {
                let modifiers = self.parse_modifiers();
                Statement::Class(self.parse_class_declaration(modifiers))
            }
            SyntaxKind::ConstKeyword => {
                let const_keyword = self.next_token();
                let name = self.match_token(SyntaxKind::Identifier);
                let equals_token = self.match_token(SyntaxKind::EqualsToken);
                let value = self.parse_assignment_expression();
                let semicolon = self.match_token(SyntaxKind::SemicolonToken);
                Statement::Const(ConstStatement {
                    const_keyword,
                    name,
                    equals_token,
                    value: self.alloc(value),
                    semicolon,
                })
            }
            SyntaxKind::NamespaceKeyword => {
                let namespace_keyword = self.next_token();
                let name = self.match_token(SyntaxKind::Identifier);
                let semicolon = self.match_token(SyntaxKind::SemicolonToken);
                Statement::Namespace(NamespaceStatement {
                    namespace_keyword,
                    name,
                    semicolon,
                })
            }
            SyntaxKind::SemicolonToken => Statement::Semicolon(SemicolonStatement {
                semicolon: self.next_token(),
            }),
            _ => {
                let expression = self.parse_expression();
                let semicolon = self.match_token(SyntaxKind::SemicolonToken);
                Statement::Expression(ExpressionStatement {
                    expression: self.alloc(expression),
                    semicolon,
                })
            }
        }
    }

    /// The operand of `break`, `continue` and `return`, if any.
    fn parse_optional_operand(&mut self) -> Option<&'a Expression<'a>> {
        match self.current_kind() {
            SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken => {
                None
            }
            _ => {
                let expression = self.parse_expression();
                Some(self.alloc(expression))
            }
        }
    }

    fn parse_block(&mut self) -> BlockStatement<'a> {
        let open_brace = self.match_token(SyntaxKind::OpenBraceToken);
        let statements = self.parse_statement_list(|kind| kind == SyntaxKind::CloseBraceToken);
        let close_brace = self.match_token(SyntaxKind::CloseBraceToken);
        BlockStatement {
            open_brace,
            statements,
            close_brace,
        }
    }

    /// Statements up to (not including) a token accepted by `is_end` or the
    /// end of the file. A statement that consumes nothing is skipped.
    fn parse_statement_list(&mut self, is_end: impl Fn(SyntaxKind) -> bool) -> &'a [Statement<'a>] {
        let mut statements = Vec::new();
        loop {
            let kind = self.current_kind();
            if kind == SyntaxKind::EndOfFileToken || is_end(kind) {
                break;
            }
            let start = self.position;
            let statement = self.parse_statement();
            if self.position == start {
                self.skip_unexpected_token();
                continue;
            }
            statements.push(statement);
        }
        self.alloc_slice(statements)
    }

    /// `if (...) stmt [elseif (...) stmt]* [else stmt]`. `keyword` is the
    /// already consumed `if` or `elseif`.
    fn parse_if_statement(&mut self, if_keyword: Token<'a>) -> IfStatement<'a> {
        let open_paren = self.match_token(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        let close_paren = self.match_token(SyntaxKind::CloseParenToken);
        let then_statement = self.parse_statement();

        let else_clause = match self.current_kind() {
            SyntaxKind::ElseIfKeyword => {
                let keyword = self.next_token();
                let nested = self.parse_if_statement(keyword);
                Some(ElseClause {
                    else_keyword: None,
                    statement: self.alloc(Statement::If(nested)),
                })
            }
            SyntaxKind::ElseKeyword => {
                let else_keyword = self.next_token();
                let statement = self.parse_statement();
                Some(ElseClause {
                    else_keyword: Some(else_keyword),
                    statement: self.alloc(statement),
                })
            }
            _ => None,
        };

        IfStatement {
            if_keyword,
            open_paren,
            condition: self.alloc(condition),
            close_paren,
            then_statement: self.alloc(then_statement),
            else_clause,
        }
    }

    fn parse_while_statement(&mut self) -> Statement<'a> {
        let while_keyword = self.next_token();
        let open_paren = self.match_token(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        let close_paren = self.match_token(SyntaxKind::CloseParenToken);
        let body = self.parse_statement();
        Statement::While(WhileStatement {
            while_keyword,
            open_paren,
            condition: self.alloc(condition),
            close_paren,
            body: self.alloc(body),
        })
    }

    fn parse_for_statement(&mut self) -> Statement<'a> {
        let for_keyword = self.next_token();
        let open_paren = self.match_token(SyntaxKind::OpenParenToken);
        let initializer = self.parse_for_clause(SyntaxKind::SemicolonToken);
        let first_semicolon = self.match_token(SyntaxKind::SemicolonToken);
        let condition = self.parse_for_clause(SyntaxKind::SemicolonToken);
        let second_semicolon = self.match_token(SyntaxKind::SemicolonToken);
        let incrementor = self.parse_for_clause(SyntaxKind::CloseParenToken);
        let close_paren = self.match_token(SyntaxKind::CloseParenToken);
        let body = self.parse_statement();
        Statement::For(ForStatement {
            for_keyword,
            open_paren,
            initializer,
            first_semicolon,
            condition,
            second_semicolon,
            incrementor,
            close_paren,
            body: self.alloc(body),
        })
    }

    fn parse_for_clause(&mut self, terminator: SyntaxKind) -> &'a Expression<'a> {
        let expression = if self.current_kind() == terminator {
            Expression::Empty(EmptyExpression {
                pos: self.current().pos,
            })
        } else {
            self.parse_expression()
        };
        self.alloc(expression)
    }

    fn parse_switch_statement(&mut self) -> Statement<'a> {
        let switch_keyword = self.next_token();
        let open_paren = self.match_token(SyntaxKind::OpenParenToken);
        let expression = self.parse_expression();
        let close_paren = self.match_token(SyntaxKind::CloseParenToken);
        let open_brace = self.match_token(SyntaxKind::OpenBraceToken);

        let mut cases = Vec::new();
        loop {
            match self.current_kind() {
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CaseKeyword => {
                    let keyword = self.next_token();
                    let test = self.parse_expression();
                    let test = self.alloc(test);
                    cases.push(self.parse_case_body(keyword, Some(test)));
                }
                SyntaxKind::DefaultKeyword => {
                    let keyword = self.next_token();
                    cases.push(self.parse_case_body(keyword, None));
                }
                _ => self.skip_unexpected_token(),
            }
        }

        let close_brace = self.match_token(SyntaxKind::CloseBraceToken);
        Statement::Switch(SwitchStatement {
            switch_keyword,
            open_paren,
            expression: self.alloc(expression),
            close_paren,
            open_brace,
            cases: self.alloc_slice(cases),
            close_brace,
        })
    }

    fn parse_case_body(
        &mut self,
        keyword: Token<'a>,
        expression: Option<&'a Expression<'a>>,
    ) -> CaseClause<'a> {
        let colon = match self.current_kind() {
            // `case 1;` is an accepted alternative spelling.
            SyntaxKind::SemicolonToken => self.next_token(),
            _ => self.match_token(SyntaxKind::ColonToken),
        };
        let statements = self.parse_statement_list(|kind| {
            matches!(
                kind,
                SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword | SyntaxKind::CloseBraceToken
            )
        });
        CaseClause {
            keyword,
            expression,
            colon,
            statements,
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn modifiers_precede_class(&self) -> bool {
        let mut offset = 0;
        while self.peek(offset).kind.is_modifier() {
            offset += 1;
        }
        self.peek(offset).kind == SyntaxKind::ClassKeyword
    }

    /// Collect any run of modifier keywords. Legality is checked by the binder.
    fn parse_modifiers(&mut self) -> &'a [Token<'a>] {
        let mut modifiers = Vec::new();
        while self.current_kind().is_modifier() {
            modifiers.push(self.next_token());
        }
        self.alloc_slice(modifiers)
    }

    fn parse_function_declaration(&mut self, modifiers: &'a [Token<'a>]) -> FunctionDeclaration<'a> {
        let function_keyword = self.match_token(SyntaxKind::FunctionKeyword);
        self.parse_function_rest(modifiers, function_keyword)
    }

    fn parse_function_rest(
        &mut self,
        modifiers: &'a [Token<'a>],
        function_keyword: Token<'a>,
    ) -> FunctionDeclaration<'a> {
        let name = self.match_token(SyntaxKind::Identifier);
        let open_paren = self.match_token(SyntaxKind::OpenParenToken);
        let parameters = self.parse_parameter_list();
        let close_paren = self.match_token(SyntaxKind::CloseParenToken);

        let return_type = match self.current_kind() {
            SyntaxKind::ColonToken => {
                let colon = self.next_token();
                Some(self.parse_type_clause(Some(colon)))
            }
            _ => None,
        };

        let (body, semicolon) = match self.current_kind() {
            SyntaxKind::SemicolonToken => (None, Some(self.next_token())),
            _ => (Some(self.parse_block()), None),
        };

        FunctionDeclaration {
            modifiers,
            function_keyword,
            name,
            open_paren,
            parameters,
            close_paren,
            return_type,
            body,
            semicolon,
        }
    }

    fn parse_parameter_list(&mut self) -> &'a [Parameter<'a>] {
        let mut parameters = Vec::new();
        loop {
            if matches!(
                self.current_kind(),
                SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
            ) {
                break;
            }
            let start = self.position;
            let type_clause = if self.at_type_start() {
                Some(self.parse_type_clause(None))
            } else {
                None
            };
            let name = self.match_token(SyntaxKind::Variable);
            let default_value = self.parse_optional_initializer();
            parameters.push(Parameter {
                type_clause,
                name,
                default_value,
            });

            if self.optional_token(SyntaxKind::CommaToken).is_none() {
                if self.position == start {
                    self.skip_unexpected_token();
                    continue;
                }
                break;
            }
        }
        self.alloc_slice(parameters)
    }

    fn parse_optional_initializer(&mut self) -> Option<Initializer<'a>> {
        let equals_token = self.optional_token(SyntaxKind::EqualsToken)?;
        let value = self.parse_assignment_expression();
        Some(Initializer {
            equals_token,
            value: self.alloc(value),
        })
    }

    fn at_type_start(&self) -> bool {
        match self.current_kind() {
            SyntaxKind::QuestionToken | SyntaxKind::ArrayKeyword | SyntaxKind::NullKeyword => true,
            SyntaxKind::Identifier => self.peek(1).kind != SyntaxKind::OpenParenToken,
            _ => false,
        }
    }

    fn parse_type_clause(&mut self, colon: Option<Token<'a>>) -> TypeClause<'a> {
        let question = self.optional_token(SyntaxKind::QuestionToken);
        let name = match self.current_kind() {
            SyntaxKind::Identifier
            | SyntaxKind::ArrayKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::StaticKeyword => self.next_token(),
            _ => self.match_token(SyntaxKind::Identifier),
        };
        TypeClause {
            colon,
            question,
            name,
        }
    }

    fn parse_class_declaration(&mut self, modifiers: &'a [Token<'a>]) -> ClassDeclaration<'a> {
        let class_keyword = self.match_token(SyntaxKind::ClassKeyword);
        let name = self.match_token(SyntaxKind::Identifier);

        let extends_clause = self
            .optional_token(SyntaxKind::ExtendsKeyword)
            .map(|keyword| {
                let base = self.match_token(SyntaxKind::Identifier);
                HeritageClause {
                    keyword,
                    names: self.alloc_slice(vec![base]),
                }
            });
        let implements_clause = self
            .optional_token(SyntaxKind::ImplementsKeyword)
            .map(|keyword| {
                let mut names = vec![self.match_token(SyntaxKind::Identifier)];
                while self.optional_token(SyntaxKind::CommaToken).is_some() {
                    names.push(self.match_token(SyntaxKind::Identifier));
                }
                HeritageClause {
                    keyword,
                    names: self.alloc_slice(names),
                }
            });

        let open_brace = self.match_token(SyntaxKind::OpenBraceToken);
        let mut methods = Vec::new();
        let mut properties = Vec::new();
        loop {
            match self.current_kind() {
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                }
                _ => match self.parse_class_member() {
                    Some(ClassMember::Method(method)) => methods.push(method),
                    Some(ClassMember::Property(property)) => properties.push(property),
                    None => {}
                },
            }
        }
        let close_brace = self.match_token(SyntaxKind::CloseBraceToken);

        ClassDeclaration {
            modifiers,
            class_keyword,
            name,
            extends_clause,
            implements_clause,
            open_brace,
            methods: self.alloc_slice(methods),
            properties: self.alloc_slice(properties),
            close_brace,
        }
    }

    /// A method if the member has a `function` keyword or its name is
    /// followed by `(`; a property otherwise.
    fn parse_class_member(&mut self) -> Option<ClassMember<'a>> {
        let modifiers = self.parse_modifiers();
        match self.current_kind() {
            SyntaxKind::FunctionKeyword => Some(ClassMember::Method(
                self.parse_function_declaration(modifiers),
            )),
            SyntaxKind::Identifier if self.peek(1).kind == SyntaxKind::OpenParenToken => {
                let function_keyword =
                    Token::missing(SyntaxKind::FunctionKeyword, self.current().pos);
                Some(ClassMember::Method(
                    self.parse_function_rest(modifiers, function_keyword),
                ))
            }
            SyntaxKind::ConstKeyword => {
                let const_keyword = self.next_token();
                let name = self.match_token(SyntaxKind::Identifier);
                let equals_token = self.match_token(SyntaxKind::EqualsToken);
                let value = self.parse_assignment_expression();
                let semicolon = self.match_token(SyntaxKind::SemicolonToken);
                Some(ClassMember::Property(PropertyDeclaration {
                    modifiers,
                    const_keyword: Some(const_keyword),
                    type_clause: None,
                    name,
                    initializer: Some(Initializer {
                        equals_token,
                        value: self.alloc(value),
                    }),
                    semicolon,
                }))
            }
            SyntaxKind::Variable => Some(ClassMember::Property(self.parse_property_rest(modifiers, None))),
            _ if self.at_type_start() => {
                let type_clause = self.parse_type_clause(None);
                Some(ClassMember::Property(
                    self.parse_property_rest(modifiers, Some(type_clause)),
                ))
            }
            _ => {
                let current = *self.current();
                self.error_at(
                    &current,
                    &messages::CLASS_MEMBER_EXPECTED_FOUND_0,
                    &[current.display_text()],
                );
                if current.kind != SyntaxKind::CloseBraceToken {
                    self.next_token();
                }
                None
            }
        }
    }

    fn parse_property_rest(
        &mut self,
        modifiers: &'a [Token<'a>],
        type_clause: Option<TypeClause<'a>>,
    ) -> PropertyDeclaration<'a> {
        let name = self.match_token(SyntaxKind::Variable);
        let initializer = self.parse_optional_initializer();
        let semicolon = self.match_token(SyntaxKind::SemicolonToken);
        PropertyDeclaration {
            modifiers,
            const_keyword: None,
            type_clause,
            name,
            initializer,
            semicolon,
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// A full expression, including comma lists.
    fn parse_expression(&mut self) -> Expression<'a> {
        let first = self.parse_assignment_expression();
        if self.current_kind() != SyntaxKind::CommaToken {
            return first;
        }

        let mut expressions = vec![first];
        let mut commas = Vec::new();
        while self.current_kind() == SyntaxKind::CommaToken {
            commas.push(self.next_token());
            expressions.push(self.parse_assignment_expression());
        }
        Expression::Comma(CommaExpression {
            expressions: self.alloc_slice(expressions),
            commas: self.alloc_slice(commas),
        })
    }

    /// A single expression. Assignment forms are recognized by lookahead;
    /// everything else goes through the binary parser.
    fn parse_assignment_expression(&mut self) -> Expression<'a> {
        if !self.enter_recursion() {
            return Expression::Empty(EmptyExpression {
                pos: self.current().pos,
            });
        }
        let expression = match self.assignment_shape() {
            Some(has_brackets) => self.parse_assignment(has_brackets),
            None => self.parse_binary_expression(OperatorPrecedence::None),
        };
        self.leave_recursion();
        expression
    }

    /// `Some(false)` for `name =` (or a compound operator), `Some(true)` for
    /// `$name[] =`, `None` if the tokens do not start an assignment.
    fn assignment_shape(&self) -> Option<bool> {
        let target = self.peek(0).kind;
        if !matches!(target, SyntaxKind::Identifier | SyntaxKind::Variable) {
            return None;
        }
        if self.peek(1).kind.is_assignment() {
            return Some(false);
        }
        let is_append = target == SyntaxKind::Variable
            && self.peek(1).kind == SyntaxKind::OpenBracketToken
            && self.peek(2).kind == SyntaxKind::CloseBracketToken
            && self.peek(3).kind == SyntaxKind::EqualsToken;
        is_append.then_some(true)
    }

    fn parse_assignment(&mut self, has_brackets: bool) -> Expression<'a> {
        let target = self.next_token();
        let append_brackets = if has_brackets {
            let open = self.next_token();
            let close = self.next_token();
            Some((open, close))
        } else {
            None
        };
        let operator_token = self.next_token();
        let value = self.parse_assignment_expression();
        Expression::Assignment(AssignmentExpression {
            target,
            append_brackets,
            operator_token,
            value: self.alloc(value),
        })
    }

    fn parse_binary_expression(&mut self, parent_precedence: OperatorPrecedence) -> Expression<'a> {
        self.parse_binary_expression_with(parent_precedence, false)
    }

    /// Precedence climbing. With `inclusive`, operators at exactly
    /// `parent_precedence` keep binding to the right.
    fn parse_binary_expression_with(
        &mut self,
        parent_precedence: OperatorPrecedence,
        inclusive: bool,
    ) -> Expression<'a> {
        let mut left = self.parse_unary_or_primary(parent_precedence);

        loop {
            let kind = self.current_kind();

            // Postfix after a member or call chain: `$this->count++`.
            if is_postfix_operator(kind) && parent_precedence < OperatorPrecedence::Postfix {
                let operator_token = self.next_token();
                left = Expression::Unary(UnaryExpression {
                    operator_token,
                    operand: self.alloc(left),
                    is_postfix: true,
                });
                continue;
            }

            let precedence = binary_operator_precedence(kind);
            if precedence == OperatorPrecedence::None
                || precedence < parent_precedence
                || (precedence == parent_precedence && !inclusive)
            {
                break;
            }

            left = match kind {
                SyntaxKind::OpenParenToken => self.parse_call_expression(left),
                SyntaxKind::OpenBracketToken => self.parse_element_access(left),
                SyntaxKind::MinusGreaterThanToken | SyntaxKind::ColonColonToken => {
                    let operator_token = self.next_token();
                    let member = self.parse_member_name();
                    Expression::Binary(BinaryExpression {
                        left: self.alloc(left),
                        operator_token,
                        right: self.alloc(member),
                        close_token: None,
                    })
                }
                _ => {
                    let operator_token = self.next_token();
                    let right = if kind.is_assignment() {
                        self.parse_assignment_expression()
                    } else if is_right_associative(kind) {
                        self.parse_binary_expression_with(precedence, true)
                    } else {
                        self.parse_binary_expression(precedence)
                    };
                    Expression::Binary(BinaryExpression {
                        left: self.alloc(left),
                        operator_token,
                        right: self.alloc(right),
                        close_token: None,
                    })
                }
            };
        }

        left
    }

    fn parse_unary_or_primary(&mut self, parent_precedence: OperatorPrecedence) -> Expression<'a> {
        // An assignment binds its operand position whatever the context:
        // `!$x = f()` and `$a && $b = 1` assign first.
        if let Some(has_brackets) = self.assignment_shape() {
            if parent_precedence > OperatorPrecedence::None {
                return self.parse_assignment(has_brackets);
            }
        }

        let (precedence, is_postfix) =
            unary_operator_precedence(self.current_kind(), self.peek(1).kind);
        if precedence == OperatorPrecedence::None || precedence < parent_precedence {
            return self.parse_primary_expression();
        }

        if is_postfix {
            let operand = self.parse_primary_expression();
            let operator_token = self.next_token();
            return Expression::Unary(UnaryExpression {
                operator_token,
                operand: self.alloc(operand),
                is_postfix: true,
            });
        }

        let operator_token = self.next_token();
        let operand = if self.enter_recursion() {
            let operand = self.parse_binary_expression(precedence);
            self.leave_recursion();
            operand
        } else {
            Expression::Empty(EmptyExpression {
                pos: self.current().pos,
            })
        };
        Expression::Unary(UnaryExpression {
            operator_token,
            operand: self.alloc(operand),
            is_postfix: false,
        })
    }

    /// `callee(args)`. The arguments are empty, a single expression, or a
    /// comma expression.
    fn parse_call_expression(&mut self, callee: Expression<'a>) -> Expression<'a> {
        let open_paren = self.next_token();
        let arguments = match self.current_kind() {
            SyntaxKind::CloseParenToken => Expression::Empty(EmptyExpression {
                pos: self.current().pos,
            }),
            _ => self.parse_expression(),
        };
        let close_paren = self.match_token(SyntaxKind::CloseParenToken);
        Expression::Binary(BinaryExpression {
            left: self.alloc(callee),
            operator_token: open_paren,
            right: self.alloc(arguments),
            close_token: Some(close_paren),
        })
    }

    fn parse_element_access(&mut self, target: Expression<'a>) -> Expression<'a> {
        let open_bracket = self.next_token();
        let index = match self.current_kind() {
            SyntaxKind::CloseBracketToken => Expression::Empty(EmptyExpression {
                pos: self.current().pos,
            }),
            _ => self.parse_expression(),
        };
        let close_bracket = self.match_token(SyntaxKind::CloseBracketToken);
        Expression::Binary(BinaryExpression {
            left: self.alloc(target),
            operator_token: open_bracket,
            right: self.alloc(index),
            close_token: Some(close_bracket),
        })
    }

    /// The right side of `->` or `::`: a property, method or constant name,
    /// or a `$static` property.
    fn parse_member_name(&mut self) -> Expression<'a> {
        let identifier = match self.current_kind() {
            SyntaxKind::Variable => self.next_token(),
            _ => self.match_token(SyntaxKind::Identifier),
        };
        Expression::Name(NameExpression { identifier })
    }

    fn parse_primary_expression(&mut self) -> Expression<'a> {
        match self.current_kind() {
            SyntaxKind::Identifier | SyntaxKind::Variable => Expression::Name(NameExpression {
                identifier: self.next_token(),
            }),
            SyntaxKind::IntegerLiteral
            | SyntaxKind::FloatLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword => Expression::Literal(LiteralExpression {
                token: self.next_token(),
            }),
            SyntaxKind::OpenParenToken => {
                let open_paren = self.next_token();
                let expression = match self.current_kind() {
                    SyntaxKind::CloseParenToken => Expression::Empty(EmptyExpression {
                        pos: self.current().pos,
                    }),
                    _ => self.parse_expression(),
                };
                let close_paren = self.match_token(SyntaxKind::CloseParenToken);
                Expression::Paren(ParenExpression {
                    open_paren,
                    expression: self.alloc(expression),
                    close_paren,
                })
            }
            SyntaxKind::OpenBracketToken => {
                let open_token = self.next_token();
                self.parse_array_elements(None, open_token, SyntaxKind::CloseBracketToken)
            }
            SyntaxKind::ArrayKeyword => {
                let array_keyword = self.next_token();
                let open_token = self.match_token(SyntaxKind::OpenParenToken);
                self.parse_array_elements(Some(array_keyword), open_token, SyntaxKind::CloseParenToken)
            }
            _ => {
                let current = *self.current();
                self.error_at(
                    &current,
                    &messages::EXPRESSION_EXPECTED_FOUND_0,
                    &[current.display_text()],
                );
                if !matches!(
                    current.kind,
                    SyntaxKind::SemicolonToken
                        | SyntaxKind::CloseBraceToken
                        | SyntaxKind::CloseParenToken
                        | SyntaxKind::CloseBracketToken
                        | SyntaxKind::CommaToken
                        | SyntaxKind::EndOfFileToken
                ) {
                    self.next_token();
                }
                Expression::Empty(EmptyExpression { pos: current.pos })
            }
        }
    }

    /// Elements of `[...]` or `array(...)`, with an optional trailing comma.
    fn parse_array_elements(
        &mut self,
        array_keyword: Option<Token<'a>>,
        open_token: Token<'a>,
        close_kind: SyntaxKind,
    ) -> Expression<'a> {
        let mut elements = Vec::new();
        while self.current_kind() != close_kind && self.current_kind() != SyntaxKind::EndOfFileToken {
            let start = self.position;
            elements.push(self.parse_assignment_expression());
            if self.optional_token(SyntaxKind::CommaToken).is_none() {
                break;
            }
            if self.position == start {
                break;
            }
        }
        let close_token = self.match_token(close_kind);
        Expression::ArrayLiteral(ArrayLiteralExpression {
            array_keyword,
            open_token,
            elements: self.alloc_slice(elements),
            close_token,
        })
    }
}

enum ClassMember<'a> {
    Method(FunctionDeclaration<'a>),
    Property(PropertyDeclaration<'a>),
}

/// Move function and class declarations ahead of the other statements in
/// their namespace segment, keeping relative order. A `namespace` statement
/// starts a new segment so declarations never cross into another namespace.
fn hoist_declarations(statements: Vec<Statement<'_>>) -> Vec<Statement<'_>> {
    if !statements.iter().any(Statement::is_hoisted_declaration) {
        return statements;
    }
    let mut result = Vec::with_capacity(statements.len());
    let mut declarations = Vec::new();
    let mut others = Vec::new();
    for statement in statements {
        if matches!(statement, Statement::Namespace(_)) {
            result.append(&mut declarations);
            result.append(&mut others);
            result.push(statement);
        } else if statement.is_hoisted_declaration() {
            declarations.push(statement);
        } else {
            others.push(statement);
        }
    }
    result.append(&mut declarations);
    result.append(&mut others);
    result
}
