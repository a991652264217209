//! Syntax node definitions.
//!
//! Every node is allocated in the parser's arena and is immutable once built.
//! Nodes keep the tokens they were parsed from, which is all that is needed
//! to recover a source span (see `visitor::span_of_*`).

use crate::syntax_kind::SyntaxKind;
use crate::token::Token;
use phast_core::text::TextPos;

// ============================================================================
// Source File
// ============================================================================

#[derive(Debug)]
pub struct SourceFile<'a> {
    pub file_name: &'a str,
    pub statements: &'a [Statement<'a>],
    pub end_of_file_token: Token<'a>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum Expression<'a> {
    Binary(BinaryExpression<'a>),
    Unary(UnaryExpression<'a>),
    Name(NameExpression<'a>),
    Literal(LiteralExpression<'a>),
    Paren(ParenExpression<'a>),
    Comma(CommaExpression<'a>),
    Assignment(AssignmentExpression<'a>),
    Empty(EmptyExpression),
    ArrayLiteral(ArrayLiteralExpression<'a>),
}

impl<'a> Expression<'a> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Binary(_) => "BinaryExpression",
            Expression::Unary(_) => "UnaryExpression",
            Expression::Name(_) => "NameExpression",
            Expression::Literal(_) => "LiteralExpression",
            Expression::Paren(_) => "ParenExpression",
            Expression::Comma(_) => "CommaExpression",
            Expression::Assignment(_) => "AssignmentExpression",
            Expression::Empty(_) => "EmptyExpression",
            Expression::ArrayLiteral(_) => "ArrayLiteralExpression",
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn skip_parens(&self) -> &Expression<'a> {
        let mut expr = self;
        while let Expression::Paren(p) = expr {
            expr = p.expression;
        }
        expr
    }
}

/// An infix expression. Call `(`, element access `[`, member access `->`,
/// static access `::` and `=>` pairs are all represented this way; the
/// bracketing forms also record their closing token.
#[derive(Debug)]
pub struct BinaryExpression<'a> {
    pub left: &'a Expression<'a>,
    pub operator_token: Token<'a>,
    pub right: &'a Expression<'a>,
    pub close_token: Option<Token<'a>>,
}

#[derive(Debug)]
pub struct UnaryExpression<'a> {
    pub operator_token: Token<'a>,
    pub operand: &'a Expression<'a>,
    pub is_postfix: bool,
}

/// A bare identifier, qualified name, or `$variable`.
#[derive(Debug)]
pub struct NameExpression<'a> {
    pub identifier: Token<'a>,
}

impl<'a> NameExpression<'a> {
    pub fn is_variable(&self) -> bool {
        self.identifier.kind == SyntaxKind::Variable
    }
}

/// Integer, float, string, `true`, `false` or `null`.
#[derive(Debug)]
pub struct LiteralExpression<'a> {
    pub token: Token<'a>,
}

#[derive(Debug)]
pub struct ParenExpression<'a> {
    pub open_paren: Token<'a>,
    pub expression: &'a Expression<'a>,
    pub close_paren: Token<'a>,
}

/// A comma-separated list, used for call arguments and `echo a, b`.
#[derive(Debug)]
pub struct CommaExpression<'a> {
    pub expressions: &'a [Expression<'a>],
    pub commas: &'a [Token<'a>],
}

/// `name = value`, `$name = value`, `$name[] = value`, or a compound form
/// such as `$name .= value`.
#[derive(Debug)]
pub struct AssignmentExpression<'a> {
    pub target: Token<'a>,
    /// The `[` `]` pair of the append form.
    pub append_brackets: Option<(Token<'a>, Token<'a>)>,
    pub operator_token: Token<'a>,
    pub value: &'a Expression<'a>,
}

/// An omitted expression, e.g. empty call arguments or `for (;;)` clauses.
#[derive(Debug, Clone, Copy)]
pub struct EmptyExpression {
    pub pos: TextPos,
}

#[derive(Debug)]
pub struct ArrayLiteralExpression<'a> {
    /// `array` in the `array(...)` spelling.
    pub array_keyword: Option<Token<'a>>,
    pub open_token: Token<'a>,
    /// Plain values or `key => value` binary expressions.
    pub elements: &'a [Expression<'a>],
    pub close_token: Token<'a>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Statement<'a> {
    Block(BlockStatement<'a>),
    If(IfStatement<'a>),
    While(WhileStatement<'a>),
    For(ForStatement<'a>),
    Break(BreakStatement<'a>),
    Continue(ContinueStatement<'a>),
    Return(ReturnStatement<'a>),
    Echo(EchoStatement<'a>),
    Switch(SwitchStatement<'a>),
    Expression(ExpressionStatement<'a>),
    Semicolon(SemicolonStatement<'a>),
    Class(ClassDeclaration<'a>),
    Function(FunctionDeclaration<'a>),
    Const(ConstStatement<'a>),
    Namespace(NamespaceStatement<'a>),
}

impl<'a> Statement<'a> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Block(_) => "BlockStatement",
            Statement::If(_) => "IfStatement",
            Statement::While(_) => "WhileStatement",
            Statement::For(_) => "ForStatement",
            Statement::Break(_) => "BreakStatement",
            Statement::Continue(_) => "ContinueStatement",
            Statement::Return(_) => "ReturnStatement",
            Statement::Echo(_) => "EchoStatement",
            Statement::Switch(_) => "SwitchStatement",
            Statement::Expression(_) => "ExpressionStatement",
            Statement::Semicolon(_) => "SemicolonStatement",
            Statement::Class(_) => "ClassDeclaration",
            Statement::Function(_) => "FunctionDeclaration",
            Statement::Const(_) => "ConstStatement",
            Statement::Namespace(_) => "NamespaceStatement",
        }
    }

    /// Declarations that are visible before their textual position.
    pub fn is_hoisted_declaration(&self) -> bool {
        matches!(self, Statement::Function(_) | Statement::Class(_))
    }
}

#[derive(Debug)]
pub struct BlockStatement<'a> {
    pub open_brace: Token<'a>,
    pub statements: &'a [Statement<'a>],
    pub close_brace: Token<'a>,
}

#[derive(Debug)]
pub struct IfStatement<'a> {
    /// `if`, or `elseif` for an `if` nested in an else clause.
    pub if_keyword: Token<'a>,
    pub open_paren: Token<'a>,
    pub condition: &'a Expression<'a>,
    pub close_paren: Token<'a>,
    pub then_statement: &'a Statement<'a>,
    pub else_clause: Option<ElseClause<'a>>,
}

#[derive(Debug)]
pub struct ElseClause<'a> {
    /// Absent when the clause came from `elseif`; the nested `if` then
    /// carries the keyword.
    pub else_keyword: Option<Token<'a>>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct WhileStatement<'a> {
    pub while_keyword: Token<'a>,
    pub open_paren: Token<'a>,
    pub condition: &'a Expression<'a>,
    pub close_paren: Token<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct ForStatement<'a> {
    pub for_keyword: Token<'a>,
    pub open_paren: Token<'a>,
    pub initializer: &'a Expression<'a>,
    pub first_semicolon: Token<'a>,
    pub condition: &'a Expression<'a>,
    pub second_semicolon: Token<'a>,
    pub incrementor: &'a Expression<'a>,
    pub close_paren: Token<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct BreakStatement<'a> {
    pub break_keyword: Token<'a>,
    /// The depth of `break N`. The binder requires a positive integer literal.
    pub depth: Option<&'a Expression<'a>>,
    pub semicolon: Token<'a>,
}

#[derive(Debug)]
pub struct ContinueStatement<'a> {
    pub continue_keyword: Token<'a>,
    pub depth: Option<&'a Expression<'a>>,
    pub semicolon: Token<'a>,
}

#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub return_keyword: Token<'a>,
    pub expression: Option<&'a Expression<'a>>,
    pub semicolon: Token<'a>,
}

/// `echo a, b;`, `print a;`, or a run of inline HTML.
#[derive(Debug)]
pub struct EchoStatement<'a> {
    pub echo_keyword: Token<'a>,
    pub expression: &'a Expression<'a>,
    pub semicolon: Option<Token<'a>>,
}

#[derive(Debug)]
pub struct SwitchStatement<'a> {
    pub switch_keyword: Token<'a>,
    pub open_paren: Token<'a>,
    pub expression: &'a Expression<'a>,
    pub close_paren: Token<'a>,
    pub open_brace: Token<'a>,
    pub cases: &'a [CaseClause<'a>],
    pub close_brace: Token<'a>,
}

/// `case expr:` or `default:` followed by its statements.
#[derive(Debug)]
pub struct CaseClause<'a> {
    pub keyword: Token<'a>,
    /// `None` for `default`.
    pub expression: Option<&'a Expression<'a>>,
    pub colon: Token<'a>,
    pub statements: &'a [Statement<'a>],
}

#[derive(Debug)]
pub struct ExpressionStatement<'a> {
    pub expression: &'a Expression<'a>,
    pub semicolon: Token<'a>,
}

/// A stray `;` (or a `?>` close tag).
#[derive(Debug)]
pub struct SemicolonStatement<'a> {
    pub semicolon: Token<'a>,
}

#[derive(Debug)]
pub struct ConstStatement<'a> {
    pub const_keyword: Token<'a>,
    pub name: Token<'a>,
    pub equals_token: Token<'a>,
    pub value: &'a Expression<'a>,
    pub semicolon: Token<'a>,
}

#[derive(Debug)]
pub struct NamespaceStatement<'a> {
    pub namespace_keyword: Token<'a>,
    pub name: Token<'a>,
    pub semicolon: Token<'a>,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug)]
pub struct ClassDeclaration<'a> {
    pub modifiers: &'a [Token<'a>],
    pub class_keyword: Token<'a>,
    pub name: Token<'a>,
    pub extends_clause: Option<HeritageClause<'a>>,
    pub implements_clause: Option<HeritageClause<'a>>,
    pub open_brace: Token<'a>,
    pub methods: &'a [FunctionDeclaration<'a>],
    pub properties: &'a [PropertyDeclaration<'a>],
    pub close_brace: Token<'a>,
}

/// `extends Base` or `implements A, B`.
#[derive(Debug)]
pub struct HeritageClause<'a> {
    pub keyword: Token<'a>,
    pub names: &'a [Token<'a>],
}

/// A free function or a class method.
#[derive(Debug)]
pub struct FunctionDeclaration<'a> {
    pub modifiers: &'a [Token<'a>],
    pub function_keyword: Token<'a>,
    pub name: Token<'a>,
    pub open_paren: Token<'a>,
    pub parameters: &'a [Parameter<'a>],
    pub close_paren: Token<'a>,
    pub return_type: Option<TypeClause<'a>>,
    /// `None` for an abstract method terminated by `;`.
    pub body: Option<BlockStatement<'a>>,
    pub semicolon: Option<Token<'a>>,
}

#[derive(Debug)]
pub struct PropertyDeclaration<'a> {
    pub modifiers: &'a [Token<'a>],
    /// Present for class constants (`const NAME = value;`).
    pub const_keyword: Option<Token<'a>>,
    pub type_clause: Option<TypeClause<'a>>,
    pub name: Token<'a>,
    pub initializer: Option<Initializer<'a>>,
    pub semicolon: Token<'a>,
}

#[derive(Debug)]
pub struct Parameter<'a> {
    pub type_clause: Option<TypeClause<'a>>,
    pub name: Token<'a>,
    pub default_value: Option<Initializer<'a>>,
}

#[derive(Debug)]
pub struct Initializer<'a> {
    pub equals_token: Token<'a>,
    pub value: &'a Expression<'a>,
}

/// A type annotation: `int $x`, `?Foo $x`, or `: string` after a parameter list.
#[derive(Debug)]
pub struct TypeClause<'a> {
    pub colon: Option<Token<'a>>,
    pub question: Option<Token<'a>>,
    pub name: Token<'a>,
}
