//! Operator precedence for binary and unary operators.

use phast_ast::syntax_kind::SyntaxKind;

/// Precedence tiers, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    None = 0,
    Assignment,
    /// `key => value` inside array literals.
    FatArrow,
    Coalesce,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Relational,
    /// `.` binds looser than `+`/`-`, so `"a" . 1 + 2` is `"a" . (1 + 2)`.
    Concatenation,
    Additive,
    Multiplicative,
    Exponentiation,
    Unary,
    Prefix,
    Postfix,
    /// `new` sits directly below call/member access so `new Foo(1)` keeps
    /// its argument list.
    New,
    /// Call `(`, element access `[`, `->` and `::`.
    FunctionCallMemberAccess,
}

/// Precedence of `kind` as an infix operator, or `None`.
pub fn binary_operator_precedence(kind: SyntaxKind) -> OperatorPrecedence {
    match kind {
        SyntaxKind::EqualsToken
        | SyntaxKind::PlusEqualsToken
        | SyntaxKind::MinusEqualsToken
        | SyntaxKind::AsteriskEqualsToken
        | SyntaxKind::SlashEqualsToken
        | SyntaxKind::DotEqualsToken => OperatorPrecedence::Assignment,
        SyntaxKind::EqualsGreaterThanToken => OperatorPrecedence::FatArrow,
        SyntaxKind::QuestionQuestionToken => OperatorPrecedence::Coalesce,
        SyntaxKind::BarBarToken => OperatorPrecedence::LogicalOr,
        SyntaxKind::AmpersandAmpersandToken => OperatorPrecedence::LogicalAnd,
        SyntaxKind::BarToken => OperatorPrecedence::BitwiseOr,
        SyntaxKind::CaretToken => OperatorPrecedence::BitwiseXor,
        SyntaxKind::AmpersandToken => OperatorPrecedence::BitwiseAnd,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken => OperatorPrecedence::Equality,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken => OperatorPrecedence::Relational,
        SyntaxKind::DotToken => OperatorPrecedence::Concatenation,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => OperatorPrecedence::Additive,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => {
            OperatorPrecedence::Multiplicative
        }
        SyntaxKind::AsteriskAsteriskToken => OperatorPrecedence::Exponentiation,
        SyntaxKind::OpenParenToken
        | SyntaxKind::OpenBracketToken
        | SyntaxKind::MinusGreaterThanToken
        | SyntaxKind::ColonColonToken => OperatorPrecedence::FunctionCallMemberAccess,
        _ => OperatorPrecedence::None,
    }
}

/// Operators whose right side is parsed as a full assignment expression.
pub fn is_right_associative(kind: SyntaxKind) -> bool {
    kind.is_assignment() || kind == SyntaxKind::AsteriskAsteriskToken || kind == SyntaxKind::QuestionQuestionToken
}

pub fn is_postfix_operator(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken | SyntaxKind::QuestionToken
    )
}

/// Unary precedence of the expression starting at `current`. A prefix
/// operator is keyed by `current`; a postfix operator is found by looking at
/// `next`, so `$a++` needs no grammar rule of its own. Returns the tier and
/// whether the operator is postfix.
pub fn unary_operator_precedence(
    current: SyntaxKind,
    next: SyntaxKind,
) -> (OperatorPrecedence, bool) {
    match current {
        SyntaxKind::PlusToken
        | SyntaxKind::MinusToken
        | SyntaxKind::ExclamationToken
        | SyntaxKind::TildeToken => (OperatorPrecedence::Unary, false),
        SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
            (OperatorPrecedence::Prefix, false)
        }
        SyntaxKind::NewKeyword => (OperatorPrecedence::New, false),
        SyntaxKind::Variable | SyntaxKind::Identifier if is_postfix_operator(next) => {
            (OperatorPrecedence::Postfix, true)
        }
        _ => (OperatorPrecedence::None, false),
    }
}
