//! Operator resolution tables.
//!
//! Candidates are tried in order and the first match wins, so specific
//! entries come before general ones. A declared operand type of `any`
//! matches every operand, and an `any` operand matches every candidate.

use crate::symbols::Type;
use lazy_static::lazy_static;
use phast_ast::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperatorKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    Exponentiation,
    Concatenation,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    Coalesce,
    Equals,
    NotEquals,
    Identical,
    NotIdentical,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
    Assignment,
    /// `key => value` inside an array literal.
    KeyValue,
    FunctionCall,
    ElementAccess,
    MemberAccess,
    StaticMemberAccess,
}

#[derive(Debug)]
pub struct BinaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: BinaryOperatorKind,
    pub left_type: Type,
    pub right_type: Type,
    pub result_type: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperatorKind {
    Identity,
    Negation,
    LogicalNegation,
    OnesComplement,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    /// Postfix `?`, the null-safe marker in `$a?->b`.
    Optional,
    New,
}

#[derive(Debug)]
pub struct UnaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: UnaryOperatorKind,
    pub is_postfix: bool,
    pub operand_type: Type,
    pub result_type: Type,
}

impl BinaryOperatorKind {
    /// The operator as written in the emitted JavaScript. Bracketing and
    /// source-only kinds have no infix form.
    pub fn js_text(self) -> Option<&'static str> {
        Some(match self {
            BinaryOperatorKind::Addition => "+",
            BinaryOperatorKind::Subtraction => "-",
            BinaryOperatorKind::Multiplication => "*",
            BinaryOperatorKind::Division => "/",
            BinaryOperatorKind::Modulo => "%",
            BinaryOperatorKind::Exponentiation => "**",
            BinaryOperatorKind::BitwiseAnd => "&",
            BinaryOperatorKind::BitwiseOr => "|",
            BinaryOperatorKind::BitwiseXor => "^",
            BinaryOperatorKind::LogicalAnd => "&&",
            BinaryOperatorKind::LogicalOr => "||",
            BinaryOperatorKind::Coalesce => "??",
            BinaryOperatorKind::Equals => "==",
            BinaryOperatorKind::NotEquals => "!=",
            BinaryOperatorKind::Identical => "===",
            BinaryOperatorKind::NotIdentical => "!==",
            BinaryOperatorKind::Less => "<",
            BinaryOperatorKind::LessOrEquals => "<=",
            BinaryOperatorKind::Greater => ">",
            BinaryOperatorKind::GreaterOrEquals => ">=",
            BinaryOperatorKind::Assignment => "=",
            BinaryOperatorKind::Concatenation
            | BinaryOperatorKind::KeyValue
            | BinaryOperatorKind::FunctionCall
            | BinaryOperatorKind::ElementAccess
            | BinaryOperatorKind::MemberAccess
            | BinaryOperatorKind::StaticMemberAccess => return None,
        })
    }
}

fn binary(
    syntax_kind: SyntaxKind,
    kind: BinaryOperatorKind,
    left_type: Type,
    right_type: Type,
    result_type: Type,
) -> BinaryOperator {
    BinaryOperator {
        syntax_kind,
        kind,
        left_type,
        right_type,
        result_type,
    }
}

fn unary(
    syntax_kind: SyntaxKind,
    kind: UnaryOperatorKind,
    is_postfix: bool,
    operand_type: Type,
    result_type: Type,
) -> UnaryOperator {
    UnaryOperator {
        syntax_kind,
        kind,
        is_postfix,
        operand_type,
        result_type,
    }
}

lazy_static! {
    static ref BINARY_OPERATORS: Vec<BinaryOperator> = {
        use BinaryOperatorKind as K;
        use SyntaxKind as S;
        let (any, int, bool, string) = (Type::any(), Type::int(), Type::bool(), Type::string());
        let mut table = Vec::new();

        for (syntax, kind) in [
            (S::PlusToken, K::Addition),
            (S::MinusToken, K::Subtraction),
            (S::AsteriskToken, K::Multiplication),
            (S::SlashToken, K::Division),
            (S::PercentToken, K::Modulo),
            (S::AsteriskAsteriskToken, K::Exponentiation),
        ] {
            table.push(binary(syntax, kind, int.clone(), int.clone(), int.clone()));
        }
        for (syntax, kind) in [
            (S::AmpersandToken, K::BitwiseAnd),
            (S::BarToken, K::BitwiseOr),
            (S::CaretToken, K::BitwiseXor),
        ] {
            table.push(binary(syntax, kind, int.clone(), int.clone(), int.clone()));
            table.push(binary(syntax, kind, bool.clone(), bool.clone(), bool.clone()));
        }

        table.push(binary(S::DotToken, K::Concatenation, any.clone(), any.clone(), string.clone()));

        for (syntax, kind) in [
            (S::AmpersandAmpersandToken, K::LogicalAnd),
            (S::BarBarToken, K::LogicalOr),
        ] {
            table.push(binary(syntax, kind, any.clone(), any.clone(), bool.clone()));
        }
        table.push(binary(S::QuestionQuestionToken, K::Coalesce, any.clone(), any.clone(), any.clone()));

        for (syntax, kind) in [
            (S::EqualsEqualsToken, K::Equals),
            (S::ExclamationEqualsToken, K::NotEquals),
            (S::EqualsEqualsEqualsToken, K::Identical),
            (S::ExclamationEqualsEqualsToken, K::NotIdentical),
            (S::LessThanToken, K::Less),
            (S::LessThanEqualsToken, K::LessOrEquals),
            (S::GreaterThanToken, K::Greater),
            (S::GreaterThanEqualsToken, K::GreaterOrEquals),
        ] {
            table.push(binary(syntax, kind, any.clone(), any.clone(), bool.clone()));
        }

        table.push(binary(S::EqualsToken, K::Assignment, any.clone(), any.clone(), any.clone()));
        table.push(binary(S::EqualsGreaterThanToken, K::KeyValue, any.clone(), any.clone(), any.clone()));
        table.push(binary(S::MinusGreaterThanToken, K::MemberAccess, any.clone(), any.clone(), any.clone()));
        table.push(binary(S::ColonColonToken, K::StaticMemberAccess, any.clone(), any.clone(), any.clone()));
        table.push(binary(S::OpenBracketToken, K::ElementAccess, any.clone(), any.clone(), any.clone()));
        table.push(binary(S::OpenParenToken, K::FunctionCall, Type::function(), any.clone(), any.clone()));
        table.push(binary(S::OpenParenToken, K::FunctionCall, Type::class(), any.clone(), any.clone()));
        table
    };

    static ref UNARY_OPERATORS: Vec<UnaryOperator> = {
        use UnaryOperatorKind as K;
        use SyntaxKind as S;
        let (any, int, bool) = (Type::any(), Type::int(), Type::bool());
        vec![
            unary(S::ExclamationToken, K::LogicalNegation, false, any.clone(), bool),
            unary(S::PlusToken, K::Identity, false, int.clone(), int.clone()),
            unary(S::MinusToken, K::Negation, false, int.clone(), int.clone()),
            unary(S::TildeToken, K::OnesComplement, false, int.clone(), int.clone()),
            unary(S::PlusPlusToken, K::PreIncrement, false, int.clone(), int.clone()),
            unary(S::MinusMinusToken, K::PreDecrement, false, int.clone(), int.clone()),
            unary(S::PlusPlusToken, K::PostIncrement, true, int.clone(), int.clone()),
            unary(S::MinusMinusToken, K::PostDecrement, true, int.clone(), int),
            unary(S::QuestionToken, K::Optional, true, any.clone(), any.clone()),
            unary(S::NewKeyword, K::New, false, any.clone(), any),
        ]
    };
}

fn matches_type(declared: &Type, actual: &Type) -> bool {
    declared.is_any() || actual.is_any() || declared == actual
}

impl BinaryOperator {
    /// The first candidate for `syntax_kind` accepting both operand types.
    pub fn bind(syntax_kind: SyntaxKind, left: &Type, right: &Type) -> Option<&'static BinaryOperator> {
        BINARY_OPERATORS.iter().find(|op| {
            op.syntax_kind == syntax_kind
                && matches_type(&op.left_type, left)
                && matches_type(&op.right_type, right)
        })
    }

    fn first_of_kind(kind: BinaryOperatorKind) -> &'static BinaryOperator {
        BINARY_OPERATORS
            .iter()
            .find(|op| op.kind == kind)
            .unwrap_or_else(|| panic!("operator table has no {:?} entry", kind))
    }

    /// The native JavaScript `+` used for lowered concatenation.
    pub fn addition_any() -> &'static BinaryOperator {
        lazy_static! {
            static ref ADDITION: BinaryOperator = binary(
                SyntaxKind::PlusToken,
                BinaryOperatorKind::Addition,
                Type::any(),
                Type::any(),
                Type::any(),
            );
        }
        &ADDITION
    }

    pub fn call() -> &'static BinaryOperator {
        Self::first_of_kind(BinaryOperatorKind::FunctionCall)
    }

    pub fn member_access() -> &'static BinaryOperator {
        Self::first_of_kind(BinaryOperatorKind::MemberAccess)
    }

    pub fn assignment() -> &'static BinaryOperator {
        Self::first_of_kind(BinaryOperatorKind::Assignment)
    }
}

impl UnaryOperator {
    pub fn bind(syntax_kind: SyntaxKind, is_postfix: bool, operand: &Type) -> Option<&'static UnaryOperator> {
        UNARY_OPERATORS.iter().find(|op| {
            op.syntax_kind == syntax_kind
                && op.is_postfix == is_postfix
                && matches_type(&op.operand_type, operand)
        })
    }

    pub fn is_increment_or_decrement(&self) -> bool {
        matches!(
            self.kind,
            UnaryOperatorKind::PreIncrement
                | UnaryOperatorKind::PreDecrement
                | UnaryOperatorKind::PostIncrement
                | UnaryOperatorKind::PostDecrement
        )
    }

    /// The operator as written in the emitted JavaScript.
    pub fn js_text(&self) -> &'static str {
        match self.kind {
            UnaryOperatorKind::Identity => "+",
            UnaryOperatorKind::Negation => "-",
            UnaryOperatorKind::LogicalNegation => "!",
            UnaryOperatorKind::OnesComplement => "~",
            UnaryOperatorKind::PreIncrement | UnaryOperatorKind::PostIncrement => "++",
            UnaryOperatorKind::PreDecrement | UnaryOperatorKind::PostDecrement => "--",
            UnaryOperatorKind::Optional => "?",
            UnaryOperatorKind::New => "new",
        }
    }
}
