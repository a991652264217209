//! SyntaxKind enum: every token kind the scanner can produce.

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown = 0,
    EndOfFileToken,
    /// Raw text outside `<?php ... ?>`.
    InlineHtml,

    // Literals
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,

    // Names
    Identifier,
    /// A `$name` token. The text includes the sigil.
    Variable,

    // Punctuation
    OpenParenToken,
    CloseParenToken,
    OpenBraceToken,
    CloseBraceToken,
    OpenBracketToken,
    CloseBracketToken,
    SemicolonToken,
    CommaToken,
    ColonToken,
    QuestionToken,
    AtToken,

    // Operators
    PlusToken,
    MinusToken,
    AsteriskToken,
    AsteriskAsteriskToken,
    SlashToken,
    PercentToken,
    DotToken,
    PlusPlusToken,
    MinusMinusToken,
    ExclamationToken,
    TildeToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    AmpersandAmpersandToken,
    BarBarToken,
    QuestionQuestionToken,
    EqualsEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsToken,
    ExclamationEqualsEqualsToken,
    LessThanToken,
    LessThanEqualsToken,
    GreaterThanToken,
    GreaterThanEqualsToken,
    /// `->`
    MinusGreaterThanToken,
    /// `::`
    ColonColonToken,
    /// `=>`
    EqualsGreaterThanToken,

    // Assignment
    EqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,
    DotEqualsToken,

    // ========================================================================
    // Keywords
    // ========================================================================
    AbstractKeyword,
    ArrayKeyword,
    BreakKeyword,
    CaseKeyword,
    ClassKeyword,
    ConstKeyword,
    ContinueKeyword,
    DefaultKeyword,
    EchoKeyword,
    ElseKeyword,
    ElseIfKeyword,
    ExtendsKeyword,
    FalseKeyword,
    FinalKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    ImplementsKeyword,
    NamespaceKeyword,
    NewKeyword,
    NullKeyword,
    PrintKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    ReadonlyKeyword,
    ReturnKeyword,
    StaticKeyword,
    SwitchKeyword,
    TrueKeyword,
    WhileKeyword,
}

impl SyntaxKind {
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::AbstractKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::WhileKeyword;

    pub fn is_keyword(self) -> bool {
        self >= Self::FIRST_KEYWORD && self <= Self::LAST_KEYWORD
    }

    /// Keywords that double as modifiers on classes and class members.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::AbstractKeyword
                | SyntaxKind::FinalKeyword
                | SyntaxKind::PublicKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::ReadonlyKeyword
        )
    }

    /// Compound assignment tokens and the binary operator each desugars to.
    pub fn compound_assignment_operator(self) -> Option<SyntaxKind> {
        match self {
            SyntaxKind::PlusEqualsToken => Some(SyntaxKind::PlusToken),
            SyntaxKind::MinusEqualsToken => Some(SyntaxKind::MinusToken),
            SyntaxKind::AsteriskEqualsToken => Some(SyntaxKind::AsteriskToken),
            SyntaxKind::SlashEqualsToken => Some(SyntaxKind::SlashToken),
            SyntaxKind::DotEqualsToken => Some(SyntaxKind::DotToken),
            _ => None,
        }
    }

    pub fn is_assignment(self) -> bool {
        self == SyntaxKind::EqualsToken || self.compound_assignment_operator().is_some()
    }

    /// The fixed source text of a punctuation, operator or keyword token.
    /// Used in diagnostics and for tokens the parser synthesizes.
    pub fn text(self) -> &'static str {
        match self {
            SyntaxKind::Unknown => "unknown",
            SyntaxKind::EndOfFileToken => "end of file",
            SyntaxKind::InlineHtml => "inline html",
            SyntaxKind::IntegerLiteral => "integer",
            SyntaxKind::FloatLiteral => "float",
            SyntaxKind::StringLiteral => "string",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::Variable => "variable",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::OpenBracketToken => "[",
            SyntaxKind::CloseBracketToken => "]",
            SyntaxKind::SemicolonToken => ";",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::ColonToken => ":",
            SyntaxKind::QuestionToken => "?",
            SyntaxKind::AtToken => "@",
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::AsteriskAsteriskToken => "**",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::PercentToken => "%",
            SyntaxKind::DotToken => ".",
            SyntaxKind::PlusPlusToken => "++",
            SyntaxKind::MinusMinusToken => "--",
            SyntaxKind::ExclamationToken => "!",
            SyntaxKind::TildeToken => "~",
            SyntaxKind::AmpersandToken => "&",
            SyntaxKind::BarToken => "|",
            SyntaxKind::CaretToken => "^",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::BarBarToken => "||",
            SyntaxKind::QuestionQuestionToken => "??",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::EqualsEqualsEqualsToken => "===",
            SyntaxKind::ExclamationEqualsToken => "!=",
            SyntaxKind::ExclamationEqualsEqualsToken => "!==",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::LessThanEqualsToken => "<=",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::GreaterThanEqualsToken => ">=",
            SyntaxKind::MinusGreaterThanToken => "->",
            SyntaxKind::ColonColonToken => "::",
            SyntaxKind::EqualsGreaterThanToken => "=>",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::PlusEqualsToken => "+=",
            SyntaxKind::MinusEqualsToken => "-=",
            SyntaxKind::AsteriskEqualsToken => "*=",
            SyntaxKind::SlashEqualsToken => "/=",
            SyntaxKind::DotEqualsToken => ".=",
            SyntaxKind::AbstractKeyword => "abstract",
            SyntaxKind::ArrayKeyword => "array",
            SyntaxKind::BreakKeyword => "break",
            SyntaxKind::CaseKeyword => "case",
            SyntaxKind::ClassKeyword => "class",
            SyntaxKind::ConstKeyword => "const",
            SyntaxKind::ContinueKeyword => "continue",
            SyntaxKind::DefaultKeyword => "default",
            SyntaxKind::EchoKeyword => "echo",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::ElseIfKeyword => "elseif",
            SyntaxKind::ExtendsKeyword => "extends",
            SyntaxKind::FalseKeyword => "false",
            SyntaxKind::FinalKeyword => "final",
            SyntaxKind::ForKeyword => "for",
            SyntaxKind::FunctionKeyword => "function",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::ImplementsKeyword => "implements",
            SyntaxKind::NamespaceKeyword => "namespace",
            SyntaxKind::NewKeyword => "new",
            SyntaxKind::NullKeyword => "null",
            SyntaxKind::PrintKeyword => "print",
            SyntaxKind::PrivateKeyword => "private",
            SyntaxKind::ProtectedKeyword => "protected",
            SyntaxKind::PublicKeyword => "public",
            SyntaxKind::ReadonlyKeyword => "readonly",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::StaticKeyword => "static",
            SyntaxKind::SwitchKeyword => "switch",
            SyntaxKind::TrueKeyword => "true",
            SyntaxKind::WhileKeyword => "while",
        }
    }
}

/// Look up a keyword. Keywords are case-insensitive in the source language.
pub fn keyword_from_str(text: &str) -> Option<SyntaxKind> {
    if text.len() > 10 || !text.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let lower = text.to_ascii_lowercase();
    Some(match lower.as_str() {
        "abstract" => SyntaxKind::AbstractKeyword,
        "array" => SyntaxKind::ArrayKeyword,
        "break" => SyntaxKind::BreakKeyword,
        "case" => SyntaxKind::CaseKeyword,
        "class" => SyntaxKind::ClassKeyword,
        "const" => SyntaxKind::ConstKeyword,
        "continue" => SyntaxKind::ContinueKeyword,
        "default" => SyntaxKind::DefaultKeyword,
        "echo" => SyntaxKind::EchoKeyword,
        "else" => SyntaxKind::ElseKeyword,
        "elseif" => SyntaxKind::ElseIfKeyword,
        "extends" => SyntaxKind::ExtendsKeyword,
        "false" => SyntaxKind::FalseKeyword,
        "final" => SyntaxKind::FinalKeyword,
        "for" => SyntaxKind::ForKeyword,
        "function" => SyntaxKind::FunctionKeyword,
        "if" => SyntaxKind::IfKeyword,
        "implements" => SyntaxKind::ImplementsKeyword,
        "namespace" => SyntaxKind::NamespaceKeyword,
        "new" => SyntaxKind::NewKeyword,
        "null" => SyntaxKind::NullKeyword,
        "print" => SyntaxKind::PrintKeyword,
        "private" => SyntaxKind::PrivateKeyword,
        "protected" => SyntaxKind::ProtectedKeyword,
        "public" => SyntaxKind::PublicKeyword,
        "readonly" => SyntaxKind::ReadonlyKeyword,
        "return" => SyntaxKind::ReturnKeyword,
        "static" => SyntaxKind::StaticKeyword,
        "switch" => SyntaxKind::SwitchKeyword,
        "true" => SyntaxKind::TrueKeyword,
        "while" => SyntaxKind::WhileKeyword,
        _ => return None,
    })
}
