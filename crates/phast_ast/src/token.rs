//! Tokens produced by the scanner and consumed by the parser.

use crate::syntax_kind::SyntaxKind;
use phast_core::text::{TextPos, TextSpan};

/// The decoded value of a literal token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'a> {
    Int(i64),
    Float(f64),
    /// String contents with escapes already resolved.
    String(&'a str),
}

/// A token. `text` borrows the raw source slice (for string literals this
/// still includes the quotes); the decoded contents live in `value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub pos: TextPos,
    pub text: &'a str,
    pub value: Option<LiteralValue<'a>>,
}

impl<'a> Token<'a> {
    pub fn new(kind: SyntaxKind, pos: TextPos, text: &'a str) -> Self {
        Self {
            kind,
            pos,
            text,
            value: None,
        }
    }

    pub fn with_value(mut self, value: LiteralValue<'a>) -> Self {
        self.value = Some(value);
        self
    }

    /// A zero-width token the parser inserts when an expected token is absent.
    pub fn missing(kind: SyntaxKind, pos: TextPos) -> Self {
        Self::new(kind, pos, "")
    }

    pub fn is_missing(&self) -> bool {
        self.text.is_empty() && self.kind != SyntaxKind::EndOfFileToken
    }

    /// `[pos, pos + text.len())`, computed from the token on demand.
    #[inline]
    pub fn span(&self) -> TextSpan {
        TextSpan::new(self.pos, self.text.len() as TextPos)
    }

    /// The end offset, exclusive.
    #[inline]
    pub fn end(&self) -> TextPos {
        self.pos + self.text.len() as TextPos
    }

    pub fn string_value(&self) -> Option<&'a str> {
        match self.value {
            Some(LiteralValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn int_value(&self) -> Option<i64> {
        match self.value {
            Some(LiteralValue::Int(i)) => Some(i),
            _ => None,
        }
    }

    /// Text for diagnostics. Synthesized tokens show their kind instead.
    pub fn display_text(&self) -> &'a str {
        if self.is_missing() || self.kind == SyntaxKind::EndOfFileToken {
            self.kind.text()
        } else {
            self.text
        }
    }
}
