//! The PHP scanner.
//!
//! Works on bytes and slices the source text directly, so every token's
//! `text` borrows from the input. Decoded string contents that differ from
//! the source (because of escapes) are copied into the arena.

use crate::char_codes::*;
use bumpalo::Bump;
use memchr::memmem;
use phast_ast::syntax_kind::{keyword_from_str, SyntaxKind};
use phast_ast::token::{LiteralValue, Token};
use phast_core::text::{TextPos, TextSpan};
use phast_diagnostics::messages;
use phast_diagnostics::DiagnosticCollection;

/// Scan `text` into a token vector ending with `EndOfFileToken`.
pub fn scan<'a>(
    arena: &'a Bump,
    text: &'a str,
    diagnostics: &mut DiagnosticCollection,
) -> Vec<Token<'a>> {
    let mut scanner = Scanner::new(arena, text, diagnostics);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.scan();
        let done = token.kind == SyntaxKind::EndOfFileToken;
        tokens.push(token);
        if done {
            break;
        }
    }
    tokens
}

pub struct Scanner<'a, 'd> {
    arena: &'a Bump,
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Inside `<?php ... ?>`.
    in_php: bool,
    /// Previous token kind; member names after `->`/`::` are never keywords.
    previous: SyntaxKind,
    diagnostics: &'d mut DiagnosticCollection,
}

impl<'a, 'd> Scanner<'a, 'd> {
    pub fn new(arena: &'a Bump, text: &'a str, diagnostics: &'d mut DiagnosticCollection) -> Self {
        Self {
            arena,
            text,
            bytes: text.as_bytes(),
            pos: 0,
            in_php: false,
            previous: SyntaxKind::Unknown,
            diagnostics,
        }
    }

    /// Scan the next token.
    pub fn scan(&mut self) -> Token<'a> {
        let token = if self.in_php {
            self.scan_php()
        } else {
            self.scan_inline_html()
        };
        self.previous = token.kind;
        token
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline]
    fn peek(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn token(&self, kind: SyntaxKind, start: usize) -> Token<'a> {
        Token::new(kind, start as TextPos, &self.text[start..self.pos])
    }

    fn report(&mut self, start: usize, message: &phast_diagnostics::DiagnosticMessage, args: &[&str]) {
        let span = TextSpan::from_bounds(start as TextPos, self.pos.max(start) as TextPos);
        self.diagnostics.report(span, message, args);
    }

    // ========================================================================
    // Inline HTML
    // ========================================================================

    fn scan_inline_html(&mut self) -> Token<'a> {
        let start = self.pos;
        if self.is_eof() {
            return self.token(SyntaxKind::EndOfFileToken, start);
        }
        let rest = &self.bytes[self.pos..];
        match memmem::find(rest, OPEN_TAG) {
            Some(0) => {
                self.pos += OPEN_TAG.len();
                self.in_php = true;
                self.scan_php()
            }
            Some(offset) => {
                self.pos += offset;
                let html = &self.text[start..self.pos];
                self.token(SyntaxKind::InlineHtml, start)
                    .with_value(LiteralValue::String(html))
            }
            None => {
                self.pos = self.bytes.len();
                let html = &self.text[start..];
                self.token(SyntaxKind::InlineHtml, start)
                    .with_value(LiteralValue::String(html))
            }
        }
    }

    // ========================================================================
    // PHP mode
    // ========================================================================

    fn scan_php(&mut self) -> Token<'a> {
        self.skip_trivia();
        let start = self.pos;
        if self.is_eof() {
            return self.token(SyntaxKind::EndOfFileToken, start);
        }

        let b = self.bytes[self.pos];
        let kind = match b {
            b'(' => self.single(SyntaxKind::OpenParenToken),
            b')' => self.single(SyntaxKind::CloseParenToken),
            b'{' => self.single(SyntaxKind::OpenBraceToken),
            b'}' => self.single(SyntaxKind::CloseBraceToken),
            b'[' => self.single(SyntaxKind::OpenBracketToken),
            b']' => self.single(SyntaxKind::CloseBracketToken),
            b';' => self.single(SyntaxKind::SemicolonToken),
            b',' => self.single(SyntaxKind::CommaToken),
            b'~' => self.single(SyntaxKind::TildeToken),
            b'@' => self.single(SyntaxKind::AtToken),
            b'^' => self.single(SyntaxKind::CaretToken),
            b'%' => self.single(SyntaxKind::PercentToken),
            b':' => self.either(b':', SyntaxKind::ColonColonToken, SyntaxKind::ColonToken),
            b'&' => self.either(b'&', SyntaxKind::AmpersandAmpersandToken, SyntaxKind::AmpersandToken),
            b'|' => self.either(b'|', SyntaxKind::BarBarToken, SyntaxKind::BarToken),
            b'/' => self.either(b'=', SyntaxKind::SlashEqualsToken, SyntaxKind::SlashToken),
            b'.' if is_digit(self.peek(1)) => return self.scan_number(start),
            b'.' => self.either(b'=', SyntaxKind::DotEqualsToken, SyntaxKind::DotToken),
            b'?' => return self.scan_question(start),
            b'<' => self.either(b'=', SyntaxKind::LessThanEqualsToken, SyntaxKind::LessThanToken),
            b'>' => self.either(b'=', SyntaxKind::GreaterThanEqualsToken, SyntaxKind::GreaterThanToken),
            b'=' => self.scan_equals(),
            b'!' => self.scan_exclamation(),
            b'+' => self.scan_plus(),
            b'-' => self.scan_minus(),
            b'*' => self.scan_asterisk(),
            b'\'' => return self.scan_single_quoted(start),
            b'"' => return self.scan_double_quoted(start),
            b'$' => return self.scan_variable(start),
            b'\\' => return self.scan_name(start),
            b'0'..=b'9' => return self.scan_number(start),
            _ => match self.current_char() {
                Some(ch) if is_identifier_start(ch) => return self.scan_name(start),
                Some(ch) => {
                    self.pos += ch.len_utf8();
                    let text = ch.to_string();
                    self.report(start, &messages::INVALID_CHARACTER, &[&text]);
                    SyntaxKind::Unknown
                }
                None => {
                    self.pos += 1;
                    SyntaxKind::Unknown
                }
            },
        };
        self.token(kind, start)
    }

    fn skip_trivia(&mut self) {
        while !self.is_eof() {
            let b = self.bytes[self.pos];
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'#' || (b == b'/' && self.peek(1) == b'/') {
                self.skip_line_comment();
            } else if b == b'/' && self.peek(1) == b'*' {
                self.skip_block_comment();
            } else {
                break;
            }
        }
    }

    /// A line comment ends at a newline or just before a `?>` close tag.
    fn skip_line_comment(&mut self) {
        let rest = &self.bytes[self.pos..];
        let newline = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
        let close = memmem::find(&rest[..newline], CLOSE_TAG).unwrap_or(newline);
        self.pos += close;
    }

    fn skip_block_comment(&mut self) {
        let start = self.pos;
        let rest = &self.bytes[self.pos + 2..];
        match memmem::find(rest, b"*/") {
            Some(offset) => self.pos += 2 + offset + 2,
            None => {
                self.pos = self.bytes.len();
                self.report(start, &messages::UNTERMINATED_COMMENT, &[]);
            }
        }
    }

    #[inline]
    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    /// One-byte token, or two-byte token when followed by `next`.
    #[inline]
    fn either(&mut self, next: u8, double: SyntaxKind, single: SyntaxKind) -> SyntaxKind {
        if self.peek(1) == next {
            self.pos += 2;
            double
        } else {
            self.pos += 1;
            single
        }
    }

    fn scan_question(&mut self, start: usize) -> Token<'a> {
        match self.peek(1) {
            b'>' => {
                // `?>` ends the statement and returns to HTML. One newline
                // directly after the tag belongs to the tag.
                self.pos += 2;
                let token = self.token(SyntaxKind::SemicolonToken, start);
                if self.peek(0) == b'\n' {
                    self.pos += 1;
                } else if self.peek(0) == b'\r' && self.peek(1) == b'\n' {
                    self.pos += 2;
                }
                self.in_php = false;
                token
            }
            b'?' => {
                self.pos += 2;
                self.token(SyntaxKind::QuestionQuestionToken, start)
            }
            _ => {
                self.pos += 1;
                self.token(SyntaxKind::QuestionToken, start)
            }
        }
    }

    fn scan_equals(&mut self) -> SyntaxKind {
        match (self.peek(1), self.peek(2)) {
            (b'=', b'=') => {
                self.pos += 3;
                SyntaxKind::EqualsEqualsEqualsToken
            }
            (b'=', _) => {
                self.pos += 2;
                SyntaxKind::EqualsEqualsToken
            }
            (b'>', _) => {
                self.pos += 2;
                SyntaxKind::EqualsGreaterThanToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::EqualsToken
            }
        }
    }

    fn scan_exclamation(&mut self) -> SyntaxKind {
        match (self.peek(1), self.peek(2)) {
            (b'=', b'=') => {
                self.pos += 3;
                SyntaxKind::ExclamationEqualsEqualsToken
            }
            (b'=', _) => {
                self.pos += 2;
                SyntaxKind::ExclamationEqualsToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::ExclamationToken
            }
        }
    }

    fn scan_plus(&mut self) -> SyntaxKind {
        match self.peek(1) {
            b'+' => {
                self.pos += 2;
                SyntaxKind::PlusPlusToken
            }
            b'=' => {
                self.pos += 2;
                SyntaxKind::PlusEqualsToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::PlusToken
            }
        }
    }

    fn scan_minus(&mut self) -> SyntaxKind {
        match self.peek(1) {
            b'-' => {
                self.pos += 2;
                SyntaxKind::MinusMinusToken
            }
            b'=' => {
                self.pos += 2;
                SyntaxKind::MinusEqualsToken
            }
            b'>' => {
                self.pos += 2;
                SyntaxKind::MinusGreaterThanToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::MinusToken
            }
        }
    }

    fn scan_asterisk(&mut self) -> SyntaxKind {
        match self.peek(1) {
            b'*' => {
                self.pos += 2;
                SyntaxKind::AsteriskAsteriskToken
            }
            b'=' => {
                self.pos += 2;
                SyntaxKind::AsteriskEqualsToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::AsteriskToken
            }
        }
    }

    // ========================================================================
    // Names
    // ========================================================================

    fn eat_identifier(&mut self) -> bool {
        match self.current_char() {
            Some(ch) if is_identifier_start(ch) => self.pos += ch.len_utf8(),
            _ => return false,
        }
        while let Some(ch) = self.current_char() {
            if !is_identifier_part(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        true
    }

    /// Identifier, keyword, or qualified name such as `\App\Model\User`.
    fn scan_name(&mut self, start: usize) -> Token<'a> {
        let mut qualified = false;
        if self.peek(0) == b'\\' {
            self.pos += 1;
            qualified = true;
        }
        if !self.eat_identifier() {
            self.report(start, &messages::INVALID_CHARACTER, &["\\"]);
            return self.token(SyntaxKind::Unknown, start);
        }
        while self.peek(0) == b'\\' {
            let save = self.pos;
            self.pos += 1;
            if !self.eat_identifier() {
                self.pos = save;
                break;
            }
            qualified = true;
        }

        let text = &self.text[start..self.pos];
        let member_name = matches!(
            self.previous,
            SyntaxKind::MinusGreaterThanToken | SyntaxKind::ColonColonToken
        );
        let kind = if qualified || member_name {
            SyntaxKind::Identifier
        } else {
            keyword_from_str(text).unwrap_or(SyntaxKind::Identifier)
        };
        self.token(kind, start)
    }

    fn scan_variable(&mut self, start: usize) -> Token<'a> {
        self.pos += 1;
        if !self.eat_identifier() {
            self.report(start, &messages::INVALID_CHARACTER, &["$"]);
            return self.token(SyntaxKind::Unknown, start);
        }
        self.token(SyntaxKind::Variable, start)
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    fn eat_digits(&mut self, pred: fn(u8) -> bool) {
        while !self.is_eof() && (pred(self.bytes[self.pos]) || self.bytes[self.pos] == b'_') {
            self.pos += 1;
        }
    }

    fn scan_number(&mut self, start: usize) -> Token<'a> {
        if self.peek(0) == b'0' && matches!(self.peek(1), b'x' | b'X') && is_hex_digit(self.peek(2)) {
            self.pos += 2;
            self.eat_digits(is_hex_digit);
            let text = &self.text[start..self.pos];
            let digits: String = text[2..].chars().filter(|c| *c != '_').collect();
            return match i64::from_str_radix(&digits, 16) {
                Ok(value) => self
                    .token(SyntaxKind::IntegerLiteral, start)
                    .with_value(LiteralValue::Int(value)),
                Err(_) => self.invalid_number(start),
            };
        }

        let mut is_float = false;
        self.eat_digits(is_digit);
        if self.peek(0) == b'.' && is_digit(self.peek(1)) {
            is_float = true;
            self.pos += 1;
            self.eat_digits(is_digit);
        }
        if matches!(self.peek(0), b'e' | b'E') {
            let sign = usize::from(matches!(self.peek(1), b'+' | b'-'));
            if is_digit(self.peek(1 + sign)) {
                is_float = true;
                self.pos += 1 + sign;
                self.eat_digits(is_digit);
            }
        }

        let text = &self.text[start..self.pos];
        let cleaned: String = text.chars().filter(|c| *c != '_').collect();
        if !is_float {
            if let Ok(value) = cleaned.parse::<i64>() {
                return self
                    .token(SyntaxKind::IntegerLiteral, start)
                    .with_value(LiteralValue::Int(value));
            }
        }
        // Integers that overflow become floats, as in the source language.
        match cleaned.parse::<f64>() {
            Ok(value) => self
                .token(SyntaxKind::FloatLiteral, start)
                .with_value(LiteralValue::Float(value)),
            Err(_) => self.invalid_number(start),
        }
    }

    fn invalid_number(&mut self, start: usize) -> Token<'a> {
        let text = self.text[start..self.pos].to_string();
        self.report(start, &messages::INVALID_NUMERIC_LITERAL_0, &[&text]);
        self.token(SyntaxKind::IntegerLiteral, start)
            .with_value(LiteralValue::Int(0))
    }

    // ========================================================================
    // Strings
    // ========================================================================

    fn scan_single_quoted(&mut self, start: usize) -> Token<'a> {
        self.pos += 1;
        let content_start = self.pos;
        let mut value = String::new();
        let mut has_escape = false;
        let mut terminated = false;
        loop {
            if self.is_eof() {
                self.report(start, &messages::UNTERMINATED_STRING_LITERAL, &[]);
                break;
            }
            let b = self.bytes[self.pos];
            if b == b'\'' {
                self.pos += 1;
                terminated = true;
                break;
            }
            if b == b'\\' && matches!(self.peek(1), b'\'' | b'\\') {
                has_escape = true;
                value.push(self.peek(1) as char);
                self.pos += 2;
                continue;
            }
            let ch = self.current_char().unwrap_or('\0');
            value.push(ch);
            self.pos += ch.len_utf8();
        }
        self.finish_string(start, content_start, value, has_escape, terminated)
    }

    fn scan_double_quoted(&mut self, start: usize) -> Token<'a> {
        self.pos += 1;
        let content_start = self.pos;
        let mut value = String::new();
        let mut has_escape = false;
        let mut terminated = false;
        loop {
            if self.is_eof() {
                self.report(start, &messages::UNTERMINATED_STRING_LITERAL, &[]);
                break;
            }
            let b = self.bytes[self.pos];
            if b == b'"' {
                self.pos += 1;
                terminated = true;
                break;
            }
            if b == b'\\' {
                has_escape = true;
                self.scan_escape(&mut value);
                continue;
            }
            let ch = self.current_char().unwrap_or('\0');
            value.push(ch);
            self.pos += ch.len_utf8();
        }
        self.finish_string(start, content_start, value, has_escape, terminated)
    }

    fn finish_string(
        &mut self,
        start: usize,
        content_start: usize,
        value: String,
        has_escape: bool,
        terminated: bool,
    ) -> Token<'a> {
        let decoded: &'a str = if has_escape {
            self.arena.alloc_str(&value)
        } else {
            // Unescaped contents are a plain slice of the source.
            let content_end = if terminated { self.pos - 1 } else { self.pos };
            &self.text[content_start..content_end]
        };
        self.token(SyntaxKind::StringLiteral, start)
            .with_value(LiteralValue::String(decoded))
    }

    /// Decode one escape sequence in a double-quoted string. The cursor is on
    /// the backslash.
    fn scan_escape(&mut self, out: &mut String) {
        let start = self.pos;
        self.pos += 1;
        if self.is_eof() {
            out.push('\\');
            return;
        }
        let b = self.bytes[self.pos];
        let simple = match b {
            b'n' => Some('\n'),
            b't' => Some('\t'),
            b'r' => Some('\r'),
            b'v' => Some('\x0b'),
            b'e' => Some('\x1b'),
            b'f' => Some('\x0c'),
            b'\\' => Some('\\'),
            b'$' => Some('$'),
            b'"' => Some('"'),
            _ => None,
        };
        if let Some(ch) = simple {
            out.push(ch);
            self.pos += 1;
            return;
        }

        match b {
            b'0'..=b'7' => {
                let digits_start = self.pos;
                while self.pos - digits_start < 3 && is_octal_digit(self.peek(0)) {
                    self.pos += 1;
                }
                let code = u32::from_str_radix(&self.text[digits_start..self.pos], 8).unwrap_or(0);
                out.push(char::from_u32(code & 0xff).unwrap_or('\0'));
            }
            b'x' if is_hex_digit(self.peek(1)) => {
                self.pos += 1;
                let digits_start = self.pos;
                while self.pos - digits_start < 2 && is_hex_digit(self.peek(0)) {
                    self.pos += 1;
                }
                let code = u32::from_str_radix(&self.text[digits_start..self.pos], 16).unwrap_or(0);
                out.push(char::from_u32(code).unwrap_or('\0'));
            }
            b'u' if self.peek(1) == b'{' => {
                self.pos += 2;
                let digits_start = self.pos;
                while is_hex_digit(self.peek(0)) {
                    self.pos += 1;
                }
                let digits = &self.text[digits_start..self.pos];
                let closed = self.peek(0) == b'}';
                if closed {
                    self.pos += 1;
                }
                let decoded = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32);
                match decoded {
                    Some(ch) if closed => out.push(ch),
                    _ => {
                        let escape = self.text[start..self.pos].to_string();
                        self.report(start, &messages::INVALID_ESCAPE_SEQUENCE_0, &[&escape]);
                        out.push_str(&escape);
                    }
                }
            }
            _ => {
                // Unknown escapes are kept verbatim.
                out.push('\\');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        let arena = Bump::new();
        let mut diagnostics = DiagnosticCollection::new();
        scan(&arena, source, &mut diagnostics)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_open_tag_is_skipped() {
        assert_eq!(
            kinds("<?php echo 1;"),
            vec![
                SyntaxKind::EchoKeyword,
                SyntaxKind::IntegerLiteral,
                SyntaxKind::SemicolonToken,
                SyntaxKind::EndOfFileToken,
            ]
        );
    }

    #[test]
    fn test_member_name_is_not_keyword() {
        assert_eq!(
            kinds("<?php Foo::class; $a->print"),
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::ColonColonToken,
                SyntaxKind::Identifier,
                SyntaxKind::SemicolonToken,
                SyntaxKind::Variable,
                SyntaxKind::MinusGreaterThanToken,
                SyntaxKind::Identifier,
                SyntaxKind::EndOfFileToken,
            ]
        );
    }
}
