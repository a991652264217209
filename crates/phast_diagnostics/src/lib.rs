//! phast_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Diagnostics are never thrown. The scanner, parser and binder append them
//! to a shared [`DiagnosticCollection`] and keep going, so a single run reports
//! every local problem in a file.

use phast_core::text::TextSpan;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    /// The template. May contain `{0}`, `{1}`, ... placeholders.
    pub message: &'static str,
}

/// A realized diagnostic: a span plus the resolved message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub span: Option<TextSpan>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// A diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn with_location(
        file: Option<&str>,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: file.map(str::to_string),
            span: Some(span),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(span) = self.span {
                write!(f, "({})", span.start)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} PHP{}: {}", self.category, self.code, self.message_text)
    }
}

/// Replace `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// An append-only, ordered list of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    file: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection that stamps `file` onto every diagnostic it reports.
    pub fn for_file(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record a located diagnostic against this collection's file.
    pub fn report(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        let diagnostic = Diagnostic::with_location(self.file.as_deref(), span, message, args);
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort by file, then position. Stable, so diagnostics at the same
    /// position keep their report order.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.span.map(|s| s.start).cmp(&b.span.map(|s| s.start)))
        });
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1049)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1002, Error, "Unterminated string literal.");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1010, Error, "'*/' expected.");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1013, Error, "Invalid character '{0}'.");
    pub const INVALID_ESCAPE_SEQUENCE_0: DiagnosticMessage = diag!(1016, Error, "Invalid escape sequence '{0}'.");
    pub const INVALID_NUMERIC_LITERAL_0: DiagnosticMessage = diag!(1018, Error, "Invalid numeric literal '{0}'.");

    // ========================================================================
    // Parser errors (1050-1099)
    // ========================================================================
    pub const _0_EXPECTED: DiagnosticMessage = diag!(1055, Error, "'{0}' expected.");
    pub const _0_EXPECTED_FOUND_1: DiagnosticMessage = diag!(1056, Error, "'{0}' expected, found '{1}'.");
    pub const EXPRESSION_EXPECTED_FOUND_0: DiagnosticMessage = diag!(1057, Error, "Expression expected, found '{0}'.");
    pub const UNEXPECTED_TOKEN_0: DiagnosticMessage = diag!(1058, Error, "Unexpected token '{0}'.");
    pub const PARSING_STOPPED_AT_0: DiagnosticMessage = diag!(1059, Error, "Parsing stopped: no progress at '{0}'.");
    pub const CLASS_MEMBER_EXPECTED_FOUND_0: DiagnosticMessage = diag!(1061, Error, "Class member expected, found '{0}'.");

    // ========================================================================
    // Binder errors (2000-2099)
    // ========================================================================
    pub const TYPE_0_DOES_NOT_EXIST: DiagnosticMessage = diag!(2001, Error, "Type '{0}' does not exist.");
    pub const _0_IS_ALREADY_DECLARED: DiagnosticMessage = diag!(2002, Error, "'{0}' is already declared in this scope.");
    pub const CANNOT_ASSIGN_TO_0_BECAUSE_IT_IS_READ_ONLY: DiagnosticMessage = diag!(2003, Error, "Cannot assign to '{0}' because it is read-only.");
    pub const TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1: DiagnosticMessage = diag!(2004, Error, "Type '{0}' is not assignable to type '{1}'.");
    pub const OPERATOR_0_NOT_DEFINED_FOR_TYPES_1_AND_2: DiagnosticMessage = diag!(2005, Error, "Operator '{0}' is not defined for types '{1}' and '{2}'.");
    pub const OPERATOR_0_NOT_DEFINED_FOR_TYPE_1: DiagnosticMessage = diag!(2006, Error, "Operator '{0}' is not defined for type '{1}'.");
    pub const _0_IS_NOT_ALLOWED_OUTSIDE_A_LOOP_OR_SWITCH: DiagnosticMessage = diag!(2007, Error, "'{0}' is not allowed outside of a loop or switch.");
    pub const CANNOT_0_1_LEVELS: DiagnosticMessage = diag!(2008, Error, "Cannot '{0}' {1} levels: no matching loop or switch.");
    pub const MODIFIER_0_NOT_ALLOWED_ON_1: DiagnosticMessage = diag!(2009, Error, "Modifier '{0}' is not allowed on {1}.");
    pub const MODIFIERS_0_AND_1_CANNOT_BE_COMBINED: DiagnosticMessage = diag!(2010, Error, "Modifiers '{0}' and '{1}' cannot be combined.");
    pub const MODIFIER_0_ALREADY_SEEN: DiagnosticMessage = diag!(2011, Error, "Modifier '{0}' already seen.");
    pub const OPERATOR_0_CAN_ONLY_BE_APPLIED_TO_A_VARIABLE: DiagnosticMessage = diag!(2012, Error, "Operator '{0}' can only be applied to a variable.");
    pub const VARIABLE_NAME_EXPECTED: DiagnosticMessage = diag!(2013, Error, "Variable name expected.");
    pub const ABSTRACT_METHOD_0_CANNOT_HAVE_A_BODY: DiagnosticMessage = diag!(2014, Error, "Abstract method '{0}' cannot have a body.");
    pub const METHOD_0_REQUIRES_A_BODY: DiagnosticMessage = diag!(2015, Error, "Method '{0}' requires a body.");
    pub const INVALID_ASSIGNMENT_TARGET: DiagnosticMessage = diag!(2016, Error, "The left-hand side of an assignment must be a variable, property or array element.");
    pub const KEY_VALUE_PAIR_OUTSIDE_ARRAY_LITERAL: DiagnosticMessage = diag!(2017, Error, "'=>' is only allowed inside an array literal.");
    pub const _0_DEPTH_MUST_BE_A_POSITIVE_INTEGER: DiagnosticMessage = diag!(2018, Error, "'{0}' depth must be a positive integer literal.");
    pub const CANNOT_USE_0_AS_CLASS_NAME: DiagnosticMessage = diag!(2019, Error, "Cannot use '{0}' as a class name, it is reserved.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let text = format_message(messages::_0_EXPECTED_FOUND_1.message, &[";", "}"]);
        assert_eq!(text, "';' expected, found '}'.");
    }

    #[test]
    fn test_report_stamps_file() {
        let mut diags = DiagnosticCollection::for_file("index.php");
        diags.report(TextSpan::new(4, 2), &messages::UNEXPECTED_TOKEN_0, &["}"]);
        assert_eq!(diags.len(), 1);
        let d = &diags.diagnostics()[0];
        assert_eq!(d.file.as_deref(), Some("index.php"));
        assert_eq!(d.to_string(), "index.php(4): error PHP1058: Unexpected token '}'.");
    }

    #[test]
    fn test_sort_is_stable_by_position() {
        let mut diags = DiagnosticCollection::new();
        diags.report(TextSpan::new(9, 1), &messages::UNEXPECTED_TOKEN_0, &["a"]);
        diags.report(TextSpan::new(3, 1), &messages::UNEXPECTED_TOKEN_0, &["b"]);
        diags.report(TextSpan::new(3, 1), &messages::UNEXPECTED_TOKEN_0, &["c"]);
        diags.sort();
        let texts: Vec<_> = diags.diagnostics().iter().map(|d| d.message_text.as_str()).collect();
        assert_eq!(texts, ["Unexpected token 'b'.", "Unexpected token 'c'.", "Unexpected token 'a'."]);
    }
}
