//! phast_scanner: Lexer for PHP source text.
//!
//! Produces the complete, materialized token stream the parser expects:
//! - inline HTML outside `<?php ... ?>`
//! - `$variables`, identifiers and `\`-qualified names
//! - case-insensitive keywords
//! - integer, float and string literals with escapes decoded
//!
//! Whitespace and comments are skipped; lexical errors become diagnostics.

mod char_codes;
mod scanner;

pub use scanner::{scan, Scanner};
