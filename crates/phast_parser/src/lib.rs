//! phast_parser: Precedence-climbing parser for PHP.
//!
//! Consumes a materialized token vector and builds an arena-allocated
//! [`SourceFile`](phast_ast::SourceFile). Syntax errors are reported to the
//! diagnostics sink and the parser resynchronizes; it never aborts except to
//! stop a file that makes no progress.

mod parser;
mod precedence;

pub use parser::{parse, parse_source, Parser};
pub use precedence::{binary_operator_precedence, unary_operator_precedence, OperatorPrecedence};
