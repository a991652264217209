//! phast_ast: Syntax tree definitions for the phast compiler.
//!
//! Tokens, the `SyntaxKind` enum, declaration modifiers, and the
//! arena-allocated syntax nodes produced by the parser. Nodes store only
//! their tokens and children; spans are recovered by walking a node's
//! tokens (see [`visitor::span_of_statement`]).

pub mod modifiers;
pub mod node;
pub mod syntax_kind;
pub mod token;
pub mod visitor;

pub use modifiers::Modifiers;
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use token::{LiteralValue, Token};
