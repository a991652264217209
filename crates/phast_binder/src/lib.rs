//! phast_binder: Name resolution, scopes and types for the bound tree.
//!
//! The binder walks a parsed [`SourceFile`](phast_ast::SourceFile) and builds
//! a [`BoundFile`]: names carry resolved symbols, operators carry resolved
//! operator entries, and loop bodies carry their break/continue labels.
//! Undeclared names are not an error; they bind to an `any` placeholder.

mod binder;
pub mod bound;
pub mod builtins;
mod dump;
pub mod operators;
mod scope;
pub mod symbols;

pub use binder::{bind, Binder};
pub use bound::*;
pub use dump::bound_tree_dump;
pub use operators::{BinaryOperator, BinaryOperatorKind, UnaryOperator, UnaryOperatorKind};
pub use scope::{Scope, ScopeRef};
pub use symbols::{SymbolKind, SymbolRef, Type, VariableSymbol};
