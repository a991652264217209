//! phast_core: Core utilities shared by every stage of the phast compiler.
//!
//! Provides source spans, line maps, and the error type used when the
//! pipeline itself is incomplete (as opposed to errors in the user's program).

pub mod error;
pub mod text;

pub use error::InternalError;
pub use text::{LineAndColumn, LineMap, TextSpan};
