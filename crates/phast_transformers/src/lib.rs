//! phast_transformers: Bound tree rewrites.
//!
//! - [`Transformer`]: copy-on-write traversal. A subtree no rule touches is
//!   returned as [`Rewrite::Same`], so callers keep the original `Rc`.
//! - [`Lowering`]: removes the source-only constructs (echo, concatenation,
//!   array literals, element access, static access, declarations that must
//!   be registered at runtime) before printing.

mod lowering;
mod transformer;

pub use lowering::{lower_file, Lowering};
pub use transformer::*;
