//! Internal invariant errors.
//!
//! These never describe a problem in the user's program. They are raised when
//! a stage receives a tree shape an earlier stage was supposed to eliminate,
//! and abort compilation of the affected file.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// A node kind reached the emitter that the lowering pass must remove.
    #[error("internal error: `{kind}` node reached the emitter without being lowered")]
    UnloweredNode { kind: &'static str },

    /// A grammar or bound-kind combination that has no handler.
    #[error("internal error: unexpected {what} in {stage}")]
    Unreachable {
        what: String,
        stage: &'static str,
    },
}

impl InternalError {
    pub fn unlowered(kind: &'static str) -> Self {
        InternalError::UnloweredNode { kind }
    }

    pub fn unreachable(what: impl Into<String>, stage: &'static str) -> Self {
        InternalError::Unreachable {
            what: what.into(),
            stage,
        }
    }
}
