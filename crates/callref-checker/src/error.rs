//! Internal invariant violations.
//!
//! User-facing problems are diagnostics recorded in the binding trace.
//! A `ResolveError` means an earlier stage handed resolution something
//! inconsistent, or the driver asked it to stop.

use callref_parser::NodeIndex;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Only classes have type parameters to omit; anything else reaching the
    /// bare-type path is a qualifier resolver bug.
    #[error("only classes can produce bare types, got '{classifier}'")]
    BareTypeNotAClass { classifier: String },

    #[error("unexpected node {node}: expected {expected}")]
    UnexpectedNode {
        node: NodeIndex,
        expected: &'static str,
    },

    #[error("resolution cancelled")]
    Cancelled,
}

pub type ResolveResult<T> = Result<T, ResolveError>;
