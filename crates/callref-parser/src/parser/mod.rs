//! Parsers and syntax tree storage.

use callref_common::Span;
use thiserror::Error;

pub mod declarations;
pub mod node;
pub mod node_arena;
pub mod scanner;
pub mod state_references;

/// A syntax error in a reference expression or a declaration stub.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message} at {span}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
