//! Error types for building and parsing expressions.

use crate::operation::Operator;

/// Errors raised while constructing or parsing an expression.
///
/// These are caller errors: a malformed expression is rejected when it is
/// built and never reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// A translate step was built without a destination project space.
    #[error("translate operation requires a non-empty destination project space")]
    EmptyTranslateTarget,

    /// An operator that cannot chain onto a prior expression.
    #[error("operator {0} cannot be applied to a prior expression")]
    NotChainable(Operator),

    /// The canonical text form could not be parsed.
    #[error("parse error at byte {position} in {input:?}: {message}")]
    Parse {
        input: String,
        position: usize,
        message: String,
    },
}

impl ExpressionError {
    pub(crate) fn parse(input: &str, position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            position,
            message: message.into(),
        }
    }
}
