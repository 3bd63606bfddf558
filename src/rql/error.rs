use thiserror::Error;

/// Result type for RQL construction and encoding
pub type RqlResult<T> = Result<T, RqlError>;

/// Errors raised while building an RQL expression.
///
/// Both variants are programmer errors surfaced at the call site that built the
/// expression; nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RqlError {
    /// The value shape does not fit the operator (scalar vs. list)
    #[error("Cannot encode {found} value for `{op}`: expected {expected}")]
    EncodingType {
        op: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A path segment was requested on an expression that is already finalized
    #[error("Expression `{expression}` is already finalized and cannot be extended with `{segment}`")]
    InvalidPathContinuation { expression: String, segment: String },
}

impl RqlError {
    /// Create an encoding type error
    pub fn encoding_type(op: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::EncodingType {
            op: op.into(),
            expected,
            found,
        }
    }

    /// Create an invalid path continuation error
    pub fn invalid_path_continuation(
        expression: impl Into<String>,
        segment: impl Into<String>,
    ) -> Self {
        Self::InvalidPathContinuation {
            expression: expression.into(),
            segment: segment.into(),
        }
    }
}
