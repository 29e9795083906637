use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// A failed expectation about recorded invocations.
///
/// Indices are zero-based. `actual` and `expected` values are already
/// rendered for display (JSON, possibly truncated).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertionFailure {
    #[error("Expected to be called {expected} times, but was called {actual} times")]
    CountMismatch { expected: usize, actual: usize },
    #[error(
        "Expected {expected} parameters, but got {actual} parameters during invocation #{invocation}"
    )]
    ArityMismatch {
        invocation: usize,
        expected: usize,
        actual: usize,
    },
    #[error(
        "Parameter #{parameter} does not match the expected value (actual={actual},expected={expected}) during invocation #{invocation}"
    )]
    ValueMismatch {
        invocation: usize,
        parameter: usize,
        actual: String,
        expected: String,
    },
    #[error("This lambda should never be called, but was invoked with {arguments}")]
    UnexpectedInvocation { arguments: String },
}

impl AssertionFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CountMismatch { .. } => "count_mismatch",
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::ValueMismatch { .. } => "value_mismatch",
            Self::UnexpectedInvocation { .. } => "unexpected_invocation",
        }
    }
}
