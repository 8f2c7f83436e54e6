//! Error types for the sigrate core primitives.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the core primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Degenerate or non-finite argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Index outside the live window of a history buffer.
    #[error("Index {index} outside valid range [{min}, {max}]")]
    OutOfRange {
        /// Requested global index.
        index: i64,
        /// Smallest valid index at the time of the request.
        min: i64,
        /// Largest valid index at the time of the request.
        max: i64,
    },
}

impl CoreError {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Check if this error rejects an argument.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this error rejects an index.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}
