//! Error types for the core term model.

use thiserror::Error;

/// Errors raised while building or extending a congruence model.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A recognized operator was applied to the wrong number of
    /// operands; the front end handed over a malformed tree.
    #[error("malformed expression: operator `{op}` expects {expected} operands, got {actual}")]
    Arity {
        /// Offending operator name
        op: String,
        /// Required operand count
        expected: usize,
        /// Observed operand count
        actual: usize,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
