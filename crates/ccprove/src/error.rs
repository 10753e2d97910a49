//! Error types for the prover.

use ccprove_core::CoreError;
use thiserror::Error;

/// Prover errors.
///
/// Algorithmic failures on a single theorem or VC are not surfaced
/// here — they are logged and the offending item is excluded, per the
/// best-effort contract. Only host-facing failures (proof-log I/O,
/// malformed core input passed straight through an API) become errors.
#[derive(Debug, Error)]
pub enum ProverError {
    /// Writing the proof-log artifact failed. Proof results are still
    /// available in memory and via listeners.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A malformed expression escaped the front end.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for prover operations.
pub type ProverResult<T> = Result<T, ProverError>;
