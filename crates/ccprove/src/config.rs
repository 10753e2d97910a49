//! Prover configuration.

use serde::{Deserialize, Serialize};

/// Per-VC time budget when the host does not configure one.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Iteration cap for one VC's proof loop.
pub const MAX_ITERATIONS: usize = 256;

/// Prover configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Wall-clock budget per VC, in milliseconds.
    pub timeout_ms: u64,
    /// Iteration cap per VC.
    pub max_iterations: usize,
    /// Whether the proof log dumps the full model and trace for VCs
    /// that were not proved (only the outcome line otherwise).
    pub show_results_if_not_proved: bool,
}

impl Default for ProverConfig {
    fn default() -> Self {
        ProverConfig {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_iterations: MAX_ITERATIONS,
            show_results_if_not_proved: true,
        }
    }
}

impl ProverConfig {
    /// Configuration with a specific per-VC timeout.
    #[must_use]
    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        ProverConfig {
            timeout_ms,
            ..Self::default()
        }
    }
}
