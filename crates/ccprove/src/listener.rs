//! Listener interface for embedding hosts.

use crate::result::VcResult;
use serde::{Deserialize, Serialize};

/// Timing metadata delivered alongside each VC result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Metrics {
    /// Wall-clock time the VC took
    pub elapsed_ms: u64,
    /// Budget the VC was given
    pub timeout_ms: u64,
}

/// Callback invoked once per VC as results become available.
///
/// Hosts that embed the prover (IDEs, build servers) register one of
/// these instead of polling the proof log.
pub trait ProverListener {
    /// Called after each VC's proof attempt terminates.
    fn vc_result(&mut self, result: &VcResult, metrics: Metrics);
}
