//! Per-VC outcomes and run summaries.

use serde::{Deserialize, Serialize};

/// Proof-loop state for one VC.
///
/// `Unstarted` and `Iterating` are transient; the other three are
/// terminal and appear in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VcState {
    /// Not yet picked up by the proof loop
    Unstarted,
    /// Proof loop in progress
    Iterating,
    /// Goal entailed by the accumulated facts
    Proved,
    /// Fixpoint or iteration cap reached with time to spare
    Exhausted,
    /// Per-VC deadline elapsed before the goal was entailed
    TimedOut,
}

/// One inserted theorem instantiation, for the human-readable trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Name of the justifying theorem
    pub theorem: String,
    /// Rendered instantiated fact that was asserted
    pub fact: String,
    /// Relevance score the instantiation was ranked at
    pub score: i64,
}

/// Result snapshot for one VC, handed to listeners and the proof log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcResult {
    /// VC name
    pub name: String,
    /// Terminal proof-loop state
    pub state: VcState,
    /// Whether the goal was entailed
    pub proved: bool,
    /// Number of completed proof-loop iterations
    pub iterations: usize,
    /// Wall-clock time spent on this VC
    pub elapsed_ms: u64,
    /// Configured per-VC budget
    pub timeout_ms: u64,
    /// Model rendering before any theorem application
    pub before: String,
    /// Model rendering when the loop stopped
    pub after: String,
    /// Inserted instantiations, in insertion order
    pub trace: Vec<TraceEntry>,
}

/// Accumulated outcomes for a whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Per-VC results in input order
    pub results: Vec<VcResult>,
}

impl RunSummary {
    /// Number of proved VCs.
    #[must_use]
    pub fn proved_count(&self) -> usize {
        self.results.iter().filter(|r| r.proved).count()
    }

    /// Number of VCs that were not proved.
    #[must_use]
    pub fn unproved_count(&self) -> usize {
        self.results.len() - self.proved_count()
    }
}
