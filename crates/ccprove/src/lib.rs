//! ccprove — congruence-closure based discharger for program
//! verification conditions.
//!
//! Proves machine-generated implications ("antecedent facts entail
//! goal") with a decision procedure for ground equality over
//! uninterpreted functions, extended with heuristically prioritized
//! instantiation of universally quantified theorems.
//!
//! # Pipeline
//!
//! 1. The front end (external) hands over typed expression trees per VC
//!    plus the theorem declarations in scope.
//! 2. [`theorem::build_pool`] pre-processes every theorem once,
//!    globally: equalities split into directional rewrites, degenerate
//!    entries dropped.
//! 3. [`prover::CongruenceClassProver::prove_all`] drives each VC
//!    through a bounded loop of congruence-aware matching
//!    ([`matcher`]), relevance ranking ([`prioritize`]), and fact
//!    absorption, against a private per-VC model from `ccprove-core`.
//! 4. Results stream to registered [`listener::ProverListener`]s and
//!    can be persisted as a `.cc.proof` artifact ([`report`]).
//!
//! The procedure is best-effort: it may answer "not proved" on a valid
//! goal, but absence of progress never turns into a false positive.
//!
//! # Example
//!
//! ```
//! use ccprove::prelude::*;
//!
//! let x = || Expr::symbol("x", Sort::Int);
//! let y = || Expr::symbol("y", Sort::Int);
//! let vc = Vc::new("symmetry", vec![Expr::eq(x(), y())], vec![Expr::eq(y(), x())]);
//!
//! let mut prover = CongruenceClassProver::new(&[], ProverConfig::default());
//! let summary = prover.prove_all(&[vc]);
//! assert_eq!(summary.proved_count(), 1);
//! ```

pub mod config;
pub mod error;
pub mod listener;
pub mod matcher;
pub mod prioritize;
pub mod prover;
pub mod report;
pub mod result;
pub mod theorem;

pub use config::{ProverConfig, DEFAULT_TIMEOUT_MS, MAX_ITERATIONS};
pub use error::{ProverError, ProverResult};
pub use listener::{Metrics, ProverListener};
pub use matcher::InsertExpWithJustification;
pub use prover::CongruenceClassProver;
pub use result::{RunSummary, TraceEntry, VcResult, VcState};
pub use theorem::Theorem;

/// Common imports for hosts embedding the prover.
pub mod prelude {
    pub use crate::config::ProverConfig;
    pub use crate::listener::{Metrics, ProverListener};
    pub use crate::prover::CongruenceClassProver;
    pub use crate::result::{RunSummary, VcResult, VcState};
    pub use ccprove_core::expr::{Expr, Quantification, TheoremDecl, Vc};
    pub use ccprove_core::sort::Sort;
}
