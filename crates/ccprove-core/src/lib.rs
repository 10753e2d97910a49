//! ccprove-core — term model and congruence-closure state for the
//! ccprove VC discharger.
//!
//! This crate provides the foundational pieces shared by the prover:
//! - Expression trees as handed over by the front end ([`expr`])
//! - Sorts and overload tagging ([`sort`])
//! - Interned term arena with precomputed hashes ([`term`])
//! - Canonicalization into the minimal primitive vocabulary ([`canon`])
//! - Union-find symbol registry ([`registry`])
//! - Per-VC congruence model with a decidable proved predicate
//!   ([`conjunct`])
//!
//! The search itself (theorem instantiation, prioritization, proof
//! loop) lives in the `ccprove` crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canon;
pub mod conjunct;
pub mod error;
pub mod expr;
pub mod registry;
pub mod sort;
pub mod term;

pub use canon::{canonicalize, canonicalize_expr};
pub use conjunct::Conjunct;
pub use error::{CoreError, CoreResult};
pub use expr::{Expr, Quantification, TheoremDecl, Vc};
pub use registry::{Registry, SymbolId};
pub use sort::Sort;
pub use term::{is_literal_name, TermArgs, TermId, TermStore};
