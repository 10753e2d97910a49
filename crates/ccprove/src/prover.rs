//! Proof loop orchestrator.
//!
//! Drives every VC through the same bounded search: build a fresh
//! congruence model, prefilter the global theorem pool down to lemmas
//! whose required operators actually occur in the VC, then iterate —
//! collect candidate instantiations, rank them by goal relevance, and
//! absorb the best ones — until the goal is entailed, the batch runs
//! dry, the iteration cap is hit, or the per-VC deadline expires.
//!
//! VCs are processed sequentially and independently; each owns a
//! private model/registry pair, while the theorem pool is built once
//! and only ever read. Everything the search marks as "applied" is
//! scoped to the VC at hand.

use crate::config::ProverConfig;
use crate::listener::{Metrics, ProverListener};
use crate::matcher;
use crate::prioritize::Ranking;
use crate::result::{RunSummary, TraceEntry, VcResult, VcState};
use crate::theorem::{build_pool, Theorem};
use ccprove_core::conjunct::Conjunct;
use ccprove_core::expr::{TheoremDecl, Vc};
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::{Duration, Instant};

/// Congruence-closure based prover over a fixed theorem pool.
pub struct CongruenceClassProver {
    theorems: Vec<Theorem>,
    config: ProverConfig,
    listeners: Vec<Box<dyn ProverListener>>,
}

impl CongruenceClassProver {
    /// Build the prover, pre-processing every in-scope theorem once.
    pub fn new(decls: &[TheoremDecl], config: ProverConfig) -> Self {
        let theorems = build_pool(decls);
        tracing::debug!(
            declared = decls.len(),
            usable = theorems.len(),
            "theorem pool built"
        );
        CongruenceClassProver {
            theorems,
            config,
            listeners: Vec::new(),
        }
    }

    /// The pre-processed theorem pool.
    pub fn theorems(&self) -> &[Theorem] {
        &self.theorems
    }

    /// Active configuration.
    pub fn config(&self) -> &ProverConfig {
        &self.config
    }

    /// Register a listener notified after each VC.
    pub fn add_listener(&mut self, listener: Box<dyn ProverListener>) {
        self.listeners.push(listener);
    }

    /// Drop all registered listeners.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Prove every VC in order, notifying listeners as results land.
    pub fn prove_all(&mut self, vcs: &[Vc]) -> RunSummary {
        let mut summary = RunSummary::default();
        for vc in vcs {
            let result = self.prove_vc(vc);
            let metrics = Metrics {
                elapsed_ms: result.elapsed_ms,
                timeout_ms: self.config.timeout_ms,
            };
            for listener in &mut self.listeners {
                listener.vc_result(&result, metrics);
            }
            tracing::debug!(
                vc = %result.name,
                proved = result.proved,
                iterations = result.iterations,
                elapsed_ms = result.elapsed_ms,
                "vc finished"
            );
            summary.results.push(result);
        }
        summary
    }

    /// Run the bounded proof loop for one VC.
    pub fn prove_vc(&self, vc: &Vc) -> VcResult {
        let start = Instant::now();
        let deadline = start + Duration::from_millis(self.config.timeout_ms);

        let mut model = match Conjunct::from_vc(vc, deadline) {
            Ok(model) => model,
            Err(e) => {
                // A malformed VC fails alone; the run continues.
                tracing::warn!(vc = %vc.name, error = %e, "excluding VC with malformed expression");
                return VcResult {
                    name: vc.name.clone(),
                    state: VcState::Exhausted,
                    proved: false,
                    iterations: 0,
                    elapsed_ms: elapsed_ms(start),
                    timeout_ms: self.config.timeout_ms,
                    before: String::new(),
                    after: String::new(),
                    trace: Vec::new(),
                };
            }
        };
        let before = model.to_string();

        // Theorems whose required operators never occur in the VC can
        // never match; drop them for this VC up front.
        let pool: Vec<&Theorem> = if model.is_proved() {
            Vec::new()
        } else {
            let vc_functions = model.function_names();
            self.theorems
                .iter()
                .filter(|t| t.function_names().iter().all(|n| vc_functions.contains(n)))
                .collect()
        };

        let mut applied: FxHashSet<String> = FxHashSet::default();
        let mut applied_count: FxHashMap<String, i64> = FxHashMap::default();
        let mut trace: Vec<TraceEntry> = Vec::new();
        let mut iterations = 0;

        while iterations < self.config.max_iterations
            && !model.is_proved()
            && Instant::now() <= deadline
        {
            let mut batch = Vec::new();
            let mut seen: FxHashSet<String> = FxHashSet::default();
            for theorem in &pool {
                if let Some(found) = matcher::apply_to(theorem, &model, deadline) {
                    for ins in found {
                        if !applied.contains(&ins.rendered) && seen.insert(ins.rendered.clone()) {
                            batch.push(ins);
                        }
                    }
                }
            }
            if batch.is_empty() {
                // Fixpoint: no theorem yields anything new.
                break;
            }
            iterations += 1;

            let goal = model.goal_symbols();
            let threshold = 16 * goal.len() as i64 + 1;
            let mut ranking = Ranking::new(batch, &goal, threshold, &applied_count, &model);
            // Cap per-iteration work so progress is re-evaluated against
            // newly derived facts instead of draining one large batch.
            let max_to_add = ranking.len() * 3 / 4 + 1;
            let mut added = 0;

            while let Some((score, cand)) = ranking.pop() {
                if model.is_proved() || Instant::now() > deadline || added >= max_to_add {
                    break;
                }
                if applied.contains(&cand.rendered) {
                    continue;
                }
                let fact = match model.canonicalize_into(&cand.expr) {
                    Ok(fact) => fact,
                    Err(e) => {
                        tracing::warn!(vc = %vc.name, error = %e, "skipping uninsertable instantiation");
                        continue;
                    }
                };
                model.add_expression(fact, deadline);
                applied.insert(cand.rendered.clone());
                *applied_count.entry(cand.theorem_key).or_insert(0) += 1;
                trace.push(TraceEntry {
                    theorem: cand.theorem_name,
                    fact: cand.rendered,
                    score,
                });
                added += 1;
            }
        }

        let proved = model.is_proved();
        let state = if proved {
            VcState::Proved
        } else if Instant::now() > deadline {
            VcState::TimedOut
        } else {
            VcState::Exhausted
        };

        VcResult {
            name: vc.name.clone(),
            state,
            proved,
            iterations,
            elapsed_ms: elapsed_ms(start),
            timeout_ms: self.config.timeout_ms,
            before,
            after: model.to_string(),
            trace,
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
