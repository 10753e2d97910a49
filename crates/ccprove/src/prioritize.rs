//! Relevance ranking of candidate instantiations.
//!
//! Candidates are ranked by estimated usefulness toward the current
//! goal; lower scores win. The score of a candidate is the smallest
//! goal weight among its symbols that occur in the goal map, defaulting
//! to the map's size when none overlaps. A candidate requiring a symbol
//! that is neither a goal symbol nor registered anywhere in the model
//! cannot help and is pushed to the sentinel worst score — but stays in
//! the queue as a fallback rather than being dropped. Repeat
//! applications of one theorem are penalized by its prior use count, so
//! the search favors diversity over hammering a single lemma.

use crate::matcher::InsertExpWithJustification;
use ccprove_core::conjunct::Conjunct;
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Sentinel score for candidates that cannot currently contribute.
pub const EXCLUDED_SCORE: i64 = i64::MAX;

#[derive(Debug)]
struct Scored {
    score: i64,
    seq: usize,
    candidate: InsertExpWithJustification,
}

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.seq == other.seq
    }
}

impl Eq for Scored {}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.score, self.seq).cmp(&(other.score, other.seq))
    }
}

/// A ranked batch of candidates; a min-heap by score with FIFO
/// tie-break.
pub struct Ranking {
    heap: BinaryHeap<Reverse<Scored>>,
    /// Relevance cutoff computed by the orchestrator and recorded with
    /// the ranking. Deliberately not enforced as a hard filter; it is a
    /// tunable heuristic parameter.
    pub threshold: i64,
}

impl Ranking {
    /// Score and enqueue a candidate batch.
    pub fn new(
        candidates: Vec<InsertExpWithJustification>,
        goal: &FxHashMap<String, i64>,
        threshold: i64,
        applied_count: &FxHashMap<String, i64>,
        model: &Conjunct,
    ) -> Self {
        let mut heap = BinaryHeap::with_capacity(candidates.len());
        for (seq, candidate) in candidates.into_iter().enumerate() {
            let mut score = EXCLUDED_SCORE;
            if !should_exclude(&candidate, goal, model) {
                score = calculate_score(&candidate, goal, model);
                score += applied_count
                    .get(&candidate.theorem_key)
                    .copied()
                    .unwrap_or(0);
            }
            heap.push(Reverse(Scored {
                score,
                seq,
                candidate,
            }));
        }
        Ranking { heap, threshold }
    }

    /// Number of candidates still queued.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Best remaining candidate and its score.
    pub fn pop(&mut self) -> Option<(i64, InsertExpWithJustification)> {
        self.heap
            .pop()
            .map(|Reverse(s)| (s.score, s.candidate))
    }
}

/// A candidate is excluded when a literal or function symbol it
/// requires, canonicalized through the registry, is absent from both
/// the goal map and the registry itself.
fn should_exclude(
    candidate: &InsertExpWithJustification,
    goal: &FxHashMap<String, i64>,
    model: &Conjunct,
) -> bool {
    candidate
        .literals()
        .into_iter()
        .chain(candidate.function_symbols())
        .any(|s| {
            let root = model.root_symbol(&s);
            !goal.contains_key(&root) && !model.registry_contains(&root)
        })
}

/// Best (smallest) goal weight among the candidate's symbols; the map
/// size — worse than any real overlap — when nothing overlaps.
fn calculate_score(
    candidate: &InsertExpWithJustification,
    goal: &FxHashMap<String, i64>,
    model: &Conjunct,
) -> i64 {
    let not_contained_penalty = goal.len() as i64;
    let mut score = not_contained_penalty;
    for s in candidate.symbols() {
        let root = model.root_symbol(&s);
        if let Some(&weight) = goal.get(&root) {
            if weight < score {
                score = weight;
            }
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccprove_core::canon::canonicalize_expr;
    use ccprove_core::expr::{Expr, Vc};
    use ccprove_core::sort::Sort;
    use std::time::{Duration, Instant};

    fn far() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    fn candidate(expr: Expr, key: &str) -> InsertExpWithJustification {
        let expr = canonicalize_expr(&expr).unwrap();
        let rendered = expr.to_string();
        InsertExpWithJustification {
            expr,
            rendered,
            theorem_name: key.to_string(),
            theorem_key: key.to_string(),
        }
    }

    /// Model with `f(x) = y` assumed and goal `z = w`; goal map is
    /// `{=B: 1, z: 1, w: 1}`.
    fn model() -> Conjunct {
        let x = Expr::symbol("x", Sort::Int);
        let y = Expr::symbol("y", Sort::Int);
        let z = Expr::symbol("z", Sort::Int);
        let w = Expr::symbol("w", Sort::Int);
        let f = Expr::apply("f", vec![x], Sort::Int);
        let vc = Vc::new("m", vec![Expr::eq(f, y)], vec![Expr::eq(z, w)]);
        Conjunct::from_vc(&vc, far()).unwrap()
    }

    fn zw(key: &str) -> InsertExpWithJustification {
        candidate(
            Expr::eq(Expr::symbol("z", Sort::Int), Expr::symbol("w", Sort::Int)),
            key,
        )
    }

    #[test]
    fn test_goal_overlap_beats_no_overlap() {
        let model = model();
        let goal = model.goal_symbols();
        let relevant = zw("a");
        // Registered symbols, but none of them goal symbols: scores the
        // not-contained penalty.
        let neutral = candidate(
            Expr::apply("f", vec![Expr::symbol("x", Sort::Int)], Sort::Int),
            "b",
        );
        let mut ranking = Ranking::new(
            vec![neutral, relevant],
            &goal,
            1,
            &FxHashMap::default(),
            &model,
        );
        let (first_score, first) = ranking.pop().unwrap();
        assert_eq!(first.theorem_key, "a");
        assert!(first_score < goal.len() as i64);
        let (second_score, _) = ranking.pop().unwrap();
        assert_eq!(second_score, goal.len() as i64);
    }

    #[test]
    fn test_unknown_symbol_gets_sentinel_but_stays_ranked() {
        let model = model();
        let goal = model.goal_symbols();
        let alien = candidate(
            Expr::apply("zeta", vec![Expr::symbol("x", Sort::Int)], Sort::Bool),
            "alien",
        );
        let known = zw("known");
        let mut ranking = Ranking::new(
            vec![alien, known],
            &goal,
            1,
            &FxHashMap::default(),
            &model,
        );
        assert_eq!(ranking.len(), 2);
        let (_, first) = ranking.pop().unwrap();
        assert_eq!(first.theorem_key, "known");
        let (score, last) = ranking.pop().unwrap();
        assert_eq!(last.theorem_key, "alien");
        assert_eq!(score, EXCLUDED_SCORE);
    }

    #[test]
    fn test_usage_penalty_demotes_repeat_offender() {
        let model = model();
        let goal = model.goal_symbols();
        let a = zw("worn");
        let b = candidate(
            Expr::eq(Expr::symbol("w", Sort::Int), Expr::symbol("z", Sort::Int)),
            "fresh",
        );
        let mut used = FxHashMap::default();
        used.insert("worn".to_string(), 10);
        let mut ranking = Ranking::new(vec![a, b], &goal, 1, &used, &model);
        let (_, first) = ranking.pop().unwrap();
        assert_eq!(first.theorem_key, "fresh");
    }

    #[test]
    fn test_fifo_tie_break() {
        let model = model();
        let goal = model.goal_symbols();
        let a = zw("first");
        let b = candidate(
            Expr::eq(Expr::symbol("w", Sort::Int), Expr::symbol("z", Sort::Int)),
            "second",
        );
        let mut ranking = Ranking::new(vec![a, b], &goal, 1, &FxHashMap::default(), &model);
        assert_eq!(ranking.pop().unwrap().1.theorem_key, "first");
        assert_eq!(ranking.pop().unwrap().1.theorem_key, "second");
    }
}
