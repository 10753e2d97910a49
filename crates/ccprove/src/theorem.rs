//! Theorem pool construction.
//!
//! Universally quantified assertions in scope are pre-processed once,
//! globally, into matchable rewrites:
//!
//! - an equality `L = R` yields up to two directional theorems, one
//!   matching `L` and one matching `R`. A direction is dropped when the
//!   non-matched side uses a quantified variable the matched side does
//!   not bind — instantiation can only bind variables that appear in
//!   the pattern;
//! - any other assertion becomes a single match-to-true rewrite whose
//!   inserted consequence is its own instantiation.
//!
//! Assertions mentioning `lambda` are unsupported and skipped.
//! Degenerate theorems (nothing concrete to anchor a match on, or a
//! rewrite to itself) are flagged unneeded and excluded from the pool.

use ccprove_core::canon::canonicalize_expr;
use ccprove_core::expr::{Expr, Quantification, TheoremDecl};
use ccprove_core::term::is_literal_name;
use rustc_hash::FxHashSet;

/// A pre-processed, matchable theorem.
#[derive(Debug, Clone)]
pub struct Theorem {
    name: String,
    /// Canonical rendering of the full assertion; dedup and penalty key
    key: String,
    /// Canonical matching side
    pattern: Expr,
    /// Canonical full template instantiated and asserted on a match
    consequence: Expr,
    /// Non-quantified operators the matching side requires
    function_names: FxHashSet<String>,
    /// Literal constants the matching side requires
    literals: FxHashSet<String>,
    /// All non-quantified symbols of the full assertion
    nonquant_symbols: FxHashSet<String>,
    unneeded: bool,
}

impl Theorem {
    fn new(name: &str, pattern: Expr, consequence: Expr) -> Self {
        let mut function_names = FxHashSet::default();
        let mut literals = FxHashSet::default();
        visit(&pattern, &mut |e| {
            if e.quant == Quantification::None {
                if e.args.is_empty() {
                    if is_literal_name(&e.op) {
                        literals.insert(e.op.clone());
                    }
                } else {
                    function_names.insert(e.op.clone());
                }
            }
        });
        let mut nonquant_symbols = FxHashSet::default();
        visit(&consequence, &mut |e| {
            if e.quant == Quantification::None {
                nonquant_symbols.insert(e.op.clone());
            }
        });

        let bare_variable = pattern.args.is_empty() && pattern.quant != Quantification::None;
        let no_anchor = {
            let mut any = false;
            visit(&pattern, &mut |e| any |= e.quant == Quantification::None);
            !any
        };
        let trivially_true = pattern.args.is_empty() && pattern.op == "true";
        let self_rewrite = consequence.op == "=B"
            && consequence.args.len() == 2
            && consequence.args[0] == consequence.args[1];
        let unneeded = bare_variable || no_anchor || trivially_true || self_rewrite;

        Theorem {
            name: name.to_string(),
            key: consequence.to_string(),
            pattern,
            consequence,
            function_names,
            literals,
            nonquant_symbols,
            unneeded,
        }
    }

    /// Declared theorem name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical string key, shared by both directions of an equality.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Canonical matching side.
    pub fn pattern(&self) -> &Expr {
        &self.pattern
    }

    /// Canonical insertion template.
    pub fn consequence(&self) -> &Expr {
        &self.consequence
    }

    /// Non-quantified operators the matching side requires.
    pub fn function_names(&self) -> &FxHashSet<String> {
        &self.function_names
    }

    /// Literal constants the matching side requires.
    pub fn literals(&self) -> &FxHashSet<String> {
        &self.literals
    }

    /// All non-quantified symbols of the full assertion.
    pub fn nonquant_symbols(&self) -> &FxHashSet<String> {
        &self.nonquant_symbols
    }
}

fn visit(e: &Expr, f: &mut impl FnMut(&Expr)) {
    f(e);
    for a in &e.args {
        visit(a, f);
    }
}

/// Build the global theorem pool from the scope's declarations.
pub fn build_pool(decls: &[TheoremDecl]) -> Vec<Theorem> {
    let mut pool = Vec::new();
    for decl in decls {
        if decl.assertion.mentions("lambda") {
            tracing::debug!(theorem = %decl.name, "skipping theorem with lambda");
            continue;
        }
        let canonical = match canonicalize_expr(&decl.assertion) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(theorem = %decl.name, error = %e, "dropping malformed theorem");
                continue;
            }
        };
        if decl.assertion.is_equality() {
            add_equality_direction(&mut pool, &decl.name, &canonical, true);
            add_equality_direction(&mut pool, &decl.name, &canonical, false);
        } else {
            push_unless_unneeded(
                &mut pool,
                Theorem::new(&decl.name, canonical.clone(), canonical),
            );
        }
    }
    pool
}

fn add_equality_direction(pool: &mut Vec<Theorem>, name: &str, canonical: &Expr, match_left: bool) {
    debug_assert!(canonical.op == "=B" && canonical.args.len() == 2);
    let (lhs, rhs) = if match_left {
        (&canonical.args[0], &canonical.args[1])
    } else {
        (&canonical.args[1], &canonical.args[0])
    };
    // Only the matched side binds variables, so every quantified
    // variable of the other side must appear in it.
    let bound: FxHashSet<String> = lhs.quantified_variables().into_iter().collect();
    if !rhs.quantified_variables().iter().all(|v| bound.contains(v)) {
        return;
    }
    push_unless_unneeded(pool, Theorem::new(name, lhs.clone(), canonical.clone()));
}

fn push_unless_unneeded(pool: &mut Vec<Theorem>, theorem: Theorem) {
    if theorem.unneeded {
        tracing::debug!(theorem = %theorem.name, "dropping degenerate theorem");
    } else {
        pool.push(theorem);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccprove_core::sort::Sort;

    fn n() -> Expr {
        Expr::forall_symbol("n", Sort::Int)
    }

    fn decl(name: &str, assertion: Expr) -> TheoremDecl {
        TheoremDecl::new(name, assertion)
    }

    #[test]
    fn test_equality_yields_both_directions() {
        let f = Expr::apply("f", vec![n()], Sort::Int);
        let g = Expr::apply("g", vec![n()], Sort::Int);
        let pool = build_pool(&[decl("t", Expr::eq(f, g))]);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].pattern().to_string(), "fZ(n)");
        assert_eq!(pool[1].pattern().to_string(), "gZ(n)");
        // One key for both directions.
        assert_eq!(pool[0].key(), pool[1].key());
    }

    #[test]
    fn test_unbindable_direction_is_dropped() {
        let m = Expr::forall_symbol("m", Sort::Int);
        let f = Expr::apply("f", vec![n()], Sort::Int);
        let g = Expr::apply("g", vec![n(), m], Sort::Int);
        // f(n) = g(n, m): matching f(n) cannot bind m.
        let pool = build_pool(&[decl("t", Expr::eq(f, g))]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].pattern().to_string(), "gZ(n,m)");
    }

    #[test]
    fn test_lambda_theorems_skipped() {
        let lam = Expr::apply("lambda", vec![n()], Sort::Int);
        let pool = build_pool(&[decl("t", Expr::eq(lam, n()))]);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_reflexive_equality_is_unneeded() {
        let pool = build_pool(&[decl("t", Expr::eq(n(), n()))]);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_non_equality_becomes_match_to_true() {
        let p = Expr::apply("is_sorted", vec![n()], Sort::Bool);
        let pool = build_pool(&[decl("t", p)]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].pattern(), pool[0].consequence());
        assert!(pool[0].function_names().contains("is_sortedB"));
    }

    #[test]
    fn test_pattern_caches() {
        let zero = Expr::symbol("0", Sort::Int);
        let f = Expr::apply("f", vec![n()], Sort::Int);
        let plus = Expr::plus(f.clone(), zero);
        let pool = build_pool(&[decl("t", Expr::eq(f, plus))]);
        // Direction matching f(n)+0.
        let rightward = pool
            .iter()
            .find(|t| t.pattern().op.starts_with('+'))
            .unwrap();
        assert!(rightward.literals().contains("0"));
        assert!(rightward.function_names().contains("+Z"));
        assert!(rightward.function_names().contains("fZ"));
        assert!(rightward.nonquant_symbols().contains("0"));
    }
}
