//! Congruence-aware pattern matching.
//!
//! Finds ground instantiations of a theorem's matching pattern against
//! the terms of a per-VC model, *up to known congruence*: operator
//! names are compared through the registry's canonical representatives,
//! and a pattern application may match any application member of a
//! candidate term's congruence class, with backtracking over members.
//! First-order quantified variables bind ground terms; a quantified
//! operator position binds a ground operator name. Binding consistency
//! is likewise checked modulo congruence.
//!
//! The search polls its deadline and returns whatever instantiations it
//! found when time runs out — an incomplete answer, never a wrong one.

use crate::theorem::Theorem;
use ccprove_core::conjunct::Conjunct;
use ccprove_core::expr::{Expr, Quantification};
use ccprove_core::term::{is_literal_name, TermId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::Instant;

/// A candidate fact paired with the theorem that produced it.
#[derive(Debug, Clone)]
pub struct InsertExpWithJustification {
    /// Instantiated ground consequence, canonical
    pub expr: Expr,
    /// Canonical rendering; the dedup key
    pub rendered: String,
    /// Declared name of the justifying theorem
    pub theorem_name: String,
    /// Canonical key of the justifying theorem
    pub theorem_key: String,
}

impl InsertExpWithJustification {
    /// All symbols of the instantiated fact (it is ground, so every
    /// symbol is non-quantified).
    pub fn symbols(&self) -> FxHashSet<String> {
        let mut out = FxHashSet::default();
        collect(&self.expr, &mut |e| {
            out.insert(e.op.clone());
        });
        out
    }

    /// Literal constants of the instantiated fact.
    pub fn literals(&self) -> FxHashSet<String> {
        let mut out = FxHashSet::default();
        collect(&self.expr, &mut |e| {
            if e.args.is_empty() && is_literal_name(&e.op) {
                out.insert(e.op.clone());
            }
        });
        out
    }

    /// Applied operators of the instantiated fact.
    pub fn function_symbols(&self) -> FxHashSet<String> {
        let mut out = FxHashSet::default();
        collect(&self.expr, &mut |e| {
            if !e.args.is_empty() {
                out.insert(e.op.clone());
            }
        });
        out
    }
}

fn collect(e: &Expr, f: &mut impl FnMut(&Expr)) {
    f(e);
    for a in &e.args {
        collect(a, f);
    }
}

#[derive(Debug, Clone, Default)]
struct Binding {
    terms: FxHashMap<String, TermId>,
    ops: FxHashMap<String, String>,
}

struct MatchCx<'a> {
    model: &'a Conjunct,
    deadline: Instant,
    steps: u32,
    expired: bool,
}

impl MatchCx<'_> {
    /// Count a unit of work; false once the deadline has passed.
    fn tick(&mut self) -> bool {
        if self.expired {
            return false;
        }
        self.steps = self.steps.wrapping_add(1);
        if self.steps % 256 == 0 && Instant::now() > self.deadline {
            self.expired = true;
        }
        !self.expired
    }
}

/// Find ground instantiations of `theorem` against `model`.
///
/// Returns `None` when no instantiation was found (or time ran out
/// before one was).
pub fn apply_to(
    theorem: &Theorem,
    model: &Conjunct,
    deadline: Instant,
) -> Option<Vec<InsertExpWithJustification>> {
    let mut cx = MatchCx {
        model,
        deadline,
        steps: 0,
        expired: false,
    };
    let mut out = Vec::new();
    let mut seen = FxHashSet::default();

    for &t in model.registered_terms() {
        if cx.expired {
            break;
        }
        let mut binding = Binding::default();
        if try_match(theorem.pattern(), t, &mut binding, &mut cx) {
            if let Some(inst) = instantiate(theorem.consequence(), &binding, model) {
                let rendered = inst.to_string();
                if seen.insert(rendered.clone()) {
                    out.push(InsertExpWithJustification {
                        expr: inst,
                        rendered,
                        theorem_name: theorem.name().to_string(),
                        theorem_key: theorem.key().to_string(),
                    });
                }
            }
        }
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn try_match(p: &Expr, t: TermId, binding: &mut Binding, cx: &mut MatchCx) -> bool {
    if !cx.tick() {
        return false;
    }
    let model = cx.model;

    if p.args.is_empty() {
        if p.quant != Quantification::None {
            return match binding.terms.get(&p.op) {
                Some(&bound) => model.same_class(bound, t),
                None => {
                    binding.terms.insert(p.op.clone(), t);
                    true
                }
            };
        }
        return match model.name_root(&p.op) {
            Some(root) => root == model.term_root(t),
            None => false,
        };
    }

    // A pattern application may match any application in the candidate
    // term's congruence class.
    let members: Vec<TermId> = model.congruent_applications(t).to_vec();
    for m in members {
        if cx.expired {
            return false;
        }
        if model.store().args(m).len() != p.args.len() {
            continue;
        }
        let snapshot = binding.clone();
        if match_operator(p, m, binding, model) && match_children(p, m, binding, cx) {
            return true;
        }
        *binding = snapshot;
    }
    false
}

fn match_operator(p: &Expr, m: TermId, binding: &mut Binding, model: &Conjunct) -> bool {
    let ground_op = model.store().op(m);
    if p.quant != Quantification::None {
        return match binding.ops.get(&p.op) {
            Some(bound) => model.root_symbol(bound) == model.root_symbol(ground_op),
            None => {
                binding.ops.insert(p.op.clone(), ground_op.to_string());
                true
            }
        };
    }
    match (model.name_root(&p.op), model.name_root(ground_op)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn match_children(p: &Expr, m: TermId, binding: &mut Binding, cx: &mut MatchCx) -> bool {
    let args: Vec<TermId> = cx.model.store().args(m).to_vec();
    p.args
        .iter()
        .zip(args)
        .all(|(pc, tc)| try_match(pc, tc, binding, cx))
}

/// Substitute a complete binding into a consequence template.
///
/// Every quantified variable of the template is bound by construction;
/// a missing binding means the theorem was built inconsistently, and
/// the candidate is silently skipped rather than asserted wrong.
fn instantiate(template: &Expr, binding: &Binding, model: &Conjunct) -> Option<Expr> {
    if template.args.is_empty() {
        if template.quant != Quantification::None {
            let &tid = binding.terms.get(&template.op)?;
            return Some(model.store().to_expr(tid));
        }
        return Some(template.clone());
    }
    let op = if template.quant != Quantification::None {
        binding.ops.get(&template.op)?.clone()
    } else {
        template.op.clone()
    };
    let args = template
        .args
        .iter()
        .map(|a| instantiate(a, binding, model))
        .collect::<Option<Vec<_>>>()?;
    Some(Expr {
        op,
        args,
        sort: template.sort.clone(),
        quant: Quantification::None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theorem::build_pool;
    use ccprove_core::expr::{TheoremDecl, Vc};
    use ccprove_core::sort::Sort;
    use std::time::Duration;

    fn far() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[test]
    fn test_single_instantiation() {
        // forall n, f(n) = f(n) + 0 against a model containing f(5).
        let n = || Expr::forall_symbol("n", Sort::Nat);
        let f = |a: Expr| Expr::apply("f", vec![a], Sort::Nat);
        let zero = || Expr::symbol("0", Sort::Nat);
        let pool = build_pool(&[TheoremDecl::new(
            "plus_zero",
            Expr::eq(f(n()), Expr::plus(f(n()), zero())),
        )]);
        let leftward = &pool[0];
        assert_eq!(leftward.pattern().to_string(), "fN(n)");

        let five = Expr::symbol("5", Sort::Nat);
        let vc = Vc::new(
            "vc",
            vec![],
            vec![Expr::eq(f(five.clone()), Expr::plus(f(five), zero()))],
        );
        let model = Conjunct::from_vc(&vc, far()).unwrap();

        let found = apply_to(leftward, &model, far()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rendered, "=B(fN(5),+N(fN(5),0))");
    }

    #[test]
    fn test_match_through_congruence_class() {
        // With c = f(x) asserted, pattern g(f(n)) must match g(c).
        let n = || Expr::forall_symbol("n", Sort::Int);
        let f = |a: Expr| Expr::apply("f", vec![a], Sort::Int);
        let g = |a: Expr| Expr::apply("g", vec![a], Sort::Int);
        let pool = build_pool(&[TheoremDecl::new("unfold", Expr::eq(g(f(n())), n()))]);
        let th = &pool[0];
        assert_eq!(th.pattern().to_string(), "gZ(fZ(n))");

        let c = || Expr::symbol("c", Sort::Int);
        let x = || Expr::symbol("x", Sort::Int);
        let d = Expr::symbol("d", Sort::Int);
        let vc = Vc::new(
            "vc",
            vec![Expr::eq(c(), f(x())), Expr::eq(g(c()), d)],
            vec![Expr::eq(x(), x())],
        );
        let model = Conjunct::from_vc(&vc, far()).unwrap();

        let found = apply_to(th, &model, far()).unwrap();
        assert!(found
            .iter()
            .any(|i| i.rendered == "=B(gZ(fZ(x)),x)"));
    }

    #[test]
    fn test_no_match_returns_none() {
        let n = || Expr::forall_symbol("n", Sort::Int);
        let h = Expr::apply("h", vec![n()], Sort::Int);
        let pool = build_pool(&[TheoremDecl::new("t", Expr::eq(h, n()))]);

        let x = || Expr::symbol("x", Sort::Int);
        let y = Expr::symbol("y", Sort::Int);
        let vc = Vc::new("vc", vec![Expr::eq(x(), y)], vec![Expr::eq(x(), x())]);
        let model = Conjunct::from_vc(&vc, far()).unwrap();

        assert!(apply_to(&pool[0], &model, far()).is_none());
    }

    #[test]
    fn test_inconsistent_binding_rejected() {
        // forall n, p(n, n): matches p(a, a) but not p(a, b).
        let n = || Expr::forall_symbol("n", Sort::Int);
        let p2 = |a: Expr, b: Expr| Expr::apply("p", vec![a, b], Sort::Bool);
        let pool = build_pool(&[TheoremDecl::new("diag", p2(n(), n()))]);

        let a = || Expr::symbol("a", Sort::Int);
        let b = || Expr::symbol("b", Sort::Int);
        let vc = Vc::new(
            "vc",
            vec![Expr::eq(p2(a(), b()), Expr::lit_true())],
            vec![Expr::eq(a(), a())],
        );
        let model = Conjunct::from_vc(&vc, far()).unwrap();
        assert!(apply_to(&pool[0], &model, far()).is_none());

        let vc2 = Vc::new(
            "vc2",
            vec![Expr::eq(p2(a(), a()), Expr::lit_true())],
            vec![Expr::eq(a(), a())],
        );
        let model2 = Conjunct::from_vc(&vc2, far()).unwrap();
        let found = apply_to(&pool[0], &model2, far()).unwrap();
        assert_eq!(found[0].rendered, "pB(a,a)");
    }
}
