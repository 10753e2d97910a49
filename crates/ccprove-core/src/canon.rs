//! Canonicalization into the minimal primitive vocabulary.
//!
//! The congruence-closure procedure only understands `=`, `<=`, `+`,
//! unary `-`, and uninterpreted application. Every other operator is
//! syntactic sugar rewritten away here, bottom-up (children first):
//!
//! - `a /= b`   becomes `(a =B b) =B false`
//! - `not p`    becomes `p =B false`
//! - `a >= b`   becomes `b <=B a`
//! - `a < b`    becomes `(a + 1) <=B b`   (numeric operands only)
//! - `a > b`    becomes `(b + 1) <=B a`   (numeric operands only)
//! - `a - b`    becomes `a + (-b)`        (numeric result only)
//!
//! Any remaining non-quantified application gets its operator tagged
//! with the result sort's printable form (`+` at `Z` becomes `+Z`), so
//! overloads of one symbol at different sorts stay distinct. Quantified
//! operator occurrences stay untagged; their sort is resolved by
//! binding, not overload resolution. Operators outside the recognized
//! set pass through as opaque uninterpreted applications.
//!
//! The same pass is applied to every VC atom and every theorem before
//! registration, so textually different but semantically identical
//! forms unify syntactically. The pass is idempotent: an operator whose
//! name already carries its sort tag is left alone.

use crate::error::{CoreError, CoreResult};
use crate::expr::{Expr, Quantification};
use crate::sort::Sort;
use crate::term::{TermArgs, TermId, TermStore};

fn expect_arity(op: &str, args: &[TermId], expected: usize) -> CoreResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CoreError::Arity {
            op: op.to_string(),
            expected,
            actual: args.len(),
        })
    }
}

/// Canonicalize a front-end expression into `store`.
pub fn canonicalize(expr: &Expr, store: &mut TermStore) -> CoreResult<TermId> {
    let mut args = TermArgs::new();
    for a in &expr.args {
        args.push(canonicalize(a, store)?);
    }

    match expr.op.as_str() {
        "/=" => {
            expect_arity("/=", &args, 2)?;
            let eq = store.intern("=B", args, Sort::Bool, Quantification::None);
            let fls = store.intern_symbol("false", Sort::Bool);
            Ok(store.intern(
                "=B",
                TermArgs::from_slice(&[eq, fls]),
                Sort::Bool,
                Quantification::None,
            ))
        }
        "not" => {
            expect_arity("not", &args, 1)?;
            let fls = store.intern_symbol("false", Sort::Bool);
            Ok(store.intern(
                "=B",
                TermArgs::from_slice(&[args[0], fls]),
                Sort::Bool,
                Quantification::None,
            ))
        }
        ">=" => {
            expect_arity(">=", &args, 2)?;
            Ok(store.intern(
                "<=B",
                TermArgs::from_slice(&[args[1], args[0]]),
                Sort::Bool,
                Quantification::None,
            ))
        }
        "<" if numeric_operands(store, &args) => {
            expect_arity("<", &args, 2)?;
            let bumped = bump_by_one(store, args[0]);
            Ok(store.intern(
                "<=B",
                TermArgs::from_slice(&[bumped, args[1]]),
                Sort::Bool,
                Quantification::None,
            ))
        }
        ">" if numeric_operands(store, &args) => {
            expect_arity(">", &args, 2)?;
            let bumped = bump_by_one(store, args[1]);
            Ok(store.intern(
                "<=B",
                TermArgs::from_slice(&[bumped, args[0]]),
                Sort::Bool,
                Quantification::None,
            ))
        }
        "-" if args.len() == 2 && expr.sort.is_numeric() => {
            let tag = expr.sort.to_string();
            let neg = store.intern(
                format!("-{}", tag),
                TermArgs::from_slice(&[args[1]]),
                expr.sort.clone(),
                Quantification::None,
            );
            Ok(store.intern(
                format!("+{}", tag),
                TermArgs::from_slice(&[args[0], neg]),
                expr.sort.clone(),
                Quantification::None,
            ))
        }
        _ => {
            let op = if !args.is_empty() && expr.quant == Quantification::None {
                tagged(&expr.op, &expr.sort)
            } else {
                expr.op.clone()
            };
            Ok(store.intern(op, args, expr.sort.clone(), expr.quant))
        }
    }
}

/// Canonicalize into a fresh owned tree (used for theorem templates,
/// which outlive any single VC's store).
pub fn canonicalize_expr(expr: &Expr) -> CoreResult<Expr> {
    let mut scratch = TermStore::new();
    let id = canonicalize(expr, &mut scratch)?;
    Ok(scratch.to_expr(id))
}

fn numeric_operands(store: &TermStore, args: &[TermId]) -> bool {
    args.len() == 2
        && store.sort(args[0]).is_numeric()
        && store.sort(args[1]).is_numeric()
}

/// `a + 1`, tagged with `a`'s sort; the literal `1` is a natural.
fn bump_by_one(store: &mut TermStore, a: TermId) -> TermId {
    let sort = store.sort(a).clone();
    let one = store.intern_symbol("1", Sort::Nat);
    store.intern(
        format!("+{}", sort),
        TermArgs::from_slice(&[a, one]),
        sort.clone(),
        Quantification::None,
    )
}

fn tagged(op: &str, sort: &Sort) -> String {
    let suffix = sort.to_string();
    if op.ends_with(suffix.as_str()) {
        op.to_string()
    } else {
        format!("{}{}", op, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon_str(e: &Expr) -> String {
        let mut store = TermStore::new();
        let id = canonicalize(e, &mut store).unwrap();
        store.render(id)
    }

    fn x() -> Expr {
        Expr::symbol("x", Sort::Int)
    }

    fn y() -> Expr {
        Expr::symbol("y", Sort::Int)
    }

    #[test]
    fn test_neq_becomes_eq_false() {
        assert_eq!(canon_str(&Expr::neq(x(), y())), "=B(=B(x,y),false)");
    }

    #[test]
    fn test_not_becomes_eq_false() {
        let p = Expr::symbol("p", Sort::Bool);
        assert_eq!(canon_str(&Expr::not(p)), "=B(p,false)");
    }

    #[test]
    fn test_gte_swaps() {
        let e = Expr::apply(">=", vec![x(), y()], Sort::Bool);
        assert_eq!(canon_str(&e), "<=B(y,x)");
    }

    #[test]
    fn test_lt_bumps_left() {
        assert_eq!(canon_str(&Expr::lt(x(), y())), "<=B(+Z(x,1),y)");
    }

    #[test]
    fn test_gt_bumps_right() {
        let e = Expr::apply(">", vec![x(), y()], Sort::Bool);
        assert_eq!(canon_str(&e), "<=B(+Z(y,1),x)");
    }

    #[test]
    fn test_lt_on_non_numeric_stays_opaque() {
        let a = Expr::symbol("a", Sort::Uninterpreted("Str".into()));
        let b = Expr::symbol("b", Sort::Uninterpreted("Str".into()));
        let e = Expr::apply("<", vec![a, b], Sort::Bool);
        // Falls through to the generic tagging rule.
        assert_eq!(canon_str(&e), "<B(a,b)");
    }

    #[test]
    fn test_binary_minus_introduces_unary_negation() {
        assert_eq!(canon_str(&Expr::minus(x(), y())), "+Z(x,-Z(y))");
    }

    #[test]
    fn test_equality_and_plus_get_tagged() {
        let e = Expr::eq(Expr::plus(x(), y()), x());
        assert_eq!(canon_str(&e), "=B(+Z(x,y),x)");
    }

    #[test]
    fn test_quantified_operator_stays_untagged() {
        let e = Expr::apply_quantified(
            "f",
            vec![x()],
            Sort::Int,
            Quantification::Forall,
        );
        assert_eq!(canon_str(&e), "f(x)");
    }

    #[test]
    fn test_unknown_operator_passes_through() {
        let e = Expr::apply("frobnicate", vec![x()], Sort::Uninterpreted("W".into()));
        assert_eq!(canon_str(&e), "frobnicateW(x)");
    }

    #[test]
    fn test_idempotent() {
        let e = Expr::eq(Expr::minus(x(), y()), Expr::apply("f", vec![x()], Sort::Int));
        let once = canonicalize_expr(&e).unwrap();
        let twice = canonicalize_expr(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_arity_error() {
        let e = Expr::apply("not", vec![x(), y()], Sort::Bool);
        assert!(canonicalize_expr(&e).is_err());
    }
}
