//! Front-end facing expression trees and verification conditions.
//!
//! The parser, type checker, and VC generator live outside this
//! workspace; they hand over `Expr` trees with sorts already resolved.
//! `Expr` is an owned tree and deliberately simple — the prover
//! immediately canonicalizes it into the interned [`crate::term`] arena
//! and never walks the raw tree during search.

use crate::sort::Sort;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantification tag on an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantification {
    /// Not quantified (free constant or applied operator)
    None,
    /// Universally quantified variable occurrence
    Forall,
    /// Existentially quantified variable occurrence
    Exists,
}

/// A typed expression tree as produced by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expr {
    /// Operator, function, constant, or variable name
    pub op: String,
    /// Ordered operands; empty for symbols and literals
    pub args: Vec<Expr>,
    /// Result sort of this node
    pub sort: Sort,
    /// Quantification of the operator occurrence
    pub quant: Quantification,
}

impl Expr {
    /// A non-quantified symbol or literal.
    pub fn symbol(name: impl Into<String>, sort: Sort) -> Self {
        Expr {
            op: name.into(),
            args: Vec::new(),
            sort,
            quant: Quantification::None,
        }
    }

    /// A universally quantified variable occurrence.
    pub fn forall_symbol(name: impl Into<String>, sort: Sort) -> Self {
        Expr {
            op: name.into(),
            args: Vec::new(),
            sort,
            quant: Quantification::Forall,
        }
    }

    /// A non-quantified application of `op` to `args`.
    pub fn apply(op: impl Into<String>, args: Vec<Expr>, sort: Sort) -> Self {
        Expr {
            op: op.into(),
            args,
            sort,
            quant: Quantification::None,
        }
    }

    /// An application whose operator position is itself quantified.
    pub fn apply_quantified(
        op: impl Into<String>,
        args: Vec<Expr>,
        sort: Sort,
        quant: Quantification,
    ) -> Self {
        Expr {
            op: op.into(),
            args,
            sort,
            quant,
        }
    }

    /// `a = b` at sort `Bool`.
    pub fn eq(a: Expr, b: Expr) -> Self {
        Expr::apply("=", vec![a, b], Sort::Bool)
    }

    /// `a /= b` at sort `Bool`.
    pub fn neq(a: Expr, b: Expr) -> Self {
        Expr::apply("/=", vec![a, b], Sort::Bool)
    }

    /// `not p`.
    pub fn not(p: Expr) -> Self {
        Expr::apply("not", vec![p], Sort::Bool)
    }

    /// `a <= b`.
    pub fn lte(a: Expr, b: Expr) -> Self {
        Expr::apply("<=", vec![a, b], Sort::Bool)
    }

    /// `a < b`.
    pub fn lt(a: Expr, b: Expr) -> Self {
        Expr::apply("<", vec![a, b], Sort::Bool)
    }

    /// `a + b`; the result takes the sort of `a`.
    pub fn plus(a: Expr, b: Expr) -> Self {
        let sort = a.sort.clone();
        Expr::apply("+", vec![a, b], sort)
    }

    /// Binary `a - b`; the result takes the sort of `a`.
    pub fn minus(a: Expr, b: Expr) -> Self {
        let sort = a.sort.clone();
        Expr::apply("-", vec![a, b], sort)
    }

    /// The literal `true`.
    pub fn lit_true() -> Self {
        Expr::symbol("true", Sort::Bool)
    }

    /// An integer literal.
    pub fn int(n: i64) -> Self {
        Expr::symbol(n.to_string(), Sort::Int)
    }

    /// Whether any node in this tree names the given operator.
    pub fn mentions(&self, name: &str) -> bool {
        self.op == name || self.args.iter().any(|a| a.mentions(name))
    }

    /// Whether this is an equality application (`=` with two operands).
    ///
    /// Checked on the raw front-end tree, before canonicalization tags
    /// the operator.
    #[must_use]
    pub fn is_equality(&self) -> bool {
        self.op == "=" && self.args.len() == 2
    }

    /// Names of all quantified variable occurrences in this tree.
    pub fn quantified_variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_quantified(&mut out);
        out.sort();
        out.dedup();
        out
    }

    fn collect_quantified(&self, out: &mut Vec<String>) {
        if self.quant != Quantification::None {
            out.push(self.op.clone());
        }
        for a in &self.args {
            a.collect_quantified(out);
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            return write!(f, "{}", self.op);
        }
        write!(f, "{}(", self.op)?;
        for (i, a) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", a)?;
        }
        write!(f, ")")
    }
}

/// A named, universally quantified assertion in scope for a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TheoremDecl {
    /// Declared theorem name (used in traces)
    pub name: String,
    /// The assertion expression, quantified variables tagged inline
    pub assertion: Expr,
}

impl TheoremDecl {
    /// Create a theorem declaration.
    pub fn new(name: impl Into<String>, assertion: Expr) -> Self {
        TheoremDecl {
            name: name.into(),
            assertion,
        }
    }
}

/// A verification condition: antecedent facts that must entail every
/// consequent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vc {
    /// VC name as assigned by the generator
    pub name: String,
    /// Facts assumed true
    pub antecedents: Vec<Expr>,
    /// Goals to discharge
    pub consequents: Vec<Expr>,
}

impl Vc {
    /// Create a verification condition.
    pub fn new(name: impl Into<String>, antecedents: Vec<Expr>, consequents: Vec<Expr>) -> Self {
        Vc {
            name: name.into(),
            antecedents,
            consequents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let e = Expr::eq(
            Expr::apply(
                "f",
                vec![Expr::symbol("x", Sort::Int), Expr::int(0)],
                Sort::Int,
            ),
            Expr::symbol("y", Sort::Int),
        );
        assert_eq!(e.to_string(), "=(f(x,0),y)");
    }

    #[test]
    fn test_quantified_variables_deduped() {
        let n = || Expr::forall_symbol("n", Sort::Nat);
        let e = Expr::eq(
            Expr::apply("f", vec![n()], Sort::Nat),
            Expr::plus(Expr::apply("f", vec![n()], Sort::Nat), Expr::int(0)),
        );
        assert_eq!(e.quantified_variables(), vec!["n".to_string()]);
    }

    #[test]
    fn test_mentions() {
        let e = Expr::not(Expr::apply(
            "lambda",
            vec![Expr::symbol("x", Sort::Int)],
            Sort::Bool,
        ));
        assert!(e.mentions("lambda"));
        assert!(!e.mentions("mu"));
    }
}
