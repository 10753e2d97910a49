//! Sort system for prover expressions.
//!
//! Sorts are the result types the front end attaches to every expression.
//! Their printable forms are what canonicalization appends to operator
//! names to disambiguate overloads (`+` at `Z` becomes `+Z`), so two
//! occurrences of the same symbol at different sorts never unify.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sort (result type) attached to a front-end expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sort {
    /// Boolean sort, printable form `B`
    Bool,
    /// Integer sort, printable form `Z`
    Int,
    /// Natural number sort, printable form `N`; a subtype of `Int`
    Nat,
    /// Uninterpreted sort with its declared name
    Uninterpreted(String),
}

impl Sort {
    /// Whether values of this sort embed into the integers.
    ///
    /// The `<` and `>` canonicalization rules fire only when both
    /// operands are numeric in this sense.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Sort::Int | Sort::Nat)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "B"),
            Sort::Int => write!(f, "Z"),
            Sort::Nat => write!(f, "N"),
            Sort::Uninterpreted(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_forms() {
        assert_eq!(Sort::Bool.to_string(), "B");
        assert_eq!(Sort::Int.to_string(), "Z");
        assert_eq!(Sort::Nat.to_string(), "N");
        assert_eq!(Sort::Uninterpreted("Str".into()).to_string(), "Str");
    }

    #[test]
    fn test_numeric_subtypes() {
        assert!(Sort::Int.is_numeric());
        assert!(Sort::Nat.is_numeric());
        assert!(!Sort::Bool.is_numeric());
        assert!(!Sort::Uninterpreted("Str".into()).is_numeric());
    }
}
