//! Interned term arena.
//!
//! Canonicalized expressions live in a per-session [`TermStore`] and are
//! addressed by [`TermId`] handles. A term is immutable once interned
//! and may be referenced by any number of parents; children are shared
//! by id, never copied. Both hashes are computed once at interning and
//! never recomputed:
//!
//! - the *structure hash* is built bottom-up from the operator and the
//!   children's structure hashes (shape, not meaning);
//! - the *value hash* additionally folds in literal content, so it can
//!   cheaply pre-filter exact-equality checks.

use crate::expr::{Expr, Quantification};
use crate::sort::Sort;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv(bytes: &[u8], mut h: u64) -> u64 {
    for &b in bytes {
        h ^= u64::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

fn mix(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(FNV_PRIME);
    h ^= h >> 33;
    h
}

/// A lightweight handle to an interned term.
///
/// Two handles from the same store are equal iff they denote the same
/// (structurally identical) term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u32);

impl TermId {
    /// Index into the owning store.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Children list; most applications have two operands or fewer.
pub type TermArgs = SmallVec<[TermId; 2]>;

/// An interned term node.
#[derive(Debug, Clone)]
pub struct TermData {
    op: String,
    args: TermArgs,
    sort: Sort,
    quant: Quantification,
    structure_hash: u64,
    value_hash: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TermKey {
    op: String,
    args: TermArgs,
    sort: Sort,
    quant: Quantification,
}

/// Arena of interned terms.
///
/// One store exists per proving session (per VC); theorem templates are
/// canonicalized through a scratch store at pool-construction time.
#[derive(Debug, Default)]
pub struct TermStore {
    terms: Vec<TermData>,
    dedup: FxHashMap<TermKey, TermId>,
}

impl TermStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a node, reusing the existing id for a structurally
    /// identical one.
    pub fn intern(
        &mut self,
        op: impl Into<String>,
        args: TermArgs,
        sort: Sort,
        quant: Quantification,
    ) -> TermId {
        let op = op.into();
        let key = TermKey {
            op,
            args,
            sort,
            quant,
        };
        if let Some(&id) = self.dedup.get(&key) {
            return id;
        }

        let mut structure = FNV_OFFSET ^ (key.args.len() as u64);
        structure = fnv(key.op.as_bytes(), structure);
        let mut value = fnv(key.op.as_bytes(), FNV_OFFSET);
        value ^= match key.quant {
            Quantification::None => 0x00,
            Quantification::Forall => 0x51,
            Quantification::Exists => 0xa3,
        };
        for &a in &key.args {
            structure = mix(structure ^ self.terms[a.index()].structure_hash);
            value = mix(value ^ self.terms[a.index()].value_hash);
        }

        let id = TermId(self.terms.len() as u32);
        self.terms.push(TermData {
            op: key.op.clone(),
            args: key.args.clone(),
            sort: key.sort.clone(),
            quant: key.quant,
            structure_hash: structure,
            value_hash: value,
        });
        self.dedup.insert(key, id);
        id
    }

    /// Intern a leaf symbol.
    pub fn intern_symbol(&mut self, name: impl Into<String>, sort: Sort) -> TermId {
        self.intern(name, TermArgs::new(), sort, Quantification::None)
    }

    /// Operator name of a term.
    #[inline]
    pub fn op(&self, id: TermId) -> &str {
        &self.terms[id.index()].op
    }

    /// Children of a term.
    #[inline]
    pub fn args(&self, id: TermId) -> &[TermId] {
        &self.terms[id.index()].args
    }

    /// Result sort of a term.
    #[inline]
    pub fn sort(&self, id: TermId) -> &Sort {
        &self.terms[id.index()].sort
    }

    /// Quantification tag of a term.
    #[inline]
    pub fn quant(&self, id: TermId) -> Quantification {
        self.terms[id.index()].quant
    }

    /// Whether the term is an application (has operands).
    #[inline]
    pub fn is_application(&self, id: TermId) -> bool {
        !self.terms[id.index()].args.is_empty()
    }

    /// Structure (shape) hash, fixed at interning.
    #[inline]
    pub fn structure_hash(&self, id: TermId) -> u64 {
        self.terms[id.index()].structure_hash
    }

    /// Value hash, fixed at interning.
    #[inline]
    pub fn value_hash(&self, id: TermId) -> u64 {
        self.terms[id.index()].value_hash
    }

    /// Number of interned terms.
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the store is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Canonical rendering, used as the dedup key for facts and in
    /// traces: `f(x,+Z(y,1))`.
    pub fn render(&self, id: TermId) -> String {
        let data = &self.terms[id.index()];
        if data.args.is_empty() {
            return data.op.clone();
        }
        let mut out = String::with_capacity(16);
        out.push_str(&data.op);
        out.push('(');
        for (i, &a) in data.args.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&self.render(a));
        }
        out.push(')');
        out
    }

    /// Reconstruct an owned expression tree for a term.
    ///
    /// Used when a ground term bound by the matcher must be spliced into
    /// a theorem consequence template.
    pub fn to_expr(&self, id: TermId) -> Expr {
        let data = &self.terms[id.index()];
        Expr {
            op: data.op.clone(),
            args: data.args.iter().map(|&a| self.to_expr(a)).collect(),
            sort: data.sort.clone(),
            quant: data.quant,
        }
    }
}

/// Whether a symbol name denotes a literal constant (numeral, boolean,
/// or quoted string) rather than a named constant.
#[must_use]
pub fn is_literal_name(name: &str) -> bool {
    name == "true"
        || name == "false"
        || name.starts_with('"')
        || name.chars().next().is_some_and(|c| c.is_ascii_digit())
}
