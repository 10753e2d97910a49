//! Per-VC congruence-closure model.
//!
//! A [`Conjunct`] owns the working state for one verification
//! condition: the interned term arena, the symbol registry
//! (union-find), the asserted ground facts, and the goal. Asserting a
//! fact merges congruence classes and propagates the congruence rule —
//! applications whose argument classes have merged are merged
//! themselves — via a signature table and per-class use lists, the
//! classic worklist formulation.
//!
//! Three built-in propagation rules connect the Boolean skeleton to the
//! equality core:
//!
//! - an equality term entering `true`'s class merges its sides;
//! - an equality term whose sides become congruent merges with `true`;
//! - `<=B(a,b)` and `<=B(b,a)` both true merge `a` with `b`.
//!
//! Facts are only ever added, never retracted, so `is_proved` is
//! monotonic: once true it stays true for the life of the model.
//! Deadline expiry mid-merge abandons the remaining worklist — a missed
//! merge loses completeness, never soundness.

use crate::canon;
use crate::error::CoreResult;
use crate::expr::{Expr, Vc};
use crate::registry::{Registry, SymbolId};
use crate::term::{TermId, TermStore};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;
use std::time::Instant;

/// Congruence signature: operator root plus argument class roots.
type Signature = (SymbolId, SmallVec<[SymbolId; 2]>);

/// Working congruence-closure state for one VC.
pub struct Conjunct {
    name: String,
    store: TermStore,
    registry: Registry,
    /// Registry slot naming each registered term's congruence class.
    term_sym: FxHashMap<TermId, SymbolId>,
    /// Registration order; drives deterministic iteration in matching.
    registered: Vec<TermId>,
    /// (op root, arg roots) -> representative application.
    sig_table: FxHashMap<Signature, TermId>,
    /// Applications mentioning a class among their arguments.
    use_lists: FxHashMap<SymbolId, Vec<TermId>>,
    /// Application members of each class, keyed by current root.
    class_apps: FxHashMap<SymbolId, Vec<TermId>>,
    /// Merge worklist.
    pending: Vec<(SymbolId, SymbolId)>,
    facts: Vec<TermId>,
    facts_seen: FxHashSet<TermId>,
    consequents: Vec<TermId>,
    true_sym: SymbolId,
    false_sym: SymbolId,
    proved: bool,
}

impl Conjunct {
    /// Build the model for a VC: consequents are registered (never
    /// asserted), antecedents are asserted as facts.
    pub fn from_vc(vc: &Vc, deadline: Instant) -> CoreResult<Self> {
        let mut store = TermStore::new();
        let t_true = store.intern_symbol("true", crate::sort::Sort::Bool);
        let t_false = store.intern_symbol("false", crate::sort::Sort::Bool);

        let mut model = Conjunct {
            name: vc.name.clone(),
            store,
            registry: Registry::new(),
            term_sym: FxHashMap::default(),
            registered: Vec::new(),
            sig_table: FxHashMap::default(),
            use_lists: FxHashMap::default(),
            class_apps: FxHashMap::default(),
            pending: Vec::new(),
            facts: Vec::new(),
            facts_seen: FxHashSet::default(),
            consequents: Vec::new(),
            true_sym: 0,
            false_sym: 0,
            proved: false,
        };
        model.true_sym = model.register_term(t_true);
        model.false_sym = model.register_term(t_false);

        for goal in &vc.consequents {
            let id = canon::canonicalize(goal, &mut model.store)?;
            model.consequents.push(id);
            model.register_term(id);
        }
        model.process(deadline);

        for fact in &vc.antecedents {
            let id = canon::canonicalize(fact, &mut model.store)?;
            model.add_expression(id, deadline);
        }
        model.check_goal();
        Ok(model)
    }

    /// VC name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The interned term arena.
    pub fn store(&self) -> &TermStore {
        &self.store
    }

    /// All registered terms, in registration order.
    pub fn registered_terms(&self) -> &[TermId] {
        &self.registered
    }

    /// Canonicalize an already-ground expression into this model's
    /// arena without asserting it.
    pub fn canonicalize_into(&mut self, expr: &Expr) -> CoreResult<TermId> {
        canon::canonicalize(expr, &mut self.store)
    }

    /// Assert a canonicalized ground fact.
    ///
    /// An equality fact merges its sides (and itself with `true`); any
    /// other fact is merged with `true`. Safe to call repeatedly with
    /// the same term. Merge work past `deadline` is abandoned, leaving
    /// the model consistent but possibly incomplete.
    pub fn add_expression(&mut self, fact: TermId, deadline: Instant) {
        if self.facts_seen.insert(fact) {
            self.facts.push(fact);
        }
        let sym = self.register_term(fact);
        let args: SmallVec<[TermId; 2]> = SmallVec::from_slice(self.store.args(fact));
        if self.store.op(fact) == "=B" && args.len() == 2 {
            let sl = self.term_sym[&args[0]];
            let sr = self.term_sym[&args[1]];
            self.pending.push((sl, sr));
        }
        self.pending.push((sym, self.true_sym));
        self.process(deadline);
    }

    /// Whether the goal is entailed. Monotonic: latches true.
    #[inline]
    pub fn is_proved(&self) -> bool {
        self.proved
    }

    /// Operator symbols applied anywhere in the model.
    ///
    /// `+` and `-` are mutually derivable under canonicalization (binary
    /// minus is rewritten to plus of a negation), so each implies the
    /// other at the same overload tag.
    pub fn function_names(&self) -> FxHashSet<String> {
        let mut set = FxHashSet::default();
        for &t in &self.registered {
            if self.store.is_application(t) {
                set.insert(self.store.op(t).to_string());
            }
        }
        let twins: Vec<String> = set
            .iter()
            .filter_map(|n| {
                n.strip_prefix('-')
                    .map(|rest| format!("+{}", rest))
                    .or_else(|| n.strip_prefix('+').map(|rest| format!("-{}", rest)))
            })
            .collect();
        set.extend(twins);
        set
    }

    /// Per-symbol occurrence counts over the goal, keyed by class root.
    ///
    /// Low counts mark rare, distinctive symbols; the prioritizer
    /// treats smaller weights as more relevant.
    pub fn goal_symbols(&self) -> FxHashMap<String, i64> {
        let mut map = FxHashMap::default();
        for &c in &self.consequents {
            self.count_symbols(c, &mut map);
        }
        map
    }

    fn count_symbols(&self, t: TermId, map: &mut FxHashMap<String, i64>) {
        let root = self.registry.probe_root_symbol(self.store.op(t));
        *map.entry(root).or_insert(0) += 1;
        for &a in self.store.args(t) {
            self.count_symbols(a, map);
        }
    }

    /// Current class root of a registered term.
    pub fn term_root(&self, t: TermId) -> SymbolId {
        self.registry.probe(self.term_sym[&t])
    }

    /// Current class root of a symbol name, if registered.
    pub fn name_root(&self, name: &str) -> Option<SymbolId> {
        self.registry.id_of(name).map(|id| self.registry.probe(id))
    }

    /// Whether two registered terms sit in one congruence class.
    pub fn same_class(&self, a: TermId, b: TermId) -> bool {
        self.term_root(a) == self.term_root(b)
    }

    /// Application members of a term's congruence class.
    pub fn congruent_applications(&self, t: TermId) -> &[TermId] {
        self.class_apps
            .get(&self.term_root(t))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether a symbol name was ever registered in this model.
    pub fn registry_contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Root symbol name for a name; unregistered names map to
    /// themselves.
    pub fn root_symbol(&self, name: &str) -> String {
        self.registry.probe_root_symbol(name)
    }

    fn register_term(&mut self, t: TermId) -> SymbolId {
        if let Some(&sym) = self.term_sym.get(&t) {
            return sym;
        }
        let args: SmallVec<[TermId; 2]> = SmallVec::from_slice(self.store.args(t));
        for &a in &args {
            self.register_term(a);
        }

        let sym = if args.is_empty() {
            let name = self.store.op(t).to_string();
            self.registry.register(&name)
        } else {
            let rendered = self.store.render(t);
            self.registry.register(&rendered)
        };
        self.term_sym.insert(t, sym);
        self.registered.push(t);

        if !args.is_empty() {
            let op = self.store.op(t).to_string();
            self.registry.register(&op);

            let sig = self.signature(t);
            for &root in sig.1.iter() {
                self.use_lists.entry(root).or_default().push(t);
            }
            match self.sig_table.get(&sig) {
                Some(&other) if other != t => {
                    let sym_other = self.term_sym[&other];
                    self.pending.push((sym, sym_other));
                }
                _ => {
                    self.sig_table.insert(sig, t);
                }
            }
            let root = self.registry.find(sym);
            self.class_apps.entry(root).or_default().push(t);
            self.apply_rules(t);
        }
        sym
    }

    fn signature(&mut self, t: TermId) -> Signature {
        let op_id = self
            .registry
            .id_of(self.store.op(t))
            .expect("operator registered with its application");
        let op_root = self.registry.find(op_id);
        let arg_ids: SmallVec<[TermId; 2]> = SmallVec::from_slice(self.store.args(t));
        let mut roots = SmallVec::new();
        for a in arg_ids {
            let sym = self.term_sym[&a];
            roots.push(self.registry.find(sym));
        }
        (op_root, roots)
    }

    /// Drain the merge worklist, propagating congruence and the
    /// built-in rules, then re-check the goal.
    fn process(&mut self, deadline: Instant) {
        while let Some((a, b)) = self.pending.pop() {
            if Instant::now() > deadline {
                let dropped = self.pending.len() + 1;
                self.pending.clear();
                tracing::debug!(vc = %self.name, dropped, "deadline hit mid-merge; abandoning remaining merge work");
                break;
            }
            let ra = self.registry.find(a);
            let rb = self.registry.find(b);
            if ra == rb {
                continue;
            }
            let root = self.registry.union(ra, rb);
            let loser = if root == ra { rb } else { ra };

            let moved_uses = self.use_lists.remove(&loser).unwrap_or_default();
            let moved_apps = self.class_apps.remove(&loser).unwrap_or_default();
            self.class_apps.entry(root).or_default().extend(moved_apps);

            // Applications over the losing class change signature; a
            // collision with an existing signature is a congruence.
            for &t in &moved_uses {
                let sig = self.signature(t);
                let sym_t = self.term_sym[&t];
                match self.sig_table.get(&sig) {
                    Some(&other) if other != t => {
                        let sym_other = self.term_sym[&other];
                        self.pending.push((sym_t, sym_other));
                    }
                    _ => {
                        self.sig_table.insert(sig, t);
                    }
                }
            }

            let mut affected: Vec<TermId> = self
                .class_apps
                .get(&root)
                .cloned()
                .unwrap_or_default();
            affected.extend(moved_uses.iter().copied());
            self.use_lists.entry(root).or_default().extend(moved_uses);

            for t in affected {
                self.apply_rules(t);
            }
        }
        self.check_goal();
    }

    /// Built-in propagation rules for one application term.
    fn apply_rules(&mut self, t: TermId) {
        let op = self.store.op(t).to_string();
        let args: SmallVec<[TermId; 2]> = SmallVec::from_slice(self.store.args(t));
        if args.len() != 2 {
            return;
        }
        let st = self.term_sym[&t];
        let sl = self.term_sym[&args[0]];
        let sr = self.term_sym[&args[1]];

        if op == "=B" {
            if self.registry.find(sl) == self.registry.find(sr) {
                self.pending.push((st, self.true_sym));
            }
            if self.registry.find(st) == self.registry.find(self.true_sym) {
                self.pending.push((sl, sr));
            }
        } else if op == "<=B"
            && self.registry.find(st) == self.registry.find(self.true_sym)
        {
            // Antisymmetry: both directions true forces the operands
            // together.
            let op_id = self
                .registry
                .id_of("<=B")
                .expect("operator registered with its application");
            let op_root = self.registry.find(op_id);
            let ra = self.registry.find(sl);
            let rb = self.registry.find(sr);
            let flipped: Signature = (op_root, SmallVec::from_slice(&[rb, ra]));
            if let Some(&other) = self.sig_table.get(&flipped) {
                let s_other = self.term_sym[&other];
                if self.registry.find(s_other) == self.registry.find(self.true_sym) {
                    self.pending.push((sl, sr));
                }
            }
        }
    }

    fn check_goal(&mut self) {
        if self.proved {
            return;
        }
        let true_root = self.registry.probe(self.true_sym);
        let false_root = self.registry.probe(self.false_sym);
        if true_root == false_root {
            // The asserted facts are inconsistent; everything follows.
            self.proved = true;
            return;
        }
        self.proved = self
            .consequents
            .iter()
            .all(|&c| self.consequent_holds(c, true_root));
    }

    fn consequent_holds(&self, c: TermId, true_root: SymbolId) -> bool {
        if self.registry.probe(self.term_sym[&c]) == true_root {
            return true;
        }
        let args = self.store.args(c);
        self.store.op(c) == "=B"
            && args.len() == 2
            && self.term_root(args[0]) == self.term_root(args[1])
    }
}

impl fmt::Display for Conjunct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.name)?;
        if self.facts.is_empty() {
            write!(f, "true")?;
        }
        for (i, &t) in self.facts.iter().enumerate() {
            if i > 0 {
                write!(f, " and ")?;
            }
            write!(f, "{}", self.store.render(t))?;
        }
        write!(f, " ==> ")?;
        for (i, &c) in self.consequents.iter().enumerate() {
            if i > 0 {
                write!(f, " and ")?;
            }
            write!(f, "{}", self.store.render(c))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Sort;
    use std::time::Duration;

    fn far() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    fn x() -> Expr {
        Expr::symbol("x", Sort::Int)
    }

    fn y() -> Expr {
        Expr::symbol("y", Sort::Int)
    }

    #[test]
    fn test_symmetry_proved_without_theorems() {
        let vc = Vc::new("sym", vec![Expr::eq(x(), y())], vec![Expr::eq(y(), x())]);
        let model = Conjunct::from_vc(&vc, far()).unwrap();
        assert!(model.is_proved());
    }

    #[test]
    fn test_antisymmetry_of_lte() {
        let vc = Vc::new(
            "antisym",
            vec![Expr::lte(x(), y()), Expr::lte(y(), x())],
            vec![Expr::eq(x(), y())],
        );
        let model = Conjunct::from_vc(&vc, far()).unwrap();
        assert!(model.is_proved());
    }

    #[test]
    fn test_congruence_of_applications() {
        let f = |arg: Expr| Expr::apply("f", vec![arg], Sort::Int);
        let vc = Vc::new(
            "congr",
            vec![Expr::eq(x(), y())],
            vec![Expr::eq(f(x()), f(y()))],
        );
        let model = Conjunct::from_vc(&vc, far()).unwrap();
        assert!(model.is_proved());
    }

    #[test]
    fn test_unrelated_goal_not_proved() {
        let z = Expr::symbol("z", Sort::Int);
        let vc = Vc::new("open", vec![Expr::eq(x(), y())], vec![Expr::eq(x(), z)]);
        let model = Conjunct::from_vc(&vc, far()).unwrap();
        assert!(!model.is_proved());
    }

    #[test]
    fn test_contradictory_antecedents_prove_anything() {
        let p = Expr::symbol("p", Sort::Bool);
        let z = Expr::symbol("z", Sort::Int);
        let vc = Vc::new(
            "boom",
            vec![p.clone(), Expr::not(p)],
            vec![Expr::eq(x(), z)],
        );
        let model = Conjunct::from_vc(&vc, far()).unwrap();
        assert!(model.is_proved());
    }

    #[test]
    fn test_is_proved_is_monotonic() {
        let vc = Vc::new("mono", vec![Expr::eq(x(), y())], vec![Expr::eq(y(), x())]);
        let mut model = Conjunct::from_vc(&vc, far()).unwrap();
        assert!(model.is_proved());
        let z = Expr::symbol("z", Sort::Int);
        let extra = model.canonicalize_into(&Expr::eq(x(), z)).unwrap();
        model.add_expression(extra, far());
        assert!(model.is_proved());
    }

    #[test]
    fn test_function_names_include_plus_minus_twins() {
        let vc = Vc::new(
            "ops",
            vec![Expr::eq(Expr::minus(x(), y()), x())],
            vec![Expr::eq(x(), y())],
        );
        let model = Conjunct::from_vc(&vc, far()).unwrap();
        let names = model.function_names();
        assert!(names.contains("+Z"));
        assert!(names.contains("-Z"));
        assert!(names.contains("=B"));
    }

    #[test]
    fn test_goal_symbols_count_occurrences() {
        let f = |arg: Expr| Expr::apply("f", vec![arg], Sort::Int);
        let vc = Vc::new("goal", vec![], vec![Expr::eq(f(x()), f(y()))]);
        let model = Conjunct::from_vc(&vc, far()).unwrap();
        let goal = model.goal_symbols();
        assert_eq!(goal.get("fZ"), Some(&2));
        assert_eq!(goal.get("x"), Some(&1));
        assert_eq!(goal.get("=B"), Some(&1));
    }

    #[test]
    fn test_add_expression_idempotent() {
        let vc = Vc::new("idem", vec![], vec![Expr::eq(x(), y())]);
        let mut model = Conjunct::from_vc(&vc, far()).unwrap();
        let fact = model.canonicalize_into(&Expr::eq(x(), y())).unwrap();
        model.add_expression(fact, far());
        model.add_expression(fact, far());
        assert!(model.is_proved());
    }
}
