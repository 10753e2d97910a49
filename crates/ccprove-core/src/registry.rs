//! Union-find registry over symbol names.
//!
//! Maps every symbol observed during one proving session to a slot and
//! tracks which symbols have been merged into one congruence class.
//! `find` uses path compression; `union` is by rank with the
//! smaller-index slot preferred as root, so earlier-registered symbols
//! (like `true` and `false`) tend to stay representatives.
//!
//! One registry exists per VC and dies with it — congruence learned
//! while proving one VC must not leak into another.

use rustc_hash::FxHashMap;

/// Slot index of a registered symbol.
pub type SymbolId = usize;

/// Union-find forest over symbol names.
#[derive(Debug, Default)]
pub struct Registry {
    index: FxHashMap<String, SymbolId>,
    names: Vec<String>,
    parent: Vec<SymbolId>,
    rank: Vec<u32>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the symbol a slot if unseen; idempotent.
    pub fn register(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len();
        self.index.insert(name.to_string(), id);
        self.names.push(name.to_string());
        self.parent.push(id);
        self.rank.push(0);
        id
    }

    /// Whether the symbol has ever been registered.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Slot of a registered symbol.
    #[inline]
    pub fn id_of(&self, name: &str) -> Option<SymbolId> {
        self.index.get(name).copied()
    }

    /// Name stored at a slot.
    #[inline]
    pub fn name(&self, id: SymbolId) -> &str {
        &self.names[id]
    }

    /// Number of registered symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no symbol has been registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Canonical representative, with path compression.
    pub fn find(&mut self, x: SymbolId) -> SymbolId {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    /// Canonical representative without mutating the forest.
    ///
    /// Used by read-only queries (matching, scoring) that hold a shared
    /// borrow of the owning model.
    pub fn probe(&self, mut x: SymbolId) -> SymbolId {
        while self.parent[x] != x {
            x = self.parent[x];
        }
        x
    }

    /// Merge the classes of `a` and `b`; returns the surviving root.
    pub fn union(&mut self, a: SymbolId, b: SymbolId) -> SymbolId {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return ra;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => {
                self.parent[ra] = rb;
                rb
            }
            std::cmp::Ordering::Greater => {
                self.parent[rb] = ra;
                ra
            }
            std::cmp::Ordering::Equal => {
                // Prefer the smaller index as root.
                let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
                self.parent[child] = root;
                self.rank[root] += 1;
                root
            }
        }
    }

    /// Root symbol name for a symbol name; an unregistered name maps to
    /// itself.
    pub fn root_symbol(&mut self, name: &str) -> String {
        match self.id_of(name) {
            Some(id) => {
                let root = self.find(id);
                self.names[root].clone()
            }
            None => name.to_string(),
        }
    }

    /// Read-only variant of [`Registry::root_symbol`].
    pub fn probe_root_symbol(&self, name: &str) -> String {
        match self.id_of(name) {
            Some(id) => self.names[self.probe(id)].clone(),
            None => name.to_string(),
        }
    }
}
