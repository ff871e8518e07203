//! Scope arena: dense ids for scope names.

use indexmap::IndexMap;

use super::ScopeId;

/// Interns scope names and hands out dense `ScopeId`s in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScopeSet {
    lookup: IndexMap<String, ScopeId>,
}

impl ScopeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> ScopeId {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = ScopeId(self.lookup.len() as u16);
        self.lookup.insert(name.to_owned(), id);
        id
    }

    pub fn resolve(&self, id: ScopeId) -> &str {
        self.lookup
            .get_index(id.index())
            .map(|(name, _)| name.as_str())
            .expect("scope id out of range")
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Iterate `(id, name)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &str)> {
        self.lookup
            .keys()
            .enumerate()
            .map(|(i, name)| (ScopeId(i as u16), name.as_str()))
    }

    /// Rewrite every name through `f`, merging names that coincide
    /// afterwards. Returns the old-id → new-id remap. Merged names keep the
    /// lowest id among their members.
    pub fn rewrite_names(&mut self, f: impl Fn(&str) -> String) -> Vec<ScopeId> {
        let mut rebuilt: IndexMap<String, ScopeId> = IndexMap::with_capacity(self.lookup.len());
        let mut remap = Vec::with_capacity(self.lookup.len());

        for name in self.lookup.keys() {
            let new_name = f(name);
            let next = ScopeId(rebuilt.len() as u16);
            let id = *rebuilt.entry(new_name).or_insert(next);
            remap.push(id);
        }

        self.lookup = rebuilt;
        remap
    }
}
