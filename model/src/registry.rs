//! Synchronized, name-keyed entity registries.
//!
//! One registry per category, owned by [`crate::ModelCtx`]. Creation is
//! idempotent get-or-create so the parallel LOAD stage may first-touch the
//! same entity from different files; mutation of already-created entities
//! must stay merge-only (order-insensitive).

use modl_core::{Fatal, ModlResult};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// A name-keyed registry of entities of one category.
pub struct Registry<T> {
    category: &'static str,
    items: RwLock<BTreeMap<String, Arc<T>>>,
}

impl<T> Registry<T> {
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            items: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    pub fn get(&self, gname: &str) -> Option<Arc<T>> {
        self.items.read().expect("registry lock").get(gname).cloned()
    }

    /// Lookup that treats absence as a broken cross-reference.
    pub fn require(&self, gname: &str) -> ModlResult<Arc<T>> {
        self.get(gname).ok_or_else(|| {
            Fatal::new(
                format!("{}[{}]", self.category, gname),
                "lookup",
                "not found",
            )
        })
    }

    /// Gets the entity under `gname`, creating it with `make` on first
    /// touch. Concurrent creation from different files converges to one
    /// instance.
    pub fn get_or_create(&self, gname: &str, make: impl FnOnce() -> T) -> Arc<T> {
        if let Some(existing) = self.get(gname) {
            return existing;
        }
        let mut items = self.items.write().expect("registry lock");
        items
            .entry(gname.to_string())
            .or_insert_with(|| Arc::new(make()))
            .clone()
    }

    /// Inserts a freshly defined entity; a second definition under the same
    /// global name is fatal.
    pub fn insert_new(&self, gname: &str, item: T) -> ModlResult<Arc<T>> {
        let mut items = self.items.write().expect("registry lock");
        if items.contains_key(gname) {
            return Err(Fatal::new(
                format!("{}[{}]", self.category, gname),
                "definition",
                "duplicate global name",
            ));
        }
        let item = Arc::new(item);
        items.insert(gname.to_string(), item.clone());
        Ok(item)
    }

    /// Global names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.items.read().expect("registry lock").keys().cloned().collect()
    }

    /// Snapshot of all entities, sorted by global name.
    pub fn values(&self) -> Vec<Arc<T>> {
        self.items.read().expect("registry lock").values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.read().expect("registry lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("category", &self.category)
            .field("len", &self.len())
            .finish()
    }
}
