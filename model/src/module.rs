//! Modules: namespaces grouping classes and types.

use std::collections::BTreeSet;
use std::sync::RwLock;

/// A namespace. Merge-only: any file may get-or-create a module and add
/// members to it.
#[derive(Debug)]
pub struct MModule {
    name: String,
    classes: RwLock<BTreeSet<String>>,
    types: RwLock<BTreeSet<String>>,
}

impl MModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: RwLock::new(BTreeSet::new()),
            types: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_class(&self, gname: &str) {
        self.classes.write().expect("module lock").insert(gname.to_string());
    }

    pub fn add_type(&self, gname: &str) {
        self.types.write().expect("module lock").insert(gname.to_string());
    }

    /// Global names of the module's classes, sorted.
    pub fn class_names(&self) -> Vec<String> {
        self.classes.read().expect("module lock").iter().cloned().collect()
    }

    /// Global names of the module's types, sorted.
    pub fn type_names(&self) -> Vec<String> {
        self.types.read().expect("module lock").iter().cloned().collect()
    }
}
