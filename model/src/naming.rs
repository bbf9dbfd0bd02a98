//! Naming rules: how instances of a class are named per containing class.

use crate::{MClass, ModelCtx};
use modl_core::{ModlResult, ANY};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// One ordered piece of a name: an optional literal prefix and/or a
/// reference to a naming property on the target class.
#[derive(Debug, Clone)]
pub struct NameComponent {
    pub prefix: Option<String>,
    pub prop: Option<String>,
}

/// A naming rule keyed by a containing class (or the wildcard `any`).
#[derive(Debug)]
pub struct NameRule {
    key: String,
    components: RwLock<Vec<NameComponent>>,
}

impl NameRule {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            components: RwLock::new(Vec::new()),
        }
    }

    /// The containing-class global name, or `any`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn add_component(&self, component: NameComponent) {
        self.components.write().expect("naming lock").push(component);
    }

    pub fn components(&self) -> Vec<NameComponent> {
        self.components.read().expect("naming lock").clone()
    }
}

/// The naming rules of one class.
#[derive(Debug)]
pub struct Namer {
    class: String,
    rules: RwLock<BTreeMap<String, Arc<NameRule>>>,
}

impl Namer {
    pub fn new(class_gname: impl Into<String>) -> Self {
        Self {
            class: class_gname.into(),
            rules: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn class_gname(&self) -> &str {
        &self.class
    }

    pub fn get_or_create_rule(&self, key: &str) -> Arc<NameRule> {
        self.rules
            .write()
            .expect("naming lock")
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(NameRule::new(key)))
            .clone()
    }

    pub fn rule(&self, key: &str) -> Option<Arc<NameRule>> {
        self.rules.read().expect("naming lock").get(key).cloned()
    }

    pub fn rules(&self) -> Vec<Arc<NameRule>> {
        self.rules.read().expect("naming lock").values().cloned().collect()
    }

    /// Finds the naming rule for the given containing class: walks the
    /// containing class's own superclass chain most specific to root, then
    /// falls back to the wildcard `any` rule. Terminates within chain
    /// length + 1 steps.
    pub fn find_name_rule(
        &self,
        ctx: &ModelCtx,
        containing: Option<&Arc<MClass>>,
    ) -> ModlResult<Option<Arc<NameRule>>> {
        if let Some(containing) = containing {
            for ancestor in containing.chain(ctx)? {
                if let Some(rule) = self.rule(ancestor.gname()) {
                    return Ok(Some(rule));
                }
            }
        }
        Ok(self.rule(ANY))
    }
}
