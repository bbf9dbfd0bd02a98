//! Ownership rules: tagging classes with their owning component.

use crate::{MClass, ModelCtx};
use modl_core::{ModlResult, WILDCARD};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

/// One wildcard-capable matching rule: module name and class local name,
/// either of which may be `*`.
#[derive(Debug, Clone)]
pub struct OwnerRule {
    pub module: String,
    pub class: String,
}

impl OwnerRule {
    pub fn matches(&self, class: &MClass) -> bool {
        (self.module == WILDCARD || self.module == class.module())
            && (self.class == WILDCARD || self.class == class.lname())
    }
}

/// An owner aggregates matching rules; the resolved class set is the
/// union of all rule matches.
#[derive(Debug)]
pub struct Owner {
    name: String,
    rules: RwLock<Vec<OwnerRule>>,
}

impl Owner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_rule(&self, rule: OwnerRule) {
        self.rules.write().expect("owner lock").push(rule);
    }

    pub fn rules(&self) -> Vec<OwnerRule> {
        self.rules.read().expect("owner lock").clone()
    }

    /// All classes matched by any rule, deduplicated, sorted by global
    /// name.
    pub fn classes(&self, ctx: &ModelCtx) -> Vec<Arc<MClass>> {
        let rules = self.rules();
        let mut matched: BTreeMap<String, Arc<MClass>> = BTreeMap::new();
        for class in ctx.classes.values() {
            if rules.iter().any(|r| r.matches(&class)) {
                matched.insert(class.gname().to_string(), class);
            }
        }
        matched.into_values().collect()
    }
}

/// Post-stage callback: tags every class resolved by every owner. Owners
/// are visited in sorted-name order; when several owners claim one class
/// the class ends up carrying all their tags, and the overlap is reported
/// as a warning since no arbitration policy exists.
pub fn tag_all(ctx: &ModelCtx) -> ModlResult<()> {
    for owner in ctx.owners.values() {
        for class in owner.classes(ctx) {
            let already = class.owners();
            if !already.is_empty() && !already.contains(&owner.name().to_string()) {
                warn!(
                    class = class.gname(),
                    owner = owner.name(),
                    previous = already.join(","),
                    "class claimed by multiple owners"
                );
            }
            class.add_owner(owner.name());
        }
    }
    Ok(())
}
