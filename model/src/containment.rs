//! Containment rules: dual-registered Contained/Container views.

use crate::{MClass, ModelCtx};
use modl_core::ModlResult;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

/// The child-keyed view: which classes may contain this class.
#[derive(Debug)]
pub struct Contained {
    class: String,
    parents: RwLock<BTreeSet<String>>,
}

impl Contained {
    pub fn new(class_gname: impl Into<String>) -> Self {
        Self {
            class: class_gname.into(),
            parents: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn class_gname(&self) -> &str {
        &self.class
    }

    pub fn parent_names(&self) -> Vec<String> {
        self.parents.read().expect("containment lock").iter().cloned().collect()
    }

    pub fn has_parent(&self, gname: &str) -> bool {
        self.parents.read().expect("containment lock").contains(gname)
    }

    /// Parent classes with abstract endpoints expanded to their concrete
    /// descendants, at read time.
    pub fn concrete_parents(&self, ctx: &ModelCtx) -> ModlResult<Vec<Arc<MClass>>> {
        expand_concrete(ctx, &self.parent_names())
    }

    fn add_parent(&self, gname: &str) {
        self.parents.write().expect("containment lock").insert(gname.to_string());
    }
}

/// The parent-keyed view: which classes this class may contain.
#[derive(Debug)]
pub struct Container {
    class: String,
    children: RwLock<BTreeSet<String>>,
}

impl Container {
    pub fn new(class_gname: impl Into<String>) -> Self {
        Self {
            class: class_gname.into(),
            children: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn class_gname(&self) -> &str {
        &self.class
    }

    pub fn child_names(&self) -> Vec<String> {
        self.children.read().expect("containment lock").iter().cloned().collect()
    }

    pub fn has_child(&self, gname: &str) -> bool {
        self.children.read().expect("containment lock").contains(gname)
    }

    /// Child classes with abstract endpoints expanded to their concrete
    /// descendants, at read time.
    pub fn concrete_children(&self, ctx: &ModelCtx) -> ModlResult<Vec<Arc<MClass>>> {
        expand_concrete(ctx, &self.child_names())
    }

    fn add_child(&self, gname: &str) {
        self.children.write().expect("containment lock").insert(gname.to_string());
    }
}

/// Registers one containment rule in both views. The Contained and
/// Container sides are always created together, never one alone.
pub fn add_rule(ctx: &ModelCtx, parent_gname: &str, child_gname: &str) {
    let contained = ctx
        .contained
        .get_or_create(child_gname, || Contained::new(child_gname));
    let container = ctx
        .containers
        .get_or_create(parent_gname, || Container::new(parent_gname));
    contained.add_parent(parent_gname);
    container.add_child(child_gname);
}

/// Expands a set of rule endpoints: a concrete class stands for itself,
/// an abstract class for its concrete descendants. Shared with the
/// relationship views, which expand their endpoints the same way.
pub(crate) fn expand_concrete(ctx: &ModelCtx, gnames: &[String]) -> ModlResult<Vec<Arc<MClass>>> {
    let mut result: BTreeMap<String, Arc<MClass>> = BTreeMap::new();
    for gname in gnames {
        let class = ctx.classes.require(gname)?;
        if class.is_concrete() {
            result.insert(class.gname().to_string(), class);
        } else {
            for descendant in ctx.concrete_descendants(gname)? {
                result.insert(descendant.gname().to_string(), descendant);
            }
        }
    }
    Ok(result.into_values().collect())
}
