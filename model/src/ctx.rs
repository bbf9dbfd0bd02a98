//! The model context: one registry per category.
//!
//! An explicit context object, passed by reference through the loader and
//! dispatcher, owns every category registry. There is no process-wide
//! state; two contexts never share entities.

use crate::{
    Contained, Container, MClass, MConst, MModule, MProp, MType, MValidator, Namer, Owner,
    Registry, Related, Relator,
};
use modl_core::ModlResult;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, RwLock};

/// Shared model state for one compile run.
#[derive(Debug)]
pub struct ModelCtx {
    pub modules: Registry<MModule>,
    pub classes: Registry<MClass>,
    pub types: Registry<MType>,
    pub props: Registry<MProp>,
    pub consts: Registry<MConst>,
    pub validators: Registry<MValidator>,
    pub contained: Registry<Contained>,
    pub containers: Registry<Container>,
    pub relators: Registry<Relator>,
    pub related: Registry<Related>,
    pub namers: Registry<Namer>,
    pub owners: Registry<Owner>,
    /// Direct-subclass index, maintained when a superclass is recorded.
    /// Merge-only, so it is safe to populate during the parallel stage.
    subclasses: RwLock<BTreeMap<String, BTreeSet<String>>>,
}

impl ModelCtx {
    pub fn new() -> Self {
        Self {
            modules: Registry::new("module"),
            classes: Registry::new("mclass"),
            types: Registry::new("mtype"),
            props: Registry::new("mprop"),
            consts: Registry::new("mconst"),
            validators: Registry::new("mvalidator"),
            contained: Registry::new("contained"),
            containers: Registry::new("container"),
            relators: Registry::new("relator"),
            related: Registry::new("related"),
            namers: Registry::new("namer"),
            owners: Registry::new("owner"),
            subclasses: RwLock::new(BTreeMap::new()),
        }
    }

    pub(crate) fn register_subclass(&self, super_gname: &str, sub_gname: &str) {
        self.subclasses
            .write()
            .expect("subclass lock")
            .entry(super_gname.to_string())
            .or_default()
            .insert(sub_gname.to_string());
    }

    /// Global names of the direct subclasses of `gname`, sorted.
    pub fn direct_subclasses(&self, gname: &str) -> Vec<String> {
        self.subclasses
            .read()
            .expect("subclass lock")
            .get(gname)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The concrete strict descendants of `gname`, sorted by global name.
    /// Walks the subclass index breadth-first with a visited set.
    pub fn concrete_descendants(&self, gname: &str) -> ModlResult<Vec<Arc<MClass>>> {
        let mut result: BTreeMap<String, Arc<MClass>> = BTreeMap::new();
        let mut visited = BTreeSet::from([gname.to_string()]);
        let mut queue: VecDeque<String> = self.direct_subclasses(gname).into();
        while let Some(name) = queue.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let class = self.classes.require(&name)?;
            if class.is_concrete() {
                result.insert(name.clone(), class);
            }
            queue.extend(self.direct_subclasses(&name));
        }
        Ok(result.into_values().collect())
    }
}

impl Default for ModelCtx {
    fn default() -> Self {
        Self::new()
    }
}
