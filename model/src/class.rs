//! Classes and the superclass chain.

use crate::{ModelCtx, MProp, PropAction, XRef};
use modl_core::{Fatal, ModlResult, Origin};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

/// A class of the object model.
///
/// The superclass is a lazy cross-reference; every chain walk carries a
/// visited set and reports an authored cycle as fatal instead of looping.
#[derive(Debug)]
pub struct MClass {
    gname: String,
    lname: String,
    module: String,
    concrete: bool,
    origin: Origin,
    superclass: XRef<MClass>,
    props: RwLock<BTreeMap<String, Arc<MProp>>>,
    owners: RwLock<BTreeSet<String>>,
}

impl MClass {
    pub fn new(
        module: impl Into<String>,
        lname: impl Into<String>,
        concrete: bool,
        origin: Origin,
    ) -> Self {
        let module = module.into();
        let lname = lname.into();
        Self {
            gname: modl_core::global_name(Some(&module), &lname),
            lname,
            module,
            concrete,
            origin,
            superclass: XRef::new(),
            props: RwLock::new(BTreeMap::new()),
            owners: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn gname(&self) -> &str {
        &self.gname
    }

    pub fn lname(&self) -> &str {
        &self.lname
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn is_concrete(&self) -> bool {
        self.concrete
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn fatal(&self, operation: impl Into<String>, cause: impl Into<String>) -> Fatal {
        Fatal::new(format!("mclass[{}]", self.gname), operation, cause)
    }

    /// Records the superclass name and maintains the direct-subclass index.
    pub fn set_super(&self, ctx: &ModelCtx, super_gname: &str) -> ModlResult<()> {
        self.superclass
            .set_name(super_gname, &format!("mclass[{}]", self.gname))?;
        ctx.register_subclass(super_gname, &self.gname);
        Ok(())
    }

    pub fn super_name(&self) -> Option<&str> {
        self.superclass.name()
    }

    pub fn superclass(&self, ctx: &ModelCtx) -> ModlResult<Option<Arc<MClass>>> {
        self.superclass
            .resolve(&format!("mclass[{}]", self.gname), |name| {
                ctx.classes.get(name)
            })
    }

    /// The inheritance chain, most specific first (self included).
    pub fn chain(self: &Arc<Self>, ctx: &ModelCtx) -> ModlResult<Vec<Arc<MClass>>> {
        let mut chain = vec![self.clone()];
        let mut visited = BTreeSet::from([self.gname.clone()]);
        let mut current = self.clone();
        while let Some(sup) = current.superclass(ctx)? {
            if !visited.insert(sup.gname.clone()) {
                return Err(self.fatal(
                    "superclass walk",
                    format!("inheritance cycle through '{}'", sup.gname),
                ));
            }
            chain.push(sup.clone());
            current = sup;
        }
        Ok(chain)
    }

    /// True when `ancestor` appears on this class's chain (self included).
    pub fn derives_from(self: &Arc<Self>, ctx: &ModelCtx, ancestor: &str) -> ModlResult<bool> {
        Ok(self.chain(ctx)?.iter().any(|c| c.gname() == ancestor))
    }

    pub fn add_prop(&self, prop: Arc<MProp>) -> ModlResult<()> {
        let mut props = self.props.write().expect("class lock");
        if props.contains_key(prop.lname()) {
            return Err(self.fatal(
                "property definition",
                format!("duplicate property '{}'", prop.lname()),
            ));
        }
        props.insert(prop.lname().to_string(), prop);
        Ok(())
    }

    /// The class's own property under `lname`, ignoring inheritance.
    pub fn own_prop(&self, lname: &str) -> Option<Arc<MProp>> {
        self.props.read().expect("class lock").get(lname).cloned()
    }

    pub fn own_props(&self) -> Vec<Arc<MProp>> {
        self.props.read().expect("class lock").values().cloned().collect()
    }

    /// The nearest property under `lname` along the inheritance chain.
    pub fn find_prop(self: &Arc<Self>, ctx: &ModelCtx, lname: &str) -> ModlResult<Option<Arc<MProp>>> {
        for class in self.chain(ctx)? {
            if let Some(prop) = class.own_prop(lname) {
                return Ok(Some(prop));
            }
        }
        Ok(None)
    }

    /// Override-collapsed, non-hidden property set: for each name the
    /// nearest declaration wins; names whose nearest declaration is HIDE
    /// are excluded (they stay reachable through chain lookups).
    pub fn resolved_props(self: &Arc<Self>, ctx: &ModelCtx) -> ModlResult<Vec<Arc<MProp>>> {
        let mut nearest: BTreeMap<String, Arc<MProp>> = BTreeMap::new();
        for class in self.chain(ctx)? {
            for prop in class.own_props() {
                nearest.entry(prop.lname().to_string()).or_insert(prop);
            }
        }
        Ok(nearest
            .into_values()
            .filter(|p| p.action() != PropAction::Hide)
            .collect())
    }

    /// Tags this class as belonging to an owner. Returns false when the
    /// tag was already present.
    pub fn add_owner(&self, owner: &str) -> bool {
        self.owners.write().expect("class lock").insert(owner.to_string())
    }

    pub fn owners(&self) -> Vec<String> {
        self.owners.read().expect("class lock").iter().cloned().collect()
    }
}
