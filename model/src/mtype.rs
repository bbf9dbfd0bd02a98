//! Types and the primitive-ancestor chain.

use crate::{ConstSet, ModelCtx, ValidatorSet, XRef};
use modl_core::{Fatal, ModlResult, Origin};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A data type. Types form their own inheritance chain whose root is the
/// primitive ancestor; constants and validators attach here as well as on
/// properties.
#[derive(Debug)]
pub struct MType {
    gname: String,
    lname: String,
    module: String,
    origin: Origin,
    supertype: XRef<MType>,
    consts: ConstSet,
    validators: ValidatorSet,
}

impl MType {
    pub fn new(module: impl Into<String>, lname: impl Into<String>, origin: Origin) -> Self {
        let module = module.into();
        let lname = lname.into();
        Self {
            gname: modl_core::global_name(Some(&module), &lname),
            lname,
            module,
            origin,
            supertype: XRef::new(),
            consts: ConstSet::new(),
            validators: ValidatorSet::new(),
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

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn consts(&self) -> &ConstSet {
        &self.consts
    }

    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    pub fn fatal(&self, operation: impl Into<String>, cause: impl Into<String>) -> Fatal {
        Fatal::new(format!("mtype[{}]", self.gname), operation, cause)
    }

    pub fn set_super(&self, super_gname: &str) -> ModlResult<()> {
        self.supertype
            .set_name(super_gname, &format!("mtype[{}]", self.gname))
    }

    pub fn super_name(&self) -> Option<&str> {
        self.supertype.name()
    }

    pub fn supertype(&self, ctx: &ModelCtx) -> ModlResult<Option<Arc<MType>>> {
        self.supertype
            .resolve(&format!("mtype[{}]", self.gname), |name| ctx.types.get(name))
    }

    /// The type chain, most specific first (self included), cycle-guarded.
    pub fn chain(self: &Arc<Self>, ctx: &ModelCtx) -> ModlResult<Vec<Arc<MType>>> {
        let mut chain = vec![self.clone()];
        let mut visited = BTreeSet::from([self.gname.clone()]);
        let mut current = self.clone();
        while let Some(sup) = current.supertype(ctx)? {
            if !visited.insert(sup.gname.clone()) {
                return Err(self.fatal(
                    "supertype walk",
                    format!("type cycle through '{}'", sup.gname),
                ));
            }
            chain.push(sup.clone());
            current = sup;
        }
        Ok(chain)
    }

    /// The root of the type chain. A type with no supertype is its own
    /// primitive ancestor.
    pub fn primitive_ancestor(self: &Arc<Self>, ctx: &ModelCtx) -> ModlResult<Arc<MType>> {
        Ok(self.chain(ctx)?.pop().expect("chain includes self"))
    }
}
