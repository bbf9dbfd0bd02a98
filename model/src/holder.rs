//! Constant/validator holders and their inheritance chains.
//!
//! Constants and validators attach to a property or a type. Resolution
//! walks a single holder chain: for a property, the override chain
//! (nearest first) continuing into the base property's type chain; for a
//! type, the type chain itself.

use crate::validation::{effective_validator, EffectiveValidator};
use crate::{ConstSet, MConst, MProp, MType, ModelCtx, PropAction, ValidatorSet};
use modl_core::ModlResult;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name-keyed reference to a holder, recorded on the attached entity.
#[derive(Debug, Clone)]
pub enum Holder {
    Prop(String),
    Type(String),
}

impl Holder {
    pub fn gname(&self) -> &str {
        match self {
            Holder::Prop(g) | Holder::Type(g) => g,
        }
    }

    pub fn resolve(&self, ctx: &ModelCtx) -> ModlResult<HolderRef> {
        match self {
            Holder::Prop(g) => Ok(HolderRef::Prop(ctx.props.require(g)?)),
            Holder::Type(g) => Ok(HolderRef::Type(ctx.types.require(g)?)),
        }
    }
}

/// A resolved holder.
#[derive(Debug, Clone)]
pub enum HolderRef {
    Prop(Arc<MProp>),
    Type(Arc<MType>),
}

impl HolderRef {
    pub fn gname(&self) -> &str {
        match self {
            HolderRef::Prop(p) => p.gname(),
            HolderRef::Type(t) => t.gname(),
        }
    }

    pub fn consts(&self) -> &ConstSet {
        match self {
            HolderRef::Prop(p) => p.consts(),
            HolderRef::Type(t) => t.consts(),
        }
    }

    pub fn validators(&self) -> &ValidatorSet {
        match self {
            HolderRef::Prop(p) => p.validators(),
            HolderRef::Type(t) => t.validators(),
        }
    }

    /// The holder chain anchored at this holder, nearest first.
    pub fn chain(&self, ctx: &ModelCtx) -> ModlResult<Vec<HolderRef>> {
        match self {
            HolderRef::Type(t) => Ok(t.chain(ctx)?.into_iter().map(HolderRef::Type).collect()),
            HolderRef::Prop(p) => {
                let mut chain = vec![HolderRef::Prop(p.clone())];
                let mut base = if p.action() == PropAction::Define {
                    Some(p.clone())
                } else {
                    None
                };
                let class_chain = ctx.classes.require(p.class_gname())?.chain(ctx)?;
                for class in class_chain.iter().skip(1) {
                    if let Some(prop) = class.own_prop(p.lname()) {
                        if base.is_none() && prop.action() == PropAction::Define {
                            base = Some(prop.clone());
                        }
                        chain.push(HolderRef::Prop(prop));
                    }
                }
                if let Some(base) = base {
                    if let Some(mtype) = base.declared_type(ctx)? {
                        chain.extend(mtype.chain(ctx)?.into_iter().map(HolderRef::Type));
                    }
                }
                Ok(chain)
            }
        }
    }

    /// Constants visible to this holder: nearest same-named declaration
    /// wins along the chain; names whose nearest declaration is a REMOVE
    /// tombstone are excluded. Direct lookups ([`ConstSet::direct`]) still
    /// return the tombstone.
    pub fn visible_consts(&self, ctx: &ModelCtx) -> ModlResult<Vec<Arc<MConst>>> {
        let mut nearest: BTreeMap<String, Arc<MConst>> = BTreeMap::new();
        for holder in self.chain(ctx)? {
            for constant in holder.consts().all() {
                nearest
                    .entry(constant.lname().to_string())
                    .or_insert(constant);
            }
        }
        Ok(nearest
            .into_values()
            .filter(|c| !c.is_tombstone())
            .collect())
    }

    /// The nearest same-named constant along the chain, tombstones
    /// included.
    pub fn find_const(&self, ctx: &ModelCtx, lname: &str) -> ModlResult<Option<Arc<MConst>>> {
        for holder in self.chain(ctx)? {
            if let Some(found) = holder.consts().direct(lname) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// The effective (inheritance-merged) validator under `name`, or
    /// `None` when absent or tombstoned.
    pub fn effective_validator(
        &self,
        ctx: &ModelCtx,
        name: &str,
    ) -> ModlResult<Option<EffectiveValidator>> {
        let chain = self.chain(ctx)?;
        effective_validator(&chain, name)
    }

    /// All effective validators visible to this holder, keyed by name.
    pub fn visible_validators(
        &self,
        ctx: &ModelCtx,
    ) -> ModlResult<BTreeMap<String, EffectiveValidator>> {
        let chain = self.chain(ctx)?;
        let mut names = BTreeMap::new();
        for holder in &chain {
            for validator in holder.validators().all() {
                names.entry(validator.lname().to_string()).or_insert(());
            }
        }
        let mut effective = BTreeMap::new();
        for (name, ()) in names {
            if let Some(merged) = effective_validator(&chain, &name)? {
                effective.insert(name, merged);
            }
        }
        Ok(effective)
    }
}
