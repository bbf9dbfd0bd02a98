//! Properties and the override chain.

use crate::{ConstSet, MType, ModelCtx, ValidatorSet, XRef};
use modl_core::{Fatal, ModlResult, Origin, DEFAULT_GROUP};
use std::sync::Arc;

/// What a property declaration does to the inheritance chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropAction {
    /// Introduces the property; must carry an explicit type.
    Define,
    /// Redeclares an inherited property; may not carry a type.
    Override,
    /// Suppresses an inherited property from resolved/enumerated sets
    /// while staying reachable through chain lookups.
    Hide,
}

impl PropAction {
    pub fn name(&self) -> &'static str {
        match self {
            PropAction::Define => "define",
            PropAction::Override => "override",
            PropAction::Hide => "hide",
        }
    }
}

/// A property of a class.
#[derive(Debug)]
pub struct MProp {
    gname: String,
    lname: String,
    class: String,
    action: PropAction,
    mtype: XRef<MType>,
    group: Option<String>,
    origin: Origin,
    consts: ConstSet,
    validators: ValidatorSet,
}

impl MProp {
    pub fn new(
        class_gname: &str,
        lname: impl Into<String>,
        action: PropAction,
        group: Option<String>,
        origin: Origin,
    ) -> Self {
        let lname = lname.into();
        Self {
            gname: modl_core::global_name(Some(class_gname), &lname),
            lname,
            class: class_gname.to_string(),
            action,
            mtype: XRef::new(),
            group,
            origin,
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

    pub fn class_gname(&self) -> &str {
        &self.class
    }

    pub fn action(&self) -> PropAction {
        self.action
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

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn fatal(&self, operation: impl Into<String>, cause: impl Into<String>) -> Fatal {
        Fatal::new(format!("mprop[{}]", self.gname), operation, cause)
    }

    pub fn set_type(&self, type_gname: &str) -> ModlResult<()> {
        self.mtype
            .set_name(type_gname, &format!("mprop[{}]", self.gname))
    }

    pub fn type_name(&self) -> Option<&str> {
        self.mtype.name()
    }

    /// The type declared on this property itself, if any.
    pub fn declared_type(&self, ctx: &ModelCtx) -> ModlResult<Option<Arc<MType>>> {
        self.mtype
            .resolve(&format!("mprop[{}]", self.gname), |name| ctx.types.get(name))
    }

    fn owning_class(&self, ctx: &ModelCtx) -> ModlResult<Arc<crate::MClass>> {
        ctx.classes.require(&self.class)
    }

    /// The base (DEFINE) declaration: itself if DEFINE, else the nearest
    /// same-named DEFINE on a strict ancestor of the owning class. Absence
    /// is fatal.
    pub fn base(self: &Arc<Self>, ctx: &ModelCtx) -> ModlResult<Arc<MProp>> {
        if self.action == PropAction::Define {
            return Ok(self.clone());
        }
        for class in self.owning_class(ctx)?.chain(ctx)? {
            if let Some(prop) = class.own_prop(&self.lname) {
                if prop.action() == PropAction::Define {
                    return Ok(prop);
                }
            }
        }
        Err(self.fatal(
            "base retrieval",
            format!(
                "no base definition for {} property '{}'",
                self.action.name(),
                self.lname
            ),
        ))
    }

    /// The declaration this one overrides: with `stop_at_nearest` the
    /// nearest same-named declaration on a strict ancestor, otherwise the
    /// ultimate base DEFINE. `None` when nothing above redeclares the name.
    pub fn overridden(
        self: &Arc<Self>,
        ctx: &ModelCtx,
        stop_at_nearest: bool,
    ) -> ModlResult<Option<Arc<MProp>>> {
        let chain = self.owning_class(ctx)?.chain(ctx)?;
        let mut found = None;
        for class in chain.iter().skip(1) {
            if let Some(prop) = class.own_prop(&self.lname) {
                if stop_at_nearest {
                    return Ok(Some(prop));
                }
                let is_base = prop.action() == PropAction::Define;
                found = Some(prop);
                if is_base {
                    break;
                }
            }
        }
        Ok(found)
    }

    /// The property's type, resolved through the base declaration. With
    /// `as_base` the type's own primitive ancestor is returned instead.
    pub fn get_type(self: &Arc<Self>, ctx: &ModelCtx, as_base: bool) -> ModlResult<Arc<MType>> {
        let base = self.base(ctx)?;
        let mtype = base.declared_type(ctx)?.ok_or_else(|| {
            base.fatal("type retrieval", "DEFINE property carries no type")
        })?;
        if as_base {
            mtype.primitive_ancestor(ctx)
        } else {
            Ok(mtype)
        }
    }

    /// The property group: explicit, else inherited from the nearest
    /// override target that sets one, else the default group.
    pub fn effective_group(self: &Arc<Self>, ctx: &ModelCtx) -> ModlResult<String> {
        if let Some(group) = &self.group {
            return Ok(group.clone());
        }
        let mut current = self.clone();
        while let Some(above) = current.overridden(ctx, true)? {
            if let Some(group) = above.group() {
                return Ok(group.to_string());
            }
            current = above;
        }
        Ok(DEFAULT_GROUP.to_string())
    }
}
