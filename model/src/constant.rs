//! Constants: literal values, indirection, and tombstones.

use crate::{Holder, ModelCtx};
use modl_core::{Fatal, ModlResult, Origin, DEFAULT_CONST};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

/// What a constant declaration contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstAction {
    Value,
    Mapped,
    /// Tombstone: marks a same-named inherited constant inapplicable.
    Remove,
    AutoRevertive,
    AutoTransition,
    Default,
    /// Also synthesizes a companion DEFAULT constant with the same
    /// indirection target.
    Exclusive,
    Unsettable,
}

impl ConstAction {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "value" => Some(ConstAction::Value),
            "mapped" => Some(ConstAction::Mapped),
            "remove" => Some(ConstAction::Remove),
            "auto-revertive" => Some(ConstAction::AutoRevertive),
            "auto-transition" => Some(ConstAction::AutoTransition),
            "default" => Some(ConstAction::Default),
            "exclusive" => Some(ConstAction::Exclusive),
            "unsettable" => Some(ConstAction::Unsettable),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConstAction::Value => "value",
            ConstAction::Mapped => "mapped",
            ConstAction::Remove => "remove",
            ConstAction::AutoRevertive => "auto-revertive",
            ConstAction::AutoTransition => "auto-transition",
            ConstAction::Default => "default",
            ConstAction::Exclusive => "exclusive",
            ConstAction::Unsettable => "unsettable",
        }
    }

    /// Carries a literal value.
    pub fn has_value(&self) -> bool {
        matches!(
            self,
            ConstAction::Value
                | ConstAction::AutoRevertive
                | ConstAction::AutoTransition
                | ConstAction::Unsettable
        )
    }

    /// Names another constant.
    pub fn has_explicit_indirection(&self) -> bool {
        matches!(
            self,
            ConstAction::Exclusive
                | ConstAction::Default
                | ConstAction::AutoTransition
                | ConstAction::Mapped
        )
    }

    /// The value is observed, then moves on.
    pub fn is_transient(&self) -> bool {
        matches!(self, ConstAction::AutoRevertive | ConstAction::AutoTransition)
    }
}

/// A constant attached to a property or a type.
#[derive(Debug)]
pub struct MConst {
    gname: String,
    lname: String,
    holder: Holder,
    action: ConstAction,
    value: Option<String>,
    target: Option<String>,
    origin: Origin,
}

impl MConst {
    pub fn new(
        holder: Holder,
        lname: impl Into<String>,
        action: ConstAction,
        value: Option<String>,
        target: Option<String>,
        origin: Origin,
    ) -> Self {
        let lname = lname.into();
        Self {
            gname: modl_core::global_name(Some(holder.gname()), &lname),
            lname,
            holder,
            action,
            value,
            target,
            origin,
        }
    }

    pub fn gname(&self) -> &str {
        &self.gname
    }

    pub fn lname(&self) -> &str {
        &self.lname
    }

    pub fn holder(&self) -> &Holder {
        &self.holder
    }

    pub fn action(&self) -> ConstAction {
        self.action
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn is_tombstone(&self) -> bool {
        self.action == ConstAction::Remove
    }

    pub fn fatal(&self, operation: impl Into<String>, cause: impl Into<String>) -> Fatal {
        Fatal::new(format!("mconst[{}]", self.gname), operation, cause)
    }

    /// Resolves the constant's value: its own literal when it carries one,
    /// else through explicit indirection, else through the nearest
    /// same-named constant up the holder chain. Indirection cycles are
    /// fatal; a tombstone terminates the walk with no value.
    pub fn find_value(self: &Arc<Self>, ctx: &ModelCtx) -> ModlResult<Option<String>> {
        let mut visited = BTreeSet::new();
        self.find_value_guarded(ctx, &mut visited)
    }

    fn find_value_guarded(
        self: &Arc<Self>,
        ctx: &ModelCtx,
        visited: &mut BTreeSet<String>,
    ) -> ModlResult<Option<String>> {
        if !visited.insert(self.gname.clone()) {
            return Err(self.fatal(
                "value resolution",
                format!("indirection cycle through '{}'", self.gname),
            ));
        }
        if let Some(value) = &self.value {
            return Ok(Some(value.clone()));
        }

        let chain = self.holder.resolve(ctx)?.chain(ctx)?;

        if self.action.has_explicit_indirection() {
            if let Some(target) = &self.target {
                for holder in &chain {
                    if let Some(found) = holder.consts().direct(target) {
                        if found.is_tombstone() {
                            continue;
                        }
                        return found.find_value_guarded(ctx, visited);
                    }
                }
                return Err(self.fatal(
                    "value resolution",
                    format!("indirection target '{}' not found", target),
                ));
            }
        }

        for holder in chain.iter().skip(1) {
            if let Some(found) = holder.consts().direct(&self.lname) {
                if found.is_tombstone() {
                    return Ok(None);
                }
                return found.find_value_guarded(ctx, visited);
            }
        }
        Ok(None)
    }
}

/// The constants attached to one holder (property or type).
#[derive(Debug)]
pub struct ConstSet {
    map: RwLock<BTreeMap<String, Arc<MConst>>>,
}

impl ConstSet {
    pub fn new() -> Self {
        Self {
            map: RwLock::new(BTreeMap::new()),
        }
    }

    /// Defines a constant on the holder and registers it in the context.
    /// An EXCLUSIVE constant also synthesizes its companion DEFAULT
    /// constant, pointing at the same indirection target (the exclusive
    /// constant itself when no target was named).
    pub fn define(
        &self,
        ctx: &ModelCtx,
        holder: Holder,
        lname: &str,
        action: ConstAction,
        value: Option<String>,
        target: Option<String>,
        origin: Origin,
    ) -> ModlResult<Arc<MConst>> {
        let companion_target = target.clone().unwrap_or_else(|| lname.to_string());
        let constant = MConst::new(holder.clone(), lname, action, value, target, origin.clone());
        let constant_gname = constant.gname().to_string();
        let constant = ctx.consts.insert_new(&constant_gname, constant)?;
        self.map
            .write()
            .expect("const lock")
            .insert(lname.to_string(), constant.clone());

        if action == ConstAction::Exclusive {
            let companion = MConst::new(
                holder,
                DEFAULT_CONST,
                ConstAction::Default,
                None,
                Some(companion_target),
                origin,
            );
            let companion_gname = companion.gname().to_string();
            let companion = ctx.consts.insert_new(&companion_gname, companion)?;
            self.map
                .write()
                .expect("const lock")
                .insert(DEFAULT_CONST.to_string(), companion);
        }
        Ok(constant)
    }

    /// Direct lookup, tombstones included.
    pub fn direct(&self, lname: &str) -> Option<Arc<MConst>> {
        self.map.read().expect("const lock").get(lname).cloned()
    }

    /// The holder's own constants, tombstones excluded.
    pub fn own_visible(&self) -> Vec<Arc<MConst>> {
        self.map
            .read()
            .expect("const lock")
            .values()
            .filter(|c| !c.is_tombstone())
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<Arc<MConst>> {
        self.map.read().expect("const lock").values().cloned().collect()
    }
}

impl Default for ConstSet {
    fn default() -> Self {
        Self::new()
    }
}
