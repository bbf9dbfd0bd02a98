//! Validators: named, inheritable constraint bundles.
//!
//! Only declaration and inheritance live here; evaluating constraints
//! against instance data is an external concern. Within one validator all
//! Range constraints are OR'ed, all Content constraints are OR'ed, and the
//! two groups are AND'ed.

use crate::{Holder, HolderRef, ModelCtx};
use modl_core::{Fatal, ModlResult, Origin};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// How a validator declaration merges with an inherited one of the same
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorAction {
    /// Merge with the inherited validator; own constraints win per name.
    Add,
    /// Replace the inherited validator entirely.
    Clobber,
    /// Tombstone: the inherited validator no longer applies.
    Remove,
}

impl ValidatorAction {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "add" => Some(ValidatorAction::Add),
            "clobber" => Some(ValidatorAction::Clobber),
            "remove" => Some(ValidatorAction::Remove),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValidatorAction::Add => "add",
            ValidatorAction::Clobber => "clobber",
            ValidatorAction::Remove => "remove",
        }
    }
}

/// A bounds constraint. Bounds are kept as authored literals.
#[derive(Debug, Clone)]
pub struct RangeConstraint {
    pub name: String,
    pub min: Option<String>,
    pub max: Option<String>,
}

/// A pattern constraint. The pattern is syntax-checked at declaration
/// time, never evaluated here.
#[derive(Debug, Clone)]
pub struct ContentConstraint {
    pub name: String,
    pub pattern: String,
}

impl ContentConstraint {
    pub fn new(subject: &str, name: impl Into<String>, pattern: impl Into<String>) -> ModlResult<Self> {
        let pattern = pattern.into();
        regex_lite::Regex::new(&pattern).map_err(|e| {
            Fatal::new(
                subject,
                "content constraint declaration",
                format!("malformed pattern '{}'", pattern),
            )
            .with_detail(e.to_string())
        })?;
        Ok(Self {
            name: name.into(),
            pattern,
        })
    }
}

/// A validator attached to a property or a type.
#[derive(Debug)]
pub struct MValidator {
    gname: String,
    lname: String,
    holder: Holder,
    action: ValidatorAction,
    origin: Origin,
    ranges: RwLock<BTreeMap<String, RangeConstraint>>,
    contents: RwLock<BTreeMap<String, ContentConstraint>>,
}

impl MValidator {
    pub fn new(
        holder: Holder,
        lname: impl Into<String>,
        action: ValidatorAction,
        origin: Origin,
    ) -> Self {
        let lname = lname.into();
        Self {
            gname: modl_core::global_name(Some(holder.gname()), &lname),
            lname,
            holder,
            action,
            origin,
            ranges: RwLock::new(BTreeMap::new()),
            contents: RwLock::new(BTreeMap::new()),
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

    pub fn action(&self) -> ValidatorAction {
        self.action
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn is_tombstone(&self) -> bool {
        self.action == ValidatorAction::Remove
    }

    pub fn fatal(&self, operation: impl Into<String>, cause: impl Into<String>) -> Fatal {
        Fatal::new(format!("mvalidator[{}]", self.gname), operation, cause)
    }

    pub fn add_range(&self, range: RangeConstraint) -> ModlResult<()> {
        let mut ranges = self.ranges.write().expect("validator lock");
        if ranges.contains_key(&range.name) {
            return Err(self.fatal(
                "range constraint declaration",
                format!("duplicate constraint '{}'", range.name),
            ));
        }
        ranges.insert(range.name.clone(), range);
        Ok(())
    }

    pub fn add_content(&self, content: ContentConstraint) -> ModlResult<()> {
        let mut contents = self.contents.write().expect("validator lock");
        if contents.contains_key(&content.name) {
            return Err(self.fatal(
                "content constraint declaration",
                format!("duplicate constraint '{}'", content.name),
            ));
        }
        contents.insert(content.name.clone(), content);
        Ok(())
    }

    pub fn ranges(&self) -> Vec<RangeConstraint> {
        self.ranges.read().expect("validator lock").values().cloned().collect()
    }

    pub fn contents(&self) -> Vec<ContentConstraint> {
        self.contents.read().expect("validator lock").values().cloned().collect()
    }
}

/// The validators attached to one holder.
#[derive(Debug)]
pub struct ValidatorSet {
    map: RwLock<BTreeMap<String, Arc<MValidator>>>,
}

impl ValidatorSet {
    pub fn new() -> Self {
        Self {
            map: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn define(
        &self,
        ctx: &ModelCtx,
        holder: Holder,
        lname: &str,
        action: ValidatorAction,
        origin: Origin,
    ) -> ModlResult<Arc<MValidator>> {
        let validator = MValidator::new(holder, lname, action, origin);
        let validator_gname = validator.gname().to_string();
        let validator = ctx.validators.insert_new(&validator_gname, validator)?;
        self.map
            .write()
            .expect("validator lock")
            .insert(lname.to_string(), validator.clone());
        Ok(validator)
    }

    pub fn direct(&self, lname: &str) -> Option<Arc<MValidator>> {
        self.map.read().expect("validator lock").get(lname).cloned()
    }

    pub fn all(&self) -> Vec<Arc<MValidator>> {
        self.map.read().expect("validator lock").values().cloned().collect()
    }
}

impl Default for ValidatorSet {
    fn default() -> Self {
        Self::new()
    }
}

/// An inheritance-merged validator view.
#[derive(Debug, Default)]
pub struct EffectiveValidator {
    pub ranges: BTreeMap<String, RangeConstraint>,
    pub contents: BTreeMap<String, ContentConstraint>,
}

/// Computes the effective validator named `name` over a holder chain
/// (nearest first): REMOVE yields none, CLOBBER cuts the walk, ADD merges
/// with the inherited view with the nearer declaration winning per
/// constraint name.
pub fn effective_validator(
    chain: &[HolderRef],
    name: &str,
) -> ModlResult<Option<EffectiveValidator>> {
    let Some(position) = chain
        .iter()
        .position(|h| h.validators().direct(name).is_some())
    else {
        return Ok(None);
    };
    let own = chain[position]
        .validators()
        .direct(name)
        .expect("position found above");

    match own.action() {
        ValidatorAction::Remove => Ok(None),
        ValidatorAction::Clobber => {
            let mut merged = EffectiveValidator::default();
            overlay(&mut merged, &own);
            Ok(Some(merged))
        }
        ValidatorAction::Add => {
            let mut merged =
                effective_validator(&chain[position + 1..], name)?.unwrap_or_default();
            overlay(&mut merged, &own);
            Ok(Some(merged))
        }
    }
}

fn overlay(merged: &mut EffectiveValidator, own: &MValidator) {
    for range in own.ranges() {
        merged.ranges.insert(range.name.clone(), range);
    }
    for content in own.contents() {
        merged.contents.insert(content.name.clone(), content);
    }
}
