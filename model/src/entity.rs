//! Typed entity handles passed between dispatcher and factories.

use crate::{DependencyDecl, MClass, MConst, MModule, MProp, MType, MValidator, NameRule, Owner};
use modl_core::{Fatal, ModlResult};
use std::sync::Arc;

/// A handle to any semantic entity. Factories receive the parent node's
/// entity and return their own (or nothing, for pass-through constructs).
#[derive(Debug, Clone)]
pub enum EntityRef {
    Module(Arc<MModule>),
    Class(Arc<MClass>),
    Type(Arc<MType>),
    Prop(Arc<MProp>),
    Const(Arc<MConst>),
    Validator(Arc<MValidator>),
    NameRule(Arc<NameRule>),
    Owner(Arc<Owner>),
    Dependency(Arc<DependencyDecl>),
}

impl EntityRef {
    pub fn kind(&self) -> &'static str {
        match self {
            EntityRef::Module(_) => "module",
            EntityRef::Class(_) => "mclass",
            EntityRef::Type(_) => "mtype",
            EntityRef::Prop(_) => "mprop",
            EntityRef::Const(_) => "mconst",
            EntityRef::Validator(_) => "mvalidator",
            EntityRef::NameRule(_) => "name-rule",
            EntityRef::Owner(_) => "owner",
            EntityRef::Dependency(_) => "dependency",
        }
    }

    pub fn gname(&self) -> &str {
        match self {
            EntityRef::Module(m) => m.name(),
            EntityRef::Class(c) => c.gname(),
            EntityRef::Type(t) => t.gname(),
            EntityRef::Prop(p) => p.gname(),
            EntityRef::Const(c) => c.gname(),
            EntityRef::Validator(v) => v.gname(),
            EntityRef::NameRule(r) => r.key(),
            EntityRef::Owner(o) => o.name(),
            EntityRef::Dependency(d) => d.gname(),
        }
    }

    fn wrong_kind(&self, operation: &str, wanted: &str) -> Fatal {
        Fatal::new(
            format!("{}[{}]", self.kind(), self.gname()),
            operation,
            format!("expected a {} parent, found {}", wanted, self.kind()),
        )
    }

    pub fn expect_module(&self, operation: &str) -> ModlResult<&Arc<MModule>> {
        match self {
            EntityRef::Module(m) => Ok(m),
            other => Err(other.wrong_kind(operation, "module")),
        }
    }

    pub fn expect_class(&self, operation: &str) -> ModlResult<&Arc<MClass>> {
        match self {
            EntityRef::Class(c) => Ok(c),
            other => Err(other.wrong_kind(operation, "mclass")),
        }
    }

    pub fn expect_validator(&self, operation: &str) -> ModlResult<&Arc<MValidator>> {
        match self {
            EntityRef::Validator(v) => Ok(v),
            other => Err(other.wrong_kind(operation, "mvalidator")),
        }
    }

    pub fn expect_name_rule(&self, operation: &str) -> ModlResult<&Arc<NameRule>> {
        match self {
            EntityRef::NameRule(r) => Ok(r),
            other => Err(other.wrong_kind(operation, "name-rule")),
        }
    }

    pub fn expect_owner(&self, operation: &str) -> ModlResult<&Arc<Owner>> {
        match self {
            EntityRef::Owner(o) => Ok(o),
            other => Err(other.wrong_kind(operation, "owner")),
        }
    }

    pub fn expect_dependency(&self, operation: &str) -> ModlResult<&Arc<DependencyDecl>> {
        match self {
            EntityRef::Dependency(d) => Ok(d),
            other => Err(other.wrong_kind(operation, "dependency")),
        }
    }
}
