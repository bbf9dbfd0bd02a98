//! MODL Semantic Model
//!
//! This crate provides the in-memory object model and its resolution
//! algorithms:
//! - Per-category synchronized registries owned by an explicit [`ModelCtx`]
//! - Lazy, cached cross-references with an explicit unresolved state
//! - Property override chains, constant indirection, containment and
//!   relationship dual-registration, naming-rule lookup, ownership
//!   matching, and validator inheritance
//! - Whole-model validation run after the final load stage drains

mod class;
mod constant;
mod containment;
mod ctx;
mod entity;
mod holder;
mod module;
mod mtype;
mod naming;
mod ownership;
mod prop;
mod registry;
mod relation;
mod validate;
mod validation;
mod xref;

pub use class::*;
pub use constant::*;
pub use containment::*;
pub use ctx::*;
pub use entity::*;
pub use holder::*;
pub use module::*;
pub use mtype::*;
pub use naming::*;
pub use ownership::*;
pub use prop::*;
pub use registry::*;
pub use relation::*;
pub use validate::validate;
pub use validation::*;
pub use xref::*;
