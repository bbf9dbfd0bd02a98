//! MODL Dialect
//!
//! The concrete modeling language: the schema tree binding every DSL
//! construct to its factory. Replaces runtime lookup of processor
//! implementations with a compile-time registration table; overriding a
//! construct's processing means pointing its schema node at a different
//! factory (or delegating with `uses`).

mod factories;
mod schema;

pub use factories::*;
pub use schema::schema;
