//! Integration test framework for MODL.
//!
//! Provides the [`Fixture`] builder used by the integration tests to
//! stand up complete multi-stage source trees in temp directories and
//! compile them through the real pipeline.

mod fixture;

pub use fixture::Fixture;

pub mod prelude {
    pub use crate::Fixture;
    pub use modl_core::{ModlResult, ANY, DEFAULT_CONST, DEFAULT_GROUP, WILDCARD};
    pub use modl_model::*;
    pub use std::sync::Arc;
}
