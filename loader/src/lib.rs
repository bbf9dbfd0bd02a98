//! MODL Loader
//!
//! Drives a full model build: reads the build configuration, discovers
//! source files per domain/feature/include, and runs them through the
//! three-stage pipeline (serial PRE, parallel LOAD, serial POST) before
//! ownership tagging and whole-model validation.

mod config;
mod loader;
mod pool;

pub use config::{Config, ConfigError, Domain, Feature, Include, Stage};
pub use loader::{compile, run};
pub use pool::Pool;
