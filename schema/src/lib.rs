//! MODL Processor Schema
//!
//! This crate provides the schema-driven dispatch framework:
//! - Schema nodes declaring legal named values and per-construct factories
//! - `uses` delegation and recursive (self-matching) nodes
//! - The dispatcher walking a document tree in lockstep with the schema

mod dispatch;
mod node;

pub use dispatch::dispatch;
pub use node::*;
