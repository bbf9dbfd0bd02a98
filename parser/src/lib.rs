//! MODL Structural Parser
//!
//! This crate converts DSL source text into a generic document tree:
//! - Stack-based single-pass scanning with source positions
//! - Composite value decomposition into named-value pairs
//! - Comment attachment to the following (or enclosing) construct
//! - Error handling with location information

mod doc;
mod error;
mod parser;

pub use doc::*;
pub use error::*;
pub use parser::{parse_str, Parser};
