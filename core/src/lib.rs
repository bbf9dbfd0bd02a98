//! MODL Core Types
//!
//! This crate provides the foundational types used throughout the MODL
//! compiler:
//! - The fatal diagnostic type (`Fatal`) and result alias
//! - Source origin (file/line/column) tracking
//! - Shared string constants (wildcards, reserved names)

mod error;
mod origin;
mod strings;

pub use error::*;
pub use origin::*;
pub use strings::*;
