//! Value model for msgpackdiff.
//!
//! This crate provides the in-memory representation of a parsed MessagePack
//! object. Every other msgpackdiff crate depends on `msgpackdiff-types`.
//!
//! # Key Types
//!
//! - [`Value`]: Tagged union over every MessagePack type the parser understands
//! - [`ValueKind`]: Fieldless tag of a [`Value`], used for diagnostics
//! - [`OrderedMap`]: String-keyed map that remembers key encounter order

pub mod error;
pub mod map;
pub mod value;

pub use error::TypeError;
pub use map::OrderedMap;
pub use value::{quote, Value, ValueKind};
