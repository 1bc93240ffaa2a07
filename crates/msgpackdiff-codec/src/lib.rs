//! MessagePack object parser for msgpackdiff.
//!
//! Turns raw MessagePack bytes into [`Value`] trees. Low-level decoding of
//! markers, lengths and scalars is delegated to [`rmp::decode`]; this crate
//! owns the recursive structure, map key rules, extension types and the
//! nesting-depth limit.
//!
//! [`Value`]: msgpackdiff_types::Value

pub mod error;
pub mod parser;

pub use error::{CodecError, CodecResult};
pub use parser::{
    next_kind, parse, parse_all, parse_all_with, parse_with, ParserConfig, DEFAULT_MAX_DEPTH,
};
