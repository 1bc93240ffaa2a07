//! Diff engine for msgpackdiff.
//!
//! Compares two MessagePack objects for semantic equality and produces an
//! annotated, indentation-aware report of what was added, deleted or
//! replaced.
//!
//! # Key Types
//!
//! - [`CompareOptions`] / [`DiffConfig`] -- Comparison flags, report context and parser limits
//! - [`CompareResult`] -- Verdict, recorded differences and report rendering
//! - [`Difference`] / [`Change`] / [`PathLayer`] -- One edit and where it happened
//! - [`Alignment`] -- LCS alignment of two sequences
//! - [`Line`] / [`LineKind`] -- One rendered report line
//!
//! # Example
//!
//! ```
//! use msgpackdiff_diff::{compare, CompareOptions};
//!
//! // {"a": 1} vs {"a": 2}
//! let a = [0x81, 0xa1, b'a', 0x01];
//! let b = [0x81, 0xa1, b'a', 0x02];
//! let result = compare(&a, &b, &CompareOptions::default())?;
//! assert!(!result.equal);
//! assert_eq!(result.render_to_string(3), " {\n-  \"a\": 1\n+  \"a\": 2\n }\n");
//! # Ok::<(), msgpackdiff_diff::DiffError>(())
//! ```

pub mod compare;
pub mod config;
pub mod equality;
pub mod error;
pub mod lcs;
pub mod render;
pub mod reporter;

pub use compare::{compare, compare_values, compare_with, is_equal, CompareResult};
pub use config::{CompareOptions, DiffConfig, DEFAULT_CONTEXT};
pub use equality::{flexible_equal, scalar_equal, Number};
pub use error::{DiffError, DiffResult};
pub use lcs::{align_strings, lcs_objects, lcs_strings, Alignment, Match};
pub use render::{render_lines, write_report, Line, LineKind};
pub use reporter::{Change, ContainerKind, Difference, PathLayer, Reporter};

pub use msgpackdiff_codec::{parse, parse_all, parse_all_with, CodecError, ParserConfig};
pub use msgpackdiff_types::{OrderedMap, Value, ValueKind};
