//! Comparison options and the on-disk configuration file.
//!
//! A configuration file is TOML. Every field is optional:
//!
//! ```toml
//! context = 5
//! max_depth = 128
//!
//! [options]
//! ignore_empty = true
//! flexible_types = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use msgpackdiff_codec::{ParserConfig, DEFAULT_MAX_DEPTH};

use crate::error::{DiffError, DiffResult};

/// Default number of unchanged sibling entries shown around a change.
pub const DEFAULT_CONTEXT: usize = 3;

/// Flags that change what counts as equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Stop at the first difference. No report is produced.
    pub brief: bool,
    /// A key missing on one side matches a present but empty value.
    pub ignore_empty: bool,
    /// Map key order is not significant.
    pub ignore_order: bool,
    /// Numbers of different MessagePack types compare by exact value.
    pub flexible_types: bool,
}

/// Everything a comparison run can be configured with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub options: CompareOptions,
    /// Unchanged sibling entries shown on each side of a change.
    pub context: usize,
    /// Maximum container nesting accepted by the parser.
    pub max_depth: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            options: CompareOptions::default(),
            context: DEFAULT_CONTEXT,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DiffConfig {
    /// Parse a configuration from TOML text. Missing fields take defaults.
    pub fn from_toml_str(text: &str) -> DiffResult<Self> {
        toml::from_str(text).map_err(|e| DiffError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> DiffResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The parser settings implied by this configuration.
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            max_depth: self.max_depth,
        }
    }
}
