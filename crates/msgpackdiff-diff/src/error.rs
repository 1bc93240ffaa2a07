//! Error types for the diff crate.

use msgpackdiff_codec::CodecError;

/// Errors that can occur before a comparison can run.
///
/// Comparison itself never fails; mismatches are reported as differences.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// One of the inputs is not valid MessagePack.
    #[error("parse error: {0}")]
    Codec(#[from] CodecError),

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
