use msgpackdiff_types::TypeError;
use thiserror::Error;

/// Errors produced while parsing MessagePack input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The byte stream is not valid MessagePack: unknown marker, truncated
    /// buffer, bad length prefix, invalid UTF-8, unsupported extension.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// The same key was encoded twice in one map.
    #[error("duplicate map key: {0:?}")]
    DuplicateMapKey(String),

    /// Containers are nested deeper than the configured limit.
    #[error("maximum nesting depth of {max} exceeded")]
    MaxDepthExceeded { max: usize },
}

impl From<TypeError> for CodecError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::DuplicateKey(key) => CodecError::DuplicateMapKey(key),
        }
    }
}

/// Convenience alias for parser results.
pub type CodecResult<T> = Result<T, CodecError>;
