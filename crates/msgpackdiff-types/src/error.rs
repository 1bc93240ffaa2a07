use thiserror::Error;

/// Errors produced by value construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("duplicate map key: {0:?}")]
    DuplicateKey(String),
}
