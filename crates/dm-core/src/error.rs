//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// An ID was issued or registered twice.  Always a logic defect.
    #[error("duplicate {kind} ID {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("{0} ID space exhausted")]
    IdSpaceExhausted(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `dm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
