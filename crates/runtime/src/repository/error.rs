//! Error types raised by repository implementations.

use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("log already exists: {0}")]
    LogAlreadyExists(String),

    #[error("action log {0} is poisoned by an earlier failed write")]
    LogPoisoned(String),

    #[error("truncated record at offset {offset}: expected {expected} bytes, found {actual}")]
    Truncated {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("record at offset {offset} declares {len} bytes, above the {max} byte limit")]
    RecordTooLarge { offset: u64, len: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
