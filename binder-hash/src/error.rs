//! Error types for dictionary construction

use thiserror::Error;

/// Errors raised while building or loading a hash dictionary.
#[derive(Error, Debug)]
pub enum HashError {
    /// Two distinct paths map to the same hash.
    #[error("hash collision on {hash:#x}: {existing:?} vs {candidate:?}")]
    HashCollision {
        hash: u64,
        existing: String,
        candidate: String,
    },

    /// The same path was added twice.
    #[error("duplicate dictionary value: {0:?}")]
    DuplicateValue(String),

    /// IO error while loading a dictionary file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
