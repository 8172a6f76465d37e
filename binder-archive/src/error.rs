//! Error types for archive operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while packing or unpacking archives.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// An expected file or directory is absent.
    #[error("{param}: path not found: {path:?}")]
    NotFound { param: &'static str, path: PathBuf },

    /// The path exists but is not a regular file.
    #[error("{param}: not a file: {path:?}")]
    NotAFile { param: &'static str, path: PathBuf },

    /// The path exists but is not a directory.
    #[error("{param}: not a directory: {path:?}")]
    NotADirectory { param: &'static str, path: PathBuf },

    /// A file was expected but the path names a directory.
    #[error("{param}: is a directory: {path:?}")]
    IsADirectory { param: &'static str, path: PathBuf },

    /// A directory was expected but the path names a file.
    #[error("{param}: is a file: {path:?}")]
    IsAFile { param: &'static str, path: PathBuf },

    /// A relative path was expected.
    #[error("{param}: unexpectedly absolute: {path:?}")]
    Rooted { param: &'static str, path: PathBuf },

    /// An entry points outside its data stream.
    #[error(
        "malformed entry: offset {offset} + length {length} outside data stream of {stream_length} bytes"
    )]
    MalformedEntry {
        offset: i64,
        length: i64,
        stream_length: u64,
    },

    /// Cooperative cancellation was requested.
    #[error("operation cancelled")]
    Cancelled,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Header or data codec failure.
    #[error(transparent)]
    Format(#[from] binder_formats::FormatError),

    /// Entry decryption failure.
    #[error(transparent)]
    Crypto(#[from] binder_crypto::CryptoError),

    /// Dictionary failure.
    #[error(transparent)]
    Dictionary(#[from] binder_hash::HashError),
}
