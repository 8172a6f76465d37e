//! Error types for archive decryption.

use thiserror::Error;

/// Errors that can occur while decrypting headers or entries.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The PEM key material could not be parsed.
    #[error("invalid RSA public key: {0}")]
    InvalidKey(#[from] rsa::pkcs1::Error),

    /// An RSA block decrypted to more bytes than the block size allows.
    #[error("RSA block overflow: {actual} bytes in a {expected}-byte block")]
    BlockOverflow { expected: usize, actual: usize },

    /// Invalid AES key size.
    #[error("invalid AES key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    /// An encrypted range falls outside the entry buffer.
    #[error("encrypted range {start}..{end} outside buffer of {len} bytes")]
    RangeOutOfBounds { start: i64, end: i64, len: usize },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
