//! Error types for format codecs

use thiserror::Error;

/// Errors raised while reading or writing container formats.
#[derive(Error, Debug)]
pub enum FormatError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream does not carry the claimed container format.
    #[error("not a {expected} archive: magic {magic:02x?}")]
    UnrecognizedArchive { expected: &'static str, magic: [u8; 4] },

    /// A header field holds a value the codec cannot accept.
    #[error("invalid {format} header: {reason}")]
    InvalidHeader { format: &'static str, reason: String },

    /// A DCX payload uses a compression scheme this build does not ship.
    #[error("unsupported compression format: {0}")]
    UnsupportedCompression(String),

    /// Decompression failed.
    #[error("decompression failed: {0}")]
    Decompression(String),
}

impl FormatError {
    pub(crate) fn invalid(format: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidHeader {
            format,
            reason: reason.into(),
        }
    }
}
