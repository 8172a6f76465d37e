//! Error types for identification

use thiserror::Error;

/// Errors raised while sniffing or renaming files.
#[derive(Error, Debug)]
pub enum IdentError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A wrapped payload could not be unwrapped for inspection.
    #[error(transparent)]
    Format(#[from] binder_formats::FormatError),
}
