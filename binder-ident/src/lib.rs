//! File type, folder and name inference.
//!
//! Entries recovered from hash-named archives come out as anonymous
//! blobs. This crate identifies them again: [`extension`] sniffs the
//! file type from magic bytes and structural probes (recursing through
//! the DCX wrapper), [`folder`] buckets known types into a canonical
//! output layout, and [`rename`] composes the two to move files on disk.

pub mod error;
pub mod extension;
pub mod folder;
pub mod rename;

pub use error::IdentError;
pub use extension::guess_extension;
pub use folder::{folder_for_extension, guess_folder};
pub use rename::rename_unknown_files;

/// Result type for identification operations.
pub type Result<T> = std::result::Result<T, IdentError>;
