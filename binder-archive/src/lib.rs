//! Packing and unpacking of split BHD/BDT archives.
//!
//! The [`Binder`] model holds an archive in memory: an ordered list of
//! entries plus the format knobs (endianness, version tag, bucket
//! strategies, skip flags). Packing streams entry bytes into a data file
//! and writes the bucketed header last; unpacking walks a parsed header
//! and streams entries back out, decrypting where the header says so.
//! Both directions exist in synchronous form and as cooperative `tokio`
//! variants with progress reporting and cancellation.

pub mod cancel;
mod check;
pub mod divided;
pub mod error;
pub mod model;
pub mod pack;
pub mod progress;
pub mod unpack;

pub use cancel::CancellationToken;
pub use divided::DividedBinder;
pub use error::ArchiveError;
pub use model::{Binder, EntryHeader};
pub use progress::{AggregateProgress, ProgressHandle};
pub use unpack::MAX_IN_FLIGHT_BYTES;

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
