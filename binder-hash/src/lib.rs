//! Path hashing and name lookup for BHD archive headers.
//!
//! BHD headers do not store file names. Entries are keyed by a polynomial
//! hash of the normalized archive path, and unpacking recovers names by
//! consulting a dictionary of known paths. This crate provides:
//!
//! - The 32/64-bit path hash used across all game generations
//! - [`HashDictionary`], a collision-checked reverse map from hash to path
//! - The bucket sizing/placement strategies used by the header's hash table

pub mod bucket;
pub mod dictionary;
pub mod error;
pub mod hasher;

pub use bucket::{
    next_prime, BucketCountStrategy, BucketIndexStrategy, BucketInfo, DistributionCount,
    ModulusIndex,
};
pub use dictionary::HashDictionary;
pub use error::HashError;
pub use hasher::{hash_path, normalize_path};

/// Result type for dictionary operations.
pub type Result<T> = std::result::Result<T, HashError>;
