//! On-disk codecs for the binder archive family.
//!
//! This crate reads and writes the container formats shared by the target
//! games:
//!
//! - [`bhd5`]: the split-archive header (a bucketed hash table of entries)
//! - [`data_header`]: the 16-byte prelude of the matching data file
//! - [`bnd3`]/[`bnd4`]: the monolithic binders (read-only)
//! - [`bxf`]: the split binder siblings (`BHF` header + `BDT` data)
//! - [`dcx`]: the compression wrapper applied to individual payloads
//! - [`fmg`]/[`param`]/[`paramdef`]/[`paramdbp`]: structural try-read
//!   probes used by file type identification

pub mod bhd5;
pub mod bnd3;
pub mod bnd4;
pub mod bxf;
pub mod data_header;
pub mod dcx;
mod endian;
pub mod entries;
pub mod error;
pub mod fmg;
pub mod param;
pub mod paramdbp;
pub mod paramdef;
mod peek;
pub mod version;

pub use bhd5::{Bhd5, Bhd5Entry, ShaHash};
pub use data_header::DataHeader;
pub use endian::Endian;
pub use entries::BinderEntry;
pub use error::FormatError;
pub use version::GameVersion;

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, FormatError>;
