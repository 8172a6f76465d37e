//! Decryption support for encrypted BHD archives.
//!
//! This crate provides:
//! - The legacy RSA scheme protecting whole header files: raw modular
//!   exponentiation with the game's *public* key, no padding scheme
//! - AES-128-ECB decryption of individual data entries over the byte
//!   ranges named by the header

pub mod aes_entry;
pub mod error;
pub mod rsa_header;

pub use aes_entry::{ByteRange, EntryAesKey};
pub use error::CryptoError;
pub use rsa_header::decrypt_rsa_header;

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
