//! Per-entry AES decryption
//!
//! Encrypted data entries carry a 16-byte AES key and a list of byte
//! ranges inside the (padded) entry that were encrypted with AES-128-ECB.
//! A range end of -1 stands for the end of the entry. Range lengths are
//! truncated to whole cipher blocks.

use crate::error::CryptoError;
use crate::Result;
use aes::Aes128;
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, KeyInit};
use tracing::trace;

const BLOCK_SIZE: usize = 16;

/// A byte range of an entry that is encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: i64,
    pub end: i64,
}

impl ByteRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

/// The decryption capability attached to an encrypted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAesKey {
    key: [u8; 16],
    ranges: Vec<ByteRange>,
}

impl EntryAesKey {
    pub fn new(key: [u8; 16], ranges: Vec<ByteRange>) -> Self {
        Self { key, ranges }
    }

    /// Build from a key slice, rejecting anything but 16 bytes.
    pub fn from_slice(key: &[u8], ranges: Vec<ByteRange>) -> Result<Self> {
        let key: [u8; 16] = key.try_into().map_err(|_| CryptoError::InvalidKeySize {
            expected: 16,
            actual: key.len(),
        })?;
        Ok(Self::new(key, ranges))
    }

    pub fn key(&self) -> &[u8; 16] {
        &self.key
    }

    pub fn ranges(&self) -> &[ByteRange] {
        &self.ranges
    }

    /// Decrypt the encrypted ranges of `buffer` in place.
    pub fn decrypt(&self, buffer: &mut [u8]) -> Result<()> {
        let cipher = Aes128::new(GenericArray::from_slice(&self.key));
        for range in &self.ranges {
            let end = if range.end < 0 {
                buffer.len() as i64
            } else {
                range.end
            };
            if range.start < 0 || range.start > end || end > buffer.len() as i64 {
                return Err(CryptoError::RangeOutOfBounds {
                    start: range.start,
                    end: range.end,
                    len: buffer.len(),
                });
            }
            let start = range.start as usize;
            let span = (end as usize - start) / BLOCK_SIZE * BLOCK_SIZE;
            trace!("Decrypting {span} bytes at offset {start}");
            for block in buffer[start..start + span].chunks_exact_mut(BLOCK_SIZE) {
                cipher.decrypt_block(GenericArray::from_mut_slice(block));
            }
        }
        Ok(())
    }
}
