//! Legacy RSA header decryption
//!
//! Encrypted BHD headers are produced with a raw RSA private-key operation
//! and are recovered with the matching *public* key: each ciphertext block
//! is modular-exponentiated with the public exponent, with no padding
//! scheme involved. Results shorter than the output block are left-padded
//! with zeros. Switching this to a private-key decrypt or PKCS#1 padding
//! breaks compatibility with the shipped game files.

use crate::error::CryptoError;
use crate::Result;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};
use std::io::Cursor;
use tracing::debug;

/// Decrypt an RSA-encrypted header with a PKCS#1 PEM public key.
///
/// Returns an in-memory stream positioned at the start of the decrypted
/// header.
pub fn decrypt_rsa_header(data: &[u8], public_key_pem: &str) -> Result<Cursor<Vec<u8>>> {
    let key = RsaPublicKey::from_pkcs1_pem(public_key_pem)?;
    let modulus = key.n();
    let exponent = key.e();

    let input_block_size = modulus.bits().div_ceil(8);
    let output_block_size = input_block_size - 1;

    let mut decrypted = Vec::with_capacity(data.len());
    let mut blocks = 0usize;
    for block in data.chunks(input_block_size) {
        let ciphertext = BigUint::from_bytes_be(block);
        let plaintext = ciphertext.modpow(exponent, modulus).to_bytes_be();
        if plaintext.len() > output_block_size {
            return Err(CryptoError::BlockOverflow {
                expected: output_block_size,
                actual: plaintext.len(),
            });
        }
        decrypted.resize(decrypted.len() + output_block_size - plaintext.len(), 0);
        decrypted.extend_from_slice(&plaintext);
        blocks += 1;
    }

    debug!(
        "Decrypted {}-byte header in {} blocks of {}",
        decrypted.len(),
        blocks,
        input_block_size
    );
    Ok(Cursor::new(decrypted))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 12-bit toy key: n = 61 * 53 = 3233, e = 17, d = 2753. DER for
    // SEQUENCE { INTEGER 3233, INTEGER 17 } hand-encoded below.
    const TOY_PEM: &str = "-----BEGIN RSA PUBLIC KEY-----\n\
                           MAcCAgyhAgER\n\
                           -----END RSA PUBLIC KEY-----\n";
    const TOY_N: u32 = 3233;
    const TOY_D: u32 = 2753;

    fn sign(message: u32) -> [u8; 2] {
        let n = BigUint::from(TOY_N);
        let d = BigUint::from(TOY_D);
        let c = BigUint::from(message).modpow(&d, &n);
        let bytes = c.to_bytes_be();
        let mut block = [0u8; 2];
        block[2 - bytes.len()..].copy_from_slice(&bytes);
        block
    }

    #[test]
    fn test_round_trip_single_block() {
        let block = sign(42);
        let cursor = decrypt_rsa_header(&block, TOY_PEM).unwrap();
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.into_inner(), vec![42]);
    }

    #[test]
    fn test_multiple_blocks_concatenate() {
        let mut data = Vec::new();
        data.extend_from_slice(&sign(1));
        data.extend_from_slice(&sign(200));
        data.extend_from_slice(&sign(99));
        let cursor = decrypt_rsa_header(&data, TOY_PEM).unwrap();
        assert_eq!(cursor.into_inner(), vec![1, 200, 99]);
    }

    #[test]
    fn test_left_padding_with_zero_plaintext() {
        // 0^e mod n = 0, whose big-endian encoding is empty and must pad
        // out to the full output block.
        let block = [0u8, 0u8];
        let cursor = decrypt_rsa_header(&block, TOY_PEM).unwrap();
        assert_eq!(cursor.into_inner(), vec![0]);
    }

    #[test]
    fn test_empty_input() {
        let cursor = decrypt_rsa_header(&[], TOY_PEM).unwrap();
        assert!(cursor.into_inner().is_empty());
    }

    #[test]
    fn test_bad_pem_rejected() {
        assert!(decrypt_rsa_header(&[0, 1], "not a key").is_err());
    }
}
