//! Decrypting an RSA-protected header and parsing it

use binder_crypto::decrypt_rsa_header;
use binder_formats::bhd5::{Bhd5, Bhd5Entry};
use binder_formats::GameVersion;
use rsa::BigUint;

// 12-bit toy key pair: n = 61 * 53 = 3233, e = 17, d = 2753. With a
// two-byte input block the raw scheme carries one plaintext byte per
// block, which keeps the fixture tiny.
const TOY_PEM: &str = "-----BEGIN RSA PUBLIC KEY-----\n\
                       MAcCAgyhAgER\n\
                       -----END RSA PUBLIC KEY-----\n";
const TOY_N: u32 = 3233;
const TOY_D: u32 = 2753;

/// Apply the private-key operation byte-by-byte, producing the layout
/// the games ship: fixed-size ciphertext blocks.
fn encrypt_with_private_key(plaintext: &[u8]) -> Vec<u8> {
    let n = BigUint::from(TOY_N);
    let d = BigUint::from(TOY_D);
    let mut out = Vec::with_capacity(plaintext.len() * 2);
    for &byte in plaintext {
        let c = BigUint::from(byte).modpow(&d, &n);
        let bytes = c.to_bytes_be();
        let mut block = [0u8; 2];
        block[2 - bytes.len()..].copy_from_slice(&bytes);
        out.extend_from_slice(&block);
    }
    out
}

#[test]
fn test_encrypted_header_round_trip() {
    let mut header = Bhd5::with_buckets(GameVersion::DarkSouls1, 2);
    header.buckets[0].push(Bhd5Entry {
        path_hash: 0xCAFE,
        padded_size: 512,
        unpadded_size: 512,
        offset: 0,
        sha_hash: None,
        aes_key: None,
    });

    let mut plain = Vec::new();
    header.write(&mut plain).unwrap();
    let encrypted = encrypt_with_private_key(&plain);
    assert_ne!(&encrypted[..4], b"BHD5");

    let mut decrypted = decrypt_rsa_header(&encrypted, TOY_PEM).unwrap();
    let read = Bhd5::read(&mut decrypted, GameVersion::DarkSouls1).unwrap();
    assert_eq!(read.buckets.len(), 2);
    assert_eq!(read.buckets[0][0].path_hash, 0xCAFE);
    assert_eq!(read.buckets[0][0].padded_size, 512);
}
