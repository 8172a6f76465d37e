//! PARAM file probe
//!
//! PARAM files carry a 32-byte type identifier at offset 12: a non-null
//! ASCII name terminated by a NUL, optionally padded with spaces. That
//! field is the most reliable structural marker the format offers.

use crate::peek::peek;
use regex::bytes::Regex;
use std::io::{self, Read, Seek};
use std::sync::OnceLock;

const TYPE_OFFSET: usize = 12;
const TYPE_LENGTH: usize = 32;

fn type_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"(?-u)^[^\x00]+\x00 *$").expect("static pattern"))
}

/// `true` if the stream looks like a PARAM file. The stream position is
/// restored.
pub fn is_param<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let head = peek(reader, TYPE_OFFSET + TYPE_LENGTH)?;
    if head.len() < TYPE_OFFSET + TYPE_LENGTH {
        return Ok(false);
    }
    Ok(type_shape().is_match(&head[TYPE_OFFSET..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn param_bytes(type_name: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; 0x40];
        data[TYPE_OFFSET..TYPE_OFFSET + type_name.len()].copy_from_slice(type_name);
        for byte in &mut data[TYPE_OFFSET + type_name.len() + 1..TYPE_OFFSET + TYPE_LENGTH] {
            *byte = b' ';
        }
        data
    }

    #[test]
    fn test_accepts_param_identifier() {
        let data = param_bytes(b"EQUIP_PARAM_WEAPON_ST");
        let mut cursor = Cursor::new(&data);
        assert!(is_param(&mut cursor).unwrap());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_rejects_unterminated_identifier() {
        let mut data = vec![0u8; 0x40];
        for byte in &mut data[TYPE_OFFSET..TYPE_OFFSET + TYPE_LENGTH] {
            *byte = b'X';
        }
        assert!(!is_param(&mut Cursor::new(&data)).unwrap());
    }

    #[test]
    fn test_rejects_empty_identifier() {
        let data = vec![0u8; 0x40];
        assert!(!is_param(&mut Cursor::new(&data)).unwrap());
    }

    #[test]
    fn test_rejects_short_stream() {
        assert!(!is_param(&mut Cursor::new(&[0u8; 16])).unwrap());
    }
}
