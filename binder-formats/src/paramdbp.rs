//! Debug-param (DBP) file probe
//!
//! Debug param layouts carry no magic and no public documentation; the
//! probe accepts the framing seen in the shipped files: a small field
//! count followed by three reserved zero words and at least one field
//! record.

use crate::peek::{peek, stream_len};
use std::io::{self, Read, Seek};

const MAX_FIELDS: i32 = 4096;

/// `true` if the stream looks like a debug-param file. The stream
/// position is restored.
pub fn is_paramdbp<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let length = stream_len(reader)?;
    let head = peek(reader, 16)?;
    if head.len() < 16 {
        return Ok(false);
    }
    let field_count = i32::from_le_bytes(head[0..4].try_into().unwrap());
    if !(1..=MAX_FIELDS).contains(&field_count) {
        return Ok(false);
    }
    let reserved_zero = head[4..16].iter().all(|&b| b == 0);
    Ok(reserved_zero && length > 16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_accepts_dbp_framing() {
        let mut data = vec![0u8; 64];
        data[0..4].copy_from_slice(&3i32.to_le_bytes());
        let mut cursor = Cursor::new(&data);
        assert!(is_paramdbp(&mut cursor).unwrap());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_rejects_nonzero_reserved_words() {
        let mut data = vec![0u8; 64];
        data[0..4].copy_from_slice(&3i32.to_le_bytes());
        data[8] = 1;
        assert!(!is_paramdbp(&mut Cursor::new(&data)).unwrap());
    }

    #[test]
    fn test_rejects_wild_field_count() {
        let mut data = vec![0u8; 64];
        data[0..4].copy_from_slice(&1_000_000i32.to_le_bytes());
        assert!(!is_paramdbp(&mut Cursor::new(&data)).unwrap());
    }
}
