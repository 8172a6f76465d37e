//! PARAMDEF file probe
//!
//! PARAMDEF files open with their own size, which must match the stream,
//! followed by a field-entry size drawn from a small set of known record
//! layouts. Console-era files are big endian, so both byte orders are
//! tried.

use crate::peek::{peek, stream_len};
use std::io::{self, Read, Seek};

const FIELD_SIZES: [u16; 5] = [0x6C, 0x8C, 0xAC, 0xB0, 0xD0];

/// `true` if the stream looks like a PARAMDEF file. The stream position
/// is restored.
pub fn is_paramdef<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let length = stream_len(reader)?;
    let head = peek(reader, 12)?;
    if head.len() < 12 {
        return Ok(false);
    }
    let size_bytes: [u8; 4] = head[0..4].try_into().unwrap();
    let field_bytes: [u8; 2] = head[10..12].try_into().unwrap();

    let little = i32::from_le_bytes(size_bytes) as i64 == length as i64
        && FIELD_SIZES.contains(&u16::from_le_bytes(field_bytes));
    let big = i32::from_be_bytes(size_bytes) as i64 == length as i64
        && FIELD_SIZES.contains(&u16::from_be_bytes(field_bytes));
    Ok(little || big)
}
