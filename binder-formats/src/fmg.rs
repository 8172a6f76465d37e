//! FMG message file probe
//!
//! FMG files have no magic; they are recognized by their header shape:
//! a zero byte, an endianness flag, a small version byte, another zero,
//! then a file size that must match the stream.

use crate::peek::{peek, stream_len};
use std::io::{self, Read, Seek};

/// `true` if the stream looks like an FMG message file. The stream
/// position is restored.
pub fn is_fmg<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let length = stream_len(reader)?;
    let head = peek(reader, 12)?;
    if head.len() < 12 || head[0] != 0 || head[3] != 0 {
        return Ok(false);
    }
    let big_endian = match head[1] {
        0 => false,
        1 => true,
        _ => return Ok(false),
    };
    if !matches!(head[2], 0 | 1 | 2) {
        return Ok(false);
    }
    let size_bytes: [u8; 4] = head[4..8].try_into().unwrap();
    let file_size = if big_endian {
        i32::from_be_bytes(size_bytes)
    } else {
        i32::from_le_bytes(size_bytes)
    };
    Ok(file_size as i64 == length as i64)
}
