//! BND3 monolithic binder reader
//!
//! The oldest binder generation: a 12-byte signature (magic + version
//! tag), a format byte selecting which entry fields exist, and a flat
//! entry table with Shift-JIS names.

use crate::endian::Endian;
use crate::entries::{
    has_compression, has_ids, has_long_offsets, has_names, normalize_format,
    read_shift_jis_cstring, BinderEntry,
};
use crate::error::FormatError;
use crate::Result;
use byteorder::ReadBytesExt;
use std::io::{Read, Seek};
use tracing::debug;

pub const MAGIC: &[u8; 4] = b"BND3";

#[derive(Debug, Clone)]
pub struct Bnd3 {
    pub version: String,
    pub format: u8,
    pub big_endian: bool,
    pub entries: Vec<BinderEntry>,
}

impl Bnd3 {
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let (version, format, big_endian, entries) = read_header(reader, MAGIC, "BND3")?;
        Ok(Self {
            version,
            format,
            big_endian,
            entries,
        })
    }
}

/// Parse a BND3-shaped header. Shared with the BHF3 split-binder header,
/// which differs only in its magic.
pub(crate) fn read_header<R: Read + Seek>(
    reader: &mut R,
    expected_magic: &[u8; 4],
    format_name: &'static str,
) -> Result<(String, u8, bool, Vec<BinderEntry>)> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != expected_magic {
        return Err(FormatError::UnrecognizedArchive {
            expected: format_name,
            magic,
        });
    }

    let mut version_bytes = [0u8; 8];
    reader.read_exact(&mut version_bytes)?;
    let end = version_bytes.iter().position(|&b| b == 0).unwrap_or(8);
    let version = String::from_utf8_lossy(&version_bytes[..end]).into_owned();

    let raw_format = reader.read_u8()?;
    let big_endian = reader.read_u8()? != 0;
    let bit_big_endian = reader.read_u8()? != 0;
    let _ = reader.read_u8()?;
    let format = normalize_format(raw_format, bit_big_endian);
    let endian = if big_endian { Endian::Big } else { Endian::Little };

    let file_count = endian.read_i32(reader)?;
    if file_count < 0 {
        return Err(FormatError::invalid(
            format_name,
            format!("file count {file_count}"),
        ));
    }
    let _headers_end = endian.read_i32(reader)?;
    let _ = endian.read_i32(reader)?;
    let _ = endian.read_i32(reader)?;

    let mut entries = Vec::with_capacity(file_count as usize);
    for _ in 0..file_count {
        entries.push(read_entry(reader, endian, format)?);
    }

    debug!("Read {format_name} binder: version {version:?}, {file_count} entries");
    Ok((version, format, big_endian, entries))
}

fn read_entry<R: Read + Seek>(
    reader: &mut R,
    endian: Endian,
    format: u8,
) -> Result<BinderEntry> {
    let flags = reader.read_u8()?;
    let mut pad = [0u8; 3];
    reader.read_exact(&mut pad)?;

    let compressed_size = endian.read_i32(reader)? as i64;
    let data_offset = if has_long_offsets(format) {
        endian.read_i64(reader)? as u64
    } else {
        endian.read_u32(reader)? as u64
    };

    let id = if has_ids(format) {
        Some(endian.read_i32(reader)?)
    } else {
        None
    };

    let name = if has_names(format) {
        let name_offset = endian.read_i32(reader)?;
        Some(read_shift_jis_cstring(reader, name_offset as u64)?)
    } else {
        None
    };

    let uncompressed_size = if has_compression(format) {
        Some(endian.read_i32(reader)? as i64)
    } else {
        None
    };

    Ok(BinderEntry {
        flags,
        id,
        name,
        data_offset,
        compressed_size,
        uncompressed_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use binder_test_utils::build_bnd3;
    use std::io::Cursor;

    #[test]
    fn test_read_entries_and_names() {
        let data = build_bnd3(&[("chr\\c0000.tpf", b"texture"), ("chr\\c0000.flver", b"model")]);
        let bnd = Bnd3::read(&mut Cursor::new(&data)).unwrap();
        assert_eq!(bnd.version, "07D7R6");
        assert_eq!(bnd.entries.len(), 2);
        assert_eq!(bnd.entries[0].name.as_deref(), Some("chr\\c0000.tpf"));
        assert_eq!(bnd.entries[1].name.as_deref(), Some("chr\\c0000.flver"));

        let mut cursor = Cursor::new(&data);
        let bytes = bnd.entries[1].read_data(&mut cursor).unwrap();
        assert_eq!(bytes, b"model");
    }

    #[test]
    fn test_wrong_magic() {
        let err = Bnd3::read(&mut Cursor::new(b"BND4\0\0\0\0\0\0\0\0".to_vec())).unwrap_err();
        assert!(matches!(err, FormatError::UnrecognizedArchive { .. }));
    }
}
