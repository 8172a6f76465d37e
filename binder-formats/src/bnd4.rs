//! BND4 monolithic binder reader
//!
//! The later binder generation: fixed 0x40-byte header, a declared
//! per-entry header size, optional UTF-16 names and optional hash table
//! extension.

use crate::endian::Endian;
use crate::entries::{
    has_compression, has_ids, has_long_offsets, has_names, normalize_format,
    read_shift_jis_cstring, read_utf16_cstring, BinderEntry,
};
use crate::error::FormatError;
use crate::Result;
use byteorder::ReadBytesExt;
use std::io::{Read, Seek, SeekFrom};
use tracing::debug;

pub const MAGIC: &[u8; 4] = b"BND4";

#[derive(Debug, Clone)]
pub struct Bnd4 {
    pub version: String,
    pub format: u8,
    pub big_endian: bool,
    pub unicode: bool,
    pub entries: Vec<BinderEntry>,
}

impl Bnd4 {
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        read_header(reader, MAGIC, "BND4")
    }
}

/// Parse a BND4-shaped header. Shared with the BHF4 split-binder header,
/// which differs only in its magic.
pub(crate) fn read_header<R: Read + Seek>(
    reader: &mut R,
    expected_magic: &[u8; 4],
    format_name: &'static str,
) -> Result<Bnd4> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != expected_magic {
        return Err(FormatError::UnrecognizedArchive {
            expected: format_name,
            magic,
        });
    }

    let _unk04 = reader.read_u8()?;
    let _unk05 = reader.read_u8()?;
    let mut pad = [0u8; 3];
    reader.read_exact(&mut pad)?;
    let big_endian = reader.read_u8()? != 0;
    let bit_big_endian = reader.read_u8()? == 0;
    let _ = reader.read_u8()?;
    let endian = if big_endian { Endian::Big } else { Endian::Little };

    let file_count = endian.read_i32(reader)?;
    if file_count < 0 {
        return Err(FormatError::invalid(
            format_name,
            format!("file count {file_count}"),
        ));
    }
    let _header_size = endian.read_i64(reader)?;

    let mut version_bytes = [0u8; 8];
    reader.read_exact(&mut version_bytes)?;
    let end = version_bytes.iter().position(|&b| b == 0).unwrap_or(8);
    let version = String::from_utf8_lossy(&version_bytes[..end]).into_owned();

    let file_header_size = endian.read_i64(reader)?;
    if !(0..=0x100).contains(&file_header_size) {
        return Err(FormatError::invalid(
            format_name,
            format!("file header size {file_header_size}"),
        ));
    }
    let _data_start = endian.read_i64(reader)?;

    let unicode = reader.read_u8()? != 0;
    let raw_format = reader.read_u8()?;
    let _extended = reader.read_u8()?;
    let _ = reader.read_u8()?;
    let _ = endian.read_i32(reader)?;
    let _hash_table_offset = endian.read_i64(reader)?;
    let format = normalize_format(raw_format, bit_big_endian);

    let mut entries = Vec::with_capacity(file_count as usize);
    for _ in 0..file_count {
        let start = reader.stream_position()?;
        entries.push(read_entry(reader, endian, format, unicode)?);
        reader.seek(SeekFrom::Start(start + file_header_size as u64))?;
    }

    debug!("Read {format_name} binder: version {version:?}, {file_count} entries");
    Ok(Bnd4 {
        version,
        format,
        big_endian,
        unicode,
        entries,
    })
}

fn read_entry<R: Read + Seek>(
    reader: &mut R,
    endian: Endian,
    format: u8,
    unicode: bool,
) -> Result<BinderEntry> {
    let flags = reader.read_u8()?;
    let mut pad = [0u8; 3];
    reader.read_exact(&mut pad)?;
    let _ = endian.read_i32(reader)?; // always -1

    let compressed_size = endian.read_i64(reader)?;
    let uncompressed_size = if has_compression(format) {
        Some(endian.read_i64(reader)?)
    } else {
        None
    };

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
        let name = if unicode {
            read_utf16_cstring(reader, name_offset as u64, endian)?
        } else {
            read_shift_jis_cstring(reader, name_offset as u64)?
        };
        Some(name)
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
    use binder_test_utils::build_bnd4;
    use std::io::Cursor;

    #[test]
    fn test_read_entries_and_names() {
        let data = build_bnd4(&[
            ("menu\\icon.tpf", b"aa".as_slice()),
            ("menu\\icon2.tpf", b"bbbb".as_slice()),
            ("msg\\item.fmg", b"cc".as_slice()),
        ]);
        let bnd = Bnd4::read(&mut Cursor::new(&data)).unwrap();
        assert_eq!(bnd.entries.len(), 3);
        assert!(bnd.unicode);
        assert_eq!(bnd.entries[0].name.as_deref(), Some("menu\\icon.tpf"));
        assert_eq!(bnd.entries[2].name.as_deref(), Some("msg\\item.fmg"));
        assert_eq!(bnd.entries[1].compressed_size, 4);

        let mut cursor = Cursor::new(&data);
        assert_eq!(bnd.entries[1].read_data(&mut cursor).unwrap(), b"bbbb");
    }

    #[test]
    fn test_wrong_magic() {
        let err = Bnd4::read(&mut Cursor::new(b"BND3\0\0\0\0".to_vec())).unwrap_err();
        assert!(matches!(err, FormatError::UnrecognizedArchive { .. }));
    }
}
