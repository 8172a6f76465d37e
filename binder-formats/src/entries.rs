//! Shared entry model for the monolithic and split binders
//!
//! BND3/BND4 and their split BHF/BDT siblings all describe files with the
//! same ingredients: a flags byte, an optional numeric id, an optional
//! name (Shift-JIS or UTF-16) and an offset/size pair locating the bytes.

use crate::endian::Endian;
use crate::error::FormatError;
use crate::Result;
use byteorder::ReadBytesExt;
use std::io::{Read, Seek, SeekFrom};

// Binder format flag bits, after bit-order normalization.
pub(crate) const FORMAT_IDS: u8 = 0b0000_0010;
pub(crate) const FORMAT_NAMES_1: u8 = 0b0000_0100;
pub(crate) const FORMAT_NAMES_2: u8 = 0b0000_1000;
pub(crate) const FORMAT_LONG_OFFSETS: u8 = 0b0001_0000;
pub(crate) const FORMAT_COMPRESSION: u8 = 0b0010_0000;

const MAX_NAME: usize = 4096;

/// Decode the raw format byte. Depending on the bit-endianness marker the
/// byte is stored with its bits reversed.
pub(crate) fn normalize_format(raw: u8, bit_big_endian: bool) -> u8 {
    let keep = bit_big_endian || ((raw & 0b0000_0001) != 0 && (raw & 0b1000_0000) == 0);
    if keep {
        raw
    } else {
        raw.reverse_bits()
    }
}

pub(crate) fn has_names(format: u8) -> bool {
    format & (FORMAT_NAMES_1 | FORMAT_NAMES_2) != 0
}

pub(crate) fn has_ids(format: u8) -> bool {
    format & FORMAT_IDS != 0
}

pub(crate) fn has_compression(format: u8) -> bool {
    format & FORMAT_COMPRESSION != 0
}

pub(crate) fn has_long_offsets(format: u8) -> bool {
    format & FORMAT_LONG_OFFSETS != 0
}

/// One file inside a monolithic or split binder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderEntry {
    pub flags: u8,
    pub id: Option<i32>,
    pub name: Option<String>,
    pub data_offset: u64,
    pub compressed_size: i64,
    pub uncompressed_size: Option<i64>,
}

impl BinderEntry {
    /// The lowercased extension of the entry name, with its leading dot.
    ///
    /// Binder names are usually full Windows paths, so the separator-aware
    /// split matters.
    pub fn extension(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        let file_name = name.rsplit(['\\', '/']).next()?;
        let (stem, extension) = file_name.rsplit_once('.')?;
        if stem.is_empty() || extension.is_empty() {
            return None;
        }
        Some(format!(".{}", extension.to_ascii_lowercase()))
    }

    /// Read this entry's bytes from the stream holding the binder data.
    pub fn read_data<R: Read + Seek>(&self, reader: &mut R) -> Result<Vec<u8>> {
        if self.compressed_size < 0 {
            return Err(FormatError::invalid(
                "binder",
                format!("entry size {}", self.compressed_size),
            ));
        }
        reader.seek(SeekFrom::Start(self.data_offset))?;
        let mut data = vec![0u8; self.compressed_size as usize];
        reader.read_exact(&mut data)?;
        Ok(data)
    }
}

/// Read a null-terminated Shift-JIS string at `offset`, restoring the
/// stream position.
pub(crate) fn read_shift_jis_cstring<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
) -> Result<String> {
    let saved = reader.stream_position()?;
    reader.seek(SeekFrom::Start(offset))?;
    let mut bytes = Vec::new();
    loop {
        let byte = reader.read_u8()?;
        if byte == 0 {
            break;
        }
        bytes.push(byte);
        if bytes.len() > MAX_NAME {
            return Err(FormatError::invalid("binder", "unterminated name"));
        }
    }
    reader.seek(SeekFrom::Start(saved))?;
    let (text, _, _) = encoding_rs::SHIFT_JIS.decode(&bytes);
    Ok(text.into_owned())
}

/// Read a null-terminated UTF-16 string at `offset`, restoring the stream
/// position.
pub(crate) fn read_utf16_cstring<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    endian: Endian,
) -> Result<String> {
    let saved = reader.stream_position()?;
    reader.seek(SeekFrom::Start(offset))?;
    let mut units = Vec::new();
    loop {
        let unit = endian.read_u16(reader)?;
        if unit == 0 {
            break;
        }
        units.push(unit);
        if units.len() > MAX_NAME {
            return Err(FormatError::invalid("binder", "unterminated name"));
        }
    }
    reader.seek(SeekFrom::Start(saved))?;
    Ok(String::from_utf16_lossy(&units))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> BinderEntry {
        BinderEntry {
            flags: 0x40,
            id: None,
            name: Some(name.to_string()),
            data_offset: 0,
            compressed_size: 0,
            uncompressed_size: None,
        }
    }

    #[test]
    fn test_extension_from_windows_path() {
        let entry = named("N:\\FRPG\\data\\INTERROOT_win32\\msg\\item.FMG");
        assert_eq!(entry.extension().as_deref(), Some(".fmg"));
    }

    #[test]
    fn test_extension_missing() {
        assert_eq!(named("no_extension").extension(), None);
        assert_eq!(named("dir.with.dot\\name").extension(), None);
    }

    #[test]
    fn test_normalize_format() {
        // Bit-reversed storage: 0x74 stored for format 0x2E.
        assert_eq!(normalize_format(0x2E, true), 0x2E);
        assert_eq!(normalize_format(0x74, false), 0x2E);
        // Odd formats without the top bit are stored as-is.
        assert_eq!(normalize_format(0x07, false), 0x07);
    }
}
