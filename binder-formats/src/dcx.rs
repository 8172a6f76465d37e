//! DCX compression wrapper
//!
//! Individual payloads (not whole archives) are wrapped in DCX: a
//! big-endian header naming the compression scheme, a `DCS` block with
//! the two sizes and a `DCA` block fronting the compressed bytes. The
//! oldest generation uses the leaner `DCP` layout. Only zlib (`DFLT`)
//! and stored (`NONE`) payloads are decompressed here; recompression is
//! out of scope and console-only schemes surface as unsupported.

use crate::endian::Endian;
use crate::error::FormatError;
use crate::Result;
use flate2::read::ZlibDecoder;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::debug;

pub const DCX_MAGIC: &[u8; 4] = b"DCX\0";
pub const DCP_MAGIC: &[u8; 4] = b"DCP\0";

const DCS_MAGIC: &[u8; 4] = b"DCS\0";
const DCA_MAGIC: &[u8; 4] = b"DCA\0";

/// How far past the `DCP` block a `DCA`/`DCS` marker may sit. The header
/// grew a few fields between revisions, so the markers float.
const SCAN_WINDOW: usize = 0x100;

/// `true` if the stream starts with a DCX or DCP wrapper. The stream
/// position is restored.
pub fn is_dcx<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let saved = reader.stream_position()?;
    let mut magic = [0u8; 4];
    let result = match reader.read_exact(&mut magic) {
        Ok(()) => &magic == DCX_MAGIC || &magic == DCP_MAGIC,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(e),
    };
    reader.seek(SeekFrom::Start(saved))?;
    Ok(result)
}

/// Decompress a wrapped payload starting at the current stream position.
pub fn decompress<R: Read + Seek>(reader: &mut R) -> Result<Vec<u8>> {
    let base = reader.stream_position()?;
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    match &magic {
        m if m == DCX_MAGIC => decompress_dcx(reader, base),
        m if m == DCP_MAGIC => decompress_dcp(reader),
        _ => Err(FormatError::UnrecognizedArchive {
            expected: "DCX",
            magic,
        }),
    }
}

fn decompress_dcx<R: Read + Seek>(reader: &mut R, base: u64) -> Result<Vec<u8>> {
    let be = Endian::Big;
    let _revision = be.read_u32(reader)?;
    let dcs_offset = be.read_i32(reader)?;
    let dcp_offset = be.read_i32(reader)?;

    reader.seek(SeekFrom::Start(base + dcs_offset as u64))?;
    expect_magic(reader, DCS_MAGIC)?;
    let uncompressed_size = be.read_u32(reader)?;
    let compressed_size = be.read_u32(reader)?;

    reader.seek(SeekFrom::Start(base + dcp_offset as u64))?;
    expect_magic(reader, DCP_MAGIC)?;
    let mut scheme = [0u8; 4];
    reader.read_exact(&mut scheme)?;

    let dca_pos = scan_for(reader, DCA_MAGIC)?;
    reader.seek(SeekFrom::Start(dca_pos + 4))?;
    let dca_size = be.read_i32(reader)?;
    reader.seek(SeekFrom::Start(dca_pos + dca_size as u64))?;

    inflate(reader, &scheme, compressed_size, uncompressed_size)
}

fn decompress_dcp<R: Read + Seek>(reader: &mut R) -> Result<Vec<u8>> {
    let be = Endian::Big;
    let mut scheme = [0u8; 4];
    reader.read_exact(&mut scheme)?;

    let dcs_pos = scan_for(reader, DCS_MAGIC)?;
    reader.seek(SeekFrom::Start(dcs_pos + 4))?;
    let uncompressed_size = be.read_u32(reader)?;
    let compressed_size = be.read_u32(reader)?;

    inflate(reader, &scheme, compressed_size, uncompressed_size)
}

fn inflate<R: Read>(
    reader: &mut R,
    scheme: &[u8; 4],
    compressed_size: u32,
    uncompressed_size: u32,
) -> Result<Vec<u8>> {
    let mut compressed = vec![0u8; compressed_size as usize];
    reader.read_exact(&mut compressed)?;

    let result = match scheme {
        b"DFLT" => {
            let mut decoder = ZlibDecoder::new(compressed.as_slice());
            let mut result = Vec::with_capacity(uncompressed_size as usize);
            decoder
                .read_to_end(&mut result)
                .map_err(|e| FormatError::Decompression(format!("zlib: {e}")))?;
            result
        }
        b"NONE" => compressed,
        other => {
            return Err(FormatError::UnsupportedCompression(
                String::from_utf8_lossy(other).into_owned(),
            ));
        }
    };

    if result.len() != uncompressed_size as usize {
        return Err(FormatError::Decompression(format!(
            "expected {} bytes, got {}",
            uncompressed_size,
            result.len()
        )));
    }
    debug!(
        "Decompressed {} bytes -> {} bytes",
        compressed_size, uncompressed_size
    );
    Ok(result)
}

fn expect_magic<R: Read>(reader: &mut R, expected: &'static [u8; 4]) -> Result<()> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != expected {
        return Err(FormatError::invalid(
            "DCX",
            format!("expected {expected:02x?}, found {magic:02x?}"),
        ));
    }
    Ok(())
}

/// Locate `needle` at or after the current position, returning its
/// absolute offset.
fn scan_for<R: Read + Seek>(reader: &mut R, needle: &[u8; 4]) -> Result<u64> {
    let start = reader.stream_position()?;
    let mut window = vec![0u8; SCAN_WINDOW];
    let mut filled = 0;
    while filled < window.len() {
        let n = reader.read(&mut window[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    window.truncate(filled);
    let found = window
        .windows(4)
        .position(|candidate| candidate == needle)
        .ok_or_else(|| FormatError::invalid("DCX", format!("missing {needle:02x?} block")))?;
    Ok(start + found as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use binder_test_utils::{build_dcp_dflt, build_dcx_dflt, build_dcx_with_scheme};
    use std::io::Cursor;

    #[test]
    fn test_is_dcx_restores_position() {
        let data = build_dcx_dflt(b"payload");
        let mut cursor = Cursor::new(&data);
        assert!(is_dcx(&mut cursor).unwrap());
        assert_eq!(cursor.position(), 0);

        let mut other = Cursor::new(b"BND3....".to_vec());
        assert!(!is_dcx(&mut other).unwrap());
        assert_eq!(other.position(), 0);
    }

    #[test]
    fn test_decompress_dflt() {
        let payload = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let data = build_dcx_dflt(&payload);
        let result = decompress(&mut Cursor::new(&data)).unwrap();
        assert_eq!(result, payload);
    }

    #[test]
    fn test_decompress_legacy_dcp() {
        let payload = b"demon's souls era payload".to_vec();
        let data = build_dcp_dflt(&payload);
        let result = decompress(&mut Cursor::new(&data)).unwrap();
        assert_eq!(result, payload);
    }

    #[test]
    fn test_unsupported_scheme() {
        let data = build_dcx_with_scheme(b"junk", b"KRAK");
        let err = decompress(&mut Cursor::new(&data)).unwrap_err();
        match err {
            FormatError::UnsupportedCompression(scheme) => assert_eq!(scheme, "KRAK"),
            other => panic!("expected UnsupportedCompression, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_stream() {
        let mut data = build_dcx_dflt(b"payload bytes here");
        data.truncate(data.len() - 4);
        assert!(decompress(&mut Cursor::new(&data)).is_err());
    }
}
