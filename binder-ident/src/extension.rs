//! Extension guessing
//!
//! The first 50 bytes are matched against an ordered probe list; the
//! first hit wins. Literal prefixes go first, then the structural
//! probes that need to parse a little, and finally the DCX check, which
//! recurses on the decompressed payload and tags the result with
//! `.dcx`. Every probe leaves the stream position where it found it.

use crate::Result;
use binder_formats::{dcx, fmg, param, paramdbp, paramdef};
use encoding_rs::SHIFT_JIS;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use tracing::trace;

const PEEK_LENGTH: usize = 50;

/// Literal byte probes, evaluated in order: (offset, pattern, extension).
const PREFIX_PROBES: &[(usize, &[u8], &str)] = &[
    (0, b"BND", ".bnd"),
    (0, b"BHD", ".bhd"),
    (0, b"BHF", ".bhd"),
    (0, b"BDF", ".bdt"),
    (0, b"SMD", ".smd"),
    (0, b"MDL", ".mdl"),
    (0, b"FEV", ".fev"),
    (0, b"FSB", ".fsb"),
    (0, b"GFX", ".gfx"),
    (0, b"PAM", ".pam"),
    (0, b"CLM", ".clm"),
    (0, b"TPF\0", ".tpf"),
    (0, b"MQB ", ".mqb"),
    (0, b"TAE ", ".tae"),
    (0, b"DRB\0", ".drb"),
    (0, b"\0BRD", ".drb"),
    (0, b"DDS ", ".dds"),
    (0, b"ENFL", ".entryfilelist"),
    (0, b"DFPN", ".nfd"),
    (0, b"#BOM", ".txt"),
    (0, b"TEXT", ".txt"),
    (0, b"NVMA", ".nva"),
    (0, b"HNAV", ".hnav"),
    (0, b"NVG2", ".ngp"),
    (0, b"F2TR", ".flver2tri"),
    (0, b"EDF\0", ".edf"),
    (0, b"EVD\0", ".evd"),
    (0, b"ELD\0", ".eld"),
    (0, b"BLF\0", ".blf"),
    (0, b"FXR\0", ".fxr"),
    (0, b"ACB\0", ".acb"),
    (0, b"HTR\0", ".ht"),
    (0, b"ANE\0", ".ane"),
    (0, b"<?xml", ".xml"),
    (0, b"FLVER\0", ".flver"),
    (0, b"[PATH]", ".ini"),
    (0, b"-----BEGIN RSA PUBLIC KEY-----", ".pem"),
    (1, b"PNG", ".png"),
    (1, b"Lua", ".lc"),
    (8, b"FEV FMT ", ".fev"),
    (12, b"ITLIMITER_INFO", ".itl"),
    (32, b"#ANIEDIT", ".anc"),
    (40, b"SIB ", ".sib"),
    (44, b"MTD ", ".mtd"),
];

/// Case-insensitive prefixes.
const PREFIX_PROBES_CASELESS: &[(&[u8], &str)] = &[(b"DLSE", ".ffx"), (b"FSSL", ".esd")];

/// Guess the extension of the stream's content, `""` when nothing
/// matches. The stream position is preserved.
pub fn guess_extension<R: Read + Seek>(reader: &mut R) -> Result<String> {
    let head = peek(reader, PEEK_LENGTH)?;

    for (offset, pattern, extension) in PREFIX_PROBES {
        if head.len() >= offset + pattern.len()
            && &head[*offset..offset + pattern.len()] == *pattern
        {
            trace!("Prefix probe at {offset} matched {extension}");
            return Ok((*extension).to_string());
        }
    }
    for (pattern, extension) in PREFIX_PROBES_CASELESS {
        if head.len() >= pattern.len() && head[..pattern.len()].eq_ignore_ascii_case(pattern) {
            return Ok((*extension).to_string());
        }
    }

    if fmg::is_fmg(reader)? {
        return Ok(".fmg".to_string());
    }
    if param::is_param(reader)? {
        return Ok(".param".to_string());
    }
    if paramdef::is_paramdef(reader)? {
        return Ok(".paramdef".to_string());
    }
    if paramdbp::is_paramdbp(reader)? {
        return Ok(".dbp".to_string());
    }
    if is_msb(reader)? {
        return Ok(".msb".to_string());
    }
    if is_tdf(reader)? {
        return Ok(".tdf".to_string());
    }
    if dcx::is_dcx(reader)? {
        let saved = reader.stream_position()?;
        let payload = dcx::decompress(reader)?;
        reader.seek(SeekFrom::Start(saved))?;
        let inner = guess_extension(&mut Cursor::new(payload))?;
        return Ok(format!("{inner}.dcx"));
    }

    Ok(String::new())
}

/// MSB map files have no magic; their models block starts with the
/// literal `MODEL_PARAM_ST` at the offset stored at byte 4, stored in
/// either byte order.
fn is_msb<R: Read + Seek>(reader: &mut R) -> Result<bool> {
    const MARKER: &[u8] = b"MODEL_PARAM_ST";

    let length = stream_len(reader)?;
    if length < 8 {
        return Ok(false);
    }
    let head = peek(reader, 8)?;
    let raw = i32::from_le_bytes(head[4..8].try_into().unwrap());

    let mut offset = raw;
    if offset < 0 || offset as u64 >= length {
        offset = raw.swap_bytes();
    }
    if offset < 0 || offset as u64 >= length {
        return Ok(false);
    }

    let saved = reader.stream_position()?;
    reader.seek(SeekFrom::Start(offset as u64))?;
    let mut marker = [0u8; MARKER.len()];
    let matched = match reader.read_exact(&mut marker) {
        Ok(()) => marker == *MARKER,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(e.into()),
    };
    reader.seek(SeekFrom::Start(saved))?;
    Ok(matched)
}

/// TDF tables are Shift-JIS text opening with a quoted header line.
fn is_tdf<R: Read + Seek>(reader: &mut R) -> Result<bool> {
    let saved = reader.stream_position()?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    reader.seek(SeekFrom::Start(saved))?;

    if bytes.len() < 4 {
        return Ok(false);
    }
    let (text, _, _) = SHIFT_JIS.decode(&bytes);
    let mut chars = text.chars();
    if chars.next() != Some('"') {
        return Ok(false);
    }
    let rest = chars.as_str();
    Ok(rest
        .match_indices('"')
        .any(|(index, _)| rest[index + 1..].starts_with("\r\n")))
}

fn peek<R: Read + Seek>(reader: &mut R, max: usize) -> io::Result<Vec<u8>> {
    let saved = reader.stream_position()?;
    let mut buffer = vec![0u8; max];
    let mut filled = 0;
    while filled < buffer.len() {
        let n = reader.read(&mut buffer[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buffer.truncate(filled);
    reader.seek(SeekFrom::Start(saved))?;
    Ok(buffer)
}

fn stream_len<R: Seek>(reader: &mut R) -> io::Result<u64> {
    let saved = reader.stream_position()?;
    let length = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(saved))?;
    Ok(length)
}
