//! Synthetic archive builders for the binder test suites.
//!
//! These build small, well-formed byte images of the container formats so
//! codec and classifier tests do not depend on shipped game data.

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// Build a little-endian BND3 with ids, names and size fields.
pub fn build_bnd3(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let entry_size = 24;
    let entries_start = 0x20usize;
    let names_start = entries_start + entry_size * entries.len();

    let mut name_offsets = Vec::new();
    let mut names = Vec::new();
    for (name, _) in entries {
        name_offsets.push(names_start + names.len());
        names.extend_from_slice(name.as_bytes());
        names.push(0);
    }
    let data_start = names_start + names.len();

    let mut out = Vec::new();
    out.extend_from_slice(b"BND3");
    out.extend_from_slice(b"07D7R6\0\0");
    out.push(0x74); // format 0x2E, bit-reversed
    out.push(0); // little endian
    out.push(0); // bit-little-endian
    out.push(0);
    out.write_i32::<LittleEndian>(entries.len() as i32).unwrap();
    out.write_i32::<LittleEndian>(data_start as i32).unwrap();
    out.write_i32::<LittleEndian>(0).unwrap();
    out.write_i32::<LittleEndian>(0).unwrap();

    let mut data_offset = data_start;
    for (index, (_, data)) in entries.iter().enumerate() {
        out.push(0x40);
        out.extend_from_slice(&[0, 0, 0]);
        out.write_i32::<LittleEndian>(data.len() as i32).unwrap();
        out.write_u32::<LittleEndian>(data_offset as u32).unwrap();
        out.write_i32::<LittleEndian>(index as i32).unwrap();
        out.write_i32::<LittleEndian>(name_offsets[index] as i32)
            .unwrap();
        out.write_i32::<LittleEndian>(data.len() as i32).unwrap();
        data_offset += data.len();
    }

    out.extend_from_slice(&names);
    for (_, data) in entries {
        out.extend_from_slice(data);
    }
    out
}

fn build_bnd4_shaped(magic: &[u8; 4], entries: &[(&str, &[u8])], data_base: usize) -> Vec<u8> {
    let entry_size = 36;
    let entries_start = 0x40usize;
    let names_start = entries_start + entry_size * entries.len();

    let mut name_offsets = Vec::new();
    let mut names = Vec::new();
    for (name, _) in entries {
        name_offsets.push(names_start + names.len());
        for unit in name.encode_utf16() {
            names.extend_from_slice(&unit.to_le_bytes());
        }
        names.extend_from_slice(&[0, 0]);
    }
    let data_start = names_start + names.len();

    let mut out = Vec::new();
    out.extend_from_slice(magic);
    out.extend_from_slice(&[0, 0, 0, 0, 0]); // unk04, unk05, padding
    out.push(0); // little endian
    out.push(1); // bit-little-endian
    out.push(0);
    out.write_i32::<LittleEndian>(entries.len() as i32).unwrap();
    out.write_i64::<LittleEndian>(0x40).unwrap();
    out.extend_from_slice(b"07D7R6\0\0");
    out.write_i64::<LittleEndian>(entry_size as i64).unwrap();
    out.write_i64::<LittleEndian>(data_start as i64).unwrap();
    out.push(1); // unicode
    out.push(0x74); // format 0x2E, bit-reversed
    out.push(0); // extended
    out.push(0);
    out.write_i32::<LittleEndian>(0).unwrap();
    out.write_i64::<LittleEndian>(0).unwrap();

    let mut data_offset = if data_base > 0 { data_base } else { data_start };
    for (index, (_, data)) in entries.iter().enumerate() {
        out.push(0x40);
        out.extend_from_slice(&[0, 0, 0]);
        out.write_i32::<LittleEndian>(-1).unwrap();
        out.write_i64::<LittleEndian>(data.len() as i64).unwrap();
        out.write_i64::<LittleEndian>(data.len() as i64).unwrap();
        out.write_u32::<LittleEndian>(data_offset as u32).unwrap();
        out.write_i32::<LittleEndian>(index as i32).unwrap();
        out.write_i32::<LittleEndian>(name_offsets[index] as i32)
            .unwrap();
        data_offset += data.len();
    }

    out.extend_from_slice(&names);
    if data_base == 0 {
        for (_, data) in entries {
            out.extend_from_slice(data);
        }
    }
    out
}

/// Build a little-endian, unicode BND4 with ids, names and size fields.
pub fn build_bnd4(entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_bnd4_shaped(b"BND4", entries, 0)
}

/// Build a BHF4/BDT pair: the returned header's entry offsets point into
/// the returned data file, which opens with the 16-byte BDF4 prelude.
pub fn build_bhf4(entries: &[(&str, &[u8])]) -> (Vec<u8>, Vec<u8>) {
    let data_base = 16;
    let header = build_bnd4_shaped(b"BHF4", entries, data_base);

    let mut data = Vec::new();
    data.extend_from_slice(b"BDF4");
    data.extend_from_slice(b"07D7R6\0\0");
    data.extend_from_slice(&[0, 0, 0, 0]);
    for (_, bytes) in entries {
        data.extend_from_slice(bytes);
    }
    (header, data)
}

fn zlib_compress(payload: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload).unwrap();
    encoder.finish().unwrap()
}

fn build_dcx(compressed: &[u8], uncompressed_len: usize, scheme: &[u8; 4]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"DCX\0");
    out.write_u32::<BigEndian>(0x10000).unwrap();
    out.write_i32::<BigEndian>(0x18).unwrap(); // DCS offset
    out.write_i32::<BigEndian>(0x24).unwrap(); // DCP offset
    out.write_i32::<BigEndian>(0x24).unwrap();
    out.write_i32::<BigEndian>(0x2C).unwrap();
    out.extend_from_slice(b"DCS\0");
    out.write_u32::<BigEndian>(uncompressed_len as u32).unwrap();
    out.write_u32::<BigEndian>(compressed.len() as u32).unwrap();
    out.extend_from_slice(b"DCP\0");
    out.extend_from_slice(scheme);
    out.write_i32::<BigEndian>(0x20).unwrap();
    out.extend_from_slice(&[9, 0, 0, 0]);
    out.write_i32::<BigEndian>(0).unwrap();
    out.write_i32::<BigEndian>(0).unwrap();
    out.write_i32::<BigEndian>(0).unwrap();
    out.write_i32::<BigEndian>(0x00010100).unwrap();
    out.extend_from_slice(b"DCA\0");
    out.write_i32::<BigEndian>(8).unwrap();
    out.extend_from_slice(compressed);
    out
}

/// Wrap `payload` in a zlib-compressed DCX container.
pub fn build_dcx_dflt(payload: &[u8]) -> Vec<u8> {
    build_dcx(&zlib_compress(payload), payload.len(), b"DFLT")
}

/// Wrap `payload` uncompressed under an arbitrary scheme fourcc.
pub fn build_dcx_with_scheme(payload: &[u8], scheme: &[u8; 4]) -> Vec<u8> {
    build_dcx(payload, payload.len(), scheme)
}

/// Wrap `payload` in the legacy DCP container.
pub fn build_dcp_dflt(payload: &[u8]) -> Vec<u8> {
    let compressed = zlib_compress(payload);
    let mut out = Vec::new();
    out.extend_from_slice(b"DCP\0");
    out.extend_from_slice(b"DFLT");
    out.write_i32::<BigEndian>(0x20).unwrap();
    out.extend_from_slice(&[9, 0, 0, 0]);
    out.write_i32::<BigEndian>(0).unwrap();
    out.write_i32::<BigEndian>(0).unwrap();
    out.write_i32::<BigEndian>(0x00010100).unwrap();
    out.extend_from_slice(b"DCS\0");
    out.write_u32::<BigEndian>(payload.len() as u32).unwrap();
    out.write_u32::<BigEndian>(compressed.len() as u32).unwrap();
    out.extend_from_slice(&compressed);
    out.extend_from_slice(b"DCA\0");
    out.write_i32::<BigEndian>(8).unwrap();
    out
}
