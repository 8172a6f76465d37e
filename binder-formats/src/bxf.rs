//! BXF split binder readers
//!
//! The split siblings of BND3/BND4: a `BHF3`/`BHF4` header file carrying
//! the entry table, and a bare `BDT` data file the entry offsets point
//! into. The header layouts match their BND counterparts apart from the
//! magic.

use crate::bnd4::Bnd4;
use crate::entries::BinderEntry;
use crate::Result;
use crate::{bnd3, bnd4};
use std::io::{Read, Seek};

pub const BHF3_MAGIC: &[u8; 4] = b"BHF3";
pub const BHF4_MAGIC: &[u8; 4] = b"BHF4";

/// A parsed BHF3 header. Entry data lives in the companion data file.
#[derive(Debug, Clone)]
pub struct Bxf3 {
    pub version: String,
    pub format: u8,
    pub big_endian: bool,
    pub entries: Vec<BinderEntry>,
}

impl Bxf3 {
    pub fn read_header<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let (version, format, big_endian, entries) =
            bnd3::read_header(reader, BHF3_MAGIC, "BHF3")?;
        Ok(Self {
            version,
            format,
            big_endian,
            entries,
        })
    }

    /// Read one entry's bytes from the companion data stream.
    pub fn read_entry_data<R: Read + Seek>(
        &self,
        entry: &BinderEntry,
        data: &mut R,
    ) -> Result<Vec<u8>> {
        entry.read_data(data)
    }
}

/// A parsed BHF4 header. Entry data lives in the companion data file.
#[derive(Debug, Clone)]
pub struct Bxf4 {
    pub version: String,
    pub format: u8,
    pub big_endian: bool,
    pub unicode: bool,
    pub entries: Vec<BinderEntry>,
}

impl Bxf4 {
    pub fn read_header<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let Bnd4 {
            version,
            format,
            big_endian,
            unicode,
            entries,
        } = bnd4::read_header(reader, BHF4_MAGIC, "BHF4")?;
        Ok(Self {
            version,
            format,
            big_endian,
            unicode,
            entries,
        })
    }

    /// Read one entry's bytes from the companion data stream.
    pub fn read_entry_data<R: Read + Seek>(
        &self,
        entry: &BinderEntry,
        data: &mut R,
    ) -> Result<Vec<u8>> {
        entry.read_data(data)
    }
}
