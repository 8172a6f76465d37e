//! Runtime-endianness read/write helpers
//!
//! The binder formats pick their byte order from a header flag, so the
//! codecs thread an `Endian` value instead of a compile-time type
//! parameter.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub fn read_u16<R: Read>(self, reader: &mut R) -> io::Result<u16> {
        match self {
            Endian::Little => reader.read_u16::<LittleEndian>(),
            Endian::Big => reader.read_u16::<BigEndian>(),
        }
    }

    pub fn read_i32<R: Read>(self, reader: &mut R) -> io::Result<i32> {
        match self {
            Endian::Little => reader.read_i32::<LittleEndian>(),
            Endian::Big => reader.read_i32::<BigEndian>(),
        }
    }

    pub fn read_u32<R: Read>(self, reader: &mut R) -> io::Result<u32> {
        match self {
            Endian::Little => reader.read_u32::<LittleEndian>(),
            Endian::Big => reader.read_u32::<BigEndian>(),
        }
    }

    pub fn read_i64<R: Read>(self, reader: &mut R) -> io::Result<i64> {
        match self {
            Endian::Little => reader.read_i64::<LittleEndian>(),
            Endian::Big => reader.read_i64::<BigEndian>(),
        }
    }

    pub fn read_u64<R: Read>(self, reader: &mut R) -> io::Result<u64> {
        match self {
            Endian::Little => reader.read_u64::<LittleEndian>(),
            Endian::Big => reader.read_u64::<BigEndian>(),
        }
    }

    pub fn write_u16<W: Write>(self, writer: &mut W, value: u16) -> io::Result<()> {
        match self {
            Endian::Little => writer.write_u16::<LittleEndian>(value),
            Endian::Big => writer.write_u16::<BigEndian>(value),
        }
    }

    pub fn write_i32<W: Write>(self, writer: &mut W, value: i32) -> io::Result<()> {
        match self {
            Endian::Little => writer.write_i32::<LittleEndian>(value),
            Endian::Big => writer.write_i32::<BigEndian>(value),
        }
    }

    pub fn write_u32<W: Write>(self, writer: &mut W, value: u32) -> io::Result<()> {
        match self {
            Endian::Little => writer.write_u32::<LittleEndian>(value),
            Endian::Big => writer.write_u32::<BigEndian>(value),
        }
    }

    pub fn write_i64<W: Write>(self, writer: &mut W, value: i64) -> io::Result<()> {
        match self {
            Endian::Little => writer.write_i64::<LittleEndian>(value),
            Endian::Big => writer.write_i64::<BigEndian>(value),
        }
    }

    pub fn write_u64<W: Write>(self, writer: &mut W, value: u64) -> io::Result<()> {
        match self {
            Endian::Little => writer.write_u64::<LittleEndian>(value),
            Endian::Big => writer.write_u64::<BigEndian>(value),
        }
    }
}
