//! BHD5 split-archive header codec
//!
//! A BHD5 header is a bucketed hash table over the entries of a separate
//! data file. Every generation shares the outer shape (magic, endianness
//! marker, bucket table) but the per-entry record grew over time: Dark
//! Souls 2 added SHA/AES side records, Dark Souls 3 an explicit unpadded
//! size, Elden Ring widened the path hash to 64 bits.

use crate::endian::Endian;
use crate::error::FormatError;
use crate::version::GameVersion;
use crate::Result;
use binder_crypto::{ByteRange, EntryAesKey};
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::{debug, warn};

pub const MAGIC: &[u8; 4] = b"BHD5";

/// Sanity cap on side-record range counts; corrupt headers otherwise
/// drive allocation from a bogus count field.
const MAX_RANGES: i32 = 1024;
const MAX_SALT: i32 = 0x1000;

/// Integrity record attached to an entry: digest over the named ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaHash {
    pub hash: [u8; 32],
    pub ranges: Vec<ByteRange>,
}

/// One entry of the header's hash table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bhd5Entry {
    pub path_hash: u64,
    pub padded_size: i32,
    pub unpadded_size: i64,
    pub offset: i64,
    pub sha_hash: Option<ShaHash>,
    pub aes_key: Option<EntryAesKey>,
}

impl Bhd5Entry {
    fn read<R: Read + Seek>(reader: &mut R, game: GameVersion, endian: Endian) -> Result<Self> {
        let path_hash;
        let padded_size;
        let mut unpadded_size = -1i64;
        let offset;
        let mut sha_offset = 0i64;
        let mut aes_offset = 0i64;

        if game >= GameVersion::EldenRing {
            path_hash = endian.read_u64(reader)?;
            padded_size = endian.read_i32(reader)?;
            unpadded_size = endian.read_i32(reader)? as i64;
            offset = endian.read_i64(reader)?;
            sha_offset = endian.read_i64(reader)?;
            aes_offset = endian.read_i64(reader)?;
        } else {
            path_hash = endian.read_u32(reader)? as u64;
            padded_size = endian.read_i32(reader)?;
            offset = endian.read_i64(reader)?;
            if game.has_entry_records() {
                sha_offset = endian.read_i64(reader)?;
                aes_offset = endian.read_i64(reader)?;
            }
            if game.has_unpadded_size() {
                unpadded_size = endian.read_i64(reader)?;
            }
        }

        // Generations without the field (and files storing -1) fall back
        // to the padded size so read lengths are always defined.
        if unpadded_size < 0 {
            unpadded_size = padded_size as i64;
        }

        let sha_hash = if sha_offset > 0 {
            Some(Self::read_sha(reader, endian, sha_offset as u64)?)
        } else {
            None
        };
        let aes_key = if aes_offset > 0 {
            Some(Self::read_aes(reader, endian, aes_offset as u64)?)
        } else {
            None
        };

        Ok(Self {
            path_hash,
            padded_size,
            unpadded_size,
            offset,
            sha_hash,
            aes_key,
        })
    }

    fn read_sha<R: Read + Seek>(reader: &mut R, endian: Endian, offset: u64) -> Result<ShaHash> {
        let saved = reader.stream_position()?;
        reader.seek(SeekFrom::Start(offset))?;
        let mut hash = [0u8; 32];
        reader.read_exact(&mut hash)?;
        let ranges = read_ranges(reader, endian)?;
        reader.seek(SeekFrom::Start(saved))?;
        Ok(ShaHash { hash, ranges })
    }

    fn read_aes<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        offset: u64,
    ) -> Result<EntryAesKey> {
        let saved = reader.stream_position()?;
        reader.seek(SeekFrom::Start(offset))?;
        let mut key = [0u8; 16];
        reader.read_exact(&mut key)?;
        let ranges = read_ranges(reader, endian)?;
        reader.seek(SeekFrom::Start(saved))?;
        Ok(EntryAesKey::new(key, ranges))
    }

    fn write<W: Write>(
        &self,
        writer: &mut W,
        game: GameVersion,
        endian: Endian,
        sha_offset: i64,
        aes_offset: i64,
    ) -> Result<()> {
        if game >= GameVersion::EldenRing {
            endian.write_u64(writer, self.path_hash)?;
            endian.write_i32(writer, self.padded_size)?;
            endian.write_i32(writer, self.unpadded_size as i32)?;
            endian.write_i64(writer, self.offset)?;
            endian.write_i64(writer, sha_offset)?;
            endian.write_i64(writer, aes_offset)?;
        } else {
            endian.write_u32(writer, self.path_hash as u32)?;
            endian.write_i32(writer, self.padded_size)?;
            endian.write_i64(writer, self.offset)?;
            if game.has_entry_records() {
                endian.write_i64(writer, sha_offset)?;
                endian.write_i64(writer, aes_offset)?;
            }
            if game.has_unpadded_size() {
                endian.write_i64(writer, self.unpadded_size)?;
            }
        }
        Ok(())
    }
}

fn read_ranges<R: Read>(reader: &mut R, endian: Endian) -> Result<Vec<ByteRange>> {
    let count = endian.read_i32(reader)?;
    if !(0..=MAX_RANGES).contains(&count) {
        return Err(FormatError::invalid("BHD5", format!("range count {count}")));
    }
    let mut ranges = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let start = endian.read_i64(reader)?;
        let end = endian.read_i64(reader)?;
        ranges.push(ByteRange::new(start, end));
    }
    Ok(ranges)
}

fn write_ranges<W: Write>(writer: &mut W, endian: Endian, ranges: &[ByteRange]) -> Result<()> {
    endian.write_i32(writer, ranges.len() as i32)?;
    for range in ranges {
        endian.write_i64(writer, range.start)?;
        endian.write_i64(writer, range.end)?;
    }
    Ok(())
}

/// A parsed (or under-construction) BHD5 header.
#[derive(Debug, Clone)]
pub struct Bhd5 {
    pub game: GameVersion,
    pub big_endian: bool,
    pub unk05: bool,
    pub salt: String,
    pub buckets: Vec<Vec<Bhd5Entry>>,
}

impl Bhd5 {
    /// An empty header for the given generation.
    pub fn new(game: GameVersion) -> Self {
        Self {
            game,
            big_endian: false,
            unk05: true,
            salt: String::new(),
            buckets: Vec::new(),
        }
    }

    /// An empty header with `bucket_count` freshly allocated buckets.
    pub fn with_buckets(game: GameVersion, bucket_count: usize) -> Self {
        let mut header = Self::new(game);
        header.buckets = vec![Vec::new(); bucket_count];
        header
    }

    /// Total number of entries across all buckets.
    pub fn entry_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// All entries in bucket order.
    pub fn entries(&self) -> impl Iterator<Item = &Bhd5Entry> {
        self.buckets.iter().flatten()
    }

    fn entry_size(game: GameVersion) -> i64 {
        match game {
            GameVersion::DemonsSouls | GameVersion::DarkSouls1 => 16,
            GameVersion::DarkSouls2 => 32,
            GameVersion::DarkSouls3 | GameVersion::Sekiro | GameVersion::EldenRing => 40,
        }
    }

    pub fn read<R: Read + Seek>(reader: &mut R, game: GameVersion) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(FormatError::UnrecognizedArchive {
                expected: "BHD5",
                magic,
            });
        }

        let big_endian = match reader.read_i8()? {
            0 => true,
            -1 => false,
            other => {
                return Err(FormatError::invalid(
                    "BHD5",
                    format!("endianness marker {other}"),
                ));
            }
        };
        let endian = if big_endian { Endian::Big } else { Endian::Little };

        let unk05 = reader.read_u8()? != 0;
        let mut pad = [0u8; 2];
        reader.read_exact(&mut pad)?;

        let version = endian.read_i32(reader)?;
        if version != 1 {
            return Err(FormatError::invalid("BHD5", format!("version {version}")));
        }
        let _file_size = endian.read_i32(reader)?;
        let bucket_count = endian.read_i32(reader)?;
        if bucket_count < 0 {
            return Err(FormatError::invalid(
                "BHD5",
                format!("bucket count {bucket_count}"),
            ));
        }
        let buckets_offset = endian.read_i32(reader)?;

        let salt = if game.has_salt() {
            let length = endian.read_i32(reader)?;
            if !(0..=MAX_SALT).contains(&length) {
                return Err(FormatError::invalid(
                    "BHD5",
                    format!("salt length {length}"),
                ));
            }
            let mut bytes = vec![0u8; length as usize];
            reader.read_exact(&mut bytes)?;
            String::from_utf8_lossy(&bytes).into_owned()
        } else {
            String::new()
        };

        reader.seek(SeekFrom::Start(buckets_offset as u64))?;
        let mut bucket_headers = Vec::with_capacity(bucket_count as usize);
        for _ in 0..bucket_count {
            let count = endian.read_i32(reader)?;
            let offset = endian.read_i32(reader)?;
            bucket_headers.push((count, offset));
        }

        let mut buckets = Vec::with_capacity(bucket_count as usize);
        for (count, offset) in bucket_headers {
            if count < 0 {
                return Err(FormatError::invalid("BHD5", format!("entry count {count}")));
            }
            reader.seek(SeekFrom::Start(offset as u64))?;
            let mut bucket = Vec::with_capacity(count as usize);
            for _ in 0..count {
                bucket.push(Bhd5Entry::read(reader, game, endian)?);
            }
            buckets.push(bucket);
        }

        let header = Self {
            game,
            big_endian,
            unk05,
            salt,
            buckets,
        };
        debug!(
            "Read BHD5 header: game={}, {} buckets, {} entries",
            game,
            header.buckets.len(),
            header.entry_count()
        );
        Ok(header)
    }

    /// Serialize the header.
    ///
    /// Layout is computed up front (header, bucket table, entries, then
    /// SHA/AES side records in entry order), so the write is a single
    /// sequential pass.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let game = self.game;
        let endian = if self.big_endian { Endian::Big } else { Endian::Little };
        let bucket_count = self.buckets.len();
        let entry_size = Self::entry_size(game);

        let header_size = 24i64 + if game.has_salt() { 4 + self.salt.len() as i64 } else { 0 };
        let buckets_offset = header_size;
        let entries_start = buckets_offset + 8 * bucket_count as i64;

        let mut record_cursor = entries_start + self.entry_count() as i64 * entry_size;
        let mut record_offsets = Vec::with_capacity(bucket_count);
        for bucket in &self.buckets {
            let mut offsets = Vec::with_capacity(bucket.len());
            for entry in bucket {
                if !game.has_entry_records()
                    && (entry.sha_hash.is_some() || entry.aes_key.is_some())
                {
                    warn!(
                        "Entry {:08x} carries side records but {} headers cannot store them",
                        entry.path_hash, game
                    );
                }
                let mut sha_offset = 0;
                let mut aes_offset = 0;
                if game.has_entry_records() {
                    if let Some(sha) = &entry.sha_hash {
                        sha_offset = record_cursor;
                        record_cursor += 32 + 4 + 16 * sha.ranges.len() as i64;
                    }
                    if let Some(aes) = &entry.aes_key {
                        aes_offset = record_cursor;
                        record_cursor += 16 + 4 + 16 * aes.ranges().len() as i64;
                    }
                }
                offsets.push((sha_offset, aes_offset));
            }
            record_offsets.push(offsets);
        }
        let file_size = record_cursor;

        writer.write_all(MAGIC)?;
        writer.write_i8(if self.big_endian { 0 } else { -1 })?;
        writer.write_u8(self.unk05 as u8)?;
        writer.write_all(&[0u8; 2])?;
        endian.write_i32(writer, 1)?;
        endian.write_i32(writer, file_size as i32)?;
        endian.write_i32(writer, bucket_count as i32)?;
        endian.write_i32(writer, buckets_offset as i32)?;
        if game.has_salt() {
            endian.write_i32(writer, self.salt.len() as i32)?;
            writer.write_all(self.salt.as_bytes())?;
        }

        let mut entry_cursor = entries_start;
        for bucket in &self.buckets {
            endian.write_i32(writer, bucket.len() as i32)?;
            endian.write_i32(writer, entry_cursor as i32)?;
            entry_cursor += bucket.len() as i64 * entry_size;
        }

        for (bucket, offsets) in self.buckets.iter().zip(&record_offsets) {
            for (entry, &(sha_offset, aes_offset)) in bucket.iter().zip(offsets) {
                entry.write(writer, game, endian, sha_offset, aes_offset)?;
            }
        }

        if game.has_entry_records() {
            for bucket in &self.buckets {
                for entry in bucket {
                    if let Some(sha) = &entry.sha_hash {
                        writer.write_all(&sha.hash)?;
                        write_ranges(writer, endian, &sha.ranges)?;
                    }
                    if let Some(aes) = &entry.aes_key {
                        writer.write_all(aes.key())?;
                        write_ranges(writer, endian, aes.ranges())?;
                    }
                }
            }
        }

        debug!(
            "Wrote BHD5 header: game={}, {} buckets, {} entries, {} bytes",
            game,
            bucket_count,
            self.entry_count(),
            file_size
        );
        Ok(())
    }
}
