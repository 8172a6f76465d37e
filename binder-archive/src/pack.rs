//! Archive packing
//!
//! Entry bytes are appended to the data file strictly in input order,
//! padded out to the requested alignment; every entry's hash places it
//! in a header bucket; the header file is written only after all data
//! bytes are on disk.

use crate::cancel::CancellationToken;
use crate::check::{ensure_directory, ensure_relative};
use crate::error::ArchiveError;
use crate::model::Binder;
use crate::progress::ProgressHandle;
use crate::Result;
use binder_formats::bhd5::{Bhd5, Bhd5Entry};
use binder_formats::{DataHeader, GameVersion};
use binder_hash::{hash_path, BucketInfo};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tokio::io::{AsyncWriteExt, BufWriter as AsyncBufWriter};
use tracing::{debug, info};

impl Binder {
    /// Pack this binder into a header/data file pair under `out_dir`.
    ///
    /// `big_endian` overrides the binder's own endianness when set.
    #[allow(clippy::too_many_arguments)]
    pub fn write_archive(
        &self,
        out_dir: &Path,
        header_name: &str,
        data_name: &str,
        game: GameVersion,
        alignment: i64,
        write_data_header: bool,
        big_endian: Option<bool>,
    ) -> Result<()> {
        let (mut header, bucket_info) =
            self.prepare(out_dir, header_name, data_name, game, big_endian)?;

        let data_file = File::create(out_dir.join(data_name))?;
        let mut writer = BufWriter::new(data_file);
        let mut position = 0i64;

        if write_data_header {
            DataHeader::new(game, &self.version).write(&mut writer)?;
            position += binder_formats::data_header::DATA_HEADER_SIZE as i64;
        }

        for entry in &self.entries {
            let placed = self.place_entry(&header, &bucket_info, entry, game, position)?;
            let mut source = File::open(Path::new(&entry.path))?;
            let unpadded = io::copy(&mut source, &mut writer)? as i64;
            position += unpadded;
            position += write_padding(&mut writer, unpadded, alignment)?;
            finish_entry(&mut header, placed, position, unpadded);
        }
        writer.flush()?;

        self.write_header(&header, out_dir, header_name)
    }

    /// Asynchronous packing with progress reporting and cancellation.
    /// Cancellation is checked before each entry and before the header
    /// write; a cancelled pack leaves partial output behind.
    #[allow(clippy::too_many_arguments)]
    pub async fn write_archive_async(
        &self,
        out_dir: &Path,
        header_name: &str,
        data_name: &str,
        game: GameVersion,
        alignment: i64,
        write_data_header: bool,
        big_endian: Option<bool>,
        progress: Option<&ProgressHandle>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let (mut header, bucket_info) =
            self.prepare(out_dir, header_name, data_name, game, big_endian)?;

        let data_file = tokio::fs::File::create(out_dir.join(data_name)).await?;
        let mut writer = AsyncBufWriter::new(data_file);
        let mut position = 0i64;

        if write_data_header {
            let mut prelude = Vec::with_capacity(16);
            DataHeader::new(game, &self.version).write(&mut prelude)?;
            writer.write_all(&prelude).await?;
            position += prelude.len() as i64;
        }

        let total = self.entries.len().max(1);
        for (index, entry) in self.entries.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ArchiveError::Cancelled);
            }
            if let Some(progress) = progress {
                progress.report(index as f64 / total as f64);
            }

            let placed = self.place_entry(&header, &bucket_info, entry, game, position)?;
            let mut source = tokio::fs::File::open(Path::new(&entry.path)).await?;
            let unpadded = tokio::io::copy(&mut source, &mut writer).await? as i64;
            position += unpadded;

            let padding = padding_needed(unpadded, alignment);
            if padding > 0 {
                writer.write_all(&vec![0u8; padding as usize]).await?;
                position += padding;
            }
            finish_entry(&mut header, placed, position, unpadded);
        }
        writer.flush().await?;

        if cancel.is_cancelled() {
            return Err(ArchiveError::Cancelled);
        }
        self.write_header(&header, out_dir, header_name)?;
        if let Some(progress) = progress {
            progress.report(1.0);
        }
        Ok(())
    }

    /// Validate parameters and allocate the bucketed header.
    fn prepare(
        &self,
        out_dir: &Path,
        header_name: &str,
        data_name: &str,
        game: GameVersion,
        big_endian: Option<bool>,
    ) -> Result<(Bhd5, BucketInfo)> {
        ensure_relative("header_name", Path::new(header_name))?;
        ensure_relative("data_name", Path::new(data_name))?;
        ensure_directory("root_directory", &self.root_directory)?;
        std::fs::create_dir_all(out_dir)?;

        let bucket_info = self.bucket_info.clone().unwrap_or_default();
        let bucket_count = bucket_info.bucket_count(self.entries.len());
        let mut header = Bhd5::with_buckets(game, bucket_count);
        header.big_endian = big_endian.unwrap_or(self.big_endian);

        info!(
            "Packing {} entries into {} buckets ({})",
            self.entries.len(),
            bucket_count,
            game
        );
        Ok((header, bucket_info))
    }

    /// Hash the entry's archive path and pick its bucket.
    fn place_entry(
        &self,
        header: &Bhd5,
        bucket_info: &BucketInfo,
        entry: &crate::model::EntryHeader,
        game: GameVersion,
        offset: i64,
    ) -> Result<(usize, i64, u64)> {
        let relative = self.relative_archive_path(entry)?;
        let hash = hash_path(&relative, game.uses_64bit_hashes());
        let bucket = bucket_info.bucket_index(hash, header.buckets.len());
        debug!("{relative} -> bucket {bucket}, offset {offset}");
        Ok((bucket, offset, hash))
    }

    fn write_header(&self, header: &Bhd5, out_dir: &Path, header_name: &str) -> Result<()> {
        let header_file = File::create(out_dir.join(header_name))?;
        let mut writer = BufWriter::new(header_file);
        header.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Zero bytes needed to pad an entry of `written` bytes out to a whole
/// number of alignment blocks.
fn padding_needed(written: i64, alignment: i64) -> i64 {
    if alignment > 1 && written % alignment != 0 {
        alignment - written % alignment
    } else {
        0
    }
}

fn write_padding<W: Write>(writer: &mut W, written: i64, alignment: i64) -> Result<i64> {
    let padding = padding_needed(written, alignment);
    if padding > 0 {
        writer.write_all(&vec![0u8; padding as usize])?;
    }
    Ok(padding)
}

fn finish_entry(header: &mut Bhd5, placed: (usize, i64, u64), position: i64, unpadded: i64) {
    let (bucket, offset, hash) = placed;
    header.buckets[bucket].push(Bhd5Entry {
        path_hash: hash,
        padded_size: (position - offset) as i32,
        unpadded_size: unpadded,
        offset,
        sha_hash: None,
        aes_key: None,
    });
}
