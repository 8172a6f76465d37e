//! Archive unpacking
//!
//! Entries are issued in header order. The synchronous path reads and
//! writes one entry at a time; the asynchronous path overlaps reads with
//! spawned write tasks while keeping the bytes held by outstanding
//! writes bounded.

use crate::cancel::CancellationToken;
use crate::check::ensure_file;
use crate::error::ArchiveError;
use crate::model::{Binder, EntryHeader};
use crate::progress::ProgressHandle;
use crate::Result;
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::task::JoinSet;
use tracing::{info, trace};

/// Upper bound on bytes held by outstanding write tasks. Peak usage can
/// exceed this by at most one entry.
pub const MAX_IN_FLIGHT_BYTES: usize = 100 * 1024 * 1024;

impl Binder {
    /// Unpack every selected entry of `data` into `out_dir`.
    pub fn unpack<R: Read + Seek>(&self, data: &mut R, out_dir: &Path) -> Result<()> {
        fs::create_dir_all(out_dir)?;
        let stream_length = data.seek(SeekFrom::End(0))?;

        let mut written = 0usize;
        for entry in &self.entries {
            if self.should_skip(entry) {
                continue;
            }
            let write_path = resolve_out_path(out_dir, &entry.path);
            if self.skip_existing_files && write_path.exists() {
                continue;
            }
            if let Some(parent) = write_path.parent() {
                fs::create_dir_all(parent)?;
            }

            let length = entry.read_length();
            validate_bounds(entry.offset, length, stream_length)?;
            data.seek(SeekFrom::Start(entry.offset as u64))?;
            let mut buffer = vec![0u8; length as usize];
            data.read_exact(&mut buffer)?;
            if let Some(aes) = &entry.aes_key {
                aes.decrypt(&mut buffer)?;
            }

            trace!("Writing {} bytes to {:?}", buffer.len(), write_path);
            fs::write(&write_path, &buffer)?;
            written += 1;
        }
        info!("Unpacked {written} entries into {out_dir:?}");
        Ok(())
    }

    /// Asynchronous unpack with bounded-memory write concurrency.
    ///
    /// Before each new entry, completed write tasks are swept out of the
    /// in-flight accounting; while the next read would push the total
    /// over [`MAX_IN_FLIGHT_BYTES`], the oldest outstanding write is
    /// awaited. Cancellation is checked per entry; writes already issued
    /// are awaited before returning.
    pub async fn unpack_async(
        &self,
        data_path: &Path,
        out_dir: &Path,
        progress: Option<&ProgressHandle>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        ensure_file("data_path", data_path)?;
        tokio::fs::create_dir_all(out_dir).await?;
        let mut data = tokio::fs::File::open(data_path).await?;
        let stream_length = data.metadata().await?.len();

        let total = self.entries.len().max(1);
        let mut tasks: JoinSet<std::io::Result<usize>> = JoinSet::new();
        let mut in_flight = 0usize;

        for (index, entry) in self.entries.iter().enumerate() {
            if cancel.is_cancelled() {
                drain(&mut tasks).await?;
                return Err(ArchiveError::Cancelled);
            }
            if let Some(progress) = progress {
                progress.report(index as f64 / total as f64);
            }
            if self.should_skip(entry) {
                continue;
            }
            let write_path = resolve_out_path(out_dir, &entry.path);
            if self.skip_existing_files && write_path.exists() {
                continue;
            }
            if let Some(parent) = write_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let length = entry.read_length();
            validate_bounds(entry.offset, length, stream_length)?;
            let length = length as usize;

            while let Some(done) = tasks.try_join_next() {
                in_flight -= finish_write(done)?;
            }
            while in_flight + length > MAX_IN_FLIGHT_BYTES {
                match tasks.join_next().await {
                    Some(done) => in_flight -= finish_write(done)?,
                    None => break,
                }
            }

            data.seek(SeekFrom::Start(entry.offset as u64)).await?;
            let mut buffer = vec![0u8; length];
            data.read_exact(&mut buffer).await?;
            if let Some(aes) = &entry.aes_key {
                aes.decrypt(&mut buffer)?;
            }

            trace!("Writing {length} bytes to {write_path:?}");
            in_flight += length;
            tasks.spawn(async move {
                let written = buffer.len();
                tokio::fs::write(&write_path, buffer).await?;
                Ok(written)
            });
        }

        while let Some(done) = tasks.join_next().await {
            in_flight -= finish_write(done)?;
        }
        debug_assert_eq!(in_flight, 0);
        if let Some(progress) = progress {
            progress.report(1.0);
        }
        Ok(())
    }

    fn should_skip(&self, entry: &EntryHeader) -> bool {
        entry.ignore || (self.skip_unknown_files && entry.name_is_hash)
    }
}

/// Join an output path onto the target directory. Archive paths keep
/// their leading slash, which a plain `join` would treat as a new root.
fn resolve_out_path(out_dir: &Path, entry_path: &str) -> PathBuf {
    let trimmed = entry_path
        .trim_start_matches(['/', '\\'])
        .replace('\\', "/");
    out_dir.join(trimmed)
}

fn validate_bounds(offset: i64, length: i64, stream_length: u64) -> Result<()> {
    if offset < 0
        || length < 0
        || offset as u64 >= stream_length
        || length as u64 > stream_length - offset as u64
    {
        return Err(ArchiveError::MalformedEntry {
            offset,
            length,
            stream_length,
        });
    }
    Ok(())
}

fn finish_write(
    done: std::result::Result<std::io::Result<usize>, tokio::task::JoinError>,
) -> Result<usize> {
    let written = done.map_err(|e| std::io::Error::other(e))??;
    Ok(written)
}

/// Await every outstanding write, surfacing the first failure.
async fn drain(tasks: &mut JoinSet<std::io::Result<usize>>) -> Result<()> {
    let mut first_error = None;
    while let Some(done) = tasks.join_next().await {
        if let Err(error) = finish_write(done) {
            first_error.get_or_insert(error);
        }
    }
    match first_error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
