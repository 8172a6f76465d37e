//! Folder guessing
//!
//! Maps a detected extension to the canonical output directory. Archive
//! types are peeked to name their bucket after the dominant inner
//! extension; DCX-wrapped files recurse and land in a `/dcx` subfolder
//! unless they were themselves entries inside an archive.

use crate::Result;
use binder_formats::bxf::{Bxf3, Bxf4};
use binder_formats::{bnd3, bnd4, dcx, BinderEntry};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::trace;

/// The fixed extension-to-folder table. Unknown extensions fall back to
/// the extension itself without its leading dot.
pub fn folder_for_extension(extension: &str) -> String {
    let extension = extension.to_ascii_lowercase();
    let folder = match extension.as_str() {
        ".flv" | ".flver" | ".smd" | ".mdl" => "model",
        ".msb" => "model/map",
        ".nva" | ".hnav" | ".ht" | ".htr" => "model/map/ch_nav",
        ".drb" => "lang/menu",
        ".fmg" => "lang/text",
        ".tpf" | ".dds" | ".png" => "image",
        ".fsb" | ".fev" => "sound",
        ".lua" | ".lc" | ".evd" | ".emevd" | ".eld" | ".luainfo" => "script",
        ".mtd" => "material",
        ".tae" => "tae",
        ".xml" | ".ini" | ".txt" | ".pem" | ".properties" => "system",
        ".param" => "param",
        ".paramdef" | ".def" => "param/def",
        ".tdf" => "param/tdf",
        ".dbp" => "dbmenu",
        ".pam" => "movie",
        ".ffx" => "sfx",
        other => return other.trim_start_matches('.').to_string(),
    };
    folder.to_string()
}

/// Choose the output folder for a file with the given extension.
///
/// `reader` gives probes access to the content (needed for `.bnd`/`.bhd`
/// peeks and `.dcx` recursion); `is_archive_entry` suppresses the `/dcx`
/// suffix for files that were entries inside an archive.
pub fn guess_folder<R: Read + Seek>(
    extension: &str,
    reader: Option<&mut R>,
    is_archive_entry: bool,
) -> Result<String> {
    let extension = extension.to_ascii_lowercase();

    if let Some(inner_extension) = extension.strip_suffix(".dcx") {
        let inner = if let Some(reader) = reader {
            if dcx::is_dcx(reader)? {
                let saved = reader.stream_position()?;
                let payload = dcx::decompress(reader)?;
                reader.seek(SeekFrom::Start(saved))?;
                let mut cursor = Cursor::new(payload);
                guess_folder(inner_extension, Some(&mut cursor), is_archive_entry)?
            } else {
                guess_folder::<R>(inner_extension, None, is_archive_entry)?
            }
        } else {
            guess_folder::<R>(inner_extension, None, is_archive_entry)?
        };
        return Ok(if is_archive_entry {
            inner
        } else {
            format!("{inner}/dcx")
        });
    }

    if extension == ".bnd" || extension == ".bhd" {
        if let Some(reader) = reader {
            return Ok(peek_binder(reader)?);
        }
        return Ok("bind".to_string());
    }

    Ok(folder_for_extension(&extension))
}

/// Enumerate an archive's entry names and bucket it by the most frequent
/// inner extension. Streams that cannot be parsed as any binder flavor
/// stay in the plain `bind` folder.
fn peek_binder<R: Read + Seek>(reader: &mut R) -> Result<String> {
    let saved = reader.stream_position()?;
    let mut magic = [0u8; 4];
    let read = reader.read(&mut magic)?;
    reader.seek(SeekFrom::Start(saved))?;
    if read < 4 {
        return Ok("bind".to_string());
    }

    let entries = match &magic {
        m if m == bnd3::MAGIC => bnd3::Bnd3::read(reader).map(|b| b.entries),
        m if m == bnd4::MAGIC => bnd4::Bnd4::read(reader).map(|b| b.entries),
        m if m == binder_formats::bxf::BHF3_MAGIC => {
            Bxf3::read_header(reader).map(|b| b.entries)
        }
        m if m == binder_formats::bxf::BHF4_MAGIC => {
            Bxf4::read_header(reader).map(|b| b.entries)
        }
        _ => return Ok("bind".to_string()),
    };
    reader.seek(SeekFrom::Start(saved))?;

    let entries = match entries {
        Ok(entries) => entries,
        Err(error) => {
            trace!("Archive peek failed: {error}");
            return Ok("bind".to_string());
        }
    };

    match dominant_extension(&entries) {
        Some(inner) => Ok(format!("bind/{}", folder_for_extension(&inner))),
        None => Ok("bind".to_string()),
    }
}

/// The most frequent entry-name extension; ties break alphabetically so
/// the result is stable.
fn dominant_extension(entries: &[BinderEntry]) -> Option<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entry in entries {
        if let Some(extension) = entry.extension() {
            *counts.entry(extension).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(extension, _)| extension)
}
