//! Name guessing
//!
//! Composes extension and folder detection to rebuild a usable layout
//! from a directory of anonymous files: every identified file moves to
//! `<its dir>/<folder>/<name><ext>`. Unidentified files and files whose
//! target already exists are left alone.

use crate::extension::guess_extension;
use crate::folder::guess_folder;
use crate::Result;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Classify and move the files under `directory`, returning how many
/// were renamed.
pub fn rename_unknown_files(directory: &Path, recursive: bool) -> Result<usize> {
    let mut files = Vec::new();
    collect_files(directory, recursive, &mut files)?;

    let mut renamed = 0;
    for file in files {
        let mut reader = BufReader::new(File::open(&file)?);
        let extension = guess_extension(&mut reader)?;
        if extension.is_empty() {
            continue;
        }
        let folder = guess_folder(&extension, Some(&mut reader), false)?;
        drop(reader);

        let parent = file.parent().unwrap_or(directory);
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target_dir = parent.join(&folder);
        let target = target_dir.join(format!("{file_name}{extension}"));
        if target.exists() {
            debug!("Skipping {file:?}: {target:?} already exists");
            continue;
        }

        fs::create_dir_all(&target_dir)?;
        fs::rename(&file, &target)?;
        debug!("{file:?} -> {target:?}");
        renamed += 1;
    }
    info!("Renamed {renamed} files under {directory:?}");
    Ok(renamed)
}

fn collect_files(directory: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut children: Vec<PathBuf> = fs::read_dir(directory)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    children.sort();
    for child in children {
        if child.is_dir() {
            if recursive {
                collect_files(&child, recursive, files)?;
            }
        } else {
            files.push(child);
        }
    }
    Ok(())
}
